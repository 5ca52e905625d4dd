use std::fmt;
use std::str::FromStr;

use crate::region::error::EvaluationError;

use self::constants::*;

/// One of the fixed, named sub-intervals of a transcript.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub enum NamedRegion {
    FivePrimeUtr,
    Cds,
    ThreePrimeUtr,
    Transcript,
    /// A user supplied box, see [`TranscriptCoords::CustomBox`].
    Custom,
}

impl NamedRegion {
    pub const ALL: [NamedRegion; 5] = [
        NamedRegion::FivePrimeUtr,
        NamedRegion::Cds,
        NamedRegion::ThreePrimeUtr,
        NamedRegion::Transcript,
        NamedRegion::Custom,
    ];

    /// The keyword used for this region in a region specifier.
    pub fn keyword(&self) -> &'static str {
        match self {
            NamedRegion::FivePrimeUtr => UTR5,
            NamedRegion::Cds => CDS,
            NamedRegion::ThreePrimeUtr => UTR3,
            NamedRegion::Transcript => TRANSCRIPT,
            NamedRegion::Custom => CUSTOM,
        }
    }

    /// Returns the region whose keyword starts `s`, together with the rest of `s`.
    pub(crate) fn strip_keyword(s: &str) -> Option<(NamedRegion, &str)> {
        Self::ALL
            .iter()
            .find_map(|r| s.strip_prefix(r.keyword()).map(|rest| (*r, rest)))
    }
}

impl fmt::Display for NamedRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

#[derive(Debug, PartialEq, Eq, Clone, thiserror::Error)]
#[error("'{0}' is not a region name, expected one of 5utr, cds, 3utr, transcript, custom")]
pub struct UnknownRegion(pub String);

/// # Examples
///
/// ```
/// use region_kit::data::coords::NamedRegion;
///
/// let r: NamedRegion = "3utr".parse().unwrap();
/// assert_eq!(r, NamedRegion::ThreePrimeUtr);
/// assert!("utr".parse::<NamedRegion>().is_err());
/// ```
impl FromStr for NamedRegion {
    type Err = UnknownRegion;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let r = match s {
            UTR5 => NamedRegion::FivePrimeUtr,
            CDS => NamedRegion::Cds,
            UTR3 => NamedRegion::ThreePrimeUtr,
            TRANSCRIPT => NamedRegion::Transcript,
            CUSTOM => NamedRegion::Custom,
            oth => return Err(UnknownRegion(oth.to_string())),
        };

        Ok(r)
    }
}

/// Which boundary of a named region a clause takes.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy, Default)]
pub enum Anchor {
    /// Both boundaries, as two separate values.
    #[default]
    None,
    /// `*cds`
    Start,
    /// `cds*`
    End,
}

/// Per-transcript coordinates, 0-based and half-open.
///
/// The two boundary slots of an annotation row mean different things depending on
/// where they came from, so the meaning is carried in the variant instead of being
/// decided by whichever region a specifier happens to mention.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub enum TranscriptCoords {
    Cds { start: i64, end: i64, length: i64 },
    CustomBox { start: i64, end: i64, length: i64 },
}

/// The shape of a [`TranscriptCoords`], used in error reporting.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub enum CoordKind {
    Cds,
    CustomBox,
}

impl fmt::Display for CoordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoordKind::Cds => f.write_str("CDS coordinates"),
            CoordKind::CustomBox => f.write_str("custom box coordinates"),
        }
    }
}

impl TranscriptCoords {
    pub fn cds(start: i64, end: i64, length: i64) -> Self {
        TranscriptCoords::Cds { start, end, length }
    }

    pub fn custom_box(start: i64, end: i64, length: i64) -> Self {
        TranscriptCoords::CustomBox { start, end, length }
    }

    pub fn length(&self) -> i64 {
        match *self {
            TranscriptCoords::Cds { length, .. } | TranscriptCoords::CustomBox { length, .. } => {
                length
            }
        }
    }

    pub fn kind(&self) -> CoordKind {
        match self {
            TranscriptCoords::Cds { .. } => CoordKind::Cds,
            TranscriptCoords::CustomBox { .. } => CoordKind::CustomBox,
        }
    }

    /// The same two boundary slots and length, read as a custom box.
    pub fn into_custom_box(self) -> Self {
        match self {
            TranscriptCoords::Cds { start, end, length } => {
                TranscriptCoords::CustomBox { start, end, length }
            }
            b @ TranscriptCoords::CustomBox { .. } => b,
        }
    }

    /// Resolves `region` to its `(start, end)` pair.
    ///
    /// `transcript` resolves against either shape. The UTRs and `cds` need CDS
    /// coordinates and `custom` needs a custom box; anything else is an
    /// [`EvaluationError::IncompatibleRegion`].
    pub fn resolve(&self, region: NamedRegion) -> Result<(i64, i64), EvaluationError> {
        let pair = match (region, *self) {
            (NamedRegion::Transcript, c) => (0, c.length()),
            (NamedRegion::FivePrimeUtr, TranscriptCoords::Cds { start, .. }) => (0, start),
            (NamedRegion::Cds, TranscriptCoords::Cds { start, end, .. }) => (start, end),
            (NamedRegion::ThreePrimeUtr, TranscriptCoords::Cds { end, length, .. }) => {
                (end, length)
            }
            (NamedRegion::Custom, TranscriptCoords::CustomBox { start, end, .. }) => (start, end),
            (region, c) => {
                return Err(EvaluationError::IncompatibleRegion {
                    region,
                    coords: c.kind(),
                });
            }
        };

        Ok(pair)
    }
}

mod constants {
    pub(crate) const UTR5: &str = "5utr";
    pub(crate) const CDS: &str = "cds";
    pub(crate) const UTR3: &str = "3utr";
    pub(crate) const TRANSCRIPT: &str = "transcript";
    pub(crate) const CUSTOM: &str = "custom";
}
