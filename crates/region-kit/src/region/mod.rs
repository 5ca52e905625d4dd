//! Region specifiers: a compact notation for sub-intervals of a transcript.
//!
//! A specifier is one or two `:`-separated clauses. Each clause is a region name
//! (`5utr`, `cds`, `3utr`, `transcript`, `custom`), a bare integer, or a region
//! with an optional `*` anchor and an optional `+`/`-` offset, absolute or in
//! percent of the region's span.
//!
//! ```text
//! cds                     [cds_start, cds_end)
//! *cds:cds*               [cds_start, cds_end)
//! *cds-50:cds*+50         [cds_start - 50, cds_end + 50)
//! *cds+40:3utr*-20        [cds_start + 40, tr_len - 20)
//! 10:3utr*+10             [10, tr_len + 10), clamped to tr_len when enforced
//! ```
//!
//! Parsing does not look at any transcript. The parsed [`RegionSpecifier`] is
//! immutable and can be evaluated against any number of [`TranscriptCoords`].

use std::fmt;
use std::str::FromStr;

use crate::data::coords::{Anchor, NamedRegion, TranscriptCoords};

pub mod error;
mod eval;
mod parse;

pub use error::{EvaluationError, GrammarError, RegionError};
pub use eval::Limits;

#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub enum Op {
    Add,
    Subtract,
}

impl Op {
    pub fn apply(self, left: i64, right: i64) -> i64 {
        match self {
            Op::Add => left.saturating_add(right),
            Op::Subtract => left.saturating_sub(right),
        }
    }

    pub fn symbol(self) -> char {
        match self {
            Op::Add => '+',
            Op::Subtract => '-',
        }
    }
}

#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub enum Token {
    /// An absolute coordinate.
    Literal(i64),
    RegionRef(NamedRegion, Anchor),
    Operator(Op),
    Offset(i64),
    /// Percent of the span of the most recently resolved region.
    Percent(i64),
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Literal(v) | Token::Offset(v) => write!(f, "{v}"),
            Token::RegionRef(r, Anchor::None) => write!(f, "{r}"),
            Token::RegionRef(r, Anchor::Start) => write!(f, "*{r}"),
            Token::RegionRef(r, Anchor::End) => write!(f, "{r}*"),
            Token::Operator(op) => write!(f, "{}", op.symbol()),
            Token::Percent(p) => write!(f, "{p}%"),
        }
    }
}

/// One `:`-separated segment of a specifier.
///
/// Only built by the parser, so it holds at most one operator and that operator
/// always sits between a region reference and an offset.
#[derive(Debug, PartialEq, Eq, Hash, Clone)]
pub struct Clause {
    tokens: Vec<Token>,
}

impl Clause {
    pub(crate) fn new(tokens: Vec<Token>) -> Self {
        Self { tokens }
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }
}

impl fmt::Display for Clause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for t in &self.tokens {
            write!(f, "{t}")?;
        }
        Ok(())
    }
}

#[derive(Debug, PartialEq, Eq, Hash, Clone)]
pub struct RegionSpecifier {
    clauses: Vec<Clause>,
}

impl RegionSpecifier {
    /// Parses a specifier such as `*cds-50:cds*+50`.
    pub fn parse(text: &str) -> Result<Self, GrammarError> {
        let clauses = parse::parse_clauses(text)?;
        Ok(Self { clauses })
    }

    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }
}

impl FromStr for RegionSpecifier {
    type Err = GrammarError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for RegionSpecifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, c) in self.clauses.iter().enumerate() {
            if i > 0 {
                f.write_str(":")?;
            }
            write!(f, "{c}")?;
        }
        Ok(())
    }
}

pub fn parse(text: &str) -> Result<RegionSpecifier, GrammarError> {
    RegionSpecifier::parse(text)
}

pub fn evaluate(
    spec: &RegionSpecifier,
    coords: &TranscriptCoords,
    enforce: bool,
) -> Result<Limits, EvaluationError> {
    spec.evaluate(coords, enforce)
}

/// Parses and evaluates in one go, for one-off use.
pub fn limits_of(text: &str, coords: &TranscriptCoords, enforce: bool) -> error::Result<Limits> {
    Ok(parse(text)?.evaluate(coords, enforce)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_is_canonical_text() -> Result<(), Box<dyn std::error::Error>> {
        for text in [
            "cds",
            "5utr:cds",
            "*cds",
            "*cds:cds*",
            "*cds-50:cds*+50",
            "*cds+40:3utr*-20",
            "transcript",
            "*transcript+10:transcript*-10",
            "10:3utr*+10",
            "*cds+10%",
            "custom",
        ] {
            assert_eq!(RegionSpecifier::parse(text)?.to_string(), text);
        }

        Ok(())
    }

    #[test]
    fn test_limits_of_reports_both_error_kinds() {
        let coords = TranscriptCoords::cds(100, 400, 600);

        assert!(matches!(
            limits_of("cds:", &coords, false),
            Err(RegionError::Grammar(_))
        ));
        assert!(matches!(
            limits_of("custom", &coords, false),
            Err(RegionError::Evaluation(
                EvaluationError::IncompatibleRegion { .. }
            ))
        ));
        assert_eq!(
            limits_of("*cds-50:cds*+50", &coords, false),
            Ok(Limits::new(50, 450))
        );
    }

    #[test]
    fn test_specifier_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<RegionSpecifier>();
    }
}
