//! region-kit
//!
//! Resolves compact region specifiers such as `*cds-50:cds*+50` against
//! per-transcript CDS (or custom box) coordinates, giving 0-based, half-open
//! intervals on the transcript.

mod err_opt_ext;

pub mod annotation;
pub mod batch;
pub mod data;
pub mod region;

#[cfg(feature = "logging")]
pub mod tracing_kit;
pub use tracing;

pub use annotation::{AnnotationOptions, TranscriptDb, read_transcript_ids};
pub use data::coords::{Anchor, NamedRegion, TranscriptCoords};
pub use region::{EvaluationError, GrammarError, Limits, RegionError, RegionSpecifier};
