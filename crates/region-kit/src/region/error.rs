use thiserror::Error;

use crate::data::coords::{CoordKind, NamedRegion};

pub type Result<T> = std::result::Result<T, RegionError>;

/// The specifier text does not follow the region grammar.
#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum GrammarError {
    #[error("'{segment}' could not be matched to the region grammar: {reason}")]
    InvalidSegment {
        segment: String,
        reason: &'static str,
    },

    #[error("'{text}' has {count} ':'-separated clauses, expected 1 or 2")]
    ClauseCount { text: String, count: usize },
}

impl GrammarError {
    pub(crate) fn segment(segment: &str, reason: &'static str) -> Self {
        GrammarError::InvalidSegment {
            segment: segment.to_string(),
            reason,
        }
    }
}

/// A parsed specifier could not be resolved against a coordinate triple.
#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum EvaluationError {
    #[error("percentage offset in '{clause}' has no region span to refer to")]
    UnresolvedPercentBase { clause: String },

    #[error("operator in '{clause}' is missing an operand")]
    DanglingOperator { clause: String },

    #[error("clause '{clause}' resolved to no value")]
    EmptyClause { clause: String },

    #[error("region '{region}' can not be resolved on {coords}")]
    IncompatibleRegion {
        region: NamedRegion,
        coords: CoordKind,
    },
}

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum RegionError {
    #[error(transparent)]
    Grammar(#[from] GrammarError),

    #[error(transparent)]
    Evaluation(#[from] EvaluationError),
}
