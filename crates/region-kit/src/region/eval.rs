use std::fmt;

use tracing::{Level, event};

use crate::data::coords::{Anchor, TranscriptCoords};

use super::error::EvaluationError;
use super::{Clause, Op, RegionSpecifier, Token};

/// A resolved region, 0-based and half-open: `[start, end)`.
///
/// `start == end` is a point, e.g. what `*cds` resolves to.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub struct Limits {
    pub start: i64,
    pub end: i64,
}

impl Limits {
    pub fn new(start: i64, end: i64) -> Self {
        Self { start, end }
    }

    pub fn as_tuple(&self) -> (i64, i64) {
        (self.start, self.end)
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }
}

impl From<Limits> for (i64, i64) {
    fn from(value: Limits) -> Self {
        value.as_tuple()
    }
}

impl fmt::Display for Limits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.start, self.end)
    }
}

/// Values resolved from one clause, folded as they arrive.
struct ClauseStack<'c> {
    clause: &'c Clause,
    values: Vec<i64>,
    pending: Option<Op>,
}

impl<'c> ClauseStack<'c> {
    fn new(clause: &'c Clause) -> Self {
        Self {
            clause,
            values: Vec::with_capacity(2),
            pending: None,
        }
    }

    fn push(&mut self, v: i64) -> Result<(), EvaluationError> {
        match self.pending.take() {
            Some(op) => {
                let left = self.values.pop().ok_or_else(|| self.dangling())?;
                self.values.push(op.apply(left, v));
            }
            None => self.values.push(v),
        }
        Ok(())
    }

    fn push_op(&mut self, op: Op) -> Result<(), EvaluationError> {
        if self.values.is_empty() || self.pending.is_some() {
            return Err(self.dangling());
        }
        self.pending = Some(op);
        Ok(())
    }

    fn finish(self) -> Result<Vec<i64>, EvaluationError> {
        if self.pending.is_some() {
            return Err(self.dangling());
        }
        if self.values.is_empty() {
            return Err(EvaluationError::EmptyClause {
                clause: self.clause.to_string(),
            });
        }
        Ok(self.values)
    }

    fn dangling(&self) -> EvaluationError {
        EvaluationError::DanglingOperator {
            clause: self.clause.to_string(),
        }
    }
}

impl Clause {
    /// Resolves every token against `coords` and folds the operator in one
    /// left-to-right pass. Yields one value, or two for an unanchored region.
    pub fn resolve(&self, coords: &TranscriptCoords) -> Result<Vec<i64>, EvaluationError> {
        let mut stack = ClauseStack::new(self);
        // span of the latest region reference, the base for `%` offsets
        let mut span: Option<i64> = None;

        for token in self.tokens() {
            match *token {
                Token::Literal(v) | Token::Offset(v) => stack.push(v)?,
                Token::Percent(p) => {
                    let base = span.ok_or_else(|| EvaluationError::UnresolvedPercentBase {
                        clause: self.to_string(),
                    })?;
                    stack.push(base.div_euclid(100).saturating_mul(p))?;
                }
                Token::RegionRef(region, anchor) => {
                    let (start, end) = coords.resolve(region)?;
                    span = Some(end.saturating_sub(start));
                    match anchor {
                        Anchor::Start => stack.push(start)?,
                        Anchor::End => stack.push(end)?,
                        Anchor::None => {
                            stack.push(start)?;
                            stack.push(end)?;
                        }
                    }
                }
                Token::Operator(op) => stack.push_op(op)?,
            }
        }

        stack.finish()
    }
}

impl RegionSpecifier {
    /// Resolves the specifier on one transcript.
    ///
    /// The result spans the smallest to the largest value over all clauses. With
    /// `enforce`, each bound is clamped to `[0, length]` on its own, so an inverted
    /// result (`start > end`) stays inverted.
    pub fn evaluate(
        &self,
        coords: &TranscriptCoords,
        enforce: bool,
    ) -> Result<Limits, EvaluationError> {
        let mut bounds: Option<(i64, i64)> = None;

        for clause in self.clauses() {
            for v in clause.resolve(coords)? {
                bounds = Some(match bounds {
                    Some((lo, hi)) => (lo.min(v), hi.max(v)),
                    None => (v, v),
                });
            }
        }

        let (mut lmin, mut lmax) = bounds.ok_or_else(|| EvaluationError::EmptyClause {
            clause: self.to_string(),
        })?;

        if enforce {
            let length = coords.length();
            lmin = lmin.max(0).min(length);
            lmax = lmax.min(length).max(0);
        }

        event!(Level::TRACE, "{} on {:?} -> [{}, {})", self, coords, lmin, lmax);

        Ok(Limits::new(lmin, lmax))
    }
}
