#[cfg(feature = "parallel")]
use rayon::iter::{IntoParallelRefIterator, ParallelIterator};

use crate::annotation::TranscriptDb;
use crate::region::{EvaluationError, Limits, RegionSpecifier};

#[derive(Debug, PartialEq, Eq, Clone)]
pub enum Outcome {
    Found(Result<Limits, EvaluationError>),
    /// The id is not in the annotation.
    Missing,
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct BatchOutcome<'a> {
    pub id: &'a str,
    pub outcome: Outcome,
}

fn evaluate_one<'a>(
    spec: &RegionSpecifier,
    db: &TranscriptDb,
    id: &'a str,
    enforce: bool,
) -> BatchOutcome<'a> {
    let outcome = match db.get(id) {
        Some(coords) => Outcome::Found(spec.evaluate(coords, enforce)),
        None => Outcome::Missing,
    };

    BatchOutcome { id, outcome }
}

/// Evaluates `spec` for every id. Output order follows `ids`; a failure for one id
/// does not affect the others.
#[cfg(feature = "parallel")]
pub fn evaluate_batch<'a, S: AsRef<str> + Sync>(
    spec: &RegionSpecifier,
    db: &TranscriptDb,
    ids: &'a [S],
    enforce: bool,
) -> Vec<BatchOutcome<'a>> {
    ids.par_iter()
        .map(|id| evaluate_one(spec, db, id.as_ref(), enforce))
        .collect()
}

#[cfg(not(feature = "parallel"))]
pub fn evaluate_batch<'a, S: AsRef<str> + Sync>(
    spec: &RegionSpecifier,
    db: &TranscriptDb,
    ids: &'a [S],
    enforce: bool,
) -> Vec<BatchOutcome<'a>> {
    ids.iter()
        .map(|id| evaluate_one(spec, db, id.as_ref(), enforce))
        .collect()
}

#[cfg(test)]
mod tests {
    use crate::annotation::AnnotationRecord;
    use crate::data::coords::{CoordKind, NamedRegion, TranscriptCoords};

    use super::*;

    fn db() -> TranscriptDb {
        let mut db = TranscriptDb::default();
        for (id, coords) in [
            ("T1", TranscriptCoords::cds(100, 400, 600)),
            ("T2", TranscriptCoords::cds(0, 30, 30)),
            ("B1", TranscriptCoords::custom_box(5, 10, 20)),
        ] {
            db.insert(AnnotationRecord {
                gene_id: "G".to_string(),
                transcript_id: id.to_string(),
                coords,
            });
        }
        db
    }

    #[test]
    fn test_order_and_outcomes() {
        let spec = RegionSpecifier::parse("*cds-50:cds*+50").unwrap();
        let ids = ["T2", "NM_404", "B1", "T1"];

        let res = evaluate_batch(&spec, &db(), &ids, true);

        assert_eq!(
            res,
            vec![
                BatchOutcome {
                    id: "T2",
                    outcome: Outcome::Found(Ok(Limits::new(0, 30)))
                },
                BatchOutcome {
                    id: "NM_404",
                    outcome: Outcome::Missing
                },
                BatchOutcome {
                    id: "B1",
                    outcome: Outcome::Found(Err(EvaluationError::IncompatibleRegion {
                        region: NamedRegion::Cds,
                        coords: CoordKind::CustomBox
                    }))
                },
                BatchOutcome {
                    id: "T1",
                    outcome: Outcome::Found(Ok(Limits::new(50, 450)))
                },
            ]
        );
    }

    #[test]
    fn test_many_ids() {
        let spec = RegionSpecifier::parse("transcript").unwrap();
        let ids = (0..1000)
            .map(|i| if i % 2 == 0 { "T1".to_string() } else { "T2".to_string() })
            .collect::<Vec<_>>();

        let res = evaluate_batch(&spec, &db(), &ids, false);

        assert_eq!(res.len(), 1000);
        for (i, r) in res.iter().enumerate() {
            let expected = if i % 2 == 0 { (0, 600) } else { (0, 30) };
            assert_eq!(r.outcome, Outcome::Found(Ok(Limits::new(expected.0, expected.1))));
        }
    }
}
