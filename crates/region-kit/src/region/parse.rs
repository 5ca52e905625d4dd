use crate::data::coords::{Anchor, NamedRegion};

use super::error::GrammarError;
use super::{Clause, Op, Token};

const ANCHOR: char = '*';
const PERCENT: char = '%';
const MAX_CLAUSES: usize = 2;

pub(super) fn parse_clauses(text: &str) -> Result<Vec<Clause>, GrammarError> {
    let segments = text.split(':').collect::<Vec<_>>();

    if segments.len() > MAX_CLAUSES {
        return Err(GrammarError::ClauseCount {
            text: text.to_string(),
            count: segments.len(),
        });
    }

    segments.into_iter().map(parse_clause).collect()
}

/// ```text
/// clause        := region_name | integer | anchored_expr
/// anchored_expr := [ "*" ] region_name [ "*" ] [ op offset ]
/// op            := "+" | "-"
/// offset        := integer [ "%" ]
/// ```
pub(super) fn parse_clause(segment: &str) -> Result<Clause, GrammarError> {
    if segment.is_empty() {
        return Err(GrammarError::segment(segment, "empty clause"));
    }

    if is_digits(segment) {
        let v = parse_int(segment, segment)?;
        return Ok(Clause::new(vec![Token::Literal(v)]));
    }

    let (leading, rest) = match segment.strip_prefix(ANCHOR) {
        Some(rest) => (true, rest),
        None => (false, segment),
    };

    if rest.starts_with(ANCHOR) {
        return Err(GrammarError::segment(
            segment,
            "a region takes at most one '*' anchor",
        ));
    }

    let (region, rest) = NamedRegion::strip_keyword(rest)
        .ok_or_else(|| GrammarError::segment(segment, "unknown region name"))?;

    let (trailing, rest) = match rest.strip_prefix(ANCHOR) {
        Some(_) if leading => {
            return Err(GrammarError::segment(
                segment,
                "a region takes at most one '*' anchor",
            ));
        }
        Some(rest) => (true, rest),
        None => (false, rest),
    };

    if rest.starts_with(ANCHOR) {
        return Err(GrammarError::segment(
            segment,
            "a region takes at most one '*' anchor",
        ));
    }

    let anchor = match (leading, trailing) {
        (true, _) => Anchor::Start,
        (_, true) => Anchor::End,
        _ => Anchor::None,
    };

    let mut tokens = Vec::with_capacity(3);
    tokens.push(Token::RegionRef(region, anchor));

    if rest.is_empty() {
        return Ok(Clause::new(tokens));
    }

    let mut chars = rest.chars();
    let op = match chars.next() {
        Some('+') => Op::Add,
        Some('-') => Op::Subtract,
        _ => {
            return Err(GrammarError::segment(
                segment,
                "expected '+' or '-' after the region",
            ));
        }
    };
    tokens.push(Token::Operator(op));

    let offset = chars.as_str();
    if offset.contains(['+', '-']) {
        return Err(GrammarError::segment(
            segment,
            "a clause takes at most one operator",
        ));
    }

    let token = match offset.strip_suffix(PERCENT) {
        Some(digits) if is_digits(digits) => Token::Percent(parse_int(segment, digits)?),
        None if is_digits(offset) => Token::Offset(parse_int(segment, offset)?),
        _ => {
            return Err(GrammarError::segment(
                segment,
                "offset must be an integer, optionally followed by '%'",
            ));
        }
    };
    tokens.push(token);

    Ok(Clause::new(tokens))
}

fn is_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

fn parse_int(segment: &str, digits: &str) -> Result<i64, GrammarError> {
    digits
        .parse::<i64>()
        .map_err(|_| GrammarError::segment(segment, "integer out of range"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(segment: &str) -> Vec<Token> {
        parse_clause(segment).unwrap().tokens().to_vec()
    }

    fn reason(segment: &str) -> &'static str {
        match parse_clause(segment) {
            Err(GrammarError::InvalidSegment { reason, .. }) => reason,
            other => panic!("expected a grammar error for '{segment}', got {other:?}"),
        }
    }

    #[test]
    fn test_bare_region_and_integer() {
        assert_eq!(
            tokens("cds"),
            vec![Token::RegionRef(NamedRegion::Cds, Anchor::None)]
        );
        assert_eq!(
            tokens("transcript"),
            vec![Token::RegionRef(NamedRegion::Transcript, Anchor::None)]
        );
        assert_eq!(tokens("10"), vec![Token::Literal(10)]);
        assert_eq!(tokens("0"), vec![Token::Literal(0)]);
    }

    #[test]
    fn test_anchored_expressions() {
        assert_eq!(
            tokens("*cds-50"),
            vec![
                Token::RegionRef(NamedRegion::Cds, Anchor::Start),
                Token::Operator(Op::Subtract),
                Token::Offset(50),
            ]
        );
        assert_eq!(
            tokens("3utr*+10"),
            vec![
                Token::RegionRef(NamedRegion::ThreePrimeUtr, Anchor::End),
                Token::Operator(Op::Add),
                Token::Offset(10),
            ]
        );
        assert_eq!(
            tokens("*5utr+25%"),
            vec![
                Token::RegionRef(NamedRegion::FivePrimeUtr, Anchor::Start),
                Token::Operator(Op::Add),
                Token::Percent(25),
            ]
        );
        assert_eq!(
            tokens("*cds"),
            vec![Token::RegionRef(NamedRegion::Cds, Anchor::Start)]
        );
        assert_eq!(
            tokens("custom*"),
            vec![Token::RegionRef(NamedRegion::Custom, Anchor::End)]
        );
    }

    #[test]
    fn test_unanchored_region_with_offset() {
        assert_eq!(
            tokens("cds+10"),
            vec![
                Token::RegionRef(NamedRegion::Cds, Anchor::None),
                Token::Operator(Op::Add),
                Token::Offset(10),
            ]
        );
    }

    #[test]
    fn test_rejects_two_anchors() {
        assert_eq!(reason("*cds*"), "a region takes at most one '*' anchor");
        assert_eq!(reason("*cds*+5"), "a region takes at most one '*' anchor");
        assert_eq!(reason("**cds"), "a region takes at most one '*' anchor");
    }

    #[test]
    fn test_rejects_two_operators() {
        assert_eq!(reason("*cds+5-5"), "a clause takes at most one operator");
        assert_eq!(reason("*cds+-5"), "a clause takes at most one operator");
        assert_eq!(reason("cds++5"), "a clause takes at most one operator");
    }

    #[test]
    fn test_rejects_unknown_keywords_and_junk() {
        assert_eq!(reason("utr"), "unknown region name");
        assert_eq!(reason("CDS"), "unknown region name");
        assert_eq!(reason("10+5"), "unknown region name");
        assert_eq!(reason("-10"), "unknown region name");
        assert_eq!(reason(" cds"), "unknown region name");
        assert_eq!(reason("cdsx"), "expected '+' or '-' after the region");
        assert_eq!(reason("*cds+"), "offset must be an integer, optionally followed by '%'");
        assert_eq!(reason("*cds+5%%"), "offset must be an integer, optionally followed by '%'");
        assert_eq!(reason("*cds+%"), "offset must be an integer, optionally followed by '%'");
        assert_eq!(reason("*cds+5*"), "offset must be an integer, optionally followed by '%'");
        assert_eq!(reason(""), "empty clause");
        assert_eq!(reason("99999999999999999999"), "integer out of range");
    }

    #[test]
    fn test_clause_count() {
        assert_eq!(parse_clauses("cds").unwrap().len(), 1);
        assert_eq!(parse_clauses("*cds:cds*").unwrap().len(), 2);

        assert_eq!(
            parse_clauses("5utr:cds:3utr"),
            Err(GrammarError::ClauseCount {
                text: "5utr:cds:3utr".to_string(),
                count: 3
            })
        );
    }

    #[test]
    fn test_error_names_offending_segment() {
        let err = parse_clauses("*cds:cds**").unwrap_err();
        assert_eq!(
            err,
            GrammarError::InvalidSegment {
                segment: "cds**".to_string(),
                reason: "a region takes at most one '*' anchor"
            }
        );
        assert!(err.to_string().contains("'cds**'"));

        let err = parse_clauses("cds:").unwrap_err();
        assert_eq!(err, GrammarError::segment("", "empty clause"));
    }
}
