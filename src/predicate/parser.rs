//! Predicate string parser
//!
//! Input looks like `(n > 5) AND (n < 10) OR (n == 42)`. Parsing runs three
//! passes over an owned working copy of the text:
//!
//! 1. Bracket peeling: repeatedly cut out the rightmost `(` and the first `)`
//!    after it, recording each group's span. Groups are discovered right to
//!    left; that order is kept until the predicate is assembled.
//! 2. Logic extraction: what remains is a flat run of connector tokens, read
//!    left to right.
//! 3. Comparison extraction: each recorded span is shaped
//!    `<lhs> <operator> <number>`; the lhs is ignored.
//!
//! The resulting predicate is associated strictly left to right, with no
//! precedence between `AND` and `OR`.

use log::{debug, trace};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::buffer::WorkBuffer;
use crate::config::ParserConfig;
use crate::error::{OperatorKind, PredicateError, Result};
use crate::predicate::ast::{ComparisonOperator, LogicOperator, Predicate};

/// Signed decimal, `0x` hex or leading-zero octal, the whole token
static NUMBER_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([+-]?)(?:0[xX]([0-9a-fA-F]+)|0([0-7]*)|([1-9][0-9]*))$")
        .expect("number pattern is valid")
});

static DEFAULT_PARSER: Lazy<Parser> = Lazy::new(Parser::default);

/// Parse a predicate string with the default configuration
pub fn parse(text: &str) -> Result<Predicate> {
    DEFAULT_PARSER.parse(text)
}

/// Half-open span `[start, end)` of a group's contents, parentheses excluded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct GroupSpan {
    start: usize,
    end: usize,
}

#[derive(Debug, Clone, Default)]
pub struct Parser {
    config: ParserConfig,
}

impl Parser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ParserConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    pub fn parse(&self, text: &str) -> Result<Predicate> {
        let source = text.trim();
        if source.is_empty() {
            return Err(PredicateError::syntax("empty predicate"));
        }
        if !source.starts_with('(') || !source.ends_with(')') {
            return Err(PredicateError::syntax(format!(
                "predicate must start with '(' and end with ')': {:?}",
                source
            )));
        }

        let mut buffer = WorkBuffer::new(source);
        let groups = self.peel_groups(&mut buffer)?;
        let logic = self.extract_logic(&mut buffer)?;

        if logic.len() + 1 != groups.len() {
            return Err(PredicateError::syntax(format!(
                "{} groups joined by {} logic operators",
                groups.len(),
                logic.len()
            )));
        }

        let terms = groups
            .iter()
            .map(|span| parse_group(source, *span))
            .collect::<Result<Vec<_>>>()?;

        let predicate = Predicate::assemble(terms, logic)?;
        debug!("parsed {:?} into {} comparisons", source, predicate.count_cmp());
        Ok(predicate)
    }

    /// Pass 1: cut every `( ... )` group out of the buffer, rightmost first
    fn peel_groups(&self, buffer: &mut WorkBuffer) -> Result<Vec<GroupSpan>> {
        let mut groups = Vec::new();

        loop {
            let open = buffer.find_last('(');
            let close = match open {
                Some(open) => buffer.find_from(')', open),
                None => buffer.find_first(')'),
            };

            let (open, close) = match (open, close) {
                (None, None) => break,
                (Some(open), Some(close)) => (open, close),
                (Some(open), None) => {
                    return Err(PredicateError::syntax(format!(
                        "unclosed '(' at offset {}",
                        open
                    )))
                }
                (None, Some(close)) => {
                    return Err(PredicateError::syntax(format!(
                        "unmatched ')' at offset {}",
                        close
                    )))
                }
            };

            if let Some(max) = self.config.max_groups {
                if groups.len() >= max {
                    return Err(PredicateError::syntax(format!(
                        "more than {} groups",
                        max
                    )));
                }
            }

            groups.push(GroupSpan {
                start: open + 1,
                end: close,
            });
            buffer
                .erase_range(open, close + 1)
                .ok_or_else(|| PredicateError::syntax("group span out of bounds"))?;
            trace!("peeled group [{}, {}), residual {:?}", open + 1, close, buffer.as_str());
        }

        if groups.is_empty() {
            return Err(PredicateError::syntax("no comparison groups"));
        }

        Ok(groups)
    }

    /// Pass 2: read the connector tokens left between the groups
    fn extract_logic(&self, buffer: &mut WorkBuffer) -> Result<Vec<LogicOperator>> {
        let mut logic = Vec::new();

        loop {
            buffer.skip_whitespace();
            if buffer.is_empty() {
                break;
            }

            // longest configured token at the head, so "&&||" splits in two
            let (token_len, op) = match self.config.match_logic_prefix(buffer.as_str()) {
                Some(found) => found,
                None => return Err(self.unrecognized_logic(buffer.as_str())),
            };
            let token = buffer
                .erase_range(0, token_len)
                .ok_or_else(|| PredicateError::syntax("logic token out of bounds"))?;

            trace!("logic token {:?} -> {}", token, op);
            logic.push(op);
        }

        Ok(logic)
    }

    /// Error for a residual that starts with no known connector
    fn unrecognized_logic(&self, residual: &str) -> PredicateError {
        let word = residual
            .split(char::is_whitespace)
            .next()
            .unwrap_or(residual);

        if word.chars().count() == 1 {
            PredicateError::syntax(format!("dangling token {:?}", word))
        } else {
            PredicateError::UnrecognizedOperator {
                kind: OperatorKind::Logic,
                token: word.to_string(),
            }
        }
    }
}

/// Pass 3: read `<lhs> <operator> <number>` out of one group
fn parse_group(source: &str, span: GroupSpan) -> Result<(ComparisonOperator, i64)> {
    let group = source
        .get(span.start..span.end)
        .ok_or_else(|| PredicateError::syntax("group span out of bounds"))?
        .trim();

    // spans only line up with the source when groups are flat
    if group.contains(['(', ')']) {
        return Err(PredicateError::syntax(format!(
            "nested groups are not supported: {:?}",
            group
        )));
    }

    let (first, last) = match (group.find(' '), group.rfind(' ')) {
        (Some(first), Some(last)) if first != last => (first, last),
        _ => {
            return Err(PredicateError::syntax(format!(
                "expected '<lhs> <operator> <number>', got {:?}",
                group
            )))
        }
    };

    let op_token = group[first + 1..last].trim();
    let op: ComparisonOperator = op_token.parse()?;
    let number = parse_number(&group[last + 1..])?;

    trace!("group {:?} -> {} {}", group, op, number);
    Ok((op, number))
}

/// Parse an integer literal the way C's `strtol(s, &end, 0)` reads it, but
/// requiring the whole token to be consumed
pub fn parse_number(token: &str) -> Result<i64> {
    let caps = NUMBER_PATTERN
        .captures(token)
        .ok_or_else(|| PredicateError::syntax(format!("invalid number {:?}", token)))?;

    let sign = caps.get(1).map_or("", |m| m.as_str());
    let (digits, radix) = if let Some(hex) = caps.get(2) {
        (hex.as_str(), 16)
    } else if let Some(octal) = caps.get(3) {
        (octal.as_str(), 8)
    } else if let Some(decimal) = caps.get(4) {
        (decimal.as_str(), 10)
    } else {
        return Err(PredicateError::syntax(format!("invalid number {:?}", token)));
    };

    // bare "0" leaves no octal digits
    if digits.is_empty() {
        return Ok(0);
    }

    i64::from_str_radix(&format!("{}{}", sign, digits), radix)
        .map_err(|e| PredicateError::syntax(format!("number {:?} out of range: {}", token, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::predicate::ast::ComparisonOperator::*;

    fn syntax_err(text: &str) -> bool {
        parse(text).map_err(|e| e.is_syntax_error()).err() == Some(true)
    }

    #[test]
    fn test_parse_single_group() {
        let predicate = parse("(x > 5)").unwrap();
        assert_eq!(predicate.count_cmp(), 1);
        assert_eq!(predicate.comparisons(), &[Greater]);
        assert_eq!(predicate.numbers(), &[5]);
        assert!(predicate.logic().is_empty());
    }

    #[test]
    fn test_parse_keeps_source_order() {
        let predicate = parse("(n < 10) AND (n > 0) OR (n == 42)").unwrap();
        assert_eq!(predicate.comparisons(), &[Less, Greater, Equal]);
        assert_eq!(predicate.numbers(), &[10, 0, 42]);
        assert_eq!(predicate.logic(), &[LogicOperator::And, LogicOperator::Or]);
    }

    #[test]
    fn test_parse_all_operators() {
        let operators = [
            ("(v < 1)", Less),
            ("(v <= 1)", LessEqual),
            ("(v > 1)", Greater),
            ("(v >= 1)", GreaterEqual),
            ("(v == 1)", Equal),
            ("(v != 1)", NotEqual),
        ];

        for (text, expected) in operators {
            let predicate = parse(text).unwrap();
            assert_eq!(predicate.comparisons(), &[expected], "Failed for: {}", text);
        }
    }

    #[test]
    fn test_parse_symbolic_logic_tokens() {
        let predicate = parse("(n > 1) && (n < 9) || (n == 20)").unwrap();
        assert_eq!(predicate.logic(), &[LogicOperator::And, LogicOperator::Or]);

        // connectors need no surrounding whitespace
        let predicate = parse("(n > 1)&&(n < 9)").unwrap();
        assert_eq!(predicate.logic(), &[LogicOperator::And]);
    }

    #[test]
    fn test_parse_adjacent_connectors() {
        let predicate = parse("(n > 1)&&(n < 9)||(n == 20)").unwrap();
        assert_eq!(predicate.logic(), &[LogicOperator::And, LogicOperator::Or]);
        assert_eq!(predicate.numbers(), &[1, 9, 20]);

        let predicate = parse("(n > 1)AND(n < 9)or(n == 20)").unwrap();
        assert_eq!(predicate.logic(), &[LogicOperator::And, LogicOperator::Or]);

        // a connector prefix followed by garbage still fails
        assert!(syntax_err("(n > 1)&&x(n < 9)"));
        assert!(syntax_err("(n > 1)ORDER(n < 9)"));
    }

    #[test]
    fn test_parse_tolerates_padding() {
        let predicate = parse("   ( value  >=  -7 )   OR   (value != 3)  ").unwrap();
        assert_eq!(predicate.comparisons(), &[GreaterEqual, NotEqual]);
        assert_eq!(predicate.numbers(), &[-7, 3]);
    }

    #[test]
    fn test_parse_c_style_numbers() {
        assert_eq!(parse_number("42").unwrap(), 42);
        assert_eq!(parse_number("-42").unwrap(), -42);
        assert_eq!(parse_number("+7").unwrap(), 7);
        assert_eq!(parse_number("0").unwrap(), 0);
        assert_eq!(parse_number("-0").unwrap(), 0);
        assert_eq!(parse_number("0x1F").unwrap(), 31);
        assert_eq!(parse_number("-0X10").unwrap(), -16);
        assert_eq!(parse_number("017").unwrap(), 15);
        assert_eq!(parse_number("-9223372036854775808").unwrap(), i64::MIN);
    }

    #[test]
    fn test_parse_number_rejects_garbage() {
        for token in ["", "five", "08", "0x", "12a", "1.5", "--1", "9223372036854775808", "- 1"] {
            assert!(parse_number(token).is_err(), "accepted {:?}", token);
        }
    }

    #[test]
    fn test_mismatched_parentheses() {
        assert!(syntax_err("(x > 5"));
        assert!(syntax_err("x > 5)"));
        assert!(syntax_err("(x > 5))"));
        assert!(syntax_err("((x > 5)"));
        assert!(syntax_err("(x > 5) AND )n < 3("));
    }

    #[test]
    fn test_malformed_groups() {
        assert!(syntax_err("(x > five)"));
        assert!(syntax_err("(x>5)"));
        assert!(syntax_err("(> 5)"));
        assert!(syntax_err("()"));
        assert!(syntax_err(""));
        assert!(syntax_err("   "));
        assert!(syntax_err("x > 5"));
    }

    #[test]
    fn test_unrecognized_operators() {
        assert!(matches!(
            parse("(x => 5)"),
            Err(PredicateError::UnrecognizedOperator {
                kind: OperatorKind::Comparison,
                ..
            })
        ));
        assert!(matches!(
            parse("(x > 5) XOR (x < 9)"),
            Err(PredicateError::UnrecognizedOperator {
                kind: OperatorKind::Logic,
                ..
            })
        ));
    }

    #[test]
    fn test_logic_structure() {
        // dangling single character
        assert!(matches!(
            parse("(x > 5) & (x < 9)"),
            Err(PredicateError::InvalidSyntax(_))
        ));
        // missing connector
        assert!(syntax_err("(x > 5) (x < 9)"));
        // trailing connector
        assert!(syntax_err("(x > 5) AND (x < 9) OR"));
        // too many connectors
        assert!(syntax_err("(x > 5) AND OR (x < 9)"));
    }

    #[test]
    fn test_nested_groups_rejected() {
        assert!(syntax_err("((x > 5))"));
        assert!(syntax_err("((x > 5) AND (y < 1))"));
    }

    #[test]
    fn test_capacity_guard() {
        let parser = Parser::with_config(ParserConfig::default().with_max_groups(2));
        assert!(parser.parse("(n > 1) AND (n < 5)").is_ok());
        assert!(matches!(
            parser.parse("(n > 1) AND (n < 5) AND (n != 3)"),
            Err(PredicateError::InvalidSyntax(_))
        ));
    }

    #[test]
    fn test_custom_logic_tokens() {
        let config = ParserConfig::from_json(r#"{"logic_tokens": {"ET": "AND", "OU": "OR"}}"#)
            .unwrap();
        let parser = Parser::with_config(config);

        let predicate = parser.parse("(n > 1) ET (n < 5) OU (n == 9)").unwrap();
        assert_eq!(predicate.logic(), &[LogicOperator::And, LogicOperator::Or]);
        assert!(parser.parse("(n > 1) AND (n < 5)").is_err());
    }

    #[test]
    fn test_display_uses_canonical_connectors() {
        let config = ParserConfig::from_json(r#"{"logic_tokens": {"ET": "AND", "OU": "OR"}}"#)
            .unwrap();
        let parser = Parser::with_config(config);

        let predicate = parser.parse("(n > 1) ET (n < 5)").unwrap();
        let text = predicate.to_string();
        assert_eq!(text, "(n > 1) AND (n < 5)");
        assert!(parser.parse(&text).is_err());
        assert_eq!(parse(&text).unwrap(), predicate);
    }

    #[test]
    fn test_display_parses_back() {
        let predicate = parse("(a >= 0x10) || (b != -3) && (c < 017)").unwrap();
        let reparsed = parse(&predicate.to_string()).unwrap();
        assert_eq!(reparsed, predicate);
    }
}
