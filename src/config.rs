//! Parser configuration
//!
//! Controls which tokens are accepted as logic connectors and how many
//! groups a single predicate may contain. Loadable from JSON; missing fields
//! fall back to the defaults.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{PredicateError, Result};
use crate::predicate::LogicOperator;

/// Default logic connector tokens
pub const DEFAULT_LOGIC_TOKENS: [(&str, LogicOperator); 6] = [
    ("&&", LogicOperator::And),
    ("AND", LogicOperator::And),
    ("and", LogicOperator::And),
    ("||", LogicOperator::Or),
    ("OR", LogicOperator::Or),
    ("or", LogicOperator::Or),
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// Token text to connector
    pub logic_tokens: HashMap<String, LogicOperator>,
    /// Upper bound on groups per predicate; `None` means unbounded
    pub max_groups: Option<usize>,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            logic_tokens: DEFAULT_LOGIC_TOKENS
                .iter()
                .map(|(token, op)| (token.to_string(), *op))
                .collect(),
            max_groups: None,
        }
    }
}

impl ParserConfig {
    /// Parse and validate a JSON configuration.
    ///
    /// ```json
    /// {"logic_tokens": {"&&": "AND", "||": "OR"}, "max_groups": 16}
    /// ```
    pub fn from_json(json: &str) -> Result<Self> {
        let config: ParserConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_max_groups(mut self, max_groups: usize) -> Self {
        self.max_groups = Some(max_groups);
        self
    }

    pub fn with_logic_token(mut self, token: impl Into<String>, op: LogicOperator) -> Self {
        self.logic_tokens.insert(token.into(), op);
        self
    }

    #[inline]
    pub fn resolve_logic(&self, token: &str) -> Option<LogicOperator> {
        self.logic_tokens.get(token).copied()
    }

    /// Longest configured token that `text` starts with, as (byte length, op)
    pub fn match_logic_prefix(&self, text: &str) -> Option<(usize, LogicOperator)> {
        self.logic_tokens
            .iter()
            .filter(|(token, _)| text.starts_with(token.as_str()))
            .max_by_key(|(token, _)| token.len())
            .map(|(token, op)| (token.len(), *op))
    }

    /// Reject tokens the parser could never match
    pub fn validate(&self) -> Result<()> {
        if self.logic_tokens.is_empty() {
            return Err(PredicateError::Config("no logic tokens configured".to_string()));
        }

        for token in self.logic_tokens.keys() {
            // single characters are always rejected as dangling tokens
            if token.chars().count() < 2 {
                return Err(PredicateError::Config(format!(
                    "logic token {:?} must be at least 2 characters",
                    token
                )));
            }
            if token.chars().any(|c| c.is_whitespace() || c == '(' || c == ')') {
                return Err(PredicateError::Config(format!(
                    "logic token {:?} may not contain whitespace or parentheses",
                    token
                )));
            }
        }

        if self.max_groups == Some(0) {
            return Err(PredicateError::Config("max_groups must be at least 1".to_string()));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_tokens() {
        let config = ParserConfig::default();
        assert_eq!(config.resolve_logic("&&"), Some(LogicOperator::And));
        assert_eq!(config.resolve_logic("AND"), Some(LogicOperator::And));
        assert_eq!(config.resolve_logic("||"), Some(LogicOperator::Or));
        assert_eq!(config.resolve_logic("or"), Some(LogicOperator::Or));
        assert_eq!(config.resolve_logic("Or"), None);
        assert_eq!(config.max_groups, None);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_match_logic_prefix() {
        let config = ParserConfig::default().with_logic_token("ANDALSO", LogicOperator::Or);
        assert_eq!(config.match_logic_prefix("&&||"), Some((2, LogicOperator::And)));
        assert_eq!(config.match_logic_prefix("OR (n"), Some((2, LogicOperator::Or)));
        assert_eq!(config.match_logic_prefix("AND"), Some((3, LogicOperator::And)));
        assert_eq!(config.match_logic_prefix("ANDALSO"), Some((7, LogicOperator::Or)));
        assert_eq!(config.match_logic_prefix("XOR"), None);
        assert_eq!(config.match_logic_prefix("&"), None);
    }

    #[test]
    fn test_from_json_partial() {
        let config = ParserConfig::from_json(r#"{"max_groups": 3}"#).unwrap();
        assert_eq!(config.max_groups, Some(3));
        assert_eq!(config.resolve_logic("AND"), Some(LogicOperator::And));
    }

    #[test]
    fn test_from_json_custom_tokens() {
        let config =
            ParserConfig::from_json(r#"{"logic_tokens": {"ET": "AND", "OU": "OR"}}"#).unwrap();
        assert_eq!(config.resolve_logic("ET"), Some(LogicOperator::And));
        assert_eq!(config.resolve_logic("OU"), Some(LogicOperator::Or));
        assert_eq!(config.resolve_logic("AND"), None);
    }

    #[test]
    fn test_from_json_rejects_bad_input() {
        assert!(matches!(
            ParserConfig::from_json("not json"),
            Err(PredicateError::Config(_))
        ));
        assert!(ParserConfig::from_json(r#"{"logic_tokens": {"&": "AND"}}"#).is_err());
        assert!(ParserConfig::from_json(r#"{"logic_tokens": {"A B": "AND"}}"#).is_err());
        assert!(ParserConfig::from_json(r#"{"logic_tokens": {"XOR": "NAND"}}"#).is_err());
        assert!(ParserConfig::from_json(r#"{"logic_tokens": {}}"#).is_err());
        assert!(ParserConfig::from_json(r#"{"max_groups": 0}"#).is_err());
    }

    #[test]
    fn test_builders() {
        let config = ParserConfig::default()
            .with_max_groups(2)
            .with_logic_token("ALSO", LogicOperator::And);
        assert_eq!(config.max_groups, Some(2));
        assert_eq!(config.resolve_logic("ALSO"), Some(LogicOperator::And));
    }
}
