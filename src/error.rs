//! Error types for predicate parsing and evaluation

use std::fmt;

use thiserror::Error;

/// Which operator table a token failed to resolve against
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperatorKind {
    Comparison,
    Logic,
}

impl fmt::Display for OperatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OperatorKind::Comparison => f.write_str("comparison"),
            OperatorKind::Logic => f.write_str("logic"),
        }
    }
}

/// Main error type for the predicate engine
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PredicateError {
    #[error("Allocation failed for {requested} predicate terms")]
    Allocation { requested: usize },

    #[error("Invalid syntax: {0}")]
    InvalidSyntax(String),

    #[error("Unrecognized {kind} operator: {token:?}")]
    UnrecognizedOperator { kind: OperatorKind, token: String },

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Evaluation error: {0}")]
    Evaluation(String),
}

impl PredicateError {
    /// Build an `InvalidSyntax` error from anything printable
    pub(crate) fn syntax(msg: impl Into<String>) -> Self {
        PredicateError::InvalidSyntax(msg.into())
    }

    /// True for malformed input, including unknown operator tokens
    pub fn is_syntax_error(&self) -> bool {
        matches!(
            self,
            PredicateError::InvalidSyntax(_) | PredicateError::UnrecognizedOperator { .. }
        )
    }
}

impl From<serde_json::Error> for PredicateError {
    fn from(err: serde_json::Error) -> Self {
        PredicateError::Config(err.to_string())
    }
}

#[cfg(feature = "python")]
impl From<PredicateError> for pyo3::PyErr {
    fn from(err: PredicateError) -> pyo3::PyErr {
        use pyo3::exceptions::{PyMemoryError, PyRuntimeError, PyValueError};

        match err {
            PredicateError::Allocation { .. } => PyMemoryError::new_err(err.to_string()),
            PredicateError::InvalidSyntax(_)
            | PredicateError::UnrecognizedOperator { .. }
            | PredicateError::Config(_) => PyValueError::new_err(err.to_string()),
            PredicateError::Evaluation(_) => PyRuntimeError::new_err(err.to_string()),
        }
    }
}

/// Result type alias for the predicate engine
pub type Result<T> = std::result::Result<T, PredicateError>;
