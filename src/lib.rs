//! Int Predicate - compact integer predicate language
//!
//! Parses expressions such as `(n < 10) AND (n > 0)` once and evaluates them
//! against any number of integers. Comparisons are joined strictly left to
//! right, without precedence between `AND` and `OR`.
//!
//! ```
//! use int_predicate::predicate::parse;
//!
//! let predicate = parse("(n == 2) OR (n == 4)").unwrap();
//! assert!(predicate.evaluate(4));
//! assert!(!predicate.evaluate(3));
//! ```
//!
//! Python bindings are available through the `python` feature.

pub mod buffer;
pub mod config;
pub mod error;
pub mod predicate;

#[cfg(feature = "python")]
mod bindings;

pub use crate::config::ParserConfig;
pub use crate::error::{PredicateError, Result};
pub use crate::predicate::{
    evaluate, parse, ComparisonOperator, LogicOperator, Parser, Predicate,
};
