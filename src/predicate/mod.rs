//! Predicate parsing and evaluation module
//!
//! This module handles parsing predicate strings like "(n < 10) AND (n > 0)"
//! and evaluating them against an integer.

mod ast;
pub mod cache;
mod evaluator;
pub mod parser;


pub use ast::*;
pub use cache::*;
pub use evaluator::*;
pub use parser::*;
