//! Predicate evaluator

use std::sync::Arc;

use smallvec::SmallVec;

use crate::error::{PredicateError, Result};
use crate::predicate::ast::{Predicate, INLINE_TERMS};

/// Evaluate a possibly absent predicate; an absent one is always false
pub fn evaluate(predicate: Option<&Predicate>, value: i64) -> bool {
    predicate.is_some_and(|p| p.evaluate(value))
}

/// Evaluate `values` against a shared predicate on tokio's blocking pool
pub async fn evaluate_batch(predicate: Arc<Predicate>, values: Vec<i64>) -> Result<Vec<bool>> {
    tokio::task::spawn_blocking(move || predicate.evaluate_many(&values))
        .await
        .map_err(|e| PredicateError::Evaluation(format!("evaluation task failed: {}", e)))
}

impl Predicate {
    /// Apply every comparison to `value`, in source order
    pub fn evaluate_terms(&self, value: i64) -> SmallVec<[bool; INLINE_TERMS]> {
        self.terms().map(|(op, number)| op.apply(value, number)).collect()
    }

    /// Fold the comparison results left to right through the logic operators
    pub fn evaluate(&self, value: i64) -> bool {
        let mut terms = self.terms().map(|(op, number)| op.apply(value, number));
        let first = terms.next().unwrap_or(false);

        self.logic()
            .iter()
            .zip(terms)
            .fold(first, |acc, (logic, term)| logic.apply(acc, term))
    }

    pub fn evaluate_many(&self, values: &[i64]) -> Vec<bool> {
        values.iter().map(|&value| self.evaluate(value)).collect()
    }
}
