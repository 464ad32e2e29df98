//! Python bindings via PyO3 (enabled by the `python` feature)

use std::collections::HashMap;
use std::sync::Arc;

use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use pyo3::types::PyDict;

use crate::config::ParserConfig;
use crate::error::PredicateError;
use crate::predicate::{cache, evaluate_batch, LogicOperator, Predicate};

// ============================================================================
// Predicate PyClass
// ============================================================================

/// Compiled predicate shared with the Rust-side cache.
///
/// The wrapped predicate is immutable, so one instance can be evaluated from
/// any number of Python threads.
#[pyclass(name = "Predicate", module = "int_predicate", frozen)]
pub struct PyPredicate {
    inner: Arc<Predicate>,
}

#[pymethods]
impl PyPredicate {
    /// Compile `text`, reusing a cached predicate when available
    #[new]
    fn new(text: &str) -> PyResult<Self> {
        Ok(Self {
            inner: cache::get_or_parse(text)?,
        })
    }

    fn evaluate(&self, value: i64) -> bool {
        self.inner.evaluate(value)
    }

    fn evaluate_many(&self, values: Vec<i64>) -> Vec<bool> {
        self.inner.evaluate_many(&values)
    }

    /// Per-comparison results for `value`, before the logic fold
    fn terms(&self, value: i64) -> Vec<bool> {
        self.inner.evaluate_terms(value).into_vec()
    }

    #[getter]
    fn numbers(&self) -> Vec<i64> {
        self.inner.numbers().to_vec()
    }

    #[getter]
    fn comparisons(&self) -> Vec<&'static str> {
        self.inner.comparisons().iter().map(|op| op.token()).collect()
    }

    #[getter]
    fn logic(&self) -> Vec<&'static str> {
        self.inner.logic().iter().map(|op| op.name()).collect()
    }

    fn to_json(&self) -> PyResult<String> {
        serde_json::to_string(self.inner.as_ref()).map_err(|e| PyValueError::new_err(e.to_string()))
    }

    fn __len__(&self) -> usize {
        self.inner.count_cmp()
    }

    fn __str__(&self) -> String {
        self.inner.to_string()
    }

    fn __repr__(&self) -> String {
        format!("Predicate({:?})", self.inner.to_string())
    }
}

// ============================================================================
// Python Functions
// ============================================================================

/// Replace the global parser configuration
///
/// # Arguments
/// * `config` - `{"logic_tokens": {"&&": "AND", ...}, "max_groups": 16}`;
///   missing keys keep their defaults
#[pyfunction]
fn init_config(config: &Bound<'_, PyDict>) -> PyResult<()> {
    let mut parsed = ParserConfig::default();

    if let Some(tokens) = config.get_item("logic_tokens")? {
        if !tokens.is_none() {
            let tokens: HashMap<String, String> = tokens.extract()?;
            parsed.logic_tokens = tokens
                .into_iter()
                .map(|(token, name)| Ok((token, name.parse::<LogicOperator>()?)))
                .collect::<Result<_, PredicateError>>()?;
        }
    }

    if let Some(max_groups) = config.get_item("max_groups")? {
        parsed.max_groups = max_groups.extract()?;
    }

    cache::configure(parsed)?;
    Ok(())
}

/// Check `value` against a predicate string (cached)
#[pyfunction]
#[pyo3(name = "check")]
fn check_value(text: &str, value: i64) -> PyResult<bool> {
    Ok(cache::check(text, value)?)
}

/// Check if a predicate string is already compiled
#[pyfunction]
fn is_cached(text: &str) -> bool {
    cache::is_cached(text)
}

/// Evaluate many values asynchronously
///
/// The predicate is compiled up front so syntax errors raise immediately;
/// evaluation runs on Tokio's blocking pool.
///
/// # Example (Python)
/// ```python
/// results = await evaluate_async("(n > 0) AND (n < 10)", [1, 5, 12])
/// ```
#[pyfunction]
fn evaluate_async<'py>(
    py: Python<'py>,
    text: &str,
    values: Vec<i64>,
) -> PyResult<Bound<'py, PyAny>> {
    let predicate = cache::get_or_parse(text)?;

    pyo3_async_runtimes::tokio::future_into_py(py, async move {
        let results = evaluate_batch(predicate, values).await?;
        Ok(results)
    })
}

// ============================================================================
// Python Module Definition
// ============================================================================

#[pymodule]
fn int_predicate(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(init_config, m)?)?;
    m.add_function(wrap_pyfunction!(check_value, m)?)?;
    m.add_function(wrap_pyfunction!(is_cached, m)?)?;
    m.add_function(wrap_pyfunction!(evaluate_async, m)?)?;
    m.add_class::<PyPredicate>()?;
    Ok(())
}
