//! Compiled predicate cache - shared across threads with fast hashing

use std::sync::Arc;

use ahash::AHashMap;
use log::{debug, info};
use once_cell::sync::Lazy;
use parking_lot::RwLock;

use crate::config::ParserConfig;
use crate::error::Result;
use crate::predicate::ast::Predicate;
use crate::predicate::parser::Parser;

/// Parser used for every cache miss
static PARSER: Lazy<RwLock<Arc<Parser>>> = Lazy::new(|| RwLock::new(Arc::new(Parser::new())));

/// Global predicate cache keyed by source text (ahash)
static PREDICATE_CACHE: Lazy<RwLock<AHashMap<String, Arc<Predicate>>>> = Lazy::new(|| {
    let map = AHashMap::with_capacity(256);
    RwLock::new(map)
});

/// Install a new global parser configuration.
///
/// Cached predicates were compiled under the old token table, so the cache
/// is cleared. The parser is only swapped while the cache write lock is
/// held; lock order is always cache, then parser.
pub fn configure(config: ParserConfig) -> Result<()> {
    config.validate()?;
    info!(
        "predicate parser reconfigured: {} logic tokens, max_groups {:?}",
        config.logic_tokens.len(),
        config.max_groups
    );

    let mut cache = PREDICATE_CACHE.write();
    *PARSER.write() = Arc::new(Parser::with_config(config));
    cache.clear();
    Ok(())
}

/// Snapshot of the active global configuration
pub fn current_config() -> ParserConfig {
    PARSER.read().config().clone()
}

/// Get or parse a predicate string, using the cache for repeated text
#[inline]
pub fn get_or_parse(text: &str) -> Result<Arc<Predicate>> {
    // Fast path: check read lock first
    {
        let cache = PREDICATE_CACHE.read();
        if let Some(predicate) = cache.get(text) {
            return Ok(Arc::clone(predicate));
        }
    }

    debug!("predicate cache miss: {:?}", text);
    let parser = PARSER.read().clone();
    let predicate = Arc::new(parser.parse(text)?);

    Ok(insert_if_current(text, &parser, predicate))
}

/// Cache `predicate` unless `parser` was replaced while it was compiling.
///
/// A stale predicate is still returned to its caller, it just never lands
/// in the cache.
fn insert_if_current(text: &str, parser: &Arc<Parser>, predicate: Arc<Predicate>) -> Arc<Predicate> {
    let mut cache = PREDICATE_CACHE.write();
    if !Arc::ptr_eq(&*PARSER.read(), parser) {
        debug!("parser reconfigured during compile, not caching {:?}", text);
        return predicate;
    }

    // Another thread may have won the race; keep whichever landed first
    let entry = cache.entry(text.to_string()).or_insert(predicate);
    Arc::clone(entry)
}

/// Check `value` against a predicate string, using the cached predicate
#[inline]
pub fn check(text: &str, value: i64) -> Result<bool> {
    let predicate = get_or_parse(text)?;
    Ok(predicate.evaluate(value))
}

/// Whether `text` currently has a compiled predicate in the cache
pub fn is_cached(text: &str) -> bool {
    PREDICATE_CACHE.read().contains_key(text)
}

pub fn clear_cache() {
    let mut cache = PREDICATE_CACHE.write();
    cache.clear();
}

pub fn cache_size() -> usize {
    let cache = PREDICATE_CACHE.read();
    cache.len()
}
