//! Parsed-expression cache keyed by raw source text.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use skiplogic_ast::Expr;
use skiplogic_dsl::DslError;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CacheConfig {
    /// Maximum number of cached ASTs.
    pub capacity: usize,
    /// Entries dropped, oldest first, when an insert finds the cache full.
    pub eviction_batch: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { capacity: 1000, eviction_batch: 100 }
    }
}

#[derive(Default)]
struct CacheInner {
    entries: HashMap<String, Arc<Expr>>,
    /// Insertion order; lookups do not reorder.
    order: VecDeque<String>,
}

/// Bounded AST cache with insertion-order batch eviction.
///
/// Not an LRU: a hot expression ages out exactly like a cold one.
pub struct ExpressionCache {
    config: CacheConfig,
    inner: Mutex<CacheInner>,
}

impl ExpressionCache {
    pub fn new(config: CacheConfig) -> Self {
        Self { config, inner: Mutex::new(CacheInner::default()) }
    }

    pub fn config(&self) -> CacheConfig {
        self.config
    }

    pub fn get(&self, source: &str) -> Option<Arc<Expr>> {
        self.inner.lock().entries.get(source).cloned()
    }

    pub fn insert(&self, source: &str, expr: Arc<Expr>) {
        if self.config.capacity == 0 {
            return;
        }
        let mut inner = self.inner.lock();
        if inner.entries.contains_key(source) {
            return;
        }
        if inner.entries.len() >= self.config.capacity {
            let batch = self.config.eviction_batch.max(1).min(inner.order.len());
            let evicted: Vec<String> = inner.order.drain(..batch).collect();
            for key in &evicted {
                inner.entries.remove(key);
            }
            tracing::debug!(evicted = batch, remaining = inner.entries.len(), "expression cache eviction");
        }
        inner.order.push_back(source.to_string());
        inner.entries.insert(source.to_string(), expr);
    }

    /// Returns the cached AST or parses and caches it. Parse failures are not cached.
    pub fn get_or_parse<F>(&self, source: &str, parse: F) -> Result<Arc<Expr>, DslError>
    where
        F: FnOnce(&str) -> Result<Expr, DslError>,
    {
        if let Some(hit) = self.get(source) {
            return Ok(hit);
        }
        let expr = Arc::new(parse(source)?);
        self.insert(source, expr.clone());
        Ok(expr)
    }

    pub fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, source: &str) -> bool {
        self.inner.lock().entries.contains_key(source)
    }

    pub fn clear(&self) {
        let mut inner = self.inner.lock();
        inner.entries.clear();
        inner.order.clear();
    }
}

impl Default for ExpressionCache {
    fn default() -> Self {
        Self::new(CacheConfig::default())
    }
}
