//! Read/write facade over a cache backend.
//!
//! Every operation treats the cache as optional acceleration: a missing
//! pattern-delete capability is a logged no-op, and callers fall back to
//! recomputation on any miss.

use crate::cache::backend::CacheBackend;
use serde::Serialize;
use serde_json::Value;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

#[derive(Debug, Default)]
struct CacheStats {
    hits: AtomicUsize,
    misses: AtomicUsize,
    sets: AtomicUsize,
    deletes: AtomicUsize,
}

/// Point-in-time view of the counters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CacheStatsSnapshot {
    pub hits: usize,
    pub misses: usize,
    pub sets: usize,
    pub deletes: usize,
    pub hit_rate: f64,
}

/// Cache facade with hit/miss accounting.
///
/// Cheap to clone; clones share the backend and the counters.
#[derive(Clone)]
pub struct CacheManager {
    backend: Arc<dyn CacheBackend>,
    stats: Arc<CacheStats>,
}

impl CacheManager {
    pub fn new(backend: Arc<dyn CacheBackend>) -> Self {
        Self {
            backend,
            stats: Arc::new(CacheStats::default()),
        }
    }

    pub fn get(&self, key: &str) -> Option<Value> {
        match self.backend.get(key) {
            Some(value) => {
                self.stats.hits.fetch_add(1, Ordering::Relaxed);
                debug!(key, "cache hit");
                Some(value)
            }
            None => {
                self.stats.misses.fetch_add(1, Ordering::Relaxed);
                debug!(key, "cache miss");
                None
            }
        }
    }

    pub fn set(&self, key: &str, value: Value, ttl: Duration) {
        self.stats.sets.fetch_add(1, Ordering::Relaxed);
        self.backend.set(key, value, ttl);
    }

    /// Read through the cache: on a miss, call `factory` once, store its
    /// result, and return it.
    ///
    /// No lock is held across the factory; concurrent callers may each
    /// compute on the same cold key, which is safe because identical
    /// inputs produce identical values.
    pub fn get_or_set<F>(&self, key: &str, ttl: Duration, factory: F) -> Value
    where
        F: FnOnce() -> Value,
    {
        if let Some(value) = self.get(key) {
            return value;
        }
        let value = factory();
        self.set(key, value.clone(), ttl);
        value
    }

    /// `get_or_set` with a fallible factory; a factory error is returned
    /// and nothing is cached.
    pub fn try_get_or_set<F>(&self, key: &str, ttl: Duration, factory: F) -> anyhow::Result<Value>
    where
        F: FnOnce() -> anyhow::Result<Value>,
    {
        if let Some(value) = self.get(key) {
            return Ok(value);
        }
        let value = factory()?;
        self.set(key, value.clone(), ttl);
        Ok(value)
    }

    pub fn delete(&self, key: &str) -> bool {
        self.stats.deletes.fetch_add(1, Ordering::Relaxed);
        self.backend.delete(key)
    }

    /// Best-effort wildcard deletion. Backends without the capability
    /// make this a no-op returning 0, never an error.
    pub fn delete_pattern(&self, pattern: &str) -> usize {
        match self.backend.as_pattern_deletable() {
            Some(backend) => {
                let deleted = backend.delete_pattern(pattern);
                self.stats.deletes.fetch_add(deleted, Ordering::Relaxed);
                debug!(pattern, deleted, "pattern delete");
                deleted
            }
            None => {
                debug!(pattern, "backend has no pattern delete, skipping");
                0
            }
        }
    }

    pub fn clear(&self) {
        self.backend.clear();
    }

    pub fn stats(&self) -> CacheStatsSnapshot {
        let hits = self.stats.hits.load(Ordering::Relaxed);
        let misses = self.stats.misses.load(Ordering::Relaxed);
        let total = hits + misses;
        CacheStatsSnapshot {
            hits,
            misses,
            sets: self.stats.sets.load(Ordering::Relaxed),
            deletes: self.stats.deletes.load(Ordering::Relaxed),
            hit_rate: if total > 0 {
                hits as f64 / total as f64
            } else {
                0.0
            },
        }
    }
}
