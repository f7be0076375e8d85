//! Cache backend trait and the in-memory reference backend.
//!
//! Deployments wrap whatever store they run (in-process map, Redis, ...)
//! behind `CacheBackend`. Wildcard deletion is an optional capability:
//! backends that support it expose `PatternDeletable`, everyone else
//! reports `None` and callers degrade to a no-op.

use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

pub trait CacheBackend: Send + Sync {
    /// Fetch a live value; expired entries read as misses.
    fn get(&self, key: &str) -> Option<Value>;

    /// Store a value with a TTL.
    fn set(&self, key: &str, value: Value, ttl: Duration);

    /// Remove one key; true when something was removed.
    fn delete(&self, key: &str) -> bool;

    /// Remove everything.
    fn clear(&self);

    /// Wildcard deletion capability, when the backend has one.
    fn as_pattern_deletable(&self) -> Option<&dyn PatternDeletable> {
        None
    }
}

/// Optional capability: delete every key matching a `*` glob.
pub trait PatternDeletable {
    /// Returns the number of keys deleted.
    fn delete_pattern(&self, pattern: &str) -> usize;
}

#[derive(Debug, Clone)]
struct Entry {
    value: Value,
    created_at: Instant,
    ttl: Duration,
}

impl Entry {
    fn is_expired(&self) -> bool {
        self.created_at.elapsed() > self.ttl
    }
}

/// Process-local backend with per-entry TTLs.
#[derive(Debug, Clone, Default)]
pub struct InMemoryBackend {
    entries: Arc<Mutex<HashMap<String, Entry>>>,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Entry>> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Drop expired entries eagerly; returns how many were removed.
    /// Reads already treat expired entries as misses, this just frees
    /// memory between natural evictions.
    pub fn purge_expired(&self) -> usize {
        let mut entries = self.lock();
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired());
        before - entries.len()
    }

    /// Number of stored entries, expired ones included until purged.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

impl CacheBackend for InMemoryBackend {
    fn get(&self, key: &str) -> Option<Value> {
        let mut entries = self.lock();
        match entries.get(key) {
            Some(entry) if entry.is_expired() => {
                entries.remove(key);
                None
            }
            Some(entry) => Some(entry.value.clone()),
            None => None,
        }
    }

    fn set(&self, key: &str, value: Value, ttl: Duration) {
        self.lock().insert(
            key.to_string(),
            Entry {
                value,
                created_at: Instant::now(),
                ttl,
            },
        );
    }

    fn delete(&self, key: &str) -> bool {
        self.lock().remove(key).is_some()
    }

    fn clear(&self) {
        self.lock().clear();
    }

    fn as_pattern_deletable(&self) -> Option<&dyn PatternDeletable> {
        Some(self)
    }
}

impl PatternDeletable for InMemoryBackend {
    fn delete_pattern(&self, pattern: &str) -> usize {
        let mut entries = self.lock();
        let before = entries.len();
        entries.retain(|key, _| !glob_match(pattern, key));
        before - entries.len()
    }
}

/// Match a key against a glob where `*` spans any run of characters.
fn glob_match(pattern: &str, candidate: &str) -> bool {
    let mut pieces = pattern.split('*');
    let first = pieces.next().unwrap_or("");

    if !candidate.starts_with(first) {
        return false;
    }
    let mut rest = &candidate[first.len()..];

    let mut pieces = pieces.peekable();
    while let Some(piece) = pieces.next() {
        if pieces.peek().is_none() {
            // Last piece anchors at the end.
            return piece.is_empty() || rest.ends_with(piece);
        }
        match rest.find(piece) {
            Some(pos) => rest = &rest[pos + piece.len()..],
            None => return false,
        }
    }
    // No '*' at all: exact match required.
    rest.is_empty()
}
