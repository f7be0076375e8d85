//! Storage seam for translation units.
//!
//! The rest of the crate only depends on the `TranslationStore` trait;
//! deployments back it with their database of choice. The in-memory
//! implementation here is the reference store and what the tests use.
//! Uniqueness per `UnitKey` is enforced hard at this layer rather than by
//! caller convention.

use crate::error::{Error, Result};
use crate::translation::unit::{ObjectRef, TranslationUnit, UnitKey};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

pub trait TranslationStore: Send + Sync {
    /// Insert a new unit. Fails with `DuplicateUnit` when the key is taken.
    fn insert(&self, unit: TranslationUnit) -> Result<()>;

    /// Overwrite a unit unconditionally (used for updates).
    fn put(&self, unit: TranslationUnit);

    /// Fetch a unit by key.
    fn get(&self, key: &UnitKey) -> Option<TranslationUnit>;

    /// Whether a unit exists for the key.
    fn contains(&self, key: &UnitKey) -> bool {
        self.get(key).is_some()
    }

    /// All units for one object in one target locale, across fields.
    fn list_for_object(&self, object: &ObjectRef, target_locale: &str) -> Vec<TranslationUnit>;

    /// Total number of stored units.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// In-memory reference store, keyed by `UnitKey`.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTranslationStore {
    units: Arc<Mutex<BTreeMap<UnitKey, TranslationUnit>>>,
}

impl InMemoryTranslationStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, BTreeMap<UnitKey, TranslationUnit>> {
        // A poisoned lock only means another thread panicked mid-write;
        // the map itself is still coherent for last-write-wins semantics.
        self.units.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl TranslationStore for InMemoryTranslationStore {
    fn insert(&self, unit: TranslationUnit) -> Result<()> {
        let mut units = self.lock();
        if units.contains_key(&unit.key) {
            return Err(Error::DuplicateUnit(unit.key));
        }
        units.insert(unit.key.clone(), unit);
        Ok(())
    }

    fn put(&self, unit: TranslationUnit) {
        self.lock().insert(unit.key.clone(), unit);
    }

    fn get(&self, key: &UnitKey) -> Option<TranslationUnit> {
        self.lock().get(key).cloned()
    }

    fn list_for_object(&self, object: &ObjectRef, target_locale: &str) -> Vec<TranslationUnit> {
        self.lock()
            .values()
            .filter(|u| u.key.object == *object && u.key.target_locale == target_locale)
            .cloned()
            .collect()
    }

    fn len(&self) -> usize {
        self.lock().len()
    }
}
