//! Lifecycle operations over translation units.

use crate::error::{Error, Result};
use crate::translation::store::TranslationStore;
use crate::translation::unit::{ObjectRef, TranslationStatus, TranslationUnit, UnitKey};
use chrono::Utc;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Which fields of which model are translatable.
///
/// An explicit value handed to the manager and the seeding observer at
/// construction time, so tests and tenants never share mutable state.
#[derive(Debug, Clone, Default)]
pub struct TranslatableFields {
    fields: BTreeMap<String, Vec<String>>,
}

impl TranslatableFields {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the translatable fields of one model label.
    pub fn register(mut self, model_label: &str, fields: &[&str]) -> Self {
        self.fields.insert(
            model_label.to_string(),
            fields.iter().map(|f| f.to_string()).collect(),
        );
        self
    }

    /// Translatable fields of a model; empty for unregistered models.
    pub fn fields_for(&self, model_label: &str) -> &[String] {
        self.fields.get(model_label).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn is_registered(&self, model_label: &str) -> bool {
        self.fields.contains_key(model_label)
    }
}

/// Input for creating one translation unit.
#[derive(Debug, Clone)]
pub struct NewTranslation {
    pub object: ObjectRef,
    pub field: String,
    pub source_locale: String,
    pub target_locale: String,
    pub source_text: String,
    pub target_text: Option<String>,
    pub status: TranslationStatus,
}

impl NewTranslation {
    pub fn new(
        object: ObjectRef,
        field: &str,
        source_locale: &str,
        target_locale: &str,
        source_text: &str,
    ) -> Self {
        Self {
            object,
            field: field.to_string(),
            source_locale: source_locale.to_string(),
            target_locale: target_locale.to_string(),
            source_text: source_text.to_string(),
            target_text: None,
            status: TranslationStatus::Draft,
        }
    }

    pub fn with_target_text(mut self, text: &str) -> Self {
        self.target_text = Some(text.to_string());
        self
    }

    pub fn with_status(mut self, status: TranslationStatus) -> Self {
        self.status = status;
        self
    }
}

/// One entry of a bulk creation; locales are shared across the batch.
#[derive(Debug, Clone)]
pub struct BulkItem {
    pub object: ObjectRef,
    pub field: String,
    pub source_text: String,
    pub target_text: Option<String>,
}

/// Partial update of an existing unit.
#[derive(Debug, Clone, Default)]
pub struct TranslationPatch {
    pub target_text: Option<String>,
    pub status: Option<TranslationStatus>,
}

impl TranslationPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn target_text(mut self, text: &str) -> Self {
        self.target_text = Some(text.to_string());
        self
    }

    pub fn status(mut self, status: TranslationStatus) -> Self {
        self.status = Some(status);
        self
    }
}

/// Completion report for one object in one target locale.
///
/// Invariant: `translated_fields + pending_fields + missing_fields`
/// always equals `total_fields`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TranslationProgress {
    pub total_fields: usize,

    /// Fields with an approved, non-empty translation
    pub translated_fields: usize,

    /// Fields with a unit that is not yet displayable
    pub pending_fields: usize,

    /// Fields with no unit at all
    pub missing_fields: usize,

    /// `translated / total * 100`, rounded; 0 for zero fields
    pub completion_percentage: u8,
}

/// Creates, updates and reports on translation units.
pub struct TranslationManager {
    store: Arc<dyn TranslationStore>,
    fields: TranslatableFields,
}

impl TranslationManager {
    pub fn new(store: Arc<dyn TranslationStore>, fields: TranslatableFields) -> Self {
        Self { store, fields }
    }

    pub fn translatable_fields(&self) -> &TranslatableFields {
        &self.fields
    }

    /// Create exactly one unit. Never silently overwrites: a taken key is
    /// a `DuplicateUnit` error and mutation goes through `update_translation`.
    pub fn create_translation(
        &self,
        new: NewTranslation,
        user: Option<&str>,
    ) -> Result<TranslationUnit> {
        let now = Utc::now();
        let unit = TranslationUnit {
            key: UnitKey::new(new.object, &new.field, &new.target_locale),
            source_locale: new.source_locale,
            source_text: new.source_text,
            target_text: new.target_text,
            status: new.status,
            updated_by: user.map(str::to_string),
            created_at: now,
            updated_at: now,
        };
        self.store.insert(unit.clone())?;
        Ok(unit)
    }

    /// Apply a partial change to an existing unit and stamp the audit
    /// fields.
    pub fn update_translation(
        &self,
        key: &UnitKey,
        patch: TranslationPatch,
        user: Option<&str>,
    ) -> Result<TranslationUnit> {
        let mut unit = self
            .store
            .get(key)
            .ok_or_else(|| Error::UnitNotFound(key.clone()))?;

        if let Some(text) = patch.target_text {
            unit.target_text = Some(text);
        }
        if let Some(status) = patch.status {
            unit.status = status;
        }
        unit.updated_by = user.map(str::to_string);
        unit.updated_at = Utc::now();

        self.store.put(unit.clone());
        Ok(unit)
    }

    /// All units for one object in one target locale.
    pub fn get_translations_for_object(
        &self,
        object: &ObjectRef,
        target_locale: &str,
    ) -> Vec<TranslationUnit> {
        self.store.list_for_object(object, target_locale)
    }

    /// Create one unit per item, all-or-nothing: every key is checked free
    /// (against the store and within the batch) before anything is written.
    pub fn bulk_create_translations(
        &self,
        items: Vec<BulkItem>,
        source_locale: &str,
        target_locale: &str,
        user: Option<&str>,
    ) -> Result<Vec<TranslationUnit>> {
        let mut seen: Vec<UnitKey> = Vec::with_capacity(items.len());
        for item in &items {
            let key = UnitKey::new(item.object.clone(), &item.field, target_locale);
            if self.store.contains(&key) || seen.contains(&key) {
                return Err(Error::DuplicateUnit(key));
            }
            seen.push(key);
        }

        let mut created = Vec::with_capacity(items.len());
        for item in items {
            let new = NewTranslation {
                object: item.object,
                field: item.field,
                source_locale: source_locale.to_string(),
                target_locale: target_locale.to_string(),
                source_text: item.source_text,
                target_text: item.target_text,
                status: TranslationStatus::Draft,
            };
            created.push(self.create_translation(new, user)?);
        }
        Ok(created)
    }

    /// Completion report over an explicit field list.
    pub fn translation_progress(
        &self,
        object: &ObjectRef,
        target_locale: &str,
        fields: &[&str],
    ) -> TranslationProgress {
        let mut translated = 0;
        let mut pending = 0;
        let mut missing = 0;

        for field in fields {
            let key = UnitKey::new(object.clone(), field, target_locale);
            match self.store.get(&key) {
                Some(unit) if unit.is_displayable() => translated += 1,
                Some(_) => pending += 1,
                None => missing += 1,
            }
        }

        let total = fields.len();
        let completion_percentage = if total == 0 {
            0
        } else {
            ((translated as f64 / total as f64) * 100.0).round() as u8
        };

        TranslationProgress {
            total_fields: total,
            translated_fields: translated,
            pending_fields: pending,
            missing_fields: missing,
            completion_percentage,
        }
    }

    /// Completion report over the fields registered for the object's model.
    pub fn progress_for_registered(
        &self,
        object: &ObjectRef,
        target_locale: &str,
    ) -> TranslationProgress {
        let fields: Vec<&str> = self
            .fields
            .fields_for(&object.content_type)
            .iter()
            .map(String::as_str)
            .collect();
        self.translation_progress(object, target_locale, &fields)
    }
}
