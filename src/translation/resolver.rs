//! Read-only resolution of field values along the locale fallback chain.

use crate::error::{Error, Result};
use crate::locale::{Locale, LocaleRegistry};
use crate::translation::store::TranslationStore;
use crate::translation::unit::{ObjectRef, TranslationStatus, UnitKey};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Per-field translation state in the resolver's target locale.
///
/// Unlike `resolve_field`, this reports on the target locale only, not the
/// fallback chain: an editor wants to know what is missing *here*, not
/// what some ancestor locale happens to cover.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldStatus {
    pub has_translation: bool,

    /// Workflow status of the unit; `None` when no unit exists.
    pub status: Option<TranslationStatus>,
}

impl FieldStatus {
    const MISSING: FieldStatus = FieldStatus {
        has_translation: false,
        status: None,
    };
}

/// Resolves display values for object fields in one target locale.
///
/// The fallback chain is computed once at construction; resolution is
/// deterministic over the current set of approved units and performs no
/// writes.
pub struct TranslationResolver {
    store: Arc<dyn TranslationStore>,
    chain: Vec<Locale>,
}

impl TranslationResolver {
    /// Build a resolver for `target_locale`.
    ///
    /// # Errors
    /// - `LocaleInactive` if the target locale is not active
    /// - any `fallback_chain` error (unknown locale, cycle, depth)
    pub fn new(
        store: Arc<dyn TranslationStore>,
        registry: &LocaleRegistry,
        target_locale: &str,
    ) -> Result<Self> {
        let chain: Vec<Locale> = registry
            .fallback_chain(target_locale)?
            .into_iter()
            .cloned()
            .collect();

        if !chain[0].is_active {
            return Err(Error::LocaleInactive(target_locale.to_string()));
        }

        Ok(Self { store, chain })
    }

    /// The locale this resolver targets.
    pub fn target_locale(&self) -> &str {
        &self.chain[0].code
    }

    /// The locales consulted, nearest first.
    pub fn chain(&self) -> &[Locale] {
        &self.chain
    }

    /// Resolve one field: the first approved, non-empty translation found
    /// while scanning the chain, or `None` when no locale has one.
    /// Inactive fallback locales are skipped but still forward the scan.
    pub fn resolve_field(&self, object: &ObjectRef, field: &str) -> Option<String> {
        for locale in &self.chain {
            if !locale.is_active {
                continue;
            }
            let key = UnitKey::new(object.clone(), field, &locale.code);
            if let Some(unit) = self.store.get(&key) {
                if unit.is_displayable() {
                    return unit.target_text;
                }
            }
        }
        None
    }

    /// Resolve one field with a caller-supplied default literal.
    pub fn resolve_field_or(&self, object: &ObjectRef, field: &str, default: &str) -> String {
        self.resolve_field(object, field)
            .unwrap_or_else(|| default.to_string())
    }

    /// Resolve several fields independently; no cross-field coupling.
    pub fn resolve_object(
        &self,
        object: &ObjectRef,
        fields: &[&str],
    ) -> BTreeMap<String, Option<String>> {
        fields
            .iter()
            .map(|f| (f.to_string(), self.resolve_field(object, f)))
            .collect()
    }

    /// Report, per field, whether a unit exists in the target locale and
    /// what its workflow status is.
    pub fn translation_status(
        &self,
        object: &ObjectRef,
        fields: &[&str],
    ) -> BTreeMap<String, FieldStatus> {
        let target = self.target_locale().to_string();
        fields
            .iter()
            .map(|f| {
                let key = UnitKey::new(object.clone(), f, &target);
                let status = match self.store.get(&key) {
                    Some(unit) => FieldStatus {
                        has_translation: true,
                        status: Some(unit.status),
                    },
                    None => FieldStatus::MISSING,
                };
                (f.to_string(), status)
            })
            .collect()
    }
}
