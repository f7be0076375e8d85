//! UI message catalog: static string localization with fallback chains.
//!
//! The same nearest-locale-wins resolution as field translation, applied
//! to a flat key/value catalog. Catalogs are seeded once (import commands,
//! fixtures) and then read per request locale; resolution batches the
//! chain lookups so rendering a whole catalog never does per-key scans.

use crate::error::{Error, Result};
use crate::locale::{Locale, LocaleRegistry};
use crate::translation::unit::TranslationStatus;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::{Arc, OnceLock};

/// A translatable UI string, identified by a dotted key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UiMessage {
    /// Unique dotted key (e.g., "forms.validation.min_length")
    pub key: String,

    /// Namespace, the key up to its last dot (e.g., "forms.validation")
    pub namespace: String,

    /// Text shown when no locale in the chain has an approved translation
    pub default_value: String,
}

impl UiMessage {
    /// Create a message; the namespace is derived from the key.
    pub fn new(key: &str, default_value: &str) -> Self {
        let namespace = key.rsplit_once('.').map(|(ns, _)| ns).unwrap_or("");
        Self {
            key: key.to_string(),
            namespace: namespace.to_string(),
            default_value: default_value.to_string(),
        }
    }
}

/// One locale's value for a UI message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UiMessageTranslation {
    pub key: String,
    pub locale: String,
    pub value: String,
    pub status: TranslationStatus,
}

/// Messages plus their per-locale translations, one per (key, locale).
#[derive(Debug, Clone, Default)]
pub struct UiMessageCatalog {
    messages: BTreeMap<String, UiMessage>,
    // locale -> key -> translation, shaped for whole-chain batch reads
    translations: BTreeMap<String, BTreeMap<String, UiMessageTranslation>>,
}

impl UiMessageCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a message. Keys are unique.
    pub fn add_message(&mut self, message: UiMessage) -> Result<()> {
        if self.messages.contains_key(&message.key) {
            return Err(Error::DuplicateMessageKey(message.key));
        }
        self.messages.insert(message.key.clone(), message);
        Ok(())
    }

    /// Register a translation for an existing message. One per
    /// (message, locale).
    pub fn add_translation(
        &mut self,
        key: &str,
        locale: &str,
        value: &str,
        status: TranslationStatus,
    ) -> Result<()> {
        if !self.messages.contains_key(key) {
            return Err(Error::UnknownMessageKey(key.to_string()));
        }
        let per_locale = self.translations.entry(locale.to_string()).or_default();
        if per_locale.contains_key(key) {
            return Err(Error::DuplicateMessageTranslation {
                key: key.to_string(),
                locale: locale.to_string(),
            });
        }
        per_locale.insert(
            key.to_string(),
            UiMessageTranslation {
                key: key.to_string(),
                locale: locale.to_string(),
                value: value.to_string(),
                status,
            },
        );
        Ok(())
    }

    pub fn get_message(&self, key: &str) -> Option<&UiMessage> {
        self.messages.get(key)
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    fn approved_value(&self, locale: &str, key: &str) -> Option<&str> {
        self.translations
            .get(locale)
            .and_then(|m| m.get(key))
            .filter(|t| t.status == TranslationStatus::Approved)
            .map(|t| t.value.as_str())
    }

    /// All approved translations for one locale.
    fn approved_for_locale(&self, locale: &str) -> BTreeMap<&str, &str> {
        self.translations
            .get(locale)
            .map(|per_key| {
                per_key
                    .values()
                    .filter(|t| t.status == TranslationStatus::Approved)
                    .map(|t| (t.key.as_str(), t.value.as_str()))
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Resolves UI messages for one target locale.
pub struct UiMessageResolver {
    catalog: Arc<UiMessageCatalog>,
    chain: Vec<Locale>,
}

impl UiMessageResolver {
    /// Build a resolver for `target_locale`; the chain is computed once.
    pub fn new(
        catalog: Arc<UiMessageCatalog>,
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

        Ok(Self { catalog, chain })
    }

    pub fn target_locale(&self) -> &str {
        &self.chain[0].code
    }

    /// Resolve one key: the first approved translation along the chain,
    /// then the message's own default value, then the caller default.
    pub fn resolve(&self, key: &str, default: Option<&str>) -> Option<String> {
        for locale in &self.chain {
            if !locale.is_active {
                continue;
            }
            if let Some(value) = self.catalog.approved_value(&locale.code, key) {
                return Some(value.to_string());
            }
        }
        self.catalog
            .get_message(key)
            .map(|m| m.default_value.clone())
            .or_else(|| default.map(str::to_string))
    }

    /// Resolve one key, then substitute named `{placeholder}` parameters.
    /// Substitution happens after resolution, never during lookup.
    pub fn resolve_with_params(
        &self,
        key: &str,
        default: Option<&str>,
        params: &BTreeMap<String, String>,
    ) -> Option<String> {
        self.resolve(key, default)
            .map(|text| apply_parameters(&text, params))
    }

    /// Resolve every known key in one pass.
    ///
    /// Fetches each chain locale's approved translations once instead of
    /// scanning per key.
    pub fn all_messages(&self) -> BTreeMap<String, String> {
        let per_locale: Vec<BTreeMap<&str, &str>> = self
            .chain
            .iter()
            .filter(|l| l.is_active)
            .map(|l| self.catalog.approved_for_locale(&l.code))
            .collect();

        self.catalog
            .messages
            .values()
            .map(|message| {
                let resolved = per_locale
                    .iter()
                    .find_map(|m| m.get(message.key.as_str()))
                    .map(|v| v.to_string())
                    .unwrap_or_else(|| message.default_value.clone());
                (message.key.clone(), resolved)
            })
            .collect()
    }

    /// Resolve every key in one namespace.
    pub fn namespace_messages(&self, namespace: &str) -> BTreeMap<String, String> {
        let mut all = self.all_messages();
        all.retain(|key, _| {
            self.catalog
                .get_message(key)
                .is_some_and(|m| m.namespace == namespace)
        });
        all
    }
}

static PLACEHOLDER_REGEX: OnceLock<Regex> = OnceLock::new();

/// Replace named `{placeholder}` tokens; unknown tokens are left as-is.
pub fn apply_parameters(text: &str, params: &BTreeMap<String, String>) -> String {
    let regex = PLACEHOLDER_REGEX
        .get_or_init(|| Regex::new(r"\{([A-Za-z0-9_]+)\}").expect("Placeholder regex is valid"));

    regex
        .replace_all(text, |caps: &regex::Captures<'_>| {
            let name = &caps[1];
            params
                .get(name)
                .cloned()
                .unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locale::Locale;

    fn registry() -> LocaleRegistry {
        let mut registry = LocaleRegistry::new();
        registry
            .register(Locale::new("en", "English").default_locale())
            .unwrap();
        registry
            .register(Locale::new("es", "Spanish").with_fallback("en"))
            .unwrap();
        registry
            .register(Locale::new("de", "German").with_fallback("es"))
            .unwrap();
        registry
    }

    fn catalog() -> UiMessageCatalog {
        let mut catalog = UiMessageCatalog::new();
        catalog
            .add_message(UiMessage::new("forms.required", "This field is required"))
            .unwrap();
        catalog
            .add_message(UiMessage::new(
                "forms.min_length",
                "Must be at least {min} characters",
            ))
            .unwrap();
        catalog
            .add_message(UiMessage::new("nav.home", "Home"))
            .unwrap();
        catalog
            .add_translation(
                "forms.required",
                "es",
                "Este campo es obligatorio",
                TranslationStatus::Approved,
            )
            .unwrap();
        catalog
            .add_translation(
                "forms.min_length",
                "es",
                "Debe tener al menos {min} caracteres",
                TranslationStatus::Approved,
            )
            .unwrap();
        catalog
            .add_translation("nav.home", "es", "Inicio", TranslationStatus::Pending)
            .unwrap();
        catalog
    }

    fn resolver(target: &str) -> UiMessageResolver {
        UiMessageResolver::new(Arc::new(catalog()), &registry(), target).expect("Should build")
    }

    // ==================== Catalog Tests ====================

    #[test]
    fn test_namespace_derived_from_key() {
        let message = UiMessage::new("forms.validation.min_length", "x");
        assert_eq!(message.namespace, "forms.validation");

        let bare = UiMessage::new("welcome", "x");
        assert_eq!(bare.namespace, "");
    }

    #[test]
    fn test_duplicate_message_key_rejected() {
        let mut catalog = catalog();
        let result = catalog.add_message(UiMessage::new("nav.home", "Home again"));
        assert!(matches!(result, Err(Error::DuplicateMessageKey(k)) if k == "nav.home"));
    }

    #[test]
    fn test_translation_requires_known_key() {
        let mut catalog = catalog();
        let result =
            catalog.add_translation("nav.missing", "es", "x", TranslationStatus::Approved);
        assert!(matches!(result, Err(Error::UnknownMessageKey(_))));
    }

    #[test]
    fn test_one_translation_per_message_and_locale() {
        let mut catalog = catalog();
        let result = catalog.add_translation(
            "nav.home",
            "es",
            "Portada",
            TranslationStatus::Approved,
        );
        assert!(matches!(
            result,
            Err(Error::DuplicateMessageTranslation { key, locale })
                if key == "nav.home" && locale == "es"
        ));
    }

    // ==================== Resolution Tests ====================

    #[test]
    fn test_resolve_walks_chain_to_es() {
        let resolver = resolver("de");
        assert_eq!(
            resolver.resolve("forms.required", None).as_deref(),
            Some("Este campo es obligatorio")
        );
    }

    #[test]
    fn test_resolve_skips_unapproved_translation() {
        // nav.home has only a pending es translation.
        let resolver = resolver("de");
        assert_eq!(resolver.resolve("nav.home", None).as_deref(), Some("Home"));
    }

    #[test]
    fn test_resolve_falls_back_to_default_value() {
        let resolver = resolver("en");
        assert_eq!(
            resolver.resolve("forms.required", None).as_deref(),
            Some("This field is required")
        );
    }

    #[test]
    fn test_resolve_unknown_key_uses_caller_default() {
        let resolver = resolver("de");
        assert_eq!(
            resolver.resolve("nav.missing", Some("???")).as_deref(),
            Some("???")
        );
        assert_eq!(resolver.resolve("nav.missing", None), None);
    }

    #[test]
    fn test_resolve_with_params_substitutes_after_resolution() {
        let resolver = resolver("de");
        let mut params = BTreeMap::new();
        params.insert("min".to_string(), "8".to_string());

        assert_eq!(
            resolver
                .resolve_with_params("forms.min_length", None, &params)
                .as_deref(),
            Some("Debe tener al menos 8 caracteres")
        );
    }

    // ==================== Batch Resolution Tests ====================

    #[test]
    fn test_all_messages_resolves_every_key() {
        let resolver = resolver("de");
        let all = resolver.all_messages();

        assert_eq!(all.len(), 3);
        assert_eq!(all["forms.required"], "Este campo es obligatorio");
        assert_eq!(all["nav.home"], "Home");
    }

    #[test]
    fn test_all_messages_matches_per_key_resolution() {
        let resolver = resolver("de");
        for (key, value) in resolver.all_messages() {
            assert_eq!(resolver.resolve(&key, None).as_deref(), Some(value.as_str()));
        }
    }

    #[test]
    fn test_namespace_messages_filters() {
        let resolver = resolver("de");
        let forms = resolver.namespace_messages("forms");

        assert_eq!(forms.len(), 2);
        assert!(forms.contains_key("forms.required"));
        assert!(!forms.contains_key("nav.home"));
    }

    // ==================== Placeholder Tests ====================

    #[test]
    fn test_apply_parameters_replaces_named_tokens() {
        let mut params = BTreeMap::new();
        params.insert("min".to_string(), "3".to_string());
        params.insert("max".to_string(), "10".to_string());

        assert_eq!(
            apply_parameters("Between {min} and {max}", &params),
            "Between 3 and 10"
        );
    }

    #[test]
    fn test_apply_parameters_leaves_unknown_tokens() {
        let params = BTreeMap::new();
        assert_eq!(apply_parameters("Need {min} chars", &params), "Need {min} chars");
    }

    #[test]
    fn test_apply_parameters_repeated_token() {
        let mut params = BTreeMap::new();
        params.insert("name".to_string(), "Ada".to_string());
        assert_eq!(
            apply_parameters("{name} and {name}", &params),
            "Ada and Ada"
        );
    }
}
