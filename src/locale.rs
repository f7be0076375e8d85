//! Locale metadata and fallback chain construction.
//!
//! A `Locale` points at most at one fallback locale; walking those pointers
//! from a target locale yields the ordered list of locales to consult when
//! no direct translation exists. The registry is an explicit value passed
//! to resolvers at construction time, not a process-wide singleton, so
//! tests and tenants can hold independent registries.

use crate::config::DEFAULT_MAX_FALLBACK_DEPTH;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

/// A single locale and its fallback pointer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Locale {
    /// Short locale code (e.g., "en", "pt-br")
    pub code: String,

    /// English name of the locale (e.g., "German")
    pub name: String,

    /// Native name of the locale (e.g., "Deutsch")
    pub native_name: String,

    /// Whether this is the default locale (at most one per registry)
    pub is_default: bool,

    /// Whether this locale is served; inactive locales are skipped during
    /// resolution but still forward to their fallback
    pub is_active: bool,

    /// Code of the locale consulted when this one has no translation
    pub fallback: Option<String>,
}

impl Locale {
    /// Create an active, non-default locale with no fallback.
    pub fn new(code: &str, name: &str) -> Self {
        Self {
            code: code.to_string(),
            name: name.to_string(),
            native_name: name.to_string(),
            is_default: false,
            is_active: true,
            fallback: None,
        }
    }

    /// Set the native name of the locale.
    pub fn with_native_name(mut self, native_name: &str) -> Self {
        self.native_name = native_name.to_string();
        self
    }

    /// Point this locale at a fallback locale.
    pub fn with_fallback(mut self, code: &str) -> Self {
        self.fallback = Some(code.to_string());
        self
    }

    /// Mark this locale as the registry default.
    pub fn default_locale(mut self) -> Self {
        self.is_default = true;
        self
    }

    /// Mark this locale as inactive.
    pub fn inactive(mut self) -> Self {
        self.is_active = false;
        self
    }
}

/// Registry of locales with validated, acyclic fallback pointers.
///
/// Registration order matters: a locale's fallback target must already be
/// registered, which rules out forward references and makes cycles
/// unconstructible through this API. `fallback_chain` still carries a
/// visited-set and depth guard so a registry assembled by other means
/// (bulk deserialization, direct field edits) can never loop forever.
#[derive(Debug, Clone, Default)]
pub struct LocaleRegistry {
    locales: BTreeMap<String, Locale>,
    default_code: Option<String>,
    max_depth: usize,
}

impl LocaleRegistry {
    /// Create an empty registry with the default chain depth bound.
    pub fn new() -> Self {
        Self {
            locales: BTreeMap::new(),
            default_code: None,
            max_depth: DEFAULT_MAX_FALLBACK_DEPTH,
        }
    }

    /// Create an empty registry with a custom chain depth bound.
    pub fn with_max_depth(max_depth: usize) -> Self {
        Self {
            max_depth,
            ..Self::new()
        }
    }

    /// Register a locale.
    ///
    /// # Errors
    /// - `DuplicateLocale` if the code is already registered
    /// - `DuplicateDefaultLocale` if a default locale already exists
    /// - `UnknownLocale` if the fallback target is not registered yet
    /// - `FallbackCycle` if the locale points back at itself
    pub fn register(&mut self, locale: Locale) -> Result<()> {
        if self.locales.contains_key(&locale.code) {
            return Err(Error::DuplicateLocale(locale.code));
        }

        if locale.is_default {
            if let Some(existing) = &self.default_code {
                return Err(Error::DuplicateDefaultLocale {
                    code: locale.code,
                    existing: existing.clone(),
                });
            }
        }

        if let Some(fallback) = &locale.fallback {
            if *fallback == locale.code {
                return Err(Error::FallbackCycle(locale.code));
            }
            if !self.locales.contains_key(fallback) {
                return Err(Error::UnknownLocale(fallback.clone()));
            }
        }

        if locale.is_default {
            self.default_code = Some(locale.code.clone());
        }
        self.locales.insert(locale.code.clone(), locale);
        Ok(())
    }

    /// Look up a locale by code.
    pub fn get(&self, code: &str) -> Option<&Locale> {
        self.locales.get(code)
    }

    /// The default locale, if one was registered.
    pub fn default_locale(&self) -> Option<&Locale> {
        self.default_code.as_deref().and_then(|c| self.locales.get(c))
    }

    /// All registered locale codes, sorted.
    pub fn codes(&self) -> Vec<&str> {
        self.locales.keys().map(String::as_str).collect()
    }

    /// Codes of active, non-default locales — the usual translation targets.
    pub fn target_codes(&self) -> Vec<String> {
        self.locales
            .values()
            .filter(|l| l.is_active && !l.is_default)
            .map(|l| l.code.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.locales.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locales.is_empty()
    }

    /// Build the ordered fallback chain for a locale.
    ///
    /// The chain starts with the locale itself, then its fallback, and so
    /// on until a locale without a fallback. A fallback pointer to an
    /// unregistered code simply ends the chain: callers must tolerate a
    /// chain that never reaches the default locale.
    ///
    /// # Errors
    /// - `UnknownLocale` if `code` itself is not registered
    /// - `FallbackCycle` if the pointers revisit a locale
    /// - `FallbackChainTooDeep` if the chain exceeds the depth bound
    pub fn fallback_chain(&self, code: &str) -> Result<Vec<&Locale>> {
        let start = self
            .locales
            .get(code)
            .ok_or_else(|| Error::UnknownLocale(code.to_string()))?;

        let mut chain = Vec::new();
        let mut visited: HashSet<&str> = HashSet::new();
        let mut current = start;

        loop {
            if !visited.insert(&current.code) {
                return Err(Error::FallbackCycle(current.code.clone()));
            }
            if chain.len() >= self.max_depth {
                return Err(Error::FallbackChainTooDeep {
                    code: code.to_string(),
                    limit: self.max_depth,
                });
            }
            chain.push(current);

            match current.fallback.as_deref().and_then(|f| self.locales.get(f)) {
                Some(next) => current = next,
                None => break,
            }
        }

        Ok(chain)
    }
}
