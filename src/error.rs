//! Typed errors for the CMS core.
//!
//! Fallback-chain violations and uniqueness conflicts are hard errors;
//! a missing translation is never an error (it falls through the chain).

use crate::translation::unit::UnitKey;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Unknown locale code: '{0}'")]
    UnknownLocale(String),

    #[error("Locale '{0}' is already registered")]
    DuplicateLocale(String),

    #[error("Locale '{0}' is not active")]
    LocaleInactive(String),

    #[error("Locale '{code}' cannot be the default: '{existing}' already is")]
    DuplicateDefaultLocale { code: String, existing: String },

    #[error("No default locale is registered")]
    NoDefaultLocale,

    #[error("Fallback cycle detected at locale '{0}'")]
    FallbackCycle(String),

    #[error("Fallback chain for '{code}' exceeds the maximum depth of {limit}")]
    FallbackChainTooDeep { code: String, limit: usize },

    #[error("Translation unit already exists for {0}")]
    DuplicateUnit(UnitKey),

    #[error("No translation unit found for {0}")]
    UnitNotFound(UnitKey),

    #[error("Invalid translation status: '{0}'")]
    InvalidStatus(String),

    #[error("UI message '{0}' is already registered")]
    DuplicateMessageKey(String),

    #[error("Unknown UI message key: '{0}'")]
    UnknownMessageKey(String),

    #[error("UI message '{key}' already has a translation for locale '{locale}'")]
    DuplicateMessageTranslation { key: String, locale: String },
}

pub type Result<T> = std::result::Result<T, Error>;
