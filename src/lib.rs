//! Locale-aware translation resolution and cache invalidation core for a
//! headless CMS.
//!
//! This crate contains the storage-agnostic heart of the platform: locale
//! fallback chains, per-object translation units with a review workflow,
//! a UI string catalog, deterministic cache key construction, and a cache
//! facade with event-driven invalidation.
//!
//! # Architecture
//!
//! - `locale`: `Locale` metadata and the `LocaleRegistry` that builds
//!   acyclic fallback chains
//! - `translation`: translation units, the store seam, the read-only
//!   resolver and the lifecycle manager
//! - `messages`: UI message catalog and its fallback-chain resolver
//! - `cache`: namespaced key builder, backend trait and cache manager
//! - `events`: synchronous observer bus wiring content mutations to cache
//!   invalidation and translation seeding
//!
//! # Example
//!
//! ```rust,ignore
//! use cms_core::locale::{Locale, LocaleRegistry};
//! use cms_core::translation::TranslationResolver;
//!
//! let mut registry = LocaleRegistry::new();
//! registry.register(Locale::new("en", "English").default_locale())?;
//! registry.register(Locale::new("de", "German").with_fallback("en"))?;
//!
//! let resolver = TranslationResolver::new(store, &registry, "de")?;
//! let title = resolver.resolve_field_or(&page, "title", "Untitled");
//! ```

pub mod cache;
pub mod config;
pub mod error;
pub mod events;
pub mod locale;
pub mod messages;
pub mod translation;

pub use config::CoreConfig;
pub use error::{Error, Result};
