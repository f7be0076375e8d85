//! Runtime configuration for the CMS core.
//!
//! All settings have sensible defaults so the crate works out of the box;
//! `CoreConfig::from_env()` overrides them from the environment the way a
//! deployment would.

use anyhow::{Context, Result};
use std::time::Duration;

/// Default maximum number of locales a fallback chain may visit.
pub const DEFAULT_MAX_FALLBACK_DEPTH: usize = 8;

#[derive(Debug, Clone)]
pub struct CoreConfig {
    /// Namespace prefix for every cache key (default "cms")
    pub cache_prefix: String,

    /// TTL for rendered pages
    pub page_ttl: Duration,

    /// TTL for generic content objects
    pub content_ttl: Duration,

    /// TTL for blog posts
    pub blog_ttl: Duration,

    /// TTL for API responses
    pub api_ttl: Duration,

    /// TTL for search results
    pub search_ttl: Duration,

    /// TTL for sitemaps
    pub sitemap_ttl: Duration,

    /// TTL for SEO metadata
    pub seo_ttl: Duration,

    /// Upper bound on fallback chain length (guards mis-seeded registries)
    pub max_fallback_depth: usize,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            cache_prefix: "cms".to_string(),
            page_ttl: Duration::from_secs(30 * 60),
            content_ttl: Duration::from_secs(60 * 60),
            blog_ttl: Duration::from_secs(30 * 60),
            api_ttl: Duration::from_secs(10 * 60),
            search_ttl: Duration::from_secs(15 * 60),
            sitemap_ttl: Duration::from_secs(6 * 60 * 60),
            seo_ttl: Duration::from_secs(60 * 60),
            max_fallback_depth: DEFAULT_MAX_FALLBACK_DEPTH,
        }
    }
}

impl CoreConfig {
    /// Load configuration from environment variables, falling back to the
    /// defaults for anything unset. A variable that is set but unparseable
    /// is a hard error rather than a silent default.
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        Ok(Self {
            cache_prefix: std::env::var("CMS_CACHE_PREFIX").unwrap_or(defaults.cache_prefix),
            page_ttl: env_secs("CMS_PAGE_TTL_SECS", defaults.page_ttl)?,
            content_ttl: env_secs("CMS_CONTENT_TTL_SECS", defaults.content_ttl)?,
            blog_ttl: env_secs("CMS_BLOG_TTL_SECS", defaults.blog_ttl)?,
            api_ttl: env_secs("CMS_API_TTL_SECS", defaults.api_ttl)?,
            search_ttl: env_secs("CMS_SEARCH_TTL_SECS", defaults.search_ttl)?,
            sitemap_ttl: env_secs("CMS_SITEMAP_TTL_SECS", defaults.sitemap_ttl)?,
            seo_ttl: env_secs("CMS_SEO_TTL_SECS", defaults.seo_ttl)?,
            max_fallback_depth: env_parse("CMS_MAX_FALLBACK_DEPTH", defaults.max_fallback_depth)?,
        })
    }
}

/// Read an env var as a whole number of seconds.
fn env_secs(name: &str, default: Duration) -> Result<Duration> {
    Ok(Duration::from_secs(env_parse(name, default.as_secs())?))
}

/// Read and parse an env var, keeping the default when unset.
fn env_parse<T: std::str::FromStr>(name: &str, default: T) -> Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(name) {
        Ok(raw) => raw
            .parse()
            .with_context(|| format!("{} has an invalid value: '{}'", name, raw)),
        Err(_) => Ok(default),
    }
}
