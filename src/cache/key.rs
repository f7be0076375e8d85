//! Deterministic, namespaced cache key construction.
//!
//! Every key is `prefix:type_code:part:part:...`. Parts that are `None` or
//! empty are omitted; everything else appears verbatim, so identical
//! logical inputs always produce identical keys. High-cardinality inputs
//! (API params, search queries) are hashed to keep key length bounded.

use std::collections::BTreeMap;

/// Type code for rendered pages.
pub const PAGE: &str = "p";
/// Type code for generic content objects.
pub const CONTENT: &str = "c";
/// Type code for blog posts.
pub const BLOG: &str = "b";
/// Type code for API responses.
pub const API: &str = "a";
/// Type code for search results.
pub const SEARCH: &str = "s";
/// Type code for sitemaps.
pub const SITEMAP: &str = "sm";
/// Type code for SEO metadata.
pub const SEO: &str = "seo";

/// Token a root or empty page path normalizes to.
const HOME_TOKEN: &str = "home";

/// Hex length of hashed key segments.
const HASH_SEGMENT_LEN: usize = 16;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheKeyBuilder {
    prefix: String,
}

impl Default for CacheKeyBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl CacheKeyBuilder {
    /// Builder with the default "cms" prefix.
    pub fn new() -> Self {
        Self::with_prefix("cms")
    }

    pub fn with_prefix(prefix: &str) -> Self {
        Self {
            prefix: prefix.to_string(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Join `prefix:type_code:parts...`, omitting empty parts.
    pub fn build_key(&self, type_code: &str, parts: &[&str]) -> String {
        let mut segments = vec![self.prefix.as_str(), type_code];
        segments.extend(parts.iter().filter(|p| !p.is_empty()));
        segments.join(":")
    }

    /// Wildcard pattern covering every key under `prefix:type_code:parts`.
    pub fn pattern(&self, type_code: &str, parts: &[&str]) -> String {
        format!("{}:*", self.build_key(type_code, parts))
    }

    /// Key for a rendered page. `/` and the empty path normalize to the
    /// literal `home` token; surrounding slashes are stripped.
    pub fn page_key(&self, locale: &str, path: &str, revision: Option<&str>) -> String {
        let normalized = normalize_path(path);
        self.build_key(PAGE, &[locale, &normalized, revision.unwrap_or("")])
    }

    /// Key for a generic content object.
    pub fn content_key(
        &self,
        model_label: &str,
        locale: &str,
        slug: &str,
        revision: Option<&str>,
    ) -> String {
        self.build_key(CONTENT, &[model_label, locale, slug, revision.unwrap_or("")])
    }

    /// Key for a blog post, optionally pinned to post and page revisions.
    pub fn blog_key(
        &self,
        locale: &str,
        slug: &str,
        post_revision: Option<&str>,
        page_revision: Option<&str>,
    ) -> String {
        self.build_key(
            BLOG,
            &[
                locale,
                slug,
                post_revision.unwrap_or(""),
                page_revision.unwrap_or(""),
            ],
        )
    }

    /// Key for an API response. Parameters are hashed sorted, so the key
    /// is invariant under parameter order and stays bounded in length.
    pub fn api_key(&self, endpoint: &str, params: &BTreeMap<String, String>) -> String {
        if params.is_empty() {
            return self.build_key(API, &[endpoint]);
        }
        let hash = hash_segment(&encode_params(params));
        self.build_key(API, &[endpoint, &hash])
    }

    /// Key for a search result set: a hash of the query text plus, when
    /// filters are given, a second hash of the filters.
    pub fn search_key(&self, query: &str, filters: Option<&BTreeMap<String, String>>) -> String {
        let query_hash = hash_segment(query);
        match filters.filter(|f| !f.is_empty()) {
            Some(filters) => {
                let filter_hash = hash_segment(&encode_params(filters));
                self.build_key(SEARCH, &[&query_hash, &filter_hash])
            }
            None => self.build_key(SEARCH, &[&query_hash]),
        }
    }

    /// Key for a locale's sitemap.
    pub fn sitemap_key(&self, locale: &str) -> String {
        self.build_key(SITEMAP, &[locale])
    }

    /// Key for an object's SEO metadata.
    pub fn seo_key(&self, model_label: &str, object_id: &str, locale: &str) -> String {
        self.build_key(SEO, &[model_label, object_id, locale])
    }
}

fn normalize_path(path: &str) -> String {
    let trimmed = path.trim_matches('/');
    if trimmed.is_empty() {
        HOME_TOKEN.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Stable "k=v" encoding of sorted parameters for hashing.
fn encode_params(params: &BTreeMap<String, String>) -> String {
    params
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("&")
}

/// Short, stable hash of an arbitrary input (not a security boundary).
fn hash_segment(input: &str) -> String {
    blake3::hash(input.as_bytes()).to_hex()[..HASH_SEGMENT_LEN].to_string()
}
