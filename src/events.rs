//! Content mutation events and their observers.
//!
//! Invalidation is driven by an explicit, synchronous observer bus rather
//! than a framework-global dispatcher: callers dispatch a `ContentChange`
//! after a committed write, observers run in registration order, and an
//! observer failure is logged and skipped, never allowed to break the
//! write path or the remaining observers.

use crate::cache::{CacheKeyBuilder, CacheManager};
use crate::error::{Error, Result};
use crate::locale::LocaleRegistry;
use crate::translation::manager::TranslatableFields;
use crate::translation::store::TranslationStore;
use crate::translation::unit::{ObjectRef, TranslationStatus, TranslationUnit, UnitKey};
use chrono::Utc;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

/// What happened to the content object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Saved,
    Deleted,
}

/// Where the object lives, for cache key construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentAddress {
    Page {
        path: String,
        /// Path of the parent page, whose cached rendering embeds this one
        parent_path: Option<String>,
    },
    BlogPost {
        slug: String,
    },
}

/// One committed content mutation.
#[derive(Debug, Clone)]
pub struct ContentChange {
    pub kind: ChangeKind,
    pub object: ObjectRef,
    pub locale: String,
    pub address: ContentAddress,

    /// True when this save transitioned the object into the published state
    pub newly_published: bool,

    /// Current source-language field values; empty on delete
    pub fields: BTreeMap<String, String>,
}

impl ContentChange {
    pub fn saved(object: ObjectRef, locale: &str, address: ContentAddress) -> Self {
        Self {
            kind: ChangeKind::Saved,
            object,
            locale: locale.to_string(),
            address,
            newly_published: false,
            fields: BTreeMap::new(),
        }
    }

    pub fn deleted(object: ObjectRef, locale: &str, address: ContentAddress) -> Self {
        Self {
            kind: ChangeKind::Deleted,
            object,
            locale: locale.to_string(),
            address,
            newly_published: false,
            fields: BTreeMap::new(),
        }
    }

    pub fn published(mut self) -> Self {
        self.newly_published = true;
        self
    }

    pub fn with_field(mut self, name: &str, value: &str) -> Self {
        self.fields.insert(name.to_string(), value.to_string());
        self
    }
}

type Observer = Box<dyn Fn(&ContentChange) -> anyhow::Result<()> + Send + Sync>;

/// Synchronous observer list invoked after committed writes.
#[derive(Default)]
pub struct EventBus {
    observers: Vec<Observer>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe<F>(&mut self, observer: F)
    where
        F: Fn(&ContentChange) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.observers.push(Box::new(observer));
    }

    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }

    /// Invoke every observer in registration order. Failures are logged
    /// and counted; the remaining observers still run.
    pub fn dispatch(&self, change: &ContentChange) -> usize {
        let mut failures = 0;
        for (index, observer) in self.observers.iter().enumerate() {
            if let Err(error) = observer(change) {
                warn!(
                    index,
                    object = %change.object,
                    %error,
                    "content observer failed"
                );
                failures += 1;
            }
        }
        failures
    }
}

type RewarmFn = Box<dyn Fn(&ContentChange) -> anyhow::Result<Value> + Send + Sync>;

/// Drops the cache entries a content mutation staled and, on first
/// publish, re-warms the object's own entry write-through.
pub struct CacheInvalidator {
    cache: CacheManager,
    keys: CacheKeyBuilder,
    rewarm_ttl: Duration,
    rewarm: Option<RewarmFn>,
}

impl CacheInvalidator {
    pub fn new(cache: CacheManager, keys: CacheKeyBuilder, rewarm_ttl: Duration) -> Self {
        Self {
            cache,
            keys,
            rewarm_ttl,
            rewarm: None,
        }
    }

    /// Provide the renderer used for write-through re-warm on publish.
    pub fn with_rewarm<F>(mut self, rewarm: F) -> Self
    where
        F: Fn(&ContentChange) -> anyhow::Result<Value> + Send + Sync + 'static,
    {
        self.rewarm = Some(Box::new(rewarm));
        self
    }

    /// The object's own cache key.
    pub fn own_key(&self, change: &ContentChange) -> String {
        match &change.address {
            ContentAddress::Page { path, .. } => self.keys.page_key(&change.locale, path, None),
            ContentAddress::BlogPost { slug } => {
                self.keys.blog_key(&change.locale, slug, None, None)
            }
        }
    }

    /// Every key staled by the change: the object's own key, the parent
    /// page's key when hierarchical, and the locale's sitemap.
    pub fn invalidation_keys(&self, change: &ContentChange) -> Vec<String> {
        let mut keys = vec![self.own_key(change)];
        if let ContentAddress::Page {
            parent_path: Some(parent),
            ..
        } = &change.address
        {
            keys.push(self.keys.page_key(&change.locale, parent, None));
        }
        keys.push(self.keys.sitemap_key(&change.locale));
        keys
    }

    /// Invalidate, then re-warm on first publish. A re-warm failure is
    /// logged and swallowed: the entry just stays cold until the next
    /// read-through.
    pub fn handle(&self, change: &ContentChange) {
        for key in self.invalidation_keys(change) {
            self.cache.delete(&key);
        }

        if change.kind == ChangeKind::Saved && change.newly_published {
            if let Some(rewarm) = &self.rewarm {
                match rewarm(change) {
                    Ok(value) => {
                        self.cache.set(&self.own_key(change), value, self.rewarm_ttl);
                    }
                    Err(error) => {
                        warn!(object = %change.object, %error, "cache re-warm failed");
                    }
                }
            }
        }
    }

    pub fn register(self, bus: &mut EventBus) {
        bus.subscribe(move |change| {
            self.handle(change);
            Ok(())
        });
    }
}

/// Creates draft translation units for registered translatable fields
/// whenever a content object is saved, and keeps their source text in
/// sync with the object.
pub struct TranslationSeeder {
    store: Arc<dyn TranslationStore>,
    fields: TranslatableFields,
    source_locale: String,
    target_locales: Vec<String>,
}

impl TranslationSeeder {
    /// Snapshot the default locale and the active translation targets
    /// from the registry.
    pub fn new(
        store: Arc<dyn TranslationStore>,
        fields: TranslatableFields,
        registry: &LocaleRegistry,
    ) -> Result<Self> {
        let source_locale = registry
            .default_locale()
            .ok_or(Error::NoDefaultLocale)?
            .code
            .clone();

        Ok(Self {
            store,
            fields,
            source_locale,
            target_locales: registry.target_codes(),
        })
    }

    pub fn handle(&self, change: &ContentChange) -> Result<()> {
        if change.kind != ChangeKind::Saved {
            return Ok(());
        }

        for field in self.fields.fields_for(&change.object.content_type) {
            let Some(source_text) = change.fields.get(field) else {
                continue;
            };
            for target in &self.target_locales {
                let key = UnitKey::new(change.object.clone(), field, target);
                match self.store.get(&key) {
                    None => {
                        let now = Utc::now();
                        self.store.insert(TranslationUnit {
                            key,
                            source_locale: self.source_locale.clone(),
                            source_text: source_text.clone(),
                            target_text: None,
                            status: TranslationStatus::Draft,
                            updated_by: None,
                            created_at: now,
                            updated_at: now,
                        })?;
                    }
                    Some(mut existing) if existing.source_text != *source_text => {
                        existing.source_text = source_text.clone();
                        existing.updated_at = Utc::now();
                        self.store.put(existing);
                    }
                    Some(_) => {}
                }
            }
        }
        Ok(())
    }

    pub fn register(self, bus: &mut EventBus) {
        bus.subscribe(move |change| Ok(self.handle(change)?));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::InMemoryBackend;
    use crate::locale::Locale;
    use crate::translation::store::InMemoryTranslationStore;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const TTL: Duration = Duration::from_secs(60);

    fn page_change() -> ContentChange {
        ContentChange::saved(
            ObjectRef::new("page", "42"),
            "en",
            ContentAddress::Page {
                path: "/about/team".to_string(),
                parent_path: Some("/about".to_string()),
            },
        )
    }

    fn cache() -> CacheManager {
        CacheManager::new(Arc::new(InMemoryBackend::new()))
    }

    // ==================== EventBus Tests ====================

    #[test]
    fn test_observers_run_in_registration_order() {
        let order = Arc::new(std::sync::Mutex::new(Vec::new()));
        let mut bus = EventBus::new();
        for label in ["first", "second", "third"] {
            let order = Arc::clone(&order);
            bus.subscribe(move |_| {
                order.lock().unwrap().push(label);
                Ok(())
            });
        }

        bus.dispatch(&page_change());
        assert_eq!(*order.lock().unwrap(), vec!["first", "second", "third"]);
    }

    #[test]
    fn test_failing_observer_does_not_stop_the_rest() {
        let ran = Arc::new(AtomicUsize::new(0));
        let mut bus = EventBus::new();
        bus.subscribe(|_| anyhow::bail!("boom"));
        {
            let ran = Arc::clone(&ran);
            bus.subscribe(move |_| {
                ran.fetch_add(1, Ordering::Relaxed);
                Ok(())
            });
        }

        let failures = bus.dispatch(&page_change());
        assert_eq!(failures, 1);
        assert_eq!(ran.load(Ordering::Relaxed), 1);
    }

    // ==================== Invalidation Key Tests ====================

    #[test]
    fn test_page_invalidation_keys_include_parent_and_sitemap() {
        let invalidator = CacheInvalidator::new(cache(), CacheKeyBuilder::new(), TTL);
        let keys = invalidator.invalidation_keys(&page_change());

        assert_eq!(
            keys,
            vec![
                "cms:p:en:about/team".to_string(),
                "cms:p:en:about".to_string(),
                "cms:sm:en".to_string(),
            ]
        );
    }

    #[test]
    fn test_blog_invalidation_keys_have_no_parent() {
        let invalidator = CacheInvalidator::new(cache(), CacheKeyBuilder::new(), TTL);
        let change = ContentChange::saved(
            ObjectRef::new("blog.post", "7"),
            "de",
            ContentAddress::BlogPost {
                slug: "launch".to_string(),
            },
        );

        assert_eq!(
            invalidator.invalidation_keys(&change),
            vec!["cms:b:de:launch".to_string(), "cms:sm:de".to_string()]
        );
    }

    // ==================== Invalidation Flow Tests ====================

    #[test]
    fn test_save_invalidates_own_parent_and_sitemap() {
        let cache = cache();
        cache.set("cms:p:en:about/team", json!("stale"), TTL);
        cache.set("cms:p:en:about", json!("stale parent"), TTL);
        cache.set("cms:sm:en", json!("stale sitemap"), TTL);
        cache.set("cms:p:de:about/team", json!("other locale"), TTL);

        let invalidator = CacheInvalidator::new(cache.clone(), CacheKeyBuilder::new(), TTL);
        invalidator.handle(&page_change());

        assert_eq!(cache.get("cms:p:en:about/team"), None);
        assert_eq!(cache.get("cms:p:en:about"), None);
        assert_eq!(cache.get("cms:sm:en"), None);
        assert_eq!(cache.get("cms:p:de:about/team"), Some(json!("other locale")));
    }

    #[test]
    fn test_publish_rewarms_own_key() {
        let cache = cache();
        let invalidator = CacheInvalidator::new(cache.clone(), CacheKeyBuilder::new(), TTL)
            .with_rewarm(|change| Ok(json!({ "rendered": change.object.object_id })));

        invalidator.handle(&page_change().published());

        assert_eq!(
            cache.get("cms:p:en:about/team"),
            Some(json!({ "rendered": "42" }))
        );
        // Only the object's own entry is re-warmed.
        assert_eq!(cache.get("cms:p:en:about"), None);
    }

    #[test]
    fn test_unpublished_save_does_not_rewarm() {
        let cache = cache();
        let invalidator = CacheInvalidator::new(cache.clone(), CacheKeyBuilder::new(), TTL)
            .with_rewarm(|_| Ok(json!("rendered")));

        invalidator.handle(&page_change());
        assert_eq!(cache.get("cms:p:en:about/team"), None);
    }

    #[test]
    fn test_rewarm_failure_is_swallowed() {
        let cache = cache();
        let invalidator = CacheInvalidator::new(cache.clone(), CacheKeyBuilder::new(), TTL)
            .with_rewarm(|_| anyhow::bail!("renderer unavailable"));

        invalidator.handle(&page_change().published());
        // Entry stays cold; no panic, no error.
        assert_eq!(cache.get("cms:p:en:about/team"), None);
    }

    #[test]
    fn test_delete_invalidates_without_rewarm() {
        let cache = cache();
        cache.set("cms:p:en:about/team", json!("stale"), TTL);

        let invalidator = CacheInvalidator::new(cache.clone(), CacheKeyBuilder::new(), TTL)
            .with_rewarm(|_| Ok(json!("rendered")));
        let change = ContentChange::deleted(
            ObjectRef::new("page", "42"),
            "en",
            ContentAddress::Page {
                path: "/about/team".to_string(),
                parent_path: None,
            },
        )
        .published();

        invalidator.handle(&change);
        assert_eq!(cache.get("cms:p:en:about/team"), None);
    }

    // ==================== Seeder Tests ====================

    fn registry() -> LocaleRegistry {
        let mut registry = LocaleRegistry::new();
        registry
            .register(Locale::new("en", "English").default_locale())
            .unwrap();
        registry
            .register(Locale::new("es", "Spanish").with_fallback("en"))
            .unwrap();
        registry
            .register(Locale::new("de", "German").with_fallback("en"))
            .unwrap();
        registry
    }

    fn seeder(store: Arc<dyn TranslationStore>) -> TranslationSeeder {
        let fields = TranslatableFields::new().register("page", &["title", "body"]);
        TranslationSeeder::new(store, fields, &registry()).expect("Should build")
    }

    #[test]
    fn test_seeder_creates_draft_units_per_field_and_target() {
        let store = Arc::new(InMemoryTranslationStore::new());
        let seeder = seeder(store.clone());

        let change = page_change()
            .with_field("title", "Team")
            .with_field("body", "Our team");
        seeder.handle(&change).expect("Should succeed");

        // 2 fields x 2 target locales (es, de); never the default locale.
        assert_eq!(store.len(), 4);
        let key = UnitKey::new(ObjectRef::new("page", "42"), "title", "es");
        let unit = store.get(&key).expect("Should exist");
        assert_eq!(unit.status, TranslationStatus::Draft);
        assert_eq!(unit.source_locale, "en");
        assert_eq!(unit.source_text, "Team");
        assert_eq!(unit.target_text, None);
    }

    #[test]
    fn test_seeder_updates_source_text_on_resave() {
        let store = Arc::new(InMemoryTranslationStore::new());
        let seeder = seeder(store.clone());

        seeder
            .handle(&page_change().with_field("title", "Team"))
            .unwrap();
        seeder
            .handle(&page_change().with_field("title", "Our Team"))
            .unwrap();

        let key = UnitKey::new(ObjectRef::new("page", "42"), "title", "de");
        assert_eq!(store.get(&key).unwrap().source_text, "Our Team");
        // Still one unit per (field, locale).
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_seeder_preserves_existing_translations() {
        let store = Arc::new(InMemoryTranslationStore::new());
        let seeder = seeder(store.clone());
        seeder
            .handle(&page_change().with_field("title", "Team"))
            .unwrap();

        // A translator works on the es unit, then the page is re-saved
        // with unchanged source text.
        let key = UnitKey::new(ObjectRef::new("page", "42"), "title", "es");
        let mut unit = store.get(&key).unwrap();
        unit.target_text = Some("Equipo".to_string());
        unit.status = TranslationStatus::Approved;
        store.put(unit);

        seeder
            .handle(&page_change().with_field("title", "Team"))
            .unwrap();
        let unit = store.get(&key).unwrap();
        assert_eq!(unit.target_text.as_deref(), Some("Equipo"));
        assert_eq!(unit.status, TranslationStatus::Approved);
    }

    #[test]
    fn test_seeder_ignores_unregistered_models() {
        let store = Arc::new(InMemoryTranslationStore::new());
        let seeder = seeder(store.clone());

        let change = ContentChange::saved(
            ObjectRef::new("product", "1"),
            "en",
            ContentAddress::Page {
                path: "/p".to_string(),
                parent_path: None,
            },
        )
        .with_field("title", "Widget");
        seeder.handle(&change).unwrap();

        assert!(store.is_empty());
    }

    #[test]
    fn test_seeder_ignores_deletes() {
        let store = Arc::new(InMemoryTranslationStore::new());
        let seeder = seeder(store.clone());

        let change = ContentChange::deleted(
            ObjectRef::new("page", "42"),
            "en",
            ContentAddress::Page {
                path: "/about".to_string(),
                parent_path: None,
            },
        );
        seeder.handle(&change).unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn test_seeder_requires_default_locale() {
        let mut registry = LocaleRegistry::new();
        registry.register(Locale::new("en", "English")).unwrap();

        let store: Arc<dyn TranslationStore> = Arc::new(InMemoryTranslationStore::new());
        let result = TranslationSeeder::new(store, TranslatableFields::new(), &registry);
        assert!(matches!(result, Err(Error::NoDefaultLocale)));
    }

    // ==================== Registration Tests ====================

    #[test]
    fn test_registered_observers_fire_on_dispatch() {
        let cache = cache();
        cache.set("cms:sm:en", json!("stale"), TTL);
        let store = Arc::new(InMemoryTranslationStore::new());

        let mut bus = EventBus::new();
        CacheInvalidator::new(cache.clone(), CacheKeyBuilder::new(), TTL).register(&mut bus);
        seeder(store.clone()).register(&mut bus);
        assert_eq!(bus.observer_count(), 2);

        let failures = bus.dispatch(&page_change().with_field("title", "Team"));
        assert_eq!(failures, 0);
        assert_eq!(cache.get("cms:sm:en"), None);
        assert_eq!(store.len(), 2);
    }
}
