/*!
 * Common test utilities for the polyfaq test suite
 */

#![allow(dead_code)]

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;

use polyfaq::app_config::Config;
use polyfaq::cache::{CacheBackend, CacheLayer, MemoryCache};
use polyfaq::database::{FaqPersistence, NewFaq, RecordSlice, Repository};
use polyfaq::errors::CacheError;
use polyfaq::faq::{ContentRecord, FaqUpdate};
use polyfaq::providers::{MockProvider, TranslationProvider};
use polyfaq::query::QueryService;
use polyfaq::store::RecordStore;

/// Supported languages used throughout the suite
pub fn languages() -> Vec<String> {
    vec!["en".to_string(), "hi".to_string(), "bn".to_string()]
}

/// Route library logs through env_logger, honoring RUST_LOG
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Default configuration with the mock provider
pub fn test_config() -> Config {
    let mut config = Config::default();
    config.translation.provider = polyfaq::app_config::TranslationProviderKind::Mock;
    config
}

/// Persistence wrapper counting every call, over an in-memory repository
pub struct CountingPersistence {
    inner: Repository,
    gets: AtomicUsize,
    lists: AtomicUsize,
    writes: AtomicUsize,
}

impl CountingPersistence {
    pub fn new() -> Self {
        Self {
            inner: Repository::new_in_memory("en").expect("Failed to create repository"),
            gets: AtomicUsize::new(0),
            lists: AtomicUsize::new(0),
            writes: AtomicUsize::new(0),
        }
    }

    /// Calls to `get`
    pub fn get_calls(&self) -> usize {
        self.gets.load(Ordering::SeqCst)
    }

    /// Calls to `list` and `list_all`
    pub fn list_calls(&self) -> usize {
        self.lists.load(Ordering::SeqCst)
    }

    /// Calls to `insert`, `update` and `delete`
    pub fn write_calls(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Insert bypassing the store, to control `created_at`
    pub async fn insert_at(&self, question: &str, created_at: DateTime<Utc>) -> ContentRecord {
        self.inner
            .insert(NewFaq {
                question: question.to_string(),
                answer: format!("Answer to {}", question),
                translations: polyfaq::TranslationSet::new("en"),
                created_at,
            })
            .await
            .expect("Failed to insert")
    }
}

#[async_trait]
impl FaqPersistence for CountingPersistence {
    async fn insert(&self, faq: NewFaq) -> Result<ContentRecord> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.inner.insert(faq).await
    }

    async fn get(&self, id: i64) -> Result<Option<ContentRecord>> {
        self.gets.fetch_add(1, Ordering::SeqCst);
        self.inner.get(id).await
    }

    async fn update(
        &self,
        id: i64,
        update: FaqUpdate,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<ContentRecord>> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.inner.update(id, update, updated_at).await
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.inner.delete(id).await
    }

    async fn list(&self, offset: usize, limit: usize) -> Result<RecordSlice> {
        self.lists.fetch_add(1, Ordering::SeqCst);
        self.inner.list(offset, limit).await
    }

    async fn list_all(&self) -> Result<Vec<ContentRecord>> {
        self.lists.fetch_add(1, Ordering::SeqCst);
        self.inner.list_all().await
    }

    async fn count(&self) -> Result<usize> {
        self.inner.count().await
    }
}

/// Persistence that can hold one read after it has loaded its rows
///
/// Lets a test run a write between a reader's persistence read and its
/// cache refill.
pub struct GatedPersistence {
    inner: Repository,
    hold: AtomicBool,
    /// Notified once the held read has its result
    pub read_done: Notify,
    release: Notify,
}

impl GatedPersistence {
    pub fn new() -> Self {
        Self {
            inner: Repository::new_in_memory("en").expect("Failed to create repository"),
            hold: AtomicBool::new(false),
            read_done: Notify::new(),
            release: Notify::new(),
        }
    }

    /// Hold the next `get` or `list` until `release` is called
    pub fn hold_next_read(&self) {
        self.hold.store(true, Ordering::SeqCst);
    }

    /// Let the held read return
    pub fn release(&self) {
        self.release.notify_one();
    }

    async fn gate(&self) {
        if self.hold.swap(false, Ordering::SeqCst) {
            self.read_done.notify_one();
            self.release.notified().await;
        }
    }
}

#[async_trait]
impl FaqPersistence for GatedPersistence {
    async fn insert(&self, faq: NewFaq) -> Result<ContentRecord> {
        self.inner.insert(faq).await
    }

    async fn get(&self, id: i64) -> Result<Option<ContentRecord>> {
        let result = self.inner.get(id).await;
        self.gate().await;
        result
    }

    async fn update(
        &self,
        id: i64,
        update: FaqUpdate,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<ContentRecord>> {
        self.inner.update(id, update, updated_at).await
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        self.inner.delete(id).await
    }

    async fn list(&self, offset: usize, limit: usize) -> Result<RecordSlice> {
        let result = self.inner.list(offset, limit).await;
        self.gate().await;
        result
    }

    async fn list_all(&self) -> Result<Vec<ContentRecord>> {
        let result = self.inner.list_all().await;
        self.gate().await;
        result
    }

    async fn count(&self) -> Result<usize> {
        self.inner.count().await
    }
}

/// Store and query service over a gated persistence and a memory cache
pub fn gated_services() -> (Arc<GatedPersistence>, RecordStore, QueryService) {
    init_logging();
    let config = test_config();
    let persistence = Arc::new(GatedPersistence::new());
    let cache = CacheLayer::in_memory();
    let store = RecordStore::new(
        persistence.clone(),
        cache.clone(),
        Arc::new(MockProvider::working()),
        &config.source_language,
        &config.supported_languages,
    );
    let query = QueryService::new(store.clone(), cache, &config.pagination);
    (persistence, store, query)
}

/// Persistence whose every call fails
pub struct FailingPersistence;

#[async_trait]
impl FaqPersistence for FailingPersistence {
    async fn insert(&self, _faq: NewFaq) -> Result<ContentRecord> {
        Err(anyhow::anyhow!("disk I/O error"))
    }
    async fn get(&self, _id: i64) -> Result<Option<ContentRecord>> {
        Err(anyhow::anyhow!("disk I/O error"))
    }
    async fn update(
        &self,
        _id: i64,
        _update: FaqUpdate,
        _updated_at: DateTime<Utc>,
    ) -> Result<Option<ContentRecord>> {
        Err(anyhow::anyhow!("disk I/O error"))
    }
    async fn delete(&self, _id: i64) -> Result<bool> {
        Err(anyhow::anyhow!("disk I/O error"))
    }
    async fn list(&self, _offset: usize, _limit: usize) -> Result<RecordSlice> {
        Err(anyhow::anyhow!("disk I/O error"))
    }
    async fn list_all(&self) -> Result<Vec<ContentRecord>> {
        Err(anyhow::anyhow!("disk I/O error"))
    }
    async fn count(&self) -> Result<usize> {
        Err(anyhow::anyhow!("disk I/O error"))
    }
}

/// Cache backend standing in for an unreachable cache server
#[derive(Debug, Default)]
pub struct UnreachableCache {
    pub calls: AtomicUsize,
}

impl UnreachableCache {
    fn fail<T>(&self) -> Result<T, CacheError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(CacheError::Unavailable("connection refused".to_string()))
    }
}

#[async_trait]
impl CacheBackend for UnreachableCache {
    async fn get(&self, _key: &str) -> Result<Option<String>, CacheError> {
        self.fail()
    }
    async fn set(&self, _key: &str, _value: String, _ttl: Duration) -> Result<(), CacheError> {
        self.fail()
    }
    async fn delete(&self, _key: &str) -> Result<(), CacheError> {
        self.fail()
    }
    async fn delete_prefix(&self, _prefix: &str) -> Result<usize, CacheError> {
        self.fail()
    }
    async fn purge_expired(&self) -> Result<usize, CacheError> {
        self.fail()
    }
    async fn len(&self) -> Result<usize, CacheError> {
        self.fail()
    }
    async fn clear(&self) -> Result<(), CacheError> {
        self.fail()
    }
    fn name(&self) -> &str {
        "unreachable"
    }
}

/// Store and query service sharing one persistence stub and one cache
pub struct Harness {
    pub persistence: Arc<CountingPersistence>,
    pub backend: Arc<MemoryCache>,
    pub cache: CacheLayer,
    pub store: RecordStore,
    pub query: QueryService,
}

impl Harness {
    /// Harness with a working mock provider and a memory cache
    pub fn new() -> Self {
        Self::with_provider(MockProvider::working())
    }

    pub fn with_provider(provider: impl TranslationProvider + 'static) -> Self {
        init_logging();
        let persistence = Arc::new(CountingPersistence::new());
        let backend = Arc::new(MemoryCache::new());
        let cache = CacheLayer::new(
            backend.clone(),
            Duration::from_secs(3600),
            Duration::from_secs(300),
        );
        let config = test_config();
        let store = RecordStore::new(
            persistence.clone(),
            cache.clone(),
            Arc::new(provider),
            &config.source_language,
            &config.supported_languages,
        );
        let query = QueryService::new(store.clone(), cache.clone(), &config.pagination);

        Self {
            persistence,
            backend,
            cache,
            store,
            query,
        }
    }
}

/// Store and query service over a given cache layer
pub fn services_with_cache(cache: CacheLayer) -> (RecordStore, QueryService) {
    init_logging();
    let config = test_config();
    let repo = Repository::new_in_memory(&config.source_language).expect("Failed to create repository");
    let store = RecordStore::new(
        Arc::new(repo),
        cache.clone(),
        Arc::new(MockProvider::working()),
        &config.source_language,
        &config.supported_languages,
    );
    let query = QueryService::new(store.clone(), cache, &config.pagination);
    (store, query)
}
