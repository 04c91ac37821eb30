use anyhow::{Context, Result};
use log::{debug, info};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

use crate::app_config::{CacheBackendKind, Config, TranslationProviderKind};
use crate::cache::{CacheLayer, CacheStats, MemoryCache, SqliteCache};
use crate::database::{DatabaseConnection, FaqPersistence, Repository};
use crate::providers::{MockProvider, Ollama, TimeoutProvider, TranslationProvider};
use crate::query::QueryService;
use crate::store::RecordStore;

// @module: Application controller wiring the store, the cache and the read path

/// Owns the handles built once at startup and shared by every request
pub struct Controller {
    // @field: App configuration
    config: Config,

    // @field: Write path
    store: RecordStore,

    // @field: Read path
    query: QueryService,

    // @field: Cache shared by both paths
    cache: CacheLayer,
}

/// Diagnostics reported by `Controller::stats`
#[derive(Debug, Clone, Serialize)]
pub struct ControllerStats {
    /// Persisted records
    pub records: usize,
    /// Cache backend name, `disabled` when caching is off
    pub cache_backend: String,
    /// Live cache entries, absent when the cache is off or unreachable
    pub cache_entries: Option<usize>,
    /// Hit, miss and error counters since startup
    pub cache: CacheStats,
    pub cache_hit_rate: f64,
}

impl Controller {
    /// Build every component from the configuration
    pub fn from_config(config: Config) -> Result<Self> {
        config.validate().context("Invalid configuration")?;

        let db_path = config.database_path()?;
        let db = DatabaseConnection::new(&db_path)?;
        let persistence: Arc<dyn FaqPersistence> =
            Arc::new(Repository::new(db.clone(), &config.source_language));

        let cache = Self::build_cache(&config, &db)?;
        let provider = Self::build_provider(&config);

        info!(
            "Translating '{}' into {:?} with {}, records in {:?}, {} cache",
            config.source_language,
            config.target_languages(),
            config.translation.provider.display_name(),
            db_path,
            cache.backend_name()
        );

        Ok(Self::with_components(config, persistence, cache, provider))
    }

    /// Assemble a controller from prebuilt parts
    pub fn with_components(
        config: Config,
        persistence: Arc<dyn FaqPersistence>,
        cache: CacheLayer,
        provider: Arc<dyn TranslationProvider>,
    ) -> Self {
        let store = RecordStore::new(
            persistence,
            cache.clone(),
            provider,
            &config.source_language,
            &config.supported_languages,
        );
        let query = QueryService::new(store.clone(), cache.clone(), &config.pagination);

        Self {
            config,
            store,
            query,
            cache,
        }
    }

    /// Controller over an in-memory database, memory cache and working mock provider
    pub fn new_for_test(config: Config) -> Result<Self> {
        let (record_ttl, list_ttl) = config.cache_ttls();
        let repo = Repository::new_in_memory(&config.source_language)?;
        let cache = CacheLayer::new(Arc::new(MemoryCache::new()), record_ttl, list_ttl);

        Ok(Self::with_components(
            config,
            Arc::new(repo),
            cache,
            Arc::new(MockProvider::working()),
        ))
    }

    fn build_cache(config: &Config, db: &DatabaseConnection) -> Result<CacheLayer> {
        if !config.cache.enabled {
            debug!("Cache disabled by configuration");
            return Ok(CacheLayer::disabled());
        }

        let (record_ttl, list_ttl) = config.cache_ttls();
        let layer = match config.cache.backend {
            CacheBackendKind::Memory => {
                CacheLayer::new(Arc::new(MemoryCache::new()), record_ttl, list_ttl)
            }
            CacheBackendKind::Sqlite => {
                let conn = match config.cache_path() {
                    Some(path) => DatabaseConnection::new(path)
                        .with_context(|| format!("Failed to open cache database {:?}", path))?,
                    None => db.clone(),
                };
                CacheLayer::new(Arc::new(SqliteCache::new(conn)), record_ttl, list_ttl)
            }
        };

        Ok(layer)
    }

    fn build_provider(config: &Config) -> Arc<dyn TranslationProvider> {
        let timeout = Duration::from_secs(config.translation.timeout_secs);
        match config.translation.provider {
            TranslationProviderKind::Ollama => Arc::new(TimeoutProvider::new(
                Ollama::from_config(&config.translation, &config.source_language),
                timeout,
            )),
            TranslationProviderKind::Mock => {
                Arc::new(TimeoutProvider::new(MockProvider::working(), timeout))
            }
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Write path handle
    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    /// Read path handle
    pub fn query(&self) -> &QueryService {
        &self.query
    }

    pub fn cache(&self) -> &CacheLayer {
        &self.cache
    }

    /// Record count and cache diagnostics
    pub async fn stats(&self) -> Result<ControllerStats> {
        let records = self.store.count().await?;
        let cache = self.cache.stats();

        Ok(ControllerStats {
            records,
            cache_backend: self.cache.backend_name().to_string(),
            cache_entries: self.cache.len().await,
            cache_hit_rate: cache.hit_rate(),
            cache,
        })
    }

    /// Drop expired cache entries, returning how many were removed
    pub async fn purge_cache(&self) -> usize {
        let removed = self.cache.purge_expired().await;
        info!("Purged {} expired cache entries", removed);
        removed
    }
}
