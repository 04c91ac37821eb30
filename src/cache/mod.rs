/*!
 * Snapshot cache.
 *
 * `CacheLayer` is the typed front the store and the query service talk to.
 * It serializes values as JSON and hands plain strings to a `CacheBackend`.
 * Every failure below this layer is logged and absorbed: a failed read is a
 * miss, a failed write or delete is a no-op.
 *
 * Invalidations advance a generation counter. A reader that loads from
 * persistence captures the generation first and refills through
 * `set_if_current`, which stores nothing once an invalidation has run in
 * between. The check and the write happen under the read side of the lock
 * that invalidations take exclusively.
 */

use async_trait::async_trait;
use log::{debug, warn};
use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock as GenerationLock;

use crate::errors::CacheError;

pub mod keys;
pub mod memory;
pub mod sqlite;

pub use keys::{list_key, page_key, record_key, LIST_PREFIX};
pub use memory::MemoryCache;
pub use sqlite::SqliteCache;

/// Key-value store with per-entry expiry
///
/// Implementations must be safe to call concurrently and must replace values
/// atomically per key.
#[async_trait]
pub trait CacheBackend: Send + Sync + std::fmt::Debug {
    /// Live value stored under `key`
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    /// Store `value` under `key` for `ttl`
    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<(), CacheError>;

    /// Remove `key`, absent keys are fine
    async fn delete(&self, key: &str) -> Result<(), CacheError>;

    /// Remove every key starting with `prefix`, returning how many were removed
    async fn delete_prefix(&self, prefix: &str) -> Result<usize, CacheError>;

    /// Drop expired entries, returning how many were removed
    async fn purge_expired(&self) -> Result<usize, CacheError>;

    /// Number of live entries
    async fn len(&self) -> Result<usize, CacheError>;

    /// Remove everything
    async fn clear(&self) -> Result<(), CacheError>;

    /// Backend name for diagnostics
    fn name(&self) -> &str;
}

/// Cache counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub hits: usize,
    pub misses: usize,
    /// Backend failures absorbed by the layer
    pub errors: usize,
}

impl CacheStats {
    /// Fraction of reads served from the cache
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total > 0 {
            self.hits as f64 / total as f64
        } else {
            0.0
        }
    }
}

/// Typed, best-effort cache shared by the store and the query service
#[derive(Clone)]
pub struct CacheLayer {
    /// `None` when caching is disabled
    backend: Option<Arc<dyn CacheBackend>>,

    /// Lifetime of record snapshots
    record_ttl: Duration,

    /// Lifetime of listing snapshots
    list_ttl: Duration,

    /// Counters shared by every clone
    stats: Arc<RwLock<CacheStats>>,

    /// Invalidation generation shared by every clone
    generation: Arc<GenerationLock<u64>>,
}

impl std::fmt::Debug for CacheLayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheLayer")
            .field("backend", &self.backend_name())
            .field("record_ttl", &self.record_ttl)
            .field("list_ttl", &self.list_ttl)
            .finish()
    }
}

impl CacheLayer {
    /// Create a layer over a backend
    pub fn new(backend: Arc<dyn CacheBackend>, record_ttl: Duration, list_ttl: Duration) -> Self {
        Self {
            backend: Some(backend),
            record_ttl,
            list_ttl,
            stats: Arc::new(RwLock::new(CacheStats::default())),
            generation: Arc::new(GenerationLock::new(0)),
        }
    }

    /// Layer over a fresh `MemoryCache` with the default lifetimes
    pub fn in_memory() -> Self {
        Self::new(
            Arc::new(MemoryCache::new()),
            Duration::from_secs(3600),
            Duration::from_secs(300),
        )
    }

    /// Layer that stores nothing and always misses
    pub fn disabled() -> Self {
        Self {
            backend: None,
            record_ttl: Duration::ZERO,
            list_ttl: Duration::ZERO,
            stats: Arc::new(RwLock::new(CacheStats::default())),
            generation: Arc::new(GenerationLock::new(0)),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.backend.is_some()
    }

    pub fn backend_name(&self) -> &str {
        self.backend
            .as_ref()
            .map(|backend| backend.name())
            .unwrap_or("disabled")
    }

    pub fn record_ttl(&self) -> Duration {
        self.record_ttl
    }

    pub fn list_ttl(&self) -> Duration {
        self.list_ttl
    }

    /// Snapshot of the counters
    pub fn stats(&self) -> CacheStats {
        *self.stats.read()
    }

    fn record_error(&self, operation: &str, key: &str, error: &CacheError) {
        self.stats.write().errors += 1;
        warn!("Cache {} failed for '{}': {}", operation, key, error);
    }

    /// Read and deserialize a value, `None` on miss, failure or a bad entry
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let backend = self.backend.as_ref()?;

        let raw = match backend.get(key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                self.stats.write().misses += 1;
                debug!("Cache miss for {}", key);
                return None;
            }
            Err(e) => {
                self.record_error("read", key, &e);
                self.stats.write().misses += 1;
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(value) => {
                self.stats.write().hits += 1;
                debug!("Cache hit for {}", key);
                Some(value)
            }
            Err(e) => {
                warn!("Discarding unreadable cache entry '{}': {}", key, e);
                self.stats.write().misses += 1;
                if let Err(e) = backend.delete(key).await {
                    self.record_error("delete", key, &e);
                }
                None
            }
        }
    }

    /// Serialize and store a value; a zero `ttl` stores nothing
    pub async fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T, ttl: Duration) {
        let Some(backend) = self.backend.as_ref() else {
            return;
        };
        if ttl.is_zero() {
            return;
        }

        let raw = match serde_json::to_string(value) {
            Ok(raw) => raw,
            Err(e) => {
                self.record_error("write", key, &CacheError::from(e));
                return;
            }
        };

        match backend.set(key, raw, ttl).await {
            Ok(()) => debug!("Cached {} for {}s", key, ttl.as_secs()),
            Err(e) => self.record_error("write", key, &e),
        }
    }

    /// Current invalidation generation, captured before reading persistence
    pub async fn generation(&self) -> u64 {
        *self.generation.read().await
    }

    /// Like `set`, but stores nothing if an invalidation ran since `generation`
    ///
    /// Returns whether the value was handed to the backend.
    pub async fn set_if_current<T: Serialize + ?Sized>(
        &self,
        key: &str,
        value: &T,
        ttl: Duration,
        generation: u64,
    ) -> bool {
        let current = self.generation.read().await;
        if *current != generation {
            debug!(
                "Skipping refill of {}, invalidated since generation {}",
                key, generation
            );
            return false;
        }
        self.set(key, value, ttl).await;
        true
    }

    /// Remove one key
    pub async fn delete(&self, key: &str) {
        let Some(backend) = self.backend.as_ref() else {
            return;
        };
        let mut generation = self.generation.write().await;
        *generation += 1;
        if let Err(e) = backend.delete(key).await {
            self.record_error("delete", key, &e);
        }
    }

    /// Remove every key under `prefix`, returning how many were removed
    pub async fn delete_prefix(&self, prefix: &str) -> usize {
        let Some(backend) = self.backend.as_ref() else {
            return 0;
        };
        let mut generation = self.generation.write().await;
        *generation += 1;
        match backend.delete_prefix(prefix).await {
            Ok(removed) => {
                debug!("Invalidated {} cache entries under '{}'", removed, prefix);
                removed
            }
            Err(e) => {
                self.record_error("prefix delete", prefix, &e);
                0
            }
        }
    }

    /// Drop expired entries, returning how many were removed
    pub async fn purge_expired(&self) -> usize {
        let Some(backend) = self.backend.as_ref() else {
            return 0;
        };
        match backend.purge_expired().await {
            Ok(removed) => removed,
            Err(e) => {
                self.record_error("purge", "*", &e);
                0
            }
        }
    }

    /// Number of live entries, `None` when disabled or unreachable
    pub async fn len(&self) -> Option<usize> {
        let backend = self.backend.as_ref()?;
        match backend.len().await {
            Ok(len) => Some(len),
            Err(e) => {
                self.record_error("count", "*", &e);
                None
            }
        }
    }

    /// Remove every entry
    pub async fn clear(&self) {
        let Some(backend) = self.backend.as_ref() else {
            return;
        };
        let mut generation = self.generation.write().await;
        *generation += 1;
        if let Err(e) = backend.clear().await {
            self.record_error("clear", "*", &e);
        }
    }
}
