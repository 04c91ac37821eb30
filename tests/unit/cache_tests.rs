/*!
 * Tests for the cache layer over both backends
 */

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

use polyfaq::cache::{CacheBackend, CacheLayer, MemoryCache, SqliteCache, LIST_PREFIX};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Entry {
    id: i64,
    text: String,
}

fn entry(id: i64) -> Entry {
    Entry {
        id,
        text: format!("entry {}", id),
    }
}

fn backends() -> Vec<Arc<dyn CacheBackend>> {
    vec![
        Arc::new(MemoryCache::new()),
        Arc::new(SqliteCache::new_in_memory().expect("Failed to create sqlite cache")),
    ]
}

fn layer(backend: Arc<dyn CacheBackend>, ttl: Duration) -> CacheLayer {
    CacheLayer::new(backend, ttl, ttl)
}

#[tokio::test]
async fn test_cacheLayer_setThenGet_shouldReturnValueOnEveryBackend() {
    for backend in backends() {
        let cache = layer(backend, Duration::from_secs(60));

        cache.set("record:1", &entry(1), cache.record_ttl()).await;

        assert_eq!(
            cache.get::<Entry>("record:1").await,
            Some(entry(1)),
            "backend {}",
            cache.backend_name()
        );
    }
}

#[tokio::test]
async fn test_cacheLayer_afterTtl_shouldMissOnEveryBackend() {
    for backend in backends() {
        let cache = layer(backend, Duration::from_millis(30));

        cache.set("list:hi:1", &vec![entry(1)], cache.list_ttl()).await;
        assert!(cache.get::<Vec<Entry>>("list:hi:1").await.is_some());

        tokio::time::sleep(Duration::from_millis(80)).await;

        assert!(
            cache.get::<Vec<Entry>>("list:hi:1").await.is_none(),
            "backend {}",
            cache.backend_name()
        );
    }
}

#[tokio::test]
async fn test_cacheLayer_deletePrefix_shouldLeaveRecordSnapshots() {
    for backend in backends() {
        let cache = layer(backend, Duration::from_secs(60));
        for key in ["list:en", "list:en:1", "list:hi:2:5", "record:3"] {
            cache.set(key, &entry(3), Duration::from_secs(60)).await;
        }

        let removed = cache.delete_prefix(LIST_PREFIX).await;

        assert_eq!(removed, 3);
        assert_eq!(cache.get::<Entry>("record:3").await, Some(entry(3)));
        assert!(cache.get::<Entry>("list:en").await.is_none());
    }
}

#[tokio::test]
async fn test_cacheLayer_withWrongType_shouldTreatEntryAsMiss() {
    for backend in backends() {
        let cache = layer(backend.clone(), Duration::from_secs(60));
        cache.set("record:9", &"just a string", cache.record_ttl()).await;

        assert!(cache.get::<Entry>("record:9").await.is_none());
        assert_eq!(backend.get("record:9").await.unwrap(), None);
    }
}

#[tokio::test]
async fn test_cacheLayer_concurrentWriters_shouldLeaveOneWholeValue() {
    let cache = CacheLayer::in_memory();

    let writers = (0..32).map(|i| {
        let cache = cache.clone();
        tokio::spawn(async move {
            cache.set("record:1", &entry(i), Duration::from_secs(60)).await;
            cache.get::<Entry>("record:1").await
        })
    });

    for result in futures::future::join_all(writers).await {
        let seen = result.unwrap().expect("Reader saw no value");
        assert_eq!(seen.text, format!("entry {}", seen.id));
    }
}

#[tokio::test]
async fn test_cacheLayer_clear_shouldEmptyBackend() {
    let cache = CacheLayer::in_memory();
    cache.set("record:1", &entry(1), cache.record_ttl()).await;
    cache.set("list:en", &vec![entry(1)], cache.list_ttl()).await;

    cache.clear().await;

    assert_eq!(cache.len().await, Some(0));
}
