/*!
 * SQLite cache backend.
 *
 * Entries are rows of the `cache_entries` table with an absolute expiry in
 * unix milliseconds. Writes use `INSERT OR REPLACE`, which SQLite applies
 * atomically per row.
 */

use async_trait::async_trait;
use chrono::Utc;
use rusqlite::{params, OptionalExtension};
use std::time::Duration;

use super::CacheBackend;
use crate::database::DatabaseConnection;
use crate::errors::CacheError;

/// Cache stored in a SQLite database
#[derive(Clone)]
pub struct SqliteCache {
    db: DatabaseConnection,
}

impl std::fmt::Debug for SqliteCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteCache")
            .field("path", &self.db.path())
            .finish()
    }
}

impl SqliteCache {
    /// Use the `cache_entries` table of an open database
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Cache backed by a private in-memory database
    pub fn new_in_memory() -> anyhow::Result<Self> {
        Ok(Self::new(DatabaseConnection::new_in_memory()?))
    }
}

fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

fn unavailable(error: anyhow::Error) -> CacheError {
    CacheError::Unavailable(format!("{:#}", error))
}

#[async_trait]
impl CacheBackend for SqliteCache {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let key = key.to_string();
        self.db
            .execute_async(move |conn| {
                let value = conn
                    .query_row(
                        "SELECT value FROM cache_entries WHERE key = ?1 AND expires_at > ?2",
                        params![key, now_millis()],
                        |row| row.get::<_, String>(0),
                    )
                    .optional()?;
                Ok(value)
            })
            .await
            .map_err(unavailable)
    }

    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<(), CacheError> {
        let key = key.to_string();
        let ttl_ms = i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX);
        self.db
            .execute_async(move |conn| {
                conn.execute(
                    "INSERT OR REPLACE INTO cache_entries (key, value, expires_at) VALUES (?1, ?2, ?3)",
                    params![key, value, now_millis().saturating_add(ttl_ms)],
                )?;
                Ok(())
            })
            .await
            .map_err(unavailable)
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        let key = key.to_string();
        self.db
            .execute_async(move |conn| {
                conn.execute("DELETE FROM cache_entries WHERE key = ?1", [key])?;
                Ok(())
            })
            .await
            .map_err(unavailable)
    }

    async fn delete_prefix(&self, prefix: &str) -> Result<usize, CacheError> {
        let prefix = prefix.to_string();
        self.db
            .execute_async(move |conn| {
                // Case-sensitive prefix match
                let removed = conn.execute(
                    "DELETE FROM cache_entries WHERE substr(key, 1, length(?1)) = ?1",
                    [prefix],
                )?;
                Ok(removed)
            })
            .await
            .map_err(unavailable)
    }

    async fn purge_expired(&self) -> Result<usize, CacheError> {
        self.db
            .execute_async(|conn| {
                let removed = conn.execute(
                    "DELETE FROM cache_entries WHERE expires_at <= ?1",
                    [now_millis()],
                )?;
                Ok(removed)
            })
            .await
            .map_err(unavailable)
    }

    async fn len(&self) -> Result<usize, CacheError> {
        self.db
            .execute_async(|conn| {
                let count: i64 = conn.query_row(
                    "SELECT COUNT(*) FROM cache_entries WHERE expires_at > ?1",
                    [now_millis()],
                    |row| row.get(0),
                )?;
                Ok(count as usize)
            })
            .await
            .map_err(unavailable)
    }

    async fn clear(&self) -> Result<(), CacheError> {
        self.db
            .execute_async(|conn| {
                conn.execute("DELETE FROM cache_entries", [])?;
                Ok(())
            })
            .await
            .map_err(unavailable)
    }

    fn name(&self) -> &str {
        "sqlite"
    }
}
