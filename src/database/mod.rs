/*!
 * Database module for persistent storage of FAQ records.
 *
 * This module provides SQLite-based persistence for:
 * - FAQ records with their translations
 * - The `cache_entries` table used by the SQLite cache backend
 *
 * The rest of the crate talks to persistence only through the
 * `FaqPersistence` trait, implemented here by `Repository`.
 */

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::faq::{ContentRecord, FaqUpdate};
use crate::translation::TranslationSet;

pub mod connection;
pub mod models;
pub mod repository;
pub mod schema;

// Re-export main types
pub use connection::DatabaseConnection;
pub use repository::Repository;

/// A record about to be inserted
#[derive(Debug, Clone)]
pub struct NewFaq {
    pub question: String,
    pub answer: String,
    pub translations: TranslationSet,
    /// Creation time, also used as the first `updated_at`
    pub created_at: DateTime<Utc>,
}

/// One page of records plus the total number of records
#[derive(Debug, Clone)]
pub struct RecordSlice {
    /// Records ordered by `created_at` then `id`, both descending
    pub records: Vec<ContentRecord>,
    /// Number of records in the whole table
    pub total: usize,
}

/// Persistence contract for FAQ records
///
/// Each call is atomic on its own. Listing order is `created_at` DESC with
/// ties broken by `id` DESC.
#[async_trait]
pub trait FaqPersistence: Send + Sync {
    /// Persist a new record and return it with its assigned id
    async fn insert(&self, faq: NewFaq) -> Result<ContentRecord>;

    /// Fetch a record by id
    async fn get(&self, id: i64) -> Result<Option<ContentRecord>>;

    /// Apply an update; `None` when the id does not exist
    async fn update(
        &self,
        id: i64,
        update: FaqUpdate,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<ContentRecord>>;

    /// Remove a record; false when the id does not exist
    async fn delete(&self, id: i64) -> Result<bool>;

    /// Records in listing order, skipping `offset` and returning at most `limit`
    async fn list(&self, offset: usize, limit: usize) -> Result<RecordSlice>;

    /// Every record in listing order
    async fn list_all(&self) -> Result<Vec<ContentRecord>>;

    /// Number of stored records
    async fn count(&self) -> Result<usize>;
}
