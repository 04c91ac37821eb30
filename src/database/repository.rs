/*!
 * Repository layer for database operations.
 *
 * This module provides a high-level API for FAQ persistence,
 * abstracting away the SQL details and providing type-safe access.
 */

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::debug;
use rusqlite::{params, Connection, OptionalExtension};

use super::connection::DatabaseConnection;
use super::models::{
    encode_translations, format_timestamp, storage_precision, FaqRow, FAQ_COLUMNS,
};
use super::{FaqPersistence, NewFaq, RecordSlice};
use crate::faq::{ContentRecord, FaqUpdate};
use crate::translation::Field;

/// SQLite repository for FAQ records
#[derive(Clone)]
pub struct Repository {
    /// Database connection
    db: DatabaseConnection,
    /// Language every stored record is authored in
    source_language: String,
}

impl Repository {
    /// Create a new repository with the given database connection
    pub fn new(db: DatabaseConnection, source_language: &str) -> Self {
        Self {
            db,
            source_language: source_language.to_string(),
        }
    }

    /// Create a repository with an in-memory database (for testing)
    pub fn new_in_memory(source_language: &str) -> Result<Self> {
        let db = DatabaseConnection::new_in_memory()?;
        Ok(Self::new(db, source_language))
    }

    /// Underlying connection
    pub fn connection(&self) -> &DatabaseConnection {
        &self.db
    }

    /// Get a row by ID (synchronous version for use within transactions)
    fn get_row_sync(conn: &Connection, id: i64) -> Result<Option<FaqRow>> {
        let sql = format!("SELECT {} FROM faqs WHERE id = ?1", FAQ_COLUMNS);
        let row = conn.query_row(&sql, [id], FaqRow::from_row).optional()?;
        Ok(row)
    }

    fn into_records(&self, rows: Vec<FaqRow>) -> Result<Vec<ContentRecord>> {
        rows.into_iter()
            .map(|row| row.into_record(&self.source_language))
            .collect()
    }
}

#[async_trait]
impl FaqPersistence for Repository {
    async fn insert(&self, faq: NewFaq) -> Result<ContentRecord> {
        let created_at = format_timestamp(&storage_precision(faq.created_at));
        let question_translated = encode_translations(&faq.translations, Field::Question)?;
        let answer_translated = encode_translations(&faq.translations, Field::Answer)?;
        let question = faq.question;
        let answer = faq.answer;

        let row = self
            .db
            .transaction_async(move |tx| {
                tx.execute(
                    r#"
                    INSERT INTO faqs (
                        question, answer, question_translated, answer_translated,
                        created_at, updated_at
                    ) VALUES (?1, ?2, ?3, ?4, ?5, ?5)
                    "#,
                    params![question, answer, question_translated, answer_translated, created_at],
                )?;
                let id = tx.last_insert_rowid();
                Self::get_row_sync(tx, id)?
                    .ok_or_else(|| anyhow::anyhow!("Inserted FAQ {} vanished", id))
            })
            .await?;

        debug!("Inserted FAQ {}", row.id);
        row.into_record(&self.source_language)
    }

    async fn get(&self, id: i64) -> Result<Option<ContentRecord>> {
        let row = self
            .db
            .execute_async(move |conn| Self::get_row_sync(conn, id))
            .await?;

        row.map(|row| row.into_record(&self.source_language))
            .transpose()
    }

    async fn update(
        &self,
        id: i64,
        update: FaqUpdate,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<ContentRecord>> {
        let updated_at = format_timestamp(&storage_precision(updated_at));

        let row = self
            .db
            .transaction_async(move |tx| {
                let changed = tx.execute(
                    r#"
                    UPDATE faqs
                    SET question = COALESCE(?1, question),
                        answer = COALESCE(?2, answer),
                        updated_at = ?3
                    WHERE id = ?4
                    "#,
                    params![update.question, update.answer, updated_at, id],
                )?;
                if changed == 0 {
                    return Ok(None);
                }
                Self::get_row_sync(tx, id)
            })
            .await?;

        row.map(|row| row.into_record(&self.source_language))
            .transpose()
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        self.db
            .execute_async(move |conn| {
                let deleted = conn.execute("DELETE FROM faqs WHERE id = ?1", [id])?;
                Ok(deleted > 0)
            })
            .await
    }

    async fn list(&self, offset: usize, limit: usize) -> Result<RecordSlice> {
        // SQLite reads a negative OFFSET as 0, so out-of-range values must not wrap
        let offset = i64::try_from(offset).ok();
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);

        let (rows, total) = self
            .db
            .execute_async(move |conn| {
                let total: i64 = conn.query_row("SELECT COUNT(*) FROM faqs", [], |row| row.get(0))?;

                let Some(offset) = offset else {
                    return Ok((Vec::new(), total as usize));
                };

                let sql = format!(
                    "SELECT {} FROM faqs ORDER BY created_at DESC, id DESC LIMIT ?1 OFFSET ?2",
                    FAQ_COLUMNS
                );
                let mut stmt = conn.prepare(&sql)?;
                let rows = stmt
                    .query_map(params![limit, offset], FaqRow::from_row)?
                    .collect::<rusqlite::Result<Vec<FaqRow>>>()?;

                Ok((rows, total as usize))
            })
            .await?;

        Ok(RecordSlice {
            records: self.into_records(rows)?,
            total,
        })
    }

    async fn list_all(&self) -> Result<Vec<ContentRecord>> {
        let rows = self
            .db
            .execute_async(move |conn| {
                let sql = format!(
                    "SELECT {} FROM faqs ORDER BY created_at DESC, id DESC",
                    FAQ_COLUMNS
                );
                let mut stmt = conn.prepare(&sql)?;
                let rows = stmt
                    .query_map([], FaqRow::from_row)?
                    .collect::<rusqlite::Result<Vec<FaqRow>>>()?;
                Ok(rows)
            })
            .await?;

        self.into_records(rows)
    }

    async fn count(&self) -> Result<usize> {
        self.db
            .execute_async(|conn| {
                let total: i64 = conn.query_row("SELECT COUNT(*) FROM faqs", [], |row| row.get(0))?;
                Ok(total as usize)
            })
            .await
    }
}
