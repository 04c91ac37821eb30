use chrono::Utc;
use log::{debug, error, info};
use std::sync::Arc;

use crate::cache::{record_key, CacheLayer, LIST_PREFIX};
use crate::database::{FaqPersistence, NewFaq, RecordSlice};
use crate::errors::FaqError;
use crate::faq::{ContentRecord, FaqUpdate};
use crate::language_utils::normalize_language;
use crate::providers::TranslationProvider;
use crate::translation::TranslationSet;

// @module: Write path for FAQ records

/// Record store: validation, translation at creation, persistence and
/// cache invalidation
///
/// Cache work always happens after persistence succeeded. A failed write
/// leaves the cache untouched, and a failed cache call never fails a write.
#[derive(Clone)]
pub struct RecordStore {
    // @field: Persistence collaborator
    persistence: Arc<dyn FaqPersistence>,

    // @field: Shared snapshot cache
    cache: CacheLayer,

    // @field: Translation provider used on create
    provider: Arc<dyn TranslationProvider>,

    // @field: Language records are authored in
    source_language: String,

    // @field: Every served language, source included
    supported_languages: Vec<String>,
}

impl RecordStore {
    pub fn new(
        persistence: Arc<dyn FaqPersistence>,
        cache: CacheLayer,
        provider: Arc<dyn TranslationProvider>,
        source_language: &str,
        supported_languages: &[String],
    ) -> Self {
        Self {
            persistence,
            cache,
            provider,
            source_language: normalize_language(source_language),
            supported_languages: supported_languages
                .iter()
                .map(|language| normalize_language(language))
                .collect(),
        }
    }

    pub fn source_language(&self) -> &str {
        &self.source_language
    }

    pub fn supported_languages(&self) -> &[String] {
        &self.supported_languages
    }

    /// Whether `language` is one of the served languages
    pub fn supports(&self, language: &str) -> bool {
        self.supported_languages.iter().any(|supported| supported == language)
    }

    pub fn cache(&self) -> &CacheLayer {
        &self.cache
    }

    /// Create a record, translating it into every supported language first
    ///
    /// Translation failures only leave languages out. The fresh snapshot is
    /// written through to `record:<id>` and every listing is dropped, since
    /// the new record can land on the first page of any language.
    pub async fn create(&self, question: &str, answer: &str) -> Result<ContentRecord, FaqError> {
        let question = require_text("question", question)?;
        let answer = require_text("answer", answer)?;

        let translations = TranslationSet::populate(
            &question,
            &answer,
            &self.source_language,
            &self.supported_languages,
            self.provider.as_ref(),
        )
        .await;

        let record = self
            .persistence
            .insert(NewFaq {
                question,
                answer,
                translations,
                created_at: Utc::now(),
            })
            .await
            .map_err(|e| persistence_failure("create", e))?;

        self.cache
            .set(&record_key(record.id), &record.to_snapshot(), self.cache.record_ttl())
            .await;
        self.cache.delete_prefix(LIST_PREFIX).await;

        info!(
            "Created FAQ {} with {} translation(s)",
            record.id,
            record.translations.len()
        );
        Ok(record)
    }

    /// Change the question and/or the answer of a record
    ///
    /// Existing translations are kept as they are.
    pub async fn update(&self, id: i64, update: FaqUpdate) -> Result<ContentRecord, FaqError> {
        if update.is_empty() {
            return Err(FaqError::Validation(
                "an update needs a question or an answer".to_string(),
            ));
        }

        let update = FaqUpdate {
            question: update
                .question
                .as_deref()
                .map(|question| require_text("question", question))
                .transpose()?,
            answer: update
                .answer
                .as_deref()
                .map(|answer| require_text("answer", answer))
                .transpose()?,
        };

        let record = self
            .persistence
            .update(id, update, Utc::now())
            .await
            .map_err(|e| persistence_failure("update", e))?
            .ok_or(FaqError::NotFound { id })?;

        self.invalidate(id).await;

        info!("Updated FAQ {}", id);
        Ok(record)
    }

    /// Delete a record and every cache entry that could show it
    pub async fn delete(&self, id: i64) -> Result<(), FaqError> {
        let deleted = self
            .persistence
            .delete(id)
            .await
            .map_err(|e| persistence_failure("delete", e))?;

        if !deleted {
            return Err(FaqError::NotFound { id });
        }

        self.invalidate(id).await;

        info!("Deleted FAQ {}", id);
        Ok(())
    }

    /// Read a record straight from persistence
    pub async fn get(&self, id: i64) -> Result<ContentRecord, FaqError> {
        self.persistence
            .get(id)
            .await
            .map_err(|e| persistence_failure("read", e))?
            .ok_or(FaqError::NotFound { id })
    }

    /// Read one page of records in recency order, pages start at 1
    pub async fn list(&self, page: usize, page_size: usize) -> Result<RecordSlice, FaqError> {
        if page == 0 || page_size == 0 {
            return Err(FaqError::Validation(
                "page and page size must be at least 1".to_string(),
            ));
        }

        let offset = (page - 1).saturating_mul(page_size);
        self.persistence
            .list(offset, page_size)
            .await
            .map_err(|e| persistence_failure("list", e))
    }

    /// Read every record in recency order
    pub async fn list_all(&self) -> Result<Vec<ContentRecord>, FaqError> {
        self.persistence
            .list_all()
            .await
            .map_err(|e| persistence_failure("list", e))
    }

    /// Number of persisted records
    pub async fn count(&self) -> Result<usize, FaqError> {
        self.persistence
            .count()
            .await
            .map_err(|e| persistence_failure("count", e))
    }

    // Drop the record snapshot and every listing of every language
    async fn invalidate(&self, id: i64) {
        self.cache.delete(&record_key(id)).await;
        let removed = self.cache.delete_prefix(LIST_PREFIX).await;
        debug!("Invalidated record:{} and {} listing(s)", id, removed);
    }
}

/// Trim a required field, rejecting blank input
fn require_text(field: &str, value: &str) -> Result<String, FaqError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(FaqError::Validation(format!("{} is required", field)));
    }
    Ok(trimmed.to_string())
}

fn persistence_failure(operation: &str, e: anyhow::Error) -> FaqError {
    error!("Failed to {} FAQ: {:#}", operation, e);
    FaqError::from(e)
}
