/*!
 * Cache-first read path.
 *
 * Single records are cached as full snapshots and resolved for the
 * requested language after the cache read, so one entry serves every
 * language. Listings are cached already resolved, one entry per language,
 * page and page size. Refills are dropped when a write invalidated the
 * cache while persistence was being read.
 */

use log::debug;
use serde::{Deserialize, Serialize};

use crate::app_config::PaginationConfig;
use crate::cache::{list_key, page_key, record_key, CacheLayer};
use crate::errors::FaqError;
use crate::faq::{ContentRecord, FaqSnapshot, ResolvedFaq};
use crate::language_utils::normalize_language;
use crate::store::RecordStore;

/// One page of resolved records with its pagination envelope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaqPage {
    /// Total number of records, not just on this page
    pub count: usize,
    pub total_pages: usize,
    pub current_page: usize,
    pub has_next: bool,
    pub has_previous: bool,
    pub results: Vec<ResolvedFaq>,
}

impl FaqPage {
    fn new(count: usize, page: usize, page_size: usize, results: Vec<ResolvedFaq>) -> Self {
        let total_pages = count.div_ceil(page_size);
        Self {
            count,
            total_pages,
            current_page: page,
            has_next: page < total_pages,
            has_previous: page > 1,
            results,
        }
    }
}

/// Read path over the record store and the shared cache
#[derive(Clone)]
pub struct QueryService {
    store: RecordStore,
    cache: CacheLayer,
    default_page_size: usize,
    max_page_size: usize,
}

impl QueryService {
    pub fn new(store: RecordStore, cache: CacheLayer, pagination: &PaginationConfig) -> Self {
        Self {
            store,
            cache,
            default_page_size: pagination.default_page_size,
            max_page_size: pagination.max_page_size,
        }
    }

    /// Page size used when the caller does not pick one
    pub fn default_page_size(&self) -> usize {
        self.default_page_size
    }

    /// Canonical language for resolution and cache keys
    ///
    /// Blank and unsupported languages resolve to source text anyway, so
    /// they share the source language's entries.
    fn canonical_language(&self, language: &str) -> String {
        let language = normalize_language(language);
        if language.is_empty() || !self.store.supports(&language) {
            if !language.is_empty() {
                debug!("Serving unsupported language '{}' as source text", language);
            }
            return self.store.source_language().to_string();
        }
        language
    }

    /// One record resolved for `language`
    pub async fn get_one(&self, id: i64, language: &str) -> Result<ResolvedFaq, FaqError> {
        let language = self.canonical_language(language);
        let key = record_key(id);

        if let Some(snapshot) = self.cache.get::<FaqSnapshot>(&key).await {
            let record = ContentRecord::from_snapshot(snapshot, self.store.source_language());
            return Ok(record.resolved(&language));
        }

        let generation = self.cache.generation().await;
        let record = self.store.get(id).await?;
        self.cache
            .set_if_current(&key, &record.to_snapshot(), self.cache.record_ttl(), generation)
            .await;

        Ok(record.resolved(&language))
    }

    /// One page of records resolved for `language`, pages start at 1
    ///
    /// Page sizes above the configured maximum are clamped. Pages past the
    /// end come back with no results.
    pub async fn get_page(
        &self,
        language: &str,
        page: usize,
        page_size: usize,
    ) -> Result<FaqPage, FaqError> {
        if page == 0 || page_size == 0 {
            return Err(FaqError::Validation(
                "page and page size must be at least 1".to_string(),
            ));
        }

        let language = self.canonical_language(language);
        let page_size = page_size.min(self.max_page_size);
        let key = page_key(&language, page, page_size, self.default_page_size);

        if let Some(cached) = self.cache.get::<FaqPage>(&key).await {
            return Ok(cached);
        }

        let generation = self.cache.generation().await;
        let slice = self.store.list(page, page_size).await?;
        let results = slice
            .records
            .iter()
            .map(|record| record.resolved(&language))
            .collect();
        let faq_page = FaqPage::new(slice.total, page, page_size, results);

        self.cache
            .set_if_current(&key, &faq_page, self.cache.list_ttl(), generation)
            .await;
        Ok(faq_page)
    }

    /// Every record resolved for `language`, in recency order
    pub async fn get_all(&self, language: &str) -> Result<Vec<ResolvedFaq>, FaqError> {
        let language = self.canonical_language(language);
        let key = list_key(&language);

        if let Some(cached) = self.cache.get::<Vec<ResolvedFaq>>(&key).await {
            return Ok(cached);
        }

        let generation = self.cache.generation().await;
        let results: Vec<ResolvedFaq> = self
            .store
            .list_all()
            .await?
            .iter()
            .map(|record| record.resolved(&language))
            .collect();

        self.cache
            .set_if_current(&key, &results, self.cache.list_ttl(), generation)
            .await;
        Ok(results)
    }
}
