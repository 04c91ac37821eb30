/*!
 * # polyfaq - multilingual FAQ store with a translation cache
 *
 * A Rust library that stores question/answer pairs once in a source
 * language, translates them into the supported languages at creation time,
 * and serves them through a cache-first read path.
 *
 * ## Features
 *
 * - Translation at creation through a pluggable provider:
 *   - Ollama (local LLM)
 *   - Deterministic mock for offline use and tests
 * - Per-language fallback to the source text for missing translations
 * - Record snapshots and resolved listings cached with TTLs
 * - Conservative invalidation on every mutation
 * - In-memory or SQLite cache backends, SQLite persistence
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management
 * - `translation`: `TranslationSet` and its fallback rules
 * - `faq`: Records, snapshots and resolved views
 * - `database`: SQLite persistence behind the `FaqPersistence` trait
 * - `cache`: Typed best-effort cache over pluggable backends
 * - `store`: Write path (create, update, delete) with invalidation
 * - `query`: Cache-first read path (single record, pages, full listing)
 * - `app_controller`: Builds and owns the shared handles
 * - `language_utils`: ISO language code utilities
 * - `providers`: Translation provider clients
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod app_controller;
pub mod cache;
pub mod database;
pub mod errors;
pub mod faq;
pub mod language_utils;
pub mod providers;
pub mod query;
pub mod store;
pub mod translation;

// Re-export main types for easier usage
pub use app_config::Config;
pub use app_controller::Controller;
pub use cache::{CacheBackend, CacheLayer};
pub use database::FaqPersistence;
pub use errors::{CacheError, FaqError, ProviderError};
pub use faq::{ContentRecord, FaqSnapshot, FaqUpdate, ResolvedFaq, WriteStatus};
pub use language_utils::{get_language_name, language_codes_match, normalize_language};
pub use query::{FaqPage, QueryService};
pub use store::RecordStore;
pub use translation::{Field, TranslationSet};
