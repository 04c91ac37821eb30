/*!
 * Error types for the polyfaq library.
 *
 * `FaqError` is the only error that crosses the subsystem boundary.
 * `ProviderError` and `CacheError` are absorbed by the store and the
 * query service: they are logged and turned into fallbacks or misses.
 */

use thiserror::Error;

/// Errors that can occur when talking to a translation provider
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Error when making an API request fails
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// Error when parsing an API response fails
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// Error returned by the API itself
    #[error("API responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error message from the API
        message: String,
    },

    /// Error establishing or maintaining a connection
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// The provider did not answer in time
    #[error("Translation timed out after {0} ms")]
    Timeout(u64),

    /// The provider answered with nothing usable
    #[error("Provider returned an empty translation")]
    EmptyResponse,
}

/// Errors raised by a cache backend
#[derive(Error, Debug)]
pub enum CacheError {
    /// The backing store could not be reached or failed
    #[error("Cache unavailable: {0}")]
    Unavailable(String),

    /// A value could not be serialized for storage
    #[error("Cache serialization failed: {0}")]
    Serialization(String),
}

/// Errors surfaced to callers of the read and write paths
#[derive(Error, Debug)]
pub enum FaqError {
    /// The requested record does not exist
    #[error("FAQ with id {id} not found")]
    NotFound {
        /// The id that was requested
        id: i64,
    },

    /// A required field was missing or blank
    #[error("Validation failed: {0}")]
    Validation(String),

    /// The persistence layer failed
    #[error("Persistence error: {0}")]
    Persistence(String),
}

impl FaqError {
    /// Whether this error means the record was absent
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

impl From<anyhow::Error> for FaqError {
    fn from(error: anyhow::Error) -> Self {
        Self::Persistence(format!("{:#}", error))
    }
}

impl From<rusqlite::Error> for CacheError {
    fn from(error: rusqlite::Error) -> Self {
        Self::Unavailable(error.to_string())
    }
}

impl From<serde_json::Error> for CacheError {
    fn from(error: serde_json::Error) -> Self {
        Self::Serialization(error.to_string())
    }
}
