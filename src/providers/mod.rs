/*!
 * Translation provider implementations.
 *
 * This module contains the clients used to translate FAQ content:
 * - Ollama: Local LLM server
 * - Mock: Deterministic offline provider for tests and dry runs
 * - Timeout: Wrapper bounding the duration of any provider call
 */

use async_trait::async_trait;
use std::fmt::Debug;

use crate::errors::ProviderError;

/// Common trait for all translation providers
///
/// Implementations may be slow, rate-limited or unavailable. Callers treat
/// every error as "no translation for this language".
#[async_trait]
pub trait TranslationProvider: Send + Sync + Debug {
    /// Translate `text` into `language`
    ///
    /// # Arguments
    /// * `language` - Target language code
    /// * `text` - Source text
    ///
    /// # Returns
    /// * `Result<String, ProviderError>` - The translated text or an error
    async fn translate(&self, language: &str, text: &str) -> Result<String, ProviderError>;

    /// Short provider name used in logs
    fn name(&self) -> &str;
}

pub mod mock;
pub mod ollama;
pub mod timeout;

pub use mock::MockProvider;
pub use ollama::Ollama;
pub use timeout::TimeoutProvider;
