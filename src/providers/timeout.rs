/*!
 * Deadline enforcement for provider calls.
 */

use async_trait::async_trait;
use std::time::Duration;

use crate::errors::ProviderError;
use crate::providers::TranslationProvider;

/// Wraps a provider and fails any call that exceeds `timeout`
///
/// A timed out call is dropped and reported as `ProviderError::Timeout`,
/// so the caller never sees a partial translation.
#[derive(Debug)]
pub struct TimeoutProvider<P> {
    inner: P,
    timeout: Duration,
}

impl<P: TranslationProvider> TimeoutProvider<P> {
    /// Wrap `inner` with a per-call deadline
    pub fn new(inner: P, timeout: Duration) -> Self {
        Self { inner, timeout }
    }

    /// The wrapped provider
    pub fn inner(&self) -> &P {
        &self.inner
    }
}

#[async_trait]
impl<P: TranslationProvider> TranslationProvider for TimeoutProvider<P> {
    async fn translate(&self, language: &str, text: &str) -> Result<String, ProviderError> {
        match tokio::time::timeout(self.timeout, self.inner.translate(language, text)).await {
            Ok(result) => result,
            Err(_) => Err(ProviderError::Timeout(self.timeout.as_millis() as u64)),
        }
    }

    fn name(&self) -> &str {
        self.inner.name()
    }
}
