//! Timeout and retry around a single provider call.

use crate::error::GenerationError;
use cardsmith_config::ProviderConfig;
use cardsmith_protocol::{Completion, TextProvider};
use log::{debug, warn};
use std::time::Duration;

/// Bounds for one logical provider call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Deadline for each attempt.
    pub timeout: Duration,
    /// Extra attempts after the first failure.
    pub max_retries: u32,
    /// Base delay; doubles after every failed attempt.
    pub backoff: Duration,
}

impl RetryPolicy {
    pub fn from_config(config: &ProviderConfig) -> Self {
        Self {
            timeout: Duration::from_millis(config.timeout_ms),
            max_retries: config.max_retries,
            backoff: Duration::from_millis(config.backoff_ms),
        }
    }

    /// Delay before retry number `attempt + 1`.
    pub fn backoff_for(&self, attempt: u32) -> Duration {
        self.backoff.saturating_mul(2u32.saturating_pow(attempt))
    }
}

/// Call the provider, retrying provider failures with exponential backoff.
///
/// A timeout ends the call immediately and is not retried.
pub async fn complete_with_retry(
    provider: &dyn TextProvider,
    prompt: &str,
    policy: &RetryPolicy,
) -> Result<Completion, GenerationError> {
    let mut attempt = 0u32;
    loop {
        debug!(
            "calling provider (model={}, attempt={}, prompt_chars={})",
            provider.model_id(),
            attempt + 1,
            prompt.chars().count()
        );
        match tokio::time::timeout(policy.timeout, provider.complete(prompt)).await {
            Ok(Ok(completion)) => return Ok(completion),
            Ok(Err(failure)) if attempt < policy.max_retries => {
                let delay = policy.backoff_for(attempt);
                warn!(
                    "provider call failed, retrying (attempt={}, delay_ms={}, error={})",
                    attempt + 1,
                    delay.as_millis(),
                    failure
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Ok(Err(failure)) => {
                warn!(
                    "provider call failed, giving up (attempts={}, error={})",
                    attempt + 1,
                    failure
                );
                return Err(GenerationError::Provider(failure.0));
            }
            Err(_) => {
                warn!(
                    "provider call timed out (timeout_ms={})",
                    policy.timeout.as_millis()
                );
                return Err(GenerationError::Timeout(policy.timeout));
            }
        }
    }
}
