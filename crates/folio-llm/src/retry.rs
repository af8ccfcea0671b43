use std::time::Duration;

use crate::error::LlmError;
use crate::provider::CompletionProvider;

const MAX_ATTEMPTS: u32 = 5;
const BASE_BACKOFF_SECS: u64 = 1;

/// Bounded exponential-backoff schedule with a pluggable failure classifier.
///
/// The default policy makes up to 5 attempts, sleeping `1 << n` seconds after
/// failed attempt `n`: 1s, 2s, 4s, 8s. No sleep follows the final attempt.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay_secs: u64,
    classifier: fn(&LlmError) -> bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: MAX_ATTEMPTS,
            base_delay_secs: BASE_BACKOFF_SECS,
            classifier: LlmError::is_rate_limited,
        }
    }
}

impl RetryPolicy {
    #[must_use]
    pub fn new(max_attempts: u32, base_delay_secs: u64) -> Self {
        Self {
            max_attempts,
            base_delay_secs,
            ..Self::default()
        }
    }

    /// Replace the classifier deciding which failures are worth retrying.
    #[must_use]
    pub fn with_classifier(mut self, classifier: fn(&LlmError) -> bool) -> Self {
        self.classifier = classifier;
        self
    }

    #[must_use]
    pub fn is_retryable(&self, err: &LlmError) -> bool {
        (self.classifier)(err)
    }

    /// Backoff to sleep after failed attempt `attempt` (0-based).
    #[must_use]
    pub fn delay(&self, attempt: u32) -> Duration {
        Duration::from_secs(self.base_delay_secs << attempt)
    }
}

/// Wraps a [`CompletionProvider`] with retry-on-rate-limit semantics.
///
/// Non-retryable failures are returned immediately without a retry. A
/// rate-limited failure on the final attempt is returned as-is; converting it
/// to user-facing fallback text is the caller's concern.
#[derive(Debug, Clone)]
pub struct RetryingClient<P> {
    provider: P,
    policy: RetryPolicy,
}

impl<P: CompletionProvider> RetryingClient<P> {
    #[must_use]
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            policy: RetryPolicy::default(),
        }
    }

    #[must_use]
    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    #[must_use]
    pub fn provider(&self) -> &P {
        &self.provider
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        self.provider.name()
    }

    /// Send `prompt`, retrying rate-limited failures per the policy.
    ///
    /// # Errors
    ///
    /// Returns the underlying error once attempts are exhausted, or
    /// immediately for failures the policy does not classify as retryable.
    pub async fn complete(&self, prompt: &str) -> Result<String, LlmError> {
        let attempts = self.policy.max_attempts.max(1);

        for attempt in 0..attempts {
            match self.provider.complete(prompt).await {
                Ok(text) => return Ok(text),
                Err(err) if self.policy.is_retryable(&err) && attempt + 1 < attempts => {
                    let delay = self.policy.delay(attempt);
                    tracing::warn!(
                        "{} rate limited, retrying in {}s ({}/{})",
                        self.provider.name(),
                        delay.as_secs(),
                        attempt + 1,
                        attempts - 1
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(err) => return Err(err),
            }
        }

        Err(LlmError::RateLimited)
    }
}
