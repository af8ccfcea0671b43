//! Test-only mock completion provider.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use crate::error::LlmError;
use crate::provider::CompletionProvider;

#[derive(Debug, Clone)]
pub struct MockProvider {
    outcomes: Arc<Mutex<VecDeque<Result<String, LlmError>>>>,
    prompts: Arc<Mutex<Vec<String>>>,
    pub default_response: String,
    pub fail_rate_limited: bool,
    pub fail_completion: bool,
    /// Milliseconds to sleep before returning a response.
    pub delay_ms: u64,
}

impl Default for MockProvider {
    fn default() -> Self {
        Self {
            outcomes: Arc::new(Mutex::new(VecDeque::new())),
            prompts: Arc::new(Mutex::new(Vec::new())),
            default_response: "mock response".into(),
            fail_rate_limited: false,
            fail_completion: false,
            delay_ms: 0,
        }
    }
}

impl MockProvider {
    #[must_use]
    pub fn with_responses(responses: Vec<String>) -> Self {
        Self {
            outcomes: Arc::new(Mutex::new(responses.into_iter().map(Ok).collect())),
            ..Self::default()
        }
    }

    /// Script an explicit per-call outcome sequence; once drained, the
    /// default response is returned.
    #[must_use]
    pub fn with_outcomes(outcomes: Vec<Result<String, LlmError>>) -> Self {
        Self {
            outcomes: Arc::new(Mutex::new(outcomes.into())),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn failing() -> Self {
        Self {
            fail_completion: true,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn rate_limited() -> Self {
        Self {
            fail_rate_limited: true,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_delay(mut self, ms: u64) -> Self {
        self.delay_ms = ms;
        self
    }

    /// Prompts received so far, in call order.
    #[must_use]
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    #[must_use]
    pub fn call_count(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }
}

impl CompletionProvider for MockProvider {
    async fn complete(&self, prompt: &str) -> Result<String, LlmError> {
        if self.delay_ms > 0 {
            tokio::time::sleep(std::time::Duration::from_millis(self.delay_ms)).await;
        }
        self.prompts.lock().unwrap().push(prompt.to_owned());
        if let Some(outcome) = self.outcomes.lock().unwrap().pop_front() {
            return outcome;
        }
        if self.fail_rate_limited {
            return Err(LlmError::RateLimited);
        }
        if self.fail_completion {
            return Err(LlmError::Other("mock completion error".into()));
        }
        Ok(self.default_response.clone())
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}
