#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON parse failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("rate limited")]
    RateLimited,

    #[error("empty response from {provider}")]
    EmptyResponse { provider: &'static str },

    #[error("API request failed (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, LlmError>;

impl LlmError {
    /// Whether this failure signals rate limiting or quota exhaustion.
    ///
    /// Matches explicit 429 responses plus the markers the Gemini API embeds
    /// in error bodies served under other statuses.
    #[must_use]
    pub fn is_rate_limited(&self) -> bool {
        match self {
            Self::RateLimited => true,
            Self::Api { message, .. } => is_rate_limit_text(message),
            Self::Http(e) => e.status() == Some(reqwest::StatusCode::TOO_MANY_REQUESTS),
            _ => false,
        }
    }
}

fn is_rate_limit_text(text: &str) -> bool {
    text.contains("RESOURCE_EXHAUSTED") || text.contains("rate limit") || text.contains("quota")
}
