//! Completion provider abstraction with a Gemini backend and bounded retry.

pub mod error;
pub mod gemini;
pub mod http;
#[cfg(feature = "mock")]
pub mod mock;
pub mod provider;
pub mod retry;

pub use error::LlmError;
pub use provider::CompletionProvider;
pub use retry::{RetryPolicy, RetryingClient};
