//! Core pipelines for folio: turn an uploaded paper into per-section
//! summaries, then answer follow-up questions grounded in them.
//!
//! Pipelines are generic over the completion provider and hold their
//! stores and extractor behind trait objects, so tests swap in mocks
//! without touching pipeline logic.

pub mod chat;
pub mod config;
pub mod error;
pub mod prompt;
pub mod upload;

pub use chat::ChatPipeline;
pub use config::{Config, GatewayConfig, LlmConfig};
pub use error::PipelineError;
pub use upload::{UploadOutcome, UploadPipeline};
