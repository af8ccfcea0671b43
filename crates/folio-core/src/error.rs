use folio_store::{DocumentError, StoreError};

/// Errors surfaced by the upload and chat pipelines.
///
/// Completion failures never appear here: both pipelines degrade those to
/// fixed user-facing fallback text instead of failing the request.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("paper not found")]
    NotFound,

    /// Rejected input, carrying the user-facing message.
    #[error("{0}")]
    InvalidInput(String),

    #[error("document processing failed: {0}")]
    Extraction(#[from] DocumentError),

    #[error("storage failed: {0}")]
    Store(#[from] StoreError),
}
