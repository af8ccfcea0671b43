use std::io;

/// Errors from document text extraction.
#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("file too large: {0} bytes")]
    FileTooLarge(usize),

    #[error("PDF extraction failed: {0}")]
    Pdf(String),

    #[error("text decode failed: {0}")]
    Decode(String),
}
