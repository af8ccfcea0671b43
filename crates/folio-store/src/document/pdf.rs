//! PDF text extraction backed by `pdf-extract`.

use super::{DEFAULT_MAX_INPUT_BYTES, DocumentError, TextExtractor};
use crate::BoxFuture;

/// Extracts text from PDF bytes on the blocking thread pool.
#[derive(Debug, Clone, Copy)]
pub struct PdfExtractor {
    pub max_input_bytes: usize,
}

impl PdfExtractor {
    #[must_use]
    pub fn new() -> Self {
        Self {
            max_input_bytes: DEFAULT_MAX_INPUT_BYTES,
        }
    }
}

impl Default for PdfExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl TextExtractor for PdfExtractor {
    fn extract(&self, bytes: Vec<u8>) -> BoxFuture<'_, Result<String, DocumentError>> {
        let max = self.max_input_bytes;
        Box::pin(async move {
            if bytes.len() > max {
                return Err(DocumentError::FileTooLarge(bytes.len()));
            }

            // pdf-extract parses synchronously and can take seconds on
            // large documents.
            let text = tokio::task::spawn_blocking(move || {
                pdf_extract::extract_text_from_mem(&bytes)
                    .map_err(|e| DocumentError::Pdf(e.to_string()))
            })
            .await
            .map_err(|e| DocumentError::Io(std::io::Error::other(e)))??;

            Ok(text)
        })
    }
}
