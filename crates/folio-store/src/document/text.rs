//! Plain-text pass-through extraction.

use super::{DEFAULT_MAX_INPUT_BYTES, DocumentError, TextExtractor};
use crate::BoxFuture;

/// Decodes bytes as UTF-8 without further processing.
///
/// Stands in for the PDF extractor in tests and local experiments where
/// producing a real PDF is overkill.
#[derive(Debug, Clone, Copy)]
pub struct PlainTextExtractor {
    pub max_input_bytes: usize,
}

impl PlainTextExtractor {
    #[must_use]
    pub fn new() -> Self {
        Self {
            max_input_bytes: DEFAULT_MAX_INPUT_BYTES,
        }
    }
}

impl Default for PlainTextExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl TextExtractor for PlainTextExtractor {
    fn extract(&self, bytes: Vec<u8>) -> BoxFuture<'_, Result<String, DocumentError>> {
        let max = self.max_input_bytes;
        Box::pin(async move {
            if bytes.len() > max {
                return Err(DocumentError::FileTooLarge(bytes.len()));
            }
            String::from_utf8(bytes).map_err(|e| DocumentError::Decode(e.to_string()))
        })
    }
}
