//! Document text extraction and section segmentation.

pub mod error;
pub mod pdf;
pub mod segment;
pub mod text;

pub use error::DocumentError;
pub use pdf::PdfExtractor;
pub use text::PlainTextExtractor;

use crate::BoxFuture;

/// Default cap on accepted document size (50 MiB).
pub const DEFAULT_MAX_INPUT_BYTES: usize = 50 * 1024 * 1024;

/// Extracts plain text from raw document bytes.
pub trait TextExtractor: Send + Sync {
    /// Produce the full plain text of the document.
    ///
    /// Takes ownership of the bytes so implementations can hand them to
    /// a blocking worker without copying.
    fn extract(&self, bytes: Vec<u8>) -> BoxFuture<'_, Result<String, DocumentError>>;
}
