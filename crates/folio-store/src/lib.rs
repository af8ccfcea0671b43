//! Storage layer for folio: paper records, chat histories, and document
//! text extraction.
//!
//! Stores are dyn-compatible traits with in-memory implementations backed
//! by `std::sync::RwLock`. Durable backends can slot in behind the same
//! traits without touching the pipelines.

pub mod chat;
pub mod document;
pub mod error;
pub mod paper;
pub mod types;

pub use chat::{ChatStore, InMemoryChatStore};
pub use document::segment::segment_text;
pub use document::{
    DEFAULT_MAX_INPUT_BYTES, DocumentError, PdfExtractor, PlainTextExtractor, TextExtractor,
};
pub use error::StoreError;
pub use paper::{InMemoryPaperStore, PaperStore};
pub use types::{ChatMessage, ChatRole, PaperId, PaperRecord, SectionKind};

/// Boxed future returned by the dyn-compatible storage and extraction traits.
pub type BoxFuture<'a, T> = std::pin::Pin<Box<dyn std::future::Future<Output = T> + Send + 'a>>;
