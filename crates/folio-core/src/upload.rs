//! Upload pipeline: extract text, segment it, summarize each section,
//! persist the paper.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::Duration;

use folio_llm::{CompletionProvider, RetryingClient};
use folio_store::{
    ChatStore, PaperId, PaperRecord, PaperStore, SectionKind, TextExtractor, segment_text,
};

use crate::error::PipelineError;
use crate::prompt;

const RATE_LIMITED_SUMMARY: &str =
    "Summary unavailable due to API rate limits. Please try again later.";
const FAILED_SUMMARY: &str = "Unable to generate summary due to an error.";

/// Pause after each completion call, to stay under provider rate limits.
/// Cache hits and skipped sections do not pause.
const COMPLETION_DELAY: Duration = Duration::from_secs(1);

/// Characters of section text used as the summary cache key.
const CACHE_KEY_CHARS: usize = 100;

/// Result of a processed upload.
#[derive(Debug, Clone)]
pub struct UploadOutcome {
    pub paper_id: PaperId,
    pub summaries: BTreeMap<SectionKind, String>,
}

// Per-upload summary cache keyed by a section-text prefix. Sections
// sharing their first `CACHE_KEY_CHARS` characters share a summary even
// when their remainders differ.
#[derive(Debug, Default)]
struct SectionCache {
    entries: HashMap<String, String>,
}

impl SectionCache {
    fn key(text: &str) -> String {
        text.chars().take(CACHE_KEY_CHARS).collect()
    }

    fn get(&self, text: &str) -> Option<&str> {
        self.entries.get(&Self::key(text)).map(String::as_str)
    }

    fn insert(&mut self, text: &str, summary: String) {
        self.entries.insert(Self::key(text), summary);
    }
}

/// Turns an uploaded PDF into a stored [`PaperRecord`] with per-section
/// summaries and an empty chat history.
pub struct UploadPipeline<P> {
    client: RetryingClient<P>,
    extractor: Arc<dyn TextExtractor>,
    papers: Arc<dyn PaperStore>,
    chats: Arc<dyn ChatStore>,
}

impl<P> std::fmt::Debug for UploadPipeline<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UploadPipeline").finish_non_exhaustive()
    }
}

impl<P: CompletionProvider> UploadPipeline<P> {
    #[must_use]
    pub fn new(
        client: RetryingClient<P>,
        extractor: Arc<dyn TextExtractor>,
        papers: Arc<dyn PaperStore>,
        chats: Arc<dyn ChatStore>,
    ) -> Self {
        Self {
            client,
            extractor,
            papers,
            chats,
        }
    }

    /// Process one uploaded file end to end.
    ///
    /// Summarization failures degrade to fixed fallback text per section;
    /// only extraction, storage, and input validation can fail the upload.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` unless `filename` ends in `.pdf`
    /// (case-sensitive), `Extraction` when text extraction fails, and
    /// `Store` when persisting fails.
    pub async fn process(
        &self,
        filename: &str,
        bytes: Vec<u8>,
    ) -> Result<UploadOutcome, PipelineError> {
        if !filename.ends_with(".pdf") {
            return Err(PipelineError::InvalidInput(
                "Please upload a valid PDF file".to_owned(),
            ));
        }

        tracing::info!(filename, size = bytes.len(), "processing upload");
        let text = self.extractor.extract(bytes).await?;
        let sections = segment_text(&text);

        let mut cache = SectionCache::default();
        let mut summaries = BTreeMap::new();
        for (kind, body) in &sections {
            if body.trim().is_empty() {
                continue;
            }
            if let Some(cached) = cache.get(body) {
                tracing::debug!(section = %kind, "summary served from cache");
                summaries.insert(*kind, cached.to_owned());
                continue;
            }

            let summary = self.summarize(body).await;
            cache.insert(body, summary.clone());
            summaries.insert(*kind, summary);
            tokio::time::sleep(COMPLETION_DELAY).await;
        }

        let id = PaperId::new();
        let record = PaperRecord {
            id,
            full_text: text,
            sections,
            summaries: summaries.clone(),
        };
        self.papers.put(record).await?;
        self.chats.save(id, Vec::new()).await?;

        tracing::info!(paper_id = %id, summaries = summaries.len(), "paper processed");
        Ok(UploadOutcome {
            paper_id: id,
            summaries,
        })
    }

    async fn summarize(&self, text: &str) -> String {
        match self.client.complete(&prompt::summarize_prompt(text)).await {
            Ok(summary) => summary,
            Err(err) if err.is_rate_limited() => {
                tracing::warn!(error = %err, "summarization rate limited after retries");
                RATE_LIMITED_SUMMARY.to_owned()
            }
            Err(err) => {
                tracing::error!(error = %err, "summarization failed");
                FAILED_SUMMARY.to_owned()
            }
        }
    }
}
