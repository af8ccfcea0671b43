use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

use axum::Json;
use axum::extract::{Multipart, State};
use folio_core::{ChatPipeline, PipelineError, UploadPipeline};
use folio_llm::provider::CompletionProvider;
use folio_store::{PaperId, SectionKind};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;

const INVALID_UPLOAD: &str = "Please upload a valid PDF file";
const UPLOAD_FAILED: &str = "Failed to process the PDF file";
const MISSING_CHAT_FIELDS: &str = "Message and paperId are required";
const PAPER_NOT_FOUND: &str = "Paper not found";
const CHAT_FAILED: &str = "Failed to process the chat message";

/// Shared state handed to every request handler.
pub(crate) struct AppState<P> {
    pub(crate) upload: Arc<UploadPipeline<P>>,
    pub(crate) chat: Arc<ChatPipeline<P>>,
    pub(crate) started_at: Instant,
}

// Derived Clone would require P: Clone; the pipelines sit behind Arcs.
impl<P> Clone for AppState<P> {
    fn clone(&self) -> Self {
        Self {
            upload: Arc::clone(&self.upload),
            chat: Arc::clone(&self.chat),
            started_at: self.started_at,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct UploadResponse {
    pub(crate) success: bool,
    pub(crate) paper_id: PaperId,
    pub(crate) summaries: BTreeMap<SectionKind, String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ChatRequest {
    #[serde(default)]
    pub(crate) message: Option<String>,
    #[serde(default)]
    pub(crate) paper_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct ChatResponse {
    pub(crate) response: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct HealthResponse {
    pub(crate) status: &'static str,
    pub(crate) uptime_secs: u64,
}

/// Accepts a multipart PDF upload, summarizes it and returns the paper id.
pub(crate) async fn upload_handler<P: CompletionProvider + 'static>(
    State(state): State<AppState<P>>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError> {
    let mut file = None;
    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(err) => {
                tracing::debug!(error = %err, "unreadable multipart request");
                return Err(ApiError::bad_request(INVALID_UPLOAD));
            }
        };
        if field.name() != Some("file") {
            continue;
        }
        let filename = field.file_name().unwrap_or_default().to_owned();
        let bytes = match field.bytes().await {
            Ok(bytes) => bytes,
            Err(err) => {
                tracing::debug!(error = %err, "failed to read uploaded file");
                return Err(ApiError::bad_request(INVALID_UPLOAD));
            }
        };
        file = Some((filename, bytes.to_vec()));
        break;
    }
    let Some((filename, bytes)) = file else {
        return Err(ApiError::bad_request(INVALID_UPLOAD));
    };

    let outcome = state
        .upload
        .process(&filename, bytes)
        .await
        .map_err(upload_error)?;

    Ok(Json(UploadResponse {
        success: true,
        paper_id: outcome.paper_id,
        summaries: outcome.summaries,
    }))
}

/// Answers a follow-up question about a previously uploaded paper.
pub(crate) async fn chat_handler<P: CompletionProvider + 'static>(
    State(state): State<AppState<P>>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    let message = request.message.filter(|m| !m.is_empty());
    let paper_id = request.paper_id.filter(|p| !p.is_empty());
    let (Some(message), Some(paper_id)) = (message, paper_id) else {
        return Err(ApiError::bad_request(MISSING_CHAT_FIELDS));
    };
    // A syntactically invalid id cannot name a stored paper; same 404.
    let Some(id) = PaperId::parse(&paper_id) else {
        return Err(ApiError::not_found(PAPER_NOT_FOUND));
    };

    let reply = state.chat.ask(id, &message).await.map_err(chat_error)?;
    Ok(Json(ChatResponse { response: reply }))
}

pub(crate) async fn health_handler<P: CompletionProvider + 'static>(
    State(state): State<AppState<P>>,
) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        uptime_secs: state.started_at.elapsed().as_secs(),
    })
}

fn upload_error(err: PipelineError) -> ApiError {
    match err {
        PipelineError::InvalidInput(message) => ApiError::bad_request(message),
        PipelineError::NotFound => ApiError::not_found(PAPER_NOT_FOUND),
        other => {
            tracing::error!(error = %other, "upload failed");
            ApiError::internal(UPLOAD_FAILED)
        }
    }
}

fn chat_error(err: PipelineError) -> ApiError {
    match err {
        PipelineError::NotFound => ApiError::not_found(PAPER_NOT_FOUND),
        PipelineError::InvalidInput(message) => ApiError::bad_request(message),
        other => {
            tracing::error!(error = %other, "chat failed");
            ApiError::internal(CHAT_FAILED)
        }
    }
}
