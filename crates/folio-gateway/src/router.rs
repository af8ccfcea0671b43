use axum::Router;
use axum::extract::{DefaultBodyLimit, Request, State};
use axum::http::StatusCode;
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::{get, post};
use folio_llm::provider::CompletionProvider;
use subtle::ConstantTimeEq;
use tower_http::limit::RequestBodyLimitLayer;

use crate::handlers::{AppState, chat_handler, health_handler, upload_handler};

#[derive(Clone)]
struct AuthConfig {
    token: Option<String>,
}

/// Assembles the gateway routes.
///
/// `/papers` and `/chat` sit behind the optional bearer token and the body
/// size cap; `/health` stays open for probes.
pub(crate) fn build_router<P: CompletionProvider + 'static>(
    state: AppState<P>,
    auth_token: Option<String>,
    max_body_size: usize,
) -> Router {
    let auth = AuthConfig { token: auth_token };

    // Axum caps extractor bodies at 2 MiB on its own; raise both limits
    // together so uploads up to max_body_size get through.
    let protected = Router::new()
        .route("/papers", post(upload_handler::<P>))
        .route("/chat", post(chat_handler::<P>))
        .layer(middleware::from_fn_with_state(auth, auth_middleware))
        .layer(DefaultBodyLimit::max(max_body_size))
        .layer(RequestBodyLimitLayer::new(max_body_size));

    Router::new()
        .route("/health", get(health_handler::<P>))
        .merge(protected)
        .with_state(state)
}

async fn auth_middleware(
    State(auth): State<AuthConfig>,
    request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let Some(expected) = auth.token.as_deref() else {
        return Ok(next.run(request).await);
    };

    let provided = request
        .headers()
        .get("authorization")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .unwrap_or("");

    // Hash both values to fixed-length digests to avoid leaking token length.
    let provided_hash = blake3::hash(provided.as_bytes());
    let expected_hash = blake3::hash(expected.as_bytes());
    if bool::from(provided_hash.as_bytes().ct_eq(expected_hash.as_bytes())) {
        Ok(next.run(request).await)
    } else {
        Err(StatusCode::UNAUTHORIZED)
    }
}
