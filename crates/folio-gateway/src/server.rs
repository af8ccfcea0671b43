use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::Router;
use folio_core::{ChatPipeline, UploadPipeline};
use folio_llm::provider::CompletionProvider;
use folio_store::DEFAULT_MAX_INPUT_BYTES;
use tokio::net::TcpListener;
use tokio::sync::watch;

use crate::error::GatewayError;
use crate::handlers::AppState;
use crate::router::build_router;

/// HTTP server exposing the upload and chat pipelines.
pub struct GatewayServer<P> {
    addr: SocketAddr,
    auth_token: Option<String>,
    max_body_size: usize,
    upload: Arc<UploadPipeline<P>>,
    chat: Arc<ChatPipeline<P>>,
    started_at: Instant,
    shutdown_rx: watch::Receiver<bool>,
}

impl<P: CompletionProvider + 'static> GatewayServer<P> {
    /// Creates a server for the given bind address and port.
    ///
    /// An unparseable address falls back to localhost so a bad config value
    /// cannot take the process down.
    #[must_use]
    pub fn new(
        bind: &str,
        port: u16,
        upload: Arc<UploadPipeline<P>>,
        chat: Arc<ChatPipeline<P>>,
        shutdown_rx: watch::Receiver<bool>,
    ) -> Self {
        let addr: SocketAddr = format!("{bind}:{port}").parse().unwrap_or_else(|err| {
            tracing::warn!(error = %err, bind, "invalid bind address, falling back to 127.0.0.1");
            SocketAddr::from(([127, 0, 0, 1], port))
        });
        if bind == "0.0.0.0" {
            tracing::warn!("gateway binding to all interfaces (0.0.0.0)");
        }

        Self {
            addr,
            auth_token: None,
            max_body_size: DEFAULT_MAX_INPUT_BYTES,
            upload,
            chat,
            started_at: Instant::now(),
            shutdown_rx,
        }
    }

    /// Requires `Authorization: Bearer <token>` on the upload and chat routes.
    #[must_use]
    pub fn with_auth(mut self, token: Option<String>) -> Self {
        self.auth_token = token;
        self
    }

    /// Caps request bodies at `max_body_size` bytes.
    #[must_use]
    pub fn with_max_body_size(mut self, max_body_size: usize) -> Self {
        self.max_body_size = max_body_size;
        self
    }

    /// Builds the route tree without binding a socket.
    ///
    /// Lets tests drive requests through the full middleware stack in
    /// process.
    #[must_use]
    pub fn router(&self) -> Router {
        let state = AppState {
            upload: Arc::clone(&self.upload),
            chat: Arc::clone(&self.chat),
            started_at: self.started_at,
        };
        build_router(state, self.auth_token.clone(), self.max_body_size)
    }

    /// Serves requests until the shutdown signal flips to `true`.
    ///
    /// # Errors
    ///
    /// Returns an error if the listener cannot bind or the server fails.
    pub async fn serve(self) -> Result<(), GatewayError> {
        let router = self.router();
        let listener = TcpListener::bind(self.addr)
            .await
            .map_err(|e| GatewayError::Bind(self.addr.to_string(), e))?;
        tracing::info!(addr = %self.addr, "gateway listening");

        let mut shutdown_rx = self.shutdown_rx;
        axum::serve(listener, router.into_make_service())
            .with_graceful_shutdown(async move {
                while !*shutdown_rx.borrow_and_update() {
                    if shutdown_rx.changed().await.is_err() {
                        // Sender dropped without signalling; keep serving.
                        std::future::pending::<()>().await;
                    }
                }
            })
            .await
            .map_err(|e| GatewayError::Server(e.to_string()))
    }
}
