//! Folio binary: serve the HTTP gateway or chat with a paper from the
//! terminal.

use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use folio_core::{ChatPipeline, Config, UploadPipeline};
use folio_gateway::GatewayServer;
use folio_llm::gemini::GeminiProvider;
use folio_llm::retry::RetryingClient;
use folio_store::{
    ChatStore, InMemoryChatStore, InMemoryPaperStore, PaperStore, PdfExtractor, TextExtractor,
};
use tokio::sync::watch;

/// Folio: per-section summaries of research papers with follow-up chat.
#[derive(Parser, Debug)]
#[command(name = "folio", version, about, long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "folio.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Run the HTTP gateway
    Serve,
    /// Summarize a PDF and ask questions about it from the terminal
    Chat {
        /// Path to the PDF file
        pdf: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_env("FOLIO_LOG")
        .or_else(|_| tracing_subscriber::EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let cli = Cli::parse();
    let config = Config::load(&cli.config)?;

    let api_key = config
        .llm
        .api_key
        .clone()
        .context("GOOGLE_GEMINI_API_KEY is not set")?;
    let provider = GeminiProvider::new(api_key, config.llm.model.clone())
        .with_base_url(&config.llm.base_url);

    let papers: Arc<dyn PaperStore> = Arc::new(InMemoryPaperStore::new());
    let chats: Arc<dyn ChatStore> = Arc::new(InMemoryChatStore::new());
    let extractor: Arc<dyn TextExtractor> = Arc::new(PdfExtractor::new());
    let upload = Arc::new(UploadPipeline::new(
        RetryingClient::new(provider.clone()),
        extractor,
        Arc::clone(&papers),
        Arc::clone(&chats),
    ));
    let chat = Arc::new(ChatPipeline::new(
        RetryingClient::new(provider),
        papers,
        chats,
    ));

    match cli.command {
        Commands::Serve => serve(&config, upload, chat).await,
        Commands::Chat { pdf } => chat_session(&pdf, upload, chat).await,
    }
}

async fn serve(
    config: &Config,
    upload: Arc<UploadPipeline<GeminiProvider>>,
    chat: Arc<ChatPipeline<GeminiProvider>>,
) -> anyhow::Result<()> {
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to listen for ctrl-c: {e:#}");
            return;
        }
        tracing::info!("received shutdown signal");
        let _ = shutdown_tx.send(true);
    });

    GatewayServer::new(
        &config.gateway.bind,
        config.gateway.port,
        upload,
        chat,
        shutdown_rx,
    )
    .with_auth(config.gateway.auth_token.clone())
    .with_max_body_size(config.gateway.max_body_size)
    .serve()
    .await?;

    Ok(())
}

async fn chat_session(
    pdf: &Path,
    upload: Arc<UploadPipeline<GeminiProvider>>,
    chat: Arc<ChatPipeline<GeminiProvider>>,
) -> anyhow::Result<()> {
    let filename = pdf
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or_default()
        .to_owned();
    let bytes = std::fs::read(pdf)
        .with_context(|| format!("failed to read {}", pdf.display()))?;

    println!("Processing {filename}...");
    let outcome = upload.process(&filename, bytes).await?;

    println!();
    for (kind, summary) in &outcome.summaries {
        println!("{}:\n{summary}\n", kind.as_str().to_uppercase());
    }
    println!("Ask questions about the paper. Type \"exit\" to quit.\n");

    let stdin = io::stdin();
    loop {
        print!("> ");
        io::stdout().flush()?;

        let mut input = String::new();
        if stdin.lock().read_line(&mut input).is_err() || input.is_empty() {
            break;
        }
        let question = input.trim();
        if question.is_empty() {
            continue;
        }
        if question.eq_ignore_ascii_case("exit") || question.eq_ignore_ascii_case("quit") {
            break;
        }

        let reply = chat.ask(outcome.paper_id, question).await?;
        println!("\n{reply}\n");
    }

    Ok(())
}
