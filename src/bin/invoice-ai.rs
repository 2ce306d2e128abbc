//! Server binary for invoice-ai.
//!
//! A thin shim over the library crate that maps CLI flags (or their env
//! vars, optionally from a `.env` file) to `ServiceConfig`, builds the
//! generation backend and serves the HTTP API.

use anyhow::{Context, Result};
use clap::Parser;
use invoice_ai::{resolve_generator, serve, AppState, ServiceConfig};
use std::io;
use std::net::IpAddr;
use tracing::info;
use tracing_subscriber::EnvFilter;

const AFTER_HELP: &str = r#"EXAMPLES:
  # Cohere (default backend), port from $PORT or 5000
  COHERE_API_KEY=... invoice-ai

  # Another provider through edgequake-llm
  OPENAI_API_KEY=... invoice-ai --provider openai --model gpt-4.1-nano

  # Local model
  invoice-ai --provider ollama --model llama3.2 --port 8080

ENDPOINTS:
  POST /api/parse          {"prompt": "..."}            → {"items": [...]}
  POST /api/generate-pdf   {"items": [...], "docType"}  → application/pdf
  GET  /health"#;

#[derive(Parser, Debug)]
#[command(
    name = "invoice-ai",
    version,
    about = "Extract invoice items with an LLM and render them to PDF over HTTP",
    after_help = AFTER_HELP
)]
struct Cli {
    /// Port to listen on.
    #[arg(short, long, env = "PORT", default_value_t = 5000)]
    port: u16,

    /// Interface to bind.
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    host: IpAddr,

    /// Generation backend: cohere, or any edgequake-llm provider name.
    #[arg(long, env = "INVOICE_AI_PROVIDER", default_value = "cohere")]
    provider: String,

    /// Model identifier for the backend [default for cohere: command].
    #[arg(short, long, env = "INVOICE_AI_MODEL")]
    model: Option<String>,

    /// Cohere API key (required for the cohere backend).
    #[arg(long, env = "COHERE_API_KEY", hide_env_values = true)]
    cohere_api_key: Option<String>,

    /// Cohere API root.
    #[arg(long, env = "COHERE_BASE_URL", default_value = invoice_ai::config::DEFAULT_COHERE_BASE_URL)]
    cohere_base_url: String,

    /// Generation token ceiling.
    #[arg(long, env = "INVOICE_AI_MAX_TOKENS", default_value_t = 500)]
    max_tokens: usize,

    /// Generation timeout in seconds.
    #[arg(long, env = "INVOICE_AI_API_TIMEOUT", default_value_t = 60)]
    api_timeout: u64,

    /// Document type used when a request omits docType.
    #[arg(long, env = "INVOICE_AI_DOC_TYPE", default_value = "Invoice")]
    doc_type: String,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "INVOICE_AI_VERBOSE")]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // `.env` must be loaded before clap reads env fallbacks.
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    info!("Starting AI Facturation Backend…");

    // ── Configuration (fatal on error) ───────────────────────────────────
    let mut builder = ServiceConfig::builder()
        .host(cli.host)
        .port(cli.port)
        .provider_name(cli.provider)
        .cohere_base_url(cli.cohere_base_url)
        .max_tokens(cli.max_tokens)
        .api_timeout_secs(cli.api_timeout)
        .default_doc_type(cli.doc_type);
    if let Some(model) = cli.model {
        builder = builder.model(model);
    }
    if let Some(key) = cli.cohere_api_key {
        builder = builder.api_key(key);
    }
    let config = builder.build().context("Invalid configuration")?;
    info!("Configuration loaded: {:?}", config);

    let generator = resolve_generator(&config).context("Failed to set up the generation backend")?;

    // ── Serve ────────────────────────────────────────────────────────────
    let addr = config.listen_addr();
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    serve(listener, AppState::new(config, generator)).await?;
    Ok(())
}
