//! Serve `docqa` answers and comparisons over HTTP.
//!
//! Reads the API key from the `GEMINI_API_KEY` environment variable.
//!
//! # Usage
//!
//! ```bash
//! GEMINI_API_KEY=... cargo run -p docqa-web
//! GEMINI_API_KEY=... cargo run -p docqa-web -- --port 9000 --model gemini-2.5-pro
//! GEMINI_API_KEY=... cargo run -p docqa-web -- --prompts-dir ./my-prompts
//! ```
//!
//! ```bash
//! curl -s localhost:8000/api/compare -H 'content-type: application/json' \
//!   -d '{"context": "A costs 1. B costs 2.", "question": "Which is cheaper?"}'
//! ```

use std::net::IpAddr;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use docqa::{DEFAULT_MODEL, GeminiClient, GeminiConfig, LlmService, PromptLoader};
use docqa_web::{WebConfig, spawn_web};
use tracing::info;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// HTTP API for prompt-templated answers and comparisons.
#[derive(Parser)]
#[command(name = "docqa-web")]
struct Args {
    /// Address to bind.
    #[arg(long, default_value = "127.0.0.1")]
    host: IpAddr,

    /// Port to listen on.
    #[arg(long, default_value_t = 8000)]
    port: u16,

    /// Gemini model identifier.
    #[arg(long, default_value = DEFAULT_MODEL)]
    model: String,

    /// Directory containing qa_prompt.txt and compare_prompt.txt.
    /// Defaults to the bundled templates.
    #[arg(long)]
    prompts_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), String> {
    let args = Args::parse();

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // One client per process, shared by every request.
    let config = GeminiConfig::from_env()
        .map_err(|e| e.to_string())?
        .with_model(args.model);
    let client = GeminiClient::new(config).map_err(|e| e.to_string())?;

    let prompts = args
        .prompts_dir
        .map(PromptLoader::new)
        .unwrap_or_default();

    let service = Arc::new(LlmService::new(client, prompts));
    info!(
        "Serving model {} with prompts from {}",
        service.model().config().model,
        service.prompts().dir().display()
    );
    let web_config = WebConfig {
        bind_addr: (args.host, args.port).into(),
    };
    let addr = spawn_web(service, web_config)
        .await
        .map_err(|e| format!("failed to bind {}:{}: {e}", args.host, args.port))?;
    println!("Listening on http://{addr}");

    tokio::signal::ctrl_c()
        .await
        .map_err(|e| format!("failed to listen for shutdown signal: {e}"))?;
    info!("Shutting down");
    Ok(())
}
