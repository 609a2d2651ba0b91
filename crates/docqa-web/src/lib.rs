//! HTTP API for `docqa` answers and comparisons.
//!
//! `docqa-web` exposes an injected [`LlmService`] over two JSON endpoints:
//!
//! ```text
//! POST /api/answer   {"context": "...", "question": "..."}  →  {"answer": "..."}
//! POST /api/compare  {"context": "...", "question": "..."}  →  model JSON | {"error", "raw_response"}
//! ```
//!
//! # Quick start
//!
//! ```ignore
//! use std::sync::Arc;
//! use docqa::{GeminiClient, GeminiConfig, LlmService, PromptLoader};
//! use docqa_web::{WebConfig, spawn_web};
//!
//! let client = GeminiClient::new(GeminiConfig::from_env()?)?;
//! let service = Arc::new(LlmService::new(client, PromptLoader::default()));
//! let addr = spawn_web(service, WebConfig::default()).await?;
//! println!("Listening on http://{addr}");
//! ```

mod api;
mod server;

pub use api::{AnswerResponse, QueryRequest};
pub use server::build_router;

use std::net::SocketAddr;
use std::sync::Arc;

use docqa::{CompletionModel, LlmService};

/// Configuration for the web server.
pub struct WebConfig {
    /// Address to bind to. Default: `127.0.0.1:8000`.
    pub bind_addr: SocketAddr,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 8000)),
        }
    }
}

/// Spawn the web server on a Tokio task and return the bound address.
///
/// The server runs until the Tokio runtime shuts down.
pub async fn spawn_web<M: CompletionModel + 'static>(
    service: Arc<LlmService<M>>,
    config: WebConfig,
) -> std::io::Result<SocketAddr> {
    let router = server::build_router(service);
    server::start_server(router, config.bind_addr).await
}
