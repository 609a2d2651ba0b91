//! Crate-wide error type.
//!
//! Every failure other than malformed comparison JSON surfaces here and is
//! propagated to the caller as-is. Malformed comparison output is recovered
//! into [`ComparisonResult::ParseError`](crate::response::ComparisonResult)
//! instead.

use std::path::PathBuf;

use crate::prompt::TemplateError;

/// Errors produced by prompt loading, rendering, and model calls.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The requested template file does not exist.
    #[error("prompt template not found: {}", .path.display())]
    PromptNotFound { path: PathBuf },

    /// The template file exists but could not be read.
    #[error("failed to read prompt template {}: {source}", .path.display())]
    PromptRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Template(#[from] TemplateError),

    /// Missing API key or an HTTP client that could not be built.
    #[error("configuration error: {0}")]
    Config(String),

    /// Network, TLS, or timeout failure talking to the inference service.
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Non-success HTTP status from the inference service.
    #[error("Gemini API HTTP {status}: {message}")]
    Api { status: u16, message: String },

    /// A success status whose body is not a generate-content response.
    #[error("failed to parse response: {0}")]
    InvalidResponse(#[source] serde_json::Error),

    /// The model produced no text (blocked prompt, no candidates, or only
    /// non-text parts).
    #[error("model returned no text{}", .reason.as_deref().map(|r| format!(" ({r})")).unwrap_or_default())]
    EmptyCompletion { reason: Option<String> },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
