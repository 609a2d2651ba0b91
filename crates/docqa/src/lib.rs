//! Prompt-templated question answering and comparison over the Gemini API.
//!
//! `docqa` loads a prompt template from disk, substitutes a `context` and a
//! `question`, sends the result to a Gemini model with deterministic decoding
//! (temperature 0), and hands back either the answer text or, in comparison
//! mode, the model's JSON output parsed into a [`ComparisonResult`].
//!
//! # Getting started
//!
//! ```ignore
//! use docqa::{GeminiClient, GeminiConfig, LlmService, PromptLoader};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), docqa::Error> {
//!     let client = GeminiClient::new(GeminiConfig::from_env()?)?;
//!     let service = LlmService::new(client, PromptLoader::default());
//!
//!     let answer = service
//!         .generate_answer("Rust 1.0 shipped in May 2015.", "When did Rust 1.0 ship?")
//!         .await?;
//!     println!("{answer}");
//!     Ok(())
//! }
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`prompt`] | [`PromptLoader`] and template rendering |
//! | [`model`] | [`CompletionModel`] trait implemented by [`GeminiClient`] |
//! | [`response`] | Code-fence cleanup and [`ComparisonResult`] parsing |
//! | [`service`] | [`LlmService`]: answer and comparison pipelines |
//! | [`config`] | [`GeminiConfig`] |
//! | [`error`] | [`Error`] and [`Result`] |
//!
//! Nothing is retried, streamed, or cached. Each operation is one template
//! read and one network round trip.

pub mod config;
pub mod error;
pub mod model;
pub mod prompt;
pub mod response;
pub mod service;

pub use config::GeminiConfig;
pub use error::{Error, Result};
pub use model::{CompletionFuture, CompletionModel};
pub use prompt::PromptLoader;
pub use response::ComparisonResult;
pub use service::LlmService;

use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, trace};

// ── Constants ──────────────────────────────────────────────────────

pub const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Default model for all calls.
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Environment variable holding the API key.
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

// ── Request types ──────────────────────────────────────────────────

/// Body of a `models/{model}:generateContent` call.
#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
    pub generation_config: GenerationConfig,
}

impl GenerateContentRequest {
    /// A single user turn carrying `prompt`.
    pub fn from_prompt(prompt: impl Into<String>, generation_config: GenerationConfig) -> Self {
        Self {
            contents: vec![Content::user(prompt)],
            generation_config,
        }
    }
}

/// A conversation turn.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<Part>,
}

impl Content {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Some("user".to_string()),
            parts: vec![Part::text(text)],
        }
    }
}

/// One piece of a turn. Only text parts are produced or consumed here.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Set on reasoning summaries, which are not part of the answer text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thought: Option<bool>,
}

impl Part {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            thought: None,
        }
    }
}

/// Sampling parameters. `temperature` is always serialized because the
/// service default is not zero.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub temperature: f32,
}

impl GenerationConfig {
    /// Greedy decoding: temperature 0.
    pub fn deterministic() -> Self {
        Self { temperature: 0.0 }
    }
}

// ── Response types ─────────────────────────────────────────────────

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct RawGenerateContentResponse {
    #[serde(default)]
    candidates: Vec<RawCandidate>,
    usage_metadata: Option<UsageMetadata>,
    prompt_feedback: Option<RawPromptFeedback>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct RawCandidate {
    content: Option<Content>,
    finish_reason: Option<String>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct RawPromptFeedback {
    block_reason: Option<String>,
}

#[derive(Deserialize, Debug)]
struct RawErrorEnvelope {
    error: RawApiError,
}

#[derive(Deserialize, Debug)]
struct RawApiError {
    message: String,
}

/// Token usage statistics.
#[derive(Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UsageMetadata {
    pub prompt_token_count: Option<u32>,
    pub candidates_token_count: Option<u32>,
    pub total_token_count: Option<u32>,
}

/// Clean return type from [`GeminiClient::generate_content`].
#[derive(Debug, Clone, Default)]
pub struct Completion {
    /// Concatenated non-thought text parts of the first candidate.
    pub text: Option<String>,
    pub finish_reason: Option<String>,
    /// Set when the prompt itself was blocked.
    pub block_reason: Option<String>,
    pub usage: Option<UsageMetadata>,
}

impl Completion {
    fn from_raw(raw: RawGenerateContentResponse) -> Self {
        let block_reason = raw.prompt_feedback.and_then(|f| f.block_reason);
        let Some(candidate) = raw.candidates.into_iter().next() else {
            return Self {
                text: None,
                finish_reason: None,
                block_reason,
                usage: raw.usage_metadata,
            };
        };

        let texts: Vec<String> = candidate
            .content
            .map(|c| c.parts)
            .unwrap_or_default()
            .into_iter()
            .filter(|p| p.thought != Some(true))
            .filter_map(|p| p.text)
            .collect();

        Self {
            text: if texts.is_empty() {
                None
            } else {
                Some(texts.concat())
            },
            finish_reason: candidate.finish_reason,
            block_reason,
            usage: raw.usage_metadata,
        }
    }
}

// ── Client ─────────────────────────────────────────────────────────

/// Async HTTP client for the Gemini generate-content API.
///
/// Construct one per process and share it; the inner `reqwest::Client` pools
/// connections.
pub struct GeminiClient {
    client: reqwest::Client,
    config: GeminiConfig,
}

impl GeminiClient {
    pub fn new(config: GeminiConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder().user_agent(concat!(
            env!("CARGO_PKG_NAME"),
            "/",
            env!("CARGO_PKG_VERSION")
        ));
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| Error::Config(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &GeminiConfig {
        &self.config
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.config.base_url, self.config.model
        )
    }

    /// Send one generate-content request.
    pub async fn generate_content(&self, body: &GenerateContentRequest) -> Result<Completion> {
        let prompt_chars: usize = body
            .contents
            .iter()
            .flat_map(|c| &c.parts)
            .filter_map(|p| p.text.as_ref())
            .map(|t| t.len())
            .sum();
        debug!(
            "LLM request: model={}, contents={}, prompt={} bytes, temp={}",
            self.config.model,
            body.contents.len(),
            prompt_chars,
            body.generation_config.temperature,
        );
        trace!(
            "Request payload size: {} bytes",
            serde_json::to_string(body).map_or(0, |s| s.len())
        );

        let start = Instant::now();

        let resp = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.config.api_key)
            .json(body)
            .send()
            .await?;

        let status = resp.status();
        let text = resp.text().await?;

        debug!(
            "LLM response: HTTP {} in {:.1}s ({} bytes)",
            status,
            start.elapsed().as_secs_f64(),
            text.len()
        );

        if !status.is_success() {
            let message = serde_json::from_str::<RawErrorEnvelope>(&text)
                .map(|env| env.error.message)
                .unwrap_or(text);
            return Err(Error::Api {
                status: status.as_u16(),
                message,
            });
        }

        let raw: RawGenerateContentResponse =
            serde_json::from_str(&text).map_err(Error::InvalidResponse)?;
        let completion = Completion::from_raw(raw);

        if let Some(ref usage) = completion.usage {
            debug!(
                "Token usage: prompt={}, completion={}, total={}",
                usage.prompt_token_count.unwrap_or(0),
                usage.candidates_token_count.unwrap_or(0),
                usage.total_token_count.unwrap_or(0),
            );
        }

        Ok(completion)
    }
}

impl CompletionModel for GeminiClient {
    fn model_id(&self) -> &str {
        &self.config.model
    }

    fn complete<'a>(&'a self, prompt: &'a str) -> CompletionFuture<'a> {
        Box::pin(async move {
            let body = GenerateContentRequest::from_prompt(prompt, GenerationConfig::deterministic());
            let completion = self.generate_content(&body).await?;
            match completion.text {
                Some(text) => Ok(text.trim().to_string()),
                None => Err(Error::EmptyCompletion {
                    reason: completion.block_reason.or(completion.finish_reason),
                }),
            }
        })
    }
}
