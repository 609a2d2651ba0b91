//! REST endpoint handlers.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use docqa::{ComparisonResult, CompletionModel, Error, LlmService};
use serde::{Deserialize, Serialize};
use tracing::error;

/// Shared application state passed to all handlers via axum's `State` extractor.
pub struct AppState<M> {
    pub service: Arc<LlmService<M>>,
}

impl<M> Clone for AppState<M> {
    fn clone(&self) -> Self {
        Self {
            service: self.service.clone(),
        }
    }
}

/// Request body for POST /api/answer and POST /api/compare.
#[derive(Deserialize)]
pub struct QueryRequest {
    pub context: String,
    pub question: String,
}

/// Response body for POST /api/answer.
#[derive(Serialize, Deserialize, Debug)]
pub struct AnswerResponse {
    pub answer: String,
}

/// A library error rendered as `{"error": message}`.
pub struct ApiError(pub Error);

impl ApiError {
    fn status(&self) -> StatusCode {
        match self.0 {
            Error::PromptNotFound { .. }
            | Error::PromptRead { .. }
            | Error::Template(_)
            | Error::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Error::Transport(_)
            | Error::Api { .. }
            | Error::InvalidResponse(_)
            | Error::EmptyCompletion { .. } => StatusCode::BAD_GATEWAY,
        }
    }
}

impl From<Error> for ApiError {
    fn from(e: Error) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        error!("Request failed ({status}): {}", self.0);
        let body = serde_json::json!({ "error": self.0.to_string() });
        (status, Json(body)).into_response()
    }
}

/// POST /api/answer: free-text answer.
pub async fn post_answer<M: CompletionModel + 'static>(
    State(app): State<AppState<M>>,
    Json(body): Json<QueryRequest>,
) -> Result<Json<AnswerResponse>, ApiError> {
    let answer = app
        .service
        .generate_answer(&body.context, &body.question)
        .await?;
    Ok(Json(AnswerResponse { answer }))
}

/// POST /api/compare: structured comparison.
///
/// Returns 200 with either the model's JSON or the
/// `{"error", "raw_response"}` record when that JSON did not parse.
pub async fn post_compare<M: CompletionModel + 'static>(
    State(app): State<AppState<M>>,
    Json(body): Json<QueryRequest>,
) -> Result<Json<ComparisonResult>, ApiError> {
    let result = app
        .service
        .generate_comparison(&body.context, &body.question)
        .await?;
    Ok(Json(result))
}
