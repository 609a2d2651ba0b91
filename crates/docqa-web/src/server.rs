//! Axum server setup and router construction.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::routing::post;
use docqa::{CompletionModel, LlmService};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::api::{self, AppState};

/// Build the full axum router.
///
/// The router serves:
/// - `POST /api/answer`
/// - `POST /api/compare`
pub fn build_router<M: CompletionModel + 'static>(service: Arc<LlmService<M>>) -> Router {
    let app_state = AppState { service };

    // Browser frontends are served from a different origin.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/answer", post(api::post_answer::<M>))
        .route("/api/compare", post(api::post_compare::<M>))
        .with_state(app_state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// Bind `bind_addr`, serve `router` on a Tokio task, and return the bound address.
pub async fn start_server(router: Router, bind_addr: SocketAddr) -> std::io::Result<SocketAddr> {
    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, router).await {
            tracing::error!("HTTP server stopped: {e}");
        }
    });

    Ok(addr)
}
