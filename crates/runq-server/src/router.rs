use std::path::Path;
use std::time::Duration;

use axum::Router;
use axum::http::StatusCode;
use axum::routing::{get, post};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::services::ServeDir;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::handlers;
use crate::state::AppState;

/// Build the full application [`Router`] with all middleware layers.
///
/// The middleware stack is applied bottom-up:
///
/// 1. Structured request/response tracing
/// 2. Request timeout
/// 3. Panic recovery (catch panics, return 500)
pub fn build_router(state: AppState, static_dir: impl AsRef<Path>, request_timeout: Duration) -> Router {
    Router::new()
        .route("/", get(handlers::home))
        .route("/submit", post(handlers::submit))
        .route("/result/{*pkg}", get(handlers::result_page))
        .route("/api/status/{*pkg}", get(handlers::status))
        .route("/api/queue", get(handlers::queue_stats))
        .nest_service("/static", ServeDir::new(static_dir))
        .fallback(handlers::not_found)
        .layer(CatchPanicLayer::new())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            request_timeout,
        ))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .with_state(state)
}
