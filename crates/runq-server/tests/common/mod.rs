//! Shared helpers for the HTTP integration tests.
//!
//! The router is the same one `main.rs` builds, backed by an in-memory result
//! store and a scripted executor instead of SQLite and a real process.

#![allow(dead_code)]

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, Response, header};
use http_body_util::BodyExt;
use tower::ServiceExt;

use runq_core::impls::{InMemoryResultStore, ScriptedExecutor};
use runq_core::{App, AppBuilder, RunnerConfig};
use runq_server::router::build_router;
use runq_server::state::AppState;

pub fn build_app(executor: ScriptedExecutor, config: RunnerConfig) -> App {
    AppBuilder::new()
        .config(config)
        .store(Arc::new(InMemoryResultStore::new()))
        .executor(Arc::new(executor))
        .build()
        .unwrap()
}

pub fn router_for(app: &App, static_dir: &Path) -> Router {
    build_router(AppState::new(app.service()), static_dir, Duration::from_secs(30))
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    let request = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

/// POST an `application/x-www-form-urlencoded` body.
pub async fn post_form(app: Router, uri: &str, body: &str) -> Response<Body> {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .unwrap()
        .to_bytes()
        .to_vec()
}

pub async fn body_text(response: Response<Body>) -> String {
    String::from_utf8(body_bytes(response).await).unwrap()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

pub fn location(response: &Response<Body>) -> String {
    response
        .headers()
        .get(header::LOCATION)
        .expect("Location header")
        .to_str()
        .unwrap()
        .to_string()
}
