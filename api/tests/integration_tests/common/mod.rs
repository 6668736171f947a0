//! Common test utilities and helpers for integration tests.
//!
//! This module provides shared functionality used across all integration tests,
//! including test app setup and HTTP request helpers.

use api::{create_router, AppState};
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use shared::storage::{CatalogStore, InMemoryCatalogStore, JsonFileCatalogStore};
use shared::telemetry::{InMemoryLogSink, InMemorySpanExporter, Telemetry};
use std::path::Path;
use std::sync::Arc;

/// A router plus handles for inspecting what it recorded.
pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub spans: Arc<InMemorySpanExporter>,
    pub logs: Arc<InMemoryLogSink>,
}

impl TestApp {
    /// Returns a fresh clone of the router for a single request.
    pub fn app(&self) -> Router {
        self.router.clone()
    }
}

fn build(store: Arc<dyn CatalogStore>) -> TestApp {
    let (telemetry, spans, logs) = Telemetry::in_memory("course-catalog-service").unwrap();
    let state = AppState::new(store, telemetry);
    TestApp {
        router: create_router(state.clone()),
        state,
        spans,
        logs,
    }
}

/// Creates a test app over a fresh in-memory store.
pub fn test_app() -> TestApp {
    build(Arc::new(InMemoryCatalogStore::new()))
}

/// Creates a test app over a catalog file at `path`.
pub fn file_app(path: &Path) -> TestApp {
    build(Arc::new(JsonFileCatalogStore::new(path)))
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = tower::ServiceExt::oneshot(app, request).await.unwrap();

    let status = response.status();
    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: Value = serde_json::from_slice(&body_bytes).unwrap_or(Value::Null);

    (status, json)
}

/// Helper to make a POST request with JSON body.
pub async fn post_json(app: Router, uri: &str, body: Value) -> (StatusCode, Value) {
    send(
        app,
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_string(&body).unwrap()))
            .unwrap(),
    )
    .await
}

/// Helper to make a POST request with a form-encoded body.
pub async fn post_form(app: Router, uri: &str, body: &'static str) -> (StatusCode, Value) {
    send(
        app,
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body))
            .unwrap(),
    )
    .await
}

/// Helper to make a POST request with a raw body and content type.
pub async fn post_raw(
    app: Router,
    uri: &str,
    content_type: &str,
    body: &'static str,
) -> (StatusCode, Value) {
    send(
        app,
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, content_type)
            .body(Body::from(body))
            .unwrap(),
    )
    .await
}

/// Helper to make a GET request.
pub async fn get(app: Router, uri: &str) -> (StatusCode, Value) {
    send(
        app,
        Request::builder()
            .method("GET")
            .uri(uri)
            .body(Body::empty())
            .unwrap(),
    )
    .await
}

/// Helper to make a DELETE request.
pub async fn delete(app: Router, uri: &str) -> (StatusCode, Value) {
    send(
        app,
        Request::builder()
            .method("DELETE")
            .uri(uri)
            .body(Body::empty())
            .unwrap(),
    )
    .await
}

/// Helper to make a GET request returning the body as text.
pub async fn get_text(app: Router, uri: &str) -> (StatusCode, String) {
    let response = tower::ServiceExt::oneshot(
        app,
        Request::builder().uri(uri).body(Body::empty()).unwrap(),
    )
    .await
    .unwrap();

    let status = response.status();
    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, String::from_utf8_lossy(&body_bytes).into_owned())
}
