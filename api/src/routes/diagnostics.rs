//! Manual trace, counter snapshot, and Prometheus scrape endpoints.

use crate::extract::RequestMeta;
use crate::state::AppState;
use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use prometheus::{Encoder, TextEncoder};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Snapshot of the request and error counters.
#[derive(Debug, Serialize, Deserialize)]
pub struct CountersResponse {
    pub requests: BTreeMap<String, u64>,
    pub errors: BTreeMap<String, u64>,
}

/// Creates the diagnostic routes.
pub fn diagnostics_routes(state: AppState) -> Router {
    Router::new()
        .route("/manual-trace", get(manual_trace))
        .route("/api/v1/counters", get(counters))
        .route("/metrics", get(metrics))
        .with_state(state)
}

async fn manual_trace(
    State(state): State<AppState>,
    RequestMeta(ctx): RequestMeta,
) -> (StatusCode, &'static str) {
    let catalog = state.catalog().clone();
    match tokio::task::spawn_blocking(move || catalog.manual_trace(&ctx)).await {
        Ok(()) => (StatusCode::OK, "Manual trace recorded!"),
        Err(e) => {
            tracing::error!(error = %e, "Manual trace task failed");
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
        }
    }
}

async fn counters(State(state): State<AppState>) -> Json<CountersResponse> {
    let telemetry = state.telemetry();
    Json(CountersResponse {
        requests: telemetry.requests().snapshot(),
        errors: telemetry.errors().snapshot(),
    })
}

async fn metrics(State(state): State<AppState>) -> impl IntoResponse {
    let encoder = TextEncoder::new();
    let families = state.telemetry().metrics_registry().gather();

    let mut buffer = Vec::new();
    match encoder.encode(&families, &mut buffer) {
        Ok(()) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4; charset=utf-8")],
            buffer,
        ),
        Err(e) => {
            tracing::error!(error = %e, "Failed to encode metrics");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
                b"Failed to encode metrics".to_vec(),
            )
        }
    }
}
