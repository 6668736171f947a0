//! Health check endpoint.
//!
//! Reports liveness and the service identity spans are exported under; it
//! never touches the catalog file.

use crate::state::AppState;
use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Service status (always "healthy" if reachable).
    pub status: &'static str,
    /// Configured service name, as reported on exported spans.
    pub service: String,
    /// Server version.
    pub version: &'static str,
    /// Catalog requests served since startup, across all operations.
    pub requests_served: u64,
}

/// Creates the health check routes.
pub fn health_routes(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .with_state(state)
}

async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let telemetry = state.telemetry();
    Json(HealthResponse {
        status: "healthy",
        service: telemetry.service_name().to_string(),
        version: env!("CARGO_PKG_VERSION"),
        requests_served: telemetry.requests().snapshot().values().sum(),
    })
}
