//! Course Catalog API Server Binary
//!
//! Entry point for the course catalog HTTP server.

#![deny(unsafe_code)]

use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    api::telemetry::init_tracing();

    api::run_server().await
}
