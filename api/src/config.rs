//! Server configuration module.
//!
//! Handles loading configuration from environment variables with sensible defaults.

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::path::PathBuf;

/// Server configuration.
///
/// Configuration values can be set via environment variables:
/// - `CATALOG_HOST`: The host address to bind to (default: "0.0.0.0")
/// - `CATALOG_PORT`: The port to listen on (default: 8080)
/// - `CATALOG_FILE`: Path of the course catalog JSON file (default: "`course_catalog.json`")
/// - `CATALOG_LOG_FILE`: Path of the structured log file (default: "app.log")
/// - `CATALOG_SERVICE_NAME`: Service name reported on spans (default: "course-catalog-service")
/// - `OTEL_EXPORTER_OTLP_ENDPOINT`: OTLP/gRPC collector endpoint (default: unset, spans are
///   written to diagnostic output only)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// The host address to bind to.
    pub host: String,
    /// The port to listen on.
    pub port: u16,
    /// Path of the course catalog file.
    pub catalog_file: PathBuf,
    /// Path of the structured log file.
    pub log_file: PathBuf,
    /// Service name reported on exported spans.
    pub service_name: String,
    /// OTLP collector endpoint, if span export is enabled.
    pub otlp_endpoint: Option<String>,
}

impl Config {
    /// Creates a new configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `CATALOG_PORT` is set but cannot be parsed as a valid port number
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a configuration from an arbitrary variable lookup.
    ///
    /// Empty values are treated as unset.
    ///
    /// # Errors
    ///
    /// Returns an error if the port value cannot be parsed.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        let port = var("CATALOG_PORT")
            .map(|p| p.parse::<u16>())
            .transpose()
            .context("CATALOG_PORT must be a valid port number")?
            .unwrap_or(defaults.port);

        Ok(Self {
            host: var("CATALOG_HOST").unwrap_or(defaults.host),
            port,
            catalog_file: var("CATALOG_FILE").map_or(defaults.catalog_file, PathBuf::from),
            log_file: var("CATALOG_LOG_FILE").map_or(defaults.log_file, PathBuf::from),
            service_name: var("CATALOG_SERVICE_NAME").unwrap_or(defaults.service_name),
            otlp_endpoint: var("OTEL_EXPORTER_OTLP_ENDPOINT"),
        })
    }

    /// Returns the socket address for binding.
    ///
    /// # Errors
    ///
    /// Returns an error if the host and port do not form a valid socket address.
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("Invalid socket address {}:{}", self.host, self.port))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            catalog_file: PathBuf::from("course_catalog.json"),
            log_file: PathBuf::from("app.log"),
            service_name: "course-catalog-service".to_string(),
            otlp_endpoint: None,
        }
    }
}
