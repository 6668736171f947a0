//! Application state module.
//!
//! Defines the shared application state that is passed to route handlers.

use crate::config::Config;
use crate::telemetry::build_telemetry;
use anyhow::Result;
use shared::service::CatalogService;
use shared::storage::{CatalogStore, InMemoryCatalogStore, JsonFileCatalogStore};
use shared::telemetry::Telemetry;
use std::sync::Arc;

/// Application state shared across all request handlers.
#[derive(Clone, Debug)]
pub struct AppState {
    catalog: CatalogService,
}

impl AppState {
    /// Creates a new application state over the given store and telemetry.
    pub fn new(store: Arc<dyn CatalogStore>, telemetry: Telemetry) -> Self {
        Self {
            catalog: CatalogService::new(store, telemetry),
        }
    }

    /// Creates the state described by `config`: a file-backed catalog and
    /// telemetry writing to the configured log file and span exporter.
    ///
    /// # Errors
    ///
    /// Returns an error if the log file cannot be opened.
    pub fn from_config(config: &Config) -> Result<Self> {
        let telemetry = build_telemetry(config)?;
        let store = JsonFileCatalogStore::new(config.catalog_file.clone());
        Ok(Self::new(Arc::new(store), telemetry))
    }

    /// Creates a new application state with an in-memory store and
    /// in-memory telemetry.
    ///
    /// This is useful for development and testing.
    ///
    /// # Errors
    ///
    /// Returns an error if the request counters cannot be registered.
    pub fn with_in_memory_store() -> Result<Self> {
        let (telemetry, _, _) = Telemetry::in_memory("course-catalog-service")?;
        Ok(Self::new(Arc::new(InMemoryCatalogStore::new()), telemetry))
    }

    /// Returns the instrumented catalog service.
    #[must_use]
    pub fn catalog(&self) -> &CatalogService {
        &self.catalog
    }

    /// Returns the telemetry handles.
    #[must_use]
    pub fn telemetry(&self) -> &Telemetry {
        self.catalog.telemetry()
    }
}
