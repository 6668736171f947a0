//! Storage traits and implementations.
//!
//! This module provides the abstraction over the course collection. The
//! `CatalogStore` trait defines whole-collection load and replace operations,
//! allowing different implementations (JSON file, in-memory, etc.) behind the
//! same callers.

pub mod catalog_store;

pub use catalog_store::{
    CatalogStore, CatalogStoreError, InMemoryCatalogStore, JsonFileCatalogStore,
};
