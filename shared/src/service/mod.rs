//! Catalog operations consumed by route handlers.

pub mod catalog;

pub use catalog::{CatalogError, CatalogService, Operation, RequestContext, VALIDATION_MESSAGE};
