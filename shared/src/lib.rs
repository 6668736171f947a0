//! Course Catalog Shared Library
//!
//! This crate contains the course catalog core: the record model, the
//! file-backed catalog store, and the request telemetry pipeline that wraps
//! every catalog operation.
//!
//! # Modules
//!
//! - [`models`] - Course, span, and log record models
//! - [`storage`] - Catalog storage trait and implementations
//! - [`telemetry`] - Counters, span recording, and structured logging
//! - [`service`] - Instrumented catalog operations
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use shared::models::CourseFields;
//! use shared::service::{CatalogService, RequestContext};
//! use shared::storage::InMemoryCatalogStore;
//! use shared::telemetry::Telemetry;
//!
//! let (telemetry, spans, logs) = Telemetry::in_memory("course-catalog-service").unwrap();
//! let service = CatalogService::new(Arc::new(InMemoryCatalogStore::new()), telemetry);
//! let ctx = RequestContext::new("POST", "/api/v1/courses");
//!
//! let fields = CourseFields {
//!     code: "CS101".into(),
//!     name: "Intro".into(),
//!     instructor: "Dr. X".into(),
//!     ..CourseFields::default()
//! };
//! service.add_one(&ctx, fields).unwrap();
//!
//! assert_eq!(service.get_by_code(&ctx, "CS101").unwrap().name, "Intro");
//! assert_eq!(spans.len(), 2);
//! assert_eq!(logs.len(), 2);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod models;
pub mod service;
pub mod storage;
pub mod telemetry;

/// Re-export common dependencies for convenience.
pub use chrono;
pub use prometheus;
pub use serde;
pub use serde_json;
pub use validator;
