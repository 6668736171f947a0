//! Data models for the course catalog service.
//!
//! This module contains the course record persisted by the catalog store and
//! the span and log records produced by the telemetry pipeline.

pub mod course;
pub mod log;
pub mod span;

pub use course::{Course, CourseFields, CourseValidationError, REQUIRED_FIELDS};
pub use log::{LogLevel, LogRecord};
pub use span::{Span, SpanEvent, SpanKind, SpanStatus};
