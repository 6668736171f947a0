//! Instrumented catalog operations.
//!
//! Each public operation on [`CatalogService`] follows the same shape: open a
//! span, bump the request counter, call the store, record events and
//! attributes, emit exactly one structured log record, and close the span.
//! The span guard closes on every exit path.

use crate::models::{
    Course, CourseFields, CourseValidationError, LogRecord, SpanEvent, SpanKind, SpanStatus,
};
use crate::storage::{CatalogStore, CatalogStoreError};
use crate::telemetry::{ActiveSpan, Telemetry};
use std::sync::Arc;
use thiserror::Error;

/// Message shown when a course is missing required fields.
pub const VALIDATION_MESSAGE: &str = "Course Code, Course Name and Instructor are required!";

/// Errors returned by catalog operations.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The submitted course is missing required fields.
    #[error(transparent)]
    Validation(#[from] CourseValidationError),

    /// The add request body could not be decoded into course fields.
    #[error("Unreadable course data: {0}")]
    InvalidInput(String),

    /// No course has the requested code.
    #[error("No course found with code '{0}'.")]
    NotFound(String),

    /// The backing storage is unreadable, corrupt, or unwritable.
    #[error("Storage unavailable: {0}")]
    Storage(#[from] CatalogStoreError),
}

/// Request metadata attached to every span.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    /// HTTP method.
    pub method: String,
    /// Request URL or path.
    pub url: String,
    /// Caller address, if known.
    pub client_ip: Option<String>,
}

impl RequestContext {
    /// Creates a context without a caller address.
    #[must_use]
    pub fn new(method: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            url: url.into(),
            client_ip: None,
        }
    }

    /// Sets the caller address.
    #[must_use]
    pub fn with_client_ip(mut self, ip: impl Into<String>) -> Self {
        self.client_ip = Some(ip.into());
        self
    }

    fn record_on(&self, span: &mut ActiveSpan) {
        span.set_attribute("http.method", &self.method);
        span.set_attribute("http.url", &self.url);
        span.set_attribute("user.ip", self.client_ip.as_deref().unwrap_or("unknown"));
    }
}

/// The instrumented operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// List every course.
    ListCourses,
    /// Add one course.
    AddCourse,
    /// Look up one course by code.
    ViewCourse,
    /// Delete every course with a code.
    DeleteCourse,
    /// Record a standalone server span.
    ManualTrace,
}

impl Operation {
    /// Name of the span opened for this operation.
    #[must_use]
    pub fn span_name(self) -> &'static str {
        match self {
            Self::ListCourses => "render-course-catalog",
            Self::AddCourse => "add-course",
            Self::ViewCourse => "view-course-details",
            Self::DeleteCourse => "delete-course",
            Self::ManualTrace => "manual-span",
        }
    }

    /// Key used in the request and error counter registries.
    #[must_use]
    pub fn counter_key(self) -> &'static str {
        match self {
            Self::ListCourses => "catalog",
            Self::AddCourse => "add_course",
            Self::ViewCourse => "course_details",
            Self::DeleteCourse => "delete_course",
            Self::ManualTrace => "manual_trace",
        }
    }

    /// Route recorded in log records.
    #[must_use]
    pub fn route(self) -> &'static str {
        match self {
            Self::ListCourses | Self::AddCourse => "/api/v1/courses",
            Self::ViewCourse | Self::DeleteCourse => "/api/v1/courses/{code}",
            Self::ManualTrace => "/manual-trace",
        }
    }

    /// Kind of span opened for this operation.
    #[must_use]
    pub fn span_kind(self) -> SpanKind {
        match self {
            Self::ManualTrace => SpanKind::Server,
            _ => SpanKind::Internal,
        }
    }
}

/// Catalog operations wrapped in request telemetry.
#[derive(Clone)]
pub struct CatalogService {
    store: Arc<dyn CatalogStore>,
    telemetry: Telemetry,
}

impl CatalogService {
    /// Creates a service over `store` reporting to `telemetry`.
    pub fn new(store: Arc<dyn CatalogStore>, telemetry: Telemetry) -> Self {
        Self { store, telemetry }
    }

    /// Returns the backing store.
    #[must_use]
    pub fn store(&self) -> &dyn CatalogStore {
        self.store.as_ref()
    }

    /// Returns the telemetry handles.
    #[must_use]
    pub fn telemetry(&self) -> &Telemetry {
        &self.telemetry
    }

    /// Lists every course in storage order.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Storage`] if the catalog cannot be read.
    pub fn list_all(&self, ctx: &RequestContext) -> Result<Vec<Course>, CatalogError> {
        let op = Operation::ListCourses;
        let mut span = self.begin(op, ctx);
        span.add_event("Loading course catalog");

        let courses = match self.store.load_all() {
            Ok(courses) => courses,
            Err(e) => return Err(self.storage_failure(op, &mut span, e)),
        };

        span.set_attribute("total_courses", courses.len());
        span.set_status(SpanStatus::Ok);
        self.telemetry.logger().emit(
            &LogRecord::info("Page Rendered")
                .with_field("route", op.route())
                .with_field("total_courses", courses.len())
                .with_field("processing_time", span.elapsed_secs()),
        );
        span.end();
        Ok(courses)
    }

    /// Validates and appends a course.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Validation`] without touching storage if a
    /// required field is empty, or [`CatalogError::Storage`] if the catalog
    /// cannot be read or written.
    pub fn add_one(
        &self,
        ctx: &RequestContext,
        fields: CourseFields,
    ) -> Result<Course, CatalogError> {
        let op = Operation::AddCourse;
        let mut span = self.begin(op, ctx);

        let course = Course::from(fields);
        if let Err(e) = course.validate_course() {
            let errors = self.telemetry.errors().increment(op.counter_key());
            span.add_event_with(
                SpanEvent::new("Validation failed: Missing required fields")
                    .with_attribute("missing_fields", e.missing_fields()),
            );
            span.set_attribute("error_count", errors);
            span.set_status(SpanStatus::Error);
            self.telemetry.logger().emit(
                &LogRecord::warning("Form Validation Error")
                    .with_field("route", op.route())
                    .with_field("error", "Missing required fields")
                    .with_field("missing_fields", e.missing_fields()),
            );
            return Err(e.into());
        }

        if let Err(e) = self.store.append_one(course.clone()) {
            return Err(self.storage_failure(op, &mut span, e));
        }

        span.add_event("Course saved successfully");
        span.set_attribute("course_code", &course.code);
        span.set_status(SpanStatus::Ok);
        self.telemetry.logger().emit(
            &LogRecord::info("Course Added")
                .with_field("course_code", &course.code)
                .with_field("course_name", &course.name)
                .with_field("processing_time", span.elapsed_secs()),
        );
        span.end();
        Ok(course)
    }

    /// Records an add request whose body could not be decoded.
    ///
    /// The request is counted and traced like any other add attempt, then
    /// reported as [`CatalogError::InvalidInput`]. Storage is not touched.
    pub fn reject_add(&self, ctx: &RequestContext, reason: &str) -> CatalogError {
        let op = Operation::AddCourse;
        let mut span = self.begin(op, ctx);

        let errors = self.telemetry.errors().increment(op.counter_key());
        span.add_event_with(
            SpanEvent::new("Validation failed: Unreadable course data")
                .with_attribute("error", reason),
        );
        span.set_attribute("error_count", errors);
        span.set_status(SpanStatus::Error);
        self.telemetry.logger().emit(
            &LogRecord::warning("Form Validation Error")
                .with_field("route", op.route())
                .with_field("error", reason),
        );
        CatalogError::InvalidInput(reason.to_string())
    }

    /// Returns the first course with `code`.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::NotFound`] if no course matches, or
    /// [`CatalogError::Storage`] if the catalog cannot be read.
    pub fn get_by_code(&self, ctx: &RequestContext, code: &str) -> Result<Course, CatalogError> {
        let op = Operation::ViewCourse;
        let mut span = self.begin(op, ctx);
        span.set_attribute("course_code", code);

        let found = match self.store.find_by_code(code) {
            Ok(found) => found,
            Err(e) => return Err(self.storage_failure(op, &mut span, e)),
        };

        let Some(course) = found else {
            let errors = self.telemetry.errors().increment(op.counter_key());
            span.add_event("Course not found");
            span.set_attribute("error_count", errors);
            span.set_status(SpanStatus::Error);
            self.telemetry.logger().emit(
                &LogRecord::error("Course Not Found")
                    .with_field("route", op.route())
                    .with_field("course_code", code),
            );
            return Err(CatalogError::NotFound(code.to_string()));
        };

        span.add_event("Course details rendered successfully");
        span.set_status(SpanStatus::Ok);
        self.telemetry.logger().emit(
            &LogRecord::info("Course Details Rendered")
                .with_field("course_code", &course.code)
                .with_field("processing_time", span.elapsed_secs()),
        );
        span.end();
        Ok(course)
    }

    /// Deletes every course with `code` and returns how many were removed.
    ///
    /// Deleting a code that does not exist succeeds and removes nothing.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Storage`] if the catalog cannot be read or
    /// written.
    pub fn delete_by_code(&self, ctx: &RequestContext, code: &str) -> Result<usize, CatalogError> {
        let op = Operation::DeleteCourse;
        let mut span = self.begin(op, ctx);
        span.set_attribute("course_code", code);

        let removed = match self.store.delete_by_code(code) {
            Ok(removed) => removed,
            Err(e) => return Err(self.storage_failure(op, &mut span, e)),
        };

        span.add_event("Course deleted");
        span.set_attribute("deleted_count", removed);
        span.set_status(SpanStatus::Ok);
        self.telemetry.logger().emit(
            &LogRecord::info("Course Deleted")
                .with_field("course_code", code)
                .with_field("deleted_count", removed)
                .with_field("processing_time", span.elapsed_secs()),
        );
        span.end();
        Ok(removed)
    }

    /// Records a standalone server-kind span for the request.
    pub fn manual_trace(&self, ctx: &RequestContext) {
        let op = Operation::ManualTrace;
        let mut span = self.begin(op, ctx);
        span.add_event("Processing request");
        span.set_status(SpanStatus::Ok);
        self.telemetry
            .logger()
            .emit(&LogRecord::info("Manual Trace Recorded").with_field("route", op.route()));
        span.end();
    }

    fn begin(&self, op: Operation, ctx: &RequestContext) -> ActiveSpan {
        let mut span = self
            .telemetry
            .recorder()
            .start_with_kind(op.span_name(), op.span_kind());
        let requests = self.telemetry.requests().increment(op.counter_key());
        ctx.record_on(&mut span);
        span.set_attribute("requests.count", requests);
        span
    }

    fn storage_failure(
        &self,
        op: Operation,
        span: &mut ActiveSpan,
        error: CatalogStoreError,
    ) -> CatalogError {
        let errors = self.telemetry.errors().increment(op.counter_key());
        span.add_event_with(
            SpanEvent::new("Storage unavailable").with_attribute("error", error.to_string()),
        );
        span.set_attribute("error_count", errors);
        span.set_status(SpanStatus::Error);
        self.telemetry.logger().emit(
            &LogRecord::error("Storage Error")
                .with_field("route", op.route())
                .with_field("error", error.to_string()),
        );
        CatalogError::Storage(error)
    }
}

impl std::fmt::Debug for CatalogService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogService")
            .field("telemetry", &self.telemetry)
            .finish_non_exhaustive()
    }
}
