//! Request telemetry: counters, spans, and structured logs.
//!
//! - [`counters`] - named monotonic counters
//! - [`recorder`] - span recording and export
//! - [`emitter`] - structured JSON log records
//!
//! [`Telemetry`] bundles one of each so it can be constructed once at startup
//! and passed to every operation.

pub mod counters;
pub mod emitter;
pub mod recorder;

pub use counters::{CounterRegistry, OPERATION_LABEL};
pub use emitter::{InMemoryLogSink, JsonLinesFileSink, LogSink, LogSinkError, StructuredLogger};
pub use recorder::{
    ActiveSpan, InMemorySpanExporter, SpanExporter, SpanRecorder, TracingSpanExporter,
    ELAPSED_ATTRIBUTE,
};

use prometheus::Registry;
use std::sync::Arc;

/// Name of the per-operation request counter family.
pub const REQUESTS_METRIC: &str = "catalog_requests_total";

/// Name of the per-operation error counter family.
pub const ERRORS_METRIC: &str = "catalog_errors_total";

/// Telemetry handles shared by every operation.
///
/// Cloning is cheap and clones share the same counters, exporter, and sink.
#[derive(Clone)]
pub struct Telemetry {
    registry: Registry,
    requests: CounterRegistry,
    errors: CounterRegistry,
    recorder: SpanRecorder,
    logger: StructuredLogger,
}

impl Telemetry {
    /// Creates telemetry for `service` with counters on a fresh registry.
    ///
    /// # Errors
    ///
    /// Returns an error if the counter families cannot be registered.
    pub fn new(
        service: impl Into<Arc<str>>,
        exporter: Arc<dyn SpanExporter>,
        sink: Arc<dyn LogSink>,
    ) -> prometheus::Result<Self> {
        Self::with_registry(Registry::new(), service, exporter, sink)
    }

    /// Creates telemetry for `service` with counters registered on `registry`.
    ///
    /// # Errors
    ///
    /// Returns an error if `registry` already holds the counter families.
    pub fn with_registry(
        registry: Registry,
        service: impl Into<Arc<str>>,
        exporter: Arc<dyn SpanExporter>,
        sink: Arc<dyn LogSink>,
    ) -> prometheus::Result<Self> {
        let requests = CounterRegistry::register(
            &registry,
            REQUESTS_METRIC,
            "Requests per catalog operation",
        )?;
        let errors =
            CounterRegistry::register(&registry, ERRORS_METRIC, "Errors per catalog operation")?;
        Ok(Self {
            registry,
            requests,
            errors,
            recorder: SpanRecorder::new(service, exporter),
            logger: StructuredLogger::new(sink),
        })
    }

    /// Creates telemetry that keeps spans and log records in memory.
    ///
    /// Returns the exporter and sink so callers can inspect what was recorded.
    ///
    /// # Errors
    ///
    /// Returns an error if the counter families cannot be registered.
    pub fn in_memory(
        service: &str,
    ) -> prometheus::Result<(Self, Arc<InMemorySpanExporter>, Arc<InMemoryLogSink>)> {
        let exporter = Arc::new(InMemorySpanExporter::new());
        let sink = Arc::new(InMemoryLogSink::new());
        let telemetry = Self::new(service, exporter.clone(), sink.clone())?;
        Ok((telemetry, exporter, sink))
    }

    /// Service name stamped on every span.
    #[must_use]
    pub fn service_name(&self) -> &str {
        self.recorder.service()
    }

    /// The Prometheus registry holding both counter families.
    #[must_use]
    pub fn metrics_registry(&self) -> &Registry {
        &self.registry
    }

    /// Per-operation request counters.
    #[must_use]
    pub fn requests(&self) -> &CounterRegistry {
        &self.requests
    }

    /// Per-operation error counters.
    #[must_use]
    pub fn errors(&self) -> &CounterRegistry {
        &self.errors
    }

    /// The span recorder.
    #[must_use]
    pub fn recorder(&self) -> &SpanRecorder {
        &self.recorder
    }

    /// The structured logger.
    #[must_use]
    pub fn logger(&self) -> &StructuredLogger {
        &self.logger
    }

    /// Flushes and shuts down the span exporter.
    pub fn shutdown(&self) {
        self.recorder.shutdown();
    }
}

impl std::fmt::Debug for Telemetry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Telemetry")
            .field("requests", &self.requests)
            .field("errors", &self.errors)
            .field("recorder", &self.recorder)
            .finish_non_exhaustive()
    }
}
