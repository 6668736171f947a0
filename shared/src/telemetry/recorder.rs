//! Span recording.
//!
//! A [`SpanRecorder`] opens [`ActiveSpan`] guards. The guard owns its span
//! until it is closed, either explicitly with [`ActiveSpan::end`] or by being
//! dropped on any early-return path. Closing stamps the elapsed time and end
//! timestamp and hands the finished [`Span`] to a [`SpanExporter`].

use crate::models::{Span, SpanEvent, SpanKind, SpanStatus};
use serde::Serialize;
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};

/// Attribute holding the span's elapsed wall-clock time in seconds.
pub const ELAPSED_ATTRIBUTE: &str = "processing_time";

/// Destination for completed spans.
///
/// Exporting must never fail the caller; implementations swallow or log
/// delivery errors themselves.
pub trait SpanExporter: Send + Sync {
    /// Accepts one completed span.
    fn export(&self, span: Span);

    /// Flushes buffered spans and releases resources.
    fn shutdown(&self) {}
}

/// Exporter that keeps every completed span in memory.
#[derive(Debug, Default)]
pub struct InMemorySpanExporter {
    spans: RwLock<Vec<Span>>,
}

impl InMemorySpanExporter {
    /// Creates an empty exporter.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of every exported span in close order.
    #[must_use]
    pub fn spans(&self) -> Vec<Span> {
        self.spans
            .read()
            .map(|spans| spans.clone())
            .unwrap_or_default()
    }

    /// Returns the number of exported spans.
    #[must_use]
    pub fn len(&self) -> usize {
        self.spans.read().map(|spans| spans.len()).unwrap_or(0)
    }

    /// Returns true if nothing has been exported.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl SpanExporter for InMemorySpanExporter {
    fn export(&self, span: Span) {
        if let Ok(mut spans) = self.spans.write() {
            spans.push(span);
        }
    }
}

/// Exporter that writes each completed span as a `debug` tracing event.
///
/// Used when no trace collector is configured, so span data still shows up in
/// diagnostic output.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSpanExporter;

impl SpanExporter for TracingSpanExporter {
    fn export(&self, span: Span) {
        tracing::debug!(
            span.name = %span.name,
            span.kind = %span.kind,
            span.status = %span.status,
            duration_ms = span.duration_ms(),
            attributes = %serde_json::to_string(&span.attributes).unwrap_or_default(),
            events = ?span.event_names(),
            "Span completed"
        );
    }
}

/// Opens spans and routes them to an exporter once closed.
#[derive(Clone)]
pub struct SpanRecorder {
    service: Arc<str>,
    exporter: Arc<dyn SpanExporter>,
}

impl SpanRecorder {
    /// Creates a recorder that tags spans with `service`.
    pub fn new(service: impl Into<Arc<str>>, exporter: Arc<dyn SpanExporter>) -> Self {
        Self {
            service: service.into(),
            exporter,
        }
    }

    /// Opens an internal-kind span.
    #[must_use]
    pub fn start(&self, name: &str) -> ActiveSpan {
        self.start_with_kind(name, SpanKind::Internal)
    }

    /// Opens a span of the given kind.
    #[must_use]
    pub fn start_with_kind(&self, name: &str, kind: SpanKind) -> ActiveSpan {
        ActiveSpan {
            span: Some(Span::new(name, self.service.as_ref()).with_kind(kind)),
            started: Instant::now(),
            exporter: Arc::clone(&self.exporter),
        }
    }

    /// Service name stamped on every span.
    #[must_use]
    pub fn service(&self) -> &str {
        &self.service
    }

    /// Shuts down the underlying exporter.
    pub fn shutdown(&self) {
        self.exporter.shutdown();
    }
}

impl std::fmt::Debug for SpanRecorder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpanRecorder")
            .field("service", &self.service)
            .finish_non_exhaustive()
    }
}

/// An open span owned by the operation that started it.
///
/// Dropping the guard closes the span, so every exit path exports exactly one
/// span. After close all setters are no-ops.
pub struct ActiveSpan {
    span: Option<Span>,
    started: Instant,
    exporter: Arc<dyn SpanExporter>,
}

impl ActiveSpan {
    /// Sets an attribute, overwriting any previous value for `key`.
    pub fn set_attribute(&mut self, key: &str, value: impl Serialize) {
        if let Some(span) = self.span.as_mut() {
            span.set_attribute(key, value);
        }
    }

    /// Records an event stamped with the current time.
    pub fn add_event(&mut self, name: &str) {
        if let Some(span) = self.span.as_mut() {
            span.add_event(SpanEvent::new(name));
        }
    }

    /// Records an event with a payload.
    pub fn add_event_with(&mut self, event: SpanEvent) {
        if let Some(span) = self.span.as_mut() {
            span.add_event(event);
        }
    }

    /// Sets the span status.
    pub fn set_status(&mut self, status: SpanStatus) {
        if let Some(span) = self.span.as_mut() {
            span.status = status;
        }
    }

    /// Time since the span was opened.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Time since the span was opened, in seconds.
    #[must_use]
    pub fn elapsed_secs(&self) -> f64 {
        self.elapsed().as_secs_f64()
    }

    /// Returns true until the span is closed.
    #[must_use]
    pub fn is_recording(&self) -> bool {
        self.span.is_some()
    }

    /// Closes the span and exports it.
    pub fn end(mut self) {
        self.finish();
    }

    fn finish(&mut self) {
        let Some(mut span) = self.span.take() else {
            return;
        };

        let elapsed = self.started.elapsed();
        span.set_attribute(ELAPSED_ATTRIBUTE, elapsed.as_secs_f64());
        span.end_time = span.start_time
            + chrono::Duration::from_std(elapsed).unwrap_or_else(|_| chrono::Duration::zero());

        self.exporter.export(span);
    }
}

impl Drop for ActiveSpan {
    fn drop(&mut self) {
        self.finish();
    }
}

impl std::fmt::Debug for ActiveSpan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActiveSpan")
            .field("span", &self.span)
            .field("started", &self.started)
            .finish_non_exhaustive()
    }
}
