//! Span data model.
//!
//! A `Span` is the completed record of one traced operation as it is handed
//! to an exporter.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Status code for a span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SpanStatus {
    /// Status was never set.
    #[default]
    Unset,
    /// The operation completed successfully.
    Ok,
    /// The operation failed.
    Error,
}

impl std::fmt::Display for SpanStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unset => write!(f, "unset"),
            Self::Ok => write!(f, "ok"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// Kind of span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SpanKind {
    /// Default span kind (internal operation).
    #[default]
    Internal,
    /// The span represents a server handling a request.
    Server,
}

impl std::fmt::Display for SpanKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Internal => write!(f, "internal"),
            Self::Server => write!(f, "server"),
        }
    }
}

/// A timestamped event within a span.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpanEvent {
    /// The name of the event.
    pub name: String,
    /// Timestamp when the event occurred.
    pub timestamp: DateTime<Utc>,
    /// Optional payload, kept in insertion order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attributes: Vec<(String, serde_json::Value)>,
}

impl SpanEvent {
    /// Creates an event stamped with the current time.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            timestamp: Utc::now(),
            attributes: Vec::new(),
        }
    }

    /// Adds a payload entry to the event.
    #[must_use]
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Serialize) -> Self {
        self.attributes.push((key.into(), to_value(value)));
        self
    }
}

/// A span representing one traced operation.
///
/// Attributes keep the order they were first set in; setting an existing key
/// replaces its value in place.
///
/// # Example
///
/// ```
/// use shared::models::{Span, SpanKind};
///
/// let mut span = Span::new("add-course", "course-catalog-service").with_kind(SpanKind::Server);
/// span.set_attribute("http.method", "POST");
/// span.set_attribute("http.method", "GET");
///
/// assert_eq!(span.attributes.len(), 1);
/// assert_eq!(span.attribute("http.method"), Some(&serde_json::json!("GET")));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Span {
    /// The name/operation of this span.
    pub name: String,

    /// The service that generated this span.
    pub service: String,

    /// The kind of span.
    #[serde(default)]
    pub kind: SpanKind,

    /// The status of the span.
    #[serde(default)]
    pub status: SpanStatus,

    /// Timestamp when the span started.
    pub start_time: DateTime<Utc>,

    /// Timestamp when the span ended.
    pub end_time: DateTime<Utc>,

    /// Attributes in first-set order.
    #[serde(default)]
    pub attributes: Vec<(String, serde_json::Value)>,

    /// Events in the order they were added.
    #[serde(default)]
    pub events: Vec<SpanEvent>,
}

impl Span {
    /// Creates a new span with the current time as both start and end.
    #[must_use]
    pub fn new(name: impl Into<String>, service: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            name: name.into(),
            service: service.into(),
            kind: SpanKind::default(),
            status: SpanStatus::default(),
            start_time: now,
            end_time: now,
            attributes: Vec::new(),
            events: Vec::new(),
        }
    }

    /// Sets the span kind.
    #[must_use]
    pub fn with_kind(mut self, kind: SpanKind) -> Self {
        self.kind = kind;
        self
    }

    /// Sets the start time.
    #[must_use]
    pub fn with_start_time(mut self, start_time: DateTime<Utc>) -> Self {
        self.start_time = start_time;
        self
    }

    /// Sets the end time.
    #[must_use]
    pub fn with_end_time(mut self, end_time: DateTime<Utc>) -> Self {
        self.end_time = end_time;
        self
    }

    /// Sets an attribute, overwriting any existing value for `key`.
    pub fn set_attribute(&mut self, key: impl Into<String>, value: impl Serialize) {
        let key = key.into();
        let value = to_value(value);
        match self.attributes.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => *existing = value,
            None => self.attributes.push((key, value)),
        }
    }

    /// Returns the value of an attribute, if set.
    #[must_use]
    pub fn attribute(&self, key: &str) -> Option<&serde_json::Value> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    /// Appends an event.
    pub fn add_event(&mut self, event: SpanEvent) {
        self.events.push(event);
    }

    /// Returns the names of all events, in order.
    #[must_use]
    pub fn event_names(&self) -> Vec<&str> {
        self.events.iter().map(|e| e.name.as_str()).collect()
    }

    /// Returns the duration of the span.
    #[must_use]
    pub fn duration(&self) -> Duration {
        self.end_time - self.start_time
    }

    /// Returns the duration in milliseconds.
    #[must_use]
    pub fn duration_ms(&self) -> i64 {
        self.duration().num_milliseconds()
    }
}

fn to_value(value: impl Serialize) -> serde_json::Value {
    serde_json::to_value(value).unwrap_or(serde_json::Value::Null)
}
