//! Structured log record model.
//!
//! A `LogRecord` is one flat JSON object written as a single line to the log
//! sink. Every record carries `time`, `level`, and `event`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Log severity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogLevel {
    /// Normal completion.
    #[default]
    Info,
    /// Recoverable validation failure.
    Warning,
    /// Not-found or operational failure.
    Error,
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Info => write!(f, "INFO"),
            Self::Warning => write!(f, "WARNING"),
            Self::Error => write!(f, "ERROR"),
        }
    }
}

/// A single structured log record.
///
/// # Example
///
/// ```
/// use shared::models::{LogLevel, LogRecord};
///
/// let record = LogRecord::warning("Form Validation Error")
///     .with_field("route", "/api/v1/courses")
///     .with_field("error", "Missing required fields");
///
/// let line = record.to_json_line().unwrap();
/// assert!(line.contains("\"level\":\"WARNING\""));
/// assert!(line.contains("\"event\":\"Form Validation Error\""));
/// assert_eq!(record.level, LogLevel::Warning);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogRecord {
    /// When the record was created.
    pub time: DateTime<Utc>,

    /// Severity level.
    pub level: LogLevel,

    /// Name of the event being logged.
    pub event: String,

    /// Remaining fields, flattened into the top-level object.
    #[serde(flatten)]
    pub fields: serde_json::Map<String, serde_json::Value>,
}

impl LogRecord {
    /// Creates a record at the given level stamped with the current time.
    #[must_use]
    pub fn new(level: LogLevel, event: impl Into<String>) -> Self {
        Self {
            time: Utc::now(),
            level,
            event: event.into(),
            fields: serde_json::Map::new(),
        }
    }

    /// Creates an `INFO` record.
    #[must_use]
    pub fn info(event: impl Into<String>) -> Self {
        Self::new(LogLevel::Info, event)
    }

    /// Creates a `WARNING` record.
    #[must_use]
    pub fn warning(event: impl Into<String>) -> Self {
        Self::new(LogLevel::Warning, event)
    }

    /// Creates an `ERROR` record.
    #[must_use]
    pub fn error(event: impl Into<String>) -> Self {
        Self::new(LogLevel::Error, event)
    }

    /// Adds a field to the record.
    ///
    /// The reserved keys `time`, `level`, and `event` are ignored so the
    /// flattened object never carries duplicates.
    #[must_use]
    pub fn with_field(mut self, key: impl Into<String>, value: impl Serialize) -> Self {
        let key = key.into();
        if !matches!(key.as_str(), "time" | "level" | "event") {
            self.fields.insert(
                key,
                serde_json::to_value(value).unwrap_or(serde_json::Value::Null),
            );
        }
        self
    }

    /// Returns a field value, if present.
    #[must_use]
    pub fn field(&self, key: &str) -> Option<&serde_json::Value> {
        self.fields.get(key)
    }

    /// Serializes the record as a single JSON line without the trailing newline.
    ///
    /// # Errors
    ///
    /// Returns an error if a field value cannot be serialized.
    pub fn to_json_line(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
