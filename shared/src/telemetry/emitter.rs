//! Structured log emission.
//!
//! [`StructuredLogger`] writes each [`LogRecord`] as one JSON line to a
//! [`LogSink`] and mirrors it to `tracing` at the matching level. Sink failures
//! are reported through `tracing` and never returned to the caller.

use crate::models::{LogLevel, LogRecord};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, RwLock};
use thiserror::Error;

/// Errors that can occur while writing a log record.
#[derive(Debug, Error)]
pub enum LogSinkError {
    /// The record could not be serialized.
    #[error("Failed to serialize log record: {0}")]
    Serialize(#[from] serde_json::Error),

    /// The sink could not be written.
    #[error("Failed to write log record: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to acquire lock on the sink.
    #[error("Failed to acquire lock on log sink")]
    LockError,
}

/// Destination for structured log records.
pub trait LogSink: Send + Sync {
    /// Writes one record as a complete line.
    ///
    /// # Errors
    ///
    /// Returns an error if the record cannot be serialized or written.
    fn write(&self, record: &LogRecord) -> Result<(), LogSinkError>;
}

/// Append-only newline-delimited JSON file sink.
///
/// Each record is written with a single `write_all` of the full line followed
/// by a flush.
#[derive(Debug)]
pub struct JsonLinesFileSink {
    path: PathBuf,
    file: Mutex<File>,
}

impl JsonLinesFileSink {
    /// Opens `path` for appending, creating it and its parent directories if
    /// needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be created or opened.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, LogSinkError> {
        let path = path.into();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        Ok(Self {
            path,
            file: Mutex::new(file),
        })
    }

    /// Returns the path of the log file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl LogSink for JsonLinesFileSink {
    fn write(&self, record: &LogRecord) -> Result<(), LogSinkError> {
        let mut line = record.to_json_line()?;
        line.push('\n');

        let mut file = self.file.lock().map_err(|_| LogSinkError::LockError)?;
        file.write_all(line.as_bytes())?;
        file.flush()?;
        Ok(())
    }
}

/// Sink that keeps records in memory.
#[derive(Debug, Default)]
pub struct InMemoryLogSink {
    records: RwLock<Vec<LogRecord>>,
}

impl InMemoryLogSink {
    /// Creates an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of every record in write order.
    #[must_use]
    pub fn records(&self) -> Vec<LogRecord> {
        self.records
            .read()
            .map(|records| records.clone())
            .unwrap_or_default()
    }

    /// Returns the number of records written.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.read().map(|records| records.len()).unwrap_or(0)
    }

    /// Returns true if nothing has been written.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl LogSink for InMemoryLogSink {
    fn write(&self, record: &LogRecord) -> Result<(), LogSinkError> {
        let mut records = self.records.write().map_err(|_| LogSinkError::LockError)?;
        records.push(record.clone());
        Ok(())
    }
}

/// Writes structured log records to a sink.
#[derive(Clone)]
pub struct StructuredLogger {
    sink: Arc<dyn LogSink>,
}

impl StructuredLogger {
    /// Creates a logger writing to `sink`.
    pub fn new(sink: Arc<dyn LogSink>) -> Self {
        Self { sink }
    }

    /// Emits one record.
    ///
    /// The record is written synchronously; a failed write is logged and
    /// otherwise ignored.
    pub fn emit(&self, record: &LogRecord) {
        let fields = serde_json::Value::Object(record.fields.clone());
        match record.level {
            LogLevel::Info => tracing::info!(event = %record.event, %fields, "structured log"),
            LogLevel::Warning => tracing::warn!(event = %record.event, %fields, "structured log"),
            LogLevel::Error => tracing::error!(event = %record.event, %fields, "structured log"),
        }

        if let Err(e) = self.sink.write(record) {
            tracing::warn!(error = %e, event = %record.event, "Dropping structured log record");
        }
    }
}

impl std::fmt::Debug for StructuredLogger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StructuredLogger").finish_non_exhaustive()
    }
}
