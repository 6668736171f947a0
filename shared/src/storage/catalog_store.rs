//! Catalog storage trait and implementations.
//!
//! Provides the `CatalogStore` trait over a whole-collection record store, a
//! `JsonFileCatalogStore` backed by a single JSON array on disk, and an
//! `InMemoryCatalogStore` for development and testing.
//!
//! Every mutation is a read-modify-write of the entire collection with no
//! locking. Two concurrent writers can both read the same snapshot and the
//! second write wins, dropping the first writer's change.

use crate::models::Course;
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};
use thiserror::Error;

/// Errors that can occur during catalog store operations.
///
/// All variants mean the backing storage is unavailable for this call.
#[derive(Debug, Error)]
pub enum CatalogStoreError {
    /// The catalog file exists but could not be read.
    #[error("Failed to read catalog {path}: {source}")]
    Read {
        /// Path of the catalog file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The catalog file could not be written.
    #[error("Failed to write catalog {path}: {source}")]
    Write {
        /// Path of the catalog file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The catalog file does not contain a JSON array of courses.
    #[error("Catalog {path} is corrupt: {source}")]
    Corrupt {
        /// Path of the catalog file.
        path: PathBuf,
        /// Underlying parse error.
        #[source]
        source: serde_json::Error,
    },

    /// Failed to acquire lock on the store.
    #[error("Failed to acquire lock on catalog store")]
    LockError,
}

/// Trait for catalog storage implementations.
///
/// Implementations hold no cache: every call goes back to the backing storage,
/// so a sequential caller always reads its own writes.
pub trait CatalogStore: Send + Sync {
    /// Loads every course in storage order.
    ///
    /// Missing storage is an empty catalog, not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage exists but is unreadable or corrupt.
    fn load_all(&self) -> Result<Vec<Course>, CatalogStoreError>;

    /// Overwrites the storage with exactly `courses`.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage cannot be written.
    fn replace_all(&self, courses: &[Course]) -> Result<(), CatalogStoreError>;

    /// Appends one course by loading the full collection, pushing the course,
    /// and writing the full collection back.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage cannot be read or written.
    fn append_one(&self, course: Course) -> Result<(), CatalogStoreError> {
        let mut courses = self.load_all()?;
        courses.push(course);
        self.replace_all(&courses)
    }

    /// Returns the first course whose code equals `code`.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage cannot be read.
    fn find_by_code(&self, code: &str) -> Result<Option<Course>, CatalogStoreError> {
        Ok(self.load_all()?.into_iter().find(|c| c.code == code))
    }

    /// Removes every course whose code equals `code` and returns how many were
    /// removed. Remaining courses keep their relative order.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage cannot be read or written.
    fn delete_by_code(&self, code: &str) -> Result<usize, CatalogStoreError> {
        let courses = self.load_all()?;
        let before = courses.len();
        let kept: Vec<Course> = courses.into_iter().filter(|c| c.code != code).collect();
        let removed = before - kept.len();
        self.replace_all(&kept)?;
        Ok(removed)
    }
}

/// Catalog store backed by a single JSON file.
///
/// The file holds one JSON array of course objects, written with four-space
/// indentation.
#[derive(Debug, Clone)]
pub struct JsonFileCatalogStore {
    path: PathBuf,
}

impl JsonFileCatalogStore {
    /// Creates a store over the file at `path`. The file need not exist.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the path of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn encode(courses: &[Course]) -> Result<Vec<u8>, serde_json::Error> {
        let mut buf = Vec::new();
        let formatter = PrettyFormatter::with_indent(b"    ");
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
        courses.serialize(&mut ser)?;
        Ok(buf)
    }
}

impl CatalogStore for JsonFileCatalogStore {
    fn load_all(&self) -> Result<Vec<Course>, CatalogStoreError> {
        let bytes = match std::fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!(
                    path = %self.path.display(),
                    "Catalog file missing, treating as empty"
                );
                return Ok(Vec::new());
            }
            Err(source) => {
                return Err(CatalogStoreError::Read {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        serde_json::from_slice(&bytes).map_err(|source| CatalogStoreError::Corrupt {
            path: self.path.clone(),
            source,
        })
    }

    fn replace_all(&self, courses: &[Course]) -> Result<(), CatalogStoreError> {
        let write_err = |source: std::io::Error| CatalogStoreError::Write {
            path: self.path.clone(),
            source,
        };

        let bytes = Self::encode(courses).map_err(|e| write_err(e.into()))?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(write_err)?;
        }
        std::fs::write(&self.path, bytes).map_err(write_err)?;

        tracing::debug!(
            path = %self.path.display(),
            count = courses.len(),
            "Catalog written"
        );
        Ok(())
    }
}

/// In-memory catalog store implementation.
#[derive(Debug, Default)]
pub struct InMemoryCatalogStore {
    courses: Arc<RwLock<Vec<Course>>>,
}

impl InMemoryCatalogStore {
    /// Creates a new empty in-memory catalog store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-populated with `courses`.
    #[must_use]
    pub fn with_courses(courses: Vec<Course>) -> Self {
        Self {
            courses: Arc::new(RwLock::new(courses)),
        }
    }
}

impl CatalogStore for InMemoryCatalogStore {
    fn load_all(&self) -> Result<Vec<Course>, CatalogStoreError> {
        let courses = self
            .courses
            .read()
            .map_err(|_| CatalogStoreError::LockError)?;
        Ok(courses.clone())
    }

    fn replace_all(&self, new_courses: &[Course]) -> Result<(), CatalogStoreError> {
        let mut courses = self
            .courses
            .write()
            .map_err(|_| CatalogStoreError::LockError)?;
        *courses = new_courses.to_vec();
        Ok(())
    }
}
