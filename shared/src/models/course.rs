//! Course record model.
//!
//! Defines the `Course` structure persisted by the catalog store and the
//! `CourseFields` input accepted by the add operation.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use validator::Validate;

/// Fields that must be non-empty for a course to be accepted.
pub const REQUIRED_FIELDS: [&str; 3] = ["code", "name", "instructor"];

/// A single course in the catalog.
///
/// `code` acts as the lookup key, but nothing enforces its uniqueness.
///
/// # Example
///
/// ```
/// use shared::models::Course;
///
/// let course = Course::new("CS101", "Intro", "Dr. X").with_semester("Fall");
///
/// assert!(course.validate_course().is_ok());
/// assert_eq!(course.classroom, "");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct Course {
    /// Course code, e.g. `CS101`.
    #[serde(default)]
    #[validate(length(min = 1, message = "Course code is required"))]
    pub code: String,

    /// Course name.
    #[serde(default)]
    #[validate(length(min = 1, message = "Course name is required"))]
    pub name: String,

    /// Instructor teaching the course.
    #[serde(default)]
    #[validate(length(min = 1, message = "Instructor is required"))]
    pub instructor: String,

    /// Semester the course runs in.
    #[serde(default)]
    pub semester: String,

    /// Meeting schedule.
    #[serde(default)]
    pub schedule: String,

    /// Room the course is held in.
    #[serde(default)]
    pub classroom: String,

    /// Prerequisite courses, free text.
    #[serde(default)]
    pub prerequisites: String,

    /// Grading scheme, free text.
    #[serde(default)]
    pub grading: String,

    /// Long description.
    #[serde(default)]
    pub description: String,
}

/// Errors raised when a course fails validation.
#[derive(Debug, Error)]
pub enum CourseValidationError {
    /// One or more required fields are empty.
    #[error("Missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<String>),
}

impl CourseValidationError {
    /// Returns the names of the missing fields.
    #[must_use]
    pub fn missing_fields(&self) -> &[String] {
        match self {
            Self::MissingFields(fields) => fields,
        }
    }
}

impl Course {
    /// Creates a course with the required fields set and every optional field empty.
    #[must_use]
    pub fn new(
        code: impl Into<String>,
        name: impl Into<String>,
        instructor: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            instructor: instructor.into(),
            ..Self::default()
        }
    }

    /// Sets the semester.
    #[must_use]
    pub fn with_semester(mut self, semester: impl Into<String>) -> Self {
        self.semester = semester.into();
        self
    }

    /// Sets the schedule.
    #[must_use]
    pub fn with_schedule(mut self, schedule: impl Into<String>) -> Self {
        self.schedule = schedule.into();
        self
    }

    /// Sets the classroom.
    #[must_use]
    pub fn with_classroom(mut self, classroom: impl Into<String>) -> Self {
        self.classroom = classroom.into();
        self
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Validates that every required field is present.
    ///
    /// # Errors
    ///
    /// Returns [`CourseValidationError::MissingFields`] listing the empty
    /// required fields in declaration order.
    pub fn validate_course(&self) -> Result<(), CourseValidationError> {
        match self.validate() {
            Ok(()) => Ok(()),
            Err(errors) => {
                let failed = errors.field_errors();
                let missing = REQUIRED_FIELDS
                    .iter()
                    .filter(|field| failed.contains_key(**field))
                    .map(|field| (*field).to_string())
                    .collect();
                Err(CourseValidationError::MissingFields(missing))
            }
        }
    }
}

/// Raw input for adding a course.
///
/// Every field may be omitted; values are trimmed when converted into a
/// [`Course`].
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct CourseFields {
    /// Course code.
    pub code: String,
    /// Course name.
    pub name: String,
    /// Instructor.
    pub instructor: String,
    /// Semester.
    pub semester: String,
    /// Schedule.
    pub schedule: String,
    /// Classroom.
    pub classroom: String,
    /// Prerequisites.
    pub prerequisites: String,
    /// Grading scheme.
    pub grading: String,
    /// Description.
    pub description: String,
}

impl From<CourseFields> for Course {
    fn from(fields: CourseFields) -> Self {
        let trim = |s: String| s.trim().to_string();
        Self {
            code: trim(fields.code),
            name: trim(fields.name),
            instructor: trim(fields.instructor),
            semester: trim(fields.semester),
            schedule: trim(fields.schedule),
            classroom: trim(fields.classroom),
            prerequisites: trim(fields.prerequisites),
            grading: trim(fields.grading),
            description: trim(fields.description),
        }
    }
}
