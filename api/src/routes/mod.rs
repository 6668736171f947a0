//! API route definitions.
//!
//! This module organizes all HTTP routes for the course catalog API server.

mod courses;
mod diagnostics;
mod health;

pub use courses::course_routes;
pub use diagnostics::diagnostics_routes;
pub use health::health_routes;
