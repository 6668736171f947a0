//! Course catalog endpoints.
//!
//! Catalog calls do synchronous file I/O, so each one runs on the blocking
//! thread pool.

use crate::extract::RequestMeta;
use crate::state::AppState;
use axum::{
    extract::{FromRequest, Path, Request, State},
    http::{header, StatusCode},
    routing::get,
    Form, Json, Router,
};
use serde::{Deserialize, Serialize};
use shared::models::{Course, CourseFields};
use shared::service::{CatalogError, CatalogService, VALIDATION_MESSAGE};

/// Message returned when the catalog cannot be read or written.
pub const STORAGE_MESSAGE: &str = "The course catalog is temporarily unavailable.";

/// Response for listing courses.
#[derive(Debug, Serialize, Deserialize)]
pub struct CourseListResponse {
    pub courses: Vec<Course>,
    pub total_count: usize,
}

/// Response for adding a course.
#[derive(Debug, Serialize, Deserialize)]
pub struct CourseAddedResponse {
    pub course: Course,
    pub message: String,
}

/// Response for deleting courses.
#[derive(Debug, Serialize, Deserialize)]
pub struct CourseDeletedResponse {
    pub deleted: usize,
    pub message: String,
}

/// Error response.
#[derive(Debug, Serialize)]
pub struct CourseError {
    pub error: String,
    pub message: String,
}

type ErrorReply = (StatusCode, Json<CourseError>);

fn error_reply(status: StatusCode, error: &str, message: impl Into<String>) -> ErrorReply {
    (
        status,
        Json(CourseError {
            error: error.to_string(),
            message: message.into(),
        }),
    )
}

// Storage details (paths, parser positions) stay in the structured log.
fn catalog_error_reply(e: CatalogError) -> ErrorReply {
    match e {
        CatalogError::Validation(_) => error_reply(
            StatusCode::BAD_REQUEST,
            "validation_error",
            VALIDATION_MESSAGE,
        ),
        CatalogError::InvalidInput(reason) => {
            error_reply(StatusCode::BAD_REQUEST, "invalid_body", reason)
        }
        e @ CatalogError::NotFound(_) => {
            error_reply(StatusCode::NOT_FOUND, "not_found", e.to_string())
        }
        CatalogError::Storage(_) => error_reply(
            StatusCode::INTERNAL_SERVER_ERROR,
            "storage_error",
            STORAGE_MESSAGE,
        ),
    }
}

/// Runs `work` against the catalog on the blocking thread pool.
async fn call_catalog<T, F>(state: &AppState, work: F) -> Result<T, ErrorReply>
where
    F: FnOnce(&CatalogService) -> Result<T, CatalogError> + Send + 'static,
    T: Send + 'static,
{
    let catalog = state.catalog().clone();
    tokio::task::spawn_blocking(move || work(&catalog))
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Catalog task failed");
            error_reply(
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                "Internal server error",
            )
        })?
        .map_err(catalog_error_reply)
}

/// Decodes the add request body as a form or as JSON, by content type.
async fn read_course_fields(state: &AppState, request: Request) -> Result<CourseFields, String> {
    let is_form = request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.starts_with("application/x-www-form-urlencoded"));

    if is_form {
        Form::<CourseFields>::from_request(request, state)
            .await
            .map(|Form(fields)| fields)
            .map_err(|e| e.body_text())
    } else {
        Json::<CourseFields>::from_request(request, state)
            .await
            .map(|Json(fields)| fields)
            .map_err(|e| e.body_text())
    }
}

/// Creates the course routes.
pub fn course_routes(state: AppState) -> Router {
    Router::new()
        .route("/api/v1/courses", get(list_courses).post(add_course))
        .route(
            "/api/v1/courses/{code}",
            get(get_course).delete(delete_course),
        )
        .with_state(state)
}

async fn list_courses(
    State(state): State<AppState>,
    RequestMeta(ctx): RequestMeta,
) -> Result<Json<CourseListResponse>, ErrorReply> {
    let courses = call_catalog(&state, move |catalog| catalog.list_all(&ctx)).await?;

    Ok(Json(CourseListResponse {
        total_count: courses.len(),
        courses,
    }))
}

async fn add_course(
    State(state): State<AppState>,
    RequestMeta(ctx): RequestMeta,
    request: Request,
) -> Result<(StatusCode, Json<CourseAddedResponse>), ErrorReply> {
    let fields = read_course_fields(&state, request).await;

    let course = call_catalog(&state, move |catalog| match fields {
        Ok(fields) => catalog.add_one(&ctx, fields),
        Err(reason) => Err(catalog.reject_add(&ctx, &reason)),
    })
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(CourseAddedResponse {
            message: format!("Course '{}' added successfully!", course.name),
            course,
        }),
    ))
}

async fn get_course(
    State(state): State<AppState>,
    RequestMeta(ctx): RequestMeta,
    Path(code): Path<String>,
) -> Result<Json<Course>, ErrorReply> {
    call_catalog(&state, move |catalog| catalog.get_by_code(&ctx, &code))
        .await
        .map(Json)
}

async fn delete_course(
    State(state): State<AppState>,
    RequestMeta(ctx): RequestMeta,
    Path(code): Path<String>,
) -> Result<Json<CourseDeletedResponse>, ErrorReply> {
    let message = format!("Course with code '{code}' deleted successfully!");
    let deleted = call_catalog(&state, move |catalog| catalog.delete_by_code(&ctx, &code)).await?;

    Ok(Json(CourseDeletedResponse { deleted, message }))
}
