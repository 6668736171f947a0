//! Integration tests for health check and general API functionality.

use axum::http::StatusCode;

use super::common::{get, test_app};

#[tokio::test]
async fn test_health_check() {
    let t = test_app();

    let (status, response) = get(t.app(), "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(response["status"], "healthy");
    assert_eq!(response["service"], "course-catalog-service");
}

#[tokio::test]
async fn test_health_check_records_no_telemetry() {
    let t = test_app();

    get(t.app(), "/health").await;

    assert!(t.spans.is_empty());
    assert!(t.logs.is_empty());
}

#[tokio::test]
async fn test_empty_catalog() {
    let t = test_app();

    let (status, response) = get(t.app(), "/api/v1/courses").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(response["total_count"], 0);
    assert_eq!(response["courses"].as_array().unwrap().len(), 0);
}
