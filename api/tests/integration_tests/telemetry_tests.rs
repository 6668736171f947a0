//! Integration tests for request telemetry.
//!
//! Tests cover:
//! - One span and one log record per request
//! - Counters and the counter snapshot endpoint
//! - The manual trace endpoint
//! - Unreadable and form-encoded request bodies
//! - Prometheus exposition

use axum::http::StatusCode;
use serde_json::json;
use shared::models::{LogLevel, SpanKind, SpanStatus};
use shared::telemetry::ELAPSED_ATTRIBUTE;

use super::common::{
    delete, get, get_text, post_form, post_json, post_raw, test_app, TestApp,
};

fn assert_closed_spans(t: &TestApp, expected: usize) {
    let spans = t.spans.spans();
    assert_eq!(spans.len(), expected);
    assert_eq!(t.logs.len(), expected);
    for span in &spans {
        let elapsed = span
            .attribute(ELAPSED_ATTRIBUTE)
            .and_then(serde_json::Value::as_f64)
            .unwrap();
        assert!(elapsed >= 0.0, "{} has negative elapsed time", span.name);
        assert!(span.end_time >= span.start_time);
    }
}

#[tokio::test]
async fn test_every_operation_records_one_span_and_log() {
    let t = test_app();

    get(t.app(), "/api/v1/courses").await;
    post_json(
        t.app(),
        "/api/v1/courses",
        json!({"code": "CS101", "name": "Intro", "instructor": "Dr. X"}),
    )
    .await;
    post_json(t.app(), "/api/v1/courses", json!({"code": "CS102"})).await;
    get(t.app(), "/api/v1/courses/CS101").await;
    get(t.app(), "/api/v1/courses/NOPE").await;
    delete(t.app(), "/api/v1/courses/CS101").await;
    get_text(t.app(), "/manual-trace").await;

    assert_closed_spans(&t, 7);
    let names: Vec<String> = t.spans.spans().into_iter().map(|s| s.name).collect();
    assert_eq!(
        names,
        [
            "render-course-catalog",
            "add-course",
            "add-course",
            "view-course-details",
            "view-course-details",
            "delete-course",
            "manual-span",
        ]
    );
    let events: Vec<String> = t.logs.records().into_iter().map(|r| r.event).collect();
    assert_eq!(
        events,
        [
            "Page Rendered",
            "Course Added",
            "Form Validation Error",
            "Course Details Rendered",
            "Course Not Found",
            "Course Deleted",
            "Manual Trace Recorded",
        ]
    );
}

#[tokio::test]
async fn test_span_carries_request_attributes() {
    let t = test_app();

    get(t.app(), "/api/v1/courses").await;

    let span = &t.spans.spans()[0];
    assert_eq!(span.service, "course-catalog-service");
    assert_eq!(span.kind, SpanKind::Internal);
    assert_eq!(span.status, SpanStatus::Ok);
    assert_eq!(span.attribute("http.method"), Some(&json!("GET")));
    assert_eq!(span.attribute("http.url"), Some(&json!("/api/v1/courses")));
    assert_eq!(span.attribute("user.ip"), Some(&json!("unknown")));
    assert_eq!(span.attribute("requests.count"), Some(&json!(1)));
    assert_eq!(span.attribute("total_courses"), Some(&json!(0)));
}

#[tokio::test]
async fn test_validation_failure_telemetry() {
    let t = test_app();

    post_json(
        t.app(),
        "/api/v1/courses",
        json!({"code": "CS101", "instructor": "Dr. X"}),
    )
    .await;

    assert_closed_spans(&t, 1);
    let span = &t.spans.spans()[0];
    assert_eq!(span.status, SpanStatus::Error);
    assert_eq!(span.attribute("error_count"), Some(&json!(1)));
    assert_eq!(
        span.event_names(),
        ["Validation failed: Missing required fields"]
    );

    let record = &t.logs.records()[0];
    assert_eq!(record.level, LogLevel::Warning);
    assert_eq!(record.field("route"), Some(&json!("/api/v1/courses")));
    assert_eq!(record.field("missing_fields"), Some(&json!(["name"])));
}

#[tokio::test]
async fn test_unreadable_body_is_recorded() {
    let t = test_app();

    let (status, response) =
        post_raw(t.app(), "/api/v1/courses", "application/json", "{not json").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response["error"], "invalid_body");
    assert_closed_spans(&t, 1);
    let span = &t.spans.spans()[0];
    assert_eq!(span.name, "add-course");
    assert_eq!(span.status, SpanStatus::Error);
    assert_eq!(
        span.event_names(),
        ["Validation failed: Unreadable course data"]
    );

    let record = &t.logs.records()[0];
    assert_eq!(record.level, LogLevel::Warning);
    assert_eq!(record.event, "Form Validation Error");
    assert_eq!(record.field("route"), Some(&json!("/api/v1/courses")));
    assert_eq!(t.state.telemetry().requests().get("add_course"), 1);
    assert_eq!(t.state.telemetry().errors().get("add_course"), 1);
}

#[tokio::test]
async fn test_unsupported_content_type_is_recorded() {
    let t = test_app();

    let (status, response) = post_raw(
        t.app(),
        "/api/v1/courses",
        "text/plain",
        "code=CS101&name=Intro&instructor=X",
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response["error"], "invalid_body");
    assert_closed_spans(&t, 1);
    assert_eq!(t.state.telemetry().errors().get("add_course"), 1);
}

#[tokio::test]
async fn test_form_encoded_add_is_recorded() {
    let t = test_app();

    let (status, response) = post_form(
        t.app(),
        "/api/v1/courses",
        "code=CS101&name=Intro&instructor=X",
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(response["course"]["code"], "CS101");
    assert_closed_spans(&t, 1);
    assert_eq!(t.spans.spans()[0].status, SpanStatus::Ok);
    assert_eq!(t.logs.records()[0].event, "Course Added");
    assert_eq!(t.state.telemetry().requests().get("add_course"), 1);
    assert!(t.state.telemetry().errors().snapshot().is_empty());
}

#[tokio::test]
async fn test_metrics_endpoint_exposes_counters() {
    let t = test_app();

    get(t.app(), "/api/v1/courses").await;
    get(t.app(), "/api/v1/courses/NOPE").await;

    let (status, body) = get_text(t.app(), "/metrics").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("# TYPE catalog_requests_total counter"));
    assert!(body.contains("catalog_requests_total{operation=\"catalog\"} 1"));
    assert!(body.contains("catalog_errors_total{operation=\"course_details\"} 1"));
    assert_eq!(t.spans.len(), 2);
}

#[tokio::test]
async fn test_counters_endpoint() {
    let t = test_app();

    get(t.app(), "/api/v1/courses").await;
    get(t.app(), "/api/v1/courses").await;
    get(t.app(), "/api/v1/courses/NOPE").await;

    let (status, counters) = get(t.app(), "/api/v1/counters").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(counters["requests"]["catalog"], 2);
    assert_eq!(counters["requests"]["course_details"], 1);
    assert_eq!(counters["errors"]["course_details"], 1);
    assert!(counters["errors"].get("catalog").is_none());

    // Reading counters is not itself an instrumented operation
    assert_eq!(t.spans.len(), 3);
}

#[tokio::test]
async fn test_manual_trace() {
    let t = test_app();

    let (status, body) = get_text(t.app(), "/manual-trace").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "Manual trace recorded!");
    assert_closed_spans(&t, 1);
    let span = &t.spans.spans()[0];
    assert_eq!(span.name, "manual-span");
    assert_eq!(span.kind, SpanKind::Server);
    assert_eq!(span.event_names(), ["Processing request"]);
    assert_eq!(t.state.telemetry().requests().get("manual_trace"), 1);
}

#[tokio::test]
async fn test_concurrent_requests_are_all_counted() {
    let t = test_app();

    let handles: Vec<_> = (0..32)
        .map(|_| {
            let app = t.app();
            tokio::spawn(async move { get(app, "/api/v1/courses").await })
        })
        .collect();
    for handle in handles {
        let (status, _) = handle.await.unwrap();
        assert_eq!(status, StatusCode::OK);
    }

    assert_eq!(t.state.telemetry().requests().get("catalog"), 32);
    assert_closed_spans(&t, 32);
}
