//! Integration tests for the course endpoints.
//!
//! Tests cover:
//! - Adding, viewing, listing, and deleting courses
//! - Validation and not-found errors
//! - The on-disk catalog file

use axum::http::StatusCode;
use serde_json::json;

use super::common::{delete, file_app, get, post_json, test_app};

#[tokio::test]
async fn test_add_then_view_course() {
    let t = test_app();

    let (status, response) = post_json(
        t.app(),
        "/api/v1/courses",
        json!({"code": "CS101", "name": "Intro", "instructor": "Dr. X"}),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(response["message"], "Course 'Intro' added successfully!");

    let (status, course) = get(t.app(), "/api/v1/courses/CS101").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(course["code"], "CS101");
    assert_eq!(course["name"], "Intro");
    assert_eq!(course["instructor"], "Dr. X");
    for field in [
        "semester",
        "schedule",
        "classroom",
        "prerequisites",
        "grading",
        "description",
    ] {
        assert_eq!(course[field], "", "{field} should default to empty");
    }
}

#[tokio::test]
async fn test_add_keeps_optional_fields() {
    let t = test_app();

    post_json(
        t.app(),
        "/api/v1/courses",
        json!({
            "code": "MA201",
            "name": "Calculus",
            "instructor": "Dr. Y",
            "semester": "Fall",
            "schedule": "MWF 9:00",
            "classroom": "B12",
            "prerequisites": "MA101",
            "grading": "Exams",
            "description": "Limits and derivatives"
        }),
    )
    .await;

    let (_, course) = get(t.app(), "/api/v1/courses/MA201").await;
    assert_eq!(course["semester"], "Fall");
    assert_eq!(course["prerequisites"], "MA101");
    assert_eq!(course["description"], "Limits and derivatives");
}

#[tokio::test]
async fn test_add_without_name_is_rejected() {
    let t = test_app();

    let (status, response) = post_json(
        t.app(),
        "/api/v1/courses",
        json!({"code": "CS101", "name": "   ", "instructor": "Dr. X"}),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response["error"], "validation_error");
    assert_eq!(
        response["message"],
        "Course Code, Course Name and Instructor are required!"
    );

    let (_, list) = get(t.app(), "/api/v1/courses").await;
    assert_eq!(list["total_count"], 0);
}

#[tokio::test]
async fn test_view_missing_course() {
    let t = test_app();

    let (status, response) = get(t.app(), "/api/v1/courses/NOPE").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(response["error"], "not_found");
    assert_eq!(response["message"], "No course found with code 'NOPE'.");
}

#[tokio::test]
async fn test_list_keeps_append_order() {
    let t = test_app();

    for (code, name) in [("CS101", "Intro"), ("MA201", "Calculus"), ("PH110", "Physics")] {
        post_json(
            t.app(),
            "/api/v1/courses",
            json!({"code": code, "name": name, "instructor": "Staff"}),
        )
        .await;
    }

    let (status, response) = get(t.app(), "/api/v1/courses").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(response["total_count"], 3);
    let codes: Vec<&str> = response["courses"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["code"].as_str().unwrap())
        .collect();
    assert_eq!(codes, ["CS101", "MA201", "PH110"]);
}

#[tokio::test]
async fn test_duplicate_codes_view_first_and_delete_all() {
    let t = test_app();

    for name in ["First", "Second"] {
        post_json(
            t.app(),
            "/api/v1/courses",
            json!({"code": "CS101", "name": name, "instructor": "Dr. X"}),
        )
        .await;
    }
    post_json(
        t.app(),
        "/api/v1/courses",
        json!({"code": "MA201", "name": "Calculus", "instructor": "Dr. Y"}),
    )
    .await;

    let (_, course) = get(t.app(), "/api/v1/courses/CS101").await;
    assert_eq!(course["name"], "First");

    let (status, response) = delete(t.app(), "/api/v1/courses/CS101").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(response["deleted"], 2);

    let (_, list) = get(t.app(), "/api/v1/courses").await;
    assert_eq!(list["total_count"], 1);
    assert_eq!(list["courses"][0]["code"], "MA201");
}

#[tokio::test]
async fn test_delete_missing_code_succeeds() {
    let t = test_app();
    post_json(
        t.app(),
        "/api/v1/courses",
        json!({"code": "CS101", "name": "Intro", "instructor": "Dr. X"}),
    )
    .await;

    let (status, response) = delete(t.app(), "/api/v1/courses/NOPE").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(response["deleted"], 0);
    assert_eq!(
        response["message"],
        "Course with code 'NOPE' deleted successfully!"
    );
    let (_, list) = get(t.app(), "/api/v1/courses").await;
    assert_eq!(list["total_count"], 1);
}

#[tokio::test]
async fn test_courses_persist_to_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("course_catalog.json");
    let t = file_app(&path);

    post_json(
        t.app(),
        "/api/v1/courses",
        json!({"code": "CS101", "name": "Intro", "instructor": "Dr. X"}),
    )
    .await;

    let contents = std::fs::read_to_string(&path).unwrap();
    let on_disk: serde_json::Value = serde_json::from_str(&contents).unwrap();
    assert_eq!(on_disk[0]["code"], "CS101");
    assert!(contents.contains("\n        \"code\": \"CS101\""));

    // A second app over the same file sees the course
    let reopened = file_app(&path);
    let (status, course) = get(reopened.app(), "/api/v1/courses/CS101").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(course["name"], "Intro");
}

#[tokio::test]
async fn test_corrupt_file_is_a_storage_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("course_catalog.json");
    std::fs::write(&path, "{ not a list").unwrap();
    let t = file_app(&path);

    let (status, response) = get(t.app(), "/api/v1/courses").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response["error"], "storage_error");
    let message = response["message"].as_str().unwrap();
    assert!(!message.contains(&*dir.path().to_string_lossy()));
    assert!(!message.contains("course_catalog.json"));
    let logged = t.logs.records()[0].field("error").unwrap().to_string();
    assert!(logged.contains("course_catalog.json"));

    let (status, _) = post_json(
        t.app(),
        "/api/v1/courses",
        json!({"code": "CS101", "name": "Intro", "instructor": "Dr. X"}),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "{ not a list");
}
