//! Integration tests for the enrollment HTTP flows.

mod helpers;

use axum::http::StatusCode;
use chrono::Weekday;
use serde_json::json;

use coursehub_core::types::{CourseId, StudentId};
use helpers::TestApp;

fn enroll_path(student: StudentId) -> String {
    format!("/api/students/{student}/enrollments")
}

#[tokio::test]
async fn test_enroll_commits_seat() {
    let app = TestApp::new().await;
    let course = app.create_course("Linear Algebra", 30).await;
    let student = StudentId::new();

    let resp = app
        .request(
            "POST",
            &enroll_path(student),
            Some(json!({ "course_id": course })),
        )
        .await;

    assert_eq!(resp.status, StatusCode::CREATED);
    assert_eq!(resp.body["success"], true);
    assert_eq!(resp.body["data"]["student_id"], student.to_string());
    assert_eq!(resp.body["data"]["course_id"], course.to_string());

    let row = app.course(course).await;
    assert_eq!(row.enrolled, 1);
    assert_eq!(row.version, 1);
}

#[tokio::test]
async fn test_enroll_twice_is_already_enrolled() {
    let app = TestApp::new().await;
    let course = app.create_course("Compilers", 30).await;
    let student = StudentId::new();
    let body = json!({ "course_id": course });

    let first = app
        .request("POST", &enroll_path(student), Some(body.clone()))
        .await;
    assert_eq!(first.status, StatusCode::CREATED);

    let second = app.request("POST", &enroll_path(student), Some(body)).await;
    assert_eq!(second.status, StatusCode::CONFLICT);
    assert_eq!(second.error_code(), "ALREADY_ENROLLED");
    assert_eq!(app.course(course).await.enrolled, 1);
}

#[tokio::test]
async fn test_enroll_full_course() {
    let app = TestApp::new().await;
    let course = app.create_course("Seminar", 1).await;

    let taken = app
        .request(
            "POST",
            &enroll_path(StudentId::new()),
            Some(json!({ "course_id": course })),
        )
        .await;
    assert_eq!(taken.status, StatusCode::CREATED);

    let rejected = app
        .request(
            "POST",
            &enroll_path(StudentId::new()),
            Some(json!({ "course_id": course })),
        )
        .await;
    assert_eq!(rejected.status, StatusCode::CONFLICT);
    assert_eq!(rejected.error_code(), "COURSE_FULL");

    let row = app.course(course).await;
    assert_eq!(row.enrolled, 1);
    assert_eq!(row.version, 1);
}

#[tokio::test]
async fn test_enroll_unknown_course() {
    let app = TestApp::new().await;
    let resp = app
        .request(
            "POST",
            &enroll_path(StudentId::new()),
            Some(json!({ "course_id": CourseId::new() })),
        )
        .await;

    assert_eq!(resp.status, StatusCode::NOT_FOUND);
    assert_eq!(resp.error_code(), "COURSE_NOT_FOUND");
}

#[tokio::test]
async fn test_enroll_schedule_conflict() {
    let app = TestApp::new().await;
    let a = app.create_course("Databases", 30).await;
    let b = app.create_course("Networks", 30).await;
    let c = app.create_course("Graphics", 30).await;
    app.add_slot(a, Weekday::Mon, "09:00", "10:30").await;
    app.add_slot(b, Weekday::Mon, "10:00", "11:00").await;
    app.add_slot(c, Weekday::Mon, "10:30", "12:00").await;
    let student = StudentId::new();

    let resp = app
        .request("POST", &enroll_path(student), Some(json!({ "course_id": a })))
        .await;
    assert_eq!(resp.status, StatusCode::CREATED);

    let resp = app
        .request("POST", &enroll_path(student), Some(json!({ "course_id": b })))
        .await;
    assert_eq!(resp.status, StatusCode::CONFLICT);
    assert_eq!(resp.error_code(), "SCHEDULE_CONFLICT");
    let message = resp.body["message"].as_str().unwrap_or_default();
    assert!(message.contains("Databases"), "unexpected message: {message}");
    assert!(message.contains("Monday 09:00-10:30"), "unexpected message: {message}");
    assert_eq!(app.course(b).await.enrolled, 0);

    // Back-to-back slots do not overlap
    let resp = app
        .request("POST", &enroll_path(student), Some(json!({ "course_id": c })))
        .await;
    assert_eq!(resp.status, StatusCode::CREATED);
}

#[tokio::test]
async fn test_invalid_body_is_rejected() {
    let app = TestApp::new().await;
    let resp = app
        .request(
            "POST",
            &enroll_path(StudentId::new()),
            Some(json!({ "course_id": "not-a-uuid" })),
        )
        .await;

    assert!(resp.status.is_client_error());
}

#[tokio::test]
async fn test_drop_releases_seat() {
    let app = TestApp::new().await;
    let course = app.create_course("Statistics", 1).await;
    let first = StudentId::new();
    let second = StudentId::new();

    app.request("POST", &enroll_path(first), Some(json!({ "course_id": course })))
        .await;

    let resp = app
        .request("DELETE", &format!("/api/students/{first}/enrollments/{course}"), None)
        .await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.body["data"]["status"], "dropped");

    let row = app.course(course).await;
    assert_eq!(row.enrolled, 0);
    assert_eq!(row.version, 2);

    // The freed seat goes to the next student
    let resp = app
        .request("POST", &enroll_path(second), Some(json!({ "course_id": course })))
        .await;
    assert_eq!(resp.status, StatusCode::CREATED);

    let resp = app
        .request("DELETE", &format!("/api/students/{first}/enrollments/{course}"), None)
        .await;
    assert_eq!(resp.status, StatusCode::NOT_FOUND);
    assert_eq!(resp.error_code(), "NOT_ENROLLED");
}

#[tokio::test]
async fn test_student_courses_and_timetable() {
    let app = TestApp::new().await;
    let course = app.create_course("Algorithms", 30).await;
    app.add_slot(course, Weekday::Wed, "13:00", "14:30").await;
    let student = StudentId::new();

    app.request("POST", &enroll_path(student), Some(json!({ "course_id": course })))
        .await;

    let resp = app
        .request("GET", &format!("/api/students/{student}/courses"), None)
        .await;
    assert_eq!(resp.status, StatusCode::OK);
    let courses = resp.body["data"].as_array().cloned().unwrap_or_default();
    assert_eq!(courses.len(), 1);
    assert_eq!(courses[0]["name"], "Algorithms");

    let resp = app
        .request("GET", &format!("/api/students/{student}/timetable"), None)
        .await;
    assert_eq!(resp.status, StatusCode::OK);
    let days = resp.body["data"]["days"].as_array().cloned().unwrap_or_default();
    assert_eq!(days.len(), 7);
    assert_eq!(days[2]["entries"][0]["course_name"], "Algorithms");
    assert_eq!(days[0]["entries"].as_array().map(Vec::len), Some(0));

    let resp = app
        .request("GET", &format!("/api/students/{student}/timetable?week=-1"), None)
        .await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_rate_limited_request_is_busy() {
    let app = TestApp::with_admission(1).await;
    let course = app.create_course("Ethics", 30).await;

    let resp = app
        .request(
            "POST",
            &enroll_path(StudentId::new()),
            Some(json!({ "course_id": course })),
        )
        .await;
    assert_eq!(resp.status, StatusCode::CREATED);

    let resp = app
        .request(
            "POST",
            &enroll_path(StudentId::new()),
            Some(json!({ "course_id": course })),
        )
        .await;
    assert_eq!(resp.status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(resp.error_code(), "BUSY");
    assert_eq!(resp.body["details"]["reason"], "rate_limited");
    assert_eq!(app.course(course).await.enrolled, 1);
}

#[tokio::test]
async fn test_health_reports_ok() {
    let app = TestApp::new().await;
    let resp = app.request("GET", "/api/health", None).await;

    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.body["data"]["status"], "ok");
    assert_eq!(resp.body["data"]["coordination"], true);
}
