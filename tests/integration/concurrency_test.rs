//! Concurrency tests: many simultaneous requests against one course.

mod helpers;

use std::collections::HashSet;
use std::sync::Arc;

use axum::http::StatusCode;
use serde_json::json;

use coursehub_core::types::StudentId;
use coursehub_service::{DropOutcome, EnrollOutcome};
use helpers::TestApp;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_enrollments_never_oversell() {
    let app = Arc::new(TestApp::new().await);
    let course = app.create_course("Distributed Systems", 10).await;

    let mut handles = Vec::new();
    for _ in 0..60 {
        let app = Arc::clone(&app);
        handles.push(tokio::spawn(async move {
            app.request(
                "POST",
                &format!("/api/students/{}/enrollments", StudentId::new()),
                Some(json!({ "course_id": course })),
            )
            .await
        }));
    }

    let mut created = 0;
    let mut full = 0;
    for handle in handles {
        let resp = handle.await.expect("task panicked");
        match resp.status {
            StatusCode::CREATED => created += 1,
            StatusCode::CONFLICT => {
                assert_eq!(resp.error_code(), "COURSE_FULL");
                full += 1;
            }
            other => panic!("unexpected status {other}: {}", resp.body),
        }
    }

    assert_eq!(created, 10);
    assert_eq!(full, 50);

    let row = app.course(course).await;
    assert_eq!(row.enrolled, 10);
    assert_eq!(row.version, 10);
    assert_eq!(app.store.enrollment_count(course).await, 10);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_duplicate_requests_take_one_seat() {
    let app = Arc::new(TestApp::new().await);
    let course = app.create_course("Cryptography", 5).await;
    let student = StudentId::new();

    let mut handles = Vec::new();
    for _ in 0..20 {
        let app = Arc::clone(&app);
        handles.push(tokio::spawn(async move {
            app.service.enroll(student, course).await
        }));
    }

    let mut committed = 0;
    for handle in handles {
        match handle.await.expect("task panicked").expect("store failure") {
            EnrollOutcome::Committed(_) => committed += 1,
            EnrollOutcome::AlreadyEnrolled => {}
            other => panic!("unexpected outcome {other:?}"),
        }
    }

    assert_eq!(committed, 1);
    assert_eq!(app.course(course).await.enrolled, 1);
    assert_eq!(app.store.enrollment_count(course).await, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_mixed_enroll_and_drop_keep_ledger_consistent() {
    let app = Arc::new(TestApp::new().await);
    let course = app.create_course("Machine Learning", 8).await;

    let holders: Vec<StudentId> = (0..8).map(|_| StudentId::new()).collect();
    for student in &holders {
        let outcome = app.service.enroll(*student, course).await.expect("store failure");
        assert!(outcome.is_committed());
    }
    assert!(app.course(course).await.is_full());

    let mut drops = Vec::new();
    for student in holders.iter().take(4).copied() {
        let app = Arc::clone(&app);
        drops.push(tokio::spawn(async move {
            app.service.drop_course(student, course).await
        }));
    }

    let newcomers: Vec<StudentId> = (0..12).map(|_| StudentId::new()).collect();
    let mut enrolls = Vec::new();
    for student in newcomers.iter().copied() {
        let app = Arc::clone(&app);
        enrolls.push(tokio::spawn(async move {
            (student, app.service.enroll(student, course).await)
        }));
    }

    for handle in drops {
        let outcome = handle.await.expect("task panicked").expect("store failure");
        assert_eq!(outcome, DropOutcome::Committed);
    }

    let mut admitted = HashSet::new();
    for handle in enrolls {
        let (student, result) = handle.await.expect("task panicked");
        match result.expect("store failure") {
            EnrollOutcome::Committed(_) => {
                admitted.insert(student);
            }
            EnrollOutcome::CourseFull => {}
            other => panic!("unexpected outcome {other:?}"),
        }
    }

    // Newcomers can only ever fill the four released seats
    assert!(admitted.len() <= 4);

    let row = app.course(course).await;
    let records = app.store.enrollment_count(course).await;
    assert_eq!(row.enrolled as usize, records);
    assert_eq!(records, 4 + admitted.len());
    assert!(row.enrolled <= row.capacity);
    assert_eq!(row.version, 8 + 4 + admitted.len() as i64);
}
