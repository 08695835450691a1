//! Ledger tests against a live PostgreSQL instance.
//!
//! Run with `COURSEHUB_TEST_DATABASE_URL` set and `--ignored`.

use coursehub_core::config::AppConfig;
use coursehub_core::types::StudentId;
use coursehub_database::migration::run_migrations;
use coursehub_database::{
    DatabasePool, EnrollmentStore, PgEnrollmentStore, TryDropOutcome, TryEnrollOutcome,
};
use coursehub_entity::course::Course;

async fn store() -> PgEnrollmentStore {
    let url = std::env::var("COURSEHUB_TEST_DATABASE_URL")
        .expect("COURSEHUB_TEST_DATABASE_URL must be set");
    let config = AppConfig::from_toml(&format!("[database]\nurl = \"{url}\"\n"))
        .expect("Failed to parse test config");
    let db = DatabasePool::connect(&config.database)
        .await
        .expect("Failed to connect");
    run_migrations(db.pool()).await.expect("Failed to migrate");
    PgEnrollmentStore::new(db)
}

async fn seed(store: &PgEnrollmentStore, capacity: i32) -> Course {
    store
        .courses()
        .create(&Course::new("Ledger Test", capacity))
        .await
        .expect("Failed to create course")
}

#[tokio::test]
#[ignore = "requires PostgreSQL"]
async fn test_enroll_guards_capacity_and_version() {
    let store = store().await;
    let course = seed(&store, 1).await;
    let first = StudentId::new();

    let outcome = store
        .try_enroll(first, course.id, course.version)
        .await
        .unwrap();
    assert!(matches!(outcome, TryEnrollOutcome::Committed { version: 1, .. }));

    let outcome = store.try_enroll(first, course.id, 1).await.unwrap();
    assert_eq!(outcome, TryEnrollOutcome::CapacityExceeded);

    let row = store.find_course(course.id).await.unwrap().unwrap();
    assert_eq!(row.enrolled, 1);
    assert_eq!(row.version, 1);
}

#[tokio::test]
#[ignore = "requires PostgreSQL"]
async fn test_stale_version_rolls_back_insert() {
    let store = store().await;
    let course = seed(&store, 5).await;
    let student = StudentId::new();

    store
        .try_enroll(StudentId::new(), course.id, 0)
        .await
        .unwrap();

    let outcome = store.try_enroll(student, course.id, 0).await.unwrap();
    assert_eq!(outcome, TryEnrollOutcome::VersionConflict { expected: 0 });
    assert!(
        store
            .find_enrollment(student, course.id)
            .await
            .unwrap()
            .is_none()
    );

    let outcome = store.try_enroll(student, course.id, 1).await.unwrap();
    assert!(matches!(outcome, TryEnrollOutcome::Committed { version: 2, .. }));

    let outcome = store.try_enroll(student, course.id, 2).await.unwrap();
    assert_eq!(outcome, TryEnrollOutcome::AlreadyEnrolled);
}

#[tokio::test]
#[ignore = "requires PostgreSQL"]
async fn test_drop_decrements_and_bumps_version() {
    let store = store().await;
    let course = seed(&store, 2).await;
    let student = StudentId::new();

    store.try_enroll(student, course.id, 0).await.unwrap();

    let outcome = store.try_drop(student, course.id).await.unwrap();
    assert_eq!(
        outcome,
        TryDropOutcome::Committed {
            version: 2,
            enrolled: 0
        }
    );

    let outcome = store.try_drop(student, course.id).await.unwrap();
    assert_eq!(outcome, TryDropOutcome::NotEnrolled);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
#[ignore = "requires PostgreSQL"]
async fn test_concurrent_enroll_and_drop_on_same_pair() {
    let store = store().await;
    let course = seed(&store, 5).await;
    let student = StudentId::new();
    store.try_enroll(student, course.id, 0).await.unwrap();

    for _ in 0..20 {
        let version = store.find_course(course.id).await.unwrap().unwrap().version;
        let (enrolled, dropped) = tokio::join!(
            store.try_enroll(student, course.id, version),
            store.try_drop(student, course.id),
        );
        enrolled.expect("enroll transaction failed");
        dropped.expect("drop transaction failed");

        let row = store.find_course(course.id).await.unwrap().unwrap();
        let held = store.find_enrollment(student, course.id).await.unwrap();
        assert_eq!(row.enrolled, i32::from(held.is_some()));
    }
}
