//! Route definitions for the CourseHub HTTP API.
//!
//! All routes are mounted under `/api`.

use axum::{
    Router,
    routing::{delete, get, post},
};

use crate::handlers;
use crate::state::AppState;

/// Build the Axum router with all routes.
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .merge(enrollment_routes())
        .merge(health_routes());

    Router::new().nest("/api", api_routes).with_state(state)
}

/// Enrollment, course list and timetable endpoints
fn enrollment_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/students/{student_id}/enrollments",
            post(handlers::enrollment::enroll),
        )
        .route(
            "/students/{student_id}/enrollments/{course_id}",
            delete(handlers::enrollment::drop_enrollment),
        )
        .route(
            "/students/{student_id}/courses",
            get(handlers::enrollment::list_courses),
        )
        .route(
            "/students/{student_id}/timetable",
            get(handlers::schedule::timetable),
        )
}

/// Health endpoint
fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(handlers::health::health))
}
