//! Enrollment handlers.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;

use coursehub_core::types::{CourseId, StudentId};
use coursehub_entity::enrollment::Enrollment;
use coursehub_service::{DropOutcome, EnrollOutcome};

use crate::dto::request::EnrollRequest;
use crate::dto::response::{ApiResponse, CourseResponse, DropResponse};
use crate::error::ApiError;
use crate::state::AppState;

/// POST /api/students/{student_id}/enrollments
pub async fn enroll(
    State(state): State<AppState>,
    Path(student_id): Path<StudentId>,
    Json(req): Json<EnrollRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Enrollment>>), ApiError> {
    match state.enrollment.enroll(student_id, req.course_id).await? {
        EnrollOutcome::Committed(enrollment) => {
            Ok((StatusCode::CREATED, Json(ApiResponse::ok(enrollment))))
        }
        EnrollOutcome::AlreadyEnrolled => Err(ApiError::conflict(
            "ALREADY_ENROLLED",
            "Student is already enrolled in this course",
        )),
        EnrollOutcome::CourseFull => Err(ApiError::conflict("COURSE_FULL", "Course is full")),
        EnrollOutcome::CourseNotFound => Err(ApiError::not_found(
            "COURSE_NOT_FOUND",
            format!("Course {} not found", req.course_id),
        )),
        EnrollOutcome::ScheduleConflict(reason) => {
            Err(ApiError::conflict("SCHEDULE_CONFLICT", reason))
        }
        EnrollOutcome::Busy(reason) => Err(ApiError::Busy(reason)),
    }
}

/// DELETE /api/students/{student_id}/enrollments/{course_id}
pub async fn drop_enrollment(
    State(state): State<AppState>,
    Path((student_id, course_id)): Path<(StudentId, CourseId)>,
) -> Result<Json<ApiResponse<DropResponse>>, ApiError> {
    match state.enrollment.drop_course(student_id, course_id).await? {
        DropOutcome::Committed => Ok(Json(ApiResponse::ok(DropResponse {
            course_id,
            status: "dropped".to_string(),
        }))),
        DropOutcome::NotEnrolled => Err(ApiError::not_found(
            "NOT_ENROLLED",
            "Student is not enrolled in this course",
        )),
        DropOutcome::Busy(reason) => Err(ApiError::Busy(reason)),
    }
}

/// GET /api/students/{student_id}/courses
pub async fn list_courses(
    State(state): State<AppState>,
    Path(student_id): Path<StudentId>,
) -> Result<Json<ApiResponse<Vec<CourseResponse>>>, ApiError> {
    let courses = state.enrollment.student_courses(student_id).await?;
    Ok(Json(ApiResponse::ok(
        courses.into_iter().map(CourseResponse::from).collect(),
    )))
}
