//! Request DTOs.

use serde::Deserialize;

use coursehub_core::types::CourseId;

/// Body of `POST /api/students/{student_id}/enrollments`.
#[derive(Debug, Clone, Deserialize)]
pub struct EnrollRequest {
    /// Course to enroll in.
    pub course_id: CourseId,
}

/// Query of `GET /api/students/{student_id}/timetable`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TimetableQuery {
    /// Teaching week; omitted or `0` shows every week.
    #[serde(default)]
    pub week: i16,
}
