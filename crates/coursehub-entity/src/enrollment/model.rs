//! Enrollment entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use coursehub_core::types::{CourseId, EnrollmentId, StudentId};

/// A student's seat in a course.
///
/// At most one row exists per `(student_id, course_id)`; the pair carries a
/// unique constraint in the database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Enrollment {
    /// Unique enrollment identifier.
    pub id: EnrollmentId,
    /// Enrolled student.
    pub student_id: StudentId,
    /// Course the seat belongs to.
    pub course_id: CourseId,
    /// When the seat was committed.
    pub enrolled_at: DateTime<Utc>,
}

impl Enrollment {
    /// Build a new enrollment stamped with the current time.
    pub fn new(student_id: StudentId, course_id: CourseId) -> Self {
        Self {
            id: EnrollmentId::new(),
            student_id,
            course_id,
            enrolled_at: Utc::now(),
        }
    }
}
