//! Enrollment repository implementation (read side).

use sqlx::PgPool;

use coursehub_core::error::{AppError, ErrorKind};
use coursehub_core::result::AppResult;
use coursehub_core::types::{CourseId, StudentId};
use coursehub_entity::enrollment::Enrollment;

/// Repository for reading enrollment records.
#[derive(Debug, Clone)]
pub struct EnrollmentRepository {
    pool: PgPool,
}

impl EnrollmentRepository {
    /// Create a new enrollment repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find the enrollment for a `(student, course)` pair.
    pub async fn find(
        &self,
        student_id: StudentId,
        course_id: CourseId,
    ) -> AppResult<Option<Enrollment>> {
        sqlx::query_as::<_, Enrollment>(
            "SELECT * FROM enrollments WHERE student_id = $1 AND course_id = $2",
        )
        .bind(student_id)
        .bind(course_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find enrollment", e))
    }
}
