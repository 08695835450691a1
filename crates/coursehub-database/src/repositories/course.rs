//! Course repository implementation.

use sqlx::PgPool;

use coursehub_core::error::{AppError, ErrorKind};
use coursehub_core::result::AppResult;
use coursehub_core::types::{CourseId, StudentId};
use coursehub_entity::course::Course;

/// Repository for course rows.
#[derive(Debug, Clone)]
pub struct CourseRepository {
    pool: PgPool,
}

impl CourseRepository {
    /// Create a new course repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a course by ID.
    pub async fn find_by_id(&self, id: CourseId) -> AppResult<Option<Course>> {
        sqlx::query_as::<_, Course>("SELECT * FROM courses WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find course", e))
    }

    /// List the courses a student holds a seat in, oldest enrollment first.
    pub async fn find_by_student(&self, student_id: StudentId) -> AppResult<Vec<Course>> {
        sqlx::query_as::<_, Course>(
            "SELECT c.* FROM courses c \
             JOIN enrollments e ON e.course_id = c.id \
             WHERE e.student_id = $1 \
             ORDER BY e.enrolled_at",
        )
        .bind(student_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to list student courses", e)
        })
    }

    /// Insert a course row. Occupancy starts at zero, version at zero.
    pub async fn create(&self, course: &Course) -> AppResult<Course> {
        sqlx::query_as::<_, Course>(
            "INSERT INTO courses (id, name, description, instructor, capacity, enrolled, version) \
             VALUES ($1, $2, $3, $4, $5, 0, 0) RETURNING *",
        )
        .bind(course.id)
        .bind(&course.name)
        .bind(&course.description)
        .bind(&course.instructor)
        .bind(course.capacity)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to create course", e))
    }
}
