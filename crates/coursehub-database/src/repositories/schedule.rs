//! Schedule slot repository implementation.

use sqlx::PgPool;

use coursehub_core::error::{AppError, ErrorKind};
use coursehub_core::result::AppResult;
use coursehub_core::types::{CourseId, StudentId};
use coursehub_entity::course::ScheduleSlot;

/// Repository for weekly schedule slots.
#[derive(Debug, Clone)]
pub struct ScheduleRepository {
    pool: PgPool,
}

impl ScheduleRepository {
    /// Create a new schedule repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Slots of a single course, in insertion order.
    pub async fn find_by_course(&self, course_id: CourseId) -> AppResult<Vec<ScheduleSlot>> {
        sqlx::query_as::<_, ScheduleSlot>(
            "SELECT * FROM schedule_slots WHERE course_id = $1 ORDER BY created_at, id",
        )
        .bind(course_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to load course schedule", e)
        })
    }

    /// Slots of every course the student is enrolled in.
    pub async fn find_by_student(&self, student_id: StudentId) -> AppResult<Vec<ScheduleSlot>> {
        sqlx::query_as::<_, ScheduleSlot>(
            "SELECT s.* FROM schedule_slots s \
             JOIN enrollments e ON e.course_id = s.course_id \
             WHERE e.student_id = $1 \
             ORDER BY e.enrolled_at, s.created_at, s.id",
        )
        .bind(student_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to load student schedule", e)
        })
    }

    /// Insert a slot.
    pub async fn create(&self, slot: &ScheduleSlot) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO schedule_slots \
             (id, course_id, day_of_week, start_time, end_time, start_week, end_week, classroom) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
        )
        .bind(slot.id)
        .bind(slot.course_id)
        .bind(slot.day_of_week)
        .bind(slot.start_time)
        .bind(slot.end_time)
        .bind(slot.start_week)
        .bind(slot.end_week)
        .bind(&slot.classroom)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to create slot", e))?;
        Ok(())
    }
}
