//! PostgreSQL enrollment store and versioned capacity ledger.

use async_trait::async_trait;
use sqlx::{Postgres, Transaction};
use tracing::{debug, info, warn};

use coursehub_core::error::{AppError, ErrorKind};
use coursehub_core::result::AppResult;
use coursehub_core::types::{CourseId, EnrollmentId, StudentId};
use coursehub_entity::course::{Course, ScheduleSlot};
use coursehub_entity::enrollment::Enrollment;

use super::{EnrollmentStore, TryDropOutcome, TryEnrollOutcome};
use crate::connection::DatabasePool;
use crate::repositories::{CourseRepository, EnrollmentRepository, ScheduleRepository};

/// Enrollment store backed by PostgreSQL.
#[derive(Debug, Clone)]
pub struct PgEnrollmentStore {
    db: DatabasePool,
    courses: CourseRepository,
    enrollments: EnrollmentRepository,
    schedules: ScheduleRepository,
}

impl PgEnrollmentStore {
    /// Create a store over the given pool.
    pub fn new(db: DatabasePool) -> Self {
        let pool = db.pool().clone();
        Self {
            db,
            courses: CourseRepository::new(pool.clone()),
            enrollments: EnrollmentRepository::new(pool.clone()),
            schedules: ScheduleRepository::new(pool),
        }
    }

    /// Course repository, for seeding reference data.
    pub fn courses(&self) -> &CourseRepository {
        &self.courses
    }

    /// Schedule repository, for seeding reference data.
    pub fn schedules(&self) -> &ScheduleRepository {
        &self.schedules
    }

    async fn lock_course_row(
        tx: &mut Transaction<'static, Postgres>,
        course_id: CourseId,
    ) -> AppResult<Option<Course>> {
        sqlx::query_as::<_, Course>("SELECT * FROM courses WHERE id = $1 FOR UPDATE")
            .bind(course_id)
            .fetch_optional(&mut **tx)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to re-read course", e))
    }

    async fn rollback(tx: Transaction<'static, Postgres>) -> AppResult<()> {
        tx.rollback()
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to roll back", e))
    }

    async fn commit(tx: Transaction<'static, Postgres>) -> AppResult<()> {
        tx.commit()
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to commit", e))
    }
}

#[async_trait]
impl EnrollmentStore for PgEnrollmentStore {
    async fn find_course(&self, course_id: CourseId) -> AppResult<Option<Course>> {
        self.courses.find_by_id(course_id).await
    }

    async fn find_enrollment(
        &self,
        student_id: StudentId,
        course_id: CourseId,
    ) -> AppResult<Option<Enrollment>> {
        self.enrollments.find(student_id, course_id).await
    }

    async fn course_slots(&self, course_id: CourseId) -> AppResult<Vec<ScheduleSlot>> {
        self.schedules.find_by_course(course_id).await
    }

    async fn student_slots(&self, student_id: StudentId) -> AppResult<Vec<ScheduleSlot>> {
        self.schedules.find_by_student(student_id).await
    }

    async fn student_courses(&self, student_id: StudentId) -> AppResult<Vec<Course>> {
        self.courses.find_by_student(student_id).await
    }

    async fn try_enroll(
        &self,
        student_id: StudentId,
        course_id: CourseId,
        expected_version: i64,
    ) -> AppResult<TryEnrollOutcome> {
        let mut tx = self.db.begin().await?;

        // The caller's lock serializes this service's writers only; the
        // persisted row is the authority on occupancy.
        let Some(course) = Self::lock_course_row(&mut tx, course_id).await? else {
            Self::rollback(tx).await?;
            return Ok(TryEnrollOutcome::CourseNotFound);
        };

        if course.enrolled >= course.capacity {
            Self::rollback(tx).await?;
            debug!(%course_id, enrolled = course.enrolled, capacity = course.capacity, "Course full");
            return Ok(TryEnrollOutcome::CapacityExceeded);
        }

        let enrollment = sqlx::query_as::<_, Enrollment>(
            "INSERT INTO enrollments (id, student_id, course_id) VALUES ($1, $2, $3) \
             ON CONFLICT (student_id, course_id) DO NOTHING RETURNING *",
        )
        .bind(EnrollmentId::new())
        .bind(student_id)
        .bind(course_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to insert enrollment", e))?;

        let Some(enrollment) = enrollment else {
            Self::rollback(tx).await?;
            return Ok(TryEnrollOutcome::AlreadyEnrolled);
        };

        let updated = sqlx::query(
            "UPDATE courses SET enrolled = enrolled + 1, version = version + 1 \
             WHERE id = $1 AND version = $2",
        )
        .bind(course_id)
        .bind(expected_version)
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to update course", e))?;

        if updated.rows_affected() == 0 {
            Self::rollback(tx).await?;
            warn!(
                %course_id,
                expected_version,
                observed_version = course.version,
                "Optimistic version check failed, enrollment rolled back"
            );
            return Ok(TryEnrollOutcome::VersionConflict {
                expected: expected_version,
            });
        }

        Self::commit(tx).await?;

        let version = expected_version + 1;
        info!(%student_id, %course_id, version, "Enrollment committed");
        Ok(TryEnrollOutcome::Committed {
            enrollment,
            version,
        })
    }

    async fn try_drop(
        &self,
        student_id: StudentId,
        course_id: CourseId,
    ) -> AppResult<TryDropOutcome> {
        let mut tx = self.db.begin().await?;

        // Course row first, matching `try_enroll`, so the two transactions
        // take row locks in the same order.
        let Some(course) = Self::lock_course_row(&mut tx, course_id).await? else {
            Self::rollback(tx).await?;
            return Ok(TryDropOutcome::NotEnrolled);
        };

        let deleted = sqlx::query("DELETE FROM enrollments WHERE student_id = $1 AND course_id = $2")
            .bind(student_id)
            .bind(course_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to delete enrollment", e)
            })?;

        if deleted.rows_affected() == 0 {
            Self::rollback(tx).await?;
            return Ok(TryDropOutcome::NotEnrolled);
        }

        if course.enrolled <= 0 {
            warn!(
                %course_id,
                enrolled = course.enrolled,
                "Occupancy counter drifted below enrollment rows, clamping at zero"
            );
        }

        let (enrolled, version): (i32, i64) = sqlx::query_as(
            "UPDATE courses SET enrolled = GREATEST(enrolled - 1, 0), version = version + 1 \
             WHERE id = $1 RETURNING enrolled, version",
        )
        .bind(course_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to update course", e))?;

        Self::commit(tx).await?;

        info!(%student_id, %course_id, enrolled, version, "Enrollment dropped");
        Ok(TryDropOutcome::Committed { version, enrolled })
    }

    async fn health_check(&self) -> AppResult<bool> {
        self.db.health_check().await
    }
}
