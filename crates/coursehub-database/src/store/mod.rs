//! Enrollment store: read access plus the versioned capacity ledger.
//!
//! Two implementations are provided:
//! - PostgreSQL ([`PgEnrollmentStore`]), the system of record
//! - In-memory ([`MemoryEnrollmentStore`]), for single-process runs and tests

#[cfg(feature = "memory")]
pub mod memory;
pub mod postgres;

use async_trait::async_trait;

use coursehub_core::result::AppResult;
use coursehub_core::types::{CourseId, StudentId};
use coursehub_entity::course::{Course, ScheduleSlot};
use coursehub_entity::enrollment::Enrollment;

#[cfg(feature = "memory")]
pub use memory::MemoryEnrollmentStore;
pub use postgres::PgEnrollmentStore;

/// Result of a ledger enroll transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TryEnrollOutcome {
    /// Enrollment row and counter increment were committed together.
    Committed {
        /// The inserted enrollment.
        enrollment: Enrollment,
        /// Course version after the commit.
        version: i64,
    },
    /// The course had no free seat; nothing was written.
    CapacityExceeded,
    /// The course row changed since `expected_version` was read.
    VersionConflict {
        /// Version the caller expected.
        expected: i64,
    },
    /// The `(student, course)` pair already has an enrollment.
    AlreadyEnrolled,
    /// The course row no longer exists.
    CourseNotFound,
}

/// Result of a ledger drop transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TryDropOutcome {
    /// Enrollment row deletion and counter decrement were committed together.
    Committed {
        /// Course version after the commit.
        version: i64,
        /// Occupancy after the commit.
        enrolled: i32,
    },
    /// No enrollment existed for the pair; nothing was written.
    NotEnrolled,
}

/// Storage operations needed by the enrollment orchestrator.
///
/// The read methods back the cheap pre-checks performed before the course
/// lock is taken. [`try_enroll`](Self::try_enroll) and
/// [`try_drop`](Self::try_drop) are the only paths that mutate occupancy;
/// each runs as one all-or-nothing transaction.
#[async_trait]
pub trait EnrollmentStore: Send + Sync + std::fmt::Debug + 'static {
    /// Load a course row.
    async fn find_course(&self, course_id: CourseId) -> AppResult<Option<Course>>;

    /// Load the enrollment for a `(student, course)` pair.
    async fn find_enrollment(
        &self,
        student_id: StudentId,
        course_id: CourseId,
    ) -> AppResult<Option<Enrollment>>;

    /// Weekly slots of one course, in insertion order.
    async fn course_slots(&self, course_id: CourseId) -> AppResult<Vec<ScheduleSlot>>;

    /// Weekly slots of every course the student is enrolled in.
    async fn student_slots(&self, student_id: StudentId) -> AppResult<Vec<ScheduleSlot>>;

    /// Courses the student is enrolled in.
    async fn student_courses(&self, student_id: StudentId) -> AppResult<Vec<Course>>;

    /// Take one seat for `student_id`, guarded by `expected_version`.
    ///
    /// Re-reads the course inside the transaction, refuses when full,
    /// inserts the enrollment, then increments `enrolled` and `version`
    /// only where `version = expected_version`.
    async fn try_enroll(
        &self,
        student_id: StudentId,
        course_id: CourseId,
        expected_version: i64,
    ) -> AppResult<TryEnrollOutcome>;

    /// Release the student's seat, decrementing `enrolled` (never below
    /// zero) and incrementing `version`.
    async fn try_drop(&self, student_id: StudentId, course_id: CourseId)
    -> AppResult<TryDropOutcome>;

    /// Check that the store is reachable.
    async fn health_check(&self) -> AppResult<bool>;
}
