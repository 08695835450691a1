//! Results of the enroll and drop protocols.
//!
//! Business rejections and transient contention are outcomes, not errors.
//! Only store failures surface as `Err(AppError)`.

use serde::Serialize;

use coursehub_entity::enrollment::Enrollment;

/// Why a request was turned away as transient contention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BusyReason {
    /// The admission limiter had no token.
    RateLimited,
    /// The course lock was not obtained in time.
    LockTimeout,
    /// The course row kept changing through every retry.
    VersionConflict,
    /// The end-to-end request deadline passed.
    DeadlineExceeded,
}

impl BusyReason {
    /// Stable machine-readable code.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RateLimited => "rate_limited",
            Self::LockTimeout => "lock_timeout",
            Self::VersionConflict => "version_conflict",
            Self::DeadlineExceeded => "deadline_exceeded",
        }
    }
}

/// Result of an enroll request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnrollOutcome {
    /// The seat was taken.
    Committed(Enrollment),
    /// The student already holds a seat in this course.
    AlreadyEnrolled,
    /// No seat was left.
    CourseFull,
    /// The course does not exist.
    CourseNotFound,
    /// The course collides with the student's timetable.
    ScheduleConflict(String),
    /// Transient contention; safe to retry.
    Busy(BusyReason),
}

impl EnrollOutcome {
    /// Whether a seat was committed.
    pub fn is_committed(&self) -> bool {
        matches!(self, Self::Committed(_))
    }
}

/// Result of a drop request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropOutcome {
    /// The seat was released.
    Committed,
    /// The student held no seat in this course.
    NotEnrolled,
    /// Transient contention; safe to retry.
    Busy(BusyReason),
}
