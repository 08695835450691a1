//! Enrollment orchestrator.

use std::sync::Arc;

use tokio::time;
use tracing::{debug, info, warn};

use coursehub_cache::keys;
use coursehub_core::config::EnrollmentConfig;
use coursehub_core::error::AppError;
use coursehub_core::types::{CourseId, StudentId};
use coursehub_database::{EnrollmentStore, TryDropOutcome, TryEnrollOutcome};
use coursehub_entity::course::Course;
use coursehub_guard::{AdmissionLimiter, DistributedLock, LockError};

use super::outcome::{BusyReason, DropOutcome, EnrollOutcome};
use crate::schedule::{Timetable, find_conflict};

/// What one pass through the locked phase produced.
enum LockedStep {
    Done(EnrollOutcome),
    VersionConflict,
}

/// Runs the enroll and drop protocols.
///
/// Enroll: admit, pre-check without the lock (course exists, no duplicate,
/// no schedule conflict), lock the course, re-check under the lock, then
/// commit through the versioned ledger. A version conflict re-enters the
/// locked phase a bounded number of times with linear backoff.
#[derive(Debug, Clone)]
pub struct EnrollmentService {
    /// Enrollment store (read side and capacity ledger).
    store: Arc<dyn EnrollmentStore>,
    /// Process-wide admission gate.
    limiter: Arc<AdmissionLimiter>,
    /// Per-course lock.
    lock: DistributedLock,
    /// Retry policy and deadline.
    config: EnrollmentConfig,
}

impl EnrollmentService {
    /// Creates a new enrollment service.
    pub fn new(
        store: Arc<dyn EnrollmentStore>,
        limiter: Arc<AdmissionLimiter>,
        lock: DistributedLock,
        config: EnrollmentConfig,
    ) -> Self {
        Self {
            store,
            limiter,
            lock,
            config,
        }
    }

    /// Enroll `student_id` in `course_id`.
    pub async fn enroll(
        &self,
        student_id: StudentId,
        course_id: CourseId,
    ) -> Result<EnrollOutcome, AppError> {
        let deadline = self.config.request_timeout();
        match time::timeout(deadline, self.run_enroll(student_id, course_id)).await {
            Ok(result) => result,
            Err(_) => {
                warn!(%student_id, %course_id, "Enroll request deadline exceeded");
                Ok(EnrollOutcome::Busy(BusyReason::DeadlineExceeded))
            }
        }
    }

    /// Withdraw `student_id` from `course_id`.
    pub async fn drop_course(
        &self,
        student_id: StudentId,
        course_id: CourseId,
    ) -> Result<DropOutcome, AppError> {
        let deadline = self.config.request_timeout();
        match time::timeout(deadline, self.run_drop(student_id, course_id)).await {
            Ok(result) => result,
            Err(_) => {
                warn!(%student_id, %course_id, "Drop request deadline exceeded");
                Ok(DropOutcome::Busy(BusyReason::DeadlineExceeded))
            }
        }
    }

    /// Courses the student is enrolled in.
    pub async fn student_courses(&self, student_id: StudentId) -> Result<Vec<Course>, AppError> {
        self.store.student_courses(student_id).await
    }

    /// The student's weekly grid for `week` (`0` = every week).
    pub async fn timetable(&self, student_id: StudentId, week: i16) -> Result<Timetable, AppError> {
        let courses = self.store.student_courses(student_id).await?;
        let slots = self.store.student_slots(student_id).await?;
        Ok(Timetable::build(&courses, &slots, week))
    }

    async fn run_enroll(
        &self,
        student_id: StudentId,
        course_id: CourseId,
    ) -> Result<EnrollOutcome, AppError> {
        if !self.limiter.admit() {
            debug!(%student_id, %course_id, "Enroll rejected by admission limiter");
            return Ok(EnrollOutcome::Busy(BusyReason::RateLimited));
        }

        // Cheap pre-checks, no lock held.
        if self.store.find_course(course_id).await?.is_none() {
            return Ok(EnrollOutcome::CourseNotFound);
        }
        if self.store.find_enrollment(student_id, course_id).await?.is_some() {
            return Ok(EnrollOutcome::AlreadyEnrolled);
        }
        if let Some(reason) = self.schedule_conflict(student_id, course_id).await? {
            info!(%student_id, %course_id, %reason, "Enroll rejected by schedule conflict");
            return Ok(EnrollOutcome::ScheduleConflict(reason));
        }

        let key = keys::course_lock(course_id);
        let mut retries: u32 = 0;

        loop {
            let step = self
                .lock
                .with_lock(&key, || self.enroll_locked(student_id, course_id))
                .await;

            match step {
                Ok(Ok(LockedStep::Done(outcome))) => return Ok(outcome),
                Ok(Ok(LockedStep::VersionConflict)) => {}
                Ok(Err(e)) => return Err(e),
                Err(LockError::Timeout { attempts, .. }) => {
                    warn!(%student_id, %course_id, attempts, "Course lock timed out");
                    return Ok(EnrollOutcome::Busy(BusyReason::LockTimeout));
                }
                Err(e) => return Err(e.into()),
            }

            retries += 1;
            if retries > self.config.max_conflict_retries {
                warn!(%student_id, %course_id, retries, "Version conflict retries exhausted");
                return Ok(EnrollOutcome::Busy(BusyReason::VersionConflict));
            }
            debug!(%student_id, %course_id, retries, "Retrying after version conflict");
            time::sleep(self.config.backoff_for(retries)).await;
        }
    }

    /// Locked phase: re-validate against current state and commit.
    async fn enroll_locked(
        &self,
        student_id: StudentId,
        course_id: CourseId,
    ) -> Result<LockedStep, AppError> {
        if self.store.find_enrollment(student_id, course_id).await?.is_some() {
            return Ok(LockedStep::Done(EnrollOutcome::AlreadyEnrolled));
        }
        let Some(course) = self.store.find_course(course_id).await? else {
            return Ok(LockedStep::Done(EnrollOutcome::CourseNotFound));
        };
        if course.is_full() {
            return Ok(LockedStep::Done(EnrollOutcome::CourseFull));
        }

        let outcome = match self
            .store
            .try_enroll(student_id, course_id, course.version)
            .await?
        {
            TryEnrollOutcome::Committed { enrollment, .. } => EnrollOutcome::Committed(enrollment),
            TryEnrollOutcome::CapacityExceeded => EnrollOutcome::CourseFull,
            TryEnrollOutcome::AlreadyEnrolled => EnrollOutcome::AlreadyEnrolled,
            TryEnrollOutcome::CourseNotFound => EnrollOutcome::CourseNotFound,
            TryEnrollOutcome::VersionConflict { .. } => return Ok(LockedStep::VersionConflict),
        };
        Ok(LockedStep::Done(outcome))
    }

    async fn run_drop(
        &self,
        student_id: StudentId,
        course_id: CourseId,
    ) -> Result<DropOutcome, AppError> {
        if !self.limiter.admit() {
            debug!(%student_id, %course_id, "Drop rejected by admission limiter");
            return Ok(DropOutcome::Busy(BusyReason::RateLimited));
        }

        if self.store.find_enrollment(student_id, course_id).await?.is_none() {
            return Ok(DropOutcome::NotEnrolled);
        }

        let key = keys::course_lock(course_id);
        let dropped = self
            .lock
            .with_lock(&key, || self.store.try_drop(student_id, course_id))
            .await;

        match dropped {
            Ok(Ok(TryDropOutcome::Committed { .. })) => Ok(DropOutcome::Committed),
            Ok(Ok(TryDropOutcome::NotEnrolled)) => Ok(DropOutcome::NotEnrolled),
            Ok(Err(e)) => Err(e),
            Err(LockError::Timeout { attempts, .. }) => {
                warn!(%student_id, %course_id, attempts, "Course lock timed out");
                Ok(DropOutcome::Busy(BusyReason::LockTimeout))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Describe the first collision between the course's slots and the
    /// student's current timetable, if any.
    async fn schedule_conflict(
        &self,
        student_id: StudentId,
        course_id: CourseId,
    ) -> Result<Option<String>, AppError> {
        let proposed = self.store.course_slots(course_id).await?;
        if proposed.is_empty() {
            return Ok(None);
        }
        let existing = self.store.student_slots(student_id).await?;
        let Some(conflict) = find_conflict(&proposed, &existing) else {
            return Ok(None);
        };
        let held = self.store.find_course(conflict.existing.course_id).await?;
        Ok(Some(conflict.describe(held.as_ref().map(|c| c.name.as_str()))))
    }
}
