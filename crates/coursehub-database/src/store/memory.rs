//! In-memory enrollment store for single-process runs and tests.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::{info, warn};

use coursehub_core::result::AppResult;
use coursehub_core::types::{CourseId, StudentId};
use coursehub_entity::course::{Course, ScheduleSlot};
use coursehub_entity::enrollment::Enrollment;

use super::{EnrollmentStore, TryDropOutcome, TryEnrollOutcome};

#[derive(Debug, Default)]
struct LedgerState {
    courses: HashMap<CourseId, Course>,
    enrollments: HashMap<(StudentId, CourseId), Enrollment>,
    slots: Vec<ScheduleSlot>,
}

/// Enrollment store holding all state behind one async mutex.
///
/// Each ledger operation runs under the mutex, which gives it the same
/// all-or-nothing visibility a database transaction provides.
#[derive(Debug, Clone, Default)]
pub struct MemoryEnrollmentStore {
    state: Arc<Mutex<LedgerState>>,
}

impl MemoryEnrollmentStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a course.
    pub async fn add_course(&self, course: Course) {
        let mut state = self.state.lock().await;
        state.courses.insert(course.id, course);
    }

    /// Append a schedule slot.
    pub async fn add_slot(&self, slot: ScheduleSlot) {
        let mut state = self.state.lock().await;
        state.slots.push(slot);
    }

    /// Snapshot of a course row.
    pub async fn course(&self, course_id: CourseId) -> Option<Course> {
        let state = self.state.lock().await;
        state.courses.get(&course_id).cloned()
    }

    /// Number of enrollment records for a course.
    pub async fn enrollment_count(&self, course_id: CourseId) -> usize {
        let state = self.state.lock().await;
        state
            .enrollments
            .keys()
            .filter(|(_, c)| *c == course_id)
            .count()
    }

    /// Bump a course's version without touching occupancy, as an external
    /// writer would.
    pub async fn touch_course(&self, course_id: CourseId) -> Option<i64> {
        let mut state = self.state.lock().await;
        let course = state.courses.get_mut(&course_id)?;
        course.version += 1;
        Some(course.version)
    }
}

#[async_trait]
impl EnrollmentStore for MemoryEnrollmentStore {
    async fn find_course(&self, course_id: CourseId) -> AppResult<Option<Course>> {
        Ok(self.course(course_id).await)
    }

    async fn find_enrollment(
        &self,
        student_id: StudentId,
        course_id: CourseId,
    ) -> AppResult<Option<Enrollment>> {
        let state = self.state.lock().await;
        Ok(state.enrollments.get(&(student_id, course_id)).cloned())
    }

    async fn course_slots(&self, course_id: CourseId) -> AppResult<Vec<ScheduleSlot>> {
        let state = self.state.lock().await;
        Ok(state
            .slots
            .iter()
            .filter(|s| s.course_id == course_id)
            .cloned()
            .collect())
    }

    async fn student_slots(&self, student_id: StudentId) -> AppResult<Vec<ScheduleSlot>> {
        let state = self.state.lock().await;
        Ok(state
            .slots
            .iter()
            .filter(|s| state.enrollments.contains_key(&(student_id, s.course_id)))
            .cloned()
            .collect())
    }

    async fn student_courses(&self, student_id: StudentId) -> AppResult<Vec<Course>> {
        let state = self.state.lock().await;
        let mut enrolled: Vec<&Enrollment> = state
            .enrollments
            .values()
            .filter(|e| e.student_id == student_id)
            .collect();
        enrolled.sort_by_key(|e| e.enrolled_at);
        Ok(enrolled
            .into_iter()
            .filter_map(|e| state.courses.get(&e.course_id).cloned())
            .collect())
    }

    async fn try_enroll(
        &self,
        student_id: StudentId,
        course_id: CourseId,
        expected_version: i64,
    ) -> AppResult<TryEnrollOutcome> {
        let mut state = self.state.lock().await;
        let LedgerState {
            courses,
            enrollments,
            ..
        } = &mut *state;

        let Some(course) = courses.get_mut(&course_id) else {
            return Ok(TryEnrollOutcome::CourseNotFound);
        };
        if course.is_full() {
            return Ok(TryEnrollOutcome::CapacityExceeded);
        }
        if enrollments.contains_key(&(student_id, course_id)) {
            return Ok(TryEnrollOutcome::AlreadyEnrolled);
        }
        if course.version != expected_version {
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

        let enrollment = Enrollment::new(student_id, course_id);
        enrollments.insert((student_id, course_id), enrollment.clone());
        course.enrolled += 1;
        course.version += 1;

        info!(%student_id, %course_id, version = course.version, "Enrollment committed");
        Ok(TryEnrollOutcome::Committed {
            enrollment,
            version: course.version,
        })
    }

    async fn try_drop(
        &self,
        student_id: StudentId,
        course_id: CourseId,
    ) -> AppResult<TryDropOutcome> {
        let mut state = self.state.lock().await;
        let LedgerState {
            courses,
            enrollments,
            ..
        } = &mut *state;

        let Some(course) = courses.get_mut(&course_id) else {
            return Ok(TryDropOutcome::NotEnrolled);
        };
        if enrollments.remove(&(student_id, course_id)).is_none() {
            return Ok(TryDropOutcome::NotEnrolled);
        }
        if course.enrolled <= 0 {
            warn!(
                %course_id,
                enrolled = course.enrolled,
                "Occupancy counter drifted below enrollment rows, clamping at zero"
            );
        }
        course.enrolled = (course.enrolled - 1).max(0);
        course.version += 1;

        info!(
            %student_id,
            %course_id,
            enrolled = course.enrolled,
            version = course.version,
            "Enrollment dropped"
        );
        Ok(TryDropOutcome::Committed {
            version: course.version,
            enrolled: course.enrolled,
        })
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(true)
    }
}
