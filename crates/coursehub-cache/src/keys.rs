//! Coordination key builders.
//!
//! The backend's configured prefix is prepended on top of these.

use coursehub_core::types::CourseId;

/// Lock key serializing seat mutations on one course.
pub fn course_lock(course_id: CourseId) -> String {
    format!("lock:course:{course_id}")
}
