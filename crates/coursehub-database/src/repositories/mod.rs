//! Read-side repositories and reference-data writers.
//!
//! Occupancy columns (`courses.enrolled`, `courses.version`) and the
//! `enrollments` table are written exclusively by the capacity ledger in
//! [`crate::store`]; nothing in this module touches them.

pub mod course;
pub mod enrollment;
pub mod schedule;

pub use course::CourseRepository;
pub use enrollment::EnrollmentRepository;
pub use schedule::ScheduleRepository;
