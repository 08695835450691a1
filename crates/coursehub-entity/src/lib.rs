//! # coursehub-entity
//!
//! Domain entity models for CourseHub. Every struct in this crate
//! represents a database table row or a domain value object. Database
//! entities derive `sqlx::FromRow`.

pub mod course;
pub mod enrollment;

pub use course::{Course, ScheduleSlot};
pub use enrollment::Enrollment;
