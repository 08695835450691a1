//! # coursehub-service
//!
//! Enrollment use cases. [`EnrollmentService`] composes the admission
//! limiter, the per-course distributed lock and the versioned capacity
//! ledger into the enroll and drop protocols. The [`schedule`] module holds
//! the pure conflict detector and the weekly timetable builder.
//!
//! Services follow constructor injection: all dependencies are provided
//! at construction time via `Arc` references.

pub mod enrollment;
pub mod schedule;

pub use enrollment::{BusyReason, DropOutcome, EnrollOutcome, EnrollmentService};
pub use schedule::{SlotConflict, Timetable, find_conflict};
