//! Enrollment orchestration.

pub mod outcome;
pub mod service;

pub use outcome::{BusyReason, DropOutcome, EnrollOutcome};
pub use service::EnrollmentService;
