//! # coursehub-guard
//!
//! Contention guards for the enrollment path:
//!
//! - [`AdmissionLimiter`]: token bucket shaping request rate before any
//!   store is touched
//! - [`DistributedLock`]: lease-based mutual exclusion over a
//!   [`CoordinationStore`](coursehub_core::traits::CoordinationStore)

pub mod limiter;
pub mod lock;

pub use limiter::AdmissionLimiter;
pub use lock::{DistributedLock, LockError, LockLease, LockOptions};
