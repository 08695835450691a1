//! Lock error types.

use coursehub_core::error::{AppError, ErrorKind};

/// Errors returned by [`DistributedLock`](super::DistributedLock).
#[derive(Debug, thiserror::Error)]
pub enum LockError {
    /// The lock could not be obtained within the retry budget or deadline.
    #[error("Timed out acquiring lock '{key}' after {attempts} attempt(s)")]
    Timeout {
        /// Lock key.
        key: String,
        /// Acquisition attempts made.
        attempts: u32,
    },

    /// The stored token does not match: the lease expired (and may have
    /// been re-acquired) or was never held.
    #[error("Lock '{key}' is not held by this token")]
    NotOwner {
        /// Lock key.
        key: String,
    },

    /// The coordination store failed or was unreachable.
    #[error("Coordination store failure: {0}")]
    Store(#[from] AppError),
}

impl From<LockError> for AppError {
    fn from(err: LockError) -> Self {
        match err {
            LockError::Store(inner) => inner,
            LockError::Timeout { .. } => AppError::timeout(err.to_string()),
            LockError::NotOwner { .. } => AppError::new(ErrorKind::Conflict, err.to_string()),
        }
    }
}
