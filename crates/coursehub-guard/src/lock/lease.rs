//! Scoped lock ownership.

use std::time::Duration;

use super::{DistributedLock, LockError};

/// Proof of holding a lock.
///
/// Release explicitly with [`release`](Self::release). A lease dropped
/// without release (the owning future was cancelled, or a task panicked
/// outside [`DistributedLock::with_lock`]) spawns a bounded background
/// release on the current runtime.
#[derive(Debug)]
#[must_use = "dropping a lease releases the lock in the background"]
pub struct LockLease {
    lock: DistributedLock,
    key: String,
    token: String,
    released: bool,
}

impl LockLease {
    pub(super) fn new(lock: DistributedLock, key: &str, token: String) -> Self {
        Self {
            lock,
            key: key.to_string(),
            token,
            released: false,
        }
    }

    /// Lock key.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Ownership token stored under the key.
    pub fn token(&self) -> &str {
        &self.token
    }

    /// Reset the lease TTL.
    pub async fn extend(&self, ttl: Duration) -> Result<(), LockError> {
        self.lock.extend(&self.key, &self.token, ttl).await
    }

    /// Release the lock. [`LockError::NotOwner`] means the lease had
    /// already expired.
    ///
    /// The lease counts as released only once the store call returns, so a
    /// caller cancelled mid-release still hands the key to `Drop`.
    pub async fn release(mut self) -> Result<(), LockError> {
        let result = self.lock.release(&self.key, &self.token).await;
        self.released = true;
        result
    }
}

impl Drop for LockLease {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        tracing::debug!(key = %self.key, "Lease dropped unreleased, releasing in background");
        self.lock.spawn_release(
            std::mem::take(&mut self.key),
            std::mem::take(&mut self.token),
        );
    }
}
