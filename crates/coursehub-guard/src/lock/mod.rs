//! Lease-based distributed lock.
//!
//! A lock record is `key -> token` with a TTL in the coordination store.
//! Only the holder of the matching token can delete or extend it, and both
//! checks run atomically inside the store. A holder that crashes simply
//! lets the TTL run out.

pub mod error;
pub mod lease;

use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use tokio::time::{self, Instant};
use tracing::{debug, warn};

use coursehub_core::config::LockConfig;
use coursehub_core::error::AppError;
use coursehub_core::traits::CoordinationStore;

pub use error::LockError;
pub use lease::LockLease;

/// Timing parameters for acquisition and release.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LockOptions {
    /// Lease time-to-live.
    pub ttl: Duration,
    /// Wait between acquisition attempts.
    pub retry_interval: Duration,
    /// Retries after the first attempt. `0` leaves only the deadline.
    pub max_retries: u32,
    /// Overall acquisition deadline.
    pub acquire_timeout: Duration,
    /// Bound on a single release call.
    pub release_timeout: Duration,
}

impl From<&LockConfig> for LockOptions {
    fn from(config: &LockConfig) -> Self {
        Self {
            ttl: config.ttl(),
            retry_interval: config.retry_interval(),
            max_retries: config.max_retries,
            acquire_timeout: config.acquire_timeout(),
            release_timeout: config.release_timeout(),
        }
    }
}

impl Default for LockOptions {
    fn default() -> Self {
        Self::from(&LockConfig::default())
    }
}

/// Distributed lock over a [`CoordinationStore`].
#[derive(Debug, Clone)]
pub struct DistributedLock {
    store: Arc<dyn CoordinationStore>,
    options: LockOptions,
}

impl DistributedLock {
    /// Create a lock client over the given store.
    pub fn new(store: Arc<dyn CoordinationStore>, options: LockOptions) -> Self {
        Self { store, options }
    }

    /// Configured timing parameters.
    pub fn options(&self) -> &LockOptions {
        &self.options
    }

    /// Acquire `key`, retrying until the retry budget or deadline runs out.
    pub async fn acquire(&self, key: &str) -> Result<LockLease, LockError> {
        let ttl = self.options.ttl;
        let deadline = Instant::now() + self.options.acquire_timeout;
        let token = new_token();
        let mut attempts: u32 = 0;

        loop {
            attempts += 1;

            let attempt = time::timeout_at(deadline, self.store.set_if_absent(key, &token, ttl));
            match attempt.await {
                Ok(Ok(true)) => {
                    debug!(key, attempts, "Lock acquired");
                    return Ok(LockLease::new(self.clone(), key, token));
                }
                Ok(Ok(false)) => {}
                Ok(Err(e)) => return Err(LockError::Store(e)),
                Err(_) => {
                    // The write may have landed after the deadline; clear it
                    // so it does not block others for a full TTL.
                    self.spawn_release(key.to_string(), token);
                    return Err(self.timed_out(key, attempts));
                }
            }

            if self.options.max_retries != 0 && attempts > self.options.max_retries {
                return Err(self.timed_out(key, attempts));
            }

            let now = Instant::now();
            if now >= deadline {
                return Err(self.timed_out(key, attempts));
            }
            time::sleep_until((now + self.options.retry_interval).min(deadline)).await;
        }
    }

    /// Single acquisition attempt. `Ok(None)` when the key is held.
    pub async fn try_acquire(&self, key: &str) -> Result<Option<LockLease>, LockError> {
        let token = new_token();
        if self.store.set_if_absent(key, &token, self.options.ttl).await? {
            debug!(key, "Lock acquired");
            Ok(Some(LockLease::new(self.clone(), key, token)))
        } else {
            Ok(None)
        }
    }

    /// Delete `key` if it still holds `token`.
    ///
    /// Bounded by the release timeout. Calling it twice with the same token
    /// yields [`LockError::NotOwner`] the second time.
    pub async fn release(&self, key: &str, token: &str) -> Result<(), LockError> {
        let deleted = time::timeout(
            self.options.release_timeout,
            self.store.compare_and_delete(key, token),
        )
        .await
        .map_err(|_| AppError::timeout(format!("Release of lock '{key}' timed out")))??;

        if deleted {
            debug!(key, "Lock released");
            Ok(())
        } else {
            Err(LockError::NotOwner {
                key: key.to_string(),
            })
        }
    }

    /// Reset the TTL of `key` to `ttl` if it still holds `token`.
    pub async fn extend(&self, key: &str, token: &str, ttl: Duration) -> Result<(), LockError> {
        if self.store.compare_and_expire(key, token, ttl).await? {
            debug!(key, ttl_ms = ttl.as_millis() as u64, "Lock extended");
            Ok(())
        } else {
            Err(LockError::NotOwner {
                key: key.to_string(),
            })
        }
    }

    /// Run `f` while holding `key`.
    ///
    /// The lock is released on every exit path: normal return, an error
    /// carried in `T`, a panic (re-raised after release) and cancellation
    /// of the returned future (release is spawned from the lease's `Drop`).
    /// A failed release is logged and never replaces `f`'s result.
    pub async fn with_lock<F, Fut, T>(&self, key: &str, f: F) -> Result<T, LockError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        let lease = self.acquire(key).await?;
        let outcome = AssertUnwindSafe(f()).catch_unwind().await;

        if let Err(e) = lease.release().await {
            warn!(key, error = %e, "Lock release failed; lease will expire by TTL");
        }

        match outcome {
            Ok(value) => Ok(value),
            Err(panic) => std::panic::resume_unwind(panic),
        }
    }

    /// Release in the background, for paths that cannot await.
    pub(crate) fn spawn_release(&self, key: String, token: String) {
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            warn!(key = %key, "No runtime to release lock; lease will expire by TTL");
            return;
        };
        let lock = self.clone();
        handle.spawn(async move {
            match lock.release(&key, &token).await {
                Ok(()) | Err(LockError::NotOwner { .. }) => {}
                Err(e) => warn!(key = %key, error = %e, "Background lock release failed"),
            }
        });
    }

    fn timed_out(&self, key: &str, attempts: u32) -> LockError {
        debug!(key, attempts, "Lock acquisition timed out");
        LockError::Timeout {
            key: key.to_string(),
            attempts,
        }
    }
}

/// Random token identifying one acquisition attempt.
fn new_token() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

    use async_trait::async_trait;
    use coursehub_cache::memory::MemoryCoordinationStore;
    use coursehub_core::result::AppResult;

    use super::*;

    fn options(ttl_ms: u64) -> LockOptions {
        LockOptions {
            ttl: Duration::from_millis(ttl_ms),
            retry_interval: Duration::from_millis(1),
            max_retries: 0,
            acquire_timeout: Duration::from_secs(5),
            release_timeout: Duration::from_secs(1),
        }
    }

    fn lock_with_store(ttl_ms: u64) -> (DistributedLock, Arc<MemoryCoordinationStore>) {
        let store = Arc::new(MemoryCoordinationStore::new());
        let lock = DistributedLock::new(store.clone(), options(ttl_ms));
        (lock, store)
    }

    #[tokio::test]
    async fn test_release_is_idempotent() {
        let (lock, _) = lock_with_store(10_000);
        let lease = lock.acquire("lock:course:a").await.unwrap();
        let token = lease.token().to_string();
        lease.release().await.unwrap();

        let second = lock.release("lock:course:a", &token).await;
        assert!(matches!(second, Err(LockError::NotOwner { .. })));
    }

    #[tokio::test]
    async fn test_try_acquire_reports_held() {
        let (lock, _) = lock_with_store(10_000);
        let held = lock.try_acquire("k").await.unwrap().unwrap();
        assert!(lock.try_acquire("k").await.unwrap().is_none());
        held.release().await.unwrap();
        assert!(lock.try_acquire("k").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_acquire_times_out_after_retries() {
        let store = Arc::new(MemoryCoordinationStore::new());
        let lock = DistributedLock::new(
            store.clone(),
            LockOptions {
                max_retries: 3,
                ..options(10_000)
            },
        );
        let _held = lock.acquire("k").await.unwrap();

        match lock.acquire("k").await {
            Err(LockError::Timeout { attempts, .. }) => assert_eq!(attempts, 4),
            other => panic!("expected timeout, got {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_acquire_times_out_at_deadline() {
        let store = Arc::new(MemoryCoordinationStore::new());
        let lock = DistributedLock::new(
            store.clone(),
            LockOptions {
                retry_interval: Duration::from_millis(100),
                acquire_timeout: Duration::from_millis(350),
                ..options(10_000)
            },
        );
        let _held = lock.acquire("k").await.unwrap();

        let started = Instant::now();
        let result = lock.acquire("k").await;
        assert!(matches!(result, Err(LockError::Timeout { .. })));
        assert_eq!(started.elapsed(), Duration::from_millis(350));
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_holder_is_not_owner_after_expiry() {
        let (lock, store) = lock_with_store(100);
        let stale = lock.acquire("k").await.unwrap();

        time::advance(Duration::from_millis(150)).await;
        let fresh = lock.acquire("k").await.unwrap();

        let extended = lock.extend("k", stale.token(), Duration::from_secs(1)).await;
        assert!(matches!(extended, Err(LockError::NotOwner { .. })));
        assert!(matches!(stale.release().await, Err(LockError::NotOwner { .. })));

        assert_eq!(store.get("k").await.unwrap().as_deref(), Some(fresh.token()));
        fresh.release().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_extend_keeps_lease_alive() {
        let (lock, store) = lock_with_store(100);
        let lease = lock.acquire("k").await.unwrap();

        time::advance(Duration::from_millis(80)).await;
        lease.extend(Duration::from_millis(100)).await.unwrap();
        time::advance(Duration::from_millis(80)).await;

        assert_eq!(store.get("k").await.unwrap().as_deref(), Some(lease.token()));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_with_lock_is_mutually_exclusive() {
        let (lock, _) = lock_with_store(10_000);
        let inside = Arc::new(AtomicBool::new(false));
        let entered = Arc::new(AtomicU32::new(0));

        let mut handles = Vec::new();
        for _ in 0..16 {
            let lock = lock.clone();
            let inside = Arc::clone(&inside);
            let entered = Arc::clone(&entered);
            handles.push(tokio::spawn(async move {
                lock.with_lock("lock:course:hot", || async {
                    assert!(!inside.swap(true, Ordering::SeqCst), "critical sections overlapped");
                    tokio::time::sleep(Duration::from_millis(2)).await;
                    entered.fetch_add(1, Ordering::SeqCst);
                    inside.store(false, Ordering::SeqCst);
                })
                .await
                .unwrap();
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }
        assert_eq!(entered.load(Ordering::SeqCst), 16);
    }

    #[tokio::test]
    async fn test_with_lock_releases_on_business_error() {
        let (lock, store) = lock_with_store(10_000);
        let result: Result<Result<(), &str>, LockError> =
            lock.with_lock("k", || async { Err("course full") }).await;

        assert_eq!(result.unwrap(), Err("course full"));
        assert_eq!(store.get("k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_with_lock_releases_on_panic() {
        let (lock, store) = lock_with_store(10_000);
        let task_lock = lock.clone();
        let joined = tokio::spawn(async move {
            task_lock
                .with_lock("k", || async {
                    let fail = true;
                    if fail {
                        panic!("boom");
                    }
                })
                .await
        })
        .await;

        assert!(joined.unwrap_err().is_panic());
        assert_eq!(store.get("k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_with_lock_releases_on_cancellation() {
        let (lock, store) = lock_with_store(10_000);
        let cancelled = time::timeout(
            Duration::from_millis(20),
            lock.with_lock("k", || std::future::pending::<()>()),
        )
        .await;
        assert!(cancelled.is_err());

        for _ in 0..50 {
            if store.get("k").await.unwrap().is_none() {
                return;
            }
            time::sleep(Duration::from_millis(5)).await;
        }
        panic!("lock was not released after cancellation");
    }

    /// Memory store whose compare-and-delete stalls before running.
    #[derive(Debug)]
    struct SlowDeleteStore {
        inner: MemoryCoordinationStore,
        delay: Duration,
    }

    #[async_trait]
    impl CoordinationStore for SlowDeleteStore {
        async fn set_if_absent(&self, key: &str, value: &str, ttl: Duration) -> AppResult<bool> {
            self.inner.set_if_absent(key, value, ttl).await
        }

        async fn compare_and_delete(&self, key: &str, expected: &str) -> AppResult<bool> {
            time::sleep(self.delay).await;
            self.inner.compare_and_delete(key, expected).await
        }

        async fn compare_and_expire(
            &self,
            key: &str,
            expected: &str,
            ttl: Duration,
        ) -> AppResult<bool> {
            self.inner.compare_and_expire(key, expected, ttl).await
        }

        async fn get(&self, key: &str) -> AppResult<Option<String>> {
            self.inner.get(key).await
        }

        async fn health_check(&self) -> AppResult<bool> {
            self.inner.health_check().await
        }
    }

    #[tokio::test]
    async fn test_with_lock_releases_when_cancelled_during_release() {
        let store = Arc::new(SlowDeleteStore {
            inner: MemoryCoordinationStore::new(),
            delay: Duration::from_millis(50),
        });
        let lock = DistributedLock::new(store.clone(), options(10_000));

        let cancelled = time::timeout(
            Duration::from_millis(20),
            lock.with_lock("k", || async {}),
        )
        .await;
        assert!(cancelled.is_err());
        assert!(store.get("k").await.unwrap().is_some());

        for _ in 0..60 {
            if store.get("k").await.unwrap().is_none() {
                return;
            }
            time::sleep(Duration::from_millis(5)).await;
        }
        panic!("lock still held after cancellation during release");
    }

    #[tokio::test]
    async fn test_lease_release_marks_released_only_after_store_call() {
        let store = Arc::new(SlowDeleteStore {
            inner: MemoryCoordinationStore::new(),
            delay: Duration::from_millis(50),
        });
        let lock = DistributedLock::new(store.clone(), options(10_000));
        let lease = lock.acquire("k").await.unwrap();

        let cancelled = time::timeout(Duration::from_millis(10), lease.release()).await;
        assert!(cancelled.is_err());

        time::sleep(Duration::from_millis(150)).await;
        assert_eq!(store.get("k").await.unwrap(), None);
    }
}
