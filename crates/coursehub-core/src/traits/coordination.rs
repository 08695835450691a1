//! Coordination store trait for lock records.

use std::time::Duration;

use async_trait::async_trait;

use crate::result::AppResult;

/// Key-value store offering the atomic conditional primitives needed for
/// distributed mutual exclusion.
///
/// Every method must execute as a single indivisible operation on the
/// backend (a Lua script on Redis, a per-key entry lock in memory). A
/// read-then-write sequence on the client side is never acceptable here:
/// an expiry landing between the read and the write would let one holder
/// delete or extend a lock that now belongs to somebody else.
#[async_trait]
pub trait CoordinationStore: Send + Sync + std::fmt::Debug + 'static {
    /// Store `value` under `key` with expiry `ttl` only if the key is absent
    /// (or expired). Returns `true` if the value was written.
    async fn set_if_absent(&self, key: &str, value: &str, ttl: Duration) -> AppResult<bool>;

    /// Delete `key` only if its current value equals `expected`.
    /// Returns `true` if the key was deleted.
    async fn compare_and_delete(&self, key: &str, expected: &str) -> AppResult<bool>;

    /// Reset the expiry of `key` to `ttl` only if its current value equals
    /// `expected`. Returns `true` if the expiry was updated.
    async fn compare_and_expire(&self, key: &str, expected: &str, ttl: Duration)
    -> AppResult<bool>;

    /// Read the current value of a key, if present and not expired.
    async fn get(&self, key: &str) -> AppResult<Option<String>>;

    /// Check that the backend is reachable.
    async fn health_check(&self) -> AppResult<bool>;
}
