//! Course lock lease configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Lease and retry settings for the distributed course lock.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LockConfig {
    /// Lease time-to-live in milliseconds.
    #[serde(default = "default_ttl")]
    pub ttl_ms: u64,
    /// Wait between acquisition attempts in milliseconds.
    #[serde(default = "default_retry_interval")]
    pub retry_interval_ms: u64,
    /// Maximum acquisition attempts (`0` = bounded by the deadline only).
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Overall acquisition deadline in milliseconds.
    #[serde(default = "default_acquire_timeout")]
    pub acquire_timeout_ms: u64,
    /// Upper bound on a single release attempt in milliseconds.
    #[serde(default = "default_release_timeout")]
    pub release_timeout_ms: u64,
}

impl Default for LockConfig {
    fn default() -> Self {
        Self {
            ttl_ms: default_ttl(),
            retry_interval_ms: default_retry_interval(),
            max_retries: default_max_retries(),
            acquire_timeout_ms: default_acquire_timeout(),
            release_timeout_ms: default_release_timeout(),
        }
    }
}

impl LockConfig {
    /// Lease TTL.
    pub fn ttl(&self) -> Duration {
        Duration::from_millis(self.ttl_ms)
    }

    /// Wait between attempts.
    pub fn retry_interval(&self) -> Duration {
        Duration::from_millis(self.retry_interval_ms)
    }

    /// Acquisition deadline measured from the first attempt.
    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_millis(self.acquire_timeout_ms)
    }

    /// Release bound.
    pub fn release_timeout(&self) -> Duration {
        Duration::from_millis(self.release_timeout_ms)
    }
}

fn default_ttl() -> u64 {
    10_000
}

fn default_retry_interval() -> u64 {
    100
}

fn default_max_retries() -> u32 {
    20
}

fn default_acquire_timeout() -> u64 {
    15_000
}

fn default_release_timeout() -> u64 {
    3_000
}
