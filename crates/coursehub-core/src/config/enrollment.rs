//! Enrollment orchestration configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Retry policy and deadline for enroll/drop requests.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrollmentConfig {
    /// How many times a version conflict re-enters the locked phase.
    #[serde(default = "default_max_conflict_retries")]
    pub max_conflict_retries: u32,
    /// Linear backoff step between conflict retries in milliseconds.
    #[serde(default = "default_retry_backoff")]
    pub retry_backoff_ms: u64,
    /// End-to-end deadline for a single request in milliseconds.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_ms: u64,
}

impl Default for EnrollmentConfig {
    fn default() -> Self {
        Self {
            max_conflict_retries: default_max_conflict_retries(),
            retry_backoff_ms: default_retry_backoff(),
            request_timeout_ms: default_request_timeout(),
        }
    }
}

impl EnrollmentConfig {
    /// Backoff before the given retry (1-based).
    pub fn backoff_for(&self, attempt: u32) -> Duration {
        Duration::from_millis(self.retry_backoff_ms.saturating_mul(u64::from(attempt)))
    }

    /// End-to-end request deadline.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

fn default_max_conflict_retries() -> u32 {
    2
}

fn default_retry_backoff() -> u64 {
    50
}

fn default_request_timeout() -> u64 {
    15_000
}
