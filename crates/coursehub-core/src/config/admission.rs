//! Request admission (token bucket) configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Token bucket settings for the admission limiter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdmissionConfig {
    /// Bucket capacity (maximum burst). The bucket starts full.
    #[serde(default = "default_capacity")]
    pub capacity: u32,
    /// Tokens added per second by the refill task. `0` disables refill.
    #[serde(default = "default_refill_per_second")]
    pub refill_per_second: u32,
    /// Minimum period between refill ticks in milliseconds.
    #[serde(default = "default_refill_tick")]
    pub refill_tick_ms: u64,
}

impl Default for AdmissionConfig {
    fn default() -> Self {
        Self {
            capacity: default_capacity(),
            refill_per_second: default_refill_per_second(),
            refill_tick_ms: default_refill_tick(),
        }
    }
}

impl AdmissionConfig {
    /// Minimum refill tick as a [`Duration`].
    pub fn refill_tick(&self) -> Duration {
        Duration::from_millis(self.refill_tick_ms.max(1))
    }
}

fn default_capacity() -> u32 {
    200
}

fn default_refill_per_second() -> u32 {
    100
}

fn default_refill_tick() -> u64 {
    10
}
