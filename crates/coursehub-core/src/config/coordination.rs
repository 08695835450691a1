//! Coordination store configuration.
//!
//! The coordination store holds transient lock records only; it is never
//! the system of record.

use serde::{Deserialize, Serialize};

/// Top-level coordination store configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoordinationConfig {
    /// Backend type: `"memory"` (single node) or `"redis"` (multi node).
    #[serde(default = "default_provider")]
    pub provider: String,
    /// Redis-specific settings.
    #[serde(default)]
    pub redis: RedisCoordinationConfig,
}

impl Default for CoordinationConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            redis: RedisCoordinationConfig::default(),
        }
    }
}

/// Redis backend configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedisCoordinationConfig {
    /// Redis connection URL.
    #[serde(default = "default_redis_url")]
    pub url: String,
    /// Key prefix for all CourseHub keys.
    #[serde(default = "default_key_prefix")]
    pub key_prefix: String,
}

impl Default for RedisCoordinationConfig {
    fn default() -> Self {
        Self {
            url: default_redis_url(),
            key_prefix: default_key_prefix(),
        }
    }
}

fn default_provider() -> String {
    "memory".to_string()
}

fn default_redis_url() -> String {
    "redis://localhost:6379".to_string()
}

fn default_key_prefix() -> String {
    "coursehub:".to_string()
}
