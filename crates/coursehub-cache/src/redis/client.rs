//! Redis connection management.

use redis::Client;
use redis::aio::ConnectionManager;
use tracing::info;

use coursehub_core::config::RedisCoordinationConfig;
use coursehub_core::error::{AppError, ErrorKind};
use coursehub_core::result::AppResult;

/// Redis client wrapper with connection management.
#[derive(Debug, Clone)]
pub struct RedisClient {
    /// Redis connection manager (multiplexed, reconnecting).
    conn: ConnectionManager,
    /// Key prefix for all keys.
    key_prefix: String,
}

impl RedisClient {
    /// Create a new Redis client from configuration.
    pub async fn connect(config: &RedisCoordinationConfig) -> AppResult<Self> {
        info!(url = %mask_redis_url(&config.url), "Connecting to Redis");

        let client = Client::open(config.url.as_str()).map_err(|e| {
            AppError::with_source(ErrorKind::Cache, "Failed to create Redis client", e)
        })?;

        let conn = ConnectionManager::new(client).await.map_err(|e| {
            AppError::with_source(ErrorKind::Cache, "Failed to connect to Redis", e)
        })?;

        info!("Successfully connected to Redis");
        Ok(Self {
            conn,
            key_prefix: config.key_prefix.clone(),
        })
    }

    /// Get a mutable clone of the connection manager.
    pub fn conn_mut(&self) -> ConnectionManager {
        self.conn.clone()
    }

    /// Build a full key with the configured prefix.
    pub fn prefixed_key(&self, key: &str) -> String {
        format!("{}{key}", self.key_prefix)
    }
}

/// Mask password in Redis URL for safe logging.
fn mask_redis_url(url: &str) -> String {
    let Some(at_pos) = url.find('@') else {
        return url.to_string();
    };
    let scheme_end = url.find("://").map(|p| p + 3).unwrap_or(0);
    match url[..at_pos].rfind(':') {
        Some(colon_pos) if colon_pos > scheme_end => {
            format!("{}:****@{}", &url[..colon_pos], &url[at_pos + 1..])
        }
        _ => url.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_redis_url() {
        assert_eq!(
            mask_redis_url("redis://:hunter2@cache:6379/0"),
            "redis://:****@cache:6379/0"
        );
        assert_eq!(
            mask_redis_url("redis://localhost:6379"),
            "redis://localhost:6379"
        );
    }
}
