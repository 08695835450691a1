//! Redis coordination store implementation.

use std::time::Duration;

use async_trait::async_trait;
use redis::AsyncCommands;
use tracing::debug;

use coursehub_core::error::{AppError, ErrorKind};
use coursehub_core::result::AppResult;
use coursehub_core::traits::CoordinationStore;

use super::client::RedisClient;

/// Delete KEYS[1] only if it still holds ARGV[1].
const COMPARE_AND_DELETE_SCRIPT: &str = r#"
if redis.call('GET', KEYS[1]) == ARGV[1] then
    return redis.call('DEL', KEYS[1])
end
return 0
"#;

/// Reset the expiry of KEYS[1] to ARGV[2] ms only if it still holds ARGV[1].
const COMPARE_AND_EXPIRE_SCRIPT: &str = r#"
if redis.call('GET', KEYS[1]) == ARGV[1] then
    return redis.call('PEXPIRE', KEYS[1], ARGV[2])
end
return 0
"#;

/// Redis-backed coordination store.
#[derive(Debug, Clone)]
pub struct RedisCoordinationStore {
    /// Redis client.
    client: RedisClient,
}

impl RedisCoordinationStore {
    /// Create a new Redis coordination store.
    pub fn new(client: RedisClient) -> Self {
        Self { client }
    }

    /// Map a Redis error to an AppError.
    fn map_err(e: redis::RedisError) -> AppError {
        AppError::with_source(ErrorKind::Cache, format!("Redis error: {e}"), e)
    }
}

/// Millisecond expiry for Redis, never zero (PX 0 is rejected).
fn ttl_millis(ttl: Duration) -> u64 {
    u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX).max(1)
}

#[async_trait]
impl CoordinationStore for RedisCoordinationStore {
    async fn set_if_absent(&self, key: &str, value: &str, ttl: Duration) -> AppResult<bool> {
        let full_key = self.client.prefixed_key(key);
        let mut conn = self.client.conn_mut();

        // SET key value PX ttl NX
        let result: Option<String> = redis::cmd("SET")
            .arg(&full_key)
            .arg(value)
            .arg("PX")
            .arg(ttl_millis(ttl))
            .arg("NX")
            .query_async(&mut conn)
            .await
            .map_err(Self::map_err)?;

        Ok(result.is_some())
    }

    async fn compare_and_delete(&self, key: &str, expected: &str) -> AppResult<bool> {
        let full_key = self.client.prefixed_key(key);
        let mut conn = self.client.conn_mut();

        let removed: i64 = redis::Script::new(COMPARE_AND_DELETE_SCRIPT)
            .key(&full_key)
            .arg(expected)
            .invoke_async(&mut conn)
            .await
            .map_err(Self::map_err)?;

        debug!(key = %full_key, removed, "compare_and_delete");
        Ok(removed == 1)
    }

    async fn compare_and_expire(
        &self,
        key: &str,
        expected: &str,
        ttl: Duration,
    ) -> AppResult<bool> {
        let full_key = self.client.prefixed_key(key);
        let mut conn = self.client.conn_mut();

        let updated: i64 = redis::Script::new(COMPARE_AND_EXPIRE_SCRIPT)
            .key(&full_key)
            .arg(expected)
            .arg(ttl_millis(ttl))
            .invoke_async(&mut conn)
            .await
            .map_err(Self::map_err)?;

        debug!(key = %full_key, updated, "compare_and_expire");
        Ok(updated == 1)
    }

    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        let full_key = self.client.prefixed_key(key);
        let mut conn = self.client.conn_mut();
        let result: Option<String> = conn.get(&full_key).await.map_err(Self::map_err)?;
        Ok(result)
    }

    async fn health_check(&self) -> AppResult<bool> {
        let mut conn = self.client.conn_mut();
        let pong: String = redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .map_err(Self::map_err)?;
        Ok(pong == "PONG")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ttl_millis_never_zero() {
        assert_eq!(ttl_millis(Duration::ZERO), 1);
        assert_eq!(ttl_millis(Duration::from_secs(10)), 10_000);
    }
}
