//! Coordination manager that dispatches to the configured backend.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::info;

use coursehub_core::config::CoordinationConfig;
use coursehub_core::error::AppError;
use coursehub_core::result::AppResult;
use coursehub_core::traits::CoordinationStore;

/// Coordination manager wrapping the configured store.
///
/// The backend is selected at construction time from configuration.
#[derive(Debug, Clone)]
pub struct CoordinationManager {
    inner: Arc<dyn CoordinationStore>,
}

impl CoordinationManager {
    /// Create a new coordination manager from configuration.
    pub async fn new(config: &CoordinationConfig) -> AppResult<Self> {
        let inner: Arc<dyn CoordinationStore> = match config.provider.as_str() {
            #[cfg(feature = "redis-backend")]
            "redis" => {
                info!("Initializing Redis coordination store");
                let client = crate::redis::RedisClient::connect(&config.redis).await?;
                Arc::new(crate::redis::RedisCoordinationStore::new(client))
            }
            #[cfg(feature = "memory")]
            "memory" => {
                info!("Initializing in-memory coordination store");
                Arc::new(crate::memory::MemoryCoordinationStore::new())
            }
            other => {
                return Err(AppError::configuration(format!(
                    "Unknown coordination provider: '{other}'. Supported: memory, redis"
                )));
            }
        };

        Ok(Self { inner })
    }

    /// Create a manager from an existing store (for testing).
    pub fn from_store(store: Arc<dyn CoordinationStore>) -> Self {
        Self { inner: store }
    }
}

#[async_trait]
impl CoordinationStore for CoordinationManager {
    async fn set_if_absent(&self, key: &str, value: &str, ttl: Duration) -> AppResult<bool> {
        self.inner.set_if_absent(key, value, ttl).await
    }

    async fn compare_and_delete(&self, key: &str, expected: &str) -> AppResult<bool> {
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
