//! In-memory coordination store using dashmap.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tokio::time::Instant;

use coursehub_core::result::AppResult;
use coursehub_core::traits::CoordinationStore;

#[derive(Debug, Clone)]
struct Record {
    value: String,
    expires_at: Instant,
}

impl Record {
    fn new(value: &str, ttl: Duration) -> Self {
        Self {
            value: value.to_string(),
            expires_at: Instant::now() + ttl,
        }
    }

    fn is_live(&self, now: Instant) -> bool {
        now < self.expires_at
    }

    fn is_held_by(&self, expected: &str, now: Instant) -> bool {
        self.is_live(now) && self.value == expected
    }
}

/// Single-node coordination store.
///
/// Every operation runs under the shard lock dashmap holds for the key, so
/// each conditional update is atomic with respect to every other. Expiry
/// uses the tokio clock, which lets tests drive it with a paused runtime.
#[derive(Debug, Clone, Default)]
pub struct MemoryCoordinationStore {
    entries: Arc<DashMap<String, Record>>,
}

impl MemoryCoordinationStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop every expired record. Returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let before = self.entries.len();
        self.entries.retain(|_, record| record.is_live(now));
        before.saturating_sub(self.entries.len())
    }
}

#[async_trait]
impl CoordinationStore for MemoryCoordinationStore {
    async fn set_if_absent(&self, key: &str, value: &str, ttl: Duration) -> AppResult<bool> {
        let now = Instant::now();
        let written = match self.entries.entry(key.to_string()) {
            Entry::Occupied(mut occupied) => {
                if occupied.get().is_live(now) {
                    false
                } else {
                    occupied.insert(Record::new(value, ttl));
                    true
                }
            }
            Entry::Vacant(vacant) => {
                vacant.insert(Record::new(value, ttl));
                true
            }
        };
        Ok(written)
    }

    async fn compare_and_delete(&self, key: &str, expected: &str) -> AppResult<bool> {
        let now = Instant::now();
        Ok(self
            .entries
            .remove_if(key, |_, record| record.is_held_by(expected, now))
            .is_some())
    }

    async fn compare_and_expire(
        &self,
        key: &str,
        expected: &str,
        ttl: Duration,
    ) -> AppResult<bool> {
        let now = Instant::now();
        let Some(mut record) = self.entries.get_mut(key) else {
            return Ok(false);
        };
        if !record.is_held_by(expected, now) {
            return Ok(false);
        }
        record.expires_at = now + ttl;
        Ok(true)
    }

    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        let now = Instant::now();
        Ok(self
            .entries
            .get(key)
            .filter(|record| record.is_live(now))
            .map(|record| record.value.clone()))
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(true)
    }
}
