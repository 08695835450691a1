//! Token bucket admission limiter.
//!
//! The bucket is a single atomic counter. [`AdmissionLimiter::admit`] takes
//! a token with a compare-and-swap and never blocks; a background task adds
//! tokens at the configured rate, never beyond capacity.

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, info};

use coursehub_core::config::AdmissionConfig;

const NANOS_PER_SEC: u128 = 1_000_000_000;

/// Process-wide request admission gate.
#[derive(Debug)]
pub struct AdmissionLimiter {
    /// Tokens currently available.
    tokens: AtomicU32,
    /// Maximum tokens (burst size). The bucket starts full.
    capacity: u32,
    /// Tokens added per second. `0` means the bucket never refills.
    refill_per_second: u32,
    /// Lower bound on the refill period.
    min_tick: Duration,
}

impl AdmissionLimiter {
    /// Create a full bucket from configuration.
    pub fn new(config: &AdmissionConfig) -> Self {
        Self {
            tokens: AtomicU32::new(config.capacity),
            capacity: config.capacity,
            refill_per_second: config.refill_per_second,
            min_tick: config.refill_tick(),
        }
    }

    /// Take one token if available. Never blocks.
    pub fn admit(&self) -> bool {
        self.tokens
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |t| t.checked_sub(1))
            .is_ok()
    }

    /// Tokens currently available.
    pub fn available(&self) -> u32 {
        self.tokens.load(Ordering::Acquire)
    }

    /// Bucket capacity.
    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    /// Add up to `n` tokens, saturating at capacity. Returns the new level.
    fn refill(&self, n: u32) -> u32 {
        let capacity = self.capacity;
        let previous = self
            .tokens
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |t| {
                Some(t.saturating_add(n).min(capacity))
            })
            .unwrap_or(capacity);
        previous.saturating_add(n).min(capacity)
    }

    /// Refill period: one token's worth of time, but no shorter than the
    /// configured minimum tick. `None` when refill is disabled.
    pub fn refill_period(&self) -> Option<Duration> {
        if self.refill_per_second == 0 {
            return None;
        }
        let per_token = Duration::from_secs(1) / self.refill_per_second;
        Some(per_token.max(self.min_tick))
    }

    /// Spawn the refill task. Returns `None` when refill is disabled.
    pub fn spawn_refill(self: &Arc<Self>, shutdown: watch::Receiver<bool>) -> Option<JoinHandle<()>> {
        self.refill_period()?;
        let limiter = Arc::clone(self);
        Some(tokio::spawn(async move { limiter.run_refill(shutdown).await }))
    }

    /// Refill loop. Runs until `shutdown` flips to `true` or its sender is
    /// dropped.
    ///
    /// Tokens owed are computed from elapsed time, so a late tick does not
    /// lose refill. The fractional remainder carries to the next tick.
    pub async fn run_refill(&self, shutdown: watch::Receiver<bool>) {
        let Some(period) = self.refill_period() else {
            return;
        };

        info!(
            capacity = self.capacity,
            refill_per_second = self.refill_per_second,
            period_ms = period.as_millis() as u64,
            "Admission refill started"
        );

        let mut shutdown = shutdown;
        let mut interval = time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let rate = u128::from(self.refill_per_second);
        let mut last = Instant::now();
        let mut carry: u128 = 0;

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    let now = Instant::now();
                    let owed = now.duration_since(last).as_nanos() * rate + carry;
                    last = now;
                    carry = owed % NANOS_PER_SEC;
                    let whole = u32::try_from(owed / NANOS_PER_SEC).unwrap_or(u32::MAX);
                    if whole > 0 {
                        let level = self.refill(whole);
                        debug!(added = whole, level, "Admission tokens refilled");
                    }
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        info!("Admission refill shutting down");
                        break;
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limiter(capacity: u32, refill_per_second: u32) -> Arc<AdmissionLimiter> {
        Arc::new(AdmissionLimiter::new(&AdmissionConfig {
            capacity,
            refill_per_second,
            refill_tick_ms: 10,
        }))
    }

    #[test]
    fn test_burst_without_refill() {
        let limiter = limiter(10, 0);
        let admitted = (0..11).filter(|_| limiter.admit()).count();
        assert_eq!(admitted, 10);
        assert_eq!(limiter.available(), 0);
        assert!(limiter.refill_period().is_none());
    }

    #[test]
    fn test_refill_never_exceeds_capacity() {
        let limiter = limiter(3, 0);
        assert!(limiter.admit());
        assert_eq!(limiter.refill(10), 3);
        assert_eq!(limiter.available(), 3);
    }

    #[test]
    fn test_refill_period_respects_min_tick() {
        assert_eq!(
            limiter(10, 10).refill_period(),
            Some(Duration::from_millis(100))
        );
        assert_eq!(
            limiter(10, 1000).refill_period(),
            Some(Duration::from_millis(10))
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_admission_is_exact() {
        let limiter = limiter(100, 0);
        let mut handles = Vec::new();
        for _ in 0..8 {
            let limiter = Arc::clone(&limiter);
            handles.push(tokio::spawn(async move {
                (0..50).filter(|_| limiter.admit()).count()
            }));
        }
        let mut total = 0;
        for handle in handles {
            total += handle.await.unwrap();
        }
        assert_eq!(total, 100);
    }

    #[tokio::test(start_paused = true)]
    async fn test_refill_task_adds_tokens_at_rate() {
        let limiter = limiter(5, 10);
        while limiter.admit() {}

        let (tx, rx) = watch::channel(false);
        let handle = limiter.spawn_refill(rx).unwrap();

        time::sleep(Duration::from_millis(250)).await;
        assert_eq!(limiter.available(), 2);

        time::sleep(Duration::from_secs(10)).await;
        assert_eq!(limiter.available(), 5);

        tx.send(true).unwrap();
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_refill_task_stops_when_sender_dropped() {
        let limiter = limiter(5, 10);
        let (tx, rx) = watch::channel(false);
        let handle = limiter.spawn_refill(rx).unwrap();
        drop(tx);
        handle.await.unwrap();
    }
}
