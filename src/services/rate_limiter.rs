// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Per-client token bucket rate limiter.
//!
//! Each client address owns a bucket holding at most `burst` tokens that
//! refills continuously at `rps` tokens per second. An admitted request
//! spends one token; a request arriving with less than one token in the
//! bucket is rejected immediately, never queued.
//!
//! Buckets live in a [`DashMap`]. Admission holds the shard lock for the
//! client's key for the whole refill-and-spend step, so concurrent requests
//! from one address serialize and cannot both spend the last token, while
//! other addresses proceed on other shards. A background sweep evicts
//! buckets that have been idle longer than the retention window.

use crate::config::LimiterConfig;
use dashmap::DashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::Instant;

#[derive(Debug, Clone, Copy)]
struct ClientBucket {
    tokens: f64,
    last_refill: Instant,
    last_seen: Instant,
}

impl ClientBucket {
    fn full(capacity: f64, now: Instant) -> Self {
        Self {
            tokens: capacity,
            last_refill: now,
            last_seen: now,
        }
    }

    fn refill(&mut self, now: Instant, rate: f64, capacity: f64) {
        let elapsed = now.saturating_duration_since(self.last_refill);
        self.tokens = (self.tokens + elapsed.as_secs_f64() * rate).min(capacity);
        self.last_refill = now;
    }
}

/// Handle to the running sweep task.
struct Sweeper {
    shutdown: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

/// Token bucket rate limiter keyed by client address.
pub struct RateLimiter {
    rate: f64,
    capacity: f64,
    enabled: bool,
    cleanup_interval: Duration,
    retention: Duration,
    buckets: DashMap<String, ClientBucket>,
    sweeper: Mutex<Option<Sweeper>>,
}

impl RateLimiter {
    pub fn new(config: &LimiterConfig) -> Self {
        Self {
            rate: config.rps,
            capacity: f64::from(config.burst),
            enabled: config.enabled,
            cleanup_interval: config.cleanup_interval,
            retention: config.retention(),
            buckets: DashMap::new(),
            sweeper: Mutex::new(None),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Admit or reject one request from `client`.
    pub fn admit(&self, client: &str) -> bool {
        if !self.enabled {
            return true;
        }
        self.admit_at(client, Instant::now())
    }

    /// [`RateLimiter::admit`] evaluated at an explicit instant.
    pub fn admit_at(&self, client: &str, now: Instant) -> bool {
        let mut bucket = match self.buckets.get_mut(client) {
            Some(bucket) => bucket,
            None => self
                .buckets
                .entry(client.to_string())
                .or_insert_with(|| ClientBucket::full(self.capacity, now)),
        };

        bucket.refill(now, self.rate, self.capacity);
        bucket.last_seen = bucket.last_seen.max(now);

        if bucket.tokens >= 1.0 {
            bucket.tokens -= 1.0;
            true
        } else {
            false
        }
    }

    /// Number of tracked client buckets.
    pub fn tracked_clients(&self) -> usize {
        self.buckets.len()
    }

    /// Evict buckets idle for longer than the retention window.
    pub fn sweep(&self) -> usize {
        self.sweep_at(Instant::now())
    }

    /// [`RateLimiter::sweep`] evaluated at an explicit instant.
    pub fn sweep_at(&self, now: Instant) -> usize {
        let before = self.buckets.len();
        self.buckets
            .retain(|_, bucket| now.saturating_duration_since(bucket.last_seen) <= self.retention);
        before.saturating_sub(self.buckets.len())
    }

    /// Start the background sweep. Does nothing if disabled or already running.
    pub fn start(self: &Arc<Self>) {
        if !self.enabled {
            return;
        }
        let mut sweeper = self.sweeper.lock().unwrap_or_else(|e| e.into_inner());
        if sweeper.is_some() {
            return;
        }

        let (shutdown, mut shutdown_rx) = watch::channel(false);
        let limiter = Arc::clone(self);
        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(limiter.cleanup_interval);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            interval.tick().await;
            loop {
                tokio::select! {
                    _ = interval.tick() => {
                        let evicted = limiter.sweep();
                        if evicted > 0 {
                            tracing::debug!(
                                evicted,
                                remaining = limiter.tracked_clients(),
                                "Swept idle rate limit buckets"
                            );
                        }
                    }
                    _ = shutdown_rx.changed() => break,
                }
            }
        });

        tracing::info!(
            interval_secs = self.cleanup_interval.as_secs(),
            retention_secs = self.retention.as_secs(),
            "Rate limiter sweep started"
        );
        *sweeper = Some(Sweeper { shutdown, handle });
    }

    /// Stop the background sweep and wait for it to finish.
    pub async fn stop(&self) {
        let sweeper = self
            .sweeper
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take();
        if let Some(sweeper) = sweeper {
            let _ = sweeper.shutdown.send(true);
            if let Err(err) = sweeper.handle.await {
                tracing::warn!(error = %err, "Rate limiter sweep task failed");
            }
            tracing::info!("Rate limiter sweep stopped");
        }
    }

    pub fn is_running(&self) -> bool {
        self.sweeper
            .lock()
            .map(|s| s.is_some())
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limiter(rps: f64, burst: u32) -> RateLimiter {
        RateLimiter::new(&LimiterConfig {
            rps,
            burst,
            enabled: true,
            cleanup_interval: Duration::from_secs(60),
        })
    }

    #[test]
    fn test_burst_then_reject() {
        let limiter = limiter(2.0, 4);
        let now = Instant::now();
        for _ in 0..4 {
            assert!(limiter.admit_at("10.0.0.1", now));
        }
        assert!(!limiter.admit_at("10.0.0.1", now));
        // Other clients have their own bucket.
        assert!(limiter.admit_at("10.0.0.2", now));
    }

    #[test]
    fn test_refill_over_time() {
        let limiter = limiter(2.0, 4);
        let start = Instant::now();
        for _ in 0..4 {
            assert!(limiter.admit_at("c", start));
        }
        assert!(!limiter.admit_at("c", start + Duration::from_millis(400)));
        // 0.5s at 2 rps refills one token.
        assert!(limiter.admit_at("c", start + Duration::from_millis(500)));
        assert!(!limiter.admit_at("c", start + Duration::from_millis(500)));
        // A long pause refills only up to the burst size.
        let later = start + Duration::from_secs(60);
        for _ in 0..4 {
            assert!(limiter.admit_at("c", later));
        }
        assert!(!limiter.admit_at("c", later));
    }

    #[test]
    fn test_admissions_bounded_in_every_window() {
        let (rps, burst) = (3.0, 5);
        let limiter = limiter(rps, burst);
        let start = Instant::now();

        // Hammer every 10ms for 5 seconds.
        let mut admitted = Vec::new();
        for step in 0..500u64 {
            let at = start + Duration::from_millis(step * 10);
            if limiter.admit_at("c", at) {
                admitted.push(at);
            }
        }

        for window_ms in [100u64, 500, 1000, 2500] {
            let window = Duration::from_millis(window_ms);
            let bound = f64::from(burst) + rps * window.as_secs_f64();
            for (i, &first) in admitted.iter().enumerate() {
                let in_window = admitted[i..]
                    .iter()
                    .take_while(|&&t| t.duration_since(first) <= window)
                    .count();
                assert!(
                    in_window as f64 <= bound,
                    "{in_window} admissions in {window_ms}ms exceeds {bound}"
                );
            }
        }
    }

    #[test]
    fn test_disabled_always_admits_without_buckets() {
        let limiter = RateLimiter::new(&LimiterConfig {
            rps: 1.0,
            burst: 1,
            enabled: false,
            cleanup_interval: Duration::from_secs(60),
        });
        for _ in 0..100 {
            assert!(limiter.admit("c"));
        }
        assert_eq!(limiter.tracked_clients(), 0);
    }

    #[test]
    fn test_sweep_evicts_only_idle_buckets() {
        let limiter = limiter(2.0, 4);
        let start = Instant::now();
        limiter.admit_at("idle", start);
        limiter.admit_at("busy", start);

        // Keep "busy" active across the retention window.
        for secs in (30..=200).step_by(30) {
            limiter.admit_at("busy", start + Duration::from_secs(secs));
        }

        assert_eq!(limiter.sweep_at(start + Duration::from_secs(120)), 0);
        assert_eq!(limiter.sweep_at(start + Duration::from_secs(200)), 1);
        assert_eq!(limiter.tracked_clients(), 1);
        assert!(limiter.buckets.contains_key("busy"));
    }

    #[test]
    fn test_concurrent_same_client_never_double_spends() {
        let limiter = Arc::new(limiter(0.0001, 10));
        let now = Instant::now();
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let limiter = Arc::clone(&limiter);
                std::thread::spawn(move || (0..50).filter(|_| limiter.admit_at("c", now)).count())
            })
            .collect();
        let admitted: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();
        assert_eq!(admitted, 10);
    }

    #[tokio::test(start_paused = true)]
    async fn test_background_sweep_lifecycle() {
        let limiter = Arc::new(RateLimiter::new(&LimiterConfig {
            rps: 2.0,
            burst: 4,
            enabled: true,
            cleanup_interval: Duration::from_secs(1),
        }));
        limiter.start();
        assert!(limiter.is_running());

        assert!(limiter.admit("c"));
        assert_eq!(limiter.tracked_clients(), 1);

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(limiter.tracked_clients(), 0);

        limiter.stop().await;
        assert!(!limiter.is_running());
    }
}
