//! Request Throttling
//!
//! Token-bucket limiter keyed by caller. Transport glue (header extraction,
//! 429 responses) lives in the API crate; this module only answers whether a
//! keyed request may proceed and when a denied caller should retry.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::RwLock;
use tracing::debug;

/// Throttle configuration
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    /// Sustained allowance per window
    pub max_requests: u32,
    /// Refill window
    pub window: Duration,
    /// Bucket size, the largest burst a cold caller can spend at once
    pub burst_capacity: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: 30,
            window: Duration::from_secs(60),
            burst_capacity: 30,
        }
    }
}

/// Outcome of one throttle check
#[derive(Debug, Clone, Copy)]
pub struct RateDecision {
    /// Whether the request may proceed
    pub allowed: bool,
    /// Whole tokens left in the caller's bucket
    pub remaining: u32,
    /// How long a denied caller should wait before retrying
    pub retry_after: Duration,
    /// Configured sustained allowance, echoed into response headers
    pub limit: u32,
}

/// Token bucket for one caller
#[derive(Debug)]
struct TokenBucket {
    tokens: f64,
    last_refill: Instant,
    capacity: f64,
    refill_rate: f64,
}

impl TokenBucket {
    fn new(capacity: u32, refill_rate: f64) -> Self {
        Self {
            tokens: capacity as f64,
            last_refill: Instant::now(),
            capacity: capacity as f64,
            refill_rate,
        }
    }

    /// Credit tokens for the time elapsed since the last call, capped at
    /// the bucket capacity.
    fn refill(&mut self) {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_refill).as_secs_f64();
        self.tokens = (self.tokens + elapsed * self.refill_rate).min(self.capacity);
        self.last_refill = now;
    }

    fn try_consume(&mut self) -> bool {
        self.refill();
        if self.tokens >= 1.0 {
            self.tokens -= 1.0;
            true
        } else {
            false
        }
    }

    /// Time until the bucket holds a whole token again
    fn retry_after(&self) -> Duration {
        if self.tokens >= 1.0 {
            Duration::ZERO
        } else {
            Duration::from_secs_f64((1.0 - self.tokens) / self.refill_rate)
        }
    }
}

/// Keyed token-bucket limiter, cheap to clone and share
#[derive(Clone)]
pub struct RateLimiter {
    config: Arc<RateLimitConfig>,
    buckets: Arc<RwLock<HashMap<String, TokenBucket>>>,
}

impl RateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config: Arc::new(config),
            buckets: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub fn config(&self) -> &RateLimitConfig {
        &self.config
    }

    /// Spend one token from the caller's bucket, creating it full on first
    /// sight.
    pub async fn check(&self, key: &str) -> RateDecision {
        let mut buckets = self.buckets.write().await;
        let refill_rate = self.config.max_requests as f64 / self.config.window.as_secs_f64();
        let bucket = buckets
            .entry(key.to_string())
            .or_insert_with(|| TokenBucket::new(self.config.burst_capacity, refill_rate));

        let allowed = bucket.try_consume();
        RateDecision {
            allowed,
            remaining: bucket.tokens as u32,
            retry_after: bucket.retry_after(),
            limit: self.config.max_requests,
        }
    }

    /// Drop buckets idle for more than two windows.
    pub async fn cleanup(&self) {
        let mut buckets = self.buckets.write().await;
        let before = buckets.len();
        let expiry = Instant::now() - self.config.window * 2;
        buckets.retain(|_, bucket| bucket.last_refill > expiry);
        let dropped = before - buckets.len();
        if dropped > 0 {
            debug!(dropped, tracked = buckets.len(), "Pruned idle rate buckets");
        }
    }
}

/// Spawn a background task that prunes idle buckets on an interval.
pub fn start_cleanup_task(limiter: RateLimiter, interval: Duration) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        loop {
            ticker.tick().await;
            limiter.cleanup().await;
        }
    });
}
