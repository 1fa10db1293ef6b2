//! Token bucket holding one tenant's admission budget.

use std::time::Duration;

/// Fractional token bucket.
///
/// Tokens accrue continuously at `refill_per_sec`, clamped to `capacity`.
/// All timestamps are on the owning [`Clock`](super::Clock)'s monotonic axis.
#[derive(Debug, Clone)]
pub struct TokenBucket {
    capacity: f64,
    refill_per_sec: f64,
    tokens: f64,
    last_refill: Duration,
    last_seen: Duration,
}

impl TokenBucket {
    /// A new bucket starts full.
    pub fn new(capacity: u32, refill_per_sec: f64, now: Duration) -> Self {
        let capacity = f64::from(capacity.max(1));
        Self {
            capacity,
            refill_per_sec,
            tokens: capacity,
            last_refill: now,
            last_seen: now,
        }
    }

    /// Credit tokens for the time elapsed since the last refill.
    pub fn refill(&mut self, now: Duration) {
        let elapsed = now.saturating_sub(self.last_refill).as_secs_f64();
        self.tokens = (self.tokens + elapsed * self.refill_per_sec).min(self.capacity);
        self.last_refill = self.last_refill.max(now);
    }

    /// Refill, then take one token if available.
    ///
    /// Returns the remaining whole tokens on success.
    pub fn try_take(&mut self, now: Duration) -> Option<u64> {
        self.refill(now);
        self.last_seen = self.last_seen.max(now);

        if self.tokens < 1.0 {
            return None;
        }
        self.tokens -= 1.0;
        Some(self.tokens.floor() as u64)
    }

    /// Token count as of `now`, without mutating the bucket.
    pub fn peek(&self, now: Duration) -> f64 {
        let elapsed = now.saturating_sub(self.last_refill).as_secs_f64();
        (self.tokens + elapsed * self.refill_per_sec).min(self.capacity)
    }

    /// Token count as of the last refill.
    pub fn tokens(&self) -> f64 {
        self.tokens
    }

    pub fn capacity(&self) -> f64 {
        self.capacity
    }

    /// How long the bucket has gone without an admission check.
    pub fn idle_for(&self, now: Duration) -> Duration {
        now.saturating_sub(self.last_seen)
    }
}
