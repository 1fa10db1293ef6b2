//! Time sources for admission control.
//!
//! Buckets measure refill on a monotonic axis (`now()`, a duration since an
//! arbitrary origin). The reset header needs wall-clock unix seconds.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

pub trait Clock: Send + Sync {
    /// Monotonic time since the clock's origin.
    fn now(&self) -> Duration;

    /// Wall-clock unix timestamp in seconds.
    fn unix_secs(&self) -> u64;
}

/// Production clock backed by `Instant` and `SystemTime`.
#[derive(Debug)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }

    fn unix_secs(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs()
    }
}

/// Hand-driven clock. Only moves when [`ManualClock::advance`] is called.
#[derive(Debug)]
pub struct ManualClock {
    elapsed_nanos: AtomicU64,
    unix_origin: u64,
}

impl ManualClock {
    /// `unix_origin` is the wall-clock second reported before any advance.
    pub fn new(unix_origin: u64) -> Self {
        Self {
            elapsed_nanos: AtomicU64::new(0),
            unix_origin,
        }
    }

    pub fn advance(&self, by: Duration) {
        let nanos = u64::try_from(by.as_nanos()).unwrap_or(u64::MAX);
        self.elapsed_nanos.fetch_add(nanos, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        Duration::from_nanos(self.elapsed_nanos.load(Ordering::SeqCst))
    }

    fn unix_secs(&self) -> u64 {
        self.unix_origin + self.now().as_secs()
    }
}
