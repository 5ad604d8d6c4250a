//! Time sources for the limiters
//!
//! Readings are monotonic nanosecond counts relative to an arbitrary origin.
//! Only differences between readings carry meaning.

mod convert;

pub use convert::{nanos_to_seconds, seconds_to_nanos};

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Source of monotonic "now" readings in nanoseconds
pub trait Clock: Send + Sync {
    /// Current reading in nanoseconds
    fn now(&self) -> u64;

    /// Nanoseconds elapsed since an earlier reading of this clock
    fn elapsed_since(&self, earlier: u64) -> u64 {
        self.now().saturating_sub(earlier)
    }
}

/// Clock backed by [`Instant`]
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now(&self) -> u64 {
        duration_to_nanos(self.origin.elapsed())
    }
}

/// Clock that only moves when told to
///
/// Clones share the same reading, so a test can keep one handle and hand
/// another to a limiter.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    nanos: Arc<AtomicU64>,
}

impl ManualClock {
    /// Create a clock reading `start` nanoseconds
    pub fn new(start: u64) -> Self {
        Self {
            nanos: Arc::new(AtomicU64::new(start)),
        }
    }

    /// Move the clock forward
    pub fn advance(&self, by: Duration) {
        let by = duration_to_nanos(by);
        // saturates, never wraps
        let _ = self
            .nanos
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |nanos| {
                Some(nanos.saturating_add(by))
            });
    }

    /// Jump to an absolute reading
    pub fn set(&self, nanos: u64) {
        self.nanos.store(nanos, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> u64 {
        self.nanos.load(Ordering::SeqCst)
    }
}

/// Saturating conversion of a [`Duration`] to whole nanoseconds
pub fn duration_to_nanos(duration: Duration) -> u64 {
    u64::try_from(duration.as_nanos()).unwrap_or(u64::MAX)
}
