//! Elapsed-time pacing
//!
//! The limiter remembers when the last call completed and asks the caller to
//! wait out whatever is left of the interval.

use std::fmt;
use std::time::Duration;

use crate::clock::{duration_to_nanos, Clock, MonotonicClock};

use super::{DelayStats, DelayStrategy};

/// Minimum-interval limiter measured from the end of the previous call
#[derive(Debug, Clone)]
pub struct IntervalLimiter<C = MonotonicClock> {
    clock: C,
    /// Interval in nanoseconds
    limit_interval: u64,
    /// Clock reading of the last completed call, `None` until the first one
    last_called: Option<u64>,
    stats: DelayStats,
}

impl IntervalLimiter {
    /// Create a limiter on the monotonic system clock
    pub fn new(interval: Duration) -> Self {
        Self::with_clock(interval, MonotonicClock::new())
    }

    pub fn from_nanos(interval: u64) -> Self {
        Self::new(Duration::from_nanos(interval))
    }
}

impl<C: Clock> IntervalLimiter<C> {
    pub fn with_clock(interval: Duration, clock: C) -> Self {
        Self {
            clock,
            limit_interval: duration_to_nanos(interval),
            last_called: None,
            stats: DelayStats::default(),
        }
    }

    /// Current minimum interval
    pub fn interval(&self) -> Duration {
        Duration::from_nanos(self.limit_interval)
    }

    /// Clock reading recorded by the last [`mark_called`](Self::mark_called)
    pub fn last_called(&self) -> Option<u64> {
        self.last_called
    }

    pub fn stats(&self) -> DelayStats {
        self.stats
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Set the minimum interval
    ///
    /// Once the interval has reached zero it stays pinned there and further
    /// calls are ignored. Existing callers depend on this, so a limiter that
    /// was driven down to zero has to be rebuilt to limit again.
    pub fn set_interval(&mut self, interval: Duration) {
        self.set_interval_nanos(duration_to_nanos(interval));
    }

    fn set_interval_nanos(&mut self, interval: u64) {
        if self.limit_interval == 0 {
            return;
        }
        self.limit_interval = interval;
    }

    pub fn increase_by(&mut self, delta: Duration) {
        let interval = self.limit_interval.saturating_add(duration_to_nanos(delta));
        self.set_interval_nanos(interval);
    }

    /// Shorten the interval, bottoming out at zero
    pub fn decrease_by(&mut self, delta: Duration) {
        let interval = self.limit_interval.saturating_sub(duration_to_nanos(delta));
        self.set_interval_nanos(interval);
    }

    /// Grow the interval by a fraction of itself (`0.25` is 25%)
    ///
    /// The result is truncated to whole nanoseconds.
    pub fn increase_by_percentage(&mut self, fraction: f64) {
        self.scale(1.0 + fraction);
    }

    /// Shrink the interval by a fraction of itself (`0.25` is 25%)
    pub fn decrease_by_percentage(&mut self, fraction: f64) {
        self.scale(1.0 - fraction);
    }

    fn scale(&mut self, factor: f64) {
        // float to int casts saturate, negative and NaN land on 0
        let interval = (self.limit_interval as f64 * factor) as u64;
        self.set_interval_nanos(interval);
    }

    /// Time still to wait before the next call may start
    ///
    /// Only non-zero waits are counted in the statistics. The call itself is
    /// not recorded here, see [`mark_called`](Self::mark_called).
    pub fn check_for_wait(&mut self) -> Duration {
        let Some(last_called) = self.last_called else {
            return Duration::ZERO;
        };

        let elapsed = self.clock.elapsed_since(last_called);
        if elapsed >= self.limit_interval {
            return Duration::ZERO;
        }

        let wait = Duration::from_nanos(self.limit_interval - elapsed);
        self.stats.record(wait);
        wait
    }

    /// Record the current time as the last call
    pub fn mark_called(&mut self) {
        self.last_called = Some(self.clock.now());
    }
}

impl<C: Clock> DelayStrategy for IntervalLimiter<C> {
    fn check_for_wait(&mut self) -> Duration {
        IntervalLimiter::check_for_wait(self)
    }

    fn mark_called(&mut self) {
        IntervalLimiter::mark_called(self)
    }

    fn interval(&self) -> Duration {
        IntervalLimiter::interval(self)
    }

    fn stats(&self) -> DelayStats {
        self.stats
    }

    fn kind(&self) -> &'static str {
        "interval"
    }
}

impl<C> fmt::Display for IntervalLimiter<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "IntervalLimiter(limit_interval={}ns)", self.limit_interval)
    }
}
