//! Requests-per-period pacing on a virtual schedule
//!
//! Each query reserves the next slot `interval` after the previous reservation
//! and returns how long the caller has to wait for it. The schedule moves
//! forward on every query, even when the caller never waits, so ignoring the
//! returned delays makes later delays grow.

use std::fmt;
use std::time::Duration;

use crate::clock::{duration_to_nanos, Clock, MonotonicClock};

use super::{DelayStats, DelayStrategy};

/// Default rate denominator
pub const DEFAULT_PERIOD: Duration = Duration::from_secs(1);

/// Rate limiter driven by a virtual schedule
#[derive(Debug, Clone)]
pub struct RateLimiter<C = MonotonicClock> {
    clock: C,
    /// Requests allowed per period
    rate: f64,
    period: Duration,
    /// Derived `period / rate` in nanoseconds
    interval: u64,
    /// Clock reading of the last reserved slot
    last_request: u64,
    /// Schedule position before the latest unconfirmed reservation
    reserved_from: Option<u64>,
    stats: DelayStats,
}

impl RateLimiter {
    /// `rate` requests per second
    pub fn new(rate: f64) -> Self {
        Self::with_period(rate, DEFAULT_PERIOD)
    }

    /// `rate` requests per `period`
    pub fn with_period(rate: f64, period: Duration) -> Self {
        Self::with_clock(rate, period, MonotonicClock::new())
    }
}

impl<C: Clock> RateLimiter<C> {
    /// The schedule starts at the current reading, so the very first query
    /// already waits one interval.
    pub fn with_clock(rate: f64, period: Duration, clock: C) -> Self {
        let last_request = clock.now();
        let mut limiter = Self {
            clock,
            rate,
            period,
            interval: 0,
            last_request,
            reserved_from: None,
            stats: DelayStats::default(),
        };
        limiter.update_interval();
        limiter
    }

    pub fn rate(&self) -> f64 {
        self.rate
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Spacing between scheduled slots, zero when unlimited
    pub fn interval(&self) -> Duration {
        Duration::from_nanos(self.interval)
    }

    /// Clock reading of the most recently reserved slot
    pub fn last_request(&self) -> u64 {
        self.last_request
    }

    pub fn stats(&self) -> DelayStats {
        self.stats
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn set_rate(&mut self, rate: f64) {
        self.rate = rate;
        self.update_interval();
    }

    /// Add `delta` (possibly negative) to the rate
    pub fn adjust_rate(&mut self, delta: f64) {
        self.set_rate(self.rate + delta);
    }

    /// Multiply the rate by `factor`
    ///
    /// The product is truncated to a whole number of requests, so scaling a
    /// rate of 3 by 0.5 gives 1, and anything below 1 turns limiting off.
    pub fn adjust_rate_multiplier(&mut self, factor: f64) {
        self.set_rate((self.rate * factor).trunc());
    }

    pub fn set_period(&mut self, period: Duration) {
        self.period = period;
        self.update_interval();
    }

    fn update_interval(&mut self) {
        self.interval = if self.rate > 0.0 && self.rate.is_finite() {
            (duration_to_nanos(self.period) as f64 / self.rate) as u64
        } else {
            0
        };
    }

    /// Reserve the next slot and return the delay until it
    ///
    /// Every query is counted, including ones that need no delay.
    pub fn get_delay(&mut self) -> Duration {
        let now = self.clock.now();
        let next_call = self.last_request.saturating_add(self.interval);
        let delay = Duration::from_nanos(next_call.saturating_sub(now));

        self.reserved_from = Some(self.last_request);
        self.last_request = next_call;
        self.stats.record(delay);
        delay
    }

    /// Give back the slot reserved by the latest [`get_delay`](Self::get_delay)
    ///
    /// The schedule returns to where it was before that query. The delay it
    /// issued stays in the statistics.
    pub fn release_reservation(&mut self) {
        if let Some(previous) = self.reserved_from.take() {
            self.last_request = previous;
        }
    }
}

impl<C: Clock> DelayStrategy for RateLimiter<C> {
    fn check_for_wait(&mut self) -> Duration {
        self.get_delay()
    }

    /// The schedule already moved in [`get_delay`](RateLimiter::get_delay),
    /// this only confirms the reservation.
    fn mark_called(&mut self) {
        self.reserved_from = None;
    }

    fn abandon(&mut self) {
        self.release_reservation();
    }

    fn interval(&self) -> Duration {
        RateLimiter::interval(self)
    }

    fn stats(&self) -> DelayStats {
        self.stats
    }

    fn kind(&self) -> &'static str {
        "rate"
    }
}

impl<C> fmt::Display for RateLimiter<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RateLimiter(rate={}, period={:?})", self.rate, self.period)
    }
}
