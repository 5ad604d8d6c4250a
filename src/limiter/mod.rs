//! Delay computation strategies
//!
//! Two ways of deciding how long a call has to wait:
//! - [`IntervalLimiter`] measures the time since the last completed call
//! - [`RateLimiter`] keeps a virtual schedule derived from a request rate
//!
//! Both are driven by [`Limiter`](crate::Limiter) through [`DelayStrategy`].

mod interval;
mod rate;
mod stats;

pub use interval::IntervalLimiter;
pub use rate::{RateLimiter, DEFAULT_PERIOD};
pub use stats::DelayStats;

use std::fmt;
use std::time::Duration;

/// How a limiter decides on the wait before each call
///
/// Strategies are plain state machines without locking. Calls for a single
/// strategy must come from one logical owner: the check, the wait and the
/// mark form one sequence that interleaved callers would break.
pub trait DelayStrategy {
    /// Wait required before the next call may start
    fn check_for_wait(&mut self) -> Duration;

    /// Record that a call just completed
    fn mark_called(&mut self);

    /// The call checked by the last [`check_for_wait`](Self::check_for_wait)
    /// failed or was cancelled
    ///
    /// Undo any schedule state that check moved, leave the statistics alone.
    fn abandon(&mut self) {}

    /// Current spacing between calls
    fn interval(&self) -> Duration;

    fn stats(&self) -> DelayStats;

    /// Short name used in logs and metrics
    fn kind(&self) -> &'static str;
}

impl<S: DelayStrategy + ?Sized> DelayStrategy for Box<S> {
    fn check_for_wait(&mut self) -> Duration {
        (**self).check_for_wait()
    }

    fn mark_called(&mut self) {
        (**self).mark_called()
    }

    fn abandon(&mut self) {
        (**self).abandon()
    }

    fn interval(&self) -> Duration {
        (**self).interval()
    }

    fn stats(&self) -> DelayStats {
        (**self).stats()
    }

    fn kind(&self) -> &'static str {
        (**self).kind()
    }
}

/// Strategy picked at runtime, typically from configuration
#[derive(Debug, Clone)]
pub enum ConfiguredStrategy {
    Interval(IntervalLimiter),
    Rate(RateLimiter),
}

impl ConfiguredStrategy {
    fn inner(&self) -> &dyn DelayStrategy {
        match self {
            Self::Interval(limiter) => limiter,
            Self::Rate(limiter) => limiter,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn DelayStrategy {
        match self {
            Self::Interval(limiter) => limiter,
            Self::Rate(limiter) => limiter,
        }
    }
}

impl DelayStrategy for ConfiguredStrategy {
    fn check_for_wait(&mut self) -> Duration {
        self.inner_mut().check_for_wait()
    }

    fn mark_called(&mut self) {
        self.inner_mut().mark_called()
    }

    fn abandon(&mut self) {
        self.inner_mut().abandon()
    }

    fn interval(&self) -> Duration {
        self.inner().interval()
    }

    fn stats(&self) -> DelayStats {
        self.inner().stats()
    }

    fn kind(&self) -> &'static str {
        self.inner().kind()
    }
}

impl From<IntervalLimiter> for ConfiguredStrategy {
    fn from(limiter: IntervalLimiter) -> Self {
        Self::Interval(limiter)
    }
}

impl From<RateLimiter> for ConfiguredStrategy {
    fn from(limiter: RateLimiter) -> Self {
        Self::Rate(limiter)
    }
}

impl fmt::Display for ConfiguredStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Interval(limiter) => fmt::Display::fmt(limiter, f),
            Self::Rate(limiter) => fmt::Display::fmt(limiter, f),
        }
    }
}
