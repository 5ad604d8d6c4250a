//! Call pacing for clients of rate-capped services
//!
//! A [`Limiter`] runs operations no closer together than its
//! [`DelayStrategy`] allows, either blocking the calling thread
//! ([`Limiter::limit`]) or yielding to tokio ([`Limiter::limit_async`]).
//!
//! Two strategies are provided:
//! - [`IntervalLimiter`]: a minimum interval measured from the end of the
//!   previous successful call
//! - [`RateLimiter`]: requests per period, reserved on a virtual schedule
//!
//! ```
//! use std::time::Duration;
//! use pacer::{IntervalLimiter, Limiter};
//!
//! let mut limiter = Limiter::new(IntervalLimiter::new(Duration::from_millis(50)));
//! let first = limiter.limit(|| 1);
//! let second = limiter.limit(|| 2);
//! assert_eq!(first + second, 3);
//! assert_eq!(limiter.stats().total_requests, 1);
//! ```
//!
//! Limiters hold no locks. Share one between tasks only behind a mutex held
//! for the whole call.

pub mod clock;
pub mod config;
pub mod executor;
pub mod limiter;
pub mod metrics;
pub mod observer;

pub use clock::{nanos_to_seconds, seconds_to_nanos, Clock, ManualClock, MonotonicClock};
pub use executor::{BlockingSleep, Cancelled, Limiter, Suspend, TokioSleep};
pub use limiter::{ConfiguredStrategy, DelayStats, DelayStrategy, IntervalLimiter, RateLimiter};
pub use metrics::MetricsObserver;
pub use observer::{LimitObserver, NoopObserver, TracingObserver, WaitEvent};
