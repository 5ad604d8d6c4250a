//! Observability sinks for limiter activity
//!
//! A [`Limiter`](crate::Limiter) reports what it does to the observer it was
//! built with. [`TracingObserver`] is the default and emits `tracing` events;
//! [`MetricsObserver`](crate::metrics::MetricsObserver) records Prometheus
//! metrics.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, trace};

use crate::limiter::DelayStats;

/// A wait issued before a call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitEvent {
    /// Strategy kind (`interval` or `rate`)
    pub kind: &'static str,
    /// Wait issued for this call, may be zero
    pub wait: Duration,
    /// Interval in force when the wait was computed
    pub interval: Duration,
    /// Statistics after the wait was counted
    pub stats: DelayStats,
}

/// Receiver of limiter events
///
/// All methods default to doing nothing.
pub trait LimitObserver: Send + Sync {
    fn on_wait(&self, _event: &WaitEvent) {}

    /// The operation returned successfully and the call was recorded
    fn on_called(&self, _kind: &'static str) {}

    /// The operation failed, the call was not recorded
    fn on_failed(&self, _kind: &'static str) {}

    fn on_interval_changed(&self, _kind: &'static str, _old: Duration, _new: Duration) {}
}

impl<T: LimitObserver + ?Sized> LimitObserver for Arc<T> {
    fn on_wait(&self, event: &WaitEvent) {
        (**self).on_wait(event)
    }

    fn on_called(&self, kind: &'static str) {
        (**self).on_called(kind)
    }

    fn on_failed(&self, kind: &'static str) {
        (**self).on_failed(kind)
    }

    fn on_interval_changed(&self, kind: &'static str, old: Duration, new: Duration) {
        (**self).on_interval_changed(kind, old, new)
    }
}

/// Send every event to both observers
impl<A: LimitObserver, B: LimitObserver> LimitObserver for (A, B) {
    fn on_wait(&self, event: &WaitEvent) {
        self.0.on_wait(event);
        self.1.on_wait(event);
    }

    fn on_called(&self, kind: &'static str) {
        self.0.on_called(kind);
        self.1.on_called(kind);
    }

    fn on_failed(&self, kind: &'static str) {
        self.0.on_failed(kind);
        self.1.on_failed(kind);
    }

    fn on_interval_changed(&self, kind: &'static str, old: Duration, new: Duration) {
        self.0.on_interval_changed(kind, old, new);
        self.1.on_interval_changed(kind, old, new);
    }
}

/// Observer that drops everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl LimitObserver for NoopObserver {}

/// Observer emitting `tracing` events
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl LimitObserver for TracingObserver {
    fn on_wait(&self, event: &WaitEvent) {
        if event.wait.is_zero() {
            trace!(strategy = event.kind, "No delay required");
            return;
        }
        debug!(
            strategy = event.kind,
            wait_ms = event.wait.as_secs_f64() * 1000.0,
            interval_ms = event.interval.as_secs_f64() * 1000.0,
            total_delay_ms = event.stats.total_delay.as_secs_f64() * 1000.0,
            total_requests = event.stats.total_requests,
            "Issued delay"
        );
    }

    fn on_called(&self, kind: &'static str) {
        trace!(strategy = kind, "Call completed");
    }

    fn on_failed(&self, kind: &'static str) {
        debug!(strategy = kind, "Call failed, not recorded");
    }

    fn on_interval_changed(&self, kind: &'static str, old: Duration, new: Duration) {
        debug!(strategy = kind, old = ?old, new = ?new, "Set interval");
    }
}
