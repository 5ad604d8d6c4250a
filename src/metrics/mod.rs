//! Prometheus metrics for limiter activity
//!
//! [`MetricsObserver`] plugs into a [`Limiter`](crate::Limiter) as its
//! observer. All metrics carry a `strategy` label.

use std::time::Duration;

use prometheus::{
    CounterVec, GaugeVec, HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry,
};

use crate::observer::{LimitObserver, WaitEvent};

/// Limiter metrics collection
pub struct MetricsObserver {
    /// Registry holding all metrics below
    pub registry: Registry,

    /// Waits issued with a non-zero delay
    pub delayed_requests_total: IntCounterVec,
    /// Sum of issued delays (in seconds)
    pub delay_seconds_total: CounterVec,
    /// Issued waits, zero waits included (in seconds)
    pub wait_seconds: HistogramVec,
    /// Calls that completed and were recorded
    pub calls_total: IntCounterVec,
    /// Calls whose operation failed
    pub failed_calls_total: IntCounterVec,
    /// Interval in force at the last wait or adjustment (in seconds)
    pub interval_seconds: GaugeVec,
}

impl MetricsObserver {
    /// Create metrics in a fresh registry
    pub fn new() -> prometheus::Result<Self> {
        Self::with_registry(Registry::new())
    }

    /// Create metrics and register them in `registry`
    pub fn with_registry(registry: Registry) -> prometheus::Result<Self> {
        let delayed_requests_total = IntCounterVec::new(
            Opts::new(
                "pacer_delayed_requests_total",
                "Total number of calls that had to wait",
            ),
            &["strategy"],
        )?;

        let delay_seconds_total = CounterVec::new(
            Opts::new(
                "pacer_delay_seconds_total",
                "Total delay issued before calls in seconds",
            ),
            &["strategy"],
        )?;

        let wait_seconds = HistogramVec::new(
            HistogramOpts::new("pacer_wait_seconds", "Wait issued before each call in seconds")
                .buckets(vec![
                    0.0005, 0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
                ]),
            &["strategy"],
        )?;

        let calls_total = IntCounterVec::new(
            Opts::new("pacer_calls_total", "Total number of completed calls"),
            &["strategy"],
        )?;

        let failed_calls_total = IntCounterVec::new(
            Opts::new(
                "pacer_failed_calls_total",
                "Total number of calls whose operation failed",
            ),
            &["strategy"],
        )?;

        let interval_seconds = GaugeVec::new(
            Opts::new("pacer_interval_seconds", "Current interval between calls in seconds"),
            &["strategy"],
        )?;

        registry.register(Box::new(delayed_requests_total.clone()))?;
        registry.register(Box::new(delay_seconds_total.clone()))?;
        registry.register(Box::new(wait_seconds.clone()))?;
        registry.register(Box::new(calls_total.clone()))?;
        registry.register(Box::new(failed_calls_total.clone()))?;
        registry.register(Box::new(interval_seconds.clone()))?;

        Ok(Self {
            registry,
            delayed_requests_total,
            delay_seconds_total,
            wait_seconds,
            calls_total,
            failed_calls_total,
            interval_seconds,
        })
    }

    /// Get metrics as Prometheus text format
    pub fn gather(&self) -> prometheus::Result<String> {
        use prometheus::Encoder;
        let encoder = prometheus::TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }

    fn set_interval(&self, kind: &str, interval: Duration) {
        self.interval_seconds
            .with_label_values(&[kind])
            .set(interval.as_secs_f64());
    }
}

impl LimitObserver for MetricsObserver {
    fn on_wait(&self, event: &WaitEvent) {
        let wait = event.wait.as_secs_f64();
        self.wait_seconds
            .with_label_values(&[event.kind])
            .observe(wait);
        if !event.wait.is_zero() {
            self.delayed_requests_total
                .with_label_values(&[event.kind])
                .inc();
            self.delay_seconds_total
                .with_label_values(&[event.kind])
                .inc_by(wait);
        }
        self.set_interval(event.kind, event.interval);
    }

    fn on_called(&self, kind: &'static str) {
        self.calls_total.with_label_values(&[kind]).inc();
    }

    fn on_failed(&self, kind: &'static str) {
        self.failed_calls_total.with_label_values(&[kind]).inc();
    }

    fn on_interval_changed(&self, kind: &'static str, _old: Duration, new: Duration) {
        self.set_interval(kind, new);
    }
}
