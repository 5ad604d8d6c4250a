use std::fmt;
use std::time::Duration;

/// Cumulative delay statistics for a limiter
///
/// What counts as a request depends on the strategy: the interval limiter
/// counts only checks that issued a wait, the rate limiter counts every query.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DelayStats {
    /// Sum of all waits issued
    pub total_delay: Duration,
    /// Number of counted requests
    pub total_requests: u64,
}

impl DelayStats {
    pub(crate) fn record(&mut self, delay: Duration) {
        self.total_delay = self.total_delay.saturating_add(delay);
        self.total_requests = self.total_requests.saturating_add(1);
    }

    /// Mean delay per counted request, zero when nothing was counted
    pub fn average_delay(&self) -> Duration {
        match u32::try_from(self.total_requests) {
            Ok(0) => Duration::ZERO,
            Ok(n) => self.total_delay / n,
            Err(_) => Duration::from_secs_f64(
                self.total_delay.as_secs_f64() / self.total_requests as f64,
            ),
        }
    }
}

impl fmt::Display for DelayStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} requests, {:.3}s total delay",
            self.total_requests,
            self.total_delay.as_secs_f64()
        )
    }
}
