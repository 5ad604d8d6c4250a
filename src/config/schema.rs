use std::time::Duration;

use serde::Deserialize;

use crate::limiter::{ConfiguredStrategy, IntervalLimiter, RateLimiter};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Strategy and its parameters
    #[serde(default)]
    pub limiter: LimiterConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
}

// ============================================================================
// Limiter Configuration
// ============================================================================

/// Limiter configuration, tagged by `strategy`
///
/// ```toml
/// [limiter]
/// strategy = "rate"
/// rate = 2.0
/// period_ms = 1000
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "strategy", rename_all = "lowercase")]
pub enum LimiterConfig {
    /// Minimum interval between calls
    Interval {
        /// Interval in milliseconds
        #[serde(default = "default_interval_ms")]
        interval_ms: u64,
    },
    /// Requests per period on a virtual schedule
    Rate {
        /// Requests allowed per period, zero or less disables limiting
        rate: f64,
        /// Period in milliseconds
        #[serde(default = "default_period_ms")]
        period_ms: u64,
    },
}

fn default_interval_ms() -> u64 {
    1000
}

fn default_period_ms() -> u64 {
    1000
}

impl Default for LimiterConfig {
    fn default() -> Self {
        Self::Interval {
            interval_ms: default_interval_ms(),
        }
    }
}

impl LimiterConfig {
    /// Build the configured strategy on the system clock
    pub fn build(&self) -> ConfiguredStrategy {
        match *self {
            Self::Interval { interval_ms } => {
                IntervalLimiter::new(Duration::from_millis(interval_ms)).into()
            }
            Self::Rate { rate, period_ms } => {
                RateLimiter::with_period(rate, Duration::from_millis(period_ms)).into()
            }
        }
    }
}

// ============================================================================
// Logging / Metrics Configuration
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Default filter directive, `RUST_LOG` takes precedence
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MetricsConfig {
    /// Whether to record Prometheus metrics
    #[serde(default)]
    pub enabled: bool,
}
