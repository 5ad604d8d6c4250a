const NANOS_PER_SEC: f64 = 1_000_000_000.0;

/// Convert seconds to whole nanoseconds, truncating any fraction
///
/// Negative and NaN inputs give 0, values past the range of `u64` saturate.
pub fn seconds_to_nanos(seconds: f64) -> u64 {
    (seconds * NANOS_PER_SEC) as u64
}

/// Convert nanoseconds to seconds
pub fn nanos_to_seconds(nanos: u64) -> f64 {
    nanos as f64 / NANOS_PER_SEC
}
