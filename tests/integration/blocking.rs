//! Thread-blocking limiter calls

use std::sync::Arc;
use std::time::{Duration, Instant};

use pacer::limiter::DEFAULT_PERIOD;
use pacer::{IntervalLimiter, Limiter, ManualClock, RateLimiter};

use crate::{CallLog, WaitLog};

#[test]
fn test_back_to_back_calls_are_spaced() {
    let mut limiter = Limiter::new(IntervalLimiter::new(Duration::from_millis(100)));
    let log = CallLog::default();

    limiter.limit(|| log.record());
    limiter.limit(|| log.record());

    let gaps = log.gaps();
    assert_eq!(gaps.len(), 1);
    assert!(gaps[0] >= Duration::from_millis(100), "gap was {:?}", gaps[0]);
    assert_eq!(limiter.stats().total_requests, 1);
}

#[test]
fn test_interval_counts_from_end_of_call() {
    let mut limiter = Limiter::new(IntervalLimiter::new(Duration::from_millis(50)));
    let log = CallLog::default();

    limiter.limit(|| {
        log.record();
        std::thread::sleep(Duration::from_millis(30));
    });
    limiter.limit(|| log.record());

    // 30ms inside the first call plus the full 50ms interval after it
    assert!(log.gaps()[0] >= Duration::from_millis(80));
}

#[test]
fn test_slow_caller_is_not_delayed() {
    let mut limiter = Limiter::new(IntervalLimiter::new(Duration::from_millis(20)));
    limiter.limit(|| ());
    std::thread::sleep(Duration::from_millis(40));

    let start = Instant::now();
    limiter.limit(|| ());
    assert!(start.elapsed() < Duration::from_millis(20));
    assert_eq!(limiter.stats().total_requests, 0);
}

#[test]
fn test_failed_call_leaves_last_called() {
    let mut limiter = Limiter::new(IntervalLimiter::new(Duration::from_millis(10)));
    limiter.limit(|| ());
    let marked = limiter.strategy().last_called();

    let result: Result<(), String> = limiter.try_limit(|| Err("quota exceeded".to_string()));
    assert_eq!(result, Err("quota exceeded".to_string()));
    assert_eq!(limiter.strategy().last_called(), marked);
}

#[test]
fn test_failed_call_does_not_reset_spacing() {
    let mut limiter = Limiter::new(IntervalLimiter::new(Duration::from_millis(60)));
    let log = CallLog::default();

    limiter.limit(|| log.record());
    let _: Result<(), ()> = limiter.try_limit(|| Err(()));
    let start = Instant::now();
    limiter.limit(|| log.record());

    // the failed call waited out the interval and did not start a new one
    assert!(start.elapsed() < Duration::from_millis(60));
    assert!(log.gaps()[0] >= Duration::from_millis(60));
}

#[test]
fn test_rate_limiter_paces_calls() {
    let waits = Arc::new(WaitLog::default());
    let log = CallLog::default();
    let start = Instant::now();
    let mut limiter = Limiter::with_observer(RateLimiter::new(20.0), waits.clone());

    for _ in 0..3 {
        limiter.limit(|| log.record());
    }

    // three slots at 50ms spacing, the first one reserved one interval out
    assert!(start.elapsed() >= Duration::from_millis(150));
    assert_eq!(log.gaps().len(), 2);
    assert_eq!(waits.waits().len(), 3);
    assert_eq!(limiter.stats().total_requests, 3);
}

#[test]
fn test_pinned_zero_interval_stays_unlimited() {
    let mut limiter = Limiter::new(IntervalLimiter::new(Duration::from_millis(10)));
    limiter.adjust(|s| s.decrease_by(Duration::from_millis(10)));
    limiter.adjust(|s| s.set_interval(Duration::from_secs(10)));
    assert_eq!(limiter.interval(), Duration::ZERO);

    let start = Instant::now();
    for _ in 0..5 {
        limiter.limit(|| ());
    }
    assert!(start.elapsed() < Duration::from_secs(1));
}

#[test]
fn test_rate_failed_call_gives_slot_back() {
    let mut limiter = Limiter::new(RateLimiter::with_clock(
        100.0,
        DEFAULT_PERIOD,
        ManualClock::new(0),
    ));

    let _: Result<(), &str> = limiter.try_limit(|| Err("rejected"));
    assert_eq!(limiter.strategy().last_request(), 0);

    let _ = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        limiter.limit(|| panic!("rejected"))
    }));
    assert_eq!(limiter.strategy().last_request(), 0);

    limiter.limit(|| ());
    assert_eq!(limiter.strategy().last_request(), 10_000_000);
    assert_eq!(limiter.stats().total_requests, 3);
}
