//! Limiter calls on the tokio runtime

use std::sync::Arc;
use std::time::{Duration, Instant};

use pacer::limiter::DEFAULT_PERIOD;
use pacer::{Cancelled, IntervalLimiter, Limiter, ManualClock, RateLimiter};
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

use crate::CallLog;

#[tokio::test]
async fn test_back_to_back_calls_are_spaced() {
    let mut limiter = Limiter::new(IntervalLimiter::new(Duration::from_millis(100)));
    let log = CallLog::default();

    limiter.limit_async(|| async { log.record() }).await;
    limiter.limit_async(|| async { log.record() }).await;

    assert!(log.gaps()[0] >= Duration::from_millis(100));
}

#[tokio::test]
async fn test_wait_does_not_block_runtime() {
    let mut limiter = Limiter::new(IntervalLimiter::new(Duration::from_millis(200)));
    limiter.limit_async(|| async {}).await;

    let ticker = tokio::spawn(async {
        let start = Instant::now();
        tokio::time::sleep(Duration::from_millis(10)).await;
        start.elapsed()
    });

    limiter.limit_async(|| async {}).await;
    let ticked = ticker.await.unwrap();
    assert!(ticked < Duration::from_millis(200));
}

#[tokio::test]
async fn test_error_propagates_unchanged() {
    let mut limiter = Limiter::new(RateLimiter::with_clock(
        1000.0,
        DEFAULT_PERIOD,
        ManualClock::new(0),
    ));

    let result: Result<u8, std::io::Error> = limiter
        .try_limit_async(|| async {
            Err(std::io::Error::new(std::io::ErrorKind::TimedOut, "upstream"))
        })
        .await;

    let err = result.unwrap_err();
    assert_eq!(err.kind(), std::io::ErrorKind::TimedOut);
    assert_eq!(err.to_string(), "upstream");
    assert_eq!(limiter.strategy().last_request(), 0);
    assert_eq!(limiter.stats().total_requests, 1);
}

#[tokio::test]
async fn test_rate_slot_reused_after_cancellation() {
    let mut limiter = Limiter::new(RateLimiter::with_period(1.0, Duration::from_millis(200)));
    let before = limiter.strategy().last_request();

    let token = CancellationToken::new();
    let canceller = token.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(20)).await;
        canceller.cancel();
    });
    let result = limiter.limit_async_cancellable(&token, || async {}).await;
    assert_eq!(result, Err(Cancelled));
    assert_eq!(limiter.strategy().last_request(), before);

    // the next call gets the same first slot, not one pushed further out
    let start = Instant::now();
    limiter.limit_async(|| async {}).await;
    assert!(start.elapsed() < Duration::from_millis(200));
    assert_eq!(limiter.strategy().last_request(), before + 200_000_000);
    assert_eq!(limiter.stats().total_requests, 2);
}

#[tokio::test]
async fn test_dropped_call_leaves_last_called() {
    let mut limiter = Limiter::new(IntervalLimiter::new(Duration::from_secs(30)));
    limiter.limit_async(|| async {}).await;
    let marked = limiter.strategy().last_called();

    let timed_out = tokio::time::timeout(
        Duration::from_millis(20),
        limiter.limit_async(|| async { "never" }),
    )
    .await;

    assert!(timed_out.is_err());
    assert_eq!(limiter.strategy().last_called(), marked);
    assert_eq!(limiter.stats().total_requests, 1);
}

#[tokio::test]
async fn test_cancellation_token_aborts_wait() {
    let mut limiter = Limiter::new(IntervalLimiter::new(Duration::from_secs(30)));
    limiter.limit_async(|| async {}).await;

    let token = CancellationToken::new();
    let canceller = token.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(20)).await;
        canceller.cancel();
    });

    let start = Instant::now();
    let result = limiter.limit_async_cancellable(&token, || async {}).await;
    assert_eq!(result, Err(Cancelled));
    assert!(start.elapsed() < Duration::from_secs(30));
}

#[tokio::test]
async fn test_shared_behind_mutex() {
    let limiter = Arc::new(Mutex::new(Limiter::new(IntervalLimiter::new(
        Duration::from_millis(30),
    ))));
    let log = Arc::new(CallLog::default());

    let mut handles = Vec::new();
    for _ in 0..3 {
        let limiter = limiter.clone();
        let log = log.clone();
        handles.push(tokio::spawn(async move {
            let mut limiter = limiter.lock().await;
            limiter.limit_async(|| async { log.record() }).await;
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    for gap in log.gaps() {
        assert!(gap >= Duration::from_millis(30), "gap was {gap:?}");
    }
}
