//! Running operations through a delay strategy
//!
//! [`Limiter`] owns a [`DelayStrategy`] and runs every call through one
//! sequence: compute the wait, suspend for it, invoke the operation, then
//! record the call if the operation succeeded. The blocking and async entry
//! points differ only in the [`Suspend`] they plug in.
//!
//! All entry points take `&mut self`. A limiter shared between tasks or
//! threads needs an outer lock held across the whole call, otherwise two
//! callers may both see "no wait" and run back to back.

mod suspend;

pub use suspend::{BlockingSleep, Suspend, TokioSleep};

use std::future::{self, Future};
use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::limiter::{DelayStats, DelayStrategy};
use crate::observer::{LimitObserver, TracingObserver, WaitEvent};

/// The call was cancelled before it completed
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("Limited call cancelled")]
pub struct Cancelled;

/// Runs operations no closer together than its strategy allows
pub struct Limiter<S> {
    strategy: S,
    observer: Arc<dyn LimitObserver>,
}

impl<S: DelayStrategy> Limiter<S> {
    /// Create a limiter reporting to [`TracingObserver`]
    pub fn new(strategy: S) -> Self {
        Self::with_observer(strategy, Arc::new(TracingObserver))
    }

    pub fn with_observer(strategy: S, observer: Arc<dyn LimitObserver>) -> Self {
        Self { strategy, observer }
    }

    pub fn strategy(&self) -> &S {
        &self.strategy
    }

    pub fn into_strategy(self) -> S {
        self.strategy
    }

    pub fn interval(&self) -> Duration {
        self.strategy.interval()
    }

    pub fn stats(&self) -> DelayStats {
        self.strategy.stats()
    }

    /// Change the strategy between calls
    ///
    /// The observer is told when the interval changed.
    ///
    /// ```
    /// use std::time::Duration;
    /// use pacer::{IntervalLimiter, Limiter};
    ///
    /// let mut limiter = Limiter::new(IntervalLimiter::new(Duration::from_millis(100)));
    /// limiter.adjust(|s| s.increase_by_percentage(0.5));
    /// assert_eq!(limiter.interval(), Duration::from_millis(150));
    /// ```
    pub fn adjust<T>(&mut self, f: impl FnOnce(&mut S) -> T) -> T {
        let old = self.strategy.interval();
        let result = f(&mut self.strategy);
        let new = self.strategy.interval();
        if old != new {
            self.observer
                .on_interval_changed(self.strategy.kind(), old, new);
        }
        result
    }

    /// Run `op`, blocking the current thread for any wait first
    ///
    /// The call is recorded once `op` returns. A panic in `op` unwinds
    /// through here without recording it and leaves the strategy's schedule
    /// as it was before the call.
    pub fn limit<F, R>(&mut self, op: F) -> R
    where
        F: FnOnce() -> R,
    {
        futures::executor::block_on(self.run(
            &BlockingSleep,
            move || future::ready(op()),
            |_| true,
        ))
    }

    /// Like [`limit`](Self::limit), but an `Err` leaves the call unrecorded
    ///
    /// The error is returned untouched.
    pub fn try_limit<F, T, E>(&mut self, op: F) -> Result<T, E>
    where
        F: FnOnce() -> Result<T, E>,
    {
        futures::executor::block_on(self.run(
            &BlockingSleep,
            move || future::ready(op()),
            Result::is_ok,
        ))
    }

    /// Run the future produced by `op`, yielding to tokio for any wait first
    ///
    /// Dropping the returned future before it completes leaves the call
    /// unrecorded and the schedule as it was. A wait already issued stays in
    /// the statistics.
    pub async fn limit_async<F, Fut>(&mut self, op: F) -> Fut::Output
    where
        F: FnOnce() -> Fut,
        Fut: Future,
    {
        self.run(&TokioSleep, op, |_| true).await
    }

    /// Like [`limit_async`](Self::limit_async), but an `Err` leaves the call
    /// unrecorded
    pub async fn try_limit_async<F, Fut, T, E>(&mut self, op: F) -> Result<T, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        self.run(&TokioSleep, op, Result::is_ok).await
    }

    /// [`limit_async`](Self::limit_async) that gives up once `token` is
    /// cancelled
    ///
    /// A token cancelled up front means the strategy is never consulted.
    pub async fn limit_async_cancellable<F, Fut>(
        &mut self,
        token: &CancellationToken,
        op: F,
    ) -> Result<Fut::Output, Cancelled>
    where
        F: FnOnce() -> Fut,
        Fut: Future,
    {
        tokio::select! {
            biased;
            _ = token.cancelled() => Err(Cancelled),
            output = self.limit_async(op) => Ok(output),
        }
    }

    async fn run<P, F, Fut>(
        &mut self,
        suspend: &P,
        op: F,
        succeeded: fn(&Fut::Output) -> bool,
    ) -> Fut::Output
    where
        P: Suspend,
        F: FnOnce() -> Fut,
        Fut: Future,
    {
        let kind = self.strategy.kind();
        let mut pending = PendingCall::check(&mut self.strategy);
        self.observer.on_wait(&WaitEvent {
            kind,
            wait: pending.wait,
            interval: pending.strategy.interval(),
            stats: pending.strategy.stats(),
        });

        suspend.suspend(pending.wait).await;
        let output = op().await;

        if succeeded(&output) {
            pending.complete();
            self.observer.on_called(kind);
        } else {
            self.observer.on_failed(kind);
        }
        output
    }
}

/// A checked call that has not completed yet
///
/// Dropped without [`complete`](Self::complete) (failure, panic or a
/// cancelled future) it hands the call back to the strategy as abandoned.
struct PendingCall<'a, S: DelayStrategy> {
    strategy: &'a mut S,
    wait: Duration,
    completed: bool,
}

impl<'a, S: DelayStrategy> PendingCall<'a, S> {
    fn check(strategy: &'a mut S) -> Self {
        let wait = strategy.check_for_wait();
        Self {
            strategy,
            wait,
            completed: false,
        }
    }

    fn complete(&mut self) {
        self.completed = true;
        self.strategy.mark_called();
    }
}

impl<S: DelayStrategy> Drop for PendingCall<'_, S> {
    fn drop(&mut self) {
        if !self.completed {
            self.strategy.abandon();
        }
    }
}
