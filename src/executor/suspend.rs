use std::future::{self, Future, Ready};
use std::thread;
use std::time::Duration;

/// Suspension point used while a call waits its turn
pub trait Suspend {
    type Sleep: Future<Output = ()>;

    fn suspend(&self, wait: Duration) -> Self::Sleep;
}

/// Blocks the calling thread for the whole wait
///
/// The sleep happens before the returned future is handed back, so there is
/// no way to interrupt it.
#[derive(Debug, Clone, Copy, Default)]
pub struct BlockingSleep;

impl Suspend for BlockingSleep {
    type Sleep = Ready<()>;

    fn suspend(&self, wait: Duration) -> Self::Sleep {
        if !wait.is_zero() {
            thread::sleep(wait);
        }
        future::ready(())
    }
}

/// Yields to the tokio scheduler for the wait
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleep;

impl Suspend for TokioSleep {
    type Sleep = tokio::time::Sleep;

    fn suspend(&self, wait: Duration) -> Self::Sleep {
        tokio::time::sleep(wait)
    }
}
