//! Integration test entry point
//!
//! Run with: cargo test --test integration
//!
//! Timing assertions only use lower bounds, a loaded machine can make calls
//! slower but never faster.

mod blocking;
mod suspending;

use std::sync::Mutex;
use std::time::{Duration, Instant};

use pacer::{LimitObserver, WaitEvent};

/// Wall-clock start times of invoked operations
#[derive(Default)]
pub struct CallLog {
    starts: Mutex<Vec<Instant>>,
}

impl CallLog {
    pub fn record(&self) {
        self.starts.lock().unwrap().push(Instant::now());
    }

    /// Gaps between consecutive recorded starts
    pub fn gaps(&self) -> Vec<Duration> {
        let starts = self.starts.lock().unwrap();
        starts.windows(2).map(|w| w[1] - w[0]).collect()
    }
}

/// Observer collecting every issued wait
#[derive(Default)]
pub struct WaitLog {
    waits: Mutex<Vec<Duration>>,
}

impl WaitLog {
    pub fn waits(&self) -> Vec<Duration> {
        self.waits.lock().unwrap().clone()
    }
}

impl LimitObserver for WaitLog {
    fn on_wait(&self, event: &WaitEvent) {
        self.waits.lock().unwrap().push(event.wait);
    }
}
