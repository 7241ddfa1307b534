//! Periodic cycle scheduling.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use crate::cycle::CycleRunner;

struct Ticker {
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

/// Fires a cycle immediately on start and then every `interval`.
///
/// Ticks never queue behind a running cycle: a tick that finds the lock held
/// is skipped. Stopping cancels future ticks only; an in-flight cycle runs to
/// completion.
pub struct CycleScheduler {
    runner: Arc<CycleRunner>,
    interval: Duration,
    ticker: Mutex<Option<Ticker>>,
}

impl CycleScheduler {
    pub fn new(runner: Arc<CycleRunner>, interval: Duration) -> Self {
        Self {
            runner,
            interval,
            ticker: Mutex::new(None),
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// (Re)arm the schedule. Any previous schedule is cancelled first.
    pub fn start(&self) {
        self.stop();

        tokio::spawn(Self::fire(self.runner.clone()));

        let cancel = CancellationToken::new();
        let token = cancel.clone();
        let runner = self.runner.clone();
        let period = self.interval;
        let task = tokio::spawn(async move {
            let mut ticks = interval_at(Instant::now() + period, period);
            ticks.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    _ = ticks.tick() => {
                        if runner.lock().is_held() {
                            trace!("Cycle in flight, skipping tick");
                            continue;
                        }
                        tokio::spawn(Self::fire(runner.clone()));
                    }
                }
            }
            debug!("Cycle ticker stopped");
        });

        *self.ticker.lock() = Some(Ticker { cancel, task });
        debug!("Cycle ticker armed every {:?}", period);
    }

    /// Disarm the schedule; idempotent.
    pub fn stop(&self) {
        if let Some(ticker) = self.ticker.lock().take() {
            ticker.cancel.cancel();
            drop(ticker.task);
        }
    }

    pub fn is_armed(&self) -> bool {
        self.ticker
            .lock()
            .as_ref()
            .is_some_and(|t| !t.cancel.is_cancelled())
    }

    async fn fire(runner: Arc<CycleRunner>) {
        let outcome = runner.run_cycle().await;
        trace!("Cycle finished: {:?}", outcome);
    }
}

impl Drop for CycleScheduler {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
#[path = "scheduler_tests.rs"]
mod tests;
