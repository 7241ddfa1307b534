//! One evaluation of "is there a problem, and if so, solve it".

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
use tracing::{debug, warn};

use drillbot_config::PageConfig;
use drillbot_protocols::{EventSink, ObserverPage, SolverContext, SolverError};

use crate::input::InputSimulator;
use crate::lock::CycleLock;
use crate::solver_registry::SolverRegistry;
use crate::state::RunState;

/// How a cycle ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    /// Another cycle held the lock.
    Busy,
    /// Automation is not running.
    Stopped,
    /// The play surface is absent or hidden.
    NoSurface,
    /// The solver found nothing to do, or no solver serves the mode.
    NoProblem,
    /// The solver acted on a problem.
    Acted,
    /// The solver failed; the message was logged.
    Failed(String),
}

/// Cycle counters.
#[derive(Debug, Default)]
pub struct CycleStats {
    pub started: AtomicU64,
    pub acted: AtomicU64,
    pub failed: AtomicU64,
    pub skipped_busy: AtomicU64,
}

impl CycleStats {
    fn record(&self, outcome: &CycleOutcome) {
        let counter = match outcome {
            CycleOutcome::Acted => &self.acted,
            CycleOutcome::Failed(_) => &self.failed,
            CycleOutcome::Busy => &self.skipped_busy,
            _ => return,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }
}

/// Runs cycles against the observed page.
pub struct CycleRunner {
    page: Arc<dyn ObserverPage>,
    input: InputSimulator,
    solvers: SolverRegistry,
    events: EventSink,
    state: Arc<RwLock<RunState>>,
    lock: Arc<CycleLock>,
    page_config: PageConfig,
    timeout: Option<Duration>,
    stats: CycleStats,
}

impl CycleRunner {
    pub fn new(
        page: Arc<dyn ObserverPage>,
        input: InputSimulator,
        solvers: SolverRegistry,
        events: EventSink,
        state: Arc<RwLock<RunState>>,
        page_config: PageConfig,
        timeout: Option<Duration>,
    ) -> Self {
        Self {
            page,
            input,
            solvers,
            events,
            state,
            lock: CycleLock::new(),
            page_config,
            timeout,
            stats: CycleStats::default(),
        }
    }

    pub fn lock(&self) -> &Arc<CycleLock> {
        &self.lock
    }

    pub fn stats(&self) -> &CycleStats {
        &self.stats
    }

    /// Run one cycle; never panics and never propagates a solver error.
    pub async fn run_cycle(&self) -> CycleOutcome {
        let outcome = self.run_guarded().await;
        self.stats.record(&outcome);
        outcome
    }

    async fn run_guarded(&self) -> CycleOutcome {
        let Some(_guard) = self.lock.try_acquire() else {
            return CycleOutcome::Busy;
        };
        self.stats.started.fetch_add(1, Ordering::Relaxed);

        let state = *self.state.read();
        let Some(mode) = state.mode().filter(|_| state.is_running()) else {
            return CycleOutcome::Stopped;
        };

        match self
            .page
            .visibility(&self.page_config.surface_selector, &self.page_config.hidden_class)
            .await
        {
            Ok(v) if v.is_visible() => {}
            Ok(_) => return CycleOutcome::NoSurface,
            Err(e) => {
                debug!("Surface lookup failed: {}", e);
                return CycleOutcome::NoSurface;
            }
        }

        let Some(solver) = self.solvers.get(mode) else {
            debug!("No solver registered for {}", mode);
            return CycleOutcome::NoProblem;
        };

        let ctx = SolverContext {
            race_mode: state.race_mode(),
            page: self.page.as_ref(),
            input: &self.input,
            events: &self.events,
        };

        let result = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, solver.solve(&ctx))
                .await
                .unwrap_or_else(|_| Err(SolverError::Timeout(limit.as_millis() as u64))),
            None => solver.solve(&ctx).await,
        };

        match result {
            Ok(true) => CycleOutcome::Acted,
            Ok(false) => CycleOutcome::NoProblem,
            Err(e) => {
                let message = e.to_string();
                warn!("{} solver failed: {}", solver.name(), message);
                self.events.log(format!("❌ {}", message));
                CycleOutcome::Failed(message)
            }
        }
    }
}

#[cfg(test)]
#[path = "cycle_tests.rs"]
mod tests;
