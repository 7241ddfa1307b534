//! Shared fakes for unit tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::RwLock;

use drillbot_config::{InputConfig, PageConfig};
use drillbot_protocols::{EventSink, Solver, SolverContext, SolverError, Visibility};

use crate::cycle::CycleRunner;
use crate::input::InputSimulator;
use crate::memory_page::MemoryPage;
use crate::solver_registry::SolverRegistry;
use crate::state::RunState;

#[derive(Clone, Copy)]
pub enum Behavior {
    Act,
    Idle,
    Fail,
    Slow(Duration),
}

/// Solver with fixed behaviour that counts its calls.
pub struct FakeSolver {
    behavior: Behavior,
    calls: AtomicUsize,
}

impl FakeSolver {
    pub fn new(behavior: Behavior) -> Arc<Self> {
        Arc::new(Self {
            behavior,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Solver for FakeSolver {
    fn name(&self) -> &str {
        "fake"
    }

    async fn solve(&self, _ctx: &SolverContext<'_>) -> Result<bool, SolverError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.behavior {
            Behavior::Act => Ok(true),
            Behavior::Idle => Ok(false),
            Behavior::Fail => Err(SolverError::Failed("Could not parse problem".to_string())),
            Behavior::Slow(d) => {
                tokio::time::sleep(d).await;
                Ok(true)
            }
        }
    }
}

/// Page with the default play surface shown.
pub fn visible_page() -> Arc<MemoryPage> {
    let page = MemoryPage::new();
    page.set_visibility(&PageConfig::default().surface_selector, Visibility::Visible);
    page
}

pub fn runner(
    page: Arc<MemoryPage>,
    solvers: SolverRegistry,
    state: RunState,
    events: EventSink,
    timeout: Option<Duration>,
) -> (Arc<CycleRunner>, Arc<RwLock<RunState>>) {
    let state = Arc::new(RwLock::new(state));
    let runner = CycleRunner::new(
        page.clone(),
        InputSimulator::new(page, &InputConfig::default()),
        solvers,
        events,
        state.clone(),
        PageConfig::default(),
        timeout,
    );
    (Arc::new(runner), state)
}
