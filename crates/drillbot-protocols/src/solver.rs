//! Solver protocol definitions.
//!
//! Solvers are external collaborators: the core only decides *when* one runs
//! and what it is handed. A solver inspects the page, enters an answer through
//! the [`InputDriver`], and reports whether it acted on a problem.

use async_trait::async_trait;

use crate::error::{PageError, SolverError};
use crate::message::EventSink;
use crate::page::ObserverPage;

/// Synthetic input available to solvers.
#[async_trait]
pub trait InputDriver: Send + Sync {
    /// Click the first element matching `selector`.
    ///
    /// A missing target is not an error; returns whether it was found.
    async fn click(&self, selector: &str) -> Result<bool, PageError>;

    /// Press and release a single key on the focused element.
    async fn press_key(&self, key: &str) -> Result<(), PageError>;
}

/// Everything a solver receives for one cycle.
pub struct SolverContext<'a> {
    /// Race mode flag, opaque to the core.
    pub race_mode: bool,
    /// Live page handle; re-query it, never cache element state.
    pub page: &'a dyn ObserverPage,
    /// Input simulator.
    pub input: &'a dyn InputDriver,
    /// Event stream towards the control surface.
    pub events: &'a EventSink,
}

/// External problem solver.
#[async_trait]
pub trait Solver: Send + Sync {
    /// Solver name used in logs.
    fn name(&self) -> &str;

    /// Attempt one problem.
    ///
    /// Returns `Ok(true)` when the solver acted, `Ok(false)` when no matching
    /// problem is on screen, and `Err` when it failed.
    async fn solve(&self, ctx: &SolverContext<'_>) -> Result<bool, SolverError>;
}
