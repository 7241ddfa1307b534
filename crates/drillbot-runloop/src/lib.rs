//! # drillbot RunLoop
//!
//! The observer side of drillbot: everything that runs against one live
//! document.
//!
//! ```text
//!   Command ──► AutomationController ──► RunState (authoritative)
//!                   │        │                 └─► KvStore mirror
//!                   │        └─► OverrideBridge ─► style rule / clock bridge
//!                   ▼
//!              CycleScheduler ── tick ──► CycleRunner ── CycleLock
//!                                             │
//!                                             ▼
//!                                  Solver(SolverContext) ──► InputSimulator
//! ```
//!
//! ## Key Components
//!
//! - [`AutomationController`]: command handling, start/stop, rehydration
//! - [`CycleScheduler`]: immediate cycle on start, then a fixed interval
//! - [`CycleRunner`]: single-flight surface check and solver dispatch
//! - [`InputSimulator`]: synthetic clicks and key presses
//! - [`OverrideBridge`]: animation suppression and clock freeze
//! - [`MainWorldClock`]: model of the clock the page sees
//! - [`MemoryPage`]: scripted in-memory page

pub mod clock;
pub mod controller;
pub mod cycle;
pub mod error;
pub mod input;
pub mod lock;
pub mod memory_page;
pub mod overrides;
pub mod scheduler;
pub mod solver_registry;
pub mod solver_script;
pub mod state;

#[cfg(test)]
mod test_support;

pub use clock::{ClockProvider, MainWorldClock, ManualClock, SystemClock, WindowMessageListener};
pub use controller::{AutomationController, ControllerSettings};
pub use cycle::{CycleOutcome, CycleRunner, CycleStats};
pub use error::{RunLoopError, RunLoopResult};
pub use input::InputSimulator;
pub use lock::{CycleGuard, CycleLock};
pub use memory_page::{DispatchedEvent, MemoryPage};
pub use overrides::{
    OverrideBridge, OverrideState, CLOCK_BRIDGE_MARKER, CLOCK_BRIDGE_SOURCE, SKIP_ANIM_CSS,
    SKIP_ANIM_STYLE_ID,
};
pub use scheduler::CycleScheduler;
pub use solver_registry::SolverRegistry;
pub use solver_script::{PlanStep, ScriptSolver, SolvePlan};
pub use state::RunState;
