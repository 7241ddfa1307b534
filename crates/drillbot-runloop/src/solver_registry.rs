//! Solver lookup by mode.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use tracing::info;

use drillbot_protocols::{BotMode, Solver};

use crate::error::{RunLoopError, RunLoopResult};
use crate::solver_script::ScriptSolver;

/// Maps each mode to the solver invoked for it.
#[derive(Clone, Default)]
pub struct SolverRegistry {
    solvers: HashMap<BotMode, Arc<dyn Solver>>,
}

impl SolverRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, mode: BotMode, solver: Arc<dyn Solver>) {
        self.solvers.insert(mode, solver);
    }

    /// Builder-style [`register`](Self::register).
    pub fn with(mut self, mode: BotMode, solver: Arc<dyn Solver>) -> Self {
        self.register(mode, solver);
        self
    }

    pub fn get(&self, mode: BotMode) -> Option<Arc<dyn Solver>> {
        self.solvers.get(&mode).cloned()
    }

    pub fn modes(&self) -> Vec<BotMode> {
        BotMode::ALL
            .iter()
            .copied()
            .filter(|m| self.solvers.contains_key(m))
            .collect()
    }

    /// Load one [`ScriptSolver`] per configured mode.
    pub fn from_scripts(scripts: &HashMap<String, PathBuf>) -> RunLoopResult<Self> {
        let mut registry = Self::new();
        for (name, path) in scripts {
            let mode: BotMode = name
                .parse()
                .map_err(|_| RunLoopError::UnknownMode(name.clone()))?;
            let solver = ScriptSolver::from_file(mode.as_str(), path)?;
            info!("Loaded {} solver from {:?}", mode.label(), path);
            registry.register(mode, Arc::new(solver));
        }
        Ok(registry)
    }
}
