//! Script-backed solvers.
//!
//! A solver script is the body of an async function evaluated in the observer
//! context with `raceMode` in scope. It reads the page and returns either
//! `null`/`false` (nothing to do) or a plan:
//!
//! ```json
//! {
//!   "acted": true,
//!   "answer": "3/4",
//!   "steps": [
//!     { "type": "click", "selector": "#choice-2" },
//!     { "type": "type", "text": "34" },
//!     { "type": "key", "key": "Enter" },
//!     { "type": "delay", "ms": 50 }
//!   ],
//!   "awaitConfirmation": false,
//!   "confirmationResolved": false
//! }
//! ```
//!
//! Steps run through the [`InputDriver`](drillbot_protocols::InputDriver) in
//! order; the script itself never dispatches input.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use drillbot_protocols::{Event, Solver, SolverContext, SolverError};

use crate::error::{RunLoopError, RunLoopResult};

/// What a solver script asks the core to do.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SolvePlan {
    #[serde(default)]
    pub acted: bool,
    #[serde(default)]
    pub answer: Option<String>,
    #[serde(default)]
    pub steps: Vec<PlanStep>,
    /// The answer is typed and waits for the user to confirm it.
    #[serde(default)]
    pub await_confirmation: bool,
    /// A confirmation requested earlier has been resolved.
    #[serde(default)]
    pub confirmation_resolved: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum PlanStep {
    Click { selector: String },
    Key { key: String },
    /// One key press per character.
    Type { text: String },
    Delay { ms: u64 },
}

impl SolvePlan {
    /// Interpret a script's return value; `None` means nothing to do.
    pub fn from_value(value: Value) -> Result<Option<Self>, SolverError> {
        match value {
            Value::Null | Value::Bool(false) => Ok(None),
            Value::Bool(true) => Ok(Some(SolvePlan {
                acted: true,
                ..Default::default()
            })),
            Value::Object(_) => serde_json::from_value(value)
                .map(Some)
                .map_err(|e| SolverError::InvalidPlan(e.to_string())),
            other => Err(SolverError::InvalidPlan(format!(
                "unexpected script result: {}",
                other
            ))),
        }
    }
}

/// Solver whose page logic lives in a user-supplied script.
pub struct ScriptSolver {
    name: String,
    source: String,
}

impl ScriptSolver {
    pub fn new(name: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            source: source.into(),
        }
    }

    pub fn from_file(name: impl Into<String>, path: &Path) -> RunLoopResult<Self> {
        let source = std::fs::read_to_string(path).map_err(|source| RunLoopError::SolverScript {
            path: path.display().to_string(),
            source,
        })?;
        Ok(Self::new(name, source))
    }

    fn expression(&self, race_mode: bool) -> String {
        format!(
            "(async (raceMode) => {{\n{}\n}})({})",
            self.source, race_mode
        )
    }

    async fn execute(&self, ctx: &SolverContext<'_>, steps: &[PlanStep]) -> Result<(), SolverError> {
        for step in steps {
            match step {
                PlanStep::Click { selector } => {
                    ctx.input.click(selector).await?;
                }
                PlanStep::Key { key } => ctx.input.press_key(key).await?,
                PlanStep::Type { text } => {
                    for c in text.chars() {
                        ctx.input.press_key(&c.to_string()).await?;
                    }
                }
                PlanStep::Delay { ms } => tokio::time::sleep(Duration::from_millis(*ms)).await,
            }
        }
        Ok(())
    }
}

#[async_trait]
impl Solver for ScriptSolver {
    fn name(&self) -> &str {
        &self.name
    }

    async fn solve(&self, ctx: &SolverContext<'_>) -> Result<bool, SolverError> {
        let result = ctx.page.evaluate(&self.expression(ctx.race_mode)).await?;
        let Some(plan) = SolvePlan::from_value(result)? else {
            return Ok(false);
        };

        if plan.confirmation_resolved {
            ctx.events.emit(Event::EnterDone);
        }
        if !plan.acted {
            return Ok(false);
        }

        debug!("{} solver running {} steps", self.name, plan.steps.len());
        self.execute(ctx, &plan.steps).await?;

        if let Some(answer) = plan.answer {
            ctx.events.emit(Event::UpdateAnswer { answer });
        }
        if plan.await_confirmation {
            ctx.events.emit(Event::PressEnter);
        }
        Ok(true)
    }
}

#[cfg(test)]
#[path = "solver_script_tests.rs"]
mod tests;
