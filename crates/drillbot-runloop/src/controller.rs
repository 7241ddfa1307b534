//! Automation controller: owns the run state and answers commands.

use std::sync::Arc;

use parking_lot::RwLock;
use serde_json::{json, Value};
use tracing::{debug, warn};

use drillbot_config::{Config, InputConfig, PageConfig, SchedulerConfig};
use drillbot_protocols::{
    keys, Ack, BotMode, Command, EventSink, KvStore, ObserverPage, PageError, PersistedFlags,
};

use crate::cycle::CycleRunner;
use crate::error::{RunLoopError, RunLoopResult};
use crate::input::InputSimulator;
use crate::overrides::{OverrideBridge, OverrideState};
use crate::scheduler::CycleScheduler;
use crate::solver_registry::SolverRegistry;
use crate::state::RunState;

/// Runtime knobs the controller is built from.
#[derive(Debug, Clone, Default)]
pub struct ControllerSettings {
    pub scheduler: SchedulerConfig,
    pub input: InputConfig,
    pub page: PageConfig,
}

impl From<&Config> for ControllerSettings {
    fn from(config: &Config) -> Self {
        Self {
            scheduler: config.scheduler.clone(),
            input: config.input.clone(),
            page: config.page.clone(),
        }
    }
}

fn race_suffix(race_mode: bool) -> &'static str {
    if race_mode { " (Race Mode 🏁)" } else { "" }
}

/// Per-document controller living in the observer context.
///
/// Its in-memory [`RunState`] is authoritative for the document; the durable
/// store only mirrors it so that a fresh document can resume.
pub struct AutomationController {
    state: Arc<RwLock<RunState>>,
    runner: Arc<CycleRunner>,
    scheduler: CycleScheduler,
    overrides: OverrideBridge,
    store: Arc<dyn KvStore>,
    events: EventSink,
}

impl AutomationController {
    pub fn new(
        page: Arc<dyn ObserverPage>,
        store: Arc<dyn KvStore>,
        solvers: SolverRegistry,
        events: EventSink,
        settings: &ControllerSettings,
    ) -> Self {
        let state = Arc::new(RwLock::new(RunState::idle()));
        let runner = Arc::new(CycleRunner::new(
            page.clone(),
            InputSimulator::new(page.clone(), &settings.input),
            solvers,
            events.clone(),
            state.clone(),
            settings.page.clone(),
            settings.scheduler.cycle_timeout(),
        ));
        let scheduler = CycleScheduler::new(runner.clone(), settings.scheduler.interval());
        let overrides = OverrideBridge::new(page, events.clone());

        Self {
            state,
            runner,
            scheduler,
            overrides,
            store,
            events,
        }
    }

    /// Build a controller and resume whatever the durable mirror says.
    pub async fn initialize(
        page: Arc<dyn ObserverPage>,
        store: Arc<dyn KvStore>,
        solvers: SolverRegistry,
        events: EventSink,
        settings: &ControllerSettings,
    ) -> Self {
        let controller = Self::new(page, store, solvers, events, settings);
        if let Err(e) = controller.rehydrate().await {
            warn!("Failed to restore persisted state: {}", e);
        }
        controller
    }

    /// Resume a persisted run and re-apply persisted overrides.
    pub async fn rehydrate(&self) -> RunLoopResult<()> {
        let flags = PersistedFlags::load(self.store.as_ref()).await?;

        if let Some(mode) = flags.resumable_mode() {
            *self.state.write() = RunState::running(mode, flags.race_mode);
            self.events.log(format!(
                "🔄 Resuming: {} Mode{}",
                mode.label(),
                race_suffix(flags.race_mode)
            ));
            self.scheduler.start();
        }

        if flags.skip_anim {
            if let Err(e) = self.overrides.set_animations_suppressed(true).await {
                warn!("Failed to re-apply animation skipper: {}", e);
            }
        }
        if flags.freeze_timer {
            if let Err(e) = self.overrides.set_clock_frozen(true).await {
                warn!("Failed to re-apply timer freeze: {}", e);
            }
        }
        Ok(())
    }

    /// Apply a command against the current state and produce its single reply.
    pub async fn handle(&self, command: Command) -> Ack {
        debug!("Handling {} in state {}", command.name(), self.run_state());
        match command {
            Command::Start { mode, race_mode } => match self.start(mode, race_mode).await {
                Ok(()) => Ack::ok(),
                Err(e) => Ack::rejected(e.to_string()),
            },
            Command::Stop => {
                self.stop().await;
                Ack::ok()
            }
            Command::ToggleSkipAnim { enabled } => {
                Self::toggle_ack(self.overrides.set_animations_suppressed(enabled).await)
            }
            Command::ToggleFreezeTimer { enabled } => {
                Self::toggle_ack(self.overrides.set_clock_frozen(enabled).await)
            }
        }
    }

    /// Enter (or re-enter) the running state and restart the schedule.
    pub async fn start(&self, mode: Option<BotMode>, race_mode: bool) -> RunLoopResult<()> {
        let mode = mode.ok_or(RunLoopError::NoModeSelected)?;

        *self.state.write() = RunState::running(mode, race_mode);
        self.mirror(vec![
            (keys::IS_RUNNING, json!(true)),
            (keys::BOT_MODE, json!(mode.as_str())),
            (keys::RACE_MODE, json!(race_mode)),
        ])
        .await;

        self.events.log(format!(
            "Bot started: {} Mode{}",
            mode.label(),
            race_suffix(race_mode)
        ));
        self.scheduler.start();
        Ok(())
    }

    /// Leave the running state. Safe to call when already idle.
    pub async fn stop(&self) {
        *self.state.write() = RunState::idle();
        self.scheduler.stop();

        self.mirror(vec![(keys::IS_RUNNING, json!(false))]).await;
        if let Err(e) = self.store.remove(keys::BOT_MODE).await {
            warn!("Failed to clear {}: {}", keys::BOT_MODE, e);
        }

        self.events.log("Bot stopped");
    }

    /// Stop ticking without touching the durable mirror, used when the document goes away.
    pub fn shutdown(&self) {
        self.scheduler.stop();
    }

    pub fn run_state(&self) -> RunState {
        *self.state.read()
    }

    pub fn overrides(&self) -> OverrideState {
        self.overrides.state()
    }

    pub fn is_scheduled(&self) -> bool {
        self.scheduler.is_armed()
    }

    pub fn runner(&self) -> &Arc<CycleRunner> {
        &self.runner
    }

    async fn mirror(&self, entries: Vec<(&str, Value)>) {
        let entries = entries
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect();
        if let Err(e) = self.store.set(entries).await {
            warn!("Failed to mirror run state: {}", e);
        }
    }

    fn toggle_ack(result: Result<(), PageError>) -> Ack {
        match result {
            Ok(()) => Ack::ok(),
            Err(e) => {
                warn!("Override toggle failed: {}", e);
                Ack::rejected(e.to_string())
            }
        }
    }
}

#[cfg(test)]
#[path = "controller_tests.rs"]
mod tests;
