//! Control surface state machine.
//!
//! Mirrors what a settings popup shows: a running badge, mode selection that
//! is locked while running, toggles, the last answer, an enter prompt, an
//! error panel and a capped log. It owns no automation state; the observer's
//! controller is authoritative and this view is optimistic.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::json;
use tracing::{debug, warn};

use drillbot_protocols::{
    keys, BotMode, Command, Event, KvStore, ObserverPage, PersistedFlags, PrivilegedAction,
    QuotaError, StoreError,
};

use crate::coordinator::Coordinator;
use crate::log_panel::LogPanel;
use crate::quota::UsageQuota;

/// Error panel text shown when the observer can't be reached.
pub const UNREACHABLE_MESSAGE: &str = "Could not reach content script. Check page.";

/// What the surface currently displays.
#[derive(Debug, Clone)]
pub struct SurfaceView {
    pub running: bool,
    pub selected_mode: Option<BotMode>,
    pub race_mode: bool,
    pub skip_anim: bool,
    pub freeze_timer: bool,
    pub stealth_mode: bool,
    pub last_answer: Option<String>,
    pub enter_prompt: bool,
    pub error: Option<String>,
}

impl SurfaceView {
    /// The start/stop control is enabled while running, or once a mode is picked.
    pub fn can_toggle(&self) -> bool {
        self.running || self.selected_mode.is_some()
    }

    pub fn badge(&self) -> &'static str {
        if self.running { "Running" } else { "Stopped" }
    }
}

pub struct ControlSurface {
    coordinator: Arc<Coordinator>,
    store: Arc<dyn KvStore>,
    page: Arc<dyn ObserverPage>,
    quota: UsageQuota,
    actions: HashMap<String, Arc<dyn PrivilegedAction>>,
    view: SurfaceView,
    log: LogPanel,
}

impl ControlSurface {
    /// Open the surface, restoring toggles and a running session from the store.
    pub async fn open(
        coordinator: Arc<Coordinator>,
        page: Arc<dyn ObserverPage>,
        quota: UsageQuota,
        log_capacity: usize,
    ) -> Result<Self, StoreError> {
        let store = coordinator.store();
        let flags = PersistedFlags::load(store.as_ref()).await?;
        let stealth_mode = store.get_bool(keys::STEALTH_MODE).await?;

        let resumed = flags.resumable_mode();
        let view = SurfaceView {
            running: resumed.is_some(),
            selected_mode: resumed,
            race_mode: flags.race_mode,
            skip_anim: flags.skip_anim,
            freeze_timer: flags.freeze_timer,
            stealth_mode,
            last_answer: None,
            enter_prompt: false,
            error: None,
        };

        Ok(Self {
            coordinator,
            store,
            page,
            quota,
            actions: HashMap::new(),
            view,
            log: LogPanel::new(log_capacity),
        })
    }

    pub fn register_action(&mut self, action: Arc<dyn PrivilegedAction>) {
        self.actions.insert(action.name().to_string(), action);
    }

    pub fn action_names(&self) -> Vec<&str> {
        let mut names: Vec<_> = self.actions.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn view(&self) -> &SurfaceView {
        &self.view
    }

    pub fn log(&self) -> &LogPanel {
        &self.log
    }

    pub fn quota(&self) -> &UsageQuota {
        &self.quota
    }

    fn add_log(&mut self, message: &str) {
        self.log.push(message);
    }

    fn set_running(&mut self, running: bool) {
        self.view.running = running;
        if !running {
            self.view.enter_prompt = false;
        }
    }

    async fn persist(&self, entries: Vec<(&str, serde_json::Value)>) {
        let entries = entries
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect();
        if let Err(e) = self.store.set(entries).await {
            warn!("Failed to persist surface state: {}", e);
        }
    }

    /// Pick a mode; ignored while running.
    pub fn select_mode(&mut self, mode: BotMode) -> bool {
        if self.view.running {
            return false;
        }
        self.view.selected_mode = Some(mode);
        true
    }

    /// Start or stop, optimistically, rolling back if the observer is unreachable.
    pub async fn toggle_running(&mut self) {
        if !self.view.can_toggle() {
            return;
        }
        self.view.error = None;
        let starting = !self.view.running;

        if starting {
            let mut entries = vec![(keys::IS_RUNNING, json!(true))];
            if let Some(mode) = self.view.selected_mode {
                entries.push((keys::BOT_MODE, json!(mode.as_str())));
            }
            self.persist(entries).await;
        } else {
            if let Err(e) = self.store.remove(keys::BOT_MODE).await {
                warn!("Failed to clear {}: {}", keys::BOT_MODE, e);
            }
            self.persist(vec![(keys::IS_RUNNING, json!(false))]).await;
        }
        self.set_running(starting);
        self.add_log(if starting { "Starting bot..." } else { "Stopping bot..." });

        let command = if starting {
            Command::Start {
                mode: self.view.selected_mode,
                race_mode: self.view.race_mode,
            }
        } else {
            Command::Stop
        };

        match self.coordinator.send_command(command).await {
            Ok(ack) if ack.success => {
                self.add_log(if starting { "Bot started ✅" } else { "Bot stopped 🛑" });
            }
            Ok(ack) => {
                let reason = ack.error.unwrap_or_else(|| "Command rejected".to_string());
                self.add_log(&format!("Error: {}", reason));
                self.view.error = Some(reason);
                self.rollback().await;
            }
            Err(e) => {
                self.add_log(&format!("Error: {}", e));
                self.view.error = Some(UNREACHABLE_MESSAGE.to_string());
                self.rollback().await;
            }
        }
    }

    async fn rollback(&mut self) {
        self.set_running(false);
        if let Err(e) = self.store.remove(keys::BOT_MODE).await {
            warn!("Failed to clear {}: {}", keys::BOT_MODE, e);
        }
        self.persist(vec![(keys::IS_RUNNING, json!(false))]).await;
    }

    pub async fn set_race_mode(&mut self, enabled: bool) {
        self.view.race_mode = enabled;
        self.persist(vec![(keys::RACE_MODE, json!(enabled))]).await;
        self.add_log(if enabled { "🏁 Race Mode ON" } else { "🏁 Race Mode OFF" });
    }

    pub async fn set_skip_anim(&mut self, enabled: bool) {
        self.view.skip_anim = enabled;
        self.persist(vec![(keys::SKIP_ANIM, json!(enabled))]).await;
        self.add_log(if enabled {
            "⚡ Animation Skipper ON"
        } else {
            "⚡ Animation Skipper OFF"
        });
        self.notify(Command::ToggleSkipAnim { enabled }).await;
    }

    pub async fn set_freeze_timer(&mut self, enabled: bool) {
        self.view.freeze_timer = enabled;
        self.persist(vec![(keys::FREEZE_TIMER, json!(enabled))]).await;
        self.add_log(if enabled {
            "❄️ Timer Freeze ON"
        } else {
            "❄️ Timer Freeze OFF"
        });
        self.notify(Command::ToggleFreezeTimer { enabled }).await;
    }

    /// Flip the persisted stealth flag.
    pub async fn toggle_stealth(&mut self) -> bool {
        let enabled = !self.view.stealth_mode;
        self.view.stealth_mode = enabled;
        self.persist(vec![(keys::STEALTH_MODE, json!(enabled))]).await;
        self.add_log(if enabled {
            "🥷 Stealth Mode: ON"
        } else {
            "🥷 Stealth Mode: OFF"
        });
        enabled
    }

    /// Toggles are fire-and-forget: the persisted flag is re-applied on the next document.
    async fn notify(&self, command: Command) {
        let name = command.name();
        match self.coordinator.send_command(command).await {
            Ok(ack) if !ack.success => debug!("{} rejected: {:?}", name, ack.error),
            Ok(_) => {}
            Err(e) => debug!("{} not delivered: {}", name, e),
        }
    }

    /// Render an observer event.
    pub fn handle_event(&mut self, event: Event) {
        match event {
            Event::UpdateAnswer { answer } => {
                self.add_log(&format!("Answer: {}", answer));
                self.view.last_answer = Some(answer);
            }
            Event::PressEnter => {
                self.view.enter_prompt = true;
                self.add_log("🏁 Answer typed, press ENTER!");
            }
            Event::EnterDone => {
                self.view.enter_prompt = false;
            }
            Event::Error { message } => {
                self.add_log(&format!("Error: {}", message));
                self.view.error = Some(message);
            }
            Event::Log { message } => self.add_log(&message),
        }
    }

    /// Run a registered privileged action through the usage quota.
    pub async fn run_privileged(&mut self, name: &str) -> Result<String, QuotaError> {
        let Some(action) = self.actions.get(name).cloned() else {
            let message = format!("Unknown action: {}", name);
            self.add_log(&format!("❌ {}", message));
            return Err(QuotaError::ActionFailed(
                drillbot_protocols::SolverError::Failed(message),
            ));
        };

        self.add_log(&format!("⏩ Running {}...", name));
        let page = self.page.clone();
        let result = self
            .quota
            .run(|| async move { action.execute(page.as_ref()).await })
            .await;

        match &result {
            Ok(output) => self.add_log(&format!("✅ {}: {}", name, output)),
            Err(QuotaError::Exhausted { .. }) => {
                self.add_log(&format!("{} unavailable: usage limit reached", name));
            }
            Err(e) => {
                self.add_log(&format!("❌ Error: {}", e));
                self.view.error = Some(e.to_string());
            }
        }
        result
    }

    pub async fn quota_remaining(&self) -> u32 {
        match self.quota.remaining().await {
            Ok(remaining) => remaining,
            Err(e) => {
                warn!("Failed to read quota: {}", e);
                0
            }
        }
    }
}

#[cfg(test)]
#[path = "surface_tests.rs"]
mod tests;
