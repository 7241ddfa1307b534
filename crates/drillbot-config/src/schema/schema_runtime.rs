//! Observer runtime configuration: polling, input timing, page selectors.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Cycle scheduler configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Poll period between cycles.
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,

    /// Upper bound on a single solver call. Unset means no bound.
    #[serde(default)]
    pub cycle_timeout_ms: Option<u64>,
}

fn default_interval_ms() -> u64 {
    700
}

impl SchedulerConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    pub fn cycle_timeout(&self) -> Option<Duration> {
        self.cycle_timeout_ms.map(Duration::from_millis)
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_interval_ms(),
            cycle_timeout_ms: None,
        }
    }
}

/// Input simulator timing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputConfig {
    /// Wait after a click before handing control back to the solver.
    #[serde(default = "default_click_settle_ms")]
    pub click_settle_ms: u64,

    /// Delay between keydown and keyup.
    #[serde(default = "default_key_release_ms")]
    pub key_release_ms: u64,
}

fn default_click_settle_ms() -> u64 {
    30
}

fn default_key_release_ms() -> u64 {
    20
}

impl InputConfig {
    pub fn click_settle(&self) -> Duration {
        Duration::from_millis(self.click_settle_ms)
    }

    pub fn key_release(&self) -> Duration {
        Duration::from_millis(self.key_release_ms)
    }
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            click_settle_ms: default_click_settle_ms(),
            key_release_ms: default_key_release_ms(),
        }
    }
}

/// Host page selectors.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageConfig {
    /// Element that is shown while a problem is on screen.
    #[serde(default = "default_surface_selector")]
    pub surface_selector: String,

    /// Class the host page uses to hide the surface between problems.
    #[serde(default = "default_hidden_class")]
    pub hidden_class: String,
}

fn default_surface_selector() -> String {
    "playing-screen".to_string()
}

fn default_hidden_class() -> String {
    "hidden".to_string()
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            surface_selector: default_surface_selector(),
            hidden_class: default_hidden_class(),
        }
    }
}
