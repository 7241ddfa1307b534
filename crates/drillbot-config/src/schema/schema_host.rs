//! Host process configuration: browser attachment, storage, control surface.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Browser (CDP) attachment configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrowserConfig {
    /// Chrome remote debugging endpoint.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Attach to the first page whose URL contains this string.
    #[serde(default)]
    pub url_contains: Option<String>,

    /// How often the host checks whether the observed document changed.
    #[serde(default = "default_navigation_poll_ms")]
    pub navigation_poll_ms: u64,
}

fn default_endpoint() -> String {
    "http://localhost:9222".to_string()
}

fn default_navigation_poll_ms() -> u64 {
    1000
}

impl BrowserConfig {
    pub fn navigation_poll(&self) -> Duration {
        Duration::from_millis(self.navigation_poll_ms)
    }
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            url_contains: None,
            navigation_poll_ms: default_navigation_poll_ms(),
        }
    }
}

/// Durable flag storage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default = "default_store_path")]
    pub path: String,
}

fn default_store_path() -> String {
    "~/.drillbot/state.json".to_string()
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: default_store_path(),
        }
    }
}

/// Control surface configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SurfaceConfig {
    /// Log lines kept, most recent first.
    #[serde(default = "default_log_capacity")]
    pub log_capacity: usize,

    /// How long a command waits for its acknowledgement.
    #[serde(default = "default_command_timeout_ms")]
    pub command_timeout_ms: u64,
}

fn default_log_capacity() -> usize {
    30
}

fn default_command_timeout_ms() -> u64 {
    5000
}

impl SurfaceConfig {
    pub fn command_timeout(&self) -> Duration {
        Duration::from_millis(self.command_timeout_ms)
    }
}

impl Default for SurfaceConfig {
    fn default() -> Self {
        Self {
            log_capacity: default_log_capacity(),
            command_timeout_ms: default_command_timeout_ms(),
        }
    }
}

/// Usage quota for privileged actions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuotaConfig {
    #[serde(default = "default_max_uses")]
    pub max_uses: u32,
}

fn default_max_uses() -> u32 {
    5
}

impl Default for QuotaConfig {
    fn default() -> Self {
        Self {
            max_uses: default_max_uses(),
        }
    }
}

/// A named main-world script.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrivilegedActionConfig {
    pub name: String,
    pub script: PathBuf,
}
