//! Configuration schema definitions.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

mod schema_host;
mod schema_runtime;

pub use schema_host::*;
pub use schema_runtime::*;

/// Mode names accepted as `[solvers]` keys.
pub const KNOWN_MODES: [&str; 2] = ["equivalent-fractions", "factors-primes"];

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub scheduler: SchedulerConfig,

    #[serde(default)]
    pub input: InputConfig,

    #[serde(default)]
    pub page: PageConfig,

    #[serde(default)]
    pub browser: BrowserConfig,

    #[serde(default)]
    pub store: StoreConfig,

    #[serde(default)]
    pub surface: SurfaceConfig,

    #[serde(default)]
    pub quota: QuotaConfig,

    /// Solver script per mode name (e.g. `equivalent-fractions`).
    #[serde(default)]
    pub solvers: HashMap<String, PathBuf>,

    /// Named main-world scripts gated by the usage quota.
    #[serde(default)]
    pub privileged_actions: Vec<PrivilegedActionConfig>,
}

#[cfg(test)]
#[path = "schema_tests.rs"]
mod tests;
