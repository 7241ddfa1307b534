//! Script-backed privileged actions.

use std::path::Path;

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use drillbot_protocols::{ObserverPage, PrivilegedAction, SolverError};

/// Result a script returns to report success.
pub const SUCCESS: &str = "SUCCESS";

/// A named script evaluated in the page's main world.
///
/// The script body runs inside an async function; it succeeds by returning
/// `"SUCCESS"`. Any other value, or a thrown exception, is a failure.
pub struct ScriptAction {
    name: String,
    source: String,
}

impl ScriptAction {
    pub fn new(name: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            source: source.into(),
        }
    }

    pub fn from_file(name: impl Into<String>, path: &Path) -> std::io::Result<Self> {
        Ok(Self::new(name, std::fs::read_to_string(path)?))
    }
}

#[async_trait]
impl PrivilegedAction for ScriptAction {
    fn name(&self) -> &str {
        &self.name
    }

    async fn execute(&self, page: &dyn ObserverPage) -> Result<String, SolverError> {
        let expression = format!("(async () => {{\n{}\n}})()", self.source);
        let result = page.evaluate_main_world(&expression).await?;
        debug!("Action {} returned {}", self.name, result);

        match result {
            Value::String(s) if s == SUCCESS => Ok(s),
            Value::String(s) => Err(SolverError::Failed(s)),
            Value::Null => Err(SolverError::Failed(format!("{} returned nothing", self.name))),
            other => Err(SolverError::Failed(other.to_string())),
        }
    }
}
