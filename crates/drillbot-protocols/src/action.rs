//! Privileged one-shot actions.
//!
//! A privileged action is a fire-and-forget effect executed in the page's main
//! world. The core only gates it behind the usage quota; what it does is an
//! external concern.

use async_trait::async_trait;

use crate::error::SolverError;
use crate::page::ObserverPage;

#[async_trait]
pub trait PrivilegedAction: Send + Sync {
    /// Action name shown in the control surface.
    fn name(&self) -> &str;

    /// Run the action. `Ok` counts against the quota, `Err` does not.
    async fn execute(&self, page: &dyn ObserverPage) -> Result<String, SolverError>;
}
