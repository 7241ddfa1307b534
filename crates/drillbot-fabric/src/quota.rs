//! Bounded-use quota for privileged actions.

use std::future::Future;
use std::sync::Arc;

use serde_json::json;
use tokio::sync::Mutex;
use tracing::{info, warn};

use drillbot_protocols::{keys, KvStore, QuotaError, SolverError, StoreError};

/// Persisted use counter with a fixed cap.
///
/// Only successful actions consume a use. The core never resets the counter;
/// [`reset`](Self::reset) exists for the administrative CLI command.
pub struct UsageQuota {
    store: Arc<dyn KvStore>,
    max_uses: u32,
    gate: Mutex<()>,
}

impl UsageQuota {
    pub fn new(store: Arc<dyn KvStore>, max_uses: u32) -> Self {
        Self {
            store,
            max_uses,
            gate: Mutex::new(()),
        }
    }

    pub fn max_uses(&self) -> u32 {
        self.max_uses
    }

    pub async fn used(&self) -> Result<u32, StoreError> {
        self.store.get_u32(keys::PRIVILEGED_USES).await
    }

    pub async fn remaining(&self) -> Result<u32, StoreError> {
        Ok(self.max_uses.saturating_sub(self.used().await?))
    }

    /// Run `action` if a use is left, consuming one on success.
    ///
    /// At zero remaining the action is never invoked.
    pub async fn run<F, Fut>(&self, action: F) -> Result<String, QuotaError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<String, SolverError>>,
    {
        let _gate = self.gate.lock().await;

        let used = self.used().await?;
        if used >= self.max_uses {
            return Err(QuotaError::Exhausted {
                max: self.max_uses,
            });
        }

        let output = action().await?;

        self.store
            .set_one(keys::PRIVILEGED_USES, json!(used + 1))
            .await?;
        info!("Privileged use {}/{} consumed", used + 1, self.max_uses);
        Ok(output)
    }

    /// Administrative reset of the counter.
    pub async fn reset(&self) -> Result<(), StoreError> {
        let _gate = self.gate.lock().await;
        self.store.set_one(keys::PRIVILEGED_USES, json!(0)).await?;
        warn!("Privileged use counter reset");
        Ok(())
    }
}
