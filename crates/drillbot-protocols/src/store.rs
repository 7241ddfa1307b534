//! Durable key-value storage protocol.
//!
//! All contexts share one flat key space of JSON values. The observer only
//! mirrors its run state here; it never owns it.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::StoreError;
use crate::mode::BotMode;

/// Persisted flag names.
pub mod keys {
    pub const IS_RUNNING: &str = "isRunning";
    pub const RACE_MODE: &str = "raceMode";
    pub const BOT_MODE: &str = "botMode";
    pub const SKIP_ANIM: &str = "skipAnim";
    pub const FREEZE_TIMER: &str = "freezeTimer";
    pub const PRIVILEGED_USES: &str = "privilegedUses";
    pub const STEALTH_MODE: &str = "stealthMode";

    /// Flags read whenever an observer or control surface opens.
    pub const FLAGS: [&str; 5] = [IS_RUNNING, RACE_MODE, BOT_MODE, SKIP_ANIM, FREEZE_TIMER];
}

/// Flat durable storage.
#[async_trait]
pub trait KvStore: Send + Sync {
    /// Read a single key.
    async fn get(&self, key: &str) -> Result<Option<Value>, StoreError>;

    /// Write several keys at once.
    async fn set(&self, entries: Vec<(String, Value)>) -> Result<(), StoreError>;

    /// Remove a key; removing an absent key is not an error.
    async fn remove(&self, key: &str) -> Result<(), StoreError>;

    /// Read a boolean flag, treating absent or non-boolean values as false.
    async fn get_bool(&self, key: &str) -> Result<bool, StoreError> {
        Ok(self
            .get(key)
            .await?
            .and_then(|v| v.as_bool())
            .unwrap_or(false))
    }

    /// Read a counter, treating absent values as zero.
    async fn get_u32(&self, key: &str) -> Result<u32, StoreError> {
        Ok(self
            .get(key)
            .await?
            .and_then(|v| v.as_u64())
            .map(|v| v.min(u32::MAX as u64) as u32)
            .unwrap_or(0))
    }

    /// Write a single key.
    async fn set_one(&self, key: &str, value: Value) -> Result<(), StoreError> {
        self.set(vec![(key.to_string(), value)]).await
    }
}

/// Snapshot of the flags every context reads on open.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PersistedFlags {
    pub is_running: bool,
    pub race_mode: bool,
    pub bot_mode: Option<BotMode>,
    pub skip_anim: bool,
    pub freeze_timer: bool,
}

impl PersistedFlags {
    /// Load the flags from a store.
    ///
    /// An unknown `botMode` string reads as absent.
    pub async fn load(store: &dyn KvStore) -> Result<Self, StoreError> {
        let bot_mode = store
            .get(keys::BOT_MODE)
            .await?
            .and_then(|v| v.as_str().and_then(|s| s.parse().ok()));

        Ok(Self {
            is_running: store.get_bool(keys::IS_RUNNING).await?,
            race_mode: store.get_bool(keys::RACE_MODE).await?,
            bot_mode,
            skip_anim: store.get_bool(keys::SKIP_ANIM).await?,
            freeze_timer: store.get_bool(keys::FREEZE_TIMER).await?,
        })
    }

    /// Mode to resume with, if a run was in flight.
    pub fn resumable_mode(&self) -> Option<BotMode> {
        if self.is_running {
            self.bot_mode
        } else {
            None
        }
    }
}
