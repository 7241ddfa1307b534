//! Cross-context message definitions.
//!
//! Every message is a tagged union keyed by `action`, matching the JSON the
//! control surface and observer exchange:
//!
//! - **Command**: control surface -> observer, answered by exactly one [`Ack`]
//! - **Event**: observer -> control surface, fire-and-forget

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::{debug, info};

use crate::mode::BotMode;

/// Command delivered into the observer context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum Command {
    /// Begin automation in the given mode.
    Start {
        /// Selected mode; a start without a mode is rejected.
        #[serde(default)]
        mode: Option<BotMode>,
        /// Race mode flag, opaque to the core.
        #[serde(rename = "raceMode", default)]
        race_mode: bool,
    },
    /// Stop automation.
    Stop,
    /// Install or remove the animation suppression rule.
    ToggleSkipAnim { enabled: bool },
    /// Freeze or unfreeze the page clock.
    ToggleFreezeTimer { enabled: bool },
}

impl Command {
    /// Short name used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            Command::Start { .. } => "start",
            Command::Stop => "stop",
            Command::ToggleSkipAnim { .. } => "toggleSkipAnim",
            Command::ToggleFreezeTimer { .. } => "toggleFreezeTimer",
        }
    }
}

/// Single acknowledgement returned for every command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ack {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Ack {
    /// Successful acknowledgement.
    pub fn ok() -> Self {
        Self {
            success: true,
            error: None,
        }
    }

    /// Rejected command with a reason.
    pub fn rejected(reason: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(reason.into()),
        }
    }
}

/// Notification emitted by the observer context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum Event {
    /// Free-form log line.
    Log { message: String },
    /// The answer a solver just entered.
    UpdateAnswer { answer: String },
    /// The answer is typed and the user must confirm it.
    PressEnter,
    /// The pending confirmation was resolved.
    EnterDone,
    /// User-visible error.
    Error { message: String },
}

/// Sending half of the observer's event stream.
///
/// Delivery is best effort: with no subscriber attached the event is dropped,
/// the same way a log line is lost when no control surface is open.
#[derive(Debug, Clone)]
pub struct EventSink {
    tx: broadcast::Sender<Event>,
}

impl EventSink {
    /// Wrap an existing broadcast sender.
    pub fn new(tx: broadcast::Sender<Event>) -> Self {
        Self { tx }
    }

    /// Create a sink with its own channel.
    pub fn channel(capacity: usize) -> (Self, broadcast::Receiver<Event>) {
        let (tx, rx) = broadcast::channel(capacity);
        (Self { tx }, rx)
    }

    /// Subscribe to events sent through this sink.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.tx.subscribe()
    }

    /// Emit an event.
    pub fn emit(&self, event: Event) {
        if self.tx.send(event).is_err() {
            debug!("No event subscribers attached");
        }
    }

    /// Log locally and forward the line to the control surface.
    pub fn log(&self, message: impl Into<String>) {
        let message = message.into();
        info!(target: "drillbot", "{}", message);
        self.emit(Event::Log { message });
    }

    /// Emit a user-visible error.
    pub fn error(&self, message: impl Into<String>) {
        self.emit(Event::Error {
            message: message.into(),
        });
    }
}

#[cfg(test)]
#[path = "message_tests.rs"]
mod tests;
