//! Run state of the observer.

use std::fmt;

use drillbot_protocols::BotMode;

/// Whether automation is active, and in which mode.
///
/// A running state always carries a mode; the fields are private so that
/// invariant can't be broken from outside.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RunState {
    running: bool,
    race_mode: bool,
    mode: Option<BotMode>,
}

impl RunState {
    /// Not running, no mode.
    pub fn idle() -> Self {
        Self::default()
    }

    /// Running in `mode`.
    pub fn running(mode: BotMode, race_mode: bool) -> Self {
        Self {
            running: true,
            race_mode,
            mode: Some(mode),
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn race_mode(&self) -> bool {
        self.race_mode
    }

    /// Active mode; always `Some` while running.
    pub fn mode(&self) -> Option<BotMode> {
        self.mode
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.running, self.mode) {
            (true, Some(mode)) if self.race_mode => write!(f, "running ({}, race)", mode.label()),
            (true, Some(mode)) => write!(f, "running ({})", mode.label()),
            _ => write!(f, "idle"),
        }
    }
}
