//! Main-world clock model.
//!
//! The page reads time through `Date.now()` and `performance.now()`. While a
//! freeze is active both return the values captured when it began; otherwise
//! they pass through to the real clock. [`MainWorldClock`] is the Rust model of
//! the injected bridge and is what tests and the in-memory page drive.

use std::time::{Instant, SystemTime, UNIX_EPOCH};

use parking_lot::Mutex;
use serde_json::Value;
use tracing::debug;

use drillbot_protocols::{ClockReading, ClockSource, FreezeSignal};

/// Clock backed by the host's system time.
#[derive(Debug)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl ClockSource for SystemClock {
    fn wall_ms(&self) -> f64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs_f64() * 1000.0)
            .unwrap_or(0.0)
    }

    fn monotonic_ms(&self) -> f64 {
        self.origin.elapsed().as_secs_f64() * 1000.0
    }
}

/// Hand-driven clock for tests.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: Mutex<ClockReadingCell>,
}

#[derive(Debug, Default, Clone, Copy)]
struct ClockReadingCell {
    wall_ms: f64,
    monotonic_ms: f64,
}

impl ManualClock {
    pub fn new(wall_ms: f64) -> Self {
        Self {
            now: Mutex::new(ClockReadingCell {
                wall_ms,
                monotonic_ms: 0.0,
            }),
        }
    }

    /// Move both clocks forward.
    pub fn advance_ms(&self, ms: f64) {
        let mut now = self.now.lock();
        now.wall_ms += ms;
        now.monotonic_ms += ms;
    }
}

impl ClockSource for ManualClock {
    fn wall_ms(&self) -> f64 {
        self.now.lock().wall_ms
    }

    fn monotonic_ms(&self) -> f64 {
        self.now.lock().monotonic_ms
    }
}

/// Which clock page code observes.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum ClockProvider {
    /// Real clock.
    #[default]
    Passthrough,
    /// Constant snapshot taken when the freeze began.
    Frozen(ClockReading),
}

impl ClockProvider {
    pub fn is_frozen(&self) -> bool {
        matches!(self, ClockProvider::Frozen(_))
    }

    pub fn read(&self, real: &dyn ClockSource) -> ClockReading {
        match self {
            ClockProvider::Passthrough => real.read(),
            ClockProvider::Frozen(snapshot) => *snapshot,
        }
    }
}

/// Receives page-visible window messages.
pub trait WindowMessageListener: Send + Sync {
    fn on_message(&self, data: &Value);
}

/// Clock as seen from the page's main world once the bridge is installed.
pub struct MainWorldClock<C: ClockSource> {
    real: C,
    provider: Mutex<ClockProvider>,
}

impl<C: ClockSource> MainWorldClock<C> {
    pub fn new(real: C) -> Self {
        Self {
            real,
            provider: Mutex::new(ClockProvider::Passthrough),
        }
    }

    /// Underlying real clock.
    pub fn source(&self) -> &C {
        &self.real
    }

    /// Apply a window message; returns whether it was a freeze signal.
    pub fn handle_window_message(&self, data: &Value) -> bool {
        match FreezeSignal::parse(data) {
            Some(signal) => {
                if signal.enabled {
                    self.freeze();
                } else {
                    self.unfreeze();
                }
                true
            }
            None => false,
        }
    }

    /// Capture a snapshot; a second freeze keeps the original snapshot.
    pub fn freeze(&self) {
        let mut provider = self.provider.lock();
        if !provider.is_frozen() {
            let snapshot = self.real.read();
            debug!(
                "Clock frozen at wall={} monotonic={}",
                snapshot.wall_ms, snapshot.monotonic_ms
            );
            *provider = ClockProvider::Frozen(snapshot);
        }
    }

    pub fn unfreeze(&self) {
        *self.provider.lock() = ClockProvider::Passthrough;
    }

    pub fn is_frozen(&self) -> bool {
        self.provider.lock().is_frozen()
    }

    pub fn provider(&self) -> ClockProvider {
        *self.provider.lock()
    }

    /// `Date.now()`
    pub fn date_now(&self) -> f64 {
        self.provider.lock().read(&self.real).wall_ms
    }

    /// `performance.now()`
    pub fn performance_now(&self) -> f64 {
        self.provider.lock().read(&self.real).monotonic_ms
    }
}

impl<C: ClockSource> WindowMessageListener for MainWorldClock<C> {
    fn on_message(&self, data: &Value) {
        self.handle_window_message(data);
    }
}

#[cfg(test)]
#[path = "clock_tests.rs"]
mod tests;
