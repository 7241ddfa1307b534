//! Page overrides: animation suppression and the clock freeze.

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::debug;

use drillbot_protocols::{EventSink, FreezeSignal, ObserverPage, PageError};

/// Id of the injected animation suppression `<style>`.
pub const SKIP_ANIM_STYLE_ID: &str = "drillbot-skip-anim";

/// Zeroes every transition and animation on the page.
pub const SKIP_ANIM_CSS: &str = "* { transition: none !important; animation: none !important; }";

/// DOM dataset marker left by the clock bridge.
pub const CLOCK_BRIDGE_MARKER: &str = "drillbotClockBridge";

/// Main-world script patching `Date.now` and `performance.now`.
pub const CLOCK_BRIDGE_SOURCE: &str = include_str!("clock_bridge.js");

/// Last requested override settings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OverrideState {
    pub animations_suppressed: bool,
    pub clock_frozen: bool,
}

/// Installs and removes page-level overrides.
///
/// Both toggles are idempotent and independent of the run state.
pub struct OverrideBridge {
    page: Arc<dyn ObserverPage>,
    events: EventSink,
    state: Mutex<OverrideState>,
}

impl OverrideBridge {
    pub fn new(page: Arc<dyn ObserverPage>, events: EventSink) -> Self {
        Self {
            page,
            events,
            state: Mutex::new(OverrideState::default()),
        }
    }

    pub fn state(&self) -> OverrideState {
        *self.state.lock()
    }

    /// Install or remove the suppression rule; at most one copy is ever present.
    pub async fn set_animations_suppressed(&self, enabled: bool) -> Result<(), PageError> {
        let present = self.page.has_element(SKIP_ANIM_STYLE_ID).await?;
        if enabled && !present {
            self.page.insert_style(SKIP_ANIM_STYLE_ID, SKIP_ANIM_CSS).await?;
            self.events.log("⚡ Animation Skipper ENABLED");
        } else if !enabled && present {
            self.page.remove_element(SKIP_ANIM_STYLE_ID).await?;
            self.events.log("⚡ Animation Skipper DISABLED");
        }
        self.state.lock().animations_suppressed = enabled;
        Ok(())
    }

    /// Freeze or release the page clock, installing the bridge on first use.
    pub async fn set_clock_frozen(&self, enabled: bool) -> Result<(), PageError> {
        self.ensure_clock_bridge().await?;
        self.page
            .post_window_message(FreezeSignal::new(enabled).to_value())
            .await?;
        self.events.log(if enabled {
            "❄️ Timer Freeze ENABLED"
        } else {
            "❄️ Timer Freeze DISABLED"
        });
        self.state.lock().clock_frozen = enabled;
        Ok(())
    }

    /// Inject the bridge unless this document already has it.
    async fn ensure_clock_bridge(&self) -> Result<bool, PageError> {
        if self.page.has_main_world_marker(CLOCK_BRIDGE_MARKER).await? {
            debug!("Clock bridge already present");
            return Ok(false);
        }
        self.page
            .inject_main_world(CLOCK_BRIDGE_MARKER, CLOCK_BRIDGE_SOURCE)
            .await?;
        self.events.log("💉 Injected freeze script");
        Ok(true)
    }
}

#[cfg(test)]
#[path = "overrides_tests.rs"]
mod tests;
