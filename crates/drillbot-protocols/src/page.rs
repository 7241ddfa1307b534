//! Page access protocol definitions.
//!
//! The observer runs in an isolated context: it shares the page's DOM but not
//! its global objects. Everything that needs the page's own globals (clock
//! patching, page API calls) goes through the explicit main-world entry points
//! on [`ObserverPage`].

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::PageError;

/// Type tag of the page-visible window message consumed by the clock bridge.
pub const FREEZE_MESSAGE_TYPE: &str = "DRILLBOT_FREEZE_TIMER";

/// Visibility of an element looked up by selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    /// No element matches the selector.
    Absent,
    /// Element exists but carries the hidden class or `display: none`.
    Hidden,
    /// Element is displayed.
    Visible,
}

impl Visibility {
    pub fn is_visible(&self) -> bool {
        matches!(self, Visibility::Visible)
    }
}

/// Pointer events dispatched by a simulated click.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseEventKind {
    MouseDown,
    MouseUp,
    Click,
}

impl MouseEventKind {
    /// Ordered press-release-click sequence.
    pub const CLICK_SEQUENCE: [MouseEventKind; 3] = [
        MouseEventKind::MouseDown,
        MouseEventKind::MouseUp,
        MouseEventKind::Click,
    ];

    /// DOM event type name.
    pub fn as_str(&self) -> &'static str {
        match self {
            MouseEventKind::MouseDown => "mousedown",
            MouseEventKind::MouseUp => "mouseup",
            MouseEventKind::Click => "click",
        }
    }
}

/// Keyboard events dispatched by a simulated key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyEventKind {
    KeyDown,
    KeyPress,
    KeyUp,
}

impl KeyEventKind {
    /// DOM event type name.
    pub fn as_str(&self) -> &'static str {
        match self {
            KeyEventKind::KeyDown => "keydown",
            KeyEventKind::KeyPress => "keypress",
            KeyEventKind::KeyUp => "keyup",
        }
    }
}

/// Physical key identity carried by every simulated keyboard event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyDescriptor {
    pub key: String,
    pub code: String,
    pub key_code: u32,
    pub which: u32,
}

impl KeyDescriptor {
    /// Describe a key the way the host page's handlers expect it.
    ///
    /// Digits use `Digit<n>` codes with numeric-row key codes; named keys keep
    /// their name as code and get an approximate legacy key code.
    pub fn for_key(key: &str) -> Self {
        let mut chars = key.chars();
        if let (Some(c), None) = (chars.next(), chars.next()) {
            if let Some(digit) = c.to_digit(10) {
                return Self {
                    key: key.to_string(),
                    code: format!("Digit{}", digit),
                    key_code: 48 + digit,
                    which: 48 + digit,
                };
            }
        }

        let legacy = match key {
            "Enter" => 13,
            "Tab" => 9,
            "Escape" => 27,
            "Delete" => 46,
            _ => 8,
        };
        Self {
            key: key.to_string(),
            code: key.to_string(),
            key_code: legacy,
            which: legacy,
        }
    }

    pub fn is_digit(&self) -> bool {
        self.code.starts_with("Digit")
    }
}

/// Window message toggling the main-world clock freeze.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FreezeSignal {
    #[serde(rename = "type")]
    pub kind: String,
    pub enabled: bool,
}

impl FreezeSignal {
    pub fn new(enabled: bool) -> Self {
        Self {
            kind: FREEZE_MESSAGE_TYPE.to_string(),
            enabled,
        }
    }

    /// Parse a window message, ignoring anything not addressed to the bridge.
    pub fn parse(data: &Value) -> Option<Self> {
        let signal: FreezeSignal = serde_json::from_value(data.clone()).ok()?;
        (signal.kind == FREEZE_MESSAGE_TYPE).then_some(signal)
    }

    pub fn to_value(&self) -> Value {
        serde_json::json!({ "type": self.kind, "enabled": self.enabled })
    }
}

/// DOM access from the isolated observer context.
///
/// Implementations never cache element references: every call re-queries the
/// live document.
#[async_trait]
pub trait ObserverPage: Send + Sync {
    /// Look up an element and report whether it is displayed.
    async fn visibility(&self, selector: &str, hidden_class: &str)
        -> Result<Visibility, PageError>;

    /// Dispatch bubbling, cancelable mouse events on the first match.
    ///
    /// Returns `false` without dispatching when nothing matches.
    async fn dispatch_mouse(
        &self,
        selector: &str,
        sequence: &[MouseEventKind],
    ) -> Result<bool, PageError>;

    /// Dispatch a keyboard event on the focused element, or the body.
    async fn dispatch_key(&self, kind: KeyEventKind, key: &KeyDescriptor)
        -> Result<(), PageError>;

    /// Whether an element with the given id exists.
    async fn has_element(&self, id: &str) -> Result<bool, PageError>;

    /// Append a `<style>` element with the given id to the document head.
    async fn insert_style(&self, id: &str, css: &str) -> Result<(), PageError>;

    /// Remove the element with the given id, reporting whether one existed.
    async fn remove_element(&self, id: &str) -> Result<bool, PageError>;

    /// Evaluate an expression in the observer context.
    async fn evaluate(&self, expression: &str) -> Result<Value, PageError>;

    /// Post a same-origin window message visible to every context.
    async fn post_window_message(&self, payload: Value) -> Result<(), PageError>;

    /// Whether a main-world script has left the given DOM marker.
    async fn has_main_world_marker(&self, marker: &str) -> Result<bool, PageError>;

    /// Run a script in the page's main world and set the marker.
    async fn inject_main_world(&self, marker: &str, source: &str) -> Result<(), PageError>;

    /// Evaluate an expression in the page's main world.
    async fn evaluate_main_world(&self, expression: &str) -> Result<Value, PageError>;

    /// Identity of the current document; changes on navigation or reload.
    async fn document_id(&self) -> Result<String, PageError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_digit_key_descriptor() {
        let key = KeyDescriptor::for_key("7");
        assert_eq!(key.code, "Digit7");
        assert_eq!(key.key_code, 55);
        assert_eq!(key.which, 55);
        assert!(key.is_digit());
    }

    #[test]
    fn test_named_key_descriptor() {
        let enter = KeyDescriptor::for_key("Enter");
        assert_eq!(enter.code, "Enter");
        assert_eq!(enter.key_code, 13);

        let backspace = KeyDescriptor::for_key("Backspace");
        assert_eq!(backspace.key_code, 8);
        assert!(!backspace.is_digit());
    }

    #[test]
    fn test_multi_digit_string_is_not_a_digit_key() {
        let key = KeyDescriptor::for_key("12");
        assert!(!key.is_digit());
        assert_eq!(key.code, "12");
    }

    #[test]
    fn test_key_descriptor_serializes_camel_case() {
        let value = serde_json::to_value(KeyDescriptor::for_key("0")).unwrap();
        assert_eq!(
            value,
            json!({"key": "0", "code": "Digit0", "keyCode": 48, "which": 48})
        );
    }

    #[test]
    fn test_freeze_signal_parse() {
        let signal = FreezeSignal::parse(&json!({"type": FREEZE_MESSAGE_TYPE, "enabled": true}));
        assert_eq!(signal, Some(FreezeSignal::new(true)));

        assert!(FreezeSignal::parse(&json!({"type": "OTHER", "enabled": true})).is_none());
        assert!(FreezeSignal::parse(&json!("not an object")).is_none());
    }

    #[test]
    fn test_freeze_signal_round_trip_value() {
        let value = FreezeSignal::new(false).to_value();
        assert_eq!(value["type"], FREEZE_MESSAGE_TYPE);
        assert_eq!(value["enabled"], false);
    }

    #[test]
    fn test_click_sequence_order() {
        let names: Vec<_> = MouseEventKind::CLICK_SEQUENCE
            .iter()
            .map(|k| k.as_str())
            .collect();
        assert_eq!(names, ["mousedown", "mouseup", "click"]);
    }
}
