//! In-memory page.
//!
//! A scripted stand-in for a live document, used by tests across the
//! workspace and by dry runs without a browser. It records every side effect
//! the core performs so callers can assert on them.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;

use drillbot_protocols::{
    KeyDescriptor, KeyEventKind, MouseEventKind, ObserverPage, PageError, Visibility,
};

use crate::clock::WindowMessageListener;

/// A synthetic event the core dispatched into the page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchedEvent {
    Mouse {
        selector: String,
        kind: MouseEventKind,
    },
    Key {
        kind: KeyEventKind,
        key: KeyDescriptor,
    },
}

#[derive(Default)]
struct PageState {
    document: u64,
    surfaces: HashMap<String, Visibility>,
    clickable: HashSet<String>,
    styles: Vec<(String, String)>,
    markers: HashSet<String>,
    injections: Vec<String>,
    dispatched: Vec<DispatchedEvent>,
    posted: Vec<Value>,
    evaluations: Vec<String>,
    responses: VecDeque<Result<Value, String>>,
    main_world_evaluations: Vec<String>,
    main_world_responses: VecDeque<Result<Value, String>>,
    style_error: Option<String>,
}

/// Scripted in-memory [`ObserverPage`].
#[derive(Default)]
pub struct MemoryPage {
    state: Mutex<PageState>,
    main_world: Mutex<Option<Arc<dyn WindowMessageListener>>>,
}

impl MemoryPage {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Set how the element matching `selector` is displayed.
    pub fn set_visibility(&self, selector: &str, visibility: Visibility) {
        let mut state = self.state.lock();
        match visibility {
            Visibility::Absent => {
                state.surfaces.remove(selector);
            }
            other => {
                state.surfaces.insert(selector.to_string(), other);
            }
        }
    }

    /// Make `selector` resolve to a clickable element.
    pub fn add_element(&self, selector: &str) {
        self.state.lock().clickable.insert(selector.to_string());
    }

    /// Queue the result of the next observer-context evaluation.
    pub fn push_evaluate_result(&self, value: Value) {
        self.state.lock().responses.push_back(Ok(value));
    }

    /// Queue a script exception for the next observer-context evaluation.
    pub fn push_evaluate_error(&self, message: &str) {
        self.state
            .lock()
            .responses
            .push_back(Err(message.to_string()));
    }

    /// Queue the result of the next main-world evaluation.
    /// Make element lookups and style edits fail until cleared.
    pub fn set_style_error(&self, message: Option<&str>) {
        self.state.lock().style_error = message.map(str::to_string);
    }

    pub fn push_main_world_result(&self, value: Value) {
        self.state.lock().main_world_responses.push_back(Ok(value));
    }

    pub fn push_main_world_error(&self, message: &str) {
        self.state
            .lock()
            .main_world_responses
            .push_back(Err(message.to_string()));
    }

    /// Receive window messages once a main-world script is installed.
    pub fn attach_main_world(&self, listener: Arc<dyn WindowMessageListener>) {
        *self.main_world.lock() = Some(listener);
    }

    /// Replace the document: document-scoped state is discarded.
    pub fn navigate(&self) {
        let mut state = self.state.lock();
        state.document += 1;
        state.surfaces.clear();
        state.clickable.clear();
        state.styles.clear();
        state.markers.clear();
        *self.main_world.lock() = None;
    }

    pub fn dispatched(&self) -> Vec<DispatchedEvent> {
        self.state.lock().dispatched.clone()
    }

    /// Keys pressed, one entry per completed keyup.
    pub fn typed_keys(&self) -> Vec<String> {
        self.state
            .lock()
            .dispatched
            .iter()
            .filter_map(|e| match e {
                DispatchedEvent::Key {
                    kind: KeyEventKind::KeyUp,
                    key,
                } => Some(key.key.clone()),
                _ => None,
            })
            .collect()
    }

    /// Number of `<style>` elements with the given id.
    pub fn style_count(&self, id: &str) -> usize {
        self.state
            .lock()
            .styles
            .iter()
            .filter(|(style_id, _)| style_id == id)
            .count()
    }

    pub fn style_css(&self, id: &str) -> Option<String> {
        self.state
            .lock()
            .styles
            .iter()
            .find(|(style_id, _)| style_id == id)
            .map(|(_, css)| css.clone())
    }

    /// Markers injected into the main world, in order, across documents.
    pub fn injections(&self) -> Vec<String> {
        self.state.lock().injections.clone()
    }

    pub fn posted_messages(&self) -> Vec<Value> {
        self.state.lock().posted.clone()
    }

    pub fn evaluations(&self) -> Vec<String> {
        self.state.lock().evaluations.clone()
    }

    pub fn main_world_evaluations(&self) -> Vec<String> {
        self.state.lock().main_world_evaluations.clone()
    }
}

#[async_trait]
impl ObserverPage for MemoryPage {
    async fn visibility(
        &self,
        selector: &str,
        _hidden_class: &str,
    ) -> Result<Visibility, PageError> {
        Ok(self
            .state
            .lock()
            .surfaces
            .get(selector)
            .copied()
            .unwrap_or(Visibility::Absent))
    }

    async fn dispatch_mouse(
        &self,
        selector: &str,
        sequence: &[MouseEventKind],
    ) -> Result<bool, PageError> {
        let mut state = self.state.lock();
        if !state.clickable.contains(selector) {
            return Ok(false);
        }
        for kind in sequence {
            state.dispatched.push(DispatchedEvent::Mouse {
                selector: selector.to_string(),
                kind: *kind,
            });
        }
        Ok(true)
    }

    async fn dispatch_key(&self, kind: KeyEventKind, key: &KeyDescriptor) -> Result<(), PageError> {
        self.state.lock().dispatched.push(DispatchedEvent::Key {
            kind,
            key: key.clone(),
        });
        Ok(())
    }

    async fn has_element(&self, id: &str) -> Result<bool, PageError> {
        let state = self.state.lock();
        if let Some(message) = &state.style_error {
            return Err(PageError::Transport(message.clone()));
        }
        Ok(state.styles.iter().any(|(style_id, _)| style_id == id))
    }

    async fn insert_style(&self, id: &str, css: &str) -> Result<(), PageError> {
        let mut state = self.state.lock();
        if let Some(message) = &state.style_error {
            return Err(PageError::Transport(message.clone()));
        }
        state.styles.push((id.to_string(), css.to_string()));
        Ok(())
    }

    async fn remove_element(&self, id: &str) -> Result<bool, PageError> {
        let mut state = self.state.lock();
        if let Some(message) = &state.style_error {
            return Err(PageError::Transport(message.clone()));
        }
        match state.styles.iter().position(|(style_id, _)| style_id == id) {
            Some(index) => {
                state.styles.remove(index);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn evaluate(&self, expression: &str) -> Result<Value, PageError> {
        let mut state = self.state.lock();
        state.evaluations.push(expression.to_string());
        match state.responses.pop_front() {
            Some(Ok(value)) => Ok(value),
            Some(Err(message)) => Err(PageError::Script(message)),
            None => Ok(Value::Null),
        }
    }

    async fn post_window_message(&self, payload: Value) -> Result<(), PageError> {
        let bridged = {
            let mut state = self.state.lock();
            state.posted.push(payload.clone());
            !state.markers.is_empty()
        };
        if bridged {
            let listener = self.main_world.lock().clone();
            if let Some(listener) = listener {
                listener.on_message(&payload);
            }
        }
        Ok(())
    }

    async fn has_main_world_marker(&self, marker: &str) -> Result<bool, PageError> {
        Ok(self.state.lock().markers.contains(marker))
    }

    async fn inject_main_world(&self, marker: &str, _source: &str) -> Result<(), PageError> {
        let mut state = self.state.lock();
        state.markers.insert(marker.to_string());
        state.injections.push(marker.to_string());
        Ok(())
    }

    async fn evaluate_main_world(&self, expression: &str) -> Result<Value, PageError> {
        let mut state = self.state.lock();
        state.main_world_evaluations.push(expression.to_string());
        match state.main_world_responses.pop_front() {
            Some(Ok(value)) => Ok(value),
            Some(Err(message)) => Err(PageError::Script(message)),
            None => Ok(Value::Null),
        }
    }

    async fn document_id(&self) -> Result<String, PageError> {
        Ok(format!("memory-{}", self.state.lock().document))
    }
}
