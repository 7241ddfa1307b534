//! JavaScript snippets evaluated in the observed page.
//!
//! Every argument is embedded as a JSON literal, so selectors, ids and CSS
//! never need manual escaping.

use serde_json::Value;

use drillbot_protocols::{KeyDescriptor, KeyEventKind, MouseEventKind};

/// Dataset key holding the per-document identity.
pub const DOCUMENT_ID_KEY: &str = "drillbotDocument";

fn literal(value: &str) -> String {
    Value::String(value.to_string()).to_string()
}

/// Resolves `selector` to an element, falling back to an id lookup when the
/// selector matches nothing or is not valid CSS.
fn lookup(selector: &str) -> String {
    format!(
        "const sel = {sel}; let el = null; \
         try {{ el = document.querySelector(sel); }} catch (_) {{}} \
         el = el || document.getElementById(sel);",
        sel = literal(selector)
    )
}

pub fn visibility(selector: &str, hidden_class: &str) -> String {
    format!(
        "(() => {{ {lookup} \
         if (!el) return \"absent\"; \
         if (el.classList.contains({hidden}) || el.style.display === \"none\") return \"hidden\"; \
         return \"visible\"; }})()",
        lookup = lookup(selector),
        hidden = literal(hidden_class)
    )
}

pub fn dispatch_mouse(selector: &str, sequence: &[MouseEventKind]) -> String {
    let kinds: Vec<&str> = sequence.iter().map(|k| k.as_str()).collect();
    format!(
        "(() => {{ {lookup} \
         if (!el) return false; \
         for (const type of {kinds}) {{ \
           el.dispatchEvent(new MouseEvent(type, {{ bubbles: true, cancelable: true, view: window }})); \
         }} \
         return true; }})()",
        lookup = lookup(selector),
        kinds = serde_json::json!(kinds)
    )
}

/// Legacy `keyCode` and `which` go through the init dictionary so the page's
/// own listeners see them; properties patched onto the event object would
/// only be visible in this world.
pub fn dispatch_key(kind: KeyEventKind, key: &KeyDescriptor) -> String {
    format!(
        "(() => {{ const d = {desc}; \
         const target = document.activeElement || document.body; \
         target.dispatchEvent(new KeyboardEvent({kind}, {{ \
           key: d.key, code: d.code, keyCode: d.keyCode, which: d.which, \
           bubbles: true, cancelable: true }})); }})()",
        desc = serde_json::json!(key),
        kind = literal(kind.as_str())
    )
}

pub fn has_element(id: &str) -> String {
    format!("document.getElementById({}) !== null", literal(id))
}

pub fn insert_style(id: &str, css: &str) -> String {
    format!(
        "(() => {{ const style = document.createElement(\"style\"); \
         style.id = {id}; style.textContent = {css}; \
         (document.head || document.documentElement).appendChild(style); }})()",
        id = literal(id),
        css = literal(css)
    )
}

pub fn remove_element(id: &str) -> String {
    format!(
        "(() => {{ const el = document.getElementById({}); \
         if (!el) return false; el.remove(); return true; }})()",
        literal(id)
    )
}

pub fn post_window_message(payload: &Value) -> String {
    format!("window.postMessage({}, \"*\")", payload)
}

pub fn has_marker(marker: &str) -> String {
    format!("document.documentElement.dataset[{}] === \"1\"", literal(marker))
}

pub fn set_marker(marker: &str) -> String {
    format!("document.documentElement.dataset[{}] = \"1\"", literal(marker))
}

/// Reads the document identity, minting one on first access. The dataset
/// lives on the DOM, so a navigation or reload always yields a fresh id.
pub fn document_id() -> String {
    format!(
        "(() => {{ const data = document.documentElement.dataset; const key = {key}; \
         if (!data[key]) data[key] = Math.random().toString(36).slice(2) + performance.timeOrigin.toString(36); \
         return data[key]; }})()",
        key = literal(DOCUMENT_ID_KEY)
    )
}

#[cfg(test)]
#[path = "scripts_tests.rs"]
mod tests;
