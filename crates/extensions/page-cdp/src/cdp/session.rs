//! Page session: CDP commands scoped to one attached target.

use std::sync::Arc;
use std::sync::atomic::AtomicU64;

use serde_json::{Value, json};
use tokio::sync::mpsc;
use tracing::debug;

use super::client::{PendingMap, WsSink, send_request};
use super::error::CdpError;
use super::protocol::{CdpResponse, FrameTree};

/// A session attached to a single page.
pub struct PageSession {
    target_id: String,
    session_id: String,
    ws_tx: Arc<tokio::sync::Mutex<WsSink>>,
    pending: PendingMap,
    request_id: Arc<AtomicU64>,
    /// Event receiver (kept alive to prevent sender errors).
    _event_rx: mpsc::UnboundedReceiver<CdpResponse>,
}

impl PageSession {
    pub(crate) fn new(
        target_id: String,
        session_id: String,
        ws_tx: Arc<tokio::sync::Mutex<WsSink>>,
        pending: PendingMap,
        request_id: Arc<AtomicU64>,
        event_rx: mpsc::UnboundedReceiver<CdpResponse>,
    ) -> Self {
        Self {
            target_id,
            session_id,
            ws_tx,
            pending,
            request_id,
            _event_rx: event_rx,
        }
    }

    pub fn target_id(&self) -> &str {
        &self.target_id
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Send a CDP command to this page session.
    pub async fn call(&self, method: &str, params: Option<Value>) -> Result<Value, CdpError> {
        send_request(
            &self.ws_tx,
            &self.pending,
            &self.request_id,
            method,
            params,
            Some(&self.session_id),
        )
        .await
    }

    pub(crate) async fn enable_domains(&self) -> Result<(), CdpError> {
        self.call("Page.enable", None).await?;
        self.call("Runtime.enable", None).await?;

        debug!("Enabled CDP domains for session {}", self.session_id);
        Ok(())
    }

    /// Evaluate an expression and return its value.
    ///
    /// `context_id` selects an execution context; `None` targets the page's
    /// main world.
    pub async fn evaluate(&self, expression: &str, context_id: Option<i64>) -> Result<Value, CdpError> {
        let mut params = json!({
            "expression": expression,
            "returnByValue": true,
            "awaitPromise": true,
        });
        if let Some(id) = context_id {
            params["contextId"] = json!(id);
        }

        let result = self.call("Runtime.evaluate", Some(params)).await?;
        evaluation_value(result)
    }

    /// Id of the top-level frame.
    pub async fn main_frame_id(&self) -> Result<String, CdpError> {
        let result = self.call("Page.getFrameTree", None).await?;
        let tree: FrameTree = serde_json::from_value(result["frameTree"].clone())?;
        Ok(tree.frame.id)
    }

    /// Create an isolated world on the main frame and return its context id.
    pub async fn create_isolated_world(&self, world_name: &str) -> Result<i64, CdpError> {
        let frame_id = self.main_frame_id().await?;
        let result = self
            .call(
                "Page.createIsolatedWorld",
                Some(json!({
                    "frameId": frame_id,
                    "worldName": world_name,
                    "grantUniveralAccess": false,
                })),
            )
            .await?;

        let context_id = result["executionContextId"]
            .as_i64()
            .ok_or_else(|| CdpError::InvalidResponse("Missing executionContextId".to_string()))?;
        debug!("Created isolated world '{}' (context {})", world_name, context_id);
        Ok(context_id)
    }
}

/// Unwrap a `Runtime.evaluate` result, turning thrown exceptions into errors.
pub(crate) fn evaluation_value(result: Value) -> Result<Value, CdpError> {
    if let Some(exception) = result.get("exceptionDetails") {
        let text = exception["exception"]["description"]
            .as_str()
            .or_else(|| exception["text"].as_str())
            .unwrap_or("Unknown error");
        return Err(CdpError::JavaScript(text.to_string()));
    }

    Ok(result["result"]["value"].clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_evaluation_value_returns_value() {
        let result = json!({"result": {"type": "number", "value": 42}});
        assert_eq!(evaluation_value(result).unwrap(), json!(42));
    }

    #[test]
    fn test_evaluation_value_undefined_is_null() {
        let result = json!({"result": {"type": "undefined"}});
        assert_eq!(evaluation_value(result).unwrap(), Value::Null);
    }

    #[test]
    fn test_evaluation_value_prefers_exception_description() {
        let result = json!({
            "result": {"type": "object"},
            "exceptionDetails": {
                "text": "Uncaught",
                "exception": {"description": "Error: Could not parse problem"}
            }
        });
        let err = evaluation_value(result).unwrap_err();
        assert!(err.to_string().contains("Could not parse problem"));
    }

    #[test]
    fn test_evaluation_value_falls_back_to_text() {
        let result = json!({"exceptionDetails": {"text": "SyntaxError"}});
        assert!(matches!(
            evaluation_value(result),
            Err(CdpError::JavaScript(msg)) if msg == "SyntaxError"
        ));
    }
}
