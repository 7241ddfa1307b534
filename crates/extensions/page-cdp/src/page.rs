//! [`ObserverPage`] over a CDP page session.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::debug;

use drillbot_protocols::{
    KeyDescriptor, KeyEventKind, MouseEventKind, ObserverPage, PageError, Visibility,
};

use crate::cdp::{CdpClient, CdpError, PageSession};
use crate::scripts;

/// Name of the isolated world the observer runs in.
pub const OBSERVER_WORLD: &str = "drillbot-observer";

/// Observed browser page.
///
/// Observer-side calls run in an isolated world that shares the DOM with the
/// page but none of its globals. The world is created lazily and recreated
/// once when Chrome reports its context gone (navigation, reload).
pub struct CdpPage {
    _client: Arc<CdpClient>,
    session: PageSession,
    world_name: String,
    context: Mutex<Option<i64>>,
}

impl CdpPage {
    /// Connect to `endpoint` and attach to the first page matching `url_contains`.
    pub async fn attach(endpoint: &str, url_contains: Option<&str>) -> Result<Self, CdpError> {
        let client = Arc::new(CdpClient::connect(endpoint).await?);
        let session = client.attach_matching(url_contains).await?;
        Ok(Self::new(client, session))
    }

    pub fn new(client: Arc<CdpClient>, session: PageSession) -> Self {
        Self {
            _client: client,
            session,
            world_name: OBSERVER_WORLD.to_string(),
            context: Mutex::new(None),
        }
    }

    pub fn target_id(&self) -> &str {
        self.session.target_id()
    }

    async fn isolated_context(&self, refresh: bool) -> Result<i64, CdpError> {
        let mut context = self.context.lock().await;
        match *context {
            Some(id) if !refresh => Ok(id),
            _ => {
                let id = self.session.create_isolated_world(&self.world_name).await?;
                *context = Some(id);
                Ok(id)
            }
        }
    }

    async fn eval_isolated(&self, expression: &str) -> Result<Value, PageError> {
        let context_id = self.isolated_context(false).await?;
        match self.session.evaluate(expression, Some(context_id)).await {
            Err(e) if e.is_context_gone() => {
                debug!("Observer context {} gone, recreating", context_id);
                let context_id = self.isolated_context(true).await?;
                Ok(self.session.evaluate(expression, Some(context_id)).await?)
            }
            other => Ok(other?),
        }
    }

    async fn eval_bool(&self, expression: &str) -> Result<bool, PageError> {
        let value = self.eval_isolated(expression).await?;
        value
            .as_bool()
            .ok_or_else(|| PageError::InvalidResponse(format!("expected boolean, got {}", value)))
    }
}

/// Map the visibility snippet's result.
pub(crate) fn parse_visibility(value: &Value) -> Result<Visibility, PageError> {
    match value.as_str() {
        Some("absent") => Ok(Visibility::Absent),
        Some("hidden") => Ok(Visibility::Hidden),
        Some("visible") => Ok(Visibility::Visible),
        _ => Err(PageError::InvalidResponse(format!(
            "unexpected visibility {}",
            value
        ))),
    }
}

#[async_trait]
impl ObserverPage for CdpPage {
    async fn visibility(&self, selector: &str, hidden_class: &str) -> Result<Visibility, PageError> {
        let value = self
            .eval_isolated(&scripts::visibility(selector, hidden_class))
            .await?;
        parse_visibility(&value)
    }

    async fn dispatch_mouse(
        &self,
        selector: &str,
        sequence: &[MouseEventKind],
    ) -> Result<bool, PageError> {
        self.eval_bool(&scripts::dispatch_mouse(selector, sequence))
            .await
    }

    async fn dispatch_key(&self, kind: KeyEventKind, key: &KeyDescriptor) -> Result<(), PageError> {
        self.eval_isolated(&scripts::dispatch_key(kind, key)).await?;
        Ok(())
    }

    async fn has_element(&self, id: &str) -> Result<bool, PageError> {
        self.eval_bool(&scripts::has_element(id)).await
    }

    async fn insert_style(&self, id: &str, css: &str) -> Result<(), PageError> {
        self.eval_isolated(&scripts::insert_style(id, css)).await?;
        Ok(())
    }

    async fn remove_element(&self, id: &str) -> Result<bool, PageError> {
        self.eval_bool(&scripts::remove_element(id)).await
    }

    async fn evaluate(&self, expression: &str) -> Result<Value, PageError> {
        self.eval_isolated(expression).await
    }

    async fn post_window_message(&self, payload: Value) -> Result<(), PageError> {
        self.eval_isolated(&scripts::post_window_message(&payload))
            .await?;
        Ok(())
    }

    async fn has_main_world_marker(&self, marker: &str) -> Result<bool, PageError> {
        self.eval_bool(&scripts::has_marker(marker)).await
    }

    async fn inject_main_world(&self, marker: &str, source: &str) -> Result<(), PageError> {
        self.session.evaluate(source, None).await?;
        self.eval_isolated(&scripts::set_marker(marker)).await?;
        debug!("Injected main-world script (marker {})", marker);
        Ok(())
    }

    async fn evaluate_main_world(&self, expression: &str) -> Result<Value, PageError> {
        Ok(self.session.evaluate(expression, None).await?)
    }

    async fn document_id(&self) -> Result<String, PageError> {
        let value = self.eval_isolated(&scripts::document_id()).await?;
        value
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| PageError::InvalidResponse(format!("expected document id, got {}", value)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_visibility() {
        assert_eq!(parse_visibility(&json!("absent")).unwrap(), Visibility::Absent);
        assert_eq!(parse_visibility(&json!("hidden")).unwrap(), Visibility::Hidden);
        assert_eq!(parse_visibility(&json!("visible")).unwrap(), Visibility::Visible);
    }

    #[test]
    fn test_parse_visibility_rejects_other_values() {
        assert!(matches!(
            parse_visibility(&json!(true)),
            Err(PageError::InvalidResponse(_))
        ));
    }
}
