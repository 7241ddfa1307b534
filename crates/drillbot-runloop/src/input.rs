//! Synthetic input.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, warn};

use drillbot_config::InputConfig;
use drillbot_protocols::{
    InputDriver, KeyDescriptor, KeyEventKind, MouseEventKind, ObserverPage, PageError,
};

/// Clicks and key presses dispatched as DOM events into the observed page.
pub struct InputSimulator {
    page: Arc<dyn ObserverPage>,
    click_settle: Duration,
    key_release: Duration,
}

impl InputSimulator {
    pub fn new(page: Arc<dyn ObserverPage>, config: &InputConfig) -> Self {
        Self {
            page,
            click_settle: config.click_settle(),
            key_release: config.key_release(),
        }
    }
}

#[async_trait]
impl InputDriver for InputSimulator {
    async fn click(&self, selector: &str) -> Result<bool, PageError> {
        let found = self
            .page
            .dispatch_mouse(selector, &MouseEventKind::CLICK_SEQUENCE)
            .await?;
        if !found {
            warn!("Button not found: {}", selector);
        }
        tokio::time::sleep(self.click_settle).await;
        Ok(found)
    }

    async fn press_key(&self, key: &str) -> Result<(), PageError> {
        let descriptor = KeyDescriptor::for_key(key);
        debug!("Pressing key {} ({})", descriptor.key, descriptor.code);

        self.page
            .dispatch_key(KeyEventKind::KeyDown, &descriptor)
            .await?;
        self.page
            .dispatch_key(KeyEventKind::KeyPress, &descriptor)
            .await?;
        tokio::time::sleep(self.key_release).await;
        self.page.dispatch_key(KeyEventKind::KeyUp, &descriptor).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory_page::{DispatchedEvent, MemoryPage};

    #[tokio::test(start_paused = true)]
    async fn test_click_dispatches_full_sequence() {
        let page = MemoryPage::new();
        page.add_element("#submit");
        let input = InputSimulator::new(page.clone(), &InputConfig::default());

        let start = tokio::time::Instant::now();
        assert!(input.click("#submit").await.unwrap());
        assert!(start.elapsed() >= Duration::from_millis(30));

        let kinds: Vec<_> = page
            .dispatched()
            .into_iter()
            .map(|e| match e {
                DispatchedEvent::Mouse { kind, .. } => kind,
                other => panic!("unexpected event {:?}", other),
            })
            .collect();
        assert_eq!(kinds, MouseEventKind::CLICK_SEQUENCE);
    }

    #[tokio::test(start_paused = true)]
    async fn test_click_missing_target_is_noop() {
        let page = MemoryPage::new();
        let input = InputSimulator::new(page.clone(), &InputConfig::default());

        assert!(!input.click("#missing").await.unwrap());
        assert!(page.dispatched().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_press_key_order_and_descriptor() {
        let page = MemoryPage::new();
        let input = InputSimulator::new(page.clone(), &InputConfig::default());

        input.press_key("4").await.unwrap();

        let events = page.dispatched();
        assert_eq!(events.len(), 3);
        let expected = [KeyEventKind::KeyDown, KeyEventKind::KeyPress, KeyEventKind::KeyUp];
        for (event, expected_kind) in events.iter().zip(expected) {
            match event {
                DispatchedEvent::Key { kind, key } => {
                    assert_eq!(*kind, expected_kind);
                    assert_eq!(key.code, "Digit4");
                    assert_eq!(key.key_code, 52);
                }
                other => panic!("unexpected event {:?}", other),
            }
        }
        assert_eq!(page.typed_keys(), vec!["4".to_string()]);
    }
}
