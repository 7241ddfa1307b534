//! Long-lived coordinator: default flags and command relay.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
use serde_json::json;
use tokio::sync::broadcast;
use tracing::{debug, info};

use drillbot_protocols::{
    keys, Ack, Command, Event, EventSink, KvStore, StoreError, TransportError,
};

use crate::transport::CommandSender;

/// Relays commands to the current observer and fans events out to surfaces.
///
/// Holds no automation state of its own.
pub struct Coordinator {
    store: Arc<dyn KvStore>,
    events: EventSink,
    observer: RwLock<Option<CommandSender>>,
    timeout: Duration,
}

impl Coordinator {
    pub fn new(store: Arc<dyn KvStore>, timeout: Duration) -> Self {
        let (tx, _) = broadcast::channel(256);
        Self {
            store,
            events: EventSink::new(tx),
            observer: RwLock::new(None),
            timeout,
        }
    }

    /// First-install defaults: not running, every toggle off, no uses spent.
    ///
    /// Existing toggles and the usage counter are left untouched.
    pub async fn install_defaults(&self) -> Result<(), StoreError> {
        let mut entries = vec![(keys::IS_RUNNING.to_string(), json!(false))];
        for key in [
            keys::RACE_MODE,
            keys::SKIP_ANIM,
            keys::FREEZE_TIMER,
            keys::STEALTH_MODE,
        ] {
            if self.store.get(key).await?.is_none() {
                entries.push((key.to_string(), json!(false)));
            }
        }
        if self.store.get(keys::PRIVILEGED_USES).await?.is_none() {
            entries.push((keys::PRIVILEGED_USES.to_string(), json!(0)));
        }
        self.store.set(entries).await?;
        info!("Installed default flags");
        Ok(())
    }

    pub fn store(&self) -> Arc<dyn KvStore> {
        self.store.clone()
    }

    /// Sink observers emit into.
    pub fn event_sink(&self) -> EventSink {
        self.events.clone()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.events.subscribe()
    }

    /// Route commands to a new observer, replacing any previous one.
    pub fn attach_observer(&self, sender: CommandSender) {
        *self.observer.write() = Some(sender);
        debug!("Observer attached");
    }

    pub fn detach_observer(&self) {
        if self.observer.write().take().is_some() {
            debug!("Observer detached");
        }
    }

    pub fn has_observer(&self) -> bool {
        self.observer
            .read()
            .as_ref()
            .is_some_and(|sender| !sender.is_closed())
    }

    /// Deliver a command to the attached observer.
    pub async fn send_command(&self, command: Command) -> Result<Ack, TransportError> {
        let sender = self.observer.read().clone();
        match sender {
            Some(sender) => sender.send(command, self.timeout).await,
            None => Err(TransportError::NoReceiver),
        }
    }
}
