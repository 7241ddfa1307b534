//! Observer host: one controller per live document.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use drillbot_protocols::{KvStore, ObserverPage, PageError};
use drillbot_runloop::{AutomationController, ControllerSettings, SolverRegistry};

use crate::coordinator::Coordinator;
use crate::transport::{command_channel, CommandReceiver};

/// Everything needed to build an observer for a document.
#[derive(Clone)]
pub struct ObserverSpec {
    pub page: Arc<dyn ObserverPage>,
    pub store: Arc<dyn KvStore>,
    pub solvers: SolverRegistry,
    pub settings: ControllerSettings,
}

/// A running observer bound to one document.
pub struct ObserverHost {
    document_id: String,
    controller: Arc<AutomationController>,
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl ObserverHost {
    /// Build a controller for the current document, rehydrate it and start
    /// serving commands routed through the coordinator.
    pub async fn spawn(spec: &ObserverSpec, coordinator: &Coordinator) -> Result<Self, PageError> {
        let document_id = spec.page.document_id().await?;

        let controller = Arc::new(
            AutomationController::initialize(
                spec.page.clone(),
                spec.store.clone(),
                spec.solvers.clone(),
                coordinator.event_sink(),
                &spec.settings,
            )
            .await,
        );

        let (sender, receiver) = command_channel(16);
        coordinator.attach_observer(sender);

        let cancel = CancellationToken::new();
        let task = tokio::spawn(Self::serve(controller.clone(), receiver, cancel.clone()));

        info!("Observer attached to document {}", document_id);
        Ok(Self {
            document_id,
            controller,
            cancel,
            task,
        })
    }

    async fn serve(
        controller: Arc<AutomationController>,
        mut receiver: CommandReceiver,
        cancel: CancellationToken,
    ) {
        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                request = receiver.recv() => match request {
                    Some(request) => {
                        let ack = controller.handle(request.command.clone()).await;
                        request.respond(ack);
                    }
                    None => break,
                },
            }
        }
        controller.shutdown();
        debug!("Observer stopped serving commands");
    }

    pub fn document_id(&self) -> &str {
        &self.document_id
    }

    pub fn controller(&self) -> &Arc<AutomationController> {
        &self.controller
    }

    /// Tear the observer down; its schedule stops and pending commands get no reply.
    pub async fn shutdown(self) {
        self.cancel.cancel();
        if let Err(e) = self.task.await {
            warn!("Observer task ended abnormally: {}", e);
        }
        self.controller.shutdown();
    }
}

/// Recreates the observer whenever the page's document changes.
pub struct ObserverSupervisor {
    spec: ObserverSpec,
    coordinator: Arc<Coordinator>,
    poll: Duration,
}

impl ObserverSupervisor {
    pub fn new(spec: ObserverSpec, coordinator: Arc<Coordinator>, poll: Duration) -> Self {
        Self {
            spec,
            coordinator,
            poll,
        }
    }

    /// Watch the page until cancelled.
    pub async fn run(self, cancel: CancellationToken) {
        let mut host = self.try_spawn().await;
        let mut ticks = interval(self.poll);
        ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = ticks.tick() => {
                    let current = match self.spec.page.document_id().await {
                        Ok(id) => id,
                        Err(e) => {
                            debug!("Document unavailable: {}", e);
                            continue;
                        }
                    };
                    let stale = host.as_ref().is_none_or(|h| h.document_id() != current);
                    if stale {
                        if let Some(old) = host.take() {
                            info!("Document changed ({} -> {}), recreating observer", old.document_id(), current);
                            self.coordinator.detach_observer();
                            old.shutdown().await;
                        }
                        host = self.try_spawn().await;
                    }
                }
            }
        }

        self.coordinator.detach_observer();
        if let Some(host) = host {
            host.shutdown().await;
        }
    }

    async fn try_spawn(&self) -> Option<ObserverHost> {
        match ObserverHost::spawn(&self.spec, &self.coordinator).await {
            Ok(host) => Some(host),
            Err(e) => {
                warn!("Failed to attach observer: {}", e);
                None
            }
        }
    }
}

#[cfg(test)]
#[path = "observer_host_tests.rs"]
mod tests;
