//! Request/acknowledge transport between the contexts.
//!
//! Every command travels with its own oneshot reply slot, so the sender always
//! gets exactly one answer: the observer's [`Ack`] or a [`TransportError`].

use std::time::Duration;

use tokio::sync::{mpsc, oneshot};

use drillbot_protocols::{Ack, Command, TransportError};

/// A command in flight together with its reply slot.
#[derive(Debug)]
pub struct Request {
    pub command: Command,
    pub reply: oneshot::Sender<Ack>,
}

impl Request {
    /// Answer the request. A sender that stopped waiting is not an error.
    pub fn respond(self, ack: Ack) {
        let _ = self.reply.send(ack);
    }
}

/// Sending half of a command channel.
#[derive(Debug, Clone)]
pub struct CommandSender {
    tx: mpsc::Sender<Request>,
}

/// Receiving half of a command channel, owned by an observer host.
pub type CommandReceiver = mpsc::Receiver<Request>;

/// Create a bounded command channel.
pub fn command_channel(capacity: usize) -> (CommandSender, CommandReceiver) {
    let (tx, rx) = mpsc::channel(capacity);
    (CommandSender { tx }, rx)
}

impl CommandSender {
    /// Deliver a command and wait up to `timeout` for its acknowledgement.
    pub async fn send(&self, command: Command, timeout: Duration) -> Result<Ack, TransportError> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(Request { command, reply })
            .await
            .map_err(|_| TransportError::NoReceiver)?;

        match tokio::time::timeout(timeout, rx).await {
            Ok(Ok(ack)) => Ok(ack),
            Ok(Err(_)) => Err(TransportError::ReplyDropped),
            Err(_) => Err(TransportError::Timeout(timeout.as_millis() as u64)),
        }
    }

    /// Whether the receiving side is gone.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}
