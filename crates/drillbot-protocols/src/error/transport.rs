//! Cross-context transport errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransportError {
    /// No observer is attached to receive the message.
    #[error("Could not establish connection. Receiving end does not exist.")]
    NoReceiver,

    /// The receiver went away before replying.
    #[error("The message port closed before a response was received.")]
    ReplyDropped,

    #[error("No response within {0} ms")]
    Timeout(u64),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_receiver_display() {
        assert!(TransportError::NoReceiver.to_string().contains("Receiving end"));
    }

    #[test]
    fn test_timeout_display() {
        assert!(TransportError::Timeout(250).to_string().contains("250"));
    }
}
