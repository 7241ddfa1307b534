//! CDP error types.

use thiserror::Error;

use drillbot_protocols::PageError;

/// Returned by Chrome when an execution context id no longer exists.
const CONTEXT_NOT_FOUND: &str = "Cannot find context with specified id";

/// CDP client errors.
#[derive(Debug, Error)]
pub enum CdpError {
    /// Failed to connect to Chrome.
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Chrome not found or not running with remote debugging.
    #[error("Chrome not available at {0}. Start Chrome with: chrome --remote-debugging-port=9222")]
    ChromeNotAvailable(String),

    /// WebSocket error.
    #[error("WebSocket error: {0}")]
    WebSocket(String),

    /// CDP protocol error.
    #[error("CDP error: {message} (code: {code})")]
    Protocol { code: i64, message: String },

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// HTTP error (for endpoint discovery).
    #[error("HTTP error: {0}")]
    Http(String),

    /// No page matched.
    #[error("Page not found: {0}")]
    PageNotFound(String),

    /// JavaScript exception.
    #[error("JavaScript error: {0}")]
    JavaScript(String),

    /// Timeout.
    #[error("Timeout: {0}")]
    Timeout(String),

    /// Session closed.
    #[error("Session closed")]
    SessionClosed,

    /// Invalid response.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl CdpError {
    /// Whether the error means the target execution context is gone.
    pub fn is_context_gone(&self) -> bool {
        match self {
            CdpError::Protocol { message, .. } => message.contains(CONTEXT_NOT_FOUND),
            CdpError::SessionClosed => true,
            _ => false,
        }
    }
}

impl From<tokio_tungstenite::tungstenite::Error> for CdpError {
    fn from(e: tokio_tungstenite::tungstenite::Error) -> Self {
        CdpError::WebSocket(e.to_string())
    }
}

impl From<reqwest::Error> for CdpError {
    fn from(e: reqwest::Error) -> Self {
        CdpError::Http(e.to_string())
    }
}

impl From<url::ParseError> for CdpError {
    fn from(e: url::ParseError) -> Self {
        CdpError::ConnectionFailed(format!("Invalid URL: {}", e))
    }
}

impl From<CdpError> for PageError {
    fn from(e: CdpError) -> Self {
        if e.is_context_gone() {
            return PageError::ContextLost(e.to_string());
        }
        match e {
            CdpError::JavaScript(msg) => PageError::Script(msg),
            CdpError::InvalidResponse(msg) => PageError::InvalidResponse(msg),
            CdpError::Serialization(e) => PageError::InvalidResponse(e.to_string()),
            other => PageError::Transport(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_not_found_maps_to_context_lost() {
        let err = CdpError::Protocol {
            code: -32000,
            message: "Cannot find context with specified id".to_string(),
        };
        assert!(err.is_context_gone());
        assert!(PageError::from(err).is_context_lost());
    }

    #[test]
    fn test_javascript_maps_to_script() {
        let err: PageError = CdpError::JavaScript("Uncaught".to_string()).into();
        assert!(matches!(err, PageError::Script(_)));
    }

    #[test]
    fn test_other_errors_are_transport() {
        let err: PageError = CdpError::Timeout("Runtime.evaluate".to_string()).into();
        assert!(matches!(err, PageError::Transport(_)));
    }
}
