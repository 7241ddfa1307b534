//! Page access errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PageError {
    #[error("Element not found: {0}")]
    ElementNotFound(String),

    #[error("Script evaluation failed: {0}")]
    Script(String),

    #[error("Execution context lost: {0}")]
    ContextLost(String),

    #[error("Page transport failed: {0}")]
    Transport(String),

    #[error("Invalid page response: {0}")]
    InvalidResponse(String),
}

impl PageError {
    /// Whether the error means the observed document went away.
    pub fn is_context_lost(&self) -> bool {
        matches!(self, PageError::ContextLost(_))
    }
}
