//! Usage quota errors.

use thiserror::Error;

use super::{SolverError, StoreError};

#[derive(Debug, Error)]
pub enum QuotaError {
    /// No uses remain; nothing was executed.
    #[error("Usage limit reached ({max} uses)")]
    Exhausted { max: u32 },

    #[error("Action failed: {0}")]
    ActionFailed(#[from] SolverError),

    #[error("Quota storage failed: {0}")]
    Store(#[from] StoreError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exhausted_display() {
        let err = QuotaError::Exhausted { max: 5 };
        assert!(err.to_string().contains("5 uses"));
    }

    #[test]
    fn test_action_failed_wraps_message() {
        let err: QuotaError = SolverError::Failed("API Error".to_string()).into();
        assert!(err.to_string().contains("API Error"));
    }
}
