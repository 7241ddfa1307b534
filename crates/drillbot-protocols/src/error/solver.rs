//! Solver errors.

use thiserror::Error;

use super::PageError;

#[derive(Debug, Error)]
pub enum SolverError {
    #[error("{0}")]
    Failed(String),

    #[error("Solver timed out after {0} ms")]
    Timeout(u64),

    #[error("Invalid solver plan: {0}")]
    InvalidPlan(String),

    #[error(transparent)]
    Page(#[from] PageError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failed_is_bare_message() {
        let err = SolverError::Failed("no numerator".to_string());
        assert_eq!(err.to_string(), "no numerator");
    }

    #[test]
    fn test_page_error_is_transparent() {
        let err: SolverError = PageError::Script("ReferenceError".to_string()).into();
        assert!(err.to_string().contains("ReferenceError"));
    }

    #[test]
    fn test_timeout_display() {
        assert!(SolverError::Timeout(5000).to_string().contains("5000"));
    }
}
