//! Error types for the run loop.

use thiserror::Error;

use drillbot_protocols::{PageError, StoreError};

/// Errors raised by the controller and its collaborators.
#[derive(Debug, Error)]
pub enum RunLoopError {
    /// Start requested without a selected mode.
    #[error("No mode selected")]
    NoModeSelected,

    /// Page access failed.
    #[error(transparent)]
    Page(#[from] PageError),

    /// Durable store access failed.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Solver script could not be loaded.
    #[error("Failed to load solver script {path}: {source}")]
    SolverScript {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Configured solver key is not a known mode.
    #[error("Unknown mode: {0}")]
    UnknownMode(String),
}

/// Result type for run loop operations.
pub type RunLoopResult<T> = Result<T, RunLoopError>;
