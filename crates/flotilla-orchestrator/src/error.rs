//! Orchestrator error types.

use thiserror::Error;

/// Result type alias for orchestrator calls.
pub type OrchestratorResult<T> = Result<T, OrchestratorError>;

/// Errors surfaced by an orchestrator backend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrchestratorError {
    #[error("service not found: {0}")]
    NotFound(String),

    #[error("update out of sequence for {service}: expected version {expected}, got {actual}")]
    VersionConflict {
        service: String,
        expected: u64,
        actual: u64,
    },

    #[error("orchestrator API error: {0}")]
    Api(String),
}
