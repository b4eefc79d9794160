//! Scaler error types.

use thiserror::Error;

use flotilla_cloud::CloudError;
use flotilla_core::NodeGroup;
use flotilla_orchestrator::OrchestratorError;

/// Result type alias for scale operations.
pub type ScaleResult<T> = Result<T, ScaleError>;

/// Errors returned by the service and node scalers.
///
/// Reaching a bound is not an error; it is reported on the outcome.
#[derive(Debug, Error)]
pub enum ScaleError {
    #[error("inspect of service {service} failed: {source}")]
    Inspect {
        service: String,
        #[source]
        source: OrchestratorError,
    },

    #[error("{0} is a global service and cannot be scaled")]
    GlobalService(String),

    #[error("{0} has no replica count")]
    MissingReplicas(String),

    #[error("update of service {service} failed: {source}")]
    Update {
        service: String,
        #[source]
        source: OrchestratorError,
    },

    #[error("reading {group} node count from {backend} failed: {source}")]
    GetNodes {
        backend: String,
        group: NodeGroup,
        #[source]
        source: CloudError,
    },

    #[error("setting {group} node count on {backend} failed: {source}")]
    SetNodes {
        backend: String,
        group: NodeGroup,
        #[source]
        source: CloudError,
    },
}

impl ScaleError {
    /// Whether the error comes from the request itself rather than a backend.
    pub fn is_invalid_target(&self) -> bool {
        matches!(self, Self::GlobalService(_) | Self::MissingReplicas(_))
    }

    /// Whether the target service does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::Inspect {
                source: OrchestratorError::NotFound(_),
                ..
            }
        )
    }
}
