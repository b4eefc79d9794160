//! Rescheduler error types.

use std::time::Duration;

use thiserror::Error;

use flotilla_core::NodeGroup;
use flotilla_orchestrator::OrchestratorError;

/// Result type alias for rescheduler operations.
pub type RescheduleResult<T> = Result<T, RescheduleError>;

/// One service that could not be rescheduled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceFailure {
    pub service: String,
    pub error: OrchestratorError,
}

/// Errors returned by the rescheduler.
///
/// Cancellation of a wait is not an error; it is reported as a status.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RescheduleError {
    #[error("inspect of service {service} failed: {source}")]
    Inspect {
        service: String,
        #[source]
        source: OrchestratorError,
    },

    #[error("{service} is not labeled with {label}={value} ({found})")]
    NotLabeled {
        service: String,
        label: String,
        value: String,
        /// `no label`, or the `label=actual` pair that was found.
        found: String,
    },

    #[error("update of service {service} failed: {source}")]
    Update {
        service: String,
        #[source]
        source: OrchestratorError,
    },

    #[error("listing services labeled {label}={value} failed: {source}")]
    List {
        label: String,
        value: String,
        #[source]
        source: OrchestratorError,
    },

    #[error(
        "failed to reschedule {}{}",
        describe_failures(.failed),
        describe_succeeded(.succeeded)
    )]
    Partial {
        failed: Vec<ServiceFailure>,
        succeeded: Vec<String>,
    },

    #[error("reading {group} node count failed: {source}")]
    NodeCount {
        group: NodeGroup,
        #[source]
        source: OrchestratorError,
    },

    #[error("waited {} for {target} {group} nodes to activate", format_duration(.waited))]
    Timeout {
        waited: Duration,
        target: u64,
        group: NodeGroup,
    },
}

impl RescheduleError {
    pub(crate) fn not_labeled(
        service: &str,
        label: &str,
        value: &str,
        actual: Option<&str>,
    ) -> Self {
        Self::NotLabeled {
            service: service.to_string(),
            label: label.to_string(),
            value: value.to_string(),
            found: match actual {
                Some(actual) => format!("{label}={actual}"),
                None => "no label".to_string(),
            },
        }
    }

    /// Whether the error comes from the request itself rather than a backend.
    pub fn is_invalid_target(&self) -> bool {
        matches!(self, Self::NotLabeled { .. })
    }

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

fn describe_failures(failed: &[ServiceFailure]) -> String {
    failed
        .iter()
        .map(|f| format!("{} ({})", f.service, f.error))
        .collect::<Vec<_>>()
        .join(", ")
}

fn describe_succeeded(succeeded: &[String]) -> String {
    if succeeded.is_empty() {
        String::new()
    } else {
        format!("; rescheduled {}", succeeded.join(", "))
    }
}

/// Render a duration as whole seconds, or milliseconds below one second.
pub(crate) fn format_duration(d: &Duration) -> String {
    if d.as_secs() == 0 {
        format!("{}ms", d.as_millis())
    } else {
        format!("{}s", d.as_secs())
    }
}
