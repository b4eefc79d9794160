//! Service scaler: resolves and applies a new replica count.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, warn};

use flotilla_core::{BoundsConfig, ScaleDirection, ServiceMode};
use flotilla_orchestrator::{Inspector, ServiceUpdater};

use crate::bounds::resolve;
use crate::error::{ScaleError, ScaleResult};

/// What a service scale request did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScaleOutcome {
    pub service: String,
    pub message: String,
    /// The service already sat on the bound in the requested direction;
    /// nothing was changed.
    pub at_bound: bool,
    pub from: u64,
    pub to: u64,
    pub min: u64,
    pub max: u64,
}

/// Scales replicated services within label-aware bounds.
///
/// Stateless: concurrent calls for different services are safe. Calls for
/// the same service race on the orchestrator's version check, and the
/// loser surfaces as an update error.
pub struct ServiceScaler {
    inspector: Arc<dyn Inspector>,
    updater: Arc<dyn ServiceUpdater>,
    bounds: BoundsConfig,
}

impl ServiceScaler {
    /// Create a scaler backed by one orchestrator handle.
    pub fn new<O>(orchestrator: Arc<O>, bounds: BoundsConfig) -> Self
    where
        O: Inspector + ServiceUpdater + 'static,
    {
        Self {
            inspector: orchestrator.clone(),
            updater: orchestrator,
            bounds,
        }
    }

    pub fn bounds(&self) -> &BoundsConfig {
        &self.bounds
    }

    /// Scale `service_id` one step in `direction`.
    ///
    /// A non-zero `delta` replaces the step from labels or defaults.
    pub async fn scale(
        &self,
        service_id: &str,
        delta: u64,
        direction: ScaleDirection,
    ) -> ScaleResult<ScaleOutcome> {
        let service = self
            .inspector
            .describe(service_id)
            .await
            .map_err(|source| ScaleError::Inspect {
                service: service_id.to_string(),
                source,
            })?;

        let current = match service.mode {
            ServiceMode::Global => return Err(ScaleError::GlobalService(service.name)),
            ServiceMode::Replicated { replicas: None } => {
                return Err(ScaleError::MissingReplicas(service.name));
            }
            ServiceMode::Replicated {
                replicas: Some(replicas),
            } => replicas,
        };

        let resolved = resolve(current, delta, direction, &service.labels, &self.bounds);

        if resolved.count == current {
            let message = match direction {
                ScaleDirection::Up => format!(
                    "{} is already at the maximum of {} replicas",
                    service.name, resolved.max
                ),
                ScaleDirection::Down => format!(
                    "{} is already at the minimum of {} replicas",
                    service.name, resolved.min
                ),
            };
            debug!(service = %service.name, current, %direction, "already at bound");
            return Ok(ScaleOutcome {
                service: service.name,
                message,
                at_bound: true,
                from: current,
                to: current,
                min: resolved.min,
                max: resolved.max,
            });
        }

        let name = service.name.clone();
        let version = service.version;
        let mut spec = service;
        spec.mode = ServiceMode::Replicated {
            replicas: Some(resolved.count),
        };

        if let Err(source) = self.updater.update(service_id, version, spec).await {
            warn!(service = %name, error = %source, "replica update failed");
            return Err(ScaleError::Update {
                service: name,
                source,
            });
        }

        info!(
            service = %name,
            from = current,
            to = resolved.count,
            min = resolved.min,
            max = resolved.max,
            "scaling service"
        );

        Ok(ScaleOutcome {
            message: format!(
                "Scaling {} from {} to {} replicas (min: {}, max: {})",
                name, current, resolved.count, resolved.min, resolved.max
            ),
            service: name,
            at_bound: false,
            from: current,
            to: resolved.count,
            min: resolved.min,
            max: resolved.max,
        })
    }
}
