//! Node scaler: resizes the manager or worker node group on the cloud.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use flotilla_cloud::Cloud;
use flotilla_core::{BoundsConfig, NodeGroup, ScaleDirection};
use flotilla_orchestrator::Inspector;

use crate::bounds::resolve;
use crate::error::{ScaleError, ScaleResult};

/// What a node scale request did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeScaleOutcome {
    pub group: NodeGroup,
    pub backend: String,
    pub before: u64,
    pub after: u64,
    pub min: u64,
    pub max: u64,
}

impl NodeScaleOutcome {
    pub fn message(&self) -> String {
        format!(
            "Changing the number of {} nodes on {} from {} to {}",
            self.group, self.backend, self.before, self.after
        )
    }
}

/// Scales node groups within label-aware bounds.
///
/// Manager and worker bounds are configured independently. A reference
/// service's labels can override either set per request.
pub struct NodeScaler {
    cloud: Arc<dyn Cloud>,
    inspector: Arc<dyn Inspector>,
    manager: BoundsConfig,
    worker: BoundsConfig,
}

impl NodeScaler {
    pub fn new(
        cloud: Arc<dyn Cloud>,
        inspector: Arc<dyn Inspector>,
        manager: BoundsConfig,
        worker: BoundsConfig,
    ) -> Self {
        Self {
            cloud,
            inspector,
            manager,
            worker,
        }
    }

    /// Bounds configuration for a group.
    pub fn bounds(&self, group: NodeGroup) -> &BoundsConfig {
        match group {
            NodeGroup::Manager => &self.manager,
            NodeGroup::Worker => &self.worker,
        }
    }

    /// Scale `group` one step in `direction`.
    ///
    /// When `reference_service` is given its labels override the group's
    /// bound and step defaults.
    pub async fn scale(
        &self,
        delta: u64,
        direction: ScaleDirection,
        group: NodeGroup,
        reference_service: Option<&str>,
    ) -> ScaleResult<NodeScaleOutcome> {
        let labels = match reference_service.filter(|id| !id.is_empty()) {
            Some(service_id) => {
                self.inspector
                    .describe(service_id)
                    .await
                    .map_err(|source| ScaleError::Inspect {
                        service: service_id.to_string(),
                        source,
                    })?
                    .labels
            }
            None => HashMap::new(),
        };

        let backend = self.cloud.name().to_string();
        let before = self
            .cloud
            .get_nodes(group)
            .await
            .map_err(|source| ScaleError::GetNodes {
                backend: backend.clone(),
                group,
                source,
            })?;

        let resolved = resolve(before, delta, direction, &labels, self.bounds(group));

        if let Err(source) = self
            .cloud
            .set_nodes(group, resolved.count, resolved.min, resolved.max)
            .await
        {
            warn!(%backend, %group, error = %source, "node group resize failed");
            return Err(ScaleError::SetNodes {
                backend,
                group,
                source,
            });
        }

        info!(
            %backend,
            %group,
            from = before,
            to = resolved.count,
            min = resolved.min,
            max = resolved.max,
            "scaling nodes"
        );

        Ok(NodeScaleOutcome {
            group,
            backend,
            before,
            after: resolved.count,
            min: resolved.min,
            max: resolved.max,
        })
    }
}
