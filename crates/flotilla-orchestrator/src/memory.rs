//! In-memory orchestrator backend.
//!
//! Holds service descriptors and per-group ready-node counts behind an
//! `Arc<RwLock<..>>`, so clones share state across tasks. Updates are
//! version-checked like a real orchestrator, and failures can be
//! injected per service for testing partial-failure paths.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::debug;

use flotilla_core::{NodeGroup, ServiceDescriptor};

use crate::error::{OrchestratorError, OrchestratorResult};
use crate::traits::{Inspector, NodeCounter, OrchestratorFuture, ServiceLister, ServiceUpdater};

#[derive(Default)]
struct Inner {
    /// service_id → descriptor.
    services: HashMap<String, ServiceDescriptor>,
    /// service_id → number of update calls received (including failed ones).
    update_calls: HashMap<String, u32>,
    managers: u64,
    workers: u64,
    failing_updates: HashSet<String>,
    fail_list: bool,
    fail_node_count: bool,
}

/// Shared in-memory orchestrator.
#[derive(Clone, Default)]
pub struct MemoryOrchestrator {
    inner: Arc<RwLock<Inner>>,
}

impl MemoryOrchestrator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a service.
    pub async fn put_service(&self, service: ServiceDescriptor) {
        let mut inner = self.inner.write().await;
        inner.services.insert(service.id.clone(), service);
    }

    /// Current stored descriptor for a service.
    pub async fn service(&self, service_id: &str) -> Option<ServiceDescriptor> {
        self.inner.read().await.services.get(service_id).cloned()
    }

    /// Number of update calls made against a service so far.
    pub async fn update_calls(&self, service_id: &str) -> u32 {
        self.inner
            .read()
            .await
            .update_calls
            .get(service_id)
            .copied()
            .unwrap_or(0)
    }

    /// Total update calls across all services.
    pub async fn total_update_calls(&self) -> u32 {
        self.inner.read().await.update_calls.values().sum()
    }

    /// Set the ready-node count for a group (simulates nodes joining or leaving).
    pub async fn set_node_count(&self, group: NodeGroup, count: u64) {
        let mut inner = self.inner.write().await;
        match group {
            NodeGroup::Manager => inner.managers = count,
            NodeGroup::Worker => inner.workers = count,
        }
        debug!(%group, count, "ready node count changed");
    }

    /// Make every update to `service_id` fail.
    pub async fn fail_updates(&self, service_id: &str) {
        self.inner
            .write()
            .await
            .failing_updates
            .insert(service_id.to_string());
    }

    /// Make list calls fail.
    pub async fn fail_list(&self) {
        self.inner.write().await.fail_list = true;
    }

    /// Make node-count reads fail.
    pub async fn fail_node_count(&self) {
        self.inner.write().await.fail_node_count = true;
    }
}

impl Inspector for MemoryOrchestrator {
    fn describe<'a>(&'a self, service_id: &'a str) -> OrchestratorFuture<'a, ServiceDescriptor> {
        Box::pin(async move {
            self.inner
                .read()
                .await
                .services
                .get(service_id)
                .cloned()
                .ok_or_else(|| OrchestratorError::NotFound(service_id.to_string()))
        })
    }
}

impl ServiceUpdater for MemoryOrchestrator {
    fn update<'a>(
        &'a self,
        service_id: &'a str,
        version: u64,
        spec: ServiceDescriptor,
    ) -> OrchestratorFuture<'a, ()> {
        Box::pin(async move {
            let mut inner = self.inner.write().await;
            *inner.update_calls.entry(service_id.to_string()).or_default() += 1;

            if inner.failing_updates.contains(service_id) {
                return Err(OrchestratorError::Api(format!(
                    "update of {service_id} rejected"
                )));
            }

            let current = inner
                .services
                .get_mut(service_id)
                .ok_or_else(|| OrchestratorError::NotFound(service_id.to_string()))?;

            if current.version != version {
                return Err(OrchestratorError::VersionConflict {
                    service: service_id.to_string(),
                    expected: current.version,
                    actual: version,
                });
            }

            let next_version = version + 1;
            *current = ServiceDescriptor {
                id: service_id.to_string(),
                version: next_version,
                ..spec
            };
            debug!(service = %service_id, version = next_version, "service updated");
            Ok(())
        })
    }
}

impl ServiceLister for MemoryOrchestrator {
    fn list<'a>(
        &'a self,
        label: &'a str,
        value: &'a str,
    ) -> OrchestratorFuture<'a, Vec<ServiceDescriptor>> {
        Box::pin(async move {
            let inner = self.inner.read().await;
            if inner.fail_list {
                return Err(OrchestratorError::Api("service list unavailable".to_string()));
            }

            let mut matched: Vec<ServiceDescriptor> = inner
                .services
                .values()
                .filter(|s| s.labels.get(label).is_some_and(|v| v == value))
                .cloned()
                .collect();
            matched.sort_by(|a, b| a.name.cmp(&b.name));
            Ok(matched)
        })
    }
}

impl NodeCounter for MemoryOrchestrator {
    fn node_count(&self, group: NodeGroup) -> OrchestratorFuture<'_, u64> {
        Box::pin(async move {
            let inner = self.inner.read().await;
            if inner.fail_node_count {
                return Err(OrchestratorError::Api("node list unavailable".to_string()));
            }
            Ok(match group {
                NodeGroup::Manager => inner.managers,
                NodeGroup::Worker => inner.workers,
            })
        })
    }
}
