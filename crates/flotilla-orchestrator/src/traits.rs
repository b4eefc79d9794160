//! Orchestrator seams consumed by the scalers and the rescheduler.
//!
//! Each seam is a small object-safe trait returning a boxed future, so
//! the core holds `Arc<dyn ...>` handles and tests swap in the in-memory
//! backend. Adapters for a real orchestrator API live outside this crate.

use std::future::Future;
use std::pin::Pin;

use flotilla_core::{NodeGroup, ServiceDescriptor};

use crate::error::OrchestratorResult;

/// Boxed future alias for orchestrator calls.
pub type OrchestratorFuture<'a, T> =
    Pin<Box<dyn Future<Output = OrchestratorResult<T>> + Send + 'a>>;

/// Reads a service descriptor.
pub trait Inspector: Send + Sync {
    fn describe<'a>(&'a self, service_id: &'a str) -> OrchestratorFuture<'a, ServiceDescriptor>;
}

/// Writes a service spec back to the orchestrator.
pub trait ServiceUpdater: Send + Sync {
    /// Replace the spec of `service_id`.
    ///
    /// Must fail when `version` is not the service's current version.
    fn update<'a>(
        &'a self,
        service_id: &'a str,
        version: u64,
        spec: ServiceDescriptor,
    ) -> OrchestratorFuture<'a, ()>;
}

/// Lists services carrying a label.
pub trait ServiceLister: Send + Sync {
    fn list<'a>(
        &'a self,
        label: &'a str,
        value: &'a str,
    ) -> OrchestratorFuture<'a, Vec<ServiceDescriptor>>;
}

/// Counts the nodes of a group that have joined the cluster.
pub trait NodeCounter: Send + Sync {
    fn node_count(&self, group: NodeGroup) -> OrchestratorFuture<'_, u64>;
}

/// Every orchestrator seam at once.
pub trait Orchestrator: Inspector + ServiceUpdater + ServiceLister + NodeCounter {}

impl<T> Orchestrator for T where T: Inspector + ServiceUpdater + ServiceLister + NodeCounter {}
