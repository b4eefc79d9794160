//! In-memory cloud backend.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::info;

use flotilla_core::NodeGroup;

use crate::{Cloud, CloudError, CloudFuture};

/// Called with `(group, count)` after every successful `set_nodes`.
pub type NodeObserver = Arc<dyn Fn(NodeGroup, u64) + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct GroupState {
    count: u64,
    min: u64,
    max: u64,
}

#[derive(Default)]
struct Inner {
    groups: HashMap<NodeGroup, GroupState>,
    set_calls: u32,
    failing: bool,
    failing_sets: bool,
}

/// Node groups held in memory, shared between clones.
#[derive(Clone)]
pub struct MemoryCloud {
    name: String,
    inner: Arc<RwLock<Inner>>,
    observer: Option<NodeObserver>,
}

impl MemoryCloud {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            inner: Arc::new(RwLock::new(Inner::default())),
            observer: None,
        }
    }

    /// Set the callback notified after node counts change.
    pub fn with_observer(mut self, observer: NodeObserver) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Configure a node group with a count and bounds.
    pub async fn put_group(&self, group: NodeGroup, count: u64, min: u64, max: u64) {
        self.inner
            .write()
            .await
            .groups
            .insert(group, GroupState { count, min, max });
    }

    /// Current `(count, min, max)` of a group.
    pub async fn group(&self, group: NodeGroup) -> Option<(u64, u64, u64)> {
        self.inner
            .read()
            .await
            .groups
            .get(&group)
            .map(|g| (g.count, g.min, g.max))
    }

    /// Number of `set_nodes` calls received.
    pub async fn set_calls(&self) -> u32 {
        self.inner.read().await.set_calls
    }

    /// Make every subsequent call fail.
    pub async fn fail_calls(&self) {
        self.inner.write().await.failing = true;
    }

    /// Make subsequent `set_nodes` calls fail while reads keep working.
    pub async fn fail_sets(&self) {
        self.inner.write().await.failing_sets = true;
    }

    fn unknown(&self, group: NodeGroup) -> CloudError {
        CloudError::UnknownGroup {
            backend: self.name.clone(),
            group,
        }
    }
}

impl Cloud for MemoryCloud {
    fn name(&self) -> &str {
        &self.name
    }

    fn get_nodes(&self, group: NodeGroup) -> CloudFuture<'_, u64> {
        Box::pin(async move {
            let inner = self.inner.read().await;
            if inner.failing {
                return Err(CloudError::Api(format!("{} unavailable", self.name)));
            }
            inner
                .groups
                .get(&group)
                .map(|g| g.count)
                .ok_or_else(|| self.unknown(group))
        })
    }

    fn set_nodes(&self, group: NodeGroup, count: u64, min: u64, max: u64) -> CloudFuture<'_, ()> {
        Box::pin(async move {
            {
                let mut inner = self.inner.write().await;
                inner.set_calls += 1;
                if inner.failing || inner.failing_sets {
                    return Err(CloudError::Api(format!("{} unavailable", self.name)));
                }
                if count < min || count > max {
                    return Err(CloudError::OutOfRange {
                        group,
                        count,
                        min,
                        max,
                    });
                }
                let state = inner
                    .groups
                    .get_mut(&group)
                    .ok_or_else(|| self.unknown(group))?;
                *state = GroupState { count, min, max };
            }

            info!(backend = %self.name, %group, count, min, max, "node group resized");
            if let Some(ref observer) = self.observer {
                observer(group, count);
            }
            Ok(())
        })
    }
}
