//! flotilla-cloud: node-group sizing on a cloud backend.
//!
//! The node scaler reads and writes node counts through the `Cloud`
//! trait. A backend receives the resolved bounds together with the new
//! count so it can enforce them natively (for example as an autoscaling
//! group's own min/max). `MemoryCloud` is the in-memory backend used by
//! tests and `flotillad standalone`.

pub mod memory;

use std::future::Future;
use std::pin::Pin;

use thiserror::Error;

use flotilla_core::NodeGroup;

pub use memory::{MemoryCloud, NodeObserver};

/// Result type alias for cloud calls.
pub type CloudResult<T> = Result<T, CloudError>;

/// Boxed future alias for cloud calls.
pub type CloudFuture<'a, T> = Pin<Box<dyn Future<Output = CloudResult<T>> + Send + 'a>>;

/// Errors surfaced by a cloud backend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CloudError {
    #[error("{group} node group is not configured on {backend}")]
    UnknownGroup { backend: String, group: NodeGroup },

    #[error("{count} {group} nodes is outside the allowed range {min}..={max}")]
    OutOfRange {
        group: NodeGroup,
        count: u64,
        min: u64,
        max: u64,
    },

    #[error("cloud API error: {0}")]
    Api(String),
}

/// A cloud backend that owns the manager and worker node groups.
pub trait Cloud: Send + Sync {
    /// Backend name, used in log lines and messages.
    fn name(&self) -> &str;

    /// Desired node count of a group.
    fn get_nodes(&self, group: NodeGroup) -> CloudFuture<'_, u64>;

    /// Set the node count of a group along with its bounds.
    fn set_nodes(&self, group: NodeGroup, count: u64, min: u64, max: u64) -> CloudFuture<'_, ()>;
}
