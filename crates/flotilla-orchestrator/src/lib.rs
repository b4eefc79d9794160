//! flotilla-orchestrator: the orchestrator seams the control plane consumes.
//!
//! The scalers and the rescheduler never talk to an orchestrator API
//! directly; they go through four narrow traits:
//!
//! - **`Inspector`**: read one service descriptor
//! - **`ServiceUpdater`**: write a spec back, version-checked
//! - **`ServiceLister`**: list services carrying a label
//! - **`NodeCounter`**: count joined manager/worker nodes
//!
//! `MemoryOrchestrator` implements all four in memory and backs both the
//! test suites and `flotillad standalone`.

pub mod error;
pub mod memory;
pub mod traits;

pub use error::{OrchestratorError, OrchestratorResult};
pub use memory::MemoryOrchestrator;
pub use traits::{
    Inspector, NodeCounter, Orchestrator, OrchestratorFuture, ServiceLister, ServiceUpdater,
};
