//! flotilla-reschedule: force workloads onto newly joined nodes.
//!
//! After a node group grows, running tasks stay where they are. The
//! rescheduler stamps a marker value into the environment of every
//! service labeled for rescheduling, which makes the orchestrator
//! recreate their tasks and spread them across the new nodes.
//!
//! # Wait state machine
//!
//! ```text
//! Idle ──wait_for_node_count──▶ Waiting ──count == target──▶ reschedule_all ─▶ Completed | Failed
//!                                  │
//!                                  ├──timeout / count read error──▶ Failed
//!                                  └──newer wait started──────────▶ Canceled
//! ```
//!
//! Only one wait is live per `Rescheduler`. A new request is always
//! accepted: the previous wait is signaled, reports a cancellation
//! status, and exits without rescheduling.

pub mod error;
pub mod marker;
pub mod rescheduler;

pub use error::{RescheduleError, RescheduleResult, ServiceFailure};
pub use marker::stamp_marker;
pub use rescheduler::{
    RescheduleSettings, RescheduleSummary, Rescheduler, WaitChannels, CANCELED_STATUS,
};
