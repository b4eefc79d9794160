//! flotilla-autoscale: bounded scaling of service replicas and node groups.
//!
//! A scale request names a target, a direction and an optional step. The
//! scalers read the target's current count and labels, resolve new bounds
//! and count, and apply the result through the orchestrator or cloud seam.
//!
//! # Bound resolution
//!
//! ```text
//! step  = delta                          if delta != 0
//!       = label[scale{Up,Down}By]        if parseable
//!       = default_scale_{up,down}_by     otherwise
//! min   = label[min] if a non-negative integer, else default_min
//! max   = label[max] if a non-negative integer, else default_max
//! count = clamp(max(current ± step, 0), min, max)
//! ```
//!
//! When `count == current` a service is already at its bound: the scaler
//! reports that and makes no update call.

pub mod bounds;
pub mod error;
pub mod node;
pub mod service;

pub use bounds::{resolve, ResolvedBounds};
pub use error::{ScaleError, ScaleResult};
pub use node::{NodeScaleOutcome, NodeScaler};
pub use service::{ScaleOutcome, ServiceScaler};
