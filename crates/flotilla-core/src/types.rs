//! Domain types shared by the scalers, the rescheduler and the backends.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Orchestrator-assigned service identifier.
pub type ServiceId = String;

/// Error returned when parsing a direction or node group from text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid {kind} '{value}'")]
pub struct ParseKindError {
    pub kind: &'static str,
    pub value: String,
}

// ── Direction ─────────────────────────────────────────────────────

/// Which way a scale request moves the target count.
///
/// Always supplied by the caller; a zero delta means "use the step from
/// labels or defaults", so the sign of the delta cannot carry it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScaleDirection {
    Up,
    Down,
}

impl fmt::Display for ScaleDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Up => f.write_str("up"),
            Self::Down => f.write_str("down"),
        }
    }
}

impl FromStr for ScaleDirection {
    type Err = ParseKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "up" => Ok(Self::Up),
            "down" => Ok(Self::Down),
            _ => Err(ParseKindError {
                kind: "scale direction",
                value: s.to_string(),
            }),
        }
    }
}

// ── Node group ────────────────────────────────────────────────────

/// The manager or worker partition of cluster nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeGroup {
    Manager,
    Worker,
}

impl NodeGroup {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Manager => "manager",
            Self::Worker => "worker",
        }
    }
}

impl fmt::Display for NodeGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NodeGroup {
    type Err = ParseKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "manager" => Ok(Self::Manager),
            "worker" => Ok(Self::Worker),
            _ => Err(ParseKindError {
                kind: "node group",
                value: s.to_string(),
            }),
        }
    }
}

// ── Service ───────────────────────────────────────────────────────

/// Scheduling topology of a service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServiceMode {
    /// A fixed number of tasks. The count may be missing on malformed specs.
    Replicated { replicas: Option<u64> },
    /// One task per node; cannot be scaled.
    Global,
}

/// A service as read from the orchestrator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceDescriptor {
    pub id: ServiceId,
    pub name: String,
    /// Version token; updates carrying a stale token are rejected.
    pub version: u64,
    pub labels: HashMap<String, String>,
    pub mode: ServiceMode,
    /// Container environment as `KEY=VALUE` entries.
    #[serde(default)]
    pub env: Vec<String>,
}

impl ServiceDescriptor {
    /// Current replica count, if the service is replicated and has one.
    pub fn replicas(&self) -> Option<u64> {
        match self.mode {
            ServiceMode::Replicated { replicas } => replicas,
            ServiceMode::Global => None,
        }
    }

    pub fn is_global(&self) -> bool {
        matches!(self.mode, ServiceMode::Global)
    }
}

// ── Bounds ────────────────────────────────────────────────────────

/// Label names and defaults for one class of scalable target.
///
/// One instance per class (service replicas, manager nodes, worker nodes);
/// the classes never share or merge settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoundsConfig {
    pub min_label: String,
    pub max_label: String,
    pub scale_down_label: String,
    pub scale_up_label: String,
    pub default_min: u64,
    pub default_max: u64,
    pub default_scale_down_by: u64,
    pub default_scale_up_by: u64,
}

impl BoundsConfig {
    /// Defaults for service replicas.
    pub fn service() -> Self {
        Self {
            min_label: "com.flotilla.scaleMin".to_string(),
            max_label: "com.flotilla.scaleMax".to_string(),
            scale_down_label: "com.flotilla.scaleDownBy".to_string(),
            scale_up_label: "com.flotilla.scaleUpBy".to_string(),
            default_min: 1,
            default_max: 5,
            default_scale_down_by: 1,
            default_scale_up_by: 1,
        }
    }

    /// Defaults for a node group.
    pub fn nodes(group: NodeGroup) -> Self {
        let (prefix, min, max) = match group {
            NodeGroup::Manager => ("Manager", 3, 7),
            NodeGroup::Worker => ("Worker", 0, 5),
        };
        Self {
            min_label: format!("com.flotilla.scale{prefix}NodeMin"),
            max_label: format!("com.flotilla.scale{prefix}NodeMax"),
            scale_down_label: format!("com.flotilla.scale{prefix}NodeDownBy"),
            scale_up_label: format!("com.flotilla.scale{prefix}NodeUpBy"),
            default_min: min,
            default_max: max,
            default_scale_down_by: 1,
            default_scale_up_by: 1,
        }
    }
}

impl Default for BoundsConfig {
    fn default() -> Self {
        Self::service()
    }
}
