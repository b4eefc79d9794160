//! flotilla.toml configuration parser.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use anyhow::{bail, Context};

use crate::types::{BoundsConfig, NodeGroup};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FlotillaConfig {
    pub server: ServerConfig,
    pub service: BoundsConfig,
    pub manager: ManagerBounds,
    pub worker: WorkerBounds,
    pub reschedule: RescheduleConfig,
    pub standalone: StandaloneConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { port: 8080 }
    }
}

/// Manager node bounds. Fields missing from the file keep the manager defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "BoundsOverrides", into = "BoundsConfig")]
pub struct ManagerBounds(pub BoundsConfig);

impl Default for ManagerBounds {
    fn default() -> Self {
        Self(BoundsConfig::nodes(NodeGroup::Manager))
    }
}

impl From<BoundsOverrides> for ManagerBounds {
    fn from(o: BoundsOverrides) -> Self {
        Self(o.apply(BoundsConfig::nodes(NodeGroup::Manager)))
    }
}

impl From<ManagerBounds> for BoundsConfig {
    fn from(b: ManagerBounds) -> Self {
        b.0
    }
}

/// Worker node bounds. Fields missing from the file keep the worker defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "BoundsOverrides", into = "BoundsConfig")]
pub struct WorkerBounds(pub BoundsConfig);

impl Default for WorkerBounds {
    fn default() -> Self {
        Self(BoundsConfig::nodes(NodeGroup::Worker))
    }
}

impl From<BoundsOverrides> for WorkerBounds {
    fn from(o: BoundsOverrides) -> Self {
        Self(o.apply(BoundsConfig::nodes(NodeGroup::Worker)))
    }
}

impl From<WorkerBounds> for BoundsConfig {
    fn from(b: WorkerBounds) -> Self {
        b.0
    }
}

/// A `BoundsConfig` section as written in the file, every field optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct BoundsOverrides {
    pub min_label: Option<String>,
    pub max_label: Option<String>,
    pub scale_down_label: Option<String>,
    pub scale_up_label: Option<String>,
    pub default_min: Option<u64>,
    pub default_max: Option<u64>,
    pub default_scale_down_by: Option<u64>,
    pub default_scale_up_by: Option<u64>,
}

impl BoundsOverrides {
    fn apply(self, base: BoundsConfig) -> BoundsConfig {
        BoundsConfig {
            min_label: self.min_label.unwrap_or(base.min_label),
            max_label: self.max_label.unwrap_or(base.max_label),
            scale_down_label: self.scale_down_label.unwrap_or(base.scale_down_label),
            scale_up_label: self.scale_up_label.unwrap_or(base.scale_up_label),
            default_min: self.default_min.unwrap_or(base.default_min),
            default_max: self.default_max.unwrap_or(base.default_max),
            default_scale_down_by: self
                .default_scale_down_by
                .unwrap_or(base.default_scale_down_by),
            default_scale_up_by: self
                .default_scale_up_by
                .unwrap_or(base.default_scale_up_by),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RescheduleConfig {
    /// Only services carrying `filter_label=filter_value` are rescheduled.
    pub filter_label: String,
    pub filter_value: String,
    /// Environment variable stamped with the marker value.
    pub env_key: String,
    /// Node-count poll interval (e.g. "60s").
    pub interval: String,
    /// Give up waiting for nodes after this long (e.g. "1000s").
    pub timeout: String,
}

impl Default for RescheduleConfig {
    fn default() -> Self {
        Self {
            filter_label: "com.flotilla.reschedule".to_string(),
            filter_value: "true".to_string(),
            env_key: "RESCHEDULE_DATE".to_string(),
            interval: "60s".to_string(),
            timeout: "1000s".to_string(),
        }
    }
}

impl RescheduleConfig {
    pub fn interval(&self) -> anyhow::Result<Duration> {
        parse_duration(&self.interval)
            .with_context(|| format!("invalid reschedule interval '{}'", self.interval))
    }

    pub fn timeout(&self) -> anyhow::Result<Duration> {
        parse_duration(&self.timeout)
            .with_context(|| format!("invalid reschedule timeout '{}'", self.timeout))
    }
}

/// Seed state for the in-memory backends used by `flotillad standalone`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StandaloneConfig {
    pub manager_nodes: u64,
    pub worker_nodes: u64,
    /// How long simulated nodes take to join after a cloud change.
    pub join_delay: String,
    pub services: Vec<SeedService>,
}

impl Default for StandaloneConfig {
    fn default() -> Self {
        Self {
            manager_nodes: 3,
            worker_nodes: 2,
            join_delay: "5s".to_string(),
            services: Vec::new(),
        }
    }
}

impl StandaloneConfig {
    pub fn join_delay(&self) -> anyhow::Result<Duration> {
        parse_duration(&self.join_delay)
            .with_context(|| format!("invalid join delay '{}'", self.join_delay))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedService {
    pub name: String,
    #[serde(default)]
    pub replicas: Option<u64>,
    #[serde(default)]
    pub global: bool,
    #[serde(default)]
    pub labels: HashMap<String, String>,
}

impl FlotillaConfig {
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let config: FlotillaConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> anyhow::Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Bounds for the given node group.
    pub fn node_bounds(&self, group: NodeGroup) -> &BoundsConfig {
        match group {
            NodeGroup::Manager => &self.manager.0,
            NodeGroup::Worker => &self.worker.0,
        }
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.reschedule.interval()?.is_zero() {
            bail!("reschedule interval must be greater than zero");
        }
        self.reschedule.timeout()?;
        self.standalone.join_delay()?;
        Ok(())
    }
}

/// Parse a duration string like "500ms", "30s", "5m", "1h" or bare seconds.
pub fn parse_duration(s: &str) -> Option<Duration> {
    let s = s.trim();
    if let Some(ms) = s.strip_suffix("ms") {
        ms.parse::<u64>().ok().map(Duration::from_millis)
    } else if let Some(secs) = s.strip_suffix('s') {
        secs.parse::<u64>().ok().map(Duration::from_secs)
    } else if let Some(mins) = s.strip_suffix('m') {
        mins.parse::<u64>()
            .ok()
            .and_then(|m| m.checked_mul(60))
            .map(Duration::from_secs)
    } else if let Some(hours) = s.strip_suffix('h') {
        hours
            .parse::<u64>()
            .ok()
            .and_then(|h| h.checked_mul(3600))
            .map(Duration::from_secs)
    } else {
        s.parse::<u64>().ok().map(Duration::from_secs)
    }
}
