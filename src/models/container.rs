// Container snapshot models

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Docker container state; serializes to lowercase JSON (e.g. "running").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContainerState {
    Created,
    Running,
    Paused,
    Restarting,
    Removing,
    Exited,
    Dead,
    #[serde(other)]
    Unknown,
}

impl ContainerState {
    /// Parse from Docker API state string (e.g. "running", "exited").
    pub fn from_docker(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "created" => ContainerState::Created,
            "running" => ContainerState::Running,
            "paused" => ContainerState::Paused,
            "restarting" => ContainerState::Restarting,
            "removing" => ContainerState::Removing,
            "exited" => ContainerState::Exited,
            "dead" => ContainerState::Dead,
            _ => ContainerState::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ContainerState::Created => "created",
            ContainerState::Running => "running",
            ContainerState::Paused => "paused",
            ContainerState::Restarting => "restarting",
            ContainerState::Removing => "removing",
            ContainerState::Exited => "exited",
            ContainerState::Dead => "dead",
            ContainerState::Unknown => "unknown",
        }
    }
}

impl fmt::Display for ContainerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of the in-container liveness probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppHealth {
    Healthy,
    Unhealthy,
}

impl fmt::Display for AppHealth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppHealth::Healthy => f.write_str("healthy"),
            AppHealth::Unhealthy => f.write_str("unhealthy"),
        }
    }
}

/// Fields added in detailed mode. Flattened into the snapshot on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContainerDetail {
    pub network_bytes_sent: u64,
    pub network_bytes_received: u64,
    pub restart_count: u64,
}

/// One running container at collection time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContainerSnapshot {
    pub name: String,
    pub status: ContainerState,
    pub cpu_percent: f64,
    pub memory_percent: f64,
    #[serde(flatten)]
    pub detail: Option<ContainerDetail>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_health: Option<AppHealth>,
}

impl ContainerSnapshot {
    pub fn restart_count(&self) -> Option<u64> {
        self.detail.as_ref().map(|d| d.restart_count)
    }
}

/// Running container as reported by the runtime's listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerHandle {
    pub id: String,
    pub name: String,
}

/// Per-container metadata that lives outside the stats blob.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerMetadata {
    pub status: ContainerState,
    pub restart_count: u64,
}

/// Transmit/receive byte counters of one container network interface.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InterfaceCounters {
    pub rx_bytes: u64,
    pub tx_bytes: u64,
}

/// Raw counters of a single non-streaming stats sample. The runtime embeds the
/// previous (pre-update) CPU counters, so no cross-cycle state is needed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawContainerStats {
    pub cpu_total_usage: u64,
    pub precpu_total_usage: u64,
    pub system_cpu_usage: u64,
    pub precpu_system_cpu_usage: u64,
    pub online_cpus: u32,
    pub memory_usage: u64,
    pub memory_cache: u64,
    pub memory_limit: u64,
    pub networks: HashMap<String, InterfaceCounters>,
}
