// Host snapshot models

use serde::{Deserialize, Serialize};

/// 1/5/15 minute load averages; only present on platforms that expose them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LoadAverages {
    #[serde(rename = "load_avg_1min")]
    pub one: f64,
    #[serde(rename = "load_avg_5min")]
    pub five: f64,
    #[serde(rename = "load_avg_15min")]
    pub fifteen: f64,
}

/// Fields added in detailed mode. Either all present or all absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostDetail {
    pub network_bytes_sent: u64,
    pub network_bytes_received: u64,
    pub uptime_seconds: f64,
    pub process_count: u64,
    #[serde(flatten)]
    pub load: Option<LoadAverages>,
}

/// Point-in-time host measurement. Serializes flat, e.g.
/// `{"cpu_percent": 10.0, "memory_percent": 50.0, "disk_percent": 75.0}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostSnapshot {
    pub cpu_percent: f64,
    pub memory_percent: f64,
    pub disk_percent: f64,
    #[serde(flatten)]
    pub detail: Option<HostDetail>,
}
