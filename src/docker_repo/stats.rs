// Extract raw counters from a Docker stats API response.

use crate::error::RuntimeError;
use crate::models::{InterfaceCounters, RawContainerStats};
use bollard::models::ContainerStatsResponse;

/// Convert a raw Docker stats response into calculator input. Exposed for unit tests.
///
/// `cpu_stats` is required. A missing `precpu_stats` is read as zero counters,
/// which the daemon sends on the very first sample of a container.
pub(crate) fn raw_stats(s: &ContainerStatsResponse) -> Result<RawContainerStats, RuntimeError> {
    let cpu_stats = s
        .cpu_stats
        .as_ref()
        .ok_or_else(|| RuntimeError::Api("stats response has no cpu_stats".into()))?;
    let cpu_usage = cpu_stats.cpu_usage.as_ref();
    let precpu_stats = s.precpu_stats.as_ref();
    let precpu_usage = precpu_stats.and_then(|p| p.cpu_usage.as_ref());

    let online_cpus = cpu_stats
        .online_cpus
        .filter(|n| *n > 0)
        .or_else(|| {
            cpu_usage
                .and_then(|u| u.percpu_usage.as_ref())
                .map(|v| v.len() as u32)
                .filter(|n| *n > 0)
        })
        .unwrap_or(1);

    let memory = s.memory_stats.as_ref();
    // cgroup v1 reports "cache", cgroup v2 "inactive_file".
    let memory_cache = memory
        .and_then(|m| m.stats.as_ref())
        .and_then(|st| st.get("cache").or_else(|| st.get("inactive_file")))
        .copied()
        .unwrap_or(0);

    let networks = s
        .networks
        .as_ref()
        .map(|n| {
            n.iter()
                .map(|(name, v)| {
                    (
                        name.clone(),
                        InterfaceCounters {
                            rx_bytes: v.rx_bytes.unwrap_or(0),
                            tx_bytes: v.tx_bytes.unwrap_or(0),
                        },
                    )
                })
                .collect()
        })
        .unwrap_or_default();

    Ok(RawContainerStats {
        cpu_total_usage: cpu_usage.and_then(|u| u.total_usage).unwrap_or(0),
        precpu_total_usage: precpu_usage.and_then(|u| u.total_usage).unwrap_or(0),
        system_cpu_usage: cpu_stats.system_cpu_usage.unwrap_or(0),
        precpu_system_cpu_usage: precpu_stats.and_then(|p| p.system_cpu_usage).unwrap_or(0),
        online_cpus,
        memory_usage: memory.and_then(|m| m.usage).unwrap_or(0),
        memory_cache,
        memory_limit: memory.and_then(|m| m.limit).unwrap_or(0),
        networks,
    })
}
