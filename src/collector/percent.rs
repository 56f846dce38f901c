// Percentages derived from raw cumulative counters.

/// CPU usage of a container between two samples of its cumulative counters.
///
/// Returns `0.0` when the system counter did not advance (first sample, clock
/// skew). The result is not clamped: inconsistent counters can yield values
/// above `100 * online_cpus` or below zero.
pub fn cpu_usage_percent(
    current_total: u64,
    previous_total: u64,
    current_system: u64,
    previous_system: u64,
    online_cpus: u32,
) -> f64 {
    let cpu_delta = current_total as i128 - previous_total as i128;
    let system_delta = current_system as i128 - previous_system as i128;
    if system_delta <= 0 {
        return 0.0;
    }
    (cpu_delta as f64 / system_delta as f64) * online_cpus as f64 * 100.0
}

/// Memory pressure as a share of the limit. Cache is reclaimable and excluded.
/// A zero limit means unknown/unlimited and yields `0.0`.
pub fn memory_usage_percent(used_bytes: u64, cache_bytes: u64, limit_bytes: u64) -> f64 {
    if limit_bytes == 0 {
        return 0.0;
    }
    let effective_used = used_bytes.saturating_sub(cache_bytes);
    effective_used as f64 / limit_bytes as f64 * 100.0
}
