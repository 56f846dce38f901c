// Human-readable and JSON rendering of snapshots

use crate::models::{ContainerSnapshot, HostSnapshot};
use serde::Serialize;
use std::fmt::Write;

pub fn host_text(snapshot: &HostSnapshot) -> String {
    let mut out = format!(
        "CPU: {:.1}% | Memory: {:.1}% | Disk: {:.1}%",
        snapshot.cpu_percent, snapshot.memory_percent, snapshot.disk_percent
    );
    if let Some(detail) = &snapshot.detail {
        let _ = write!(
            out,
            "\nNetwork: sent {} B | received {} B\nUptime: {} | Processes: {}",
            detail.network_bytes_sent,
            detail.network_bytes_received,
            format_uptime(detail.uptime_seconds),
            detail.process_count
        );
        if let Some(load) = &detail.load {
            let _ = write!(
                out,
                "\nLoad average: {:.2} {:.2} {:.2}",
                load.one, load.five, load.fifteen
            );
        }
    }
    out
}

pub fn containers_text(containers: &[ContainerSnapshot]) -> String {
    if containers.is_empty() {
        return "No running containers".to_string();
    }
    containers
        .iter()
        .map(container_line)
        .collect::<Vec<_>>()
        .join("\n")
}

fn container_line(c: &ContainerSnapshot) -> String {
    let mut line = format!(
        "{} [{}] CPU: {:.1}% | Memory: {:.1}%",
        c.name, c.status, c.cpu_percent, c.memory_percent
    );
    if let Some(detail) = &c.detail {
        let _ = write!(
            line,
            " | Net sent: {} B | Net received: {} B | Restarts: {}",
            detail.network_bytes_sent, detail.network_bytes_received, detail.restart_count
        );
    }
    if let Some(health) = c.app_health {
        let _ = write!(line, " | App: {}", health);
    }
    line
}

/// `1d 02h 03m 04s` style; seconds are truncated.
fn format_uptime(seconds: f64) -> String {
    let total = seconds.max(0.0) as u64;
    let (days, rem) = (total / 86_400, total % 86_400);
    let (hours, rem) = (rem / 3600, rem % 3600);
    let (minutes, secs) = (rem / 60, rem % 60);
    if days > 0 {
        format!("{}d {:02}h {:02}m {:02}s", days, hours, minutes, secs)
    } else {
        format!("{:02}h {:02}m {:02}s", hours, minutes, secs)
    }
}

pub fn json<T: Serialize + ?Sized>(value: &T) -> serde_json::Result<String> {
    serde_json::to_string_pretty(value)
}
