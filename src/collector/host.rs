// Host snapshot assembly

use super::HostSource;
use crate::config::HostConfig;
use crate::error::CollectionError;
use crate::models::{HostDetail, HostSnapshot};
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tracing::instrument;

pub struct HostCollector {
    source: Arc<dyn HostSource>,
    disk_path: String,
    cpu_sample: Duration,
}

impl HostCollector {
    pub fn new(source: Arc<dyn HostSource>, config: &HostConfig) -> Self {
        Self {
            source,
            disk_path: config.disk_path.clone(),
            cpu_sample: Duration::from_millis(config.cpu_sample_ms),
        }
    }

    /// Samples cpu, memory and disk, then the detailed set when asked.
    #[instrument(skip(self), fields(collector = "host"))]
    pub async fn collect(&self, detailed: bool) -> Result<HostSnapshot, CollectionError> {
        let result = self.sample(detailed).await;
        match &result {
            Ok(snapshot) => tracing::info!(
                operation = "collect_host",
                cpu_percent = snapshot.cpu_percent,
                memory_percent = snapshot.memory_percent,
                disk_percent = snapshot.disk_percent,
                detail = ?snapshot.detail,
                "Fetched server health"
            ),
            Err(e) => tracing::error!(
                operation = "collect_host",
                error = %e,
                "Failed to fetch server health"
            ),
        }
        result
    }

    async fn sample(&self, detailed: bool) -> Result<HostSnapshot, CollectionError> {
        let cpu_percent = self.source.cpu_percent(self.cpu_sample).await?;
        let memory_percent = self.source.memory_percent().await?;
        let disk_percent = self.source.disk_percent(&self.disk_path).await?;

        let detail = if detailed {
            let net = self.source.net_counters().await?;
            let boot_time = self.source.boot_time().await?;
            let uptime_seconds = (Utc::now() - boot_time)
                .to_std()
                .map(|d| d.as_secs_f64())
                .unwrap_or(0.0);
            let process_count = self.source.pid_count().await?;
            let load = self.source.load_averages().await?;
            Some(HostDetail {
                network_bytes_sent: net.tx_bytes,
                network_bytes_received: net.rx_bytes,
                uptime_seconds,
                process_count,
                load,
            })
        } else {
            None
        };

        Ok(HostSnapshot {
            cpu_percent,
            memory_percent,
            disk_percent,
            detail,
        })
    }
}
