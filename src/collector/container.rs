// Per-container snapshot assembly

use super::ContainerRuntime;
use super::percent::{cpu_usage_percent, memory_usage_percent};
use crate::config::ContainerConfig;
use crate::error::{CollectionError, RuntimeError};
use crate::models::{AppHealth, ContainerDetail, ContainerHandle, ContainerSnapshot};
use std::sync::Arc;
use tracing::instrument;

pub struct ContainerCollector {
    runtime: Arc<dyn ContainerRuntime>,
    network_interface: String,
    probe_command: String,
}

impl ContainerCollector {
    pub fn new(runtime: Arc<dyn ContainerRuntime>, config: &ContainerConfig) -> Self {
        Self {
            runtime,
            network_interface: config.network_interface.clone(),
            probe_command: config.probe_command.clone(),
        }
    }

    /// One snapshot per running container, fetched sequentially. No running
    /// containers is an empty list, not an error. Only an unreachable runtime
    /// fails the call; a container that cannot be sampled is skipped.
    #[instrument(skip(self), fields(collector = "containers"))]
    pub async fn collect(
        &self,
        detailed: bool,
        app_check: bool,
    ) -> Result<Vec<ContainerSnapshot>, CollectionError> {
        let result = self.sample_all(detailed, app_check).await;
        match &result {
            Ok(snapshots) => tracing::info!(
                operation = "collect_containers",
                containers = snapshots.len(),
                snapshots = ?snapshots,
                "Fetched container health"
            ),
            Err(e) => tracing::error!(
                operation = "collect_containers",
                error = %e,
                "Failed to fetch container health"
            ),
        }
        result
    }

    async fn sample_all(
        &self,
        detailed: bool,
        app_check: bool,
    ) -> Result<Vec<ContainerSnapshot>, CollectionError> {
        let containers = self.runtime.list_running().await?;
        let mut snapshots = Vec::with_capacity(containers.len());
        for container in &containers {
            match self.sample_one(container, detailed, app_check).await {
                Ok(snapshot) => snapshots.push(snapshot),
                Err(RuntimeError::NotFound(_)) => {
                    tracing::warn!(
                        container = %container.name,
                        "Container went away before it could be sampled; skipping"
                    );
                }
                Err(e @ RuntimeError::Api(_)) => {
                    tracing::warn!(
                        container = %container.name,
                        error = %e,
                        operation = "sample_container",
                        "Skipping container that could not be sampled"
                    );
                }
                Err(e @ RuntimeError::Unavailable(_)) => return Err(e.into()),
            }
        }
        Ok(snapshots)
    }

    async fn sample_one(
        &self,
        container: &ContainerHandle,
        detailed: bool,
        app_check: bool,
    ) -> Result<ContainerSnapshot, RuntimeError> {
        let stats = self.runtime.stats(container).await?;
        let metadata = self.runtime.inspect(container).await?;

        let cpu_percent = cpu_usage_percent(
            stats.cpu_total_usage,
            stats.precpu_total_usage,
            stats.system_cpu_usage,
            stats.precpu_system_cpu_usage,
            stats.online_cpus,
        );
        let memory_percent =
            memory_usage_percent(stats.memory_usage, stats.memory_cache, stats.memory_limit);

        let detail = detailed.then(|| {
            let iface = stats
                .networks
                .get(&self.network_interface)
                .copied()
                .unwrap_or_default();
            ContainerDetail {
                network_bytes_sent: iface.tx_bytes,
                network_bytes_received: iface.rx_bytes,
                restart_count: metadata.restart_count,
            }
        });

        let app_health = if app_check {
            Some(self.probe(container).await)
        } else {
            None
        };

        Ok(ContainerSnapshot {
            name: container.name.clone(),
            status: metadata.status,
            cpu_percent,
            memory_percent,
            detail,
            app_health,
        })
    }

    /// Probe failures are data, never errors.
    async fn probe(&self, container: &ContainerHandle) -> AppHealth {
        match self
            .runtime
            .exec_probe(container, &self.probe_command)
            .await
        {
            Ok(0) => AppHealth::Healthy,
            Ok(code) => {
                tracing::debug!(container = %container.name, exit_code = code, "App probe failed");
                AppHealth::Unhealthy
            }
            Err(e) => {
                tracing::error!(
                    container = %container.name,
                    error = %e,
                    "Failed to check app health"
                );
                AppHealth::Unhealthy
            }
        }
    }
}
