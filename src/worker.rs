// Exporter loop: collect, write gauges, sleep, repeat until shutdown.

use crate::collector::{ContainerCollector, HostCollector};
use crate::error::CollectionError;
use crate::metrics::ExporterMetrics;
use std::future::Future;
use std::sync::Arc;
use tokio::time::Duration;
use tracing::Instrument;

/// Collectors, registry and shutdown for the worker.
pub struct WorkerDeps {
    pub host: Arc<HostCollector>,
    pub containers: Arc<ContainerCollector>,
    pub metrics: Arc<ExporterMetrics>,
    pub shutdown_rx: tokio::sync::oneshot::Receiver<()>,
}

/// Worker timing.
pub struct WorkerConfig {
    /// Sleep after each cycle, measured from the end of the cycle.
    pub interval: Duration,
    /// Upper bound on each collection call.
    pub collect_timeout: Duration,
}

async fn bounded<T>(
    operation: &'static str,
    timeout: Duration,
    fut: impl Future<Output = Result<T, CollectionError>>,
) -> Result<T, CollectionError> {
    tokio::time::timeout(timeout, fut)
        .await
        .map_err(|_| CollectionError::Timeout { operation, timeout })?
}

/// One export cycle. A host failure skips the container step; gauges keep
/// their last written values on any failure.
pub async fn run_cycle(
    host: &HostCollector,
    containers: &ContainerCollector,
    metrics: &ExporterMetrics,
    collect_timeout: Duration,
) -> Result<(), CollectionError> {
    let snapshot = bounded("collect_host", collect_timeout, host.collect(false)).await?;
    metrics.record_host(&snapshot);

    let list = bounded(
        "collect_containers",
        collect_timeout,
        containers.collect(false, false),
    )
    .await?;
    metrics.record_containers(&list);
    Ok(())
}

pub fn spawn(deps: WorkerDeps, config: WorkerConfig) -> tokio::task::JoinHandle<()> {
    let WorkerDeps {
        host,
        containers,
        metrics,
        mut shutdown_rx,
    } = deps;
    let WorkerConfig {
        interval,
        collect_timeout,
    } = config;

    let interval_ms = interval.as_millis() as u64;
    let worker_span = tracing::span!(tracing::Level::DEBUG, "worker", interval_ms);

    tokio::spawn(
        async move {
            let mut cycles: u64 = 0;
            let mut failed_cycles: u64 = 0;

            loop {
                tokio::select! {
                    result = run_cycle(&host, &containers, &metrics, collect_timeout) => {
                        cycles += 1;
                        match result {
                            Ok(()) => tracing::debug!(cycles, "Metrics exported"),
                            Err(e) => {
                                failed_cycles += 1;
                                tracing::error!(
                                    error = %e,
                                    operation = "export_metrics",
                                    failed_cycles,
                                    "Failed to export metrics"
                                );
                            }
                        }
                    }
                    _ = &mut shutdown_rx => break,
                }

                tokio::select! {
                    _ = tokio::time::sleep(interval) => {}
                    _ = &mut shutdown_rx => break,
                }
            }
            tracing::info!(cycles, failed_cycles, "Exporter loop shutting down");
        }
        .instrument(worker_span),
    )
}
