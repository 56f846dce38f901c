//! Collectors turn raw collaborator data into snapshots.
//!
//! The OS and the container runtime sit behind the [`HostSource`] and
//! [`ContainerRuntime`] traits. Production implementations live in
//! `sysinfo_repo` and `docker_repo`; tests use in-memory fakes.

mod container;
mod host;
pub mod percent;

pub use container::ContainerCollector;
pub use host::HostCollector;

use crate::error::{RuntimeError, SourceError};
use crate::models::{
    ContainerHandle, ContainerMetadata, InterfaceCounters, LoadAverages, RawContainerStats,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::time::Duration;

/// Instantaneous host statistics.
#[async_trait]
pub trait HostSource: Send + Sync {
    /// Global CPU usage measured over `sample`, in [0, 100].
    async fn cpu_percent(&self, sample: Duration) -> Result<f64, SourceError>;

    async fn memory_percent(&self) -> Result<f64, SourceError>;

    /// Usage of the filesystem mounted at (or containing) `path`.
    async fn disk_percent(&self, path: &str) -> Result<f64, SourceError>;

    /// Bytes sent/received since boot, summed over all interfaces.
    async fn net_counters(&self) -> Result<InterfaceCounters, SourceError>;

    async fn boot_time(&self) -> Result<DateTime<Utc>, SourceError>;

    async fn pid_count(&self) -> Result<u64, SourceError>;

    /// `None` when the platform has no load averages.
    async fn load_averages(&self) -> Result<Option<LoadAverages>, SourceError>;
}

/// Container runtime client.
#[async_trait]
pub trait ContainerRuntime: Send + Sync {
    /// Currently running containers.
    async fn list_running(&self) -> Result<Vec<ContainerHandle>, RuntimeError>;

    /// One non-streaming stats sample.
    async fn stats(&self, container: &ContainerHandle) -> Result<RawContainerStats, RuntimeError>;

    async fn inspect(&self, container: &ContainerHandle)
    -> Result<ContainerMetadata, RuntimeError>;

    /// Runs `command` through `sh -c` inside the container and returns its exit code.
    async fn exec_probe(&self, container: &ContainerHandle, command: &str)
    -> Result<i64, RuntimeError>;
}
