// Host statistics via sysinfo

use crate::collector::HostSource;
use crate::error::SourceError;
use crate::models::{InterfaceCounters, LoadAverages};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use sysinfo::{Disks, Networks, ProcessesToUpdate, System};
use tracing::instrument;

pub struct SysinfoRepo {
    sys: Arc<Mutex<System>>,
    disks: Arc<Mutex<Disks>>,
    networks: Arc<Mutex<Networks>>,
}

impl Default for SysinfoRepo {
    fn default() -> Self {
        Self::new()
    }
}

impl SysinfoRepo {
    pub fn new() -> Self {
        let mut sys = System::new();
        sys.refresh_memory();
        let disks = Disks::new_with_refreshed_list();
        let networks = Networks::new_with_refreshed_list();
        Self {
            sys: Arc::new(Mutex::new(sys)),
            disks: Arc::new(Mutex::new(disks)),
            networks: Arc::new(Mutex::new(networks)),
        }
    }

    /// Runs `f` on the blocking pool with the locked `System`.
    async fn with_sys<T, F>(&self, f: F) -> Result<T, SourceError>
    where
        T: Send + 'static,
        F: FnOnce(&mut System) -> Result<T, SourceError> + Send + 'static,
    {
        let sys = self.sys.clone();
        tokio::task::spawn_blocking(move || -> Result<T, SourceError> {
            let mut sys = sys
                .lock()
                .map_err(|e| SourceError::Failed(format!("sysinfo lock poisoned: {}", e)))?;
            f(&mut *sys)
        })
        .await
        .map_err(|e| SourceError::Failed(format!("sysinfo task join: {}", e)))?
    }
}

/// Percentage of `total` that is not `available`; `0.0` for an empty total.
fn used_percent(total: u64, available: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    total.saturating_sub(available) as f64 / total as f64 * 100.0
}

#[async_trait]
impl HostSource for SysinfoRepo {
    #[instrument(skip(self), fields(repo = "sysinfo", operation = "cpu_percent"))]
    async fn cpu_percent(&self, sample: Duration) -> Result<f64, SourceError> {
        let sample = sample.max(sysinfo::MINIMUM_CPU_UPDATE_INTERVAL);
        self.with_sys(move |sys| {
            sys.refresh_cpu_usage();
            std::thread::sleep(sample);
            sys.refresh_cpu_usage();
            Ok((sys.global_cpu_usage() as f64).clamp(0.0, 100.0))
        })
        .await
    }

    #[instrument(skip(self), fields(repo = "sysinfo", operation = "memory_percent"))]
    async fn memory_percent(&self) -> Result<f64, SourceError> {
        self.with_sys(|sys| {
            sys.refresh_memory();
            Ok(used_percent(sys.total_memory(), sys.available_memory()))
        })
        .await
    }

    #[instrument(skip(self), fields(repo = "sysinfo", operation = "disk_percent"))]
    async fn disk_percent(&self, path: &str) -> Result<f64, SourceError> {
        let disks = self.disks.clone();
        let path = path.to_string();
        tokio::task::spawn_blocking(move || -> Result<f64, SourceError> {
            let target = Path::new(&path);
            std::fs::metadata(target)?;
            let mut disks = disks
                .lock()
                .map_err(|e| SourceError::Failed(format!("sysinfo disks lock poisoned: {}", e)))?;
            disks.refresh(true);
            // Longest mount point that contains the path.
            let disk = disks
                .list()
                .iter()
                .filter(|d| target.starts_with(d.mount_point()))
                .max_by_key(|d| d.mount_point().as_os_str().len())
                .ok_or_else(|| SourceError::Failed(format!("no filesystem mounted at {}", path)))?;
            Ok(used_percent(disk.total_space(), disk.available_space()))
        })
        .await
        .map_err(|e| SourceError::Failed(format!("sysinfo task join: {}", e)))?
    }

    #[instrument(skip(self), fields(repo = "sysinfo", operation = "net_counters"))]
    async fn net_counters(&self) -> Result<InterfaceCounters, SourceError> {
        let networks = self.networks.clone();
        tokio::task::spawn_blocking(move || -> Result<InterfaceCounters, SourceError> {
            let mut networks = networks.lock().map_err(|e| {
                SourceError::Failed(format!("sysinfo networks lock poisoned: {}", e))
            })?;
            networks.refresh(true);
            Ok(networks
                .list()
                .values()
                .fold(InterfaceCounters::default(), |acc, data| InterfaceCounters {
                    rx_bytes: acc.rx_bytes.saturating_add(data.total_received()),
                    tx_bytes: acc.tx_bytes.saturating_add(data.total_transmitted()),
                }))
        })
        .await
        .map_err(|e| SourceError::Failed(format!("sysinfo task join: {}", e)))?
    }

    async fn boot_time(&self) -> Result<DateTime<Utc>, SourceError> {
        let secs = System::boot_time();
        DateTime::from_timestamp(secs as i64, 0)
            .ok_or_else(|| SourceError::Failed(format!("invalid boot time {}", secs)))
    }

    #[instrument(skip(self), fields(repo = "sysinfo", operation = "pid_count"))]
    async fn pid_count(&self) -> Result<u64, SourceError> {
        self.with_sys(|sys| {
            sys.refresh_processes(ProcessesToUpdate::All, true);
            Ok(sys.processes().len() as u64)
        })
        .await
    }

    async fn load_averages(&self) -> Result<Option<LoadAverages>, SourceError> {
        if cfg!(windows) {
            return Ok(None);
        }
        let load = System::load_average();
        Ok(Some(LoadAverages {
            one: load.one,
            five: load.five,
            fifteen: load.fifteen,
        }))
    }
}
