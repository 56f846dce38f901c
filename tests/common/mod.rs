// Shared test helpers: in-memory collaborators

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use infrahealth::collector::{ContainerCollector, ContainerRuntime, HostCollector, HostSource};
use infrahealth::config::{ContainerConfig, HostConfig};
use infrahealth::error::{RuntimeError, SourceError};
use infrahealth::models::*;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostFailure {
    PermissionDenied,
    Broken,
}

#[derive(Debug, Clone)]
pub struct HostValues {
    pub cpu: f64,
    pub memory: f64,
    pub disk: f64,
    pub net: InterfaceCounters,
    pub boot_time: DateTime<Utc>,
    pub pids: u64,
    pub load: Option<LoadAverages>,
}

impl Default for HostValues {
    fn default() -> Self {
        Self {
            cpu: 10.0,
            memory: 50.0,
            disk: 75.0,
            net: InterfaceCounters {
                rx_bytes: 2000,
                tx_bytes: 1000,
            },
            boot_time: Utc::now() - ChronoDuration::seconds(3600),
            pids: 123,
            load: Some(LoadAverages {
                one: 0.5,
                five: 1.0,
                fifteen: 1.5,
            }),
        }
    }
}

/// Host source answering from `HostValues`; values and failure mode can be
/// changed while a collector holds it.
#[derive(Default)]
pub struct FakeHost {
    values: Mutex<HostValues>,
    failure: Mutex<Option<HostFailure>>,
    delay: Mutex<Option<Duration>>,
}

impl FakeHost {
    pub fn new(values: HostValues) -> Self {
        Self {
            values: Mutex::new(values),
            ..Default::default()
        }
    }

    pub fn set_cpu(&self, cpu: f64) {
        self.values.lock().unwrap().cpu = cpu;
    }

    pub fn set_failure(&self, failure: Option<HostFailure>) {
        *self.failure.lock().unwrap() = failure;
    }

    /// Makes every cpu sample take `delay`.
    pub fn set_delay(&self, delay: Option<Duration>) {
        *self.delay.lock().unwrap() = delay;
    }

    fn check(&self) -> Result<HostValues, SourceError> {
        match *self.failure.lock().unwrap() {
            Some(HostFailure::PermissionDenied) => {
                Err(SourceError::PermissionDenied("/proc/stat".into()))
            }
            Some(HostFailure::Broken) => Err(SourceError::Failed("sensor offline".into())),
            None => Ok(self.values.lock().unwrap().clone()),
        }
    }
}

#[async_trait]
impl HostSource for FakeHost {
    async fn cpu_percent(&self, _sample: Duration) -> Result<f64, SourceError> {
        let delay = *self.delay.lock().unwrap();
        if let Some(d) = delay {
            tokio::time::sleep(d).await;
        }
        Ok(self.check()?.cpu)
    }

    async fn memory_percent(&self) -> Result<f64, SourceError> {
        Ok(self.check()?.memory)
    }

    async fn disk_percent(&self, _path: &str) -> Result<f64, SourceError> {
        Ok(self.check()?.disk)
    }

    async fn net_counters(&self) -> Result<InterfaceCounters, SourceError> {
        Ok(self.check()?.net)
    }

    async fn boot_time(&self) -> Result<DateTime<Utc>, SourceError> {
        Ok(self.check()?.boot_time)
    }

    async fn pid_count(&self) -> Result<u64, SourceError> {
        Ok(self.check()?.pids)
    }

    async fn load_averages(&self) -> Result<Option<LoadAverages>, SourceError> {
        Ok(self.check()?.load)
    }
}

/// Probe result for a fake container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Probe {
    Exit(i64),
    ExecFails,
}

#[derive(Debug, Clone)]
pub struct FakeContainer {
    pub handle: ContainerHandle,
    pub stats: RawContainerStats,
    pub metadata: ContainerMetadata,
    pub probe: Probe,
    /// Listed but gone by the time stats are requested.
    pub vanished: bool,
    /// Stats come back malformed.
    pub broken_stats: bool,
}

impl FakeContainer {
    pub fn running(name: &str) -> Self {
        Self {
            handle: ContainerHandle {
                id: format!("{}-id", name),
                name: name.to_string(),
            },
            stats: fixture_stats(),
            metadata: ContainerMetadata {
                status: ContainerState::Running,
                restart_count: 0,
            },
            probe: Probe::Exit(0),
            vanished: false,
            broken_stats: false,
        }
    }

    pub fn with_restarts(mut self, restart_count: u64) -> Self {
        self.metadata.restart_count = restart_count;
        self
    }

    pub fn with_probe(mut self, probe: Probe) -> Self {
        self.probe = probe;
        self
    }

    pub fn with_stats(mut self, stats: RawContainerStats) -> Self {
        self.stats = stats;
        self
    }

    pub fn vanished(mut self) -> Self {
        self.vanished = true;
        self
    }

    pub fn with_broken_stats(mut self) -> Self {
        self.broken_stats = true;
        self
    }
}

/// Stats that compute to 40% cpu and 45% memory; eth0 carries 1000 B out, 2000 B in.
pub fn fixture_stats() -> RawContainerStats {
    let mut networks = HashMap::new();
    networks.insert(
        "eth0".to_string(),
        InterfaceCounters {
            rx_bytes: 2000,
            tx_bytes: 1000,
        },
    );
    networks.insert(
        "eth1".to_string(),
        InterfaceCounters {
            rx_bytes: 50,
            tx_bytes: 70,
        },
    );
    RawContainerStats {
        cpu_total_usage: 2000,
        precpu_total_usage: 1000,
        system_cpu_usage: 10000,
        precpu_system_cpu_usage: 5000,
        online_cpus: 2,
        memory_usage: 1_000_000,
        memory_cache: 100_000,
        memory_limit: 2_000_000,
        networks,
    }
}

#[derive(Default)]
pub struct FakeRuntime {
    containers: Mutex<Vec<FakeContainer>>,
    unavailable: Mutex<bool>,
    probes: Mutex<Vec<(String, String)>>,
}

impl FakeRuntime {
    pub fn new(containers: Vec<FakeContainer>) -> Self {
        Self {
            containers: Mutex::new(containers),
            ..Default::default()
        }
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        *self.unavailable.lock().unwrap() = unavailable;
    }

    /// (container name, command) of every probe run so far.
    pub fn probes(&self) -> Vec<(String, String)> {
        self.probes.lock().unwrap().clone()
    }

    fn find(&self, handle: &ContainerHandle) -> Result<FakeContainer, RuntimeError> {
        self.containers
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.handle == *handle)
            .cloned()
            .ok_or_else(|| RuntimeError::NotFound(handle.id.clone()))
    }

    fn ensure_available(&self) -> Result<(), RuntimeError> {
        if *self.unavailable.lock().unwrap() {
            return Err(RuntimeError::Unavailable(
                "connection refused: /var/run/docker.sock".into(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl ContainerRuntime for FakeRuntime {
    async fn list_running(&self) -> Result<Vec<ContainerHandle>, RuntimeError> {
        self.ensure_available()?;
        Ok(self
            .containers
            .lock()
            .unwrap()
            .iter()
            .map(|c| c.handle.clone())
            .collect())
    }

    async fn stats(&self, container: &ContainerHandle) -> Result<RawContainerStats, RuntimeError> {
        self.ensure_available()?;
        let c = self.find(container)?;
        if c.vanished {
            return Err(RuntimeError::NotFound(c.handle.id));
        }
        if c.broken_stats {
            return Err(RuntimeError::Api("stats response has no cpu_stats".into()));
        }
        Ok(c.stats)
    }

    async fn inspect(
        &self,
        container: &ContainerHandle,
    ) -> Result<ContainerMetadata, RuntimeError> {
        self.ensure_available()?;
        Ok(self.find(container)?.metadata)
    }

    async fn exec_probe(
        &self,
        container: &ContainerHandle,
        command: &str,
    ) -> Result<i64, RuntimeError> {
        self.probes
            .lock()
            .unwrap()
            .push((container.name.clone(), command.to_string()));
        match self.find(container)?.probe {
            Probe::Exit(code) => Ok(code),
            Probe::ExecFails => Err(RuntimeError::Api("exec create failed".into())),
        }
    }
}

pub fn host_collector(host: Arc<FakeHost>) -> HostCollector {
    HostCollector::new(host, &HostConfig::default())
}

pub fn container_collector(runtime: Arc<FakeRuntime>) -> ContainerCollector {
    ContainerCollector::new(runtime, &ContainerConfig::default())
}
