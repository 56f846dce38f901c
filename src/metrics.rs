// Prometheus gauges written by the exporter loop

use crate::models::{ContainerSnapshot, HostSnapshot};
use prometheus::{Encoder, Gauge, GaugeVec, Opts, Registry, TextEncoder};

pub const CONTAINER_LABEL: &str = "container_name";

/// Registry plus the gauges it owns. Registered once at construction.
pub struct ExporterMetrics {
    registry: Registry,
    server_cpu: Gauge,
    server_memory: Gauge,
    server_disk: Gauge,
    container_cpu: GaugeVec,
    container_memory: GaugeVec,
}

impl ExporterMetrics {
    pub fn new() -> prometheus::Result<Self> {
        let registry = Registry::new();

        let server_cpu = Gauge::new(
            "infrahealth_server_cpu_percent",
            "Server CPU usage percentage",
        )?;
        let server_memory = Gauge::new(
            "infrahealth_server_memory_percent",
            "Server memory usage percentage",
        )?;
        let server_disk = Gauge::new(
            "infrahealth_server_disk_percent",
            "Server disk usage percentage",
        )?;
        let container_cpu = GaugeVec::new(
            Opts::new(
                "infrahealth_container_cpu_percent",
                "Container CPU usage percentage",
            ),
            &[CONTAINER_LABEL],
        )?;
        let container_memory = GaugeVec::new(
            Opts::new(
                "infrahealth_container_memory_percent",
                "Container memory usage percentage",
            ),
            &[CONTAINER_LABEL],
        )?;

        registry.register(Box::new(server_cpu.clone()))?;
        registry.register(Box::new(server_memory.clone()))?;
        registry.register(Box::new(server_disk.clone()))?;
        registry.register(Box::new(container_cpu.clone()))?;
        registry.register(Box::new(container_memory.clone()))?;

        Ok(Self {
            registry,
            server_cpu,
            server_memory,
            server_disk,
            container_cpu,
            container_memory,
        })
    }

    pub fn record_host(&self, snapshot: &HostSnapshot) {
        self.server_cpu.set(snapshot.cpu_percent);
        self.server_memory.set(snapshot.memory_percent);
        self.server_disk.set(snapshot.disk_percent);
    }

    /// Overwrites the labels of the given containers. Labels of containers that
    /// disappeared keep their last value.
    pub fn record_containers(&self, containers: &[ContainerSnapshot]) {
        for c in containers {
            self.container_cpu
                .with_label_values(&[c.name.as_str()])
                .set(c.cpu_percent);
            self.container_memory
                .with_label_values(&[c.name.as_str()])
                .set(c.memory_percent);
        }
    }

    /// Text exposition format of everything registered.
    pub fn encode(&self) -> prometheus::Result<String> {
        let families = self.registry.gather();
        let mut buf = Vec::new();
        TextEncoder::new().encode(&families, &mut buf)?;
        String::from_utf8(buf).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }

    pub fn content_type(&self) -> String {
        TextEncoder::new().format_type().to_string()
    }
}
