use serde::Deserialize;
use std::path::{Path, PathBuf};

/// File read when neither `--config` nor `CONFIG_FILE` is given. Optional.
pub const DEFAULT_CONFIG_FILE: &str = "infrahealth.toml";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub exporter: ExporterConfig,
    pub host: HostConfig,
    pub containers: ContainerConfig,
    pub thresholds: Thresholds,
    pub alert: Option<AlertConfig>,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ExporterConfig {
    pub host: String,
    pub port: u16,
    /// Sleep between collection cycles.
    pub interval_secs: u64,
    /// Upper bound on a single host or container collection call.
    pub collect_timeout_secs: u64,
}

impl Default for ExporterConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 8000,
            interval_secs: 10,
            collect_timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HostConfig {
    /// Mount point whose usage is reported as `disk_percent`.
    pub disk_path: String,
    pub cpu_sample_ms: u64,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            disk_path: "/".into(),
            cpu_sample_ms: 1000,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ContainerConfig {
    /// Interface whose counters are reported in detailed mode.
    pub network_interface: String,
    /// Run through `sh -c` inside each container when app checks are on.
    pub probe_command: String,
    /// Docker socket path; unset means DOCKER_HOST or the platform default.
    pub socket: Option<String>,
}

impl Default for ContainerConfig {
    fn default() -> Self {
        Self {
            network_interface: "eth0".into(),
            probe_command: "curl --fail http://localhost/health || exit 1".into(),
            socket: None,
        }
    }
}

/// Alert ceilings. A metric triggers only when strictly above its ceiling.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    pub cpu_threshold: f64,
    pub memory_threshold: f64,
    pub restart_threshold: u64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            cpu_threshold: 80.0,
            memory_threshold: 80.0,
            restart_threshold: 5,
        }
    }
}

#[derive(Clone, Deserialize)]
pub struct AlertConfig {
    pub email_from: String,
    pub email_to: String,
    pub smtp_host: String,
    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,
    #[serde(default)]
    pub email_user: Option<String>,
    #[serde(default)]
    pub email_password: Option<String>,
    #[serde(default)]
    pub starttls: bool,
    /// Exit non-zero when a triggered alert could not be delivered.
    #[serde(default)]
    pub fail_on_error: bool,
}

fn default_smtp_port() -> u16 {
    25
}

impl std::fmt::Debug for AlertConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AlertConfig")
            .field("email_from", &self.email_from)
            .field("email_to", &self.email_to)
            .field("smtp_host", &self.smtp_host)
            .field("smtp_port", &self.smtp_port)
            .field("email_user", &self.email_user)
            .field("email_password", &self.email_password.as_ref().map(|_| "***"))
            .field("starttls", &self.starttls)
            .field("fail_on_error", &self.fail_on_error)
            .finish()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// EnvFilter directive; RUST_LOG wins when set.
    pub level: Option<String>,
    /// Append logs to this file instead of stderr.
    pub file: Option<PathBuf>,
}

impl AppConfig {
    /// Load from `path`, else `CONFIG_FILE`, else `infrahealth.toml` if it exists.
    /// Without any file every setting takes its default.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let explicit = path
            .map(Path::to_path_buf)
            .or_else(|| std::env::var_os("CONFIG_FILE").map(PathBuf::from));
        let path = match explicit {
            Some(p) => p,
            None => {
                let fallback = PathBuf::from(DEFAULT_CONFIG_FILE);
                if !fallback.exists() {
                    return Ok(Self::default());
                }
                fallback
            }
        };
        let s = std::fs::read_to_string(&path)
            .map_err(|e| anyhow::anyhow!("reading config {}: {}", path.display(), e))?;
        Self::load_from_str(&s)
    }

    /// Parse and validate config from a string (e.g. for tests).
    pub fn load_from_str(s: &str) -> anyhow::Result<Self> {
        let config: AppConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            self.exporter.port > 0,
            "exporter.port must be between 1 and 65535, got {}",
            self.exporter.port
        );
        anyhow::ensure!(
            self.exporter.interval_secs > 0,
            "exporter.interval_secs must be > 0, got {}",
            self.exporter.interval_secs
        );
        anyhow::ensure!(
            self.exporter.collect_timeout_secs > 0,
            "exporter.collect_timeout_secs must be > 0, got {}",
            self.exporter.collect_timeout_secs
        );
        anyhow::ensure!(
            !self.host.disk_path.is_empty(),
            "host.disk_path must be non-empty"
        );
        anyhow::ensure!(
            !self.containers.network_interface.is_empty(),
            "containers.network_interface must be non-empty"
        );
        anyhow::ensure!(
            !self.containers.probe_command.trim().is_empty(),
            "containers.probe_command must be non-empty"
        );
        if let Some(socket) = &self.containers.socket {
            anyhow::ensure!(!socket.is_empty(), "containers.socket must be non-empty when set");
        }
        anyhow::ensure!(
            self.thresholds.cpu_threshold >= 0.0,
            "thresholds.cpu_threshold must be >= 0, got {}",
            self.thresholds.cpu_threshold
        );
        anyhow::ensure!(
            self.thresholds.memory_threshold >= 0.0,
            "thresholds.memory_threshold must be >= 0, got {}",
            self.thresholds.memory_threshold
        );
        if let Some(alert) = &self.alert {
            anyhow::ensure!(!alert.email_from.is_empty(), "alert.email_from must be non-empty");
            anyhow::ensure!(!alert.email_to.is_empty(), "alert.email_to must be non-empty");
            anyhow::ensure!(!alert.smtp_host.is_empty(), "alert.smtp_host must be non-empty");
            anyhow::ensure!(
                alert.smtp_port > 0,
                "alert.smtp_port must be between 1 and 65535, got {}",
                alert.smtp_port
            );
            anyhow::ensure!(
                alert.email_user.is_some() == alert.email_password.is_some(),
                "alert.email_user and alert.email_password must be set together"
            );
        }
        Ok(())
    }
}
