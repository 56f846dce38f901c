// Command runners behind the CLI

use crate::alert::{self, DispatchOutcome, MailTransport};
use crate::cli::{ContainerArgs, ExportArgs, OutputFormat, ServerArgs};
use crate::collector::{ContainerCollector, HostCollector};
use crate::config::{ExporterConfig, Thresholds};
use crate::metrics::ExporterMetrics;
use crate::{render, routes, thresholds, worker};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;

/// Rendered output of a one-shot check and, with `--alert`, what happened to
/// the notification.
#[derive(Debug)]
pub struct CheckReport {
    pub output: String,
    pub alert: Option<DispatchOutcome>,
}

impl CheckReport {
    /// A failed dispatch only fails the command when `fail_on_error` is set.
    pub fn failed(&self, fail_on_error: bool) -> bool {
        fail_on_error && self.alert.as_ref().is_some_and(DispatchOutcome::is_failure)
    }
}

fn mailer_for(
    alert: bool,
    mailer: Option<&dyn MailTransport>,
) -> anyhow::Result<Option<&dyn MailTransport>> {
    match (alert, mailer) {
        (false, _) => Ok(None),
        (true, Some(m)) => Ok(Some(m)),
        (true, None) => anyhow::bail!("--alert requires an [alert] section in the config file"),
    }
}

pub async fn check_server(
    collector: &HostCollector,
    args: &ServerArgs,
    limits: &Thresholds,
    mailer: Option<&dyn MailTransport>,
) -> anyhow::Result<CheckReport> {
    let mailer = mailer_for(args.alert, mailer)?;
    let snapshot = collector.collect(args.detailed).await?;
    let output = match args.format {
        OutputFormat::Text => render::host_text(&snapshot),
        OutputFormat::Json => render::json(&snapshot)?,
    };
    let alert = match mailer {
        Some(m) => Some(alert::dispatch(&thresholds::evaluate_host(&snapshot, limits), m).await),
        None => None,
    };
    Ok(CheckReport { output, alert })
}

pub async fn check_containers(
    collector: &ContainerCollector,
    args: &ContainerArgs,
    limits: &Thresholds,
    mailer: Option<&dyn MailTransport>,
) -> anyhow::Result<CheckReport> {
    let mailer = mailer_for(args.alert, mailer)?;
    let containers = collector.collect(args.detailed, args.app_check).await?;
    let output = match args.format {
        OutputFormat::Text => render::containers_text(&containers),
        OutputFormat::Json => render::json(&containers)?,
    };
    let alert = match mailer {
        Some(m) => {
            let issues = thresholds::evaluate_containers(&containers, limits);
            Some(alert::dispatch(&issues, m).await)
        }
        None => None,
    };
    Ok(CheckReport { output, alert })
}

/// Exporter settings after CLI overrides.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportSettings {
    pub host: String,
    pub port: u16,
    pub interval: Duration,
    pub collect_timeout: Duration,
}

impl ExportSettings {
    pub fn resolve(config: &ExporterConfig, args: &ExportArgs) -> Self {
        Self {
            host: config.host.clone(),
            port: args.port.unwrap_or(config.port),
            interval: Duration::from_secs(args.interval.unwrap_or(config.interval_secs)),
            collect_timeout: Duration::from_secs(config.collect_timeout_secs),
        }
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Bind the scrape endpoint and run until `shutdown` resolves.
pub async fn export(
    host: Arc<HostCollector>,
    containers: Arc<ContainerCollector>,
    settings: &ExportSettings,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> anyhow::Result<()> {
    let addr = settings.addr();
    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|e| anyhow::anyhow!("binding {}: {}", addr, e))?;
    serve(listener, host, containers, settings, shutdown).await
}

/// Registers the gauges, serves them on `listener` and drives the exporter
/// loop. On shutdown the server drains first, then the loop is stopped and
/// awaited.
pub async fn serve(
    listener: TcpListener,
    host: Arc<HostCollector>,
    containers: Arc<ContainerCollector>,
    settings: &ExportSettings,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> anyhow::Result<()> {
    let metrics = Arc::new(ExporterMetrics::new()?);
    let local = listener.local_addr()?;
    tracing::info!("Started Prometheus exporter on http://{}/metrics", local);

    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();
    let worker_handle = worker::spawn(
        worker::WorkerDeps {
            host,
            containers,
            metrics: metrics.clone(),
            shutdown_rx,
        },
        worker::WorkerConfig {
            interval: settings.interval,
            collect_timeout: settings.collect_timeout,
        },
    );

    let result = axum::serve(listener, routes::app(metrics))
        .with_graceful_shutdown(shutdown)
        .await;

    let _ = shutdown_tx.send(());
    if let Err(e) = worker_handle.await {
        tracing::warn!(error = %e, operation = "join_worker", "Exporter loop ended abnormally");
    }
    result?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_prefers_cli_overrides() {
        let config = ExporterConfig::default();
        let args = ExportArgs {
            port: Some(9100),
            interval: None,
        };
        let s = ExportSettings::resolve(&config, &args);
        assert_eq!(s.port, 9100);
        assert_eq!(s.interval, Duration::from_secs(10));
        assert_eq!(s.collect_timeout, Duration::from_secs(30));
        assert_eq!(s.addr(), "0.0.0.0:9100");
    }

    #[test]
    fn report_fails_only_when_configured() {
        let report = CheckReport {
            output: String::new(),
            alert: Some(DispatchOutcome::Failed {
                reason: "down".into(),
            }),
        };
        assert!(!report.failed(false));
        assert!(report.failed(true));

        let sent = CheckReport {
            output: String::new(),
            alert: Some(DispatchOutcome::Sent { issues: 1 }),
        };
        assert!(!sent.failed(true));
    }
}
