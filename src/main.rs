use anyhow::Result;
use clap::Parser;
use infrahealth::alert::{MailTransport, SmtpMailer};
use infrahealth::cli::{CheckCommand, Cli, Command};
use infrahealth::collector::{ContainerCollector, HostCollector};
use infrahealth::commands::{self, CheckReport, ExportSettings};
use infrahealth::config::{AppConfig, LoggingConfig};
use infrahealth::{docker_repo, sysinfo_repo};
use std::process::ExitCode;
use std::sync::{Arc, Mutex};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::time::FormatTime;

struct LocalTimer;

impl FormatTime for LocalTimer {
    fn format_time(&self, w: &mut tracing_subscriber::fmt::format::Writer<'_>) -> std::fmt::Result {
        write!(
            w,
            "{}",
            chrono::Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z")
        )
    }
}

fn init_tracing(logging: &LoggingConfig, default_level: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().or_else(|_| {
        EnvFilter::try_new(logging.level.as_deref().unwrap_or(default_level))
    })?;
    let builder = tracing_subscriber::fmt()
        .with_timer(LocalTimer)
        .with_env_filter(filter);
    match &logging.file {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|e| anyhow::anyhow!("opening log file {}: {}", path.display(), e))?;
            builder
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .init();
        }
        None => builder.with_writer(std::io::stderr).init(),
    }
    Ok(())
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {}
                    _ = sigterm.recv() => {}
                }
            }
            Err(_) => {
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
    tracing::info!("Received shutdown signal");
}

fn host_collector(config: &AppConfig) -> HostCollector {
    HostCollector::new(Arc::new(sysinfo_repo::SysinfoRepo::new()), &config.host)
}

fn container_collector(config: &AppConfig) -> ContainerCollector {
    let docker = docker_repo::DockerRepo::new(config.containers.socket.as_deref());
    ContainerCollector::new(Arc::new(docker), &config.containers)
}

fn finish(report: CheckReport, config: &AppConfig) -> ExitCode {
    println!("{}", report.output);
    let fail_on_error = config.alert.as_ref().is_some_and(|a| a.fail_on_error);
    if report.failed(fail_on_error) {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

async fn run(cli: Cli, config: AppConfig) -> Result<ExitCode> {
    if cli.alert_requested() && config.alert.is_none() {
        anyhow::bail!("--alert requires an [alert] section in the config file");
    }
    let mailer = config.alert.as_ref().map(SmtpMailer::new);
    let mailer = mailer.as_ref().map(|m| m as &dyn MailTransport);

    match cli.command {
        Command::Check(CheckCommand::Server(args)) => {
            let collector = host_collector(&config);
            let report =
                commands::check_server(&collector, &args, &config.thresholds, mailer).await?;
            Ok(finish(report, &config))
        }
        Command::Check(CheckCommand::Containers(args)) => {
            let collector = container_collector(&config);
            let report =
                commands::check_containers(&collector, &args, &config.thresholds, mailer).await?;
            Ok(finish(report, &config))
        }
        Command::Export(args) => {
            let settings = ExportSettings::resolve(&config.exporter, &args);
            let host = Arc::new(host_collector(&config));
            let containers = Arc::new(container_collector(&config));
            commands::export(host, containers, &settings, shutdown_signal()).await?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match AppConfig::load(cli.config.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            return ExitCode::FAILURE;
        }
    };
    if let Err(e) = init_tracing(&config.logging, cli.default_log_level()) {
        eprintln!("Error: {:#}", e);
        return ExitCode::FAILURE;
    }

    match run(cli, config).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
