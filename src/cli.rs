// Command-line surface

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(
    name = "infrahealth",
    version,
    about = "Server and container health checks with a Prometheus exporter"
)]
pub struct Cli {
    /// TOML config file (defaults to $CONFIG_FILE, then ./infrahealth.toml)
    #[arg(long, short = 'c', global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// One-shot health check
    #[command(subcommand)]
    Check(CheckCommand),
    /// Serve metrics for Prometheus until interrupted
    Export(ExportArgs),
}

#[derive(Debug, Subcommand)]
pub enum CheckCommand {
    /// CPU, memory and disk usage of this host
    Server(ServerArgs),
    /// Usage of every running container
    Containers(ContainerArgs),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Args)]
pub struct ServerArgs {
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
    /// Include network, uptime, process and load figures
    #[arg(long)]
    pub detailed: bool,
    /// Email an alert when a threshold is exceeded
    #[arg(long)]
    pub alert: bool,
}

#[derive(Debug, Args)]
pub struct ContainerArgs {
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
    /// Include network bytes and restart counts
    #[arg(long)]
    pub detailed: bool,
    /// Run the health probe inside each container
    #[arg(long)]
    pub app_check: bool,
    #[arg(long)]
    pub alert: bool,
}

#[derive(Debug, Args)]
pub struct ExportArgs {
    /// Overrides exporter.port
    #[arg(long)]
    pub port: Option<u16>,
    /// Seconds between collections; overrides exporter.interval_secs
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    pub interval: Option<u64>,
}

impl Cli {
    /// Log filter used when neither RUST_LOG nor `logging.level` is set.
    pub fn default_log_level(&self) -> &'static str {
        match self.command {
            Command::Check(_) => "warn",
            Command::Export(_) => "info",
        }
    }

    pub fn alert_requested(&self) -> bool {
        match &self.command {
            Command::Check(CheckCommand::Server(args)) => args.alert,
            Command::Check(CheckCommand::Containers(args)) => args.alert,
            Command::Export(_) => false,
        }
    }
}
