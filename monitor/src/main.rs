//! MCP observability monitor entry point
//!
//! Samples placeholder metrics every 30 seconds (10 with `--fast`) until
//! interrupted, or writes a single dashboard report with `--report`.

use std::path::PathBuf;
use std::process;

use chrono::Utc;
use clap::Parser;
use tokio::signal;
use tracing::{error, info, Level};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use mcp_observability::{
    config::MonitorConfig,
    error::{MonitorError, Result},
    health::SimulatedHealthChecker,
    service::MonitorService,
};

/// MCP observability monitor command line interface
#[derive(Parser)]
#[command(name = "mcp-monitor")]
#[command(about = "Synthetic observability monitor for MCP server integrations")]
#[command(version)]
struct Cli {
    /// Sample every 10 seconds instead of 30
    #[arg(long)]
    fast: bool,

    /// Generate a single dashboard report and exit
    #[arg(long)]
    report: bool,

    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Monitoring log directory (overrides configuration)
    #[arg(long)]
    log_dir: Option<PathBuf>,

    /// Log level
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Enable JSON logging
    #[arg(long)]
    json_logs: bool,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = initialize_logging(&cli) {
        eprintln!("Failed to initialize logging: {}", e);
        process::exit(1);
    }

    let config = match load_configuration(&cli) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            process::exit(1);
        }
    };

    let result = if cli.report {
        generate_report(config)
    } else {
        start_monitoring(config, cli.fast).await
    };

    if let Err(e) = result {
        error!(category = e.category(), "Monitor failed: {}", e);
        process::exit(1);
    }
}

/// Initialize logging based on command line flags
fn initialize_logging(cli: &Cli) -> std::result::Result<(), Box<dyn std::error::Error>> {
    let log_level = match cli.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let filter = EnvFilter::from_default_env()
        .add_directive(format!("mcp_observability={}", log_level).parse()?)
        .add_directive(format!("mcp_monitor={}", log_level).parse()?)
        .add_directive("tokio=warn".parse()?);

    if cli.json_logs {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(false))
            .init();
    }

    Ok(())
}

/// Load configuration from defaults, file and environment
fn load_configuration(cli: &Cli) -> Result<MonitorConfig> {
    if let Some(path) = &cli.config {
        info!("Loading configuration from: {}", path.display());
    }

    let mut config = MonitorConfig::load(cli.config.as_deref())?;

    if let Some(log_dir) = &cli.log_dir {
        config.log_dir = log_dir.clone();
        config.validate()?;
    }

    info!("Configuration loaded successfully");
    Ok(config)
}

/// Write one dashboard report from empty state
fn generate_report(config: MonitorConfig) -> Result<()> {
    let service = MonitorService::new(config, SimulatedHealthChecker::new())?;
    let report = service.generate_report(Utc::now())?;

    println!(
        "Dashboard report generated: {}",
        service.store().report_file().display()
    );
    println!("  System health: {}", report.summary.system_health);
    println!("  Alerts (24h): {}", report.summary.alerts_last_24h);
    Ok(())
}

/// Sample until SIGINT/SIGTERM, then write the final report
async fn start_monitoring(config: MonitorConfig, fast: bool) -> Result<()> {
    let interval = config.interval(fast);
    info!(
        interval_ms = interval.as_millis() as u64,
        retention_days = config.retention_days,
        "Starting MCP observability monitor"
    );

    let mut service = MonitorService::new(config, SimulatedHealthChecker::new())?;

    let report = service
        .run(interval, wait_for_shutdown())
        .await?;

    println!(
        "Final report written: {} ({} alerts in last 24h)",
        service.store().report_file().display(),
        report.summary.alerts_last_24h
    );
    Ok(())
}

/// Handle shutdown signals
#[cfg(unix)]
async fn wait_for_shutdown() -> Result<()> {
    let mut sigterm = signal::unix::signal(signal::unix::SignalKind::terminate())
        .map_err(MonitorError::Io)?;
    let mut sigint = signal::unix::signal(signal::unix::SignalKind::interrupt())
        .map_err(MonitorError::Io)?;

    tokio::select! {
        _ = sigterm.recv() => {
            info!("Received SIGTERM, initiating graceful shutdown");
        }
        _ = sigint.recv() => {
            info!("Received SIGINT, initiating graceful shutdown");
        }
    }

    Ok(())
}

#[cfg(not(unix))]
async fn wait_for_shutdown() -> Result<()> {
    signal::ctrl_c().await?;
    info!("Received Ctrl+C, initiating graceful shutdown");
    Ok(())
}
