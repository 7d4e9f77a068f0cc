//! Stream Stats Exporter
//!
//! - `/probe?target=...&period=...&streamingTime=...` : one probe cycle
//! - telemetry path (default `/metrics`) : exporter self metrics
//! - `/` : index page

use std::process::ExitCode;

use clap::Parser;
use thiserror::Error;
use tracing_subscriber::{fmt, EnvFilter};

use streamstats_core::ProbeError;
use streamstats_exporter::{app_state, config, router};

#[derive(Parser)]
#[command(name = "stream-stats-exporter", version)]
#[command(about = "Prometheus exporter measuring stream bitrate and host latency")]
struct Cli {
    /// Address to listen on for web interface and telemetry.
    #[arg(long = "web.listen-address", value_name = "ADDR")]
    listen_address: Option<String>,

    /// Path under which to expose metrics.
    #[arg(long = "web.telemetry-path", value_name = "PATH")]
    telemetry_path: Option<String>,

    /// Optional YAML config file; flags take precedence over its values.
    #[arg(long = "config.file", value_name = "FILE")]
    config_file: Option<String>,

    /// Log filter used when RUST_LOG is unset.
    #[arg(long = "log.level", default_value = "info")]
    log_level: String,
}

#[derive(Debug, Error)]
enum StartupError {
    #[error(transparent)]
    Config(#[from] ProbeError),
    #[error("listener failed: {0}")]
    Io(#[from] std::io::Error),
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));
    fmt().with_env_filter(filter).init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "stream-stats-exporter stopped");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), StartupError> {
    let mut cfg = match cli.config_file.as_deref() {
        Some(path) => config::load_from_file(path)?,
        None => config::ExporterConfig::default(),
    };
    if let Some(listen) = cli.listen_address {
        cfg.web.listen_address = listen;
    }
    if let Some(path) = cli.telemetry_path {
        cfg.web.telemetry_path = path;
    }

    let listen = cfg.web.bind_address()?;
    let state = app_state::AppState::new(cfg)?;
    let app = router::build_router(state);

    tracing::info!(version = env!("CARGO_PKG_VERSION"), %listen, "stream-stats-exporter starting");
    let listener = tokio::net::TcpListener::bind(listen.as_str()).await?;

    axum::serve(listener, app).await?;
    Ok(())
}
