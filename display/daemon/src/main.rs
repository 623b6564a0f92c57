//! Roomboard Daemon - Meeting Room Kiosk
//!
//! Polls the booking backend for one room and drives a display surface with
//! the resulting command stream. The built-in surfaces write to stdout: as
//! structured log lines for watching a kiosk from a terminal, or as JSON
//! lines for piping into a renderer.
//!
//! # Usage
//!
//! ```bash
//! # Start with defaults (~/.config/roomboard/display.toml, if present)
//! roomboard
//!
//! # Point at a different backend and room
//! roomboard --api-address http://10.0.0.5:37222 --room-id 4
//!
//! # Feed a renderer
//! roomboard --output json | my-renderer
//!
//! # Verbose logging
//! RUST_LOG=debug roomboard
//! ```
//!
//! # Signals
//!
//! - `SIGTERM` / `SIGINT`: Graceful shutdown

mod surface;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use roomboard_core::{load_config_from_path, ConfigOverrides, HttpBookingSource, Kiosk};
use tokio::signal::unix::{signal, SignalKind};
use tokio::sync::{mpsc, watch};
use tracing::{error, info};

use surface::OutputFormat;

/// Commands buffered between the core and the surface
const COMMAND_BUFFER: usize = 256;

/// Roomboard - Meeting room booking display
#[derive(Parser, Debug)]
#[command(name = "roomboard")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Configuration file path
    #[arg(short = 'c', long, env = "ROOMBOARD_CONFIG", value_name = "FILE")]
    config: Option<PathBuf>,

    /// Booking backend address
    #[arg(short = 'a', long, value_name = "URL")]
    api_address: Option<String>,

    /// Room to display
    #[arg(short = 'r', long, value_name = "ID")]
    room_id: Option<u32>,

    /// IANA timezone for booking times (detected from the system if unset)
    #[arg(short = 't', long, value_name = "TZ")]
    timezone: Option<String>,

    /// Output surface
    #[arg(short = 'o', long, value_enum, default_value_t = OutputFormat::Log)]
    output: OutputFormat,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short = 'l', long, env = "ROOMBOARD_LOG_LEVEL", default_value = "info")]
    log_level: String,
}

impl Args {
    fn overrides(&self) -> ConfigOverrides {
        let mut overrides = ConfigOverrides::new();
        if let Some(address) = &self.api_address {
            overrides = overrides.with_api_address(address.clone());
        }
        if let Some(room_id) = self.room_id {
            overrides = overrides.with_room_id(room_id);
        }
        if let Some(timezone) = &self.timezone {
            overrides = overrides.with_timezone(timezone.clone());
        }
        overrides
    }
}

/// Initialize logging with the specified level
///
/// Logs go to stderr so the JSON surface owns stdout.
fn init_logging(level: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new(format!("roomboard={level},roomboard_core={level}"))
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .init();
}

/// Flip `shutdown` on the first SIGTERM or SIGINT
fn install_signal_handlers(shutdown: watch::Sender<bool>) -> Result<()> {
    let mut sigterm = signal(SignalKind::terminate()).context("Failed to install SIGTERM handler")?;
    let mut sigint = signal(SignalKind::interrupt()).context("Failed to install SIGINT handler")?;

    tokio::spawn(async move {
        tokio::select! {
            _ = sigterm.recv() => info!("Received SIGTERM, initiating shutdown"),
            _ = sigint.recv() => info!("Received SIGINT, initiating shutdown"),
        }
        let _ = shutdown.send(true);
    });
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args.log_level);

    info!("Roomboard starting");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let mut config = load_config_from_path(args.config.clone()).context("Failed to load config")?;
    args.overrides().apply(&mut config);
    config.validate().context("Invalid configuration")?;

    if let Some(path) = &config.config_file_path {
        info!(config_path = ?path, "Config file");
    }
    info!(source = %config.source(), "Configuration loaded");

    let source = Arc::new(
        HttpBookingSource::from_config(&config).context("Failed to build HTTP client")?,
    );
    info!(
        url = source.url(),
        cadence_ms = u64::try_from(config.api.poll_interval.as_millis()).unwrap_or(u64::MAX),
        "Polling booking backend"
    );

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    install_signal_handlers(shutdown_tx)?;

    let (tx, rx) = mpsc::channel(COMMAND_BUFFER);
    let surface_task = tokio::spawn(surface::run(args.output, rx));

    let mut kiosk = Kiosk::new(source, &config, tx);
    let result = kiosk.run(shutdown_rx).await;

    // dropping the kiosk closes the command channel and ends the surface
    drop(kiosk);
    let surface_result = surface_task.await.context("Surface task panicked")?;

    match result.and(surface_result) {
        Ok(()) => {
            info!("Roomboard stopped cleanly");
            Ok(())
        }
        Err(e) => {
            error!(error = %e, "Roomboard stopped with error");
            Err(e)
        }
    }
}
