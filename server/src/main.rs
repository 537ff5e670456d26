//! Fleet provisioning store daemon.
//!
//! Serves the provisioning REST API over a SQLite database and keeps the
//! accepted device types in step with the firmware service.
//!
//! Usage:
//!   fleetprov-server --db /var/lib/fleetprov/prov.db --port 16005 \
//!       --firmware-url http://fms:16004

use std::{fs, path::PathBuf, sync::Arc};
use anyhow::{Context, Result};
use clap::Parser;
use fleetprov_server::build_router;
use fleetprov_storage::{FirmwareServiceConfig, StorageConfig, StorageService};
use tracing::{info, warn, Level};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser, Debug)]
#[command(name = "fleetprov-server")]
#[command(about = "Fleet provisioning referential object store")]
struct Args {
    /// JSON configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Database file (overrides the config file; in-memory when unset)
    #[arg(long)]
    db: Option<PathBuf>,

    /// HTTP port to listen on
    #[arg(short, long, default_value = "16005")]
    port: u16,

    /// Firmware service base URL for device-type refresh
    #[arg(long)]
    firmware_url: Option<String>,

    /// Enable verbose debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn load_config(args: &Args) -> Result<StorageConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let raw = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file {}", path.display()))?;
            StorageConfig::from_json(&raw).context("Failed to parse config file")?
        }
        None => StorageConfig::default(),
    };
    if let Some(db) = &args.db {
        config.database.path = Some(db.clone());
    }
    if let Some(url) = &args.firmware_url {
        match config.firmware.as_mut() {
            Some(firmware) => firmware.base_url = url.clone(),
            None => config.firmware = Some(FirmwareServiceConfig::new(url.clone())),
        }
    }
    Ok(config)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown requested");
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let log_level = if args.verbose { Level::DEBUG } else { Level::INFO };
    FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(log_level.as_str())),
        )
        .with_target(false)
        .compact()
        .init();

    info!("Fleet provisioning store starting...");
    let config = load_config(&args)?;
    match &config.database.path {
        Some(path) => info!("Database: {}", path.display()),
        None => warn!("No database path configured, data is kept in memory only"),
    }

    let service = Arc::new(
        StorageService::start(&config)
            .await
            .context("Failed to open provisioning storage")?,
    );

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", args.port))
        .await
        .with_context(|| format!("Failed to bind HTTP port {}", args.port))?;
    info!("HTTP API listening on port {}", args.port);

    axum::serve(listener, build_router(Arc::clone(&service)))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")?;

    service.stop().await;
    info!("Fleet provisioning store stopped");
    Ok(())
}
