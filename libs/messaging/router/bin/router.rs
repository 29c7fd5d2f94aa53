//! Router binary - the fabric's rendezvous point
//!
//! Usage:
//!   router --config config/fabric.toml
//!   router --address tcp://0.0.0.0:5555 --log-level debug

use anyhow::{bail, Context, Result};
use clap::Parser;
use fabric_config::{FabricConfig, ENV_PREFIX};
use router::Router;
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "router")]
#[command(about = "Reactor fabric message router")]
#[command(version)]
struct Args {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the configured bind address
    #[arg(short, long)]
    address: Option<String>,

    /// Log level (trace, debug, info, warn, error); RUST_LOG takes precedence
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Enable JSON logging format
    #[arg(long)]
    json_logs: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(&args)?;

    let mut config = FabricConfig::load(args.config.as_deref(), ENV_PREFIX).map_err(|e| {
        error!("Failed to load configuration: {:#}", e);
        e
    })?;
    if let Some(address) = args.address {
        config.router.address = address;
        config.validate()?;
    }

    let router = Router::bind(&config.router, &config.transport).await;
    if let Some(e) = router.bind_error() {
        bail!("Router could not bind {}: {}", router.address(), e);
    }

    info!(
        "Router listening on {}",
        router.local_addr().unwrap_or(router.address())
    );

    let shutdown = CancellationToken::new();
    let handle = router.spawn(shutdown.clone());

    tokio::signal::ctrl_c()
        .await
        .context("Failed to install CTRL+C signal handler")?;
    info!("Received shutdown signal");

    shutdown.cancel();
    handle.await.context("Router task panicked")??;

    info!("Router stopped");
    Ok(())
}

fn init_logging(args: &Args) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&args.log_level))
        .context("Invalid log level")?;

    if args.json_logs {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    Ok(())
}
