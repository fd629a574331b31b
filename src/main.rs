//! Console request-forwarding proxy.
//!
//! Serves the admin console and relays its API calls to the backend.
//!
//! # Architecture Overview
//!
//! ```text
//!                     ┌───────────────────────────────────────────────────┐
//!                     │                  CONSOLE PROXY                     │
//!                     │                                                    │
//!   Browser request   │  ┌──────────┐   ┌───────────┐   ┌──────────────┐  │
//!   ──────────────────┼─▶│ listener │──▶│ middleware│──▶│ /api/proxy/* │──┼──▶ Backend
//!                     │  │ (TLS?)   │   │ id + gate │   │  forwarder   │  │    REST API
//!                     │  └──────────┘   └─────┬─────┘   └──────┬───────┘  │
//!                     │                       │                │          │
//!                     │                       ▼                │          │
//!                     │                ┌─────────────┐         │          │
//!                     │                │ static UI   │         │          │
//!                     │                └─────────────┘         │          │
//!   Browser response  │                                        │          │
//!   ◀─────────────────┼────────────────────────────────────────┘          │
//!                     └───────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::sync::mpsc;

use console_proxy::config::{load_config, load_from_env, watcher::ConfigWatcher};
use console_proxy::net::{listener, tls};
use console_proxy::observability::{logging, metrics};
use console_proxy::{HttpServer, Shutdown};

#[derive(Parser)]
#[command(name = "console-proxy")]
#[command(about = "Serves the admin console and forwards its API calls to the backend", long_about = None)]
struct Cli {
    /// TOML configuration file. Without it, defaults plus environment are used.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the listener bind address.
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => load_from_env()?,
    };
    if let Some(bind) = cli.bind {
        config.listener.bind_address = bind;
    }

    logging::init_logging(&config.observability.log_level);
    tracing::info!("console-proxy v{} starting", env!("CARGO_PKG_VERSION"));

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr)?,
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    // The watcher must outlive the server.
    let (_watcher, config_updates) = match &cli.config {
        Some(path) => {
            let (watcher, updates) = ConfigWatcher::new(path);
            (Some(watcher.run()?), updates)
        }
        None => {
            let (_, updates) = mpsc::unbounded_channel();
            (None, updates)
        }
    };

    let shutdown = Shutdown::new();
    shutdown.trigger_on_signal();

    let tls_config = config.listener.tls.clone();
    let listener_config = config.listener.clone();
    let server = HttpServer::new(config)?;

    match tls_config {
        Some(tls_paths) => {
            let rustls = tls::load_tls_config(&tls_paths).await?;
            let addr = listener::bind_address(&listener_config)?;
            server
                .run_tls(addr, rustls, config_updates, shutdown.subscribe())
                .await?;
        }
        None => {
            let tcp = listener::bind(&listener_config).await?;
            server.run(tcp, config_updates, shutdown.subscribe()).await?;
        }
    }

    tracing::info!("Shutdown complete");
    Ok(())
}
