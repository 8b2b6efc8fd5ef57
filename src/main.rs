//! Edge request forwarder.
//!
//! ```text
//!     Client ──▶ /api/<path>?<query>  ──┐
//!                                       ├──▶ Forwarder ──▶ <backend>/api/<path>?<query>
//!     Client ──▶ /health?<query>      ──┘                  <backend>/health?<query>
//!            ◀──────────── status, headers, streamed body ◀──────────┘
//! ```

use clap::Parser;
use tokio::net::TcpListener;
use tokio::sync::mpsc;

use edge_forwarder::config::watcher::ConfigWatcher;
use edge_forwarder::config::loader::parse_config;
use edge_forwarder::config::{Cli, ForwarderConfig};
use edge_forwarder::lifecycle::{wait_for_signal, Shutdown};
use edge_forwarder::observability::{logging, metrics};
use edge_forwarder::HttpServer;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let file_config = match &cli.config {
        Some(path) => parse_config(&std::fs::read_to_string(path)?)?,
        None => ForwarderConfig::default(),
    };
    let config = cli.resolve(file_config)?;

    logging::init_logging(&config.observability);
    tracing::info!("edge-forwarder v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        backend = %config.backend.base_url,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        // Address already validated.
        let addr = config.observability.metrics_address.parse()?;
        if let Err(e) = metrics::init_metrics(addr) {
            tracing::error!(error = %e, "Failed to start metrics endpoint");
        }
    }

    // Reloaded configs pass through the same overrides as the startup one.
    let (config_tx, config_updates) = mpsc::unbounded_channel();
    let _watcher = match (&cli.config, cli.watch) {
        (Some(path), true) => {
            let (watcher, mut file_updates) = ConfigWatcher::new(path);
            let handle = watcher.run()?;
            let cli = cli.clone();
            tokio::spawn(async move {
                while let Some(reloaded) = file_updates.recv().await {
                    match cli.resolve(reloaded) {
                        Ok(config) => {
                            let _ = config_tx.send(config);
                        }
                        Err(e) => tracing::error!(
                            error = %e,
                            "Reloaded config rejected, keeping current configuration"
                        ),
                    }
                }
            });
            Some(handle)
        }
        (None, true) => {
            tracing::warn!("--watch has no effect without --config");
            None
        }
        _ => None,
    };

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    let signal_shutdown = shutdown.clone();
    tokio::spawn(async move {
        match wait_for_signal().await {
            Ok(()) => signal_shutdown.trigger(),
            Err(e) => tracing::error!(error = %e, "Failed to install signal handlers"),
        }
    });

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let server = HttpServer::new(config)?;
    server.run(listener, config_updates, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
