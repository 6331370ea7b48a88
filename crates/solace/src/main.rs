//! # solace
//!
//! Solace server binary: loads settings, starts the HTTP/WebSocket server
//! over the seeded in-memory store, and shuts down on Ctrl-C or SIGTERM.

#![deny(unsafe_code)]

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::Parser;
use solace_server::{ServerConfig, SolaceServer};
use solace_settings::SolaceSettings;
use solace_store::MemStorage;

/// How long to wait for the listener and relay to drain on shutdown.
const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(10);

/// Solace support server.
#[derive(Parser, Debug)]
#[command(name = "solace", about = "Anonymous mental-health support server")]
struct Cli {
    /// Host to bind (overrides settings).
    #[arg(long)]
    host: Option<String>,

    /// Port to bind, 0 for auto-assign (overrides settings).
    #[arg(long)]
    port: Option<u16>,

    /// Settings file (default `~/.solace/settings.json`).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Log filter, e.g. `debug` or `solace_server=trace` (overrides settings).
    #[arg(long)]
    log_level: Option<String>,
}

impl Cli {
    fn load_settings(&self) -> Result<SolaceSettings> {
        match &self.config {
            Some(path) => {
                if !path.exists() {
                    bail!("settings file not found: {}", path.display());
                }
                solace_settings::load_settings_from_path(path)
                    .with_context(|| format!("Failed to load settings from {}", path.display()))
            }
            None => solace_settings::load_settings().context("Failed to load settings"),
        }
    }

    fn server_config(&self, settings: &SolaceSettings) -> ServerConfig {
        let mut config = ServerConfig::from(settings);
        if let Some(host) = &self.host {
            config.host.clone_from(host);
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        config
    }

    fn log_level<'a>(&'a self, settings: &'a SolaceSettings) -> &'a str {
        self.log_level
            .as_deref()
            .unwrap_or(settings.logging.level.as_str())
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let settings = cli.load_settings()?;
    solace_logging::init_subscriber(cli.log_level(&settings), settings.logging.format);

    let config = cli.server_config(&settings);
    let metrics = solace_server::metrics::install_recorder();
    let storage = Arc::new(MemStorage::with_seed_data());
    let server = SolaceServer::new(config, storage).with_metrics(metrics);

    let (addr, handle) = server
        .listen()
        .await
        .context("Failed to bind server")?;
    tracing::info!(
        max_connections = server.config().max_connections,
        "Solace listening on http://{addr}"
    );

    shutdown_signal().await?;

    tracing::info!("Shutting down...");
    server
        .shutdown()
        .graceful_shutdown(vec![handle], Some(SHUTDOWN_TIMEOUT))
        .await;
    tracing::info!("Shutdown complete");
    Ok(())
}

/// Resolve on Ctrl-C or, on Unix, SIGTERM.
async fn shutdown_signal() -> Result<()> {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        let mut terminate =
            signal(SignalKind::terminate()).context("Failed to install SIGTERM handler")?;
        tokio::select! {
            result = tokio::signal::ctrl_c() => {
                result.context("Failed to listen for ctrl-c")?;
                tracing::info!("received Ctrl-C");
            }
            _ = terminate.recv() => tracing::info!("received SIGTERM"),
        }
    }
    #[cfg(not(unix))]
    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for ctrl-c")?;
    Ok(())
}
