use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;
use tokio::sync::mpsc;

use edge_rewrite::config::{load_config, ConfigWatcher, RewriterConfig};
use edge_rewrite::lifecycle::{wait_for_signal, Shutdown};
use edge_rewrite::observability::{init_logging, metrics};
use edge_rewrite::HttpServer;

#[derive(Parser)]
#[command(name = "edge-rewrite")]
#[command(about = "Edge proxy that serves decorated paths from their canonical location", long_about = None)]
struct Args {
    /// Path to the TOML configuration file. Built-in defaults when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Reload rewrite rules when the configuration file changes.
    #[arg(short, long, requires = "config")]
    watch: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => RewriterConfig::default(),
    };

    init_logging(&config.observability)?;

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "edge-rewrite starting");
    let prefixes: Vec<&str> = config.rules.iter().map(|r| r.prefix.as_str()).collect();
    tracing::info!(
        bind_address = %config.listener.bind_address,
        origin = %config.origin.url,
        rules = ?prefixes,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    // The watcher handle must outlive the server.
    let (_watcher, config_updates) = match (&args.config, args.watch) {
        (Some(path), true) => {
            let (watcher, updates) = ConfigWatcher::new(path);
            (Some(watcher.run()?), updates)
        }
        _ => {
            let (_, updates) = mpsc::unbounded_channel();
            (None, updates)
        }
    };

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    let server = HttpServer::new(config)?;

    let signals = shutdown.clone();
    tokio::spawn(async move {
        wait_for_signal().await;
        signals.trigger();
    });

    server.run(listener, config_updates, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
