use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;

use portfolio_server::config::{finalize, load_config, ServerConfig};
use portfolio_server::lifecycle::{signals, Shutdown};
use portfolio_server::observability::{logging, metrics};
use portfolio_server::store::{MemoryStore, Store};
use portfolio_server::HttpServer;

#[derive(Parser)]
#[command(name = "portfolio-server")]
#[command(about = "Portfolio site backend", long_about = None)]
struct Args {
    /// Path to a TOML config file; defaults apply without one
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => finalize(ServerConfig::default())?,
    };

    logging::init_logging(&config.observability.log_level);
    tracing::info!("portfolio-server v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        request_timeout_secs = config.timeouts.request_secs,
        max_attempts = config.retries.max_attempts,
        "Configuration loaded"
    );

    let store = match &config.storage.snapshot_path {
        Some(path) => MemoryStore::open(path).await?,
        None => MemoryStore::default(),
    };
    let store: Arc<dyn Store> = Arc::new(store);

    if config.observability.metrics_enabled {
        if let Ok(addr) = config.observability.metrics_address.parse() {
            metrics::init_metrics(addr);
        } else {
            tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            );
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    signals::spawn_signal_handler(&shutdown);

    let server = HttpServer::new(config, store);
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
