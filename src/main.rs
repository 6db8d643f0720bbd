//! Remote read HTTP server binary entry point.

use clap::Parser;
use tracing_subscriber::EnvFilter;

use remote_read::create_store;
use remote_read::server::{CliArgs, ReadServer, ReadServerConfig};

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Parse CLI arguments
    let args = CliArgs::parse();

    let config = match args.load_config() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };
    tracing::info!("Using store config: {:?}", config.store);

    let store = create_store(&config.store).unwrap_or_else(|e| {
        tracing::error!("Failed to create store: {}", e);
        std::process::exit(1);
    });

    let server_config = ReadServerConfig::new(&args, &config);
    let server = ReadServer::new(store, config.grouping(), server_config);
    if let Err(e) = server.run().await {
        tracing::error!("Server failed: {}", e);
        std::process::exit(1);
    }
}
