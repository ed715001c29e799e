use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use contacts_api::ContactsHttpServer;
use contacts_api::config::{load_config, load_config_from_path};
use contacts_store::{ContactStore, InMemoryContactStore, seed_contacts};
use tracing::info;

/// Serve the contacts HTTP API.
#[derive(Debug, Parser)]
#[command(name = "contacts", version, about)]
struct Cli {
    /// Configuration file; defaults to CONTACTS_CONFIG_PATH or the user config directory.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Socket address to bind, overriding the configured one.
    #[arg(long, value_name = "ADDR")]
    bind: Option<SocketAddr>,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config_from_path(path).with_context(|| format!("failed to load configuration from {}", path.display()))?,
        None => load_config().context("failed to load configuration")?,
    };

    let store: Arc<dyn ContactStore> = if config.seed_data {
        Arc::new(InMemoryContactStore::with_contacts(seed_contacts()).context("failed to seed contacts")?)
    } else {
        Arc::new(InMemoryContactStore::new())
    };

    let mut server = ContactsHttpServer::new(config, store)?;
    if let Some(bind_address) = cli.bind {
        server = server.with_bind_address(bind_address);
    }

    let running = server.start().await?;
    info!(address = %running.bound_address(), "press Ctrl-C to stop");
    tokio::signal::ctrl_c().await.context("failed to listen for Ctrl-C")?;
    info!("shutting down");
    running.stop().await
}

fn init_tracing() {
    let filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into());
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
