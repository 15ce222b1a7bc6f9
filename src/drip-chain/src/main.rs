//! Drip Chain: backend for the drip campaign chain editor.
//!
//! Stores the edited chain on disk and simulates walks through it.

use clap::Parser;
use drip_api::ApiServer;
use drip_core::config::AppConfig;
use drip_journey::SimulationEngine;
use drip_management::ChainStore;
use std::sync::Arc;
use tracing::{error, info, warn};

#[derive(Parser, Debug)]
#[command(name = "drip-chain")]
#[command(about = "Drip campaign chain editor backend and simulator")]
#[command(version)]
struct Cli {
    /// Bind address (overrides config)
    #[arg(long, env = "DRIP_CHAIN__API__HOST")]
    host: Option<String>,

    /// HTTP port (overrides config)
    #[arg(long, env = "DRIP_CHAIN__API__HTTP_PORT")]
    http_port: Option<u16>,

    /// Chain storage file (overrides config)
    #[arg(long, env = "DRIP_CHAIN__STORAGE__PATH")]
    storage_path: Option<String>,

    /// Language of simulation step messages: ru or en (overrides config)
    #[arg(long, env = "DRIP_CHAIN__SIMULATION__LOCALE")]
    locale: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "drip_chain=info,drip_api=info,drip_journey=info,tower_http=info".into()
            }),
        )
        .json()
        .init();

    let cli = Cli::parse();

    info!("Drip Chain starting up");

    let mut config = AppConfig::load().unwrap_or_else(|e| {
        warn!(error = %e, "Failed to load config, using defaults");
        AppConfig::default()
    });

    if let Some(host) = cli.host {
        config.api.host = host;
    }
    if let Some(port) = cli.http_port {
        config.api.http_port = port;
    }
    if let Some(path) = cli.storage_path {
        config.storage.path = path;
    }
    if let Some(locale) = cli.locale {
        config.simulation.locale = locale;
    }

    info!(
        node_id = %config.node_id,
        host = %config.api.host,
        http_port = config.api.http_port,
        storage = %config.storage.path,
        locale = %config.simulation.locale,
        max_steps = config.simulation.max_steps,
        "Configuration loaded"
    );

    let engine = Arc::new(SimulationEngine::from_config(&config.simulation));
    let store = Arc::new(ChainStore::new(&config.storage.path));

    let api_server = ApiServer::new(config.clone(), engine, store);

    if config.metrics.enabled {
        if let Err(e) = api_server.start_metrics().await {
            error!(error = %e, "Failed to start metrics exporter");
        }
    }

    info!("Drip Chain is ready to serve traffic");

    api_server.start_http().await?;

    Ok(())
}
