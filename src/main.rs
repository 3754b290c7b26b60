//! traffic-router
//!
//! Resolves HTTP requests to backend groups using a priority-ordered route
//! table. Routes may split traffic probabilistically and pin returning
//! clients to a group through a cookie.
//!
//! ```text
//!   Client Request ──▶ axum server ──▶ route table (ArcSwap) ──▶ 200 {route, backend_group}
//!                                           ▲                    404 no match
//!                                           │
//!   config.toml ──▶ watcher ──▶ loader ──▶ validate ──▶ compile (Traffic args checked)
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;

use traffic_router::config::load_config;
use traffic_router::config::watcher::ConfigWatcher;
use traffic_router::lifecycle::signals::wait_for_ctrl_c;
use traffic_router::observability::init_logging;
use traffic_router::{HttpServer, PredicateRegistry, Shutdown};

#[derive(Parser)]
#[command(name = "traffic-router")]
#[command(about = "Route requests to backend groups with traffic splitting", long_about = None)]
struct Cli {
    /// Path to the TOML route configuration.
    #[arg(short, long, default_value = "traffic-router.toml")]
    config: PathBuf,

    /// Validate and compile the configuration, then exit.
    #[arg(long)]
    check: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = load_config(&cli.config)?;
    init_logging(&config.observability.log_level)?;

    tracing::info!(
        config = ?cli.config,
        bind_address = %config.listener.bind_address,
        routes = config.routes.len(),
        "Configuration loaded"
    );

    let bind_address = config.listener.bind_address.clone();
    let server = HttpServer::new(config, PredicateRegistry::with_defaults())?;

    if cli.check {
        tracing::info!("Configuration OK");
        return Ok(());
    }

    let (watcher, config_updates) =
        ConfigWatcher::new(&cli.config, Arc::new(PredicateRegistry::with_defaults()));
    // Dropping the handle stops the watcher.
    let _watcher = watcher.run()?;

    let listener = TcpListener::bind(&bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(wait_for_ctrl_c(shutdown));

    server.run(listener, config_updates, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
