// Server startup: store wiring, background sweeper, graceful shutdown

use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Instant;

use crate::constants;
use crate::gallery::Gallery;
use crate::remote::RpcStore;
use crate::server::{create_router, ServerConfig};
use crate::session;

/// Everything the binary needs to bring the server up.
pub struct StartupConfig {
    pub rpc_url: String,
    pub owner: String,
    pub host: String,
    pub port: u16,
}

pub async fn start_server(config: StartupConfig) -> Result<()> {
    let store = RpcStore::new(&config.rpc_url, &config.owner)
        .context("Failed to create remote store client")?;
    let gallery = Arc::new(Gallery::new(Arc::new(store)));

    let server_config = ServerConfig {
        version: constants::VERSION.to_string(),
        owner: config.owner.clone(),
    };
    let app = create_router(Arc::clone(&gallery), server_config, Instant::now());

    let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
    let sweeper = session::spawn_sweeper(gallery.sessions(), shutdown_rx);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .context("Failed to bind to address")?;

    eprintln!("{} HTTP server started", constants::BINARY_NAME);
    eprintln!("  Listening: http://{}", addr);
    eprintln!("  RPC endpoint: {}", config.rpc_url);
    eprintln!("  Owner scope: {}", config.owner);
    eprintln!("\nPress Ctrl+C to stop\n");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_future())
        .await
        .context("Server error")?;

    // Stop the sweeper before reporting shutdown complete.
    let _ = shutdown_tx.send(true);
    let _ = sweeper.await;
    eprintln!("Shutdown complete");
    Ok(())
}

async fn shutdown_future() {
    let _ = tokio::signal::ctrl_c().await;
    eprintln!("\nShutting down...");
}
