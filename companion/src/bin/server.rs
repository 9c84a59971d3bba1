//! Companion daemon binary.
//!
//! Starts the axum web server, the background loops and signal handling.
//! The browser extension shim connects to `/ws` and reports platform events
//! over the REST API.

use tracing_subscriber::EnvFilter;

use bngts_companion_lib::app::SharedState;
use bngts_companion_lib::background;
use bngts_companion_lib::host::{CookieScoping, TargetScoping};
use bngts_companion_lib::server;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Step 1: Tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    tracing::info!(
        cookie_target = TargetScoping::TARGET,
        "Starting bngts companion"
    );

    // Step 2: Foundation
    let (db, config, dir) = bngts_companion_lib::init_foundation()?;
    let state = SharedState::new(db, config, dir)?;

    // Step 3: Web server
    let server_state = state.clone();
    let server_handle = tokio::spawn(async move {
        if let Err(e) = server::start_server(server_state).await {
            tracing::error!("Server failed: {e}");
        }
    });

    // Step 4: Storage events (badge + surface fan-out)
    let s = state.clone();
    tokio::spawn(async move { background::storage_event_loop(s).await });

    // Step 5: Writes from other processes
    let s = state.clone();
    tokio::spawn(async move { background::external_change_loop(s).await });

    // Step 6: Periodic live status poll
    let s = state.clone();
    tokio::spawn(async move { background::live_status_poll_loop(s).await });

    tracing::info!(
        port = state.server_port(),
        "Companion running. Press Ctrl+C to stop."
    );

    // Wait for shutdown signal
    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutting down...");

    state.shutdown_token().cancel();
    if let Err(e) = server_handle.await {
        tracing::warn!("Server task ended abnormally: {e}");
    }
    Ok(())
}
