//! Relay server entry point.
//!
//! Initializes structured logging, loads configuration from environment
//! variables, builds the shared application state, and serves until the
//! process is terminated.

use std::sync::Arc;

use tracing::info;
use tracing_subscriber::EnvFilter;

use roomcast_server::{config, start_server, AppState};

/// Application entry point.
///
/// # Errors
///
/// Returns an error if configuration is invalid or the server cannot
/// bind to its address.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    info!("roomcast-server starting");

    let config = config::from_env()?;
    info!(
        host = config.host,
        port = config.port,
        "configuration loaded"
    );

    let state = Arc::new(AppState::new());

    start_server(&config, state).await?;

    Ok(())
}
