//! Hilal HTTP Server Binary
//!
//! This is the main entry point for the crescent visibility REST API server.
//! It loads the configuration, builds the station network, and starts
//! serving requests.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin hilal-server
//! ```
//!
//! # Environment Variables
//!
//! - `HOST`: Server host (default: 0.0.0.0)
//! - `PORT`: Server port (default: 3000)
//! - `HILAL_DISPLAY_OFFSET_HOURS`: Clock offset for batch report times
//! - `HILAL_HORIZON_DIP_DEG`: Horizon dip applied to setting searches
//! - `HILAL_STATIONS_FILE`: TOML file replacing the built-in station network
//! - `RUST_LOG`: Log level (default: info)

use std::env;
use std::net::SocketAddr;
use std::sync::Arc;

use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use hilal_rust::config::Config;
use hilal_rust::ephemeris::PracticalAstronomy;
use hilal_rust::http::{create_router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    FmtSubscriber::builder()
        .with_max_level(
            env::var("RUST_LOG")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(Level::INFO),
        )
        .with_target(true)
        .with_thread_ids(true)
        .init();

    info!("Starting Hilal HTTP Server");

    let config = Config::load()?;
    let stations = config.stations()?;
    info!(
        "Loaded {} stations, display offset {:+} h",
        stations.len(),
        config.display_offset_hours
    );

    let ephemeris = Arc::new(PracticalAstronomy::new());
    let addr: SocketAddr = config.bind_addr().parse()?;

    // Create application state and router
    let state = AppState::new(ephemeris, config, stations);
    let app = create_router(state);

    info!("Server listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
