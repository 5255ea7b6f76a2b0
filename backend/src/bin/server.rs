//! NDVI dashboard HTTP server binary.
//!
//! Loads configuration, creates the imagery service, sets up the HTTP
//! router, and starts serving requests.
//!
//! # Usage
//!
//! ```bash
//! # Run with the in-memory demo imagery (default)
//! cargo run --bin ndvi-server
//!
//! # Run against Google Earth Engine
//! IMAGERY_SERVICE=earthengine GEE_EMAIL=... GEE_KEY=... \
//!   cargo run --bin ndvi-server --features earthengine
//! ```
//!
//! # Environment Variables
//!
//! - `HOST`: Server host (default: 0.0.0.0)
//! - `PORT`: Server port (default: 8080)
//! - `IMAGERY_SERVICE`: `local` or `earthengine` (default: from `dashboard.toml`, else local)
//! - `GEE_EMAIL`, `GEE_KEY`: service account credentials
//! - `GEE_SECRETS_FILE`: TOML file holding the credentials instead
//! - `GEE_PROJECT`: cloud project (default: derived from `GEE_EMAIL`)
//! - `RUST_LOG`: Log level (default: info)
//!
//! A `.env` file in the working directory is loaded first.

use std::env;
use std::net::SocketAddr;

use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use ndvi_dashboard::http::{create_router, AppState};
use ndvi_dashboard::imagery::{self, DashboardConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            eprintln!("Failed to load .env: {}", e);
        }
    }

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

    info!("Starting NDVI dashboard server");

    let config = DashboardConfig::load().map_err(|e| anyhow::anyhow!(e.to_string()))?;
    let service_type = config
        .service_type()
        .map_err(|e| anyhow::anyhow!(e))?;
    if service_type == imagery::ServiceType::Local {
        warn!("Using local demo imagery; set IMAGERY_SERVICE=earthengine for live data");
    }

    let service = imagery::ImageryFactory::from_config(&config)
        .map_err(|e| anyhow::anyhow!(e.to_string()))?;
    info!("Imagery service initialized ({:?})", service_type);

    let state = AppState::new(service)
        .with_attribution(service_type.attribution())
        .with_zoom(config.map.zoom);

    let app = create_router(state);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;

    info!("Server listening on http://{}", addr);
    info!("Dashboard: http://{}/", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
