//! Imagery module: access to the satellite imagery service.
//!
//! The remote service is reached through narrow traits so the selection
//! policy can run against either backend.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │  Application Layer (HTML dashboard, JSON API)           │
//! └───────────────────┬─────────────────────────────────────┘
//!                     │
//! ┌───────────────────▼─────────────────────────────────────┐
//! │  Service Layer (services.rs) - Render Cycle             │
//! └───────────────────┬─────────────────────────────────────┘
//!                     │
//! ┌───────────────────▼─────────────────────────────────────┐
//! │  Service Traits (service/) - Abstract Interface          │
//! └───────────────────┬─────────────────────────────────────┘
//!                     │
//!     ┌───────────────┴────────────────┐
//!     │                                 │
//! ┌───▼──────────────┐     ┌──────────▼──────────────┐
//! │ Earth Engine     │     │ Local Service           │
//! │ (REST API)       │     │ (in-memory)             │
//! └──────────────────┘     └─────────────────────────┘
//! ```
//!
//! The module includes:
//! - `services`: the render cycle (use these in your application!)
//! - `service`: trait definitions and the error type
//! - `providers::local`: in-memory implementation with demo scenes
//! - `providers::earthengine`: Earth Engine REST implementation
//! - `factory`: creates the configured backend
//! - `config`: `dashboard.toml` and credential loading
//!
//! # Recommended Usage
//!
//! ```ignore
//! use ndvi_dashboard::imagery::{services, DashboardConfig, ImageryFactory};
//! use ndvi_dashboard::models::SessionParams;
//!
//! async fn example() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = DashboardConfig::load()?;
//!     let service = ImageryFactory::from_config(&config)?;
//!     let render = services::render_session(service.as_ref(), &SessionParams::default()).await?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod factory;
pub mod providers;
pub mod service;
pub mod services;

pub use services::{
    compute_composite, health_check, render_session, CompositeError, CompositeRender,
    RenderOutcome, SessionRender,
};

pub use config::{DashboardConfig, ServiceCredentials};
pub use factory::{ImageryFactory, ServiceType};
#[cfg(feature = "earthengine")]
pub use providers::{EarthEngineConfig, EarthEngineService};
pub use providers::{InjectedFailure, LocalImageryService, LocalScene};
pub use service::{
    CatalogService, CompositeService, ErrorContext, FullImageryService, ImageryError,
    ImageryResult, TileHandle, TileService,
};
