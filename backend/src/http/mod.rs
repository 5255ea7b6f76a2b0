//! HTTP server module for the dashboard.
//!
//! An axum server exposing the dashboard page, a JSON render endpoint and
//! locally rendered tiles, all backed by the imagery service layer.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │  HTTP Layer (axum handlers)                               │
//! │  - Query parameter parsing and validation                 │
//! │  - HTML / JSON / PNG responses                            │
//! │  - CORS, compression, error handling                      │
//! └───────────────────┬──────────────────────────────────────┘
//!                     │
//! ┌───────────────────▼──────────────────────────────────────┐
//! │  Presenter (presenter/)                                   │
//! │  - Map view, legend, sidebar, page rendering              │
//! └───────────────────┬──────────────────────────────────────┘
//!                     │
//! ┌───────────────────▼──────────────────────────────────────┐
//! │  Imagery Service Layer (imagery/services.rs)              │
//! │  - Render cycle against the configured backend            │
//! └──────────────────────────────────────────────────────────┘
//! ```

#[cfg(feature = "http-server")]
pub mod handlers;

#[cfg(feature = "http-server")]
pub mod router;

#[cfg(feature = "http-server")]
pub mod state;

#[cfg(feature = "http-server")]
pub mod error;

#[cfg(feature = "http-server")]
pub mod dto;

#[cfg(feature = "http-server")]
pub use router::create_router;

#[cfg(feature = "http-server")]
pub use state::AppState;
