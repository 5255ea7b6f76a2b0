//! # NDVI Dashboard
//!
//! Cloud-filtered Sentinel-2 vegetation composites for a fixed region,
//! served as an interactive map dashboard.
//!
//! For a reference date, the images of the preceding three weeks with little
//! cloud cover are selected, transformed per band mode (NDVI by default),
//! mosaicked newest first and displayed as a tile layer with a legend and
//! per-image diagnostics.
//!
//! ## Features
//!
//! - **Selection policy**: fixed region, 21-day inclusive window, strict cloud threshold
//! - **Band modes**: NDVI, true color RGB, red and near infrared
//! - **Imagery backends**: Google Earth Engine REST (`earthengine` feature) or in-memory scenes
//! - **Local rendering**: pixel math, recency mosaic and PNG tiles for the in-memory backend
//! - **HTTP dashboard**: HTML page, JSON render endpoint and tiles (`http-server` feature)
//!
//! ## Architecture
//!
//! - [`models`]: Region, time window, thresholds, band modes, image sets, visualization
//! - [`raster`]: band grids, normalized difference, mosaic, tile rendering
//! - [`imagery`]: service traits, providers, factory, configuration, render cycle
//! - [`presenter`]: map view, legend, sidebar and page rendering
//! - [`http`]: Axum-based HTTP server and request handlers
//! - [`api`]: flat re-export of the public types

// Allow large error types - ImageryError carries a structured context
#![allow(clippy::result_large_err)]

pub mod api;
pub mod imagery;
pub mod models;
pub mod presenter;
pub mod raster;

#[cfg(feature = "http-server")]
pub mod http;
