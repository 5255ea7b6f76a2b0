//! High-level imagery service layer.
//!
//! Backend-agnostic render cycle used by every UI surface: query the
//! catalog, plan the composite, and register it for tile display.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │  UI Layer (HTML dashboard, JSON API)                    │
//! └───────────────────┬─────────────────────────────────────┘
//!                     │
//! ┌───────────────────▼─────────────────────────────────────┐
//! │  Service Layer (services.rs) - Render Cycle             │
//! │  - Window / threshold / band mode resolution             │
//! │  - No-data detection                                     │
//! │  - Visualization selection                               │
//! └───────────────────┬─────────────────────────────────────┘
//!                     │
//! ┌───────────────────▼─────────────────────────────────────┐
//! │  Service Traits (service/) - Abstract Interface          │
//! │  - CatalogService (image queries)                        │
//! │  - CompositeService (mosaic planning)                    │
//! │  - TileService (tile handles)                            │
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
//! # Usage
//!
//! ```no_run
//! use ndvi_dashboard::imagery::{services, LocalImageryService};
//! use ndvi_dashboard::models::SessionParams;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let service = LocalImageryService::with_demo_scenes()?;
//!     let render = services::render_session(&service, &SessionParams::default()).await?;
//!     println!("{} images in {}", render.image_count(), render.window);
//!     Ok(())
//! }
//! ```

use log::{debug, warn};
use serde::Serialize;

use super::service::{FullImageryService, ImageryError, ImageryResult, TileHandle};
use crate::models::{
    BandMode, CloudThreshold, Composite, ImageQuery, ImageSummary, Region, SessionParams,
    TimeWindow, VisParams,
};

/// Why a render cycle produced no raster.
#[derive(Debug, thiserror::Error)]
pub enum CompositeError {
    /// No image in the window passed the cloud filter.
    #[error("No images below {threshold} cloud cover in {window}")]
    NoData {
        window: TimeWindow,
        threshold: CloudThreshold,
    },

    #[error(transparent)]
    Service(#[from] ImageryError),
}

/// A composite ready for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompositeRender {
    pub window: TimeWindow,
    pub threshold: CloudThreshold,
    pub mode: BandMode,
    /// Contributing images, newest first
    pub images: Vec<ImageSummary>,
    pub composite: Composite,
    pub vis: VisParams,
    pub tile: TileHandle,
}

// ==================== Health ====================

/// Check if the imagery service is reachable.
///
/// # Returns
/// * `Ok(true)` if the service is healthy
/// * `Err` if the check itself fails
pub async fn health_check<S: FullImageryService + ?Sized>(service: &S) -> ImageryResult<bool> {
    service.health_check().await
}

// ==================== Render Cycle ====================

/// Run one render cycle.
///
/// # Arguments
/// * `service` - Imagery backend
/// * `region` - Area to composite and clip to
/// * `window` - Acquisition window (inclusive dates)
/// * `threshold` - Images must have strictly less cloud cover than this
/// * `mode` - Pixel transform and visualization
///
/// # Returns
/// * `Ok(CompositeRender)` with a tile handle for the mosaic
/// * `Err(CompositeError::NoData)` if no image qualifies
/// * `Err(CompositeError::Service)` on any service fault
pub async fn compute_composite<S: FullImageryService + ?Sized>(
    service: &S,
    region: Region,
    window: TimeWindow,
    threshold: CloudThreshold,
    mode: BandMode,
) -> Result<CompositeRender, CompositeError> {
    let query = ImageQuery::new(region, window, threshold);
    let set = service.query_images(&query).await?;

    if set.is_empty() {
        warn!("No images below {} cloud cover in {}", threshold, window);
        return Err(CompositeError::NoData { window, threshold });
    }
    debug!(
        "{} images below {} cloud cover in {}: {:?}",
        set.len(),
        threshold,
        window,
        set.ids()
    );

    let composite = service.build_composite(&set, mode).await?;
    let vis = VisParams::for_mode(mode);
    let tile = service.get_tile_handle(&composite, &vis).await?;
    debug!("{} composite available at {}", mode, tile.url_template);

    Ok(CompositeRender {
        window,
        threshold,
        mode,
        images: set.summaries(),
        composite,
        vis,
        tile,
    })
}

/// Result of a render cycle as shown to a user.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RenderOutcome {
    Ready {
        vis: VisParams,
        tile: TileHandle,
    },
    NoData,
}

/// Render cycle for one set of session parameters.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionRender {
    pub params: SessionParams,
    pub window: TimeWindow,
    pub images: Vec<ImageSummary>,
    pub outcome: RenderOutcome,
}

impl SessionRender {
    pub fn image_count(&self) -> usize {
        self.images.len()
    }

    pub fn is_no_data(&self) -> bool {
        matches!(self.outcome, RenderOutcome::NoData)
    }

    pub fn tile(&self) -> Option<&TileHandle> {
        match &self.outcome {
            RenderOutcome::Ready { tile, .. } => Some(tile),
            RenderOutcome::NoData => None,
        }
    }
}

/// Run the render cycle for `params` over the fixed deployment region.
///
/// The no-data condition is folded into [`RenderOutcome::NoData`]; only
/// service faults are returned as errors.
pub async fn render_session<S: FullImageryService + ?Sized>(
    service: &S,
    params: &SessionParams,
) -> ImageryResult<SessionRender> {
    let window = params.window();
    match compute_composite(
        service,
        params.region(),
        window,
        params.cloud_threshold,
        params.band_mode,
    )
    .await
    {
        Ok(render) => Ok(SessionRender {
            params: *params,
            window,
            images: render.images,
            outcome: RenderOutcome::Ready {
                vis: render.vis,
                tile: render.tile,
            },
        }),
        Err(CompositeError::NoData { .. }) => Ok(SessionRender {
            params: *params,
            window,
            images: Vec::new(),
            outcome: RenderOutcome::NoData,
        }),
        Err(CompositeError::Service(e)) => Err(e),
    }
}

#[cfg(test)]
#[path = "services_tests.rs"]
mod services_tests;
