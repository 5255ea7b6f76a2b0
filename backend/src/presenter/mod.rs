//! View assembly for the dashboard.
//!
//! Turns a [`SessionRender`] into display-ready pieces: the map view with
//! its single tile layer, the conditional legend, the sidebar text and the
//! explanation panel. [`page`] renders them into one HTML document; the JSON
//! API serializes the same structures.

pub mod explanation;
pub mod legend;
pub mod page;
pub mod sidebar;

use chrono::NaiveDate;
use serde::Serialize;
use uuid::Uuid;

use crate::imagery::SessionRender;
use crate::models::{BandMode, AKITA};

pub use explanation::{explanation_html, NDVI_FORMULA_LATEX};
pub use legend::{legend_for, Legend, LegendEntry};
pub use page::{escape_html, render_error_page, render_page};
pub use sidebar::{Diagnostic, Sidebar, NO_DATA_WARNING};

/// Initial zoom level of the map.
pub const DEFAULT_ZOOM: u8 = 12;

/// Unique display name of a composite layer: `{MODE}_{date}_{uuid}`.
pub fn layer_name(mode: BandMode, reference_date: NaiveDate) -> String {
    format!("{}_{}_{}", mode.label(), reference_date, Uuid::new_v4())
}

/// Overlay of composite tiles.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TileLayer {
    pub url: String,
    pub attribution: String,
    pub name: String,
    pub overlay: bool,
    pub control: bool,
}

/// Map centered on the region with at most one composite layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapView {
    /// `[lat, lon]`, as map clients expect
    pub center: [f64; 2],
    pub zoom: u8,
    pub tile_layer: Option<TileLayer>,
    pub legend: Option<Legend>,
}

impl MapView {
    /// Map for `render`; no tile layer and no legend when there is no data.
    pub fn for_render(render: &SessionRender, attribution: &str, zoom: u8) -> Self {
        let (lon, lat) = render.params.region().centroid();
        let tile_layer = render.tile().map(|tile| TileLayer {
            url: tile.url_template.clone(),
            attribution: attribution.to_string(),
            name: layer_name(render.params.band_mode, render.params.reference_date),
            overlay: true,
            control: true,
        });
        let legend = tile_layer
            .as_ref()
            .and_then(|_| legend_for(render.params.band_mode));
        Self {
            center: [lat, lon],
            zoom,
            tile_layer,
            legend,
        }
    }

    /// Map without any layer, used when the render cycle failed.
    pub fn empty(zoom: u8) -> Self {
        let (lon, lat) = AKITA.centroid();
        Self {
            center: [lat, lon],
            zoom,
            tile_layer: None,
            legend: None,
        }
    }
}

/// Everything the dashboard page shows for one render cycle.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardView {
    pub sidebar: Sidebar,
    pub map: MapView,
}

impl DashboardView {
    pub fn new(render: &SessionRender, attribution: &str, zoom: u8) -> Self {
        Self {
            sidebar: Sidebar::from_render(render),
            map: MapView::for_render(render, attribution, zoom),
        }
    }
}
