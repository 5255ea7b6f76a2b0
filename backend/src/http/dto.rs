//! Data Transfer Objects for the HTTP API.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::imagery::{RenderOutcome, SessionRender};
use crate::models::{BandMode, ParamError, SessionParams, TimeWindow, VisParams};
use crate::presenter::{layer_name, legend_for, Diagnostic, Legend, NO_DATA_WARNING};

/// Query parameters of the dashboard and composite endpoints.
///
/// All optional; missing or blank values fall back to the defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DashboardQuery {
    /// Reference date, `YYYY-MM-DD`
    pub date: Option<String>,
    /// Cloud threshold in percent, `0..=100`
    pub cloud: Option<String>,
    /// `ndvi`, `rgb`, `red` or `nir`
    pub band: Option<String>,
}

impl DashboardQuery {
    /// Validate into session parameters.
    pub fn to_params(&self) -> Result<SessionParams, ParamError> {
        let cloud = match self.cloud.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(
                raw.parse::<i64>()
                    .map_err(|_| ParamError::InvalidCloudThreshold(raw.to_string()))?,
            ),
        };
        SessionParams::from_raw(self.date.as_deref(), cloud, self.band.as_deref())
    }
}

/// Display result of a render cycle.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CompositeOutcome {
    Ready {
        tile_url: String,
        vis: VisParams,
        #[serde(skip_serializing_if = "Option::is_none")]
        legend: Option<Legend>,
        layer_name: String,
    },
    NoData {
        warning: String,
    },
}

/// Response of `GET /v1/composite`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompositeResponse {
    pub reference_date: NaiveDate,
    pub window: TimeWindow,
    pub cloud_threshold: u8,
    pub band: BandMode,
    pub image_count: usize,
    /// Newest first
    pub images: Vec<Diagnostic>,
    pub outcome: CompositeOutcome,
}

impl From<&SessionRender> for CompositeResponse {
    fn from(render: &SessionRender) -> Self {
        let params = &render.params;
        let outcome = match &render.outcome {
            RenderOutcome::Ready { vis, tile } => CompositeOutcome::Ready {
                tile_url: tile.url_template.clone(),
                vis: vis.clone(),
                legend: legend_for(params.band_mode),
                layer_name: layer_name(params.band_mode, params.reference_date),
            },
            RenderOutcome::NoData => CompositeOutcome::NoData {
                warning: NO_DATA_WARNING.to_string(),
            },
        };
        Self {
            reference_date: params.reference_date,
            window: render.window,
            cloud_threshold: params.cloud_threshold.percent(),
            band: params.band_mode,
            image_count: render.image_count(),
            images: render.images.iter().map(Diagnostic::from).collect(),
            outcome,
        }
    }
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub imagery: String,
}
