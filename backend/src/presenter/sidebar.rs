//! Sidebar text: resolved period, image count and per-image diagnostics.

use chrono::NaiveDate;
use serde::Serialize;

use crate::imagery::SessionRender;
use crate::models::ImageSummary;

/// Shown instead of a map layer when no image passed the filters.
pub const NO_DATA_WARNING: &str = "No images with low cloud cover were found for this period.";

/// Date and cloud cover of one contributing image.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostic {
    pub id: String,
    pub date: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cloud_percent: Option<f64>,
}

impl From<&ImageSummary> for Diagnostic {
    fn from(summary: &ImageSummary) -> Self {
        Self {
            id: summary.id.clone(),
            date: summary.date,
            cloud_percent: summary.cloud_percent,
        }
    }
}

impl Diagnostic {
    /// `2025-07-01 (cloud 12.5%)`, or just the date without an estimate.
    pub fn line(&self) -> String {
        match self.cloud_percent {
            Some(cloud) => format!("{} (cloud {:.1}%)", self.date, cloud),
            None => self.date.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Sidebar {
    pub period: String,
    pub image_count: usize,
    /// Newest first, matching mosaic priority
    pub diagnostics: Vec<Diagnostic>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

impl Sidebar {
    pub fn from_render(render: &SessionRender) -> Self {
        Self {
            period: render.window.to_string(),
            image_count: render.image_count(),
            diagnostics: render.images.iter().map(Diagnostic::from).collect(),
            warning: render.is_no_data().then(|| NO_DATA_WARNING.to_string()),
        }
    }

    pub fn period_line(&self) -> String {
        format!("Period: {}", self.period)
    }

    pub fn count_line(&self) -> String {
        format!("Images: {}", self.image_count)
    }
}
