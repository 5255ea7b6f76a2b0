//! Source images and the filtered set a composite is built from.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use super::region::Region;
use super::session::CloudThreshold;
use super::window::TimeWindow;

/// Catalog entry for one satellite acquisition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageRecord {
    /// Service-side image identifier (e.g. the Sentinel-2 product index)
    pub id: String,
    /// Acquisition start time
    pub acquired_at: DateTime<Utc>,
    /// Scene-level cloud coverage in percent, when the catalog reports it
    pub cloud_percent: Option<f64>,
    /// Ground footprint, when the catalog reports it
    pub footprint: Option<Region>,
}

/// Filter parameters of a catalog query.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ImageQuery {
    pub region: Region,
    pub window: TimeWindow,
    pub cloud_max: CloudThreshold,
}

impl ImageQuery {
    pub fn new(region: Region, window: TimeWindow, cloud_max: CloudThreshold) -> Self {
        Self {
            region,
            window,
            cloud_max,
        }
    }

    /// Whether a catalog entry satisfies every filter of this query.
    ///
    /// Entries without a cloud estimate are excluded, as a less-than filter
    /// on a missing property never matches.
    pub fn matches(&self, image: &ImageRecord) -> bool {
        let in_region = image
            .footprint
            .map_or(true, |footprint| footprint.intersects(&self.region));
        let clear_enough = image
            .cloud_percent
            .is_some_and(|percent| self.cloud_max.admits(percent));
        in_region && clear_enough && self.window.contains(image.acquired_at)
    }
}

/// Newest-first ordering with the image id as tie-break.
pub fn recency_order(a: &ImageRecord, b: &ImageRecord) -> Ordering {
    b.acquired_at
        .cmp(&a.acquired_at)
        .then_with(|| a.id.cmp(&b.id))
}

/// Images selected by a query, ordered newest first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageSet {
    pub query: ImageQuery,
    images: Vec<ImageRecord>,
}

impl ImageSet {
    pub fn new(query: ImageQuery, mut images: Vec<ImageRecord>) -> Self {
        images.sort_by(recency_order);
        Self { query, images }
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    /// Images in compositing priority order (newest first).
    pub fn images(&self) -> &[ImageRecord] {
        &self.images
    }

    pub fn ids(&self) -> Vec<String> {
        self.images.iter().map(|image| image.id.clone()).collect()
    }

    /// Per-image diagnostics in the same order as [`ImageSet::images`].
    pub fn summaries(&self) -> Vec<ImageSummary> {
        self.images.iter().map(ImageSummary::from).collect()
    }
}

/// Date and cloud coverage of one selected image, for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageSummary {
    pub id: String,
    pub date: NaiveDate,
    pub acquired_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cloud_percent: Option<f64>,
}

impl From<&ImageRecord> for ImageSummary {
    fn from(image: &ImageRecord) -> Self {
        Self {
            id: image.id.clone(),
            date: image.acquired_at.date_naive(),
            acquired_at: image.acquired_at,
            cloud_percent: image.cloud_percent,
        }
    }
}
