//! Composite plans: which images, in which order, through which band math.

use serde::{Deserialize, Serialize};

use super::band::{BandMode, NDVI_BAND, NIR_BAND, RED_BAND};
use super::image::{ImageQuery, ImageSet};

/// Per-image pixel transform applied before mosaicking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum BandExpression {
    /// `(nir - red) / (nir + red)`, written to `output`.
    NormalizedDifference {
        nir: String,
        red: String,
        output: String,
    },
    /// Raw reflectance bands, in display order.
    Select { bands: Vec<String> },
}

impl BandExpression {
    pub fn for_mode(mode: BandMode) -> Self {
        match mode {
            BandMode::Ndvi => BandExpression::NormalizedDifference {
                nir: NIR_BAND.to_string(),
                red: RED_BAND.to_string(),
                output: NDVI_BAND.to_string(),
            },
            other => BandExpression::Select {
                bands: other.source_bands().iter().map(|b| b.to_string()).collect(),
            },
        }
    }

    /// Bands the expression produces.
    pub fn output_bands(&self) -> Vec<String> {
        match self {
            BandExpression::NormalizedDifference { output, .. } => vec![output.clone()],
            BandExpression::Select { bands } => bands.clone(),
        }
    }
}

/// A recency mosaic of an image set, clipped to the query region.
///
/// `sources` is in priority order: where images overlap, the first one
/// with a valid pixel wins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Composite {
    pub query: ImageQuery,
    pub mode: BandMode,
    pub sources: Vec<String>,
    pub expression: BandExpression,
}

impl Composite {
    /// Plan the composite of `set` for `mode`.
    ///
    /// Returns `None` for an empty set; there is nothing to mosaic.
    pub fn plan(set: &ImageSet, mode: BandMode) -> Option<Self> {
        if set.is_empty() {
            return None;
        }
        Some(Self {
            query: set.query,
            mode,
            sources: set.ids(),
            expression: BandExpression::for_mode(mode),
        })
    }
}
