//! Band selection and the Sentinel-2 band names behind it.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::session::ParamError;

/// Sentinel-2 red reflectance band.
pub const RED_BAND: &str = "B4";
/// Sentinel-2 green reflectance band.
pub const GREEN_BAND: &str = "B3";
/// Sentinel-2 blue reflectance band.
pub const BLUE_BAND: &str = "B2";
/// Sentinel-2 near-infrared reflectance band.
pub const NIR_BAND: &str = "B8";
/// Name of the derived NDVI band.
pub const NDVI_BAND: &str = "NDVI";

/// What the composite shows and how it is colored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BandMode {
    #[default]
    Ndvi,
    Rgb,
    Red,
    Nir,
}

impl BandMode {
    pub const ALL: [BandMode; 4] = [BandMode::Ndvi, BandMode::Rgb, BandMode::Red, BandMode::Nir];

    /// Query-string / form value.
    pub fn as_str(&self) -> &'static str {
        match self {
            BandMode::Ndvi => "ndvi",
            BandMode::Rgb => "rgb",
            BandMode::Red => "red",
            BandMode::Nir => "nir",
        }
    }

    /// Short label used in layer names and selectors.
    pub fn label(&self) -> &'static str {
        match self {
            BandMode::Ndvi => "NDVI",
            BandMode::Rgb => "RGB",
            BandMode::Red => "Red",
            BandMode::Nir => "NIR",
        }
    }

    /// Reflectance bands read from each source image.
    pub fn source_bands(&self) -> &'static [&'static str] {
        match self {
            BandMode::Ndvi => &[NIR_BAND, RED_BAND],
            BandMode::Rgb => &[RED_BAND, GREEN_BAND, BLUE_BAND],
            BandMode::Red => &[RED_BAND],
            BandMode::Nir => &[NIR_BAND],
        }
    }

    /// Bands of the composite, in display order.
    pub fn output_bands(&self) -> &'static [&'static str] {
        match self {
            BandMode::Ndvi => &[NDVI_BAND],
            other => other.source_bands(),
        }
    }

    pub fn has_legend(&self) -> bool {
        matches!(self, BandMode::Ndvi)
    }
}

impl fmt::Display for BandMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for BandMode {
    type Err = ParamError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "ndvi" => Ok(Self::Ndvi),
            "rgb" => Ok(Self::Rgb),
            "red" | "b4" => Ok(Self::Red),
            "nir" | "b8" => Ok(Self::Nir),
            _ => Err(ParamError::UnknownBandMode(s.to_string())),
        }
    }
}
