//! Visualization parameters: display bands, stretch range and color ramp.

use serde::{Deserialize, Serialize};

use super::band::BandMode;

/// NDVI display range.
pub const NDVI_RANGE: (f64, f64) = (0.1, 0.7);
/// NDVI color ramp, low to high.
pub const NDVI_PALETTE: [&str; 3] = ["white", "yellow", "green"];
/// Reflectance display range for raw bands.
pub const REFLECTANCE_RANGE: (f64, f64) = (0.0, 3000.0);
/// Single-band grayscale ramp.
pub const GRAYSCALE_PALETTE: [&str; 2] = ["black", "white"];

/// How a composite is stretched and colored for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisParams {
    pub bands: Vec<String>,
    pub min: f64,
    pub max: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub palette: Option<Vec<String>>,
}

impl VisParams {
    /// Fixed visualization for each band mode.
    pub fn for_mode(mode: BandMode) -> Self {
        let bands = mode.output_bands().iter().map(|b| b.to_string()).collect();
        match mode {
            BandMode::Ndvi => Self {
                bands,
                min: NDVI_RANGE.0,
                max: NDVI_RANGE.1,
                palette: Some(NDVI_PALETTE.iter().map(|c| c.to_string()).collect()),
            },
            BandMode::Rgb => Self {
                bands,
                min: REFLECTANCE_RANGE.0,
                max: REFLECTANCE_RANGE.1,
                palette: None,
            },
            BandMode::Red | BandMode::Nir => Self {
                bands,
                min: REFLECTANCE_RANGE.0,
                max: REFLECTANCE_RANGE.1,
                palette: Some(GRAYSCALE_PALETTE.iter().map(|c| c.to_string()).collect()),
            },
        }
    }

    /// Linear stretch of `value` to `[0, 1]`, clamped at the range ends.
    pub fn normalize(&self, value: f64) -> f64 {
        let span = self.max - self.min;
        if span <= 0.0 {
            return if value >= self.max { 1.0 } else { 0.0 };
        }
        ((value - self.min) / span).clamp(0.0, 1.0)
    }

    /// Palette parsed into a ramp, if the visualization has one.
    pub fn ramp(&self) -> Result<Option<ColorRamp>, String> {
        self.palette
            .as_ref()
            .map(|colors| ColorRamp::parse(colors))
            .transpose()
    }
}

/// RGB color triple.
pub type Rgb8 = [u8; 3];

/// Parse a CSS color name (the subset used by palettes) or `#rrggbb` / `rrggbb`.
pub fn parse_color(name: &str) -> Option<Rgb8> {
    let name = name.trim();
    let named = match name.to_lowercase().as_str() {
        "white" => Some([255, 255, 255]),
        "black" => Some([0, 0, 0]),
        "yellow" => Some([255, 255, 0]),
        "green" => Some([0, 128, 0]),
        "red" => Some([255, 0, 0]),
        "blue" => Some([0, 0, 255]),
        "gray" | "grey" => Some([128, 128, 128]),
        _ => None,
    };
    if named.is_some() {
        return named;
    }

    let hex = name.strip_prefix('#').unwrap_or(name);
    if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    Some([channel(0)?, channel(2)?, channel(4)?])
}

/// Evenly spaced color stops, interpolated linearly.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorRamp {
    stops: Vec<Rgb8>,
}

impl ColorRamp {
    pub fn parse<S: AsRef<str>>(colors: &[S]) -> Result<Self, String> {
        let stops = colors
            .iter()
            .map(|c| parse_color(c.as_ref()).ok_or_else(|| format!("unknown color '{}'", c.as_ref())))
            .collect::<Result<Vec<_>, _>>()?;
        if stops.is_empty() {
            return Err("palette has no colors".to_string());
        }
        Ok(Self { stops })
    }

    /// Color at position `t` in `[0, 1]`; values outside are clamped.
    pub fn sample(&self, t: f64) -> Rgb8 {
        if self.stops.len() == 1 {
            return self.stops[0];
        }
        let t = t.clamp(0.0, 1.0);
        let scaled = t * (self.stops.len() - 1) as f64;
        let lower = (scaled.floor() as usize).min(self.stops.len() - 2);
        let frac = scaled - lower as f64;
        let (a, b) = (self.stops[lower], self.stops[lower + 1]);
        let mix = |i: usize| (a[i] as f64 + (b[i] as f64 - a[i] as f64) * frac).round() as u8;
        [mix(0), mix(1), mix(2)]
    }
}
