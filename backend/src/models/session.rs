//! Per-request session parameters.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::band::BandMode;
use super::region::{Region, AKITA};
use super::window::TimeWindow;

/// Default reference date shown when the page is first opened.
pub const DEFAULT_REFERENCE_DATE: (i32, u32, u32) = (2025, 7, 3);

/// Default maximum tolerated cloud coverage, in percent.
pub const DEFAULT_CLOUD_THRESHOLD: u8 = 40;

/// Invalid user-supplied parameter.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParamError {
    #[error("cloud threshold must be between 0 and 100, got {0}")]
    CloudThresholdOutOfRange(i64),

    #[error("cloud threshold '{0}' is not a whole number")]
    InvalidCloudThreshold(String),

    #[error("unknown band mode '{0}' (expected ndvi, rgb, red or nir)")]
    UnknownBandMode(String),

    #[error("invalid reference date '{0}' (expected YYYY-MM-DD)")]
    InvalidDate(String),

    #[error("reference date '{0}' is too close to the calendar limits to form a window")]
    DateOutOfRange(String),
}

/// Percentage used as an exclusive upper bound on per-image cloud coverage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
pub struct CloudThreshold(u8);

impl CloudThreshold {
    pub fn new(percent: i64) -> Result<Self, ParamError> {
        if (0..=100).contains(&percent) {
            Ok(Self(percent as u8))
        } else {
            Err(ParamError::CloudThresholdOutOfRange(percent))
        }
    }

    pub fn percent(&self) -> u8 {
        self.0
    }

    /// Whether an image with this much cloud coverage passes the filter.
    pub fn admits(&self, cloud_percent: f64) -> bool {
        cloud_percent < f64::from(self.0)
    }
}

impl Default for CloudThreshold {
    fn default() -> Self {
        Self(DEFAULT_CLOUD_THRESHOLD)
    }
}

impl TryFrom<i64> for CloudThreshold {
    type Error = ParamError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<CloudThreshold> for u8 {
    fn from(value: CloudThreshold) -> Self {
        value.0
    }
}

impl std::fmt::Display for CloudThreshold {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}%", self.0)
    }
}

/// Everything a render cycle is computed from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SessionParams {
    pub reference_date: NaiveDate,
    pub cloud_threshold: CloudThreshold,
    pub band_mode: BandMode,
}

impl Default for SessionParams {
    fn default() -> Self {
        let (y, m, d) = DEFAULT_REFERENCE_DATE;
        Self {
            reference_date: NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default(),
            cloud_threshold: CloudThreshold::default(),
            band_mode: BandMode::default(),
        }
    }
}

impl SessionParams {
    /// Build parameters from raw form values, applying defaults for missing ones.
    pub fn from_raw(
        date: Option<&str>,
        cloud: Option<i64>,
        band: Option<&str>,
    ) -> Result<Self, ParamError> {
        let mut params = Self::default();
        if let Some(raw) = date.filter(|s| !s.trim().is_empty()) {
            let date = NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
                .map_err(|_| ParamError::InvalidDate(raw.to_string()))?;
            if TimeWindow::checked_ending_on(date).is_none() {
                return Err(ParamError::DateOutOfRange(raw.to_string()));
            }
            params.reference_date = date;
        }
        if let Some(percent) = cloud {
            params.cloud_threshold = CloudThreshold::new(percent)?;
        }
        if let Some(raw) = band.filter(|s| !s.trim().is_empty()) {
            params.band_mode = raw.parse()?;
        }
        Ok(params)
    }

    pub fn window(&self) -> TimeWindow {
        TimeWindow::ending_on(self.reference_date)
    }

    /// The fixed deployment region; never taken from user input.
    pub fn region(&self) -> Region {
        AKITA
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_threshold_bounds() {
        assert!(CloudThreshold::new(0).is_ok());
        assert!(CloudThreshold::new(100).is_ok());
        assert_eq!(
            CloudThreshold::new(101),
            Err(ParamError::CloudThresholdOutOfRange(101))
        );
        assert!(CloudThreshold::new(-1).is_err());
    }

    #[test]
    fn test_threshold_is_exclusive() {
        let t = CloudThreshold::new(40).unwrap();
        assert!(t.admits(39.999));
        assert!(!t.admits(40.0));
        assert!(!t.admits(75.0));

        let zero = CloudThreshold::new(0).unwrap();
        assert!(!zero.admits(0.0));
    }

    #[test]
    fn test_threshold_deserialize_rejects_out_of_range() {
        assert!(serde_json::from_str::<CloudThreshold>("140").is_err());
        let t: CloudThreshold = serde_json::from_str("25").unwrap();
        assert_eq!(t.percent(), 25);
    }

    #[test]
    fn test_defaults() {
        let params = SessionParams::default();
        assert_eq!(params.reference_date.to_string(), "2025-07-03");
        assert_eq!(params.cloud_threshold.percent(), 40);
        assert_eq!(params.band_mode, BandMode::Ndvi);
        assert_eq!(params.region(), AKITA);
    }

    #[test]
    fn test_from_raw() {
        let params = SessionParams::from_raw(Some("2024-02-29"), Some(15), Some("rgb")).unwrap();
        assert_eq!(params.reference_date.to_string(), "2024-02-29");
        assert_eq!(params.cloud_threshold.percent(), 15);
        assert_eq!(params.band_mode, BandMode::Rgb);

        let defaults = SessionParams::from_raw(Some(""), None, Some(" ")).unwrap();
        assert_eq!(defaults, SessionParams::default());
    }

    #[test]
    fn test_from_raw_errors() {
        assert!(matches!(
            SessionParams::from_raw(Some("2025-13-01"), None, None),
            Err(ParamError::InvalidDate(_))
        ));
        assert!(matches!(
            SessionParams::from_raw(None, Some(250), None),
            Err(ParamError::CloudThresholdOutOfRange(250))
        ));
        assert!(matches!(
            SessionParams::from_raw(None, None, Some("swir")),
            Err(ParamError::UnknownBandMode(_))
        ));
    }

    #[test]
    fn test_from_raw_rejects_dates_at_calendar_limits() {
        for raw in ["-262143-01-05", "+262142-12-31"] {
            assert_eq!(
                SessionParams::from_raw(Some(raw), None, None),
                Err(ParamError::DateOutOfRange(raw.to_string()))
            );
        }
        let far = SessionParams::from_raw(Some("9999-12-31"), None, None).unwrap();
        assert_eq!(far.window().width_days(), 20);
    }
}
