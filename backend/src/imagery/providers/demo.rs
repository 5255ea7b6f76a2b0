//! Synthetic Sentinel-2-like scenes over the deployment region.
//!
//! Deterministic: the same scene ids, timestamps, cloud estimates and
//! pixels are produced on every call.

use chrono::{Duration, NaiveDate, TimeZone, Utc};

use super::local::LocalScene;
use crate::models::{ImageRecord, Region, AKITA, BLUE_BAND, GREEN_BAND, NIR_BAND, RED_BAND};
use crate::raster::{BandStack, GeoGrid, RasterResult};

/// Pixels per scene edge.
const SCENE_SIZE: usize = 128;
/// Days between passes over the same swath.
const REVISIT_DAYS: i64 = 5;
/// First and last acquisition day of the demo season.
const SEASON: ((i32, u32, u32), (i32, u32, u32)) = ((2025, 4, 1), (2025, 10, 31));

/// Two overlapping swaths splitting the region west/east.
fn swaths() -> [(&'static str, Region); 2] {
    let (mid_lon, _) = AKITA.centroid();
    [
        ("T54SUJ", Region::new(AKITA.west, AKITA.south, mid_lon + 0.3, AKITA.north)),
        ("T54SVJ", Region::new(mid_lon - 0.3, AKITA.south, AKITA.east, AKITA.north)),
    ]
}

/// Scene-level cloud estimate in `[0, 100)`, scattered across passes.
fn cloud_percent(pass: i64, swath: usize) -> f64 {
    let mixed = (pass * 37 + swath as i64 * 53 + 11).rem_euclid(100);
    mixed as f64 + 0.25
}

/// Vegetation vigor in `[0, 1]` at a location and day of year.
fn vigor(lon: f64, lat: f64, day_of_year: f64) -> f64 {
    let spatial = 0.5 + 0.25 * (lon * 3.1).sin() * (lat * 4.3).cos() + 0.2 * (lat * 1.7 + lon).sin();
    let season = (std::f64::consts::PI * (day_of_year - 90.0) / 200.0).sin().max(0.0);
    (spatial * (0.4 + 0.6 * season)).clamp(0.0, 1.0)
}

fn scene(
    id: &str,
    footprint: Region,
    acquired: NaiveDate,
    cloud: f64,
    seed: f64,
) -> RasterResult<LocalScene> {
    let grid = GeoGrid::new(footprint, SCENE_SIZE, SCENE_SIZE);
    let doy = f64::from(chrono::Datelike::ordinal(&acquired));
    let cloud_fraction = cloud / 100.0;

    let mut nir = grid.empty_band();
    let mut red = grid.empty_band();
    let mut green = grid.empty_band();
    let mut blue = grid.empty_band();
    for row in 0..SCENE_SIZE {
        for col in 0..SCENE_SIZE {
            let (lon, lat) = grid.pixel_center(row, col);
            let cloudiness = ((lon * 6.0 + seed).sin() * (lat * 5.0 - seed).cos() + 1.0) / 2.0;
            if cloudiness < cloud_fraction {
                continue;
            }
            let v = vigor(lon, lat, doy);
            nir[[row, col]] = (1200.0 + 2600.0 * v) as f32;
            red[[row, col]] = (1400.0 - 1100.0 * v) as f32;
            green[[row, col]] = (900.0 - 300.0 * v) as f32;
            blue[[row, col]] = (700.0 - 350.0 * v) as f32;
        }
    }

    let bands = BandStack::new(grid)
        .with_band(NIR_BAND, nir)?
        .with_band(RED_BAND, red)?
        .with_band(GREEN_BAND, green)?
        .with_band(BLUE_BAND, blue)?;

    let acquired_at = Utc
        .from_utc_datetime(&acquired.and_hms_opt(1, 45, 0).unwrap_or_default());
    Ok(LocalScene::new(
        ImageRecord {
            id: id.to_string(),
            acquired_at,
            cloud_percent: Some(cloud),
            footprint: Some(footprint),
        },
        bands,
    ))
}

/// All demo scenes, in acquisition order.
pub fn demo_scenes() -> RasterResult<Vec<LocalScene>> {
    let ((y0, m0, d0), (y1, m1, d1)) = SEASON;
    let (Some(first), Some(last)) = (
        NaiveDate::from_ymd_opt(y0, m0, d0),
        NaiveDate::from_ymd_opt(y1, m1, d1),
    ) else {
        return Ok(Vec::new());
    };

    let mut scenes = Vec::new();
    let mut pass = 0i64;
    let mut day = first;
    while day <= last {
        for (swath_index, (tile, footprint)) in swaths().into_iter().enumerate() {
            // Neighbouring swaths are imaged a day apart.
            let acquired = day + Duration::days(swath_index as i64);
            let id = format!("{}T014549_{}", acquired.format("%Y%m%d"), tile);
            let cloud = cloud_percent(pass, swath_index);
            scenes.push(scene(&id, footprint, acquired, cloud, pass as f64 * 0.7)?);
        }
        pass += 1;
        day += Duration::days(REVISIT_DAYS);
    }
    Ok(scenes)
}
