//! Web Mercator XYZ tile addressing.

use std::f64::consts::PI;

/// Edge length of a map tile in pixels.
pub const TILE_SIZE: u32 = 256;

/// Deepest zoom level tiles are served for.
pub const MAX_ZOOM: u8 = 30;

/// Number of tiles along each axis at zoom `z`, or `None` beyond [`MAX_ZOOM`].
pub fn tiles_per_axis(z: u8) -> Option<u32> {
    (z <= MAX_ZOOM).then(|| 1u32 << z)
}

fn scale(z: u8) -> f64 {
    2f64.powi(i32::from(z))
}

/// Longitude/latitude of the center of pixel `(px, py)` within tile `(z, x, y)`.
pub fn tile_pixel_lonlat(z: u8, x: u32, y: u32, px: u32, py: u32) -> (f64, f64) {
    let world = f64::from(TILE_SIZE) * scale(z);
    let gx = f64::from(x) * f64::from(TILE_SIZE) + f64::from(px) + 0.5;
    let gy = f64::from(y) * f64::from(TILE_SIZE) + f64::from(py) + 0.5;
    let lon = gx / world * 360.0 - 180.0;
    let lat = (PI * (1.0 - 2.0 * gy / world)).sinh().atan().to_degrees();
    (lon, lat)
}

/// Tile at zoom `z` containing `(lon, lat)`.
pub fn lonlat_to_tile(z: u8, lon: f64, lat: f64) -> (u32, u32) {
    let n = scale(z);
    let x = ((lon + 180.0) / 360.0 * n).floor();
    let lat_rad = lat.to_radians();
    let y = ((1.0 - (lat_rad.tan() + 1.0 / lat_rad.cos()).ln() / PI) / 2.0 * n).floor();
    let max = n - 1.0;
    (x.clamp(0.0, max) as u32, y.clamp(0.0, max) as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tiles_per_axis_bounds() {
        assert_eq!(tiles_per_axis(0), Some(1));
        assert_eq!(tiles_per_axis(12), Some(4096));
        assert_eq!(tiles_per_axis(MAX_ZOOM), Some(1 << 30));
        assert_eq!(tiles_per_axis(31), None);
        assert_eq!(tiles_per_axis(255), None);
    }

    #[test]
    fn test_deep_zoom_math_is_finite() {
        let (lon, lat) = tile_pixel_lonlat(200, 0, 0, 0, 0);
        assert!(lon.is_finite() && lat.is_finite());
        let (x, y) = lonlat_to_tile(64, 140.0, 40.0);
        assert!(x > 0 && y > 0);
    }

    #[test]
    fn test_world_tile_center() {
        let (lon, lat) = tile_pixel_lonlat(0, 0, 0, 128, 128);
        assert!(lon.abs() < 1.0);
        assert!(lat.abs() < 1.0);
    }

    #[test]
    fn test_round_trip_akita_center() {
        let (x, y) = lonlat_to_tile(12, 139.99, 40.01);
        let (lon, lat) = tile_pixel_lonlat(12, x, y, 128, 128);
        assert!((lon - 139.99).abs() < 0.1);
        assert!((lat - 40.01).abs() < 0.1);
    }

    #[test]
    fn test_northern_tiles_have_smaller_y() {
        let (_, north) = lonlat_to_tile(8, 140.0, 41.0);
        let (_, south) = lonlat_to_tile(8, 140.0, 39.0);
        assert!(north < south);
    }
}
