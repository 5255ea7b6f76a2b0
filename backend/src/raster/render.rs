//! Coloring composite pixels and encoding PNG tiles.

use image::{ImageBuffer, ImageFormat, Rgba, RgbaImage};
use ndarray::Array2;
use std::io::Cursor;

use super::grid::GeoGrid;
use super::tiles::{tile_pixel_lonlat, tiles_per_axis, TILE_SIZE};
use super::{RasterError, RasterResult};
use crate::models::{ColorRamp, VisParams};

const TRANSPARENT: Rgba<u8> = Rgba([0, 0, 0, 0]);

/// Composite pixels on a grid, one array per display band.
#[derive(Debug, Clone)]
pub struct CompositePixels {
    pub grid: GeoGrid,
    pub bands: Vec<(String, Array2<f32>)>,
}

impl CompositePixels {
    /// Values of all bands at `(lon, lat)`, or `None` outside the grid.
    pub fn values_at(&self, lon: f64, lat: f64) -> Option<Vec<f32>> {
        let (row, col) = self.grid.locate(lon, lat)?;
        Some(self.bands.iter().map(|(_, data)| data[[row, col]]).collect())
    }

    /// Count of pixels where every band is valid.
    pub fn valid_pixels(&self) -> usize {
        let (h, w) = self.grid.shape();
        (0..h)
            .flat_map(|r| (0..w).map(move |c| (r, c)))
            .filter(|&(r, c)| self.bands.iter().all(|(_, d)| !d[[r, c]].is_nan()))
            .count()
    }
}

/// Resolved visualization: stretch plus optional ramp.
#[derive(Debug, Clone)]
pub struct Colorizer {
    vis: VisParams,
    ramp: Option<ColorRamp>,
}

impl Colorizer {
    pub fn new(vis: &VisParams) -> RasterResult<Self> {
        let ramp = vis.ramp().map_err(RasterError::Palette)?;
        if ramp.is_none() && vis.bands.len() != 3 {
            return Err(RasterError::Palette(format!(
                "a visualization without palette needs 3 bands, got {}",
                vis.bands.len()
            )));
        }
        Ok(Self {
            vis: vis.clone(),
            ramp,
        })
    }

    /// Color for one pixel's band values; masked pixels are transparent.
    pub fn color(&self, values: &[f32]) -> Rgba<u8> {
        if values.is_empty() || values.iter().any(|v| v.is_nan()) {
            return TRANSPARENT;
        }
        match &self.ramp {
            Some(ramp) => {
                let [r, g, b] = ramp.sample(self.vis.normalize(values[0] as f64));
                Rgba([r, g, b, 255])
            }
            None => {
                let channel = |v: f32| (self.vis.normalize(v as f64) * 255.0).round() as u8;
                Rgba([channel(values[0]), channel(values[1]), channel(values[2]), 255])
            }
        }
    }
}

/// Render the XYZ tile `(z, x, y)` of `pixels`.
pub fn render_tile(
    pixels: &CompositePixels,
    colorizer: &Colorizer,
    z: u8,
    x: u32,
    y: u32,
) -> RasterResult<RgbaImage> {
    match tiles_per_axis(z) {
        Some(n) if x < n && y < n => {}
        _ => return Err(RasterError::InvalidTile { z, x, y }),
    }
    Ok(ImageBuffer::from_fn(TILE_SIZE, TILE_SIZE, |px, py| {
        let (lon, lat) = tile_pixel_lonlat(z, x, y, px, py);
        pixels
            .values_at(lon, lat)
            .map_or(TRANSPARENT, |values| colorizer.color(&values))
    }))
}

pub fn encode_png(image: &RgbaImage) -> RasterResult<Vec<u8>> {
    let mut bytes = Cursor::new(Vec::new());
    image
        .write_to(&mut bytes, ImageFormat::Png)
        .map_err(|e| RasterError::Encode(e.to_string()))?;
    Ok(bytes.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BandMode, Region};
    use ndarray::array;

    #[test]
    fn test_ndvi_colors_clip_at_ramp_ends() {
        let colorizer = Colorizer::new(&VisParams::for_mode(BandMode::Ndvi)).unwrap();
        assert_eq!(colorizer.color(&[-0.8]), Rgba([255, 255, 255, 255]));
        assert_eq!(colorizer.color(&[0.1]), Rgba([255, 255, 255, 255]));
        assert_eq!(colorizer.color(&[0.4]), Rgba([255, 255, 0, 255]));
        assert_eq!(colorizer.color(&[0.95]), Rgba([0, 128, 0, 255]));
        assert_eq!(colorizer.color(&[f32::NAN]), TRANSPARENT);
    }

    #[test]
    fn test_rgb_stretch() {
        let colorizer = Colorizer::new(&VisParams::for_mode(BandMode::Rgb)).unwrap();
        assert_eq!(colorizer.color(&[3000.0, 1500.0, 0.0]), Rgba([255, 128, 0, 255]));
        assert_eq!(colorizer.color(&[9000.0, -10.0, 3000.0]), Rgba([255, 0, 255, 255]));
    }

    #[test]
    fn test_grayscale() {
        let colorizer = Colorizer::new(&VisParams::for_mode(BandMode::Nir)).unwrap();
        assert_eq!(colorizer.color(&[0.0]), Rgba([0, 0, 0, 255]));
        assert_eq!(colorizer.color(&[3000.0]), Rgba([255, 255, 255, 255]));
    }

    #[test]
    fn test_rgb_without_three_bands_is_rejected() {
        let mut vis = VisParams::for_mode(BandMode::Rgb);
        vis.bands.pop();
        assert!(Colorizer::new(&vis).is_err());
    }

    #[test]
    fn test_render_world_tile_and_encode() {
        let pixels = CompositePixels {
            grid: GeoGrid::new(Region::new(-180.0, -85.0, 180.0, 85.0), 2, 1),
            bands: vec![("NDVI".to_string(), array![[0.7, f32::NAN]])],
        };
        let colorizer = Colorizer::new(&VisParams::for_mode(BandMode::Ndvi)).unwrap();
        let tile = render_tile(&pixels, &colorizer, 0, 0, 0).unwrap();
        assert_eq!(tile.dimensions(), (TILE_SIZE, TILE_SIZE));
        assert_eq!(*tile.get_pixel(10, 128), Rgba([0, 128, 0, 255]));
        assert_eq!(*tile.get_pixel(240, 128), TRANSPARENT);

        let png = encode_png(&tile).unwrap();
        assert_eq!(&png[1..4], b"PNG");
    }

    #[test]
    fn test_invalid_tile_address() {
        let pixels = CompositePixels {
            grid: GeoGrid::new(Region::new(0.0, 0.0, 1.0, 1.0), 1, 1),
            bands: vec![("B4".to_string(), array![[1.0]])],
        };
        let colorizer = Colorizer::new(&VisParams::for_mode(BandMode::Red)).unwrap();
        assert!(matches!(
            render_tile(&pixels, &colorizer, 2, 4, 0),
            Err(RasterError::InvalidTile { .. })
        ));
        for z in [31, 64, 255] {
            assert!(matches!(
                render_tile(&pixels, &colorizer, z, 0, 0),
                Err(RasterError::InvalidTile { .. })
            ));
        }
    }

    #[test]
    fn test_valid_pixels() {
        let pixels = CompositePixels {
            grid: GeoGrid::new(Region::new(0.0, 0.0, 2.0, 1.0), 2, 1),
            bands: vec![("B4".to_string(), array![[1.0, f32::NAN]])],
        };
        assert_eq!(pixels.valid_pixels(), 1);
        assert_eq!(pixels.values_at(0.5, 0.5), Some(vec![1.0]));
        assert_eq!(pixels.values_at(5.0, 0.5), None);
    }
}
