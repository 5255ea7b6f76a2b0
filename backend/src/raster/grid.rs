//! Georeferenced pixel grids.

use ndarray::Array2;
use std::collections::BTreeMap;

use super::{RasterError, RasterResult};
use crate::models::Region;

/// Regular lon/lat grid laid over a region, row 0 at the north edge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoGrid {
    pub region: Region,
    pub width: usize,
    pub height: usize,
}

impl GeoGrid {
    pub fn new(region: Region, width: usize, height: usize) -> Self {
        Self {
            region,
            width,
            height,
        }
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.height, self.width)
    }

    pub fn pixel_width(&self) -> f64 {
        self.region.width() / self.width as f64
    }

    pub fn pixel_height(&self) -> f64 {
        self.region.height() / self.height as f64
    }

    /// Center of pixel `(row, col)` as `(lon, lat)`.
    pub fn pixel_center(&self, row: usize, col: usize) -> (f64, f64) {
        let lon = self.region.west + (col as f64 + 0.5) * self.pixel_width();
        let lat = self.region.north - (row as f64 + 0.5) * self.pixel_height();
        (lon, lat)
    }

    /// Pixel containing `(lon, lat)`, if it falls inside the grid.
    pub fn locate(&self, lon: f64, lat: f64) -> Option<(usize, usize)> {
        if !self.region.contains(lon, lat) || self.width == 0 || self.height == 0 {
            return None;
        }
        let col = ((lon - self.region.west) / self.pixel_width()).floor() as usize;
        let row = ((self.region.north - lat) / self.pixel_height()).floor() as usize;
        Some((row.min(self.height - 1), col.min(self.width - 1)))
    }

    /// New empty band on this grid; every pixel starts masked.
    pub fn empty_band(&self) -> Array2<f32> {
        Array2::from_elem(self.shape(), f32::NAN)
    }
}

/// Named bands sharing one grid. `NaN` marks a masked pixel.
#[derive(Debug, Clone)]
pub struct BandStack {
    pub grid: GeoGrid,
    bands: BTreeMap<String, Array2<f32>>,
}

impl BandStack {
    pub fn new(grid: GeoGrid) -> Self {
        Self {
            grid,
            bands: BTreeMap::new(),
        }
    }

    pub fn with_band(mut self, name: impl Into<String>, data: Array2<f32>) -> RasterResult<Self> {
        self.insert(name, data)?;
        Ok(self)
    }

    pub fn insert(&mut self, name: impl Into<String>, data: Array2<f32>) -> RasterResult<()> {
        let name = name.into();
        if data.dim() != self.grid.shape() {
            return Err(RasterError::ShapeMismatch {
                band: name,
                expected: self.grid.shape(),
                actual: data.dim(),
            });
        }
        self.bands.insert(name, data);
        Ok(())
    }

    pub fn band(&self, name: &str) -> RasterResult<&Array2<f32>> {
        self.bands
            .get(name)
            .ok_or_else(|| RasterError::MissingBand(name.to_string()))
    }

    pub fn band_names(&self) -> impl Iterator<Item = &str> {
        self.bands.keys().map(String::as_str)
    }

    /// Nearest-neighbour value of `band` at `(lon, lat)`; `NaN` outside the grid.
    pub fn sample(&self, band: &str, lon: f64, lat: f64) -> RasterResult<f32> {
        let data = self.band(band)?;
        Ok(self
            .grid
            .locate(lon, lat)
            .map_or(f32::NAN, |(row, col)| data[[row, col]]))
    }
}
