//! In-process raster operations used by the local imagery service.
//!
//! The remote service performs all of this server-side; these functions
//! reproduce the same compositing rules so the dashboard can run (and be
//! tested) without it.

pub mod grid;
pub mod mosaic;
pub mod ndvi;
pub mod render;
pub mod tiles;

pub use grid::{BandStack, GeoGrid};
pub use mosaic::{mosaic, resample};
pub use ndvi::{ndvi, normalized_difference};
pub use render::{encode_png, render_tile, Colorizer, CompositePixels};
pub use tiles::{lonlat_to_tile, tile_pixel_lonlat, tiles_per_axis, MAX_ZOOM, TILE_SIZE};

/// Result type for raster operations.
pub type RasterResult<T> = Result<T, RasterError>;

#[derive(Debug, thiserror::Error)]
pub enum RasterError {
    #[error("band '{0}' not present")]
    MissingBand(String),

    #[error("band '{band}' has shape {actual:?}, grid expects {expected:?}")]
    ShapeMismatch {
        band: String,
        expected: (usize, usize),
        actual: (usize, usize),
    },

    #[error("invalid palette: {0}")]
    Palette(String),

    #[error("tile {z}/{x}/{y} is outside the tile pyramid")]
    InvalidTile { z: u8, x: u32, y: u32 },

    #[error("PNG encoding failed: {0}")]
    Encode(String),
}
