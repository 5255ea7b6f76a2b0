//! Priority mosaicking and resampling onto a common grid.

use ndarray::{Array2, Zip};

use super::grid::{BandStack, GeoGrid};
use super::RasterResult;

/// Nearest-neighbour resample of one band of `stack` onto `target`.
///
/// Target pixels outside the stack's footprint come out masked.
pub fn resample(stack: &BandStack, band: &str, target: &GeoGrid) -> RasterResult<Array2<f32>> {
    let source = stack.band(band)?;
    let mut out = target.empty_band();
    for ((row, col), value) in out.indexed_iter_mut() {
        let (lon, lat) = target.pixel_center(row, col);
        if let Some((r, c)) = stack.grid.locate(lon, lat) {
            *value = source[[r, c]];
        }
    }
    Ok(out)
}

/// Mosaic `layers` given in priority order: each pixel takes the first
/// unmasked value, scanning from the highest-priority layer down.
pub fn mosaic<'a, I>(shape: (usize, usize), layers: I) -> Array2<f32>
where
    I: IntoIterator<Item = &'a Array2<f32>>,
{
    let mut out = Array2::from_elem(shape, f32::NAN);
    for layer in layers {
        Zip::from(&mut out).and(layer).for_each(|o, &v| {
            if o.is_nan() && !v.is_nan() {
                *o = v;
            }
        });
        if !out.iter().any(|v| v.is_nan()) {
            break;
        }
    }
    out
}
