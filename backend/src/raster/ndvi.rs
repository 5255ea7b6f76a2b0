//! Normalized difference vegetation index.

use ndarray::{Array2, Zip};

/// NDVI of one pixel.
///
/// Negative reflectances (atmospheric-correction artifacts) are floored at
/// zero, which keeps the result inside `[-1, 1]`. A zero denominator or a
/// masked input yields a masked (`NaN`) pixel.
pub fn normalized_difference(nir: f32, red: f32) -> f32 {
    if nir.is_nan() || red.is_nan() {
        return f32::NAN;
    }
    let nir = nir.max(0.0);
    let red = red.max(0.0);
    let sum = nir + red;
    if sum <= 0.0 {
        return f32::NAN;
    }
    ((nir - red) / sum).clamp(-1.0, 1.0)
}

/// Per-pixel NDVI of two equally shaped bands.
pub fn ndvi(nir: &Array2<f32>, red: &Array2<f32>) -> Array2<f32> {
    let mut out = Array2::from_elem(nir.dim(), f32::NAN);
    Zip::from(&mut out)
        .and(nir)
        .and(red)
        .for_each(|o, &n, &r| *o = normalized_difference(n, r));
    out
}
