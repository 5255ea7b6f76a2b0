//! Static explanation panel content.

use crate::models::{NIR_BAND, RED_BAND};

/// NDVI definition in LaTeX, typeset client-side.
pub const NDVI_FORMULA_LATEX: &str = r"NDVI = \frac{NIR - Red}{NIR + Red}";

/// Collapsible panel describing NDVI, the data source and troubleshooting.
///
/// The formula is emitted inside a `data-latex` element for the page's
/// math renderer.
pub fn explanation_html() -> String {
    format!(
        r#"<details class="explanation">
  <summary>About NDVI</summary>
  <h3>What is NDVI?</h3>
  <p>The Normalized Difference Vegetation Index measures the density and health of vegetation from satellite observations of reflected light.</p>
  <ul>
    <li>Values range from <b>-1.0</b> to <b>+1.0</b></li>
    <li>High values (0.6 to 0.8): dense vegetation such as forest</li>
    <li>Medium values (0.2 to 0.5): grassland and cropland</li>
    <li>Low values (0.1 and below): bare soil, urban areas, water</li>
  </ul>
  <h3>Data source and processing</h3>
  <p>Sentinel-2 surface reflectance scenes (S2_SR_HARMONIZED) with low cloud cover are selected for the chosen period. NDVI is computed for each scene and the results are mosaicked into a single image, with the most recent scene on top.</p>
  <h3>Formula</h3>
  <div class="formula" data-latex="{latex}">{latex}</div>
  <ul>
    <li><b>NIR</b> (near infrared): Sentinel-2 band 8 ({nir})</li>
    <li><b>Red</b>: Sentinel-2 band 4 ({red})</li>
  </ul>
  <h3>If no NDVI image is shown</h3>
  <ul>
    <li>No scenes were acquired in the selected period</li>
    <li>Clouds left no usable scene</li>
    <li>The imagery service hit a usage limit or failed</li>
  </ul>
  <p>Try a different reference date or a higher cloud threshold.</p>
</details>"#,
        latex = super::escape_html(NDVI_FORMULA_LATEX),
        nir = NIR_BAND,
        red = RED_BAND,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explanation_mentions_formula_and_bands() {
        let html = explanation_html();
        assert!(html.contains(r"\frac{NIR - Red}{NIR + Red}"));
        assert!(html.contains("band 8 (B8)"));
        assert!(html.contains("band 4 (B4)"));
        assert!(html.starts_with("<details"));
    }
}
