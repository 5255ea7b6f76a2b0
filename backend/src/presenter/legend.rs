//! Map legend for the NDVI color ramp.

use serde::Serialize;

use super::page::escape_html;
use crate::models::{BandMode, NDVI_PALETTE};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LegendEntry {
    pub color: String,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Legend {
    pub title: String,
    pub entries: Vec<LegendEntry>,
}

/// Legend for `mode`, if it has one. Only NDVI does.
pub fn legend_for(mode: BandMode) -> Option<Legend> {
    if !mode.has_legend() {
        return None;
    }
    let labels = [
        "≤ 0.1: no or very sparse vegetation",
        "~ 0.4: moderate vegetation",
        "~ 0.7: dense vegetation",
    ];
    Some(Legend {
        title: "NDVI legend".to_string(),
        entries: NDVI_PALETTE
            .iter()
            .zip(labels)
            .map(|(color, label)| LegendEntry {
                color: color.to_string(),
                label: label.to_string(),
            })
            .collect(),
    })
}

impl Legend {
    /// Fixed-position overlay box for the top-right map corner.
    pub fn to_html(&self) -> String {
        let rows: String = self
            .entries
            .iter()
            .map(|entry| {
                format!(
                    r#"<div class="legend-row"><i style="background:{}"></i>{}</div>"#,
                    escape_html(&entry.color),
                    escape_html(&entry.label)
                )
            })
            .collect();
        format!(
            r#"<div class="legend"><b>{}</b>{}</div>"#,
            escape_html(&self.title),
            rows
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ndvi_legend() {
        let legend = legend_for(BandMode::Ndvi).unwrap();
        let colors: Vec<&str> = legend.entries.iter().map(|e| e.color.as_str()).collect();
        assert_eq!(colors, vec!["white", "yellow", "green"]);
        assert!(legend.entries[0].label.starts_with("≤ 0.1"));
        assert!(legend.entries[2].label.contains("dense"));
    }

    #[test]
    fn test_other_modes_have_no_legend() {
        assert!(legend_for(BandMode::Rgb).is_none());
        assert!(legend_for(BandMode::Red).is_none());
        assert!(legend_for(BandMode::Nir).is_none());
    }

    #[test]
    fn test_legend_html() {
        let html = legend_for(BandMode::Ndvi).unwrap().to_html();
        assert!(html.contains("background:yellow"));
        assert!(html.contains("~ 0.4: moderate vegetation"));
        assert!(html.starts_with(r#"<div class="legend"><b>NDVI legend</b>"#));
    }
}
