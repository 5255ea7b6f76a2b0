//! Single-document HTML rendering of the dashboard.
//!
//! The map itself is drawn client-side with Leaflet from a JSON copy of the
//! [`MapView`](super::MapView); the NDVI formula is typeset with KaTeX.

use crate::models::{BandMode, SessionParams};

use super::{explanation_html, DashboardView, MapView, Sidebar};

const LEAFLET_CSS: &str = "https://cdnjs.cloudflare.com/ajax/libs/leaflet/1.9.4/leaflet.css";
const LEAFLET_JS: &str = "https://cdnjs.cloudflare.com/ajax/libs/leaflet/1.9.4/leaflet.js";
const KATEX_CSS: &str = "https://cdn.jsdelivr.net/npm/katex@0.16.11/dist/katex.min.css";
const KATEX_JS: &str = "https://cdn.jsdelivr.net/npm/katex@0.16.11/dist/katex.min.js";

const STYLE: &str = r#"
    body { margin: 0; font-family: sans-serif; display: flex; height: 100vh; }
    aside { width: 300px; padding: 16px; overflow-y: auto; border-right: 1px solid #dee2e6; }
    main { flex: 1; display: flex; flex-direction: column; padding: 0 16px; overflow-y: auto; }
    #map { height: 600px; min-height: 400px; position: relative; }
    label { display: block; margin-top: 12px; font-weight: 600; }
    .warning { background: #fff3cd; border: 1px solid #ffe69c; padding: 8px; border-radius: 4px; }
    .error { background: #f8d7da; border: 1px solid #f1aeb5; padding: 8px; border-radius: 4px; }
    .legend { position: absolute; top: 10px; right: 10px; z-index: 1000; background: white;
              padding: 10px; border: 2px solid grey; border-radius: 5px; font-size: 14px;
              line-height: 18px; box-shadow: 2px 2px 6px rgba(0,0,0,0.3); }
    .legend i { width: 12px; height: 12px; float: left; margin: 3px 5px 0 0; border: 1px solid #ccc; }
"#;

const MAP_SCRIPT: &str = r#"
(function () {
  var config = JSON.parse(document.getElementById('map-config').textContent);
  var map = L.map('map').setView(config.center, config.zoom);
  var base = L.tileLayer('https://tile.openstreetmap.org/{z}/{x}/{y}.png', {
    maxZoom: 19,
    attribution: '&copy; OpenStreetMap contributors'
  }).addTo(map);
  var overlays = {};
  if (config.tile_layer) {
    var layer = L.tileLayer(config.tile_layer.url, {
      attribution: config.tile_layer.attribution
    }).addTo(map);
    if (config.tile_layer.control) {
      overlays[config.tile_layer.name] = layer;
    }
  }
  L.control.layers({ 'OpenStreetMap': base }, overlays).addTo(map);
  document.querySelectorAll('[data-latex]').forEach(function (el) {
    katex.render(el.getAttribute('data-latex'), el, { displayMode: true, throwOnError: false });
  });
})();
"#;

/// Escape text for HTML element content and quoted attribute values.
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// JSON safe to embed inside a `<script>` element.
fn script_json(map: &MapView) -> serde_json::Result<String> {
    Ok(serde_json::to_string(map)?.replace("</", "<\\/"))
}

fn form_html(params: &SessionParams) -> String {
    let options: String = BandMode::ALL
        .iter()
        .map(|mode| {
            format!(
                r#"<option value="{}"{}>{}</option>"#,
                mode.as_str(),
                if *mode == params.band_mode { " selected" } else { "" },
                mode.label()
            )
        })
        .collect();
    format!(
        r#"<form method="get" action="/">
    <label for="date">Reference date (period ends on this day)</label>
    <input type="date" id="date" name="date" value="{date}">
    <label for="cloud">Maximum cloud cover: <output id="cloud-value">{cloud}</output>%</label>
    <input type="range" id="cloud" name="cloud" min="0" max="100" value="{cloud}"
           oninput="document.getElementById('cloud-value').value = this.value">
    <label for="band">Band</label>
    <select id="band" name="band">{options}</select>
    <p><button type="submit">Update</button></p>
  </form>"#,
        date = params.reference_date,
        cloud = params.cloud_threshold.percent(),
        options = options,
    )
}

fn sidebar_html(sidebar: &Sidebar) -> String {
    let mut html = format!(
        "<p><b>{}</b></p>\n  <p><b>{}</b></p>",
        escape_html(&sidebar.period_line()),
        escape_html(&sidebar.count_line())
    );
    if let Some(warning) = &sidebar.warning {
        html.push_str(&format!(
            "\n  <p class=\"warning\">{}</p>",
            escape_html(warning)
        ));
    }
    if !sidebar.diagnostics.is_empty() {
        let items: String = sidebar
            .diagnostics
            .iter()
            .map(|d| format!("<li title=\"{}\">{}</li>", escape_html(&d.id), escape_html(&d.line())))
            .collect();
        html.push_str(&format!(
            "\n  <p><b>Images used in the composite:</b></p>\n  <ul>{}</ul>",
            items
        ));
    }
    html
}

fn document(
    params: &SessionParams,
    sidebar: &str,
    map: &MapView,
    title_suffix: &str,
) -> serde_json::Result<String> {
    let legend = map
        .legend
        .as_ref()
        .map(|legend| legend.to_html())
        .unwrap_or_default();
    Ok(format!(
        r#"<!doctype html>
<html lang="en">
<head>
  <meta charset="UTF-8">
  <meta name="viewport" content="width=device-width, initial-scale=1.0">
  <title>NDVI (Normalized Difference Vegetation Index){title_suffix}</title>
  <link rel="stylesheet" href="{leaflet_css}">
  <link rel="stylesheet" href="{katex_css}">
  <style>{style}</style>
</head>
<body>
<aside>
  <h2>Period</h2>
  {form}
  {sidebar}
</aside>
<main>
  <h1>NDVI (Normalized Difference Vegetation Index)</h1>
  {explanation}
  <div id="map">{legend}</div>
</main>
<script type="application/json" id="map-config">{config}</script>
<script src="{leaflet_js}"></script>
<script src="{katex_js}"></script>
<script>{script}</script>
</body>
</html>
"#,
        title_suffix = escape_html(title_suffix),
        leaflet_css = LEAFLET_CSS,
        katex_css = KATEX_CSS,
        style = STYLE,
        form = form_html(params),
        sidebar = sidebar,
        explanation = explanation_html(),
        legend = legend,
        config = script_json(map)?,
        leaflet_js = LEAFLET_JS,
        katex_js = KATEX_JS,
        script = MAP_SCRIPT,
    ))
}

/// Full dashboard page for a completed render cycle.
pub fn render_page(params: &SessionParams, view: &DashboardView) -> serde_json::Result<String> {
    document(params, &sidebar_html(&view.sidebar), &view.map, "")
}

/// Dashboard page with an error notice in place of the results.
pub fn render_error_page(
    params: &SessionParams,
    message: &str,
    zoom: u8,
) -> serde_json::Result<String> {
    let sidebar = format!(
        "<p><b>Period: {}</b></p>\n  <p class=\"error\">{}</p>",
        escape_html(&params.window().to_string()),
        escape_html(message)
    );
    document(params, &sidebar, &MapView::empty(zoom), " (error)")
}
