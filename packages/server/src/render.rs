//! HTML rendering of the dashboard and of the failure page.
//!
//! Both pages are self-contained: Leaflet and Font Awesome come from a CDN
//! and the layer data is embedded in the page as JSON, so the output of
//! [`render_dashboard`] can be opened straight from disk.

use std::fmt::Write as _;

use snow_map_layers_models::{MapLayer, MarkerShape};
use snow_map_pipeline::MapBundle;

/// Presentation settings that are not part of the pipeline output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardOptions {
    /// Tile URL template.
    pub tile_url: String,
    /// Attribution shown in the map corner.
    pub tile_attribution: String,
}

impl Default for DashboardOptions {
    fn default() -> Self {
        Self {
            tile_url: "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png".to_string(),
            tile_attribution: "&copy; OpenStreetMap contributors".to_string(),
        }
    }
}

const DASHBOARD_TEMPLATE: &str = r#"<!doctype html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>{{TITLE}}</title>
  <link rel="stylesheet" href="https://cdnjs.cloudflare.com/ajax/libs/leaflet/1.9.4/leaflet.css" crossorigin="anonymous" />
  <script src="https://cdnjs.cloudflare.com/ajax/libs/leaflet/1.9.4/leaflet.js" crossorigin="anonymous"></script>
  <link rel="stylesheet" href="https://cdnjs.cloudflare.com/ajax/libs/font-awesome/4.7.0/css/font-awesome.min.css" crossorigin="anonymous" />
  <style>
    html, body { height: 100%; margin: 0; font-family: system-ui, sans-serif; }
    body { display: flex; }
    #map { flex: 1; height: 100%; }
    #panel { width: 280px; padding: 16px; overflow-y: auto; background: #f7f7f7; border-left: 1px solid #ccc; }
    .title-box { position: fixed; top: 10px; left: 60px; z-index: 1000; background: white; padding: 6px 12px; border: 2px solid grey; border-radius: 4px; font-size: 18px; font-weight: bold; }
    .legend { position: fixed; bottom: 30px; left: 10px; z-index: 1000; background: white; padding: 8px 12px; border: 2px solid grey; border-radius: 4px; font-size: 14px; }
    .legend div { margin: 4px 0; }
    .swatch { display: inline-block; width: 10px; height: 10px; margin-right: 6px; }
    .swatch.circle { border-radius: 50%; }
    .metric { margin-bottom: 14px; }
    .metric .label { color: #555; font-size: 13px; }
    .metric .value { font-size: 28px; font-weight: bold; }
    .pump-icon { font-size: 18px; text-align: center; }
    table { width: 100%; border-collapse: collapse; font-size: 13px; }
    td, th { text-align: left; padding: 2px 4px; }
    td.num { text-align: right; }
    .note { color: #a60; font-size: 12px; }
  </style>
</head>
<body>
  <div class="title-box">{{TITLE}}</div>
  <div id="map"></div>
  <aside id="panel">
    {{METRICS}}
  </aside>
  <div class="legend">
    {{LEGEND}}
  </div>
  <script>
    const data = {{DATA}};
    const map = L.map('map').setView(data.center, data.zoom);
    L.tileLayer(data.tiles.url, { attribution: data.tiles.attribution, maxZoom: 19 }).addTo(map);

    const overlays = {};
    for (const layer of data.layers) {
      const group = L.featureGroup();
      const style = layer.style;
      for (const p of layer.points) {
        const latLng = [p.latitude, p.longitude];
        let marker;
        if (style.shape.type === 'circle') {
          marker = L.circleMarker(latLng, {
            radius: style.shape.radius,
            color: style.color,
            fill: true,
            fillColor: style.color,
            fillOpacity: style.shape.fillOpacity,
          });
        } else {
          const icon = document.createElement('i');
          icon.className = style.shape.prefix + ' ' + style.shape.prefix + '-' + style.shape.name;
          icon.style.color = style.color;
          marker = L.marker(latLng, {
            icon: L.divIcon({ className: 'pump-icon', html: icon, iconSize: [20, 20] }),
          });
        }
        if (style.popup) {
          const text = document.createElement('span');
          text.textContent = style.popup;
          marker.bindPopup(text);
        }
        marker.addTo(group);
      }
      group.addTo(map);
      const label = document.createElement('span');
      label.textContent = layer.name;
      overlays[label.innerHTML] = group;
    }
    L.control.layers(null, overlays, { collapsed: false }).addTo(map);
  </script>
</body>
</html>
"#;

const FAILURE_TEMPLATE: &str = r#"<!doctype html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <title>Map unavailable</title>
  <style>
    body { font-family: system-ui, sans-serif; max-width: 720px; margin: 60px auto; color: #222; }
    h1 { color: #b00; }
    li { margin: 6px 0; font-family: monospace; }
  </style>
</head>
<body>
  <h1>The map could not be built</h1>
  <p>No map is shown because the data could not be processed:</p>
  <ol>
    {{CAUSES}}
  </ol>
</body>
</html>
"#;

/// Renders the interactive dashboard for a completed pipeline run.
#[must_use]
pub fn render_dashboard(bundle: &MapBundle, options: &DashboardOptions) -> String {
    let data = serde_json::json!({
        "center": bundle.centroid.lat_lng(),
        "zoom": bundle.zoom,
        "tiles": {
            "url": options.tile_url,
            "attribution": options.tile_attribution,
        },
        "layers": bundle.layers,
    });

    let title = escape_html(&bundle.title);
    fill(
        DASHBOARD_TEMPLATE,
        &[
            ("TITLE", &title),
            ("METRICS", &metrics_html(bundle)),
            ("LEGEND", &legend_html(&bundle.layers)),
            ("DATA", &script_json(&data)),
        ],
    )
}

/// Renders a page explaining why no map could be built, listing `error`
/// and each of its sources.
///
/// A message that ends with its source's message is shortened to its own
/// part, so each cause is listed once.
#[must_use]
pub fn render_failure(error: &dyn std::error::Error) -> String {
    let mut messages = Vec::new();
    let mut current = Some(error);
    while let Some(e) = current {
        messages.push(e.to_string());
        current = e.source();
    }

    let mut causes = String::new();
    for (i, message) in messages.iter().enumerate() {
        let own = messages
            .get(i + 1)
            .and_then(|next| message.strip_suffix(next.as_str()))
            .map_or(message.as_str(), |head| {
                head.trim_end().trim_end_matches(':').trim_end()
            });
        if !own.is_empty() {
            let _ = write!(causes, "<li>{}</li>", escape_html(own));
        }
    }

    fill(FAILURE_TEMPLATE, &[("CAUSES", &causes)])
}

fn metrics_html(bundle: &MapBundle) -> String {
    let mut html = String::new();
    let _ = write!(
        html,
        "<div class=\"metric\"><div class=\"label\">Total deaths</div>\
         <div class=\"value\">{}</div></div>\
         <div class=\"metric\"><div class=\"label\">Max deaths at one location</div>\
         <div class=\"value\">{}</div></div>",
        bundle.stats.total_deaths, bundle.stats.max_deaths_at_point
    );

    if bundle.used_fallback_center {
        html.push_str("<p class=\"note\">No death records: map centered on the default location.</p>");
    }

    if !bundle.pump_shares.is_empty() {
        html.push_str(
            "<h3>Deaths by nearest pump</h3><table>\
             <tr><th>Pump</th><th>Deaths</th><th>Share</th></tr>",
        );
        for share in &bundle.pump_shares {
            let _ = write!(
                html,
                "<tr><td>#{}</td><td class=\"num\">{}</td><td class=\"num\">{:.1}%</td></tr>",
                share.pump_index + 1,
                share.deaths,
                share.fraction_of(bundle.stats.total_deaths) * 100.0
            );
        }
        html.push_str("</table>");
    }

    html
}

fn legend_html(layers: &[MapLayer]) -> String {
    let mut html = String::from("<strong>Legend</strong>");
    for layer in layers {
        let color = escape_html(&layer.style.color);
        let name = escape_html(&layer.name);
        let _ = match &layer.style.shape {
            MarkerShape::Circle { .. } => write!(
                html,
                "<div><span class=\"swatch circle\" style=\"background:{color}\"></span>{name}</div>"
            ),
            MarkerShape::Icon { name: icon, prefix } => {
                let prefix = escape_html(prefix);
                let icon = escape_html(icon);
                write!(
                    html,
                    "<div><i class=\"{prefix} {prefix}-{icon}\" style=\"color:{color}\"></i> {name}</div>"
                )
            }
        };
    }
    html
}

/// Serializes `value` for embedding inside a `<script>` element.
fn script_json(value: &serde_json::Value) -> String {
    value
        .to_string()
        .replace('<', "\\u003c")
        .replace('>', "\\u003e")
        .replace('&', "\\u0026")
}

/// Escapes text for use in HTML content and attribute values.
#[must_use]
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Replaces each `{{KEY}}` in `template` in a single pass. Substituted
/// values are never rescanned; unknown keys are left as they are.
fn fill(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find("}}") else {
            out.push_str(&rest[start..]);
            return out;
        };

        let key = &after[..end];
        match values.iter().find(|(k, _)| *k == key) {
            Some((_, value)) => out.push_str(value),
            None => out.push_str(&rest[start..start + end + 4]),
        }
        rest = &after[end + 2..];
    }

    out.push_str(rest);
    out
}
