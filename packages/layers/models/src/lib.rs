#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Styled map layer types for the cholera map.
//!
//! A [`MapLayer`] is a named, styled group of points shown as one
//! toggleable overlay. Layers are built once and never mutated.

use serde::{Deserialize, Serialize};
use snow_map_cholera_models::GeoPoint;

/// Name of the death layer.
pub const DEATHS_LAYER: &str = "Cholera Deaths";

/// Name of the pump layer.
pub const PUMPS_LAYER: &str = "Water Pumps";

/// How each point of a layer is drawn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum MarkerShape {
    /// A filled circle of fixed pixel radius.
    Circle {
        /// Radius in pixels.
        radius: f64,
        /// Fill opacity, `[0, 1]`.
        fill_opacity: f64,
    },
    /// A pin marker with a font icon.
    Icon {
        /// Icon name within its font (e.g. `"tint"`).
        name: String,
        /// Icon font prefix (e.g. `"fa"`).
        prefix: String,
    },
}

/// Visual style shared by every point of a layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayerStyle {
    /// CSS color name or hex code.
    pub color: String,
    /// Marker shape.
    pub shape: MarkerShape,
    /// Popup text shown when a point is clicked.
    pub popup: Option<String>,
}

/// A named, styled collection of points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapLayer {
    /// Display name, also shown in the layer toggle.
    pub name: String,
    /// Style applied to every point.
    pub style: LayerStyle,
    /// Points in input order.
    pub points: Vec<GeoPoint>,
}

impl MapLayer {
    /// URL-safe identifier derived from the name (`"Cholera Deaths"` ->
    /// `"cholera-deaths"`).
    #[must_use]
    pub fn slug(&self) -> String {
        slugify(&self.name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Lowercases `name` and joins its alphanumeric runs with `-`.
#[must_use]
pub fn slugify(name: &str) -> String {
    name.split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|part| !part.is_empty())
        .map(str::to_ascii_lowercase)
        .collect::<Vec<_>>()
        .join("-")
}

/// Configurable style of the death layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeathStyle {
    pub color: String,
    pub radius: f64,
    pub fill_opacity: f64,
}

impl Default for DeathStyle {
    fn default() -> Self {
        Self {
            color: "red".to_string(),
            radius: 3.0,
            fill_opacity: 0.8,
        }
    }
}

impl From<&DeathStyle> for LayerStyle {
    fn from(value: &DeathStyle) -> Self {
        Self {
            color: value.color.clone(),
            shape: MarkerShape::Circle {
                radius: value.radius,
                fill_opacity: value.fill_opacity,
            },
            popup: None,
        }
    }
}

/// Configurable style of the pump layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PumpStyle {
    pub color: String,
    pub icon: String,
    pub icon_prefix: String,
    pub popup: Option<String>,
}

impl Default for PumpStyle {
    fn default() -> Self {
        Self {
            color: "blue".to_string(),
            icon: "tint".to_string(),
            icon_prefix: "fa".to_string(),
            popup: Some("Water Pump".to_string()),
        }
    }
}

impl From<&PumpStyle> for LayerStyle {
    fn from(value: &PumpStyle) -> Self {
        Self {
            color: value.color.clone(),
            shape: MarkerShape::Icon {
                name: value.icon.clone(),
                prefix: value.icon_prefix.clone(),
            },
            popup: value.popup.clone(),
        }
    }
}

/// Styles of both layers, as read from configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayerStyles {
    pub deaths: DeathStyle,
    pub pumps: PumpStyle,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugs() {
        assert_eq!(slugify(DEATHS_LAYER), "cholera-deaths");
        assert_eq!(slugify(PUMPS_LAYER), "water-pumps");
        assert_eq!(slugify("  A  b--C "), "a-b-c");
    }

    #[test]
    fn default_death_style_is_small_red_circle() {
        let style = LayerStyle::from(&DeathStyle::default());

        assert_eq!(style.color, "red");
        assert_eq!(
            style.shape,
            MarkerShape::Circle {
                radius: 3.0,
                fill_opacity: 0.8
            }
        );
        assert!(style.popup.is_none());
    }

    #[test]
    fn default_pump_style_is_blue_tint_icon() {
        let style = LayerStyle::from(&PumpStyle::default());

        assert_eq!(style.color, "blue");
        assert_eq!(
            style.shape,
            MarkerShape::Icon {
                name: "tint".to_string(),
                prefix: "fa".to_string()
            }
        );
        assert_eq!(style.popup.as_deref(), Some("Water Pump"));
    }
}
