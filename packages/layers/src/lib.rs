#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Builds the death and pump map layers.
//!
//! Every input record yields exactly one point, in input order. Nothing is
//! filtered, merged, or clustered: records that share a location stay
//! separate points.

pub mod export;

use snow_map_cholera_models::{DeathRecord, PumpRecord, SurveyRecord};
use snow_map_layers_models::{DEATHS_LAYER, LayerStyle, LayerStyles, MapLayer, PUMPS_LAYER};

/// Errors that can occur while building layers.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LayerError {
    /// A record reached the layer builder without a geographic location.
    #[error("Record {index} of layer '{layer}' has no geographic location")]
    IncompleteRecord {
        /// Layer being built.
        layer: String,
        /// Zero-based record index.
        index: usize,
    },
}

/// The two layers of the cholera map.
#[derive(Debug, Clone, PartialEq)]
pub struct Layers {
    /// One circle per death record.
    pub deaths: MapLayer,
    /// One icon per pump.
    pub pumps: MapLayer,
}

impl Layers {
    /// Both layers, deaths first.
    #[must_use]
    pub fn into_array(self) -> [MapLayer; 2] {
        [self.deaths, self.pumps]
    }
}

/// Builds the `"Cholera Deaths"` and `"Water Pumps"` layers.
///
/// # Errors
///
/// Returns [`LayerError::IncompleteRecord`] for the first record that has
/// not been reprojected.
pub fn build_layers(
    deaths: &[DeathRecord],
    pumps: &[PumpRecord],
    styles: &LayerStyles,
) -> Result<Layers, LayerError> {
    let layers = Layers {
        deaths: build_layer(DEATHS_LAYER, LayerStyle::from(&styles.deaths), deaths)?,
        pumps: build_layer(PUMPS_LAYER, LayerStyle::from(&styles.pumps), pumps)?,
    };

    log::info!(
        "Built layers: {} death points, {} pump points",
        layers.deaths.len(),
        layers.pumps.len()
    );

    Ok(layers)
}

/// Builds a single layer from reprojected records.
///
/// # Errors
///
/// Returns [`LayerError::IncompleteRecord`] for the first record without a
/// location.
pub fn build_layer<R: SurveyRecord>(
    name: &str,
    style: LayerStyle,
    records: &[R],
) -> Result<MapLayer, LayerError> {
    let points = records
        .iter()
        .enumerate()
        .map(|(index, record)| {
            record.location().ok_or_else(|| LayerError::IncompleteRecord {
                layer: name.to_string(),
                index,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(MapLayer {
        name: name.to_string(),
        style,
        points,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use snow_map_cholera_models::{GeoPoint, PlanarPoint};
    use snow_map_layers_models::MarkerShape;

    fn located_death(lon: f64, lat: f64, count: u32) -> DeathRecord {
        DeathRecord::new(PlanarPoint::new(0.0, 0.0), count).with_location(GeoPoint::new(lon, lat))
    }

    fn located_pump(lon: f64, lat: f64) -> PumpRecord {
        PumpRecord::new(PlanarPoint::new(0.0, 0.0)).with_location(GeoPoint::new(lon, lat))
    }

    #[test]
    fn one_point_per_record_in_order() {
        let deaths = [
            located_death(-0.1379, 51.5134, 3),
            located_death(-0.1378, 51.5133, 2),
            located_death(-0.1379, 51.5134, 1),
        ];
        let pumps = [located_pump(-0.1367, 51.5133)];

        let layers = build_layers(&deaths, &pumps, &LayerStyles::default()).unwrap();

        assert_eq!(layers.deaths.name, "Cholera Deaths");
        assert_eq!(layers.pumps.name, "Water Pumps");
        assert_eq!(layers.deaths.len(), deaths.len());
        assert_eq!(layers.pumps.len(), pumps.len());
        for (point, record) in layers.deaths.points.iter().zip(deaths.iter()) {
            assert_eq!(Some(*point), record.location);
        }
        // Duplicate locations are not merged.
        assert_eq!(layers.deaths.points[0], layers.deaths.points[2]);
    }

    #[test]
    fn styles_are_applied() {
        let layers = build_layers(
            &[located_death(0.0, 0.0, 1)],
            &[located_pump(0.0, 0.0)],
            &LayerStyles::default(),
        )
        .unwrap();

        assert!(matches!(layers.deaths.style.shape, MarkerShape::Circle { .. }));
        assert!(matches!(layers.pumps.style.shape, MarkerShape::Icon { .. }));
        assert_eq!(layers.pumps.style.popup.as_deref(), Some("Water Pump"));
    }

    #[test]
    fn empty_inputs_give_empty_layers() {
        let layers = build_layers(&[], &[], &LayerStyles::default()).unwrap();

        assert!(layers.deaths.is_empty());
        assert!(layers.pumps.is_empty());
        let [deaths, pumps] = layers.into_array();
        assert_eq!(deaths.name, "Cholera Deaths");
        assert_eq!(pumps.name, "Water Pumps");
    }

    #[test]
    fn unreprojected_record_is_incomplete() {
        let pumps = [
            located_pump(0.0, 0.0),
            PumpRecord::new(PlanarPoint::new(1.0, 1.0)),
        ];
        let err = build_layers(&[], &pumps, &LayerStyles::default()).unwrap_err();

        assert_eq!(
            err,
            LayerError::IncompleteRecord {
                layer: "Water Pumps".to_string(),
                index: 1,
            }
        );
    }
}
