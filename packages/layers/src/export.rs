//! `GeoJSON` export and extent of map layers.

use geo::{BoundingRect as _, MultiPoint, Point, Rect};
use geojson::{Feature, FeatureCollection, Geometry, JsonObject, JsonValue};
use snow_map_layers_models::{MapLayer, MarkerShape};

/// Converts a layer into a `GeoJSON` `FeatureCollection`, one `Point`
/// feature per layer point, in order.
///
/// Each feature carries the layer name, its index within the layer, the
/// marker color, and the popup text when the layer has one.
#[must_use]
pub fn to_feature_collection(layer: &MapLayer) -> FeatureCollection {
    let features = layer
        .points
        .iter()
        .enumerate()
        .map(|(index, point)| {
            let geo_point = Point::new(point.longitude, point.latitude);

            let mut properties = JsonObject::new();
            properties.insert("layer".to_string(), JsonValue::from(layer.name.as_str()));
            properties.insert("index".to_string(), JsonValue::from(index));
            properties.insert(
                "color".to_string(),
                JsonValue::from(layer.style.color.as_str()),
            );
            if let Some(popup) = &layer.style.popup {
                properties.insert("popup".to_string(), JsonValue::from(popup.as_str()));
            }

            Feature {
                bbox: None,
                geometry: Some(Geometry::new(geojson::Value::from(&geo_point))),
                id: None,
                properties: Some(properties),
                foreign_members: None,
            }
        })
        .collect();

    let mut foreign_members = JsonObject::new();
    foreign_members.insert("name".to_string(), JsonValue::from(layer.name.as_str()));
    foreign_members.insert("marker".to_string(), marker_json(&layer.style.shape));

    FeatureCollection {
        bbox: None,
        features,
        foreign_members: Some(foreign_members),
    }
}

/// Serializes a layer as a pretty-printed `GeoJSON` document.
///
/// # Errors
///
/// Returns [`serde_json::Error`] if serialization fails.
pub fn to_geojson_string(layer: &MapLayer) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&to_feature_collection(layer))
}

fn marker_json(shape: &MarkerShape) -> JsonValue {
    serde_json::to_value(shape).unwrap_or(JsonValue::Null)
}

/// Bounding rectangle (x = longitude, y = latitude) of all points across
/// `layers`, or `None` if every layer is empty.
#[must_use]
pub fn bounds<'a>(layers: impl IntoIterator<Item = &'a MapLayer>) -> Option<Rect<f64>> {
    let points: MultiPoint<f64> = layers
        .into_iter()
        .flat_map(|layer| layer.points.iter())
        .map(|p| Point::new(p.longitude, p.latitude))
        .collect();

    points.bounding_rect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use snow_map_cholera_models::GeoPoint;
    use snow_map_layers_models::{LayerStyle, PumpStyle};

    fn pump_layer(points: Vec<GeoPoint>) -> MapLayer {
        MapLayer {
            name: "Water Pumps".to_string(),
            style: LayerStyle::from(&PumpStyle::default()),
            points,
        }
    }

    #[test]
    fn one_feature_per_point() {
        let layer = pump_layer(vec![
            GeoPoint::new(-0.1367, 51.5133),
            GeoPoint::new(-0.1396, 51.5137),
        ]);
        let fc = to_feature_collection(&layer);

        assert_eq!(fc.features.len(), 2);
        let first = &fc.features[0];
        match &first.geometry.as_ref().unwrap().value {
            geojson::Value::Point(coords) => {
                assert!((coords[0] - -0.1367).abs() < 1e-12);
                assert!((coords[1] - 51.5133).abs() < 1e-12);
            }
            other => panic!("unexpected geometry {other:?}"),
        }
        assert_eq!(
            first.property("popup").and_then(JsonValue::as_str),
            Some("Water Pump")
        );
        assert_eq!(
            fc.features[1].property("index").and_then(JsonValue::as_u64),
            Some(1)
        );
    }

    #[test]
    fn collection_carries_layer_name() {
        let fc = to_feature_collection(&pump_layer(Vec::new()));
        let name = fc
            .foreign_members
            .as_ref()
            .and_then(|m| m.get("name"))
            .and_then(JsonValue::as_str);

        assert_eq!(name, Some("Water Pumps"));
        assert!(fc.features.is_empty());
    }

    #[test]
    fn geojson_string_parses_back() {
        let layer = pump_layer(vec![GeoPoint::new(-0.1367, 51.5133)]);
        let text = to_geojson_string(&layer).unwrap();
        let parsed: geojson::GeoJson = text.parse().unwrap();

        match parsed {
            geojson::GeoJson::FeatureCollection(fc) => assert_eq!(fc.features.len(), 1),
            other => panic!("unexpected document {other:?}"),
        }
    }

    #[test]
    fn bounds_span_all_layers() {
        let a = pump_layer(vec![GeoPoint::new(-0.14, 51.51)]);
        let b = pump_layer(vec![GeoPoint::new(-0.13, 51.52)]);
        let rect = bounds([&a, &b]).unwrap();

        assert!((rect.min().x - -0.14).abs() < 1e-12);
        assert!((rect.max().y - 51.52).abs() < 1e-12);
    }

    #[test]
    fn bounds_of_nothing() {
        assert!(bounds([&pump_layer(Vec::new())]).is_none());
    }
}
