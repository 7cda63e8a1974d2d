#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Surveyed cholera death and water pump record types.
//!
//! Records are read from the survey files with planar grid coordinates
//! and later enriched, exactly once, with a geographic location by the
//! reprojection step. Every type here is a plain value: nothing is mutated
//! in place after construction.

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Which of the two survey datasets a record belongs to.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Dataset {
    /// Cholera death locations, each with a death count.
    Deaths,
    /// Water pump locations.
    Pumps,
}

/// A raw surveyed coordinate in a flat, locally-defined grid (metres).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlanarPoint {
    /// Grid easting.
    pub easting: f64,
    /// Grid northing.
    pub northing: f64,
}

impl PlanarPoint {
    #[must_use]
    pub const fn new(easting: f64, northing: f64) -> Self {
        Self { easting, northing }
    }

    /// Returns `true` when both components are finite numbers.
    #[must_use]
    pub const fn is_finite(&self) -> bool {
        self.easting.is_finite() && self.northing.is_finite()
    }
}

/// A longitude/latitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    /// Longitude, `[-180, 180]`.
    pub longitude: f64,
    /// Latitude, `[-90, 90]`.
    pub latitude: f64,
}

impl GeoPoint {
    #[must_use]
    pub const fn new(longitude: f64, latitude: f64) -> Self {
        Self {
            longitude,
            latitude,
        }
    }

    /// Returns `true` when both components are finite and inside the
    /// valid longitude/latitude ranges.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.longitude.is_finite()
            && self.latitude.is_finite()
            && (-180.0..=180.0).contains(&self.longitude)
            && (-90.0..=90.0).contains(&self.latitude)
    }

    /// Returns the pair in `[latitude, longitude]` order, as map widgets
    /// expect it.
    #[must_use]
    pub const fn lat_lng(&self) -> [f64; 2] {
        [self.latitude, self.longitude]
    }
}

/// A record that carries a surveyed position and, once reprojected, a
/// geographic location.
pub trait SurveyRecord: Sized {
    /// The surveyed grid position.
    fn position(&self) -> PlanarPoint;

    /// The geographic location, if the record has been reprojected.
    fn location(&self) -> Option<GeoPoint>;

    /// Consumes the record and returns it enriched with `location`.
    #[must_use]
    fn with_location(self, location: GeoPoint) -> Self;
}

/// A surveyed address with the number of cholera deaths recorded there.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DeathRecord {
    /// Surveyed grid position.
    pub position: PlanarPoint,
    /// Number of deaths recorded at this position.
    pub count: u32,
    /// Geographic location, set by reprojection.
    pub location: Option<GeoPoint>,
}

impl DeathRecord {
    #[must_use]
    pub const fn new(position: PlanarPoint, count: u32) -> Self {
        Self {
            position,
            count,
            location: None,
        }
    }
}

impl SurveyRecord for DeathRecord {
    fn position(&self) -> PlanarPoint {
        self.position
    }

    fn location(&self) -> Option<GeoPoint> {
        self.location
    }

    fn with_location(self, location: GeoPoint) -> Self {
        Self {
            location: Some(location),
            ..self
        }
    }
}

/// A surveyed water pump.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PumpRecord {
    /// Surveyed grid position.
    pub position: PlanarPoint,
    /// Geographic location, set by reprojection.
    pub location: Option<GeoPoint>,
}

impl PumpRecord {
    #[must_use]
    pub const fn new(position: PlanarPoint) -> Self {
        Self {
            position,
            location: None,
        }
    }
}

impl SurveyRecord for PumpRecord {
    fn position(&self) -> PlanarPoint {
        self.position
    }

    fn location(&self) -> Option<GeoPoint> {
        self.location
    }

    fn with_location(self, location: GeoPoint) -> Self {
        Self {
            location: Some(location),
            ..self
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn with_location_keeps_position_and_count() {
        let record = DeathRecord::new(PlanarPoint::new(529_308.741, 181_031.352), 3);
        let located = record.with_location(GeoPoint::new(-0.1379, 51.5134));

        assert_eq!(located.position, record.position);
        assert_eq!(located.count, 3);
        assert_eq!(located.location, Some(GeoPoint::new(-0.1379, 51.5134)));
        assert!(record.location.is_none());
    }

    #[test]
    fn non_finite_planar_point_detected() {
        assert!(PlanarPoint::new(1.0, 2.0).is_finite());
        assert!(!PlanarPoint::new(f64::NAN, 2.0).is_finite());
        assert!(!PlanarPoint::new(1.0, f64::INFINITY).is_finite());
    }

    #[test]
    fn geo_point_range_checks() {
        assert!(GeoPoint::new(-0.1366, 51.5133).is_valid());
        assert!(!GeoPoint::new(181.0, 0.0).is_valid());
        assert!(!GeoPoint::new(0.0, -90.5).is_valid());
        assert!(!GeoPoint::new(f64::NAN, 0.0).is_valid());
    }

    #[test]
    fn dataset_names_roundtrip() {
        assert_eq!(Dataset::Deaths.to_string(), "deaths");
        assert_eq!("pumps".parse::<Dataset>().unwrap(), Dataset::Pumps);
    }
}
