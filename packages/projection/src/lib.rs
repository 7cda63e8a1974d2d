#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Reprojection of surveyed grid coordinates to longitude/latitude.
//!
//! The survey data is recorded on the Ordnance Survey National Grid
//! (`EPSG:27700`). A [`Reprojector`] unprojects each grid point on the Airy
//! 1830 ellipsoid and, when the target is WGS84 (`EPSG:4326`), shifts the
//! datum with the published seven-parameter Helmert transformation.
//!
//! Every transform is a pure function of its input: reprojecting the same
//! point twice yields bit-identical output.

pub mod crs;
pub mod ellipsoid;
pub mod helmert;
pub mod transverse_mercator;

use snow_map_cholera_models::{GeoPoint, PlanarPoint, SurveyRecord};

pub use crs::{Crs, Datum};

use crate::ellipsoid::{AIRY_1830, WGS84};
use crate::helmert::WGS84_TO_OSGB36;
use crate::transverse_mercator::NATIONAL_GRID;

/// Easting range (metres) accepted for `EPSG:27700` input.
pub const GRID_EASTING_RANGE: std::ops::RangeInclusive<f64> = -200_000.0..=900_000.0;

/// Northing range (metres) accepted for `EPSG:27700` input.
pub const GRID_NORTHING_RANGE: std::ops::RangeInclusive<f64> = -200_000.0..=1_400_000.0;

/// Why a single point could not be transformed.
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum TransformFailure {
    /// The point lies outside the area the source system is defined for.
    #[error("outside the domain of validity of {crs}")]
    OutOfDomain {
        /// The system whose domain was exceeded.
        crs: Crs,
    },

    /// An iterative step did not settle.
    #[error("{stage} did not converge after {iterations} iterations")]
    NoConvergence {
        /// Which solve failed.
        stage: &'static str,
        /// Iterations attempted.
        iterations: usize,
    },

    /// The transform produced a longitude/latitude outside valid ranges.
    #[error("result ({longitude}, {latitude}) is not a valid longitude/latitude")]
    InvalidResult {
        /// Computed longitude.
        longitude: f64,
        /// Computed latitude.
        latitude: f64,
    },
}

/// Errors that can occur while reprojecting.
#[derive(Debug, thiserror::Error)]
pub enum ProjectionError {
    /// A reference system code is not in the registry.
    #[error("Unknown coordinate reference system: '{code}'")]
    UnknownCrs {
        /// The code as supplied.
        code: String,
    },

    /// Both systems are registered but no transform links them.
    #[error("Unsupported transform: {from} -> {to}")]
    UnsupportedTransform {
        /// Source system.
        from: Crs,
        /// Target system.
        to: Crs,
    },

    /// A grid coordinate is NaN or infinite.
    #[error("Invalid coordinate at record {index}: ({easting}, {northing}) is not finite")]
    InvalidCoordinate {
        /// Zero-based record index.
        index: usize,
        /// Offending easting.
        easting: f64,
        /// Offending northing.
        northing: f64,
    },

    /// A geographic coordinate is non-finite or out of range.
    #[error("Invalid location at record {index}: ({longitude}, {latitude})")]
    InvalidLocation {
        /// Zero-based record index.
        index: usize,
        /// Offending longitude.
        longitude: f64,
        /// Offending latitude.
        latitude: f64,
    },

    /// A valid input point could not be transformed.
    #[error("Failed to reproject record {index} ({x}, {y}): {reason}")]
    Reprojection {
        /// Zero-based record index.
        index: usize,
        /// First input component (easting or longitude).
        x: f64,
        /// Second input component (northing or latitude).
        y: f64,
        /// What went wrong.
        #[source]
        reason: TransformFailure,
    },
}

impl ProjectionError {
    /// Returns `true` for errors caused by the input itself (bad numbers
    /// or unknown reference codes) rather than by the transform.
    #[must_use]
    pub const fn is_invalid_coordinate(&self) -> bool {
        matches!(
            self,
            Self::UnknownCrs { .. } | Self::InvalidCoordinate { .. } | Self::InvalidLocation { .. }
        )
    }

    /// Returns the index of the offending record, if the error is tied to
    /// one.
    #[must_use]
    pub const fn record_index(&self) -> Option<usize> {
        match self {
            Self::InvalidCoordinate { index, .. }
            | Self::InvalidLocation { index, .. }
            | Self::Reprojection { index, .. } => Some(*index),
            Self::UnknownCrs { .. } | Self::UnsupportedTransform { .. } => None,
        }
    }
}

/// Parses a registered reference-system code.
///
/// # Errors
///
/// Returns [`ProjectionError::UnknownCrs`] if the code is not registered.
pub fn parse_crs(code: &str) -> Result<Crs, ProjectionError> {
    code.trim().parse().map_err(|_| ProjectionError::UnknownCrs {
        code: code.to_string(),
    })
}

/// Converts grid coordinates to geographic coordinates between a fixed
/// pair of reference systems.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reprojector {
    source: Crs,
    target: Crs,
}

impl Default for Reprojector {
    /// `EPSG:27700` to `EPSG:4326`.
    fn default() -> Self {
        Self {
            source: Crs::BritishNationalGrid,
            target: Crs::Wgs84,
        }
    }
}

impl Reprojector {
    /// Creates a reprojector from two reference-system codes.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectionError::UnknownCrs`] if either code is not
    /// registered, or [`ProjectionError::UnsupportedTransform`] if the
    /// pair is not a grid to geographic transform.
    pub fn new(source: &str, target: &str) -> Result<Self, ProjectionError> {
        Self::from_crs(parse_crs(source)?, parse_crs(target)?)
    }

    /// Creates a reprojector from two registered systems.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectionError::UnsupportedTransform`] if the pair is not
    /// a grid to geographic transform.
    pub const fn from_crs(source: Crs, target: Crs) -> Result<Self, ProjectionError> {
        if matches!(source, Crs::BritishNationalGrid) && target.is_geographic() {
            Ok(Self { source, target })
        } else {
            Err(ProjectionError::UnsupportedTransform {
                from: source,
                to: target,
            })
        }
    }

    /// The grid system points are read in.
    #[must_use]
    pub const fn source(&self) -> Crs {
        self.source
    }

    /// The geographic system points are produced in.
    #[must_use]
    pub const fn target(&self) -> Crs {
        self.target
    }

    /// Reprojects grid points to geographic points, preserving length and
    /// order.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectionError::InvalidCoordinate`] for the first
    /// non-finite input, or [`ProjectionError::Reprojection`] for the first
    /// point that cannot be transformed. No partial output is returned.
    pub fn reproject(&self, points: &[PlanarPoint]) -> Result<Vec<GeoPoint>, ProjectionError> {
        let output = points
            .iter()
            .enumerate()
            .map(|(index, point)| self.reproject_point(index, *point))
            .collect::<Result<Vec<_>, _>>()?;

        log::debug!(
            "Reprojected {} points from {} to {}",
            output.len(),
            self.source,
            self.target
        );

        Ok(output)
    }

    /// Reprojects every record's position and returns the records enriched
    /// with their geographic location.
    ///
    /// # Errors
    ///
    /// Same as [`Self::reproject`].
    pub fn reproject_records<R: SurveyRecord>(
        &self,
        records: Vec<R>,
    ) -> Result<Vec<R>, ProjectionError> {
        records
            .into_iter()
            .enumerate()
            .map(|(index, record)| {
                let location = self.reproject_point(index, record.position())?;
                Ok(record.with_location(location))
            })
            .collect()
    }

    /// Maps geographic points back onto the grid.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectionError::InvalidLocation`] for the first invalid
    /// input, or [`ProjectionError::Reprojection`] if a point falls outside
    /// the grid's domain.
    pub fn reproject_inverse(
        &self,
        points: &[GeoPoint],
    ) -> Result<Vec<PlanarPoint>, ProjectionError> {
        points
            .iter()
            .enumerate()
            .map(|(index, point)| self.reproject_inverse_point(index, *point))
            .collect()
    }

    /// Reprojects one point. `index` is reported in errors.
    ///
    /// # Errors
    ///
    /// See [`Self::reproject`].
    pub fn reproject_point(
        &self,
        index: usize,
        point: PlanarPoint,
    ) -> Result<GeoPoint, ProjectionError> {
        if !point.is_finite() {
            return Err(ProjectionError::InvalidCoordinate {
                index,
                easting: point.easting,
                northing: point.northing,
            });
        }

        self.grid_to_geographic(point)
            .map_err(|reason| ProjectionError::Reprojection {
                index,
                x: point.easting,
                y: point.northing,
                reason,
            })
    }

    fn reproject_inverse_point(
        &self,
        index: usize,
        point: GeoPoint,
    ) -> Result<PlanarPoint, ProjectionError> {
        if !point.is_valid() {
            return Err(ProjectionError::InvalidLocation {
                index,
                longitude: point.longitude,
                latitude: point.latitude,
            });
        }

        self.geographic_to_grid(point)
            .map_err(|reason| ProjectionError::Reprojection {
                index,
                x: point.longitude,
                y: point.latitude,
                reason,
            })
    }

    fn grid_to_geographic(&self, point: PlanarPoint) -> Result<GeoPoint, TransformFailure> {
        if !GRID_EASTING_RANGE.contains(&point.easting)
            || !GRID_NORTHING_RANGE.contains(&point.northing)
        {
            return Err(TransformFailure::OutOfDomain { crs: self.source });
        }

        let (lat, lon) = NATIONAL_GRID.inverse(point.easting, point.northing)?;

        let (lat, lon) = match self.target.datum() {
            Datum::Osgb36 => (lat, lon),
            Datum::Wgs84 => {
                let xyz = AIRY_1830.to_cartesian(lat, lon);
                WGS84.to_geodetic(WGS84_TO_OSGB36.invert(xyz))?
            }
        };

        let result = GeoPoint::new(lon.to_degrees(), lat.to_degrees());
        if result.is_valid() {
            Ok(result)
        } else {
            Err(TransformFailure::InvalidResult {
                longitude: result.longitude,
                latitude: result.latitude,
            })
        }
    }

    fn geographic_to_grid(&self, point: GeoPoint) -> Result<PlanarPoint, TransformFailure> {
        let lat = point.latitude.to_radians();
        let lon = point.longitude.to_radians();

        let (lat, lon) = match self.target.datum() {
            Datum::Osgb36 => (lat, lon),
            Datum::Wgs84 => {
                let xyz = WGS84.to_cartesian(lat, lon);
                AIRY_1830.to_geodetic(WGS84_TO_OSGB36.apply(xyz))?
            }
        };

        let (easting, northing) = NATIONAL_GRID.forward(lat, lon);
        if easting.is_finite()
            && northing.is_finite()
            && GRID_EASTING_RANGE.contains(&easting)
            && GRID_NORTHING_RANGE.contains(&northing)
        {
            Ok(PlanarPoint::new(easting, northing))
        } else {
            Err(TransformFailure::OutOfDomain { crs: self.source })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use snow_map_cholera_models::DeathRecord;

    // Broad Street pump, from the digitised 1854 survey.
    const BROAD_STREET: PlanarPoint = PlanarPoint::new(529_396.539, 181_025.063);

    fn london_points() -> Vec<PlanarPoint> {
        vec![
            BROAD_STREET,
            PlanarPoint::new(529_308.741, 181_031.352),
            PlanarPoint::new(529_312.164, 181_025.172),
            PlanarPoint::new(529_614.000, 180_730.000),
        ]
    }

    #[test]
    fn broad_street_pump_matches_published_wgs84() {
        let out = Reprojector::default().reproject(&[BROAD_STREET]).unwrap();

        assert!((out[0].longitude - -0.136_668).abs() < 1e-5, "{:?}", out[0]);
        assert!((out[0].latitude - 51.513_341).abs() < 1e-5, "{:?}", out[0]);
    }

    #[test]
    fn osgb36_target_skips_datum_shift() {
        let reprojector = Reprojector::new("EPSG:27700", "EPSG:4277").unwrap();
        let out = reprojector
            .reproject(&[PlanarPoint::new(651_409.903, 313_177.270)])
            .unwrap();

        assert!((out[0].latitude - 52.657_570_30).abs() < 1e-7);
        assert!((out[0].longitude - 1.717_921_58).abs() < 1e-7);
    }

    #[test]
    fn preserves_length_and_order() {
        let points = london_points();
        let out = Reprojector::default().reproject(&points).unwrap();

        assert_eq!(out.len(), points.len());
        // The second point lies west of Broad Street, the fourth south-east.
        assert!(out[1].longitude < out[0].longitude);
        assert!(out[3].latitude < out[0].latitude);
        assert!(out[3].longitude > out[0].longitude);
    }

    #[test]
    fn reprojection_is_deterministic() {
        let reprojector = Reprojector::default();
        let points = london_points();

        assert_eq!(
            reprojector.reproject(&points).unwrap(),
            reprojector.reproject(&points).unwrap()
        );
    }

    #[test]
    fn inverse_roundtrip_within_millimetres() {
        for target in ["EPSG:4326", "EPSG:4277"] {
            let reprojector = Reprojector::new("EPSG:27700", target).unwrap();
            let points = london_points();
            let geo = reprojector.reproject(&points).unwrap();
            let back = reprojector.reproject_inverse(&geo).unwrap();

            for (p, q) in points.iter().zip(back.iter()) {
                assert!((p.easting - q.easting).abs() < 5e-3, "{p:?} vs {q:?}");
                assert!((p.northing - q.northing).abs() < 5e-3, "{p:?} vs {q:?}");
            }
        }
    }

    #[test]
    fn non_finite_coordinate_reports_index() {
        let points = [BROAD_STREET, PlanarPoint::new(f64::NAN, 181_000.0)];
        let err = Reprojector::default().reproject(&points).unwrap_err();

        assert!(err.is_invalid_coordinate());
        assert_eq!(err.record_index(), Some(1));
        assert!(matches!(err, ProjectionError::InvalidCoordinate { index: 1, .. }));
    }

    #[test]
    fn out_of_domain_point_reports_index() {
        let points = [BROAD_STREET, BROAD_STREET, PlanarPoint::new(5_000_000.0, 0.0)];
        let err = Reprojector::default().reproject(&points).unwrap_err();

        assert!(!err.is_invalid_coordinate());
        assert!(matches!(
            err,
            ProjectionError::Reprojection {
                index: 2,
                reason: TransformFailure::OutOfDomain { .. },
                ..
            }
        ));
    }

    #[test]
    fn unknown_code_is_rejected() {
        let err = Reprojector::new("EPSG:27700", "EPSG:9999").unwrap_err();

        assert!(err.is_invalid_coordinate());
        assert!(matches!(err, ProjectionError::UnknownCrs { ref code } if code == "EPSG:9999"));
    }

    #[test]
    fn geographic_source_is_unsupported() {
        let err = Reprojector::new("EPSG:4326", "EPSG:27700").unwrap_err();
        assert!(matches!(err, ProjectionError::UnsupportedTransform { .. }));
    }

    #[test]
    fn records_are_enriched_in_order() {
        let records = vec![
            DeathRecord::new(BROAD_STREET, 3),
            DeathRecord::new(PlanarPoint::new(529_308.741, 181_031.352), 1),
        ];
        let expected = Reprojector::default()
            .reproject(&records.iter().map(|r| r.position).collect::<Vec<_>>())
            .unwrap();
        let enriched = Reprojector::default().reproject_records(records).unwrap();

        assert_eq!(enriched[0].count, 3);
        assert_eq!(enriched[1].count, 1);
        assert_eq!(enriched[0].location, Some(expected[0]));
        assert_eq!(enriched[1].location, Some(expected[1]));
    }

    #[test]
    fn inverse_rejects_invalid_location() {
        let err = Reprojector::default()
            .reproject_inverse(&[GeoPoint::new(200.0, 51.0)])
            .unwrap_err();
        assert!(matches!(err, ProjectionError::InvalidLocation { index: 0, .. }));
    }
}
