//! Transverse Mercator projection as used by the Ordnance Survey National
//! Grid.
//!
//! Formulae follow the Ordnance Survey guide "A guide to coordinate
//! systems in Great Britain", annex C. Accuracy is better than a
//! millimetre inside the grid's area of use.

use crate::TransformFailure;
use crate::ellipsoid::{AIRY_1830, Ellipsoid};

/// Iteration cap for the footpoint latitude solve in [`TransverseMercator::inverse`].
const MAX_FOOTPOINT_ITERATIONS: usize = 32;

/// Northing residual (metres) below which the footpoint latitude is
/// accepted. 0.01 mm.
const FOOTPOINT_TOLERANCE: f64 = 1e-5;

/// A Transverse Mercator grid definition.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransverseMercator {
    /// Ellipsoid the grid is projected from.
    pub ellipsoid: Ellipsoid,
    /// Scale factor on the central meridian.
    pub scale: f64,
    /// Latitude of true origin, degrees.
    pub origin_latitude: f64,
    /// Longitude of true origin (central meridian), degrees.
    pub origin_longitude: f64,
    /// Easting of true origin, metres.
    pub false_easting: f64,
    /// Northing of true origin, metres.
    pub false_northing: f64,
}

/// The Ordnance Survey National Grid (EPSG:27700).
pub const NATIONAL_GRID: TransverseMercator = TransverseMercator {
    ellipsoid: AIRY_1830,
    scale: 0.999_601_271_7,
    origin_latitude: 49.0,
    origin_longitude: -2.0,
    false_easting: 400_000.0,
    false_northing: -100_000.0,
};

impl TransverseMercator {
    /// Developed meridional arc from the origin latitude to `latitude`
    /// (radians), already scaled by the central scale factor.
    fn meridional_arc(&self, latitude: f64) -> f64 {
        let a = self.ellipsoid.semi_major;
        let b = self.ellipsoid.semi_minor;
        let n = (a - b) / (a + b);
        let n2 = n * n;
        let n3 = n2 * n;
        let origin = self.origin_latitude.to_radians();
        let diff = latitude - origin;
        let sum = latitude + origin;

        let ma = (1.0 + n + 1.25 * n2 + 1.25 * n3) * diff;
        let mb = (3.0 * n + 3.0 * n2 + 21.0 / 8.0 * n3) * diff.sin() * sum.cos();
        let mc = (15.0 / 8.0 * n2 + 15.0 / 8.0 * n3) * (2.0 * diff).sin() * (2.0 * sum).cos();
        let md = 35.0 / 24.0 * n3 * (3.0 * diff).sin() * (3.0 * sum).cos();

        b * self.scale * (ma - mb + mc - md)
    }

    /// Radii of curvature `(nu, rho, eta2)` at `latitude`, scaled.
    fn curvature(&self, sin_lat: f64) -> (f64, f64, f64) {
        let a = self.ellipsoid.semi_major;
        let e2 = self.ellipsoid.eccentricity_squared();
        let denom = 1.0 - e2 * sin_lat * sin_lat;
        let nu = a * self.scale / denom.sqrt();
        let rho = a * self.scale * (1.0 - e2) / denom.powf(1.5);
        (nu, rho, nu / rho - 1.0)
    }

    /// Projects latitude/longitude (radians) to `(easting, northing)`.
    #[must_use]
    pub fn forward(&self, latitude: f64, longitude: f64) -> (f64, f64) {
        let (sin_lat, cos_lat) = latitude.sin_cos();
        let tan_lat = latitude.tan();
        let t2 = tan_lat * tan_lat;
        let t4 = t2 * t2;
        let (nu, rho, eta2) = self.curvature(sin_lat);
        let cos3 = cos_lat.powi(3);
        let cos5 = cos_lat.powi(5);

        let i = self.meridional_arc(latitude) + self.false_northing;
        let ii = nu / 2.0 * sin_lat * cos_lat;
        let iii = nu / 24.0 * sin_lat * cos3 * (5.0 - t2 + 9.0 * eta2);
        let iiia = nu / 720.0 * sin_lat * cos5 * (61.0 - 58.0 * t2 + t4);
        let iv = nu * cos_lat;
        let v = nu / 6.0 * cos3 * (nu / rho - t2);
        let vi = nu / 120.0 * cos5 * (5.0 - 18.0 * t2 + t4 + 14.0 * eta2 - 58.0 * t2 * eta2);

        let dl = longitude - self.origin_longitude.to_radians();
        let northing = i + ii * dl.powi(2) + iii * dl.powi(4) + iiia * dl.powi(6);
        let easting = self.false_easting + iv * dl + v * dl.powi(3) + vi * dl.powi(5);

        (easting, northing)
    }

    /// Unprojects `(easting, northing)` to latitude/longitude (radians).
    ///
    /// # Errors
    ///
    /// Returns [`TransformFailure::NoConvergence`] if the footpoint latitude
    /// does not settle within the iteration cap.
    pub fn inverse(&self, easting: f64, northing: f64) -> Result<(f64, f64), TransformFailure> {
        let a = self.ellipsoid.semi_major;
        let dn = northing - self.false_northing;

        let mut latitude = self.origin_latitude.to_radians();
        let mut arc = 0.0;
        let mut converged = false;
        for _ in 0..MAX_FOOTPOINT_ITERATIONS {
            latitude += (dn - arc) / (a * self.scale);
            arc = self.meridional_arc(latitude);
            if (dn - arc).abs() < FOOTPOINT_TOLERANCE {
                converged = true;
                break;
            }
        }
        if !converged {
            return Err(TransformFailure::NoConvergence {
                stage: "footpoint latitude",
                iterations: MAX_FOOTPOINT_ITERATIONS,
            });
        }

        let (sin_lat, cos_lat) = latitude.sin_cos();
        let tan_lat = latitude.tan();
        let t2 = tan_lat * tan_lat;
        let t4 = t2 * t2;
        let t6 = t4 * t2;
        let (nu, rho, eta2) = self.curvature(sin_lat);
        let sec = 1.0 / cos_lat;

        let vii = tan_lat / (2.0 * rho * nu);
        let viii = tan_lat / (24.0 * rho * nu.powi(3)) * (5.0 + 3.0 * t2 + eta2 - 9.0 * t2 * eta2);
        let ix = tan_lat / (720.0 * rho * nu.powi(5)) * (61.0 + 90.0 * t2 + 45.0 * t4);
        let x = sec / nu;
        let xi = sec / (6.0 * nu.powi(3)) * (nu / rho + 2.0 * t2);
        let xii = sec / (120.0 * nu.powi(5)) * (5.0 + 28.0 * t2 + 24.0 * t4);
        let xiia = sec / (5040.0 * nu.powi(7)) * (61.0 + 662.0 * t2 + 1320.0 * t4 + 720.0 * t6);

        let de = easting - self.false_easting;
        let lat = latitude - vii * de.powi(2) + viii * de.powi(4) - ix * de.powi(6);
        let lon = self.origin_longitude.to_radians() + x * de - xi * de.powi(3) + xii * de.powi(5)
            - xiia * de.powi(7);

        Ok((lat, lon))
    }
}
