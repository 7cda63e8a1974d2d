//! Reference ellipsoids and geodetic/Cartesian conversion.

use crate::TransformFailure;

/// Iteration cap for the Cartesian to geodetic latitude solve.
const MAX_LATITUDE_ITERATIONS: usize = 16;

/// Latitude change (radians) below which the solve is considered converged.
const LATITUDE_TOLERANCE: f64 = 1e-12;

/// A biaxial reference ellipsoid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ellipsoid {
    /// Semi-major axis in metres.
    pub semi_major: f64,
    /// Semi-minor axis in metres.
    pub semi_minor: f64,
}

/// Airy 1830, the ellipsoid of the OSGB36 datum.
pub const AIRY_1830: Ellipsoid = Ellipsoid {
    semi_major: 6_377_563.396,
    semi_minor: 6_356_256.909,
};

/// WGS84 ellipsoid.
pub const WGS84: Ellipsoid = Ellipsoid {
    semi_major: 6_378_137.0,
    semi_minor: 6_356_752.314_245,
};

impl Ellipsoid {
    /// First eccentricity squared.
    #[must_use]
    pub fn eccentricity_squared(&self) -> f64 {
        let a2 = self.semi_major * self.semi_major;
        (a2 - self.semi_minor * self.semi_minor) / a2
    }

    /// Converts geodetic latitude/longitude (radians, height zero) into
    /// earth-centred Cartesian coordinates in metres.
    #[must_use]
    pub fn to_cartesian(&self, latitude: f64, longitude: f64) -> [f64; 3] {
        let e2 = self.eccentricity_squared();
        let (sin_lat, cos_lat) = latitude.sin_cos();
        let nu = self.semi_major / (1.0 - e2 * sin_lat * sin_lat).sqrt();

        [
            nu * cos_lat * longitude.cos(),
            nu * cos_lat * longitude.sin(),
            (1.0 - e2) * nu * sin_lat,
        ]
    }

    /// Converts earth-centred Cartesian coordinates back to geodetic
    /// latitude/longitude in radians. Height is discarded.
    ///
    /// # Errors
    ///
    /// Returns [`TransformFailure::NoConvergence`] if the latitude does not
    /// settle within the iteration cap.
    pub fn to_geodetic(&self, [x, y, z]: [f64; 3]) -> Result<(f64, f64), TransformFailure> {
        let e2 = self.eccentricity_squared();
        let p = x.hypot(y);
        let longitude = y.atan2(x);

        let mut latitude = z.atan2(p * (1.0 - e2));
        for _ in 0..MAX_LATITUDE_ITERATIONS {
            let sin_lat = latitude.sin();
            let nu = self.semi_major / (1.0 - e2 * sin_lat * sin_lat).sqrt();
            let next = (z + e2 * nu * sin_lat).atan2(p);
            if (next - latitude).abs() < LATITUDE_TOLERANCE {
                return Ok((next, longitude));
            }
            latitude = next;
        }

        Err(TransformFailure::NoConvergence {
            stage: "geodetic latitude",
            iterations: MAX_LATITUDE_ITERATIONS,
        })
    }
}
