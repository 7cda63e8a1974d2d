//! Seven-parameter Helmert datum transformation.

/// Radians per arc-second.
const ARCSEC: f64 = std::f64::consts::PI / (180.0 * 3600.0);

/// A seven-parameter (position vector) Helmert transformation between two
/// earth-centred Cartesian frames.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Helmert {
    /// Translation along X, metres.
    pub tx: f64,
    /// Translation along Y, metres.
    pub ty: f64,
    /// Translation along Z, metres.
    pub tz: f64,
    /// Scale change, parts per million.
    pub scale_ppm: f64,
    /// Rotation about X, arc-seconds.
    pub rx: f64,
    /// Rotation about Y, arc-seconds.
    pub ry: f64,
    /// Rotation about Z, arc-seconds.
    pub rz: f64,
}

/// Ordnance Survey's published WGS84 to OSGB36 parameters. Good to
/// roughly five metres across Great Britain.
pub const WGS84_TO_OSGB36: Helmert = Helmert {
    tx: -446.448,
    ty: 125.157,
    tz: -542.060,
    scale_ppm: 20.4894,
    rx: -0.1502,
    ry: -0.2470,
    rz: -0.8421,
};

type Matrix = [[f64; 3]; 3];

impl Helmert {
    fn matrix(&self) -> Matrix {
        let k = 1.0 + self.scale_ppm * 1e-6;
        let rx = self.rx * ARCSEC;
        let ry = self.ry * ARCSEC;
        let rz = self.rz * ARCSEC;

        [
            [k, -k * rz, k * ry],
            [k * rz, k, -k * rx],
            [-k * ry, k * rx, k],
        ]
    }

    /// Applies the transformation.
    #[must_use]
    pub fn apply(&self, xyz: [f64; 3]) -> [f64; 3] {
        let m = self.matrix();
        let [x, y, z] = multiply(&m, xyz);
        [self.tx + x, self.ty + y, self.tz + z]
    }

    /// Applies the exact inverse of [`Self::apply`], so that
    /// `invert(apply(p)) == p` up to floating-point rounding.
    #[must_use]
    pub fn invert(&self, [x, y, z]: [f64; 3]) -> [f64; 3] {
        let inverse = invert_matrix(&self.matrix());
        multiply(&inverse, [x - self.tx, y - self.ty, z - self.tz])
    }
}

fn multiply(m: &Matrix, [x, y, z]: [f64; 3]) -> [f64; 3] {
    [
        m[0][0] * x + m[0][1] * y + m[0][2] * z,
        m[1][0] * x + m[1][1] * y + m[1][2] * z,
        m[2][0] * x + m[2][1] * y + m[2][2] * z,
    ]
}

/// Inverts a 3x3 matrix by its adjugate. The Helmert matrix is a scaled
/// near-identity, so the determinant is always close to one.
fn invert_matrix(m: &Matrix) -> Matrix {
    let c00 = m[1][1] * m[2][2] - m[1][2] * m[2][1];
    let c01 = m[1][2] * m[2][0] - m[1][0] * m[2][2];
    let c02 = m[1][0] * m[2][1] - m[1][1] * m[2][0];
    let det = m[0][0] * c00 + m[0][1] * c01 + m[0][2] * c02;

    [
        [
            c00 / det,
            (m[0][2] * m[2][1] - m[0][1] * m[2][2]) / det,
            (m[0][1] * m[1][2] - m[0][2] * m[1][1]) / det,
        ],
        [
            c01 / det,
            (m[0][0] * m[2][2] - m[0][2] * m[2][0]) / det,
            (m[0][2] * m[1][0] - m[0][0] * m[1][2]) / det,
        ],
        [
            c02 / det,
            (m[0][1] * m[2][0] - m[0][0] * m[2][1]) / det,
            (m[0][0] * m[1][1] - m[0][1] * m[1][0]) / det,
        ],
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invert_undoes_apply() {
        let p = [3_978_000.0, -9_300.0, 4_968_000.0];
        let q = WGS84_TO_OSGB36.invert(WGS84_TO_OSGB36.apply(p));

        for (a, b) in p.iter().zip(q.iter()) {
            assert!((a - b).abs() < 1e-6, "{a} != {b}");
        }
    }

    #[test]
    fn shift_is_a_few_hundred_metres() {
        let p = [3_978_000.0, -9_300.0, 4_968_000.0];
        let q = WGS84_TO_OSGB36.apply(p);
        let shift = ((q[0] - p[0]).powi(2) + (q[1] - p[1]).powi(2) + (q[2] - p[2]).powi(2)).sqrt();

        assert!(shift > 100.0 && shift < 1_000.0, "shift {shift}");
    }
}
