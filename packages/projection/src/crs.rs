//! Registry of the coordinate reference systems the reprojector knows.

use strum_macros::{AsRefStr, Display, EnumString};

/// A registered coordinate reference system, addressed by its EPSG code.
///
/// Parsing accepts `"EPSG:27700"`, `"epsg:27700"` and the bare numeric
/// code `"27700"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, AsRefStr)]
#[strum(ascii_case_insensitive)]
pub enum Crs {
    /// OSGB36 / British National Grid (Transverse Mercator on Airy 1830).
    #[strum(to_string = "EPSG:27700", serialize = "27700")]
    BritishNationalGrid,
    /// OSGB36 geographic longitude/latitude (Airy 1830).
    #[strum(to_string = "EPSG:4277", serialize = "4277")]
    Osgb36,
    /// WGS84 geographic longitude/latitude.
    #[strum(to_string = "EPSG:4326", serialize = "4326")]
    Wgs84,
}

/// The geodetic datum a [`Crs`] is defined on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Datum {
    /// Ordnance Survey Great Britain 1936, Airy 1830 ellipsoid.
    Osgb36,
    /// World Geodetic System 1984.
    Wgs84,
}

impl Crs {
    /// Returns the numeric EPSG code.
    #[must_use]
    pub const fn epsg_code(self) -> u32 {
        match self {
            Self::BritishNationalGrid => 27700,
            Self::Osgb36 => 4277,
            Self::Wgs84 => 4326,
        }
    }

    /// Returns the datum the system is defined on.
    #[must_use]
    pub const fn datum(self) -> Datum {
        match self {
            Self::BritishNationalGrid | Self::Osgb36 => Datum::Osgb36,
            Self::Wgs84 => Datum::Wgs84,
        }
    }

    /// Returns `true` for longitude/latitude systems.
    #[must_use]
    pub const fn is_geographic(self) -> bool {
        matches!(self, Self::Osgb36 | Self::Wgs84)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_epsg_codes_case_insensitively() {
        assert_eq!("EPSG:27700".parse::<Crs>().unwrap(), Crs::BritishNationalGrid);
        assert_eq!("epsg:4326".parse::<Crs>().unwrap(), Crs::Wgs84);
        assert_eq!("4277".parse::<Crs>().unwrap(), Crs::Osgb36);
    }

    #[test]
    fn rejects_unregistered_codes() {
        assert!("EPSG:3857".parse::<Crs>().is_err());
        assert!("".parse::<Crs>().is_err());
    }

    #[test]
    fn display_matches_epsg_code() {
        for crs in [Crs::BritishNationalGrid, Crs::Osgb36, Crs::Wgs84] {
            assert_eq!(crs.to_string(), format!("EPSG:{}", crs.epsg_code()));
        }
    }
}
