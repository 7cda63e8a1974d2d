#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Summary statistic types for the cholera death dataset.
//!
//! All values are derived and read-only. They are recomputed in full on
//! every pipeline run.

use serde::{Deserialize, Serialize};
use snow_map_cholera_models::GeoPoint;

/// Headline numbers for the death dataset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryStats {
    /// Sum of the death counts of all records.
    pub total_deaths: u64,
    /// Largest death count recorded at a single point.
    pub max_deaths_at_point: u64,
}

/// Deaths attributed to one pump because it is their nearest pump.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PumpShare {
    /// Index of the pump in the pump dataset.
    pub pump_index: usize,
    /// Geographic location of the pump, if reprojected.
    pub location: Option<GeoPoint>,
    /// Number of death records nearest to this pump.
    pub records: usize,
    /// Sum of the death counts of those records.
    pub deaths: u64,
}

impl PumpShare {
    /// Fraction of `total_deaths` attributed to this pump, in `[0, 1]`.
    /// Zero when there are no deaths.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn fraction_of(&self, total_deaths: u64) -> f64 {
        if total_deaths == 0 {
            0.0
        } else {
            self.deaths as f64 / total_deaths as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fraction_handles_zero_total() {
        let share = PumpShare {
            pump_index: 0,
            location: None,
            records: 0,
            deaths: 0,
        };
        assert!(share.fraction_of(0).abs() < f64::EPSILON);
    }

    #[test]
    fn fraction_of_total() {
        let share = PumpShare {
            pump_index: 0,
            location: None,
            records: 2,
            deaths: 5,
        };
        assert!((share.fraction_of(20) - 0.25).abs() < f64::EPSILON);
    }
}
