#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Aggregation over reprojected death records.
//!
//! Computes the map framing centroid (a plain arithmetic mean of
//! longitudes and latitudes, not a geodesic centroid), the total and
//! maximum death counts, and the number of deaths nearest to each pump.

pub mod nearest;

use snow_map_analytics_models::SummaryStats;
use snow_map_cholera_models::{DeathRecord, GeoPoint};

pub use nearest::pump_shares;

/// Errors that can occur during aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum AnalyticsError {
    /// There are no death records to take a centroid of.
    #[error("No death records: cannot compute a map center")]
    EmptyDataset,

    /// A record reached aggregation without a geographic location.
    #[error("Death record {index} has no geographic location")]
    IncompleteRecord {
        /// Zero-based record index.
        index: usize,
    },
}

/// Computes total and maximum death counts.
///
/// An empty slice yields zero for both.
#[must_use]
pub fn summary_stats(deaths: &[DeathRecord]) -> SummaryStats {
    let stats = deaths
        .iter()
        .fold(SummaryStats::default(), |acc, record| SummaryStats {
            total_deaths: acc.total_deaths + u64::from(record.count),
            max_deaths_at_point: acc.max_deaths_at_point.max(u64::from(record.count)),
        });

    log::debug!(
        "{} death records: total={}, max at one point={}",
        deaths.len(),
        stats.total_deaths,
        stats.max_deaths_at_point
    );

    stats
}

/// Computes the mean longitude and mean latitude of all death records.
///
/// # Errors
///
/// Returns [`AnalyticsError::EmptyDataset`] if `deaths` is empty, or
/// [`AnalyticsError::IncompleteRecord`] if a record has not been
/// reprojected.
#[allow(clippy::cast_precision_loss)]
pub fn centroid(deaths: &[DeathRecord]) -> Result<GeoPoint, AnalyticsError> {
    if deaths.is_empty() {
        return Err(AnalyticsError::EmptyDataset);
    }

    let mut lon_sum = 0.0;
    let mut lat_sum = 0.0;
    for (index, record) in deaths.iter().enumerate() {
        let location = record
            .location
            .ok_or(AnalyticsError::IncompleteRecord { index })?;
        lon_sum += location.longitude;
        lat_sum += location.latitude;
    }

    let n = deaths.len() as f64;
    Ok(GeoPoint::new(lon_sum / n, lat_sum / n))
}
