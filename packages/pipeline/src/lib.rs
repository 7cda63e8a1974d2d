#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! One run of the cholera map: load the survey files, reproject them onto
//! WGS84, aggregate the deaths, and build the two map layers.
//!
//! The result is a [`MapBundle`], an immutable value handed to whatever
//! renders the map. Any failure aborts the run; there is no partial
//! bundle.

pub mod config;

use serde::Serialize;
use snow_map_analytics::{AnalyticsError, centroid, pump_shares, summary_stats};
use snow_map_analytics_models::{PumpShare, SummaryStats};
use snow_map_cholera_models::{Dataset, DeathRecord, GeoPoint, PumpRecord};
use snow_map_layers::{LayerError, build_layers};
use snow_map_layers_models::MapLayer;
use snow_map_projection::{ProjectionError, Reprojector};
use snow_map_source::SourceError;

pub use config::{ConfigError, PipelineConfig};

/// Errors that can abort a pipeline run.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The source or target reference system is unusable.
    #[error("Invalid projection settings: {0}")]
    Crs(#[source] ProjectionError),

    /// A survey file could not be loaded.
    #[error("Failed to load {dataset} data: {source}")]
    Source {
        dataset: Dataset,
        #[source]
        source: SourceError,
    },

    /// A record of a dataset could not be reprojected.
    #[error("Failed to reproject {dataset} data: {source}")]
    Projection {
        dataset: Dataset,
        #[source]
        source: ProjectionError,
    },

    #[error(transparent)]
    Analytics(#[from] AnalyticsError),

    #[error(transparent)]
    Layer(#[from] LayerError),
}

/// Everything the map renderer needs from one run.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MapBundle {
    /// Map title.
    pub title: String,
    /// Initial zoom level.
    pub zoom: u8,
    /// Initial map center: the death centroid, or the configured fallback.
    pub centroid: GeoPoint,
    /// Whether [`Self::centroid`] is the fallback center.
    pub used_fallback_center: bool,
    /// The death layer followed by the pump layer.
    pub layers: [MapLayer; 2],
    /// Death totals.
    pub stats: SummaryStats,
    /// Deaths nearest to each pump, in pump order.
    pub pump_shares: Vec<PumpShare>,
}

impl MapBundle {
    #[must_use]
    pub const fn deaths_layer(&self) -> &MapLayer {
        &self.layers[0]
    }

    #[must_use]
    pub const fn pumps_layer(&self) -> &MapLayer {
        &self.layers[1]
    }

    /// Finds a layer by its slug (`"cholera-deaths"`, `"water-pumps"`).
    #[must_use]
    pub fn layer(&self, slug: &str) -> Option<&MapLayer> {
        self.layers.iter().find(|layer| layer.slug() == slug)
    }
}

/// Loads both survey files named by `config` and runs the pipeline on
/// them.
///
/// # Errors
///
/// Returns [`PipelineError`] for the first stage that fails.
pub fn run(config: &PipelineConfig) -> Result<MapBundle, PipelineError> {
    let reader = config.data.reader()?;

    let deaths = reader
        .load_deaths(&config.data.deaths)
        .map_err(|source| PipelineError::Source {
            dataset: Dataset::Deaths,
            source,
        })?;
    let pumps = reader
        .load_pumps(&config.data.pumps)
        .map_err(|source| PipelineError::Source {
            dataset: Dataset::Pumps,
            source,
        })?;

    run_with_records(deaths, pumps, config)
}

/// Runs the pipeline on records that are already loaded.
///
/// If there are no death records, the map is centered on the configured
/// fallback center.
///
/// # Errors
///
/// Returns [`PipelineError::Config`] for an out-of-range fallback center,
/// [`PipelineError::Crs`] for unusable projection settings,
/// [`PipelineError::Projection`] for the first record that cannot be
/// reprojected, and [`PipelineError::Analytics`] when there are no deaths
/// and no fallback center.
pub fn run_with_records(
    deaths: Vec<DeathRecord>,
    pumps: Vec<PumpRecord>,
    config: &PipelineConfig,
) -> Result<MapBundle, PipelineError> {
    let fallback_center = config.map.fallback_center()?;
    let reprojector = Reprojector::new(&config.projection.source, &config.projection.target)
        .map_err(PipelineError::Crs)?;

    let deaths =
        reprojector
            .reproject_records(deaths)
            .map_err(|source| PipelineError::Projection {
                dataset: Dataset::Deaths,
                source,
            })?;
    let pumps =
        reprojector
            .reproject_records(pumps)
            .map_err(|source| PipelineError::Projection {
                dataset: Dataset::Pumps,
                source,
            })?;

    log::info!(
        "Reprojected {} death and {} pump records from {} to {}",
        deaths.len(),
        pumps.len(),
        reprojector.source(),
        reprojector.target()
    );

    let stats = summary_stats(&deaths);
    log::info!(
        "Total deaths: {}, max at one location: {}",
        stats.total_deaths,
        stats.max_deaths_at_point
    );

    let (center, used_fallback_center) = match centroid(&deaths) {
        Ok(center) => (center, false),
        Err(AnalyticsError::EmptyDataset) => {
            let fallback = fallback_center.ok_or(AnalyticsError::EmptyDataset)?;
            log::warn!(
                "No death records; centering map on fallback ({}, {})",
                fallback.longitude,
                fallback.latitude
            );
            (fallback, true)
        }
        Err(e) => return Err(e.into()),
    };

    let shares = pump_shares(&deaths, &pumps);
    let layers = build_layers(&deaths, &pumps, &config.styles)?;

    Ok(MapBundle {
        title: config.map.title.clone(),
        zoom: config.map.zoom,
        centroid: center,
        used_fallback_center,
        layers: layers.into_array(),
        stats,
        pump_shares: shares,
    })
}
