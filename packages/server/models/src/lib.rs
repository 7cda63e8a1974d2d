#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! API response types for the cholera map server.
//!
//! These types are serialized to JSON for the REST API and for the
//! `summary.json` file of a rendered site. They are separate from the
//! pipeline types so the API contract can evolve on its own.

use serde::{Deserialize, Serialize};
use snow_map_analytics_models::{PumpShare, SummaryStats};
use snow_map_cholera_models::GeoPoint;

/// `GET /api/health` response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiHealth {
    /// Whether the server is up.
    pub healthy: bool,
    /// Whether the pipeline run behind the dashboard succeeded.
    pub pipeline_ok: bool,
    /// Server version.
    pub version: String,
}

/// One map layer as listed in the summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiLayer {
    /// Display name.
    pub name: String,
    /// Identifier used in `/api/layers/{slug}`.
    pub slug: String,
    /// Marker color.
    pub color: String,
    /// Number of points.
    pub points: usize,
}

/// A pump's share of the deaths, with its fraction precomputed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiPumpShare {
    #[serde(flatten)]
    pub share: PumpShare,
    /// Fraction of all deaths, `[0, 1]`.
    pub fraction: f64,
}

/// `GET /api/summary` response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiSummary {
    /// Map title.
    pub title: String,
    /// Initial map center.
    pub center: GeoPoint,
    /// Whether the center is the configured fallback rather than the
    /// death centroid.
    pub used_fallback_center: bool,
    /// Initial zoom level.
    pub zoom: u8,
    /// Extent of all points as `[west, south, east, north]`, if any.
    pub bounds: Option<[f64; 4]>,
    /// Death totals.
    pub stats: SummaryStats,
    /// Both layers, deaths first.
    pub layers: Vec<ApiLayer>,
    /// Deaths nearest to each pump.
    pub pump_shares: Vec<ApiPumpShare>,
}

/// Error body returned with non-2xx responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Human-readable message.
    pub error: String,
}

impl ApiError {
    #[must_use]
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}
