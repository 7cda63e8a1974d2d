#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Presents the cholera map.
//!
//! Renders a [`MapBundle`] as a self-contained Leaflet dashboard, writes it
//! to disk with its `GeoJSON` layers, or serves it over HTTP with a small
//! JSON API. When the pipeline fails, a failure page is shown in place of
//! the map.

mod handlers;
pub mod interactive;
pub mod render;
pub mod site;

use std::path::PathBuf;

use actix_cors::Cors;
use actix_web::{App, HttpServer, middleware, web};
use snow_map_layers::export::bounds;
use snow_map_pipeline::config::ServerConfig;
use snow_map_pipeline::{MapBundle, PipelineConfig, PipelineError};
use snow_map_server_models::{ApiLayer, ApiPumpShare, ApiSummary};

pub use render::{DashboardOptions, render_dashboard, render_failure};
pub use site::{write_failure, write_site};

/// Errors that can occur while presenting the map.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// A file could not be written.
    #[error("Failed to write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Output could not be serialized.
    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// The HTTP server failed to bind or stopped with an error.
    #[error("Server error: {0}")]
    Server(#[source] std::io::Error),
}

/// Shared application state: the outcome of one pipeline run and the page
/// rendered from it.
pub struct AppState {
    /// The bundle, or the error message of the failed run.
    pub outcome: Result<MapBundle, String>,
    /// Dashboard or failure page served at `/`.
    pub index_html: String,
}

impl AppState {
    /// Renders the index page for a pipeline outcome.
    #[must_use]
    pub fn new(outcome: Result<MapBundle, PipelineError>, options: &DashboardOptions) -> Self {
        match outcome {
            Ok(bundle) => Self {
                index_html: render_dashboard(&bundle, options),
                outcome: Ok(bundle),
            },
            Err(e) => {
                log::error!("Pipeline failed: {e}");
                Self {
                    index_html: render_failure(&e),
                    outcome: Err(e.to_string()),
                }
            }
        }
    }
}

/// Everything `serve` needs.
#[derive(Debug, Clone, Default)]
pub struct ServeOptions {
    /// Pipeline configuration, including the bind address.
    pub config: PipelineConfig,
    /// Page presentation settings.
    pub dashboard: DashboardOptions,
}

/// Builds the API view of a bundle.
#[must_use]
pub fn api_summary(bundle: &MapBundle) -> ApiSummary {
    let total = bundle.stats.total_deaths;

    ApiSummary {
        title: bundle.title.clone(),
        center: bundle.centroid,
        used_fallback_center: bundle.used_fallback_center,
        zoom: bundle.zoom,
        bounds: bounds(&bundle.layers).map(|rect| {
            [rect.min().x, rect.min().y, rect.max().x, rect.max().y]
        }),
        stats: bundle.stats,
        layers: bundle
            .layers
            .iter()
            .map(|layer| ApiLayer {
                name: layer.name.clone(),
                slug: layer.slug(),
                color: layer.style.color.clone(),
                points: layer.len(),
            })
            .collect(),
        pump_shares: bundle
            .pump_shares
            .iter()
            .map(|share| ApiPumpShare {
                share: *share,
                fraction: share.fraction_of(total),
            })
            .collect(),
    }
}

/// Runs the pipeline and starts the cholera map server.
///
/// A failed pipeline run does not stop the server: the failure page is
/// served instead of the dashboard. The bind address comes from the
/// config, overridden by `BIND_ADDR` and `PORT`. The caller provides the
/// async runtime.
///
/// # Errors
///
/// Returns [`ServerError::Server`] if the HTTP server fails to bind or
/// encounters a runtime error.
#[allow(clippy::future_not_send)]
pub async fn run_server(options: ServeOptions) -> Result<(), ServerError> {
    let ServerConfig { bind_addr, port } = options.config.server.clone().with_env_overrides();
    run_server_on(options, bind_addr, port).await
}

/// Like [`run_server`], with an explicit bind address and port.
///
/// # Errors
///
/// Same as [`run_server`].
#[allow(clippy::future_not_send)]
pub async fn run_server_on(
    options: ServeOptions,
    bind_addr: String,
    port: u16,
) -> Result<(), ServerError> {
    let outcome = snow_map_pipeline::run(&options.config);
    let state = web::Data::new(AppState::new(outcome, &options.dashboard));

    log::info!("Starting server on {bind_addr}:{port}");

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .configure(routes)
    })
    .bind((bind_addr, port))
    .map_err(ServerError::Server)?
    .run()
    .await
    .map_err(ServerError::Server)
}

fn routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .route("/health", web::get().to(handlers::health))
            .route("/summary", web::get().to(handlers::summary))
            .route("/layers/{slug}", web::get().to(handlers::layer)),
    )
    .route("/", web::get().to(handlers::index));
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{http::StatusCode, test as actix_test};
    use snow_map_cholera_models::{DeathRecord, PlanarPoint, PumpRecord};
    use snow_map_pipeline::run_with_records;
    use snow_map_server_models::{ApiError, ApiHealth};

    fn ok_state() -> web::Data<AppState> {
        let outcome = run_with_records(
            vec![
                DeathRecord::new(PlanarPoint::new(529_308.741, 181_031.352), 3),
                DeathRecord::new(PlanarPoint::new(529_312.164, 181_025.172), 2),
            ],
            vec![PumpRecord::new(PlanarPoint::new(529_396.539, 181_025.063))],
            &PipelineConfig::default(),
        );
        web::Data::new(AppState::new(outcome, &DashboardOptions::default()))
    }

    fn failed_state() -> web::Data<AppState> {
        let outcome = run_with_records(
            vec![DeathRecord::new(PlanarPoint::new(f64::NAN, 0.0), 1)],
            Vec::new(),
            &PipelineConfig::default(),
        );
        web::Data::new(AppState::new(outcome, &DashboardOptions::default()))
    }

    #[test]
    fn summary_lists_layers_and_bounds() {
        let state = ok_state();
        let summary = api_summary(state.outcome.as_ref().unwrap());

        assert_eq!(summary.layers[0].slug, "cholera-deaths");
        assert_eq!(summary.layers[0].points, 2);
        assert_eq!(summary.layers[1].slug, "water-pumps");
        assert!((summary.pump_shares[0].fraction - 1.0).abs() < 1e-12);

        let [west, south, east, north] = summary.bounds.unwrap();
        assert!(west < east);
        assert!(south <= north);
        assert!((-0.14..-0.13).contains(&west));
    }

    #[actix_web::test]
    async fn health_reports_pipeline_state() {
        let app =
            actix_test::init_service(App::new().app_data(failed_state()).configure(routes)).await;
        let req = actix_test::TestRequest::get().uri("/api/health").to_request();
        let health: ApiHealth = actix_test::call_and_read_body_json(&app, req).await;

        assert!(health.healthy);
        assert!(!health.pipeline_ok);
    }

    #[actix_web::test]
    async fn serves_dashboard_and_layers() {
        let app =
            actix_test::init_service(App::new().app_data(ok_state()).configure(routes)).await;

        let req = actix_test::TestRequest::get().uri("/").to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body = actix_test::read_body(resp).await;
        assert!(String::from_utf8_lossy(&body).contains("Cholera Death Map"));

        let req = actix_test::TestRequest::get()
            .uri("/api/layers/water-pumps")
            .to_request();
        let fc: serde_json::Value = actix_test::call_and_read_body_json(&app, req).await;
        assert_eq!(fc["type"], "FeatureCollection");
        assert_eq!(fc["features"].as_array().unwrap().len(), 1);

        let req = actix_test::TestRequest::get().uri("/api/layers/sewers").to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn failed_pipeline_is_reported() {
        let app =
            actix_test::init_service(App::new().app_data(failed_state()).configure(routes)).await;

        let req = actix_test::TestRequest::get().uri("/api/summary").to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let error: ApiError = actix_test::read_body_json(resp).await;
        assert!(error.error.contains("Failed to reproject deaths data"));

        let req = actix_test::TestRequest::get().uri("/").to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = actix_test::read_body(resp).await;
        assert!(String::from_utf8_lossy(&body).contains("The map could not be built"));
    }
}
