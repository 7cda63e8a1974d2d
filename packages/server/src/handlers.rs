//! HTTP handler functions for the cholera map API.

use actix_web::{HttpResponse, http::header::ContentType, web};
use snow_map_layers::export::to_feature_collection;
use snow_map_server_models::{ApiError, ApiHealth};

use crate::{AppState, api_summary};

/// `GET /api/health`
pub async fn health(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(ApiHealth {
        healthy: true,
        pipeline_ok: state.outcome.is_ok(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// `GET /api/summary`
///
/// Returns the headline numbers, layer list, and pump shares, or 500 with
/// the pipeline error.
pub async fn summary(state: web::Data<AppState>) -> HttpResponse {
    match &state.outcome {
        Ok(bundle) => HttpResponse::Ok().json(api_summary(bundle)),
        Err(e) => HttpResponse::InternalServerError().json(ApiError::new(e.as_str())),
    }
}

/// `GET /api/layers/{slug}`
///
/// Returns one layer as a `GeoJSON` `FeatureCollection`.
pub async fn layer(state: web::Data<AppState>, slug: web::Path<String>) -> HttpResponse {
    let bundle = match &state.outcome {
        Ok(bundle) => bundle,
        Err(e) => return HttpResponse::InternalServerError().json(ApiError::new(e.as_str())),
    };

    match bundle.layer(&slug) {
        Some(layer) => HttpResponse::Ok().json(to_feature_collection(layer)),
        None => {
            log::debug!("Unknown layer '{slug}'");
            HttpResponse::NotFound().json(ApiError::new(format!("Unknown layer '{slug}'")))
        }
    }
}

/// `GET /`
///
/// The dashboard, or the failure page if the pipeline failed.
pub async fn index(state: web::Data<AppState>) -> HttpResponse {
    let mut response = if state.outcome.is_ok() {
        HttpResponse::Ok()
    } else {
        HttpResponse::InternalServerError()
    };

    response
        .content_type(ContentType::html())
        .body(state.index_html.clone())
}
