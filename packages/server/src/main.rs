#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Standalone cholera map server.
//!
//! Reads `snow_map.toml` (or the path in `SNOW_MAP_CONFIG`) from the
//! working directory and serves the dashboard.

use std::path::PathBuf;

use snow_map_pipeline::PipelineConfig;
use snow_map_pipeline::config::DEFAULT_CONFIG_FILE;
use snow_map_server::{ServeOptions, run_server};

#[actix_web::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init_custom_env("RUST_LOG");

    let path = std::env::var("SNOW_MAP_CONFIG")
        .map_or_else(|_| PathBuf::from(DEFAULT_CONFIG_FILE), PathBuf::from);
    let config = PipelineConfig::load_or_default(&path)?;

    run_server(ServeOptions {
        config,
        ..ServeOptions::default()
    })
    .await?;

    Ok(())
}
