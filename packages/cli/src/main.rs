#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Command-line entry point for the cholera map.
//!
//! ```text
//! snow_map render [--config snow_map.toml] [--out site]
//! snow_map serve [--config snow_map.toml]
//! snow_map stats [--config snow_map.toml]
//! ```
//!
//! Running `snow_map` with no subcommand enters interactive mode.

mod interactive;

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use snow_map_pipeline::PipelineConfig;
use snow_map_pipeline::config::DEFAULT_CONFIG_FILE;
use snow_map_server::{DashboardOptions, ServeOptions, api_summary, write_failure, write_site};

#[derive(Parser)]
#[command(
    name = "snow_map",
    about = "Map the 1854 Broad Street cholera deaths and water pumps"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the map and write it as a static site
    Render {
        /// Config file
        #[arg(long, default_value = DEFAULT_CONFIG_FILE)]
        config: PathBuf,
        /// Output directory
        #[arg(long, default_value = "site")]
        out: PathBuf,
    },
    /// Build the map and serve it over HTTP
    Serve {
        /// Config file
        #[arg(long, default_value = DEFAULT_CONFIG_FILE)]
        config: PathBuf,
    },
    /// Print the death totals and pump shares as JSON
    Stats {
        /// Config file
        #[arg(long, default_value = DEFAULT_CONFIG_FILE)]
        config: PathBuf,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init_custom_env("RUST_LOG");
    let cli = Cli::parse();

    let Some(command) = cli.command else {
        return interactive::run();
    };

    match command {
        Commands::Render { config, out } => render(&config, &out)?,
        Commands::Serve { config } => serve(&config)?,
        Commands::Stats { config } => stats(&config)?,
    }

    Ok(())
}

fn load_config(path: &Path) -> Result<PipelineConfig, Box<dyn std::error::Error>> {
    log::debug!("Using config file {}", path.display());
    Ok(PipelineConfig::load_or_default(path)?)
}

/// Runs the pipeline and writes the site to `out`. On failure the site is
/// replaced by a failure page and the error is returned.
fn render(config: &Path, out: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(config)?;

    match snow_map_pipeline::run(&config) {
        Ok(bundle) => {
            let written = write_site(out, &bundle, &DashboardOptions::default())?;
            println!("Wrote {} files to {}", written.len(), out.display());
            println!(
                "Total deaths: {}, max at one location: {}",
                bundle.stats.total_deaths, bundle.stats.max_deaths_at_point
            );
            Ok(())
        }
        Err(e) => {
            let page = write_failure(out, &e)?;
            eprintln!("Map could not be built; wrote {}", page.display());
            Err(e.into())
        }
    }
}

/// Runs the pipeline and serves the dashboard until interrupted.
fn serve(config: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(config)?;

    actix_web::rt::System::new().block_on(snow_map_server::run_server(ServeOptions {
        config,
        ..ServeOptions::default()
    }))?;

    Ok(())
}

/// Runs the pipeline and prints its summary as JSON.
fn stats(config: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(config)?;
    let bundle = snow_map_pipeline::run(&config)?;

    println!("{}", serde_json::to_string_pretty(&api_summary(&bundle))?);

    Ok(())
}
