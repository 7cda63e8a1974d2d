//! Static output: the dashboard and its data written to a directory.

use std::path::{Path, PathBuf};

use snow_map_layers::export::to_geojson_string;
use snow_map_pipeline::MapBundle;

use crate::render::{DashboardOptions, render_dashboard, render_failure};
use crate::{ServerError, api_summary};

/// Writes `index.html`, `deaths.geojson`, `pumps.geojson` and
/// `summary.json` into `dir`, creating it if needed. Returns the paths
/// written.
///
/// # Errors
///
/// Returns [`ServerError`] if a file cannot be written or serialized.
pub fn write_site(
    dir: &Path,
    bundle: &MapBundle,
    options: &DashboardOptions,
) -> Result<Vec<PathBuf>, ServerError> {
    create_dir(dir)?;

    let summary = serde_json::to_string_pretty(&api_summary(bundle))?;
    let files = [
        ("index.html", render_dashboard(bundle, options)),
        ("deaths.geojson", to_geojson_string(bundle.deaths_layer())?),
        ("pumps.geojson", to_geojson_string(bundle.pumps_layer())?),
        ("summary.json", summary),
    ];

    let mut written = Vec::with_capacity(files.len());
    for (name, content) in files {
        written.push(write_file(dir, name, &content)?);
    }

    log::info!("Wrote {} files to {}", written.len(), dir.display());

    Ok(written)
}

/// Writes only a failure `index.html` into `dir`, so a stale map from an
/// earlier run is not left behind.
///
/// # Errors
///
/// Returns [`ServerError::Io`] if the file cannot be written.
pub fn write_failure(dir: &Path, error: &dyn std::error::Error) -> Result<PathBuf, ServerError> {
    create_dir(dir)?;
    for stale in ["deaths.geojson", "pumps.geojson", "summary.json"] {
        let path = dir.join(stale);
        if path.exists() {
            std::fs::remove_file(&path).map_err(|source| ServerError::Io { path, source })?;
        }
    }
    write_file(dir, "index.html", &render_failure(error))
}

fn create_dir(dir: &Path) -> Result<(), ServerError> {
    std::fs::create_dir_all(dir).map_err(|source| ServerError::Io {
        path: dir.to_path_buf(),
        source,
    })
}

fn write_file(dir: &Path, name: &str, content: &str) -> Result<PathBuf, ServerError> {
    let path = dir.join(name);
    std::fs::write(&path, content).map_err(|source| ServerError::Io {
        path: path.clone(),
        source,
    })?;
    log::debug!("Wrote {}", path.display());
    Ok(path)
}
