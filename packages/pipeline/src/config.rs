//! TOML configuration of the cholera map.
//!
//! Every field has a default, so an empty file describes a complete run:
//! `Cholera_Deaths.csv` and `Pumps.csv` next to the config file, British
//! National Grid to WGS84, Broad Street as the fallback center.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use snow_map_cholera_models::GeoPoint;
use snow_map_layers_models::LayerStyles;
use snow_map_source::{ColumnMapping, SurveyReader};

/// Default config file name, looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "snow_map.toml";

/// Errors that can occur while loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The config file exists but could not be read.
    #[error("Failed to read config file {}: {source}", path.display())]
    Io {
        /// Path of the config file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The config file is not valid TOML for [`PipelineConfig`].
    #[error("Failed to parse config file {}: {source}", path.display())]
    Toml {
        /// Path of the config file.
        path: PathBuf,
        /// Underlying parse error.
        #[source]
        source: toml::de::Error,
    },

    /// The field delimiter is not a single ASCII character.
    #[error("Delimiter '{0}' is not a single ASCII character")]
    InvalidDelimiter(char),

    /// The fallback center is not a longitude/latitude pair in range.
    #[error("Fallback center ({longitude}, {latitude}) is not a valid longitude/latitude")]
    InvalidFallbackCenter { longitude: f64, latitude: f64 },
}

/// Complete configuration of one pipeline run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Input files and their column names.
    pub data: DataConfig,
    /// Coordinate reference systems.
    pub projection: ProjectionConfig,
    /// Map framing and title.
    pub map: MapConfig,
    /// Marker styles of the two layers.
    pub styles: LayerStyles,
    /// HTTP server settings for `serve`.
    pub server: ServerConfig,
}

/// Input survey files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// Death records file.
    pub deaths: PathBuf,
    /// Pump records file.
    pub pumps: PathBuf,
    /// Field delimiter of both files.
    pub delimiter: char,
    /// Column names shared by both files.
    pub columns: ColumnMapping,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            deaths: PathBuf::from("Cholera_Deaths.csv"),
            pumps: PathBuf::from("Pumps.csv"),
            delimiter: ',',
            columns: ColumnMapping::default(),
        }
    }
}

impl DataConfig {
    /// Builds a reader for the configured delimiter and columns.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidDelimiter`] if the delimiter is not
    /// ASCII.
    pub fn reader(&self) -> Result<SurveyReader, ConfigError> {
        let delimiter = u8::try_from(self.delimiter)
            .ok()
            .filter(u8::is_ascii)
            .ok_or(ConfigError::InvalidDelimiter(self.delimiter))?;

        Ok(SurveyReader::new(self.columns.clone()).with_delimiter(delimiter))
    }
}

/// Source and target coordinate reference system codes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectionConfig {
    pub source: String,
    pub target: String,
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self {
            source: "EPSG:27700".to_string(),
            target: "EPSG:4326".to_string(),
        }
    }
}

/// Map title and framing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    /// Title shown above the map.
    pub title: String,
    /// Initial zoom level.
    pub zoom: u8,
    /// `[longitude, latitude]` used when there are no death records.
    pub fallback_center: Option<[f64; 2]>,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            title: "Cholera Death Map".to_string(),
            zoom: 16,
            fallback_center: Some([-0.1366, 51.5133]),
        }
    }
}

impl MapConfig {
    /// The fallback center as a geographic point.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidFallbackCenter`] if the longitude is
    /// outside [-180, 180] or the latitude outside [-90, 90].
    pub fn fallback_center(&self) -> Result<Option<GeoPoint>, ConfigError> {
        self.fallback_center
            .map(|[longitude, latitude]| {
                let point = GeoPoint::new(longitude, latitude);
                if point.is_valid() {
                    Ok(point)
                } else {
                    Err(ConfigError::InvalidFallbackCenter {
                        longitude,
                        latitude,
                    })
                }
            })
            .transpose()
    }
}

/// HTTP server bind settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

impl ServerConfig {
    /// Applies the `BIND_ADDR` and `PORT` environment variables.
    #[must_use]
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(std::env::var("BIND_ADDR").ok(), std::env::var("PORT").ok())
    }

    /// Replaces the bind address and port with the given values when they
    /// are present. An unparseable port is ignored.
    #[must_use]
    pub fn with_overrides(mut self, bind_addr: Option<String>, port: Option<String>) -> Self {
        if let Some(bind_addr) = bind_addr.filter(|s| !s.trim().is_empty()) {
            self.bind_addr = bind_addr;
        }
        if let Some(raw) = port {
            match raw.trim().parse() {
                Ok(port) => self.port = port,
                Err(_) => log::warn!("Ignoring invalid PORT value '{raw}'"),
            }
        }
        self
    }
}

impl PipelineConfig {
    /// Parses a config from TOML text without resolving paths.
    ///
    /// # Errors
    ///
    /// Returns [`toml::de::Error`] if the text is not a valid config.
    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Loads a config file and resolves relative data paths against the
    /// directory that contains it.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read or parsed.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&content).map_err(|source| ConfigError::Toml {
            path: path.to_path_buf(),
            source,
        })?;

        log::debug!("Loaded config from {}", path.display());

        Ok(config.resolve_paths(path.parent().unwrap_or_else(|| Path::new(""))))
    }

    /// Like [`Self::load_from_file`], but a missing file yields the
    /// defaults, resolved against the directory the file would be in.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file exists but cannot be read or
    /// parsed.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::load_from_file(path)
        } else {
            log::info!(
                "Config file {} not found, using defaults",
                path.display()
            );
            Ok(Self::default().resolve_paths(path.parent().unwrap_or_else(|| Path::new(""))))
        }
    }

    /// Makes relative data paths relative to `base`.
    #[must_use]
    pub fn resolve_paths(mut self, base: &Path) -> Self {
        if self.data.deaths.is_relative() {
            self.data.deaths = base.join(&self.data.deaths);
        }
        if self.data.pumps.is_relative() {
            self.data.pumps = base.join(&self.data.pumps);
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_is_all_defaults() {
        let config = PipelineConfig::from_toml_str("").unwrap();

        assert_eq!(config, PipelineConfig::default());
        assert_eq!(config.projection.source, "EPSG:27700");
        assert_eq!(config.projection.target, "EPSG:4326");
        assert_eq!(config.data.columns.easting, "X");
        assert_eq!(config.map.zoom, 16);
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.styles.deaths.color, "red");
    }

    #[test]
    fn sample_config_matches_defaults() {
        let config = PipelineConfig::from_toml_str(include_str!("../../../snow_map.toml")).unwrap();
        assert_eq!(config, PipelineConfig::default());
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config = PipelineConfig::from_toml_str(
            r#"
            [data]
            deaths = "deaths.tsv"
            delimiter = "\t"

            [data.columns]
            easting = "COORD_X"

            [map]
            title = "Soho, 1854"

            [styles.pumps]
            color = "darkblue"
            "#,
        )
        .unwrap();

        assert_eq!(config.data.deaths, PathBuf::from("deaths.tsv"));
        assert_eq!(config.data.pumps, PathBuf::from("Pumps.csv"));
        assert_eq!(config.data.delimiter, '\t');
        assert_eq!(config.data.columns.easting, "COORD_X");
        assert_eq!(config.data.columns.northing, "Y");
        assert_eq!(config.map.title, "Soho, 1854");
        assert_eq!(config.map.zoom, 16);
        assert_eq!(config.styles.pumps.color, "darkblue");
        assert_eq!(config.styles.pumps.icon, "tint");
    }

    #[test]
    fn unknown_type_is_rejected() {
        assert!(PipelineConfig::from_toml_str("[map]\nzoom = \"close\"").is_err());
    }

    #[test]
    fn relative_paths_resolve_against_config_dir() {
        let dir = std::env::temp_dir().join("snow_map_config_relative");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("snow_map.toml");
        std::fs::write(
            &path,
            "[data]\ndeaths = \"in/deaths.csv\"\npumps = \"/abs/pumps.csv\"\n",
        )
        .unwrap();

        let config = PipelineConfig::load_from_file(&path).unwrap();

        assert_eq!(config.data.deaths, dir.join("in/deaths.csv"));
        assert_eq!(config.data.pumps, PathBuf::from("/abs/pumps.csv"));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let dir = std::env::temp_dir().join("snow_map_config_missing");
        let config = PipelineConfig::load_or_default(&dir.join("snow_map.toml")).unwrap();

        assert_eq!(config.data.deaths, dir.join("Cholera_Deaths.csv"));
        assert!(matches!(
            PipelineConfig::load_from_file(&dir.join("snow_map.toml")),
            Err(ConfigError::Io { .. })
        ));
    }

    #[test]
    fn delimiter_must_be_ascii() {
        let data = DataConfig {
            delimiter: '§',
            ..DataConfig::default()
        };
        assert!(matches!(
            data.reader(),
            Err(ConfigError::InvalidDelimiter('§'))
        ));
        assert!(DataConfig::default().reader().is_ok());
    }

    #[test]
    fn server_overrides() {
        let server = ServerConfig::default()
            .with_overrides(Some("0.0.0.0".to_string()), Some("9000".to_string()));
        assert_eq!(server.bind_addr, "0.0.0.0");
        assert_eq!(server.port, 9000);

        let server = ServerConfig::default().with_overrides(None, Some("not-a-port".to_string()));
        assert_eq!(server, ServerConfig::default());
    }

    #[test]
    fn fallback_center_is_lon_lat() {
        let center = MapConfig::default().fallback_center().unwrap().unwrap();
        assert!((center.longitude - -0.1366).abs() < 1e-12);
        assert!((center.latitude - 51.5133).abs() < 1e-12);
    }

    #[test]
    fn out_of_range_fallback_center_is_rejected() {
        let config =
            PipelineConfig::from_toml_str("[map]\nfallback_center = [200.0, 95.0]").unwrap();

        assert!(matches!(
            config.map.fallback_center(),
            Err(ConfigError::InvalidFallbackCenter { longitude, latitude })
                if (longitude - 200.0).abs() < 1e-12 && (latitude - 95.0).abs() < 1e-12
        ));

        let edge = MapConfig {
            fallback_center: Some([-180.0, 90.0]),
            ..MapConfig::default()
        };
        assert!(edge.fallback_center().unwrap().is_some());

        let none = MapConfig {
            fallback_center: None,
            ..MapConfig::default()
        };
        assert_eq!(none.fallback_center().unwrap(), None);
    }
}
