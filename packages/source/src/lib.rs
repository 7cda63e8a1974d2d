#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Loads the cholera death and water pump survey files.
//!
//! Both files are delimited text with a header row. Columns are located by
//! name through a single [`ColumnMapping`], so files that label the grid
//! coordinates `X`/`Y` (or anything else) are read without a separate
//! renaming pass.

pub mod parsing;

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use snow_map_cholera_models::{Dataset, DeathRecord, PlanarPoint, PumpRecord};

/// Errors that can occur while loading survey files.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// The file could not be opened.
    #[error("Failed to open {}: {source}", path.display())]
    Io {
        /// Path that failed to open.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The file is not well-formed delimited text.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// A required column is absent from the header row.
    #[error("Missing column '{column}' in {dataset} data (found: {found})")]
    MissingColumn {
        /// Dataset being read.
        dataset: Dataset,
        /// Column that was looked for.
        column: String,
        /// Comma-separated list of the headers that were present.
        found: String,
    },

    /// A cell could not be parsed.
    #[error("Invalid {column} value '{value}' in {dataset} record {index} (line {line})")]
    InvalidValue {
        /// Dataset being read.
        dataset: Dataset,
        /// Zero-based record index.
        index: usize,
        /// One-based line number in the file.
        line: u64,
        /// Column the cell belongs to.
        column: String,
        /// Raw cell content.
        value: String,
    },
}

/// Column names of the survey files.
///
/// Header matching ignores case and surrounding whitespace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnMapping {
    /// Grid easting column.
    pub easting: String,
    /// Grid northing column.
    pub northing: String,
    /// Death count column (deaths file only).
    pub count: String,
}

impl Default for ColumnMapping {
    fn default() -> Self {
        Self {
            easting: "X".to_string(),
            northing: "Y".to_string(),
            count: "Count".to_string(),
        }
    }
}

/// Reads survey records from delimited text.
#[derive(Debug, Clone)]
pub struct SurveyReader {
    columns: ColumnMapping,
    delimiter: u8,
}

impl Default for SurveyReader {
    fn default() -> Self {
        Self::new(ColumnMapping::default())
    }
}

/// Header positions resolved for one file.
struct ColumnIndices {
    easting: usize,
    northing: usize,
    count: Option<usize>,
}

impl SurveyReader {
    /// Creates a comma-delimited reader with the given column names.
    #[must_use]
    pub const fn new(columns: ColumnMapping) -> Self {
        Self {
            columns,
            delimiter: b',',
        }
    }

    /// Sets the field delimiter (e.g. `b'\t'` for TSV files).
    #[must_use]
    pub const fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Loads death records from a file.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] if the file cannot be opened or read, a
    /// required column is missing, or a cell cannot be parsed.
    pub fn load_deaths(&self, path: &Path) -> Result<Vec<DeathRecord>, SourceError> {
        let records = self.read_deaths(open(path)?)?;
        log::info!("Loaded {} death records from {}", records.len(), path.display());
        Ok(records)
    }

    /// Loads pump records from a file.
    ///
    /// # Errors
    ///
    /// Same as [`Self::load_deaths`].
    pub fn load_pumps(&self, path: &Path) -> Result<Vec<PumpRecord>, SourceError> {
        let records = self.read_pumps(open(path)?)?;
        log::info!("Loaded {} pump records from {}", records.len(), path.display());
        Ok(records)
    }

    /// Reads death records from any reader.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] if the input is malformed, a required column
    /// is missing, or a cell cannot be parsed.
    pub fn read_deaths<R: Read>(&self, reader: R) -> Result<Vec<DeathRecord>, SourceError> {
        self.read(reader, Dataset::Deaths, |position, count| {
            DeathRecord::new(position, count.unwrap_or_default())
        })
    }

    /// Reads pump records from any reader.
    ///
    /// # Errors
    ///
    /// Same as [`Self::read_deaths`].
    pub fn read_pumps<R: Read>(&self, reader: R) -> Result<Vec<PumpRecord>, SourceError> {
        self.read(reader, Dataset::Pumps, |position, _| PumpRecord::new(position))
    }

    fn read<R: Read, T>(
        &self,
        reader: R,
        dataset: Dataset,
        build: impl Fn(PlanarPoint, Option<u32>) -> T,
    ) -> Result<Vec<T>, SourceError> {
        let mut rdr = csv::ReaderBuilder::new()
            .delimiter(self.delimiter)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = rdr.headers()?.clone();
        let indices = self.resolve_columns(&headers, dataset)?;

        let mut records = Vec::new();
        for (index, result) in rdr.records().enumerate() {
            let row = result?;
            let line = row.position().map_or(0, csv::Position::line);
            let invalid = |column: &str, value: &str| SourceError::InvalidValue {
                dataset,
                index,
                line,
                column: column.to_string(),
                value: value.to_string(),
            };

            let easting_raw = row.get(indices.easting).unwrap_or_default();
            let easting = parsing::parse_coordinate(easting_raw)
                .ok_or_else(|| invalid(&self.columns.easting, easting_raw))?;

            let northing_raw = row.get(indices.northing).unwrap_or_default();
            let northing = parsing::parse_coordinate(northing_raw)
                .ok_or_else(|| invalid(&self.columns.northing, northing_raw))?;

            let count = match indices.count {
                Some(idx) => {
                    let raw = row.get(idx).unwrap_or_default();
                    Some(
                        parsing::parse_count(raw)
                            .ok_or_else(|| invalid(&self.columns.count, raw))?,
                    )
                }
                None => None,
            };

            records.push(build(PlanarPoint::new(easting, northing), count));
        }

        log::debug!("Parsed {} {dataset} rows", records.len());
        Ok(records)
    }

    fn resolve_columns(
        &self,
        headers: &csv::StringRecord,
        dataset: Dataset,
    ) -> Result<ColumnIndices, SourceError> {
        let find = |column: &str| -> Result<usize, SourceError> {
            headers
                .iter()
                .position(|h| h.trim().eq_ignore_ascii_case(column.trim()))
                .ok_or_else(|| SourceError::MissingColumn {
                    dataset,
                    column: column.to_string(),
                    found: headers.iter().collect::<Vec<_>>().join(", "),
                })
        };

        Ok(ColumnIndices {
            easting: find(&self.columns.easting)?,
            northing: find(&self.columns.northing)?,
            count: match dataset {
                Dataset::Deaths => Some(find(&self.columns.count)?),
                Dataset::Pumps => None,
            },
        })
    }
}

fn open(path: &Path) -> Result<File, SourceError> {
    File::open(path).map_err(|source| SourceError::Io {
        path: path.to_path_buf(),
        source,
    })
}
