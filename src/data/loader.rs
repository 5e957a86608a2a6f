//! CSV Data Loader Module
//! Reads hourly energy CSVs with Polars and extracts time-indexed target columns.

use chrono::{NaiveDate, NaiveDateTime};
use log::{debug, info};
use polars::prelude::*;
use std::path::{Path, PathBuf};
use thiserror::Error;

use super::series::{EnergySeries, DATETIME_COL};

/// Target column used when none is given.
pub const DEFAULT_TARGET: &str = "PJME";

const DATETIME_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"];

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("Dataset not found at {}", .0.display())]
    NotFound(PathBuf),
    #[error("Column '{column}' not found in dataset. Available: {available:?}")]
    MissingColumn {
        column: String,
        available: Vec<String>,
    },
    #[error("Row {row}: cannot parse '{value}' as a timestamp")]
    InvalidTimestamp { row: usize, value: String },
    #[error("Failed to load CSV: {0}")]
    Csv(#[from] PolarsError),
}

impl LoaderError {
    /// The path did not point at an existing file.
    pub fn is_not_found(&self) -> bool {
        matches!(self, LoaderError::NotFound(_))
    }

    /// The file was readable but its content failed validation.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            LoaderError::MissingColumn { .. } | LoaderError::InvalidTimestamp { .. }
        )
    }
}

/// Load one target column from an hourly energy CSV.
///
/// The returned series keeps file order; rows with a missing target value or
/// an empty `Datetime` are dropped.
pub fn load_dataset(
    file_path: impl AsRef<Path>,
    target_col: &str,
) -> Result<EnergySeries, LoaderError> {
    let df = read_csv(file_path.as_ref())?;
    let timestamps = parse_timestamps(&df)?;
    extract_target(&df, &timestamps, target_col)
}

/// Load several target columns from a single read of the file.
pub fn load_targets<S: AsRef<str>>(
    file_path: impl AsRef<Path>,
    targets: &[S],
) -> Result<Vec<EnergySeries>, LoaderError> {
    let df = read_csv(file_path.as_ref())?;
    let timestamps = parse_timestamps(&df)?;

    targets
        .iter()
        .map(|target| extract_target(&df, &timestamps, target.as_ref()))
        .collect()
}

/// Read the raw CSV into a DataFrame.
fn read_csv(file_path: &Path) -> Result<DataFrame, LoaderError> {
    if !file_path.is_file() {
        return Err(LoaderError::NotFound(file_path.to_path_buf()));
    }

    // Infer over every row: a value column can switch from integers to
    // decimals deep into a multi-year file.
    let df = LazyCsvReader::new(file_path)
        .with_infer_schema_length(None)
        .with_ignore_errors(true)
        .finish()?
        .collect()?;

    info!(
        "Read {} rows x {} columns from {}",
        df.height(),
        df.width(),
        file_path.display()
    );
    Ok(df)
}

/// Value column names, i.e. everything except the `Datetime` index.
fn column_names(df: &DataFrame) -> Vec<String> {
    df.get_column_names()
        .iter()
        .filter(|s| s.as_str() != DATETIME_COL)
        .map(|s| s.to_string())
        .collect()
}

fn require_column<'a>(df: &'a DataFrame, name: &str) -> Result<&'a Column, LoaderError> {
    df.column(name).map_err(|_| LoaderError::MissingColumn {
        column: name.to_string(),
        available: column_names(df),
    })
}

/// Parse the `Datetime` column. Empty cells become `None`.
fn parse_timestamps(df: &DataFrame) -> Result<Vec<Option<NaiveDateTime>>, LoaderError> {
    let raw = require_column(df, DATETIME_COL)?.cast(&DataType::String)?;
    let ca = raw.as_materialized_series().str()?;

    ca.into_iter()
        .enumerate()
        .map(|(row, cell)| match cell.map(str::trim) {
            None | Some("") => Ok(None),
            Some(text) => parse_datetime(text)
                .map(Some)
                .ok_or_else(|| LoaderError::InvalidTimestamp {
                    row,
                    value: text.to_string(),
                }),
        })
        .collect()
}

/// Parse a timestamp in one of the layouts found in PJM exports.
pub fn parse_datetime(text: &str) -> Option<NaiveDateTime> {
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(text, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

fn extract_target(
    df: &DataFrame,
    timestamps: &[Option<NaiveDateTime>],
    target_col: &str,
) -> Result<EnergySeries, LoaderError> {
    let value_series = require_column(df, target_col)?;
    let value_f64 = value_series.cast(&DataType::Float64)?;
    let value_ca = value_f64.f64()?;

    let mut points = Vec::with_capacity(df.height());
    let mut dropped_values = 0usize;
    let mut dropped_timestamps = 0usize;

    for (ts, value) in timestamps.iter().zip(value_ca.into_iter()) {
        match (ts, value) {
            (Some(ts), Some(v)) if !v.is_nan() => points.push((*ts, v)),
            (None, _) => dropped_timestamps += 1,
            _ => dropped_values += 1,
        }
    }

    if dropped_values > 0 || dropped_timestamps > 0 {
        debug!(
            "{target_col}: dropped {dropped_values} rows without a value and {dropped_timestamps} rows without a timestamp"
        );
    }

    Ok(EnergySeries::from_points(target_col, points))
}
