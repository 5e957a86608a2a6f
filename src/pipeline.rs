//! Pipeline Module
//! Load, clean and summarize one or many target columns.

use log::info;
use rayon::prelude::*;
use serde::Serialize;
use std::path::Path;
use thiserror::Error;

use crate::data::{
    clean_timeseries_with_report, load_dataset, load_targets, CleanError, CleanOptions,
    CleaningReport, EnergySeries, LoaderError,
};
use crate::stats::{summarize, SeriesSummary};

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Load(#[from] LoaderError),
    #[error("{target}: {source}")]
    Clean {
        target: String,
        #[source]
        source: CleanError,
    },
}

/// A cleaned series together with what cleaning did and its statistics.
#[derive(Debug, Clone, Serialize)]
pub struct PreparedSeries {
    #[serde(skip)]
    pub series: EnergySeries,
    pub report: CleaningReport,
    pub summary: SeriesSummary,
}

/// Load, clean and summarize a single target.
pub fn prepare(
    file_path: impl AsRef<Path>,
    target_col: &str,
    options: &CleanOptions,
) -> Result<PreparedSeries, PipelineError> {
    let raw = load_dataset(file_path, target_col)?;
    prepare_loaded(&raw, options)
}

/// Load every target from one read of the file, then clean them in parallel.
///
/// Results keep the order of `targets`.
pub fn prepare_all<S: AsRef<str>>(
    file_path: impl AsRef<Path>,
    targets: &[S],
    options: &CleanOptions,
) -> Result<Vec<PreparedSeries>, PipelineError> {
    let loaded = load_targets(file_path, targets)?;
    info!("Cleaning {} target(s)", loaded.len());

    // Use rayon for parallel computation
    loaded
        .par_iter()
        .map(|raw| prepare_loaded(raw, options))
        .collect()
}

fn prepare_loaded(
    raw: &EnergySeries,
    options: &CleanOptions,
) -> Result<PreparedSeries, PipelineError> {
    let (series, report) =
        clean_timeseries_with_report(raw, options).map_err(|source| PipelineError::Clean {
            target: raw.name().to_string(),
            source,
        })?;
    let summary = summarize(&series);

    Ok(PreparedSeries {
        series,
        report,
        summary,
    })
}
