//! Energy Prep - Hourly energy time series loading & cleaning
//!
//! Loads a target column from an hourly energy CSV (PJM layout: `Datetime`
//! plus one column per region) and cleans it onto a continuous hourly grid.

pub mod config;
pub mod data;
pub mod pipeline;
pub mod stats;

pub use config::{ConfigError, PrepConfig};
pub use data::{
    clean_timeseries, clean_timeseries_with_report, load_dataset, load_targets, save_csv,
    CleanError, CleanOptions, CleaningReport, EnergySeries, ExportError, FillMethod, LoaderError,
    DEFAULT_TARGET,
};
pub use pipeline::{prepare, prepare_all, PipelineError, PreparedSeries};
pub use stats::{quantile, summarize, SeriesSummary};
