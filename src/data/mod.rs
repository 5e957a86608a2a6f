//! Data module - CSV loading, cleaning and export

mod cleaner;
mod export;
mod loader;
mod series;

pub use cleaner::{
    clean_timeseries, clean_timeseries_with_report, CleanError, CleanOptions, CleaningReport,
    FillMethod,
};
pub use export::{save_csv, ExportError};
pub use loader::{load_dataset, load_targets, parse_datetime, LoaderError, DEFAULT_TARGET};
pub use series::{EnergySeries, DATETIME_COL};
