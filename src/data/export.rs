//! CSV Export Module
//! Writes cleaned series back to disk in the same layout they are loaded from.

use log::info;
use polars::prelude::*;
use std::fs::{self, File};
use std::path::Path;
use thiserror::Error;

use super::series::{EnergySeries, DATETIME_COL};

const EXPORT_DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to write CSV: {0}")]
    Csv(#[from] PolarsError),
}

/// Write `Datetime,<name>` rows to `path`, creating parent directories.
pub fn save_csv(series: &EnergySeries, path: impl AsRef<Path>) -> Result<(), ExportError> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let stamps: Vec<String> = series
        .timestamps()
        .iter()
        .map(|ts| ts.format(EXPORT_DATETIME_FORMAT).to_string())
        .collect();

    let mut df = DataFrame::new(vec![
        Column::new(DATETIME_COL.into(), stamps),
        Column::new(series.name().into(), series.values().to_vec()),
    ])?;

    let mut file = File::create(path)?;
    CsvWriter::new(&mut file)
        .include_header(true)
        .finish(&mut df)?;

    info!("Wrote {} rows to {}", df.height(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{clean_timeseries, load_dataset, CleanOptions, FillMethod};
    use std::fs;

    #[test]
    fn exported_csv_loads_back() {
        let dir = tempfile::tempdir().unwrap();
        let raw = dir.path().join("raw.csv");
        fs::write(
            &raw,
            "Datetime,PJME\n\
             2016-05-01 03:00:00,25000.0\n\
             2016-05-01 00:00:00,26000.0\n\
             2016-05-01 00:00:00,26200.0\n",
        )
        .unwrap();

        let loaded = load_dataset(&raw, "PJME").unwrap();
        let options = CleanOptions {
            fill_method: FillMethod::ForwardFill,
            clip_outliers: false,
            ..CleanOptions::default()
        };
        let cleaned = clean_timeseries(&loaded, &options).unwrap();

        let out = dir.path().join("nested").join("PJME_clean.csv");
        save_csv(&cleaned, &out).unwrap();

        let text = fs::read_to_string(&out).unwrap();
        assert!(text.starts_with("Datetime,PJME\n2016-05-01 00:00:00,26100"));

        let reloaded = load_dataset(&out, "PJME").unwrap();
        assert_eq!(reloaded.len(), 4);
        assert!(reloaded.is_hourly_contiguous());
        assert_eq!(reloaded.timestamps(), cleaned.timestamps());
        assert_eq!(reloaded.values(), cleaned.values());
    }
}
