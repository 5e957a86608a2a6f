//! Time Series Cleaner Module
//! Deduplicates, reindexes to an hourly grid, fills gaps and clips outliers.

use chrono::{NaiveDateTime, TimeDelta};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use super::series::EnergySeries;
use crate::stats::quantile;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CleanError {
    #[error("Invalid fill method '{0}'. Use 'interpolate' or 'ffill'")]
    InvalidFillMethod(String),
    #[error("Invalid quantile range [{lower}, {upper}]: need 0 <= lower <= upper <= 1")]
    InvalidQuantiles { lower: f64, upper: f64 },
    #[error("Cannot clean an empty series")]
    EmptySeries,
}

/// How gaps introduced by reindexing are filled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum FillMethod {
    /// Linear interpolation weighted by elapsed time
    #[default]
    Interpolate,
    /// Carry the last observed value forward
    ForwardFill,
}

impl FillMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            FillMethod::Interpolate => "interpolate",
            FillMethod::ForwardFill => "ffill",
        }
    }
}

impl fmt::Display for FillMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FillMethod {
    type Err = CleanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "interpolate" => Ok(FillMethod::Interpolate),
            "ffill" => Ok(FillMethod::ForwardFill),
            other => Err(CleanError::InvalidFillMethod(other.to_string())),
        }
    }
}

impl TryFrom<String> for FillMethod {
    type Error = CleanError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<FillMethod> for String {
    fn from(method: FillMethod) -> Self {
        method.as_str().to_string()
    }
}

/// Cleaning parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CleanOptions {
    pub fill_method: FillMethod,
    pub clip_outliers: bool,
    pub lower_quantile: f64,
    pub upper_quantile: f64,
}

impl Default for CleanOptions {
    fn default() -> Self {
        Self {
            fill_method: FillMethod::Interpolate,
            clip_outliers: true,
            lower_quantile: 0.01,
            upper_quantile: 0.99,
        }
    }
}

impl CleanOptions {
    /// Default options with the fill method given by name.
    pub fn with_method(method: &str) -> Result<Self, CleanError> {
        Ok(Self {
            fill_method: method.parse()?,
            ..Self::default()
        })
    }

    fn validate(&self) -> Result<(), CleanError> {
        let (lower, upper) = (self.lower_quantile, self.upper_quantile);
        let in_unit = |q: f64| q.is_finite() && (0.0..=1.0).contains(&q);
        if in_unit(lower) && in_unit(upper) && lower <= upper {
            Ok(())
        } else {
            Err(CleanError::InvalidQuantiles { lower, upper })
        }
    }
}

/// What a cleaning pass changed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CleaningReport {
    pub input_rows: usize,
    pub duplicates_merged: usize,
    pub off_grid_dropped: usize,
    pub gaps_filled: usize,
    pub clip_bounds: Option<(f64, f64)>,
    pub clipped_low: usize,
    pub clipped_high: usize,
    pub output_rows: usize,
}

/// Clean a loaded series. See [`clean_timeseries_with_report`].
pub fn clean_timeseries(
    series: &EnergySeries,
    options: &CleanOptions,
) -> Result<EnergySeries, CleanError> {
    clean_timeseries_with_report(series, options).map(|(cleaned, _)| cleaned)
}

/// Clean a loaded series and report what was changed.
///
/// The output is hourly contiguous from the earliest to the latest input
/// timestamp and holds no NaN values.
pub fn clean_timeseries_with_report(
    series: &EnergySeries,
    options: &CleanOptions,
) -> Result<(EnergySeries, CleaningReport), CleanError> {
    options.validate()?;
    if series.is_empty() {
        return Err(CleanError::EmptySeries);
    }

    let mut report = CleaningReport {
        input_rows: series.len(),
        ..CleaningReport::default()
    };

    let deduped = average_duplicates(series);
    report.duplicates_merged = series.len() - deduped.len();

    let (grid, mut values, off_grid) = reindex_hourly(&deduped);
    report.off_grid_dropped = off_grid;
    report.gaps_filled = values.iter().filter(|v| v.is_none()).count();

    let mut filled = match options.fill_method {
        FillMethod::Interpolate => interpolate_time(&grid, &mut values),
        FillMethod::ForwardFill => forward_fill(&values),
    };

    if options.clip_outliers {
        let low = quantile(&filled, options.lower_quantile);
        let high = quantile(&filled, options.upper_quantile);
        for v in filled.iter_mut() {
            if *v < low {
                *v = low;
                report.clipped_low += 1;
            } else if *v > high {
                *v = high;
                report.clipped_high += 1;
            }
        }
        report.clip_bounds = Some((low, high));
    }

    report.output_rows = filled.len();
    info!(
        "{}: {} -> {} rows ({} duplicates merged, {} gaps filled by {}, {} clipped)",
        series.name(),
        report.input_rows,
        report.output_rows,
        report.duplicates_merged,
        report.gaps_filled,
        options.fill_method,
        report.clipped_low + report.clipped_high
    );

    let cleaned = EnergySeries::from_points(series.name(), grid.into_iter().zip(filled));
    Ok((cleaned, report))
}

/// Average rows sharing a timestamp; output is sorted by time.
fn average_duplicates(series: &EnergySeries) -> Vec<(NaiveDateTime, f64)> {
    let mut buckets: BTreeMap<NaiveDateTime, (f64, usize)> = BTreeMap::new();
    for (ts, v) in series.points() {
        let entry = buckets.entry(ts).or_insert((0.0, 0));
        entry.0 += v;
        entry.1 += 1;
    }

    buckets
        .into_iter()
        .map(|(ts, (sum, count))| (ts, sum / count as f64))
        .collect()
}

/// Lay sorted, unique points onto the hourly grid starting at the first point.
///
/// Returns the grid, the value at each grid slot (`None` for gaps) and the
/// number of points that fell between grid slots.
fn reindex_hourly(
    points: &[(NaiveDateTime, f64)],
) -> (Vec<NaiveDateTime>, Vec<Option<f64>>, usize) {
    let (Some(&(start, _)), Some(&(end, _))) = (points.first(), points.last()) else {
        return (Vec::new(), Vec::new(), 0);
    };

    let hour = TimeDelta::hours(1);
    let slots = ((end - start).num_hours() + 1) as usize;
    let grid: Vec<NaiveDateTime> = (0..slots).map(|i| start + hour * i as i32).collect();
    let mut values = vec![None; slots];
    let mut off_grid = 0usize;

    for &(ts, v) in points {
        let offset = ts - start;
        if offset.num_seconds() % 3600 != 0 || offset.subsec_nanos() != 0 {
            off_grid += 1;
            continue;
        }
        values[offset.num_hours() as usize] = Some(v);
    }

    if off_grid > 0 {
        debug!("{off_grid} points were not on the hourly grid and were dropped");
    }
    (grid, values, off_grid)
}

/// Fill interior gaps by linear interpolation over elapsed time.
///
/// Leading gaps keep the first known value and trailing gaps the last one.
fn interpolate_time(grid: &[NaiveDateTime], values: &mut [Option<f64>]) -> Vec<f64> {
    let known: Vec<usize> = (0..values.len()).filter(|&i| values[i].is_some()).collect();

    for pair in known.windows(2) {
        let (left, right) = (pair[0], pair[1]);
        if right - left < 2 {
            continue;
        }
        let (v0, v1) = match (values[left], values[right]) {
            (Some(a), Some(b)) => (a, b),
            _ => continue,
        };
        let span = (grid[right] - grid[left]).num_seconds() as f64;
        for i in left + 1..right {
            let frac = (grid[i] - grid[left]).num_seconds() as f64 / span;
            values[i] = Some(v0 + (v1 - v0) * frac);
        }
    }

    let first = known.first().and_then(|&i| values[i]).unwrap_or(f64::NAN);
    forward_fill(values)
        .into_iter()
        .map(|v| if v.is_nan() { first } else { v })
        .collect()
}

/// Fill gaps with the previous known value. Leading gaps stay NaN.
fn forward_fill(values: &[Option<f64>]) -> Vec<f64> {
    let mut last = None;
    values
        .iter()
        .map(|v| {
            if v.is_some() {
                last = *v;
            }
            last.unwrap_or(f64::NAN)
        })
        .collect()
}
