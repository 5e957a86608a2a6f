//! Energy Series Module
//! The time-indexed, single-column series passed between loader and cleaner.

use chrono::{NaiveDateTime, TimeDelta};
use polars::prelude::*;

/// Name of the timestamp column, both in source CSVs and in exported frames.
pub const DATETIME_COL: &str = "Datetime";

/// A named numeric series indexed by naive (wall-clock) timestamps.
#[derive(Debug, Clone, PartialEq)]
pub struct EnergySeries {
    name: String,
    timestamps: Vec<NaiveDateTime>,
    values: Vec<f64>,
}

impl EnergySeries {
    /// Build a series from `(timestamp, value)` pairs, kept in the given order.
    pub fn from_points<I>(name: impl Into<String>, points: I) -> Self
    where
        I: IntoIterator<Item = (NaiveDateTime, f64)>,
    {
        let (timestamps, values) = points.into_iter().unzip();
        Self {
            name: name.into(),
            timestamps,
            values,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn timestamps(&self) -> &[NaiveDateTime] {
        &self.timestamps
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate over `(timestamp, value)` pairs.
    pub fn points(&self) -> impl Iterator<Item = (NaiveDateTime, f64)> + '_ {
        self.timestamps.iter().copied().zip(self.values.iter().copied())
    }

    /// Earliest timestamp (not necessarily the first row before cleaning).
    pub fn start(&self) -> Option<NaiveDateTime> {
        self.timestamps.iter().min().copied()
    }

    /// Latest timestamp.
    pub fn end(&self) -> Option<NaiveDateTime> {
        self.timestamps.iter().max().copied()
    }

    /// Number of NaN values.
    pub fn missing_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_nan()).count()
    }

    /// True when every neighbour pair is exactly one hour apart.
    ///
    /// Implies strictly increasing timestamps with no duplicates and no gaps.
    pub fn is_hourly_contiguous(&self) -> bool {
        let hour = TimeDelta::hours(1);
        self.timestamps.windows(2).all(|w| w[1] - w[0] == hour)
    }

    /// Convert to a polars DataFrame: `Datetime` (ms precision) plus the value column.
    pub fn to_dataframe(&self) -> PolarsResult<DataFrame> {
        let millis: Vec<i64> = self
            .timestamps
            .iter()
            .map(|ts| ts.and_utc().timestamp_millis())
            .collect();

        let datetime = Column::new(DATETIME_COL.into(), millis)
            .cast(&DataType::Datetime(TimeUnit::Milliseconds, None))?;

        DataFrame::new(vec![
            datetime,
            Column::new(self.name.as_str().into(), self.values.clone()),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn ts(day: u32, hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2018, 1, day)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    #[test]
    fn contiguous_detects_gaps_and_duplicates() {
        let ok = EnergySeries::from_points("PJME", [(ts(1, 0), 1.0), (ts(1, 1), 2.0), (ts(1, 2), 3.0)]);
        assert!(ok.is_hourly_contiguous());

        let gap = EnergySeries::from_points("PJME", [(ts(1, 0), 1.0), (ts(1, 2), 3.0)]);
        assert!(!gap.is_hourly_contiguous());

        let dup = EnergySeries::from_points("PJME", [(ts(1, 0), 1.0), (ts(1, 0), 3.0)]);
        assert!(!dup.is_hourly_contiguous());

        let reversed = EnergySeries::from_points("PJME", [(ts(1, 1), 1.0), (ts(1, 0), 3.0)]);
        assert!(!reversed.is_hourly_contiguous());
    }

    #[test]
    fn start_and_end_ignore_row_order() {
        let series = EnergySeries::from_points("PJME", [(ts(2, 5), 1.0), (ts(1, 3), 2.0), (ts(3, 0), 3.0)]);
        assert_eq!(series.start(), Some(ts(1, 3)));
        assert_eq!(series.end(), Some(ts(3, 0)));
        assert_eq!(series.missing_count(), 0);
    }

    #[test]
    fn dataframe_has_datetime_index_and_target() {
        let series = EnergySeries::from_points("AEP", [(ts(1, 0), 10.0), (ts(1, 1), 11.5)]);
        let df = series.to_dataframe().unwrap();

        assert_eq!(df.shape(), (2, 2));
        assert_eq!(
            df.column(DATETIME_COL).unwrap().dtype(),
            &DataType::Datetime(TimeUnit::Milliseconds, None)
        );
        let values: Vec<f64> = df
            .column("AEP")
            .unwrap()
            .f64()
            .unwrap()
            .into_iter()
            .flatten()
            .collect();
        assert_eq!(values, vec![10.0, 11.5]);
    }
}
