//! Statistics Calculator Module
//! Quantiles and descriptive statistics for energy series.

use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;

use crate::data::EnergySeries;

/// Descriptive statistics for one series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesSummary {
    pub name: String,
    pub count: usize,
    pub mean: f64,
    pub median: f64,
    pub std: f64,
    pub min: f64,
    pub max: f64,
    pub p05: f64,
    pub p95: f64,
}

impl Default for SeriesSummary {
    fn default() -> Self {
        Self {
            name: String::new(),
            count: 0,
            mean: f64::NAN,
            median: f64::NAN,
            std: f64::NAN,
            min: f64::NAN,
            max: f64::NAN,
            p05: f64::NAN,
            p95: f64::NAN,
        }
    }
}

/// Compute descriptive statistics for a series.
pub fn summarize(series: &EnergySeries) -> SeriesSummary {
    let values = series.values();
    let n = values.len();
    if n == 0 {
        return SeriesSummary {
            name: series.name().to_string(),
            ..SeriesSummary::default()
        };
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    // Sample std (n - 1); a single value has no spread
    let std = if n > 1 { values.std_dev() } else { 0.0 };

    SeriesSummary {
        name: series.name().to_string(),
        count: n,
        mean: values.mean(),
        median: sorted_quantile(&sorted, 0.5),
        std,
        min: sorted[0],
        max: sorted[n - 1],
        p05: sorted_quantile(&sorted, 0.05),
        p95: sorted_quantile(&sorted, 0.95),
    }
}

/// Quantile `q` in `[0, 1]` using linear interpolation (NumPy compatible).
///
/// Returns NaN for an empty slice.
pub fn quantile(values: &[f64], q: f64) -> f64 {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    sorted_quantile(&sorted, q)
}

fn sorted_quantile(sorted_values: &[f64], q: f64) -> f64 {
    let n = sorted_values.len();
    if n == 0 {
        return f64::NAN;
    }
    if n == 1 {
        return sorted_values[0];
    }

    let rank = q.clamp(0.0, 1.0) * (n - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = (rank.ceil() as usize).min(n - 1);
    let frac = rank - lower as f64;

    if lower == upper {
        sorted_values[lower]
    } else {
        sorted_values[lower] * (1.0 - frac) + sorted_values[upper] * frac
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::{NaiveDate, TimeDelta};

    fn hourly(values: &[f64]) -> EnergySeries {
        let start = NaiveDate::from_ymd_opt(2015, 3, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        EnergySeries::from_points(
            "PJME",
            values
                .iter()
                .enumerate()
                .map(|(i, v)| (start + TimeDelta::hours(i as i64), *v)),
        )
    }

    #[test]
    fn quantile_matches_numpy_linear() {
        let values = [4.0, 1.0, 3.0, 2.0, 5.0];
        assert_relative_eq!(quantile(&values, 0.0), 1.0);
        assert_relative_eq!(quantile(&values, 0.5), 3.0);
        assert_relative_eq!(quantile(&values, 1.0), 5.0);
        // np.quantile([1, 2, 3, 4, 5], 0.1) == 1.4
        assert_relative_eq!(quantile(&values, 0.1), 1.4, epsilon = 1e-12);
        assert!(quantile(&[], 0.5).is_nan());
        assert_eq!(quantile(&[7.5], 0.99), 7.5);
    }

    #[test]
    fn summary_of_series() {
        let summary = summarize(&hourly(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]));

        assert_eq!(summary.name, "PJME");
        assert_eq!(summary.count, 8);
        assert_relative_eq!(summary.mean, 5.0);
        assert_relative_eq!(summary.median, 4.5);
        // Sample variance: 32 / 7
        assert_relative_eq!(summary.std, (32.0f64 / 7.0).sqrt(), epsilon = 1e-12);
        assert_eq!(summary.min, 2.0);
        assert_eq!(summary.max, 9.0);
    }

    #[test]
    fn summary_of_edge_sizes() {
        let empty = summarize(&hourly(&[]));
        assert_eq!(empty.count, 0);
        assert!(empty.mean.is_nan());

        let single = summarize(&hourly(&[3.0]));
        assert_eq!(single.count, 1);
        assert_eq!(single.std, 0.0);
        assert_eq!(single.p05, 3.0);
        assert_eq!(single.p95, 3.0);
    }
}
