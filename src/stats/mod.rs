//! Stats module - Quantiles and descriptive statistics

mod calculator;

pub use calculator::{quantile, summarize, SeriesSummary};
