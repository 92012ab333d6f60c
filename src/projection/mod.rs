//! Retirement projection calculator and balance trajectory

mod calculator;
mod result;
mod series;

pub use calculator::{
    future_value, ProjectionCalculator, ProjectionConfig, ProjectionInput, ValidatedInput,
    DEFAULT_ANNUAL_RETURN,
};
pub use result::{ProjectionResult, ProjectionSummary, SeriesPoint};
pub use series::{BalanceSeries, SeriesCompounding};
