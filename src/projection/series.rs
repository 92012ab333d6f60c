//! Year-by-year balance trajectory for charting
//!
//! [`BalanceSeries`] is a lazy iterator yielding one [`SeriesPoint`] per year
//! from the current age to the retirement age inclusive. It is `Clone`, so a
//! consumer can restart it by iterating a copy.
//!
//! Two compounding views are offered:
//! - `Annual` (default): the illustrative recurrence
//!   `balance(y) = balance(y-1) * (1 + r) + annual_contribution`.
//!   It compounds once a year and will not exactly match the summary totals.
//! - `Monthly`: each point is the monthly closed form evaluated at `12 * y`
//!   months, so the final point agrees with the precise total before rounding.

use serde::{Deserialize, Serialize};

use super::calculator::future_value;
use super::result::SeriesPoint;

/// Compounding granularity of the chart series
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeriesCompounding {
    #[default]
    Annual,
    Monthly,
}

impl SeriesCompounding {
    pub fn as_str(&self) -> &'static str {
        match self {
            SeriesCompounding::Annual => "annual",
            SeriesCompounding::Monthly => "monthly",
        }
    }
}

/// Lazy, finite trajectory of projected balances
#[derive(Debug, Clone)]
pub struct BalanceSeries {
    compounding: SeriesCompounding,
    start_age: u32,
    years: u32,
    starting_balance: f64,
    monthly_contribution: f64,
    annual_return_rate: f64,

    /// Next year to yield
    year: u32,

    /// Balance at `year - 1` for the annual recurrence
    balance: f64,
}

impl BalanceSeries {
    pub fn new(
        compounding: SeriesCompounding,
        start_age: u32,
        years: u32,
        starting_balance: f64,
        monthly_contribution: f64,
        annual_return_rate: f64,
    ) -> Self {
        Self {
            compounding,
            start_age,
            years,
            starting_balance,
            monthly_contribution,
            annual_return_rate,
            year: 0,
            balance: starting_balance,
        }
    }

    fn annual_contribution(&self) -> f64 {
        self.monthly_contribution * 12.0
    }

    /// Balance at the current `self.year`, advancing the annual recurrence
    fn advance(&mut self) -> f64 {
        match self.compounding {
            SeriesCompounding::Annual => {
                if self.year > 0 {
                    self.balance =
                        self.balance * (1.0 + self.annual_return_rate) + self.annual_contribution();
                }
                self.balance
            }
            SeriesCompounding::Monthly => future_value(
                self.starting_balance,
                self.monthly_contribution,
                self.annual_return_rate / 12.0,
                self.year * 12,
            ),
        }
    }
}

impl Iterator for BalanceSeries {
    type Item = SeriesPoint;

    fn next(&mut self) -> Option<SeriesPoint> {
        if self.year > self.years {
            return None;
        }

        let balance = self.advance();
        let point = SeriesPoint {
            year: self.year,
            age: self.start_age + self.year,
            cumulative_balance: balance,
            cumulative_contributions: self.annual_contribution() * self.year as f64,
        };
        self.year += 1;
        Some(point)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = (self.years + 1).saturating_sub(self.year) as usize;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for BalanceSeries {}

impl std::iter::FusedIterator for BalanceSeries {}
