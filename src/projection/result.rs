//! Projection output structures

use serde::{Deserialize, Serialize};

/// One year-end point of the balance trajectory
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesPoint {
    /// Years elapsed since the projection start (0 = today)
    pub year: u32,

    /// Attained age at this point
    pub age: u32,

    /// Projected balance including growth
    pub cumulative_balance: f64,

    /// Contributions paid in so far, excluding the starting balance
    pub cumulative_contributions: f64,
}

/// Complete projection result
///
/// The currency totals are rounded to whole units. `monthly_contribution` and
/// `assumed_annual_return` are kept at full precision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectionResult {
    pub total_at_retirement: f64,
    pub total_contributions: f64,
    pub investment_gains: f64,
    pub monthly_contribution: f64,
    pub years_to_retirement: u32,

    /// Annual return as a decimal (0.07 for 7%)
    pub assumed_annual_return: f64,

    /// Year-by-year trajectory, present when requested
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub series: Option<Vec<SeriesPoint>>,
}

impl ProjectionResult {
    /// Get summary statistics
    pub fn summary(&self) -> ProjectionSummary {
        let final_point = self.series.as_ref().and_then(|s| s.last().copied());

        ProjectionSummary {
            total_at_retirement: self.total_at_retirement,
            total_contributions: self.total_contributions,
            investment_gains: self.investment_gains,
            gains_share: if self.total_at_retirement > 0.0 {
                self.investment_gains / self.total_at_retirement
            } else {
                0.0
            },
            series_points: self.series.as_ref().map_or(0, Vec::len),
            series_final_balance: final_point.map(|p| p.cumulative_balance),
        }
    }
}

/// Summary statistics for a projection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectionSummary {
    pub total_at_retirement: f64,
    pub total_contributions: f64,
    pub investment_gains: f64,
    /// Fraction of the final balance that came from growth
    pub gains_share: f64,
    pub series_points: usize,
    pub series_final_balance: Option<f64>,
}
