//! Scenario runner for batch projections
//!
//! Projects one base input across several contribution values or return
//! rates in parallel, e.g. to compare "what if I saved 8% instead of 6%".

use rayon::prelude::*;
use serde::Serialize;

use crate::error::Result;
use crate::projection::{ProjectionCalculator, ProjectionConfig, ProjectionInput, ProjectionResult};

/// Which input a sweep varies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SweepAxis {
    ContributionValue,
    AnnualReturn,
}

/// One projection in a sweep
#[derive(Debug, Clone, Serialize)]
pub struct ScenarioOutcome {
    pub axis: SweepAxis,
    /// Value of the swept input for this run
    pub value: f64,
    pub result: ProjectionResult,
}

/// Runs many projections over a shared base input
///
/// # Example
/// ```ignore
/// let runner = ScenarioRunner::new();
/// let outcomes = runner.sweep_contribution_values(&input, &[4.0, 6.0, 8.0])?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct ScenarioRunner {
    calculator: ProjectionCalculator,
}

impl ScenarioRunner {
    /// Runner that skips the per-year series (summary totals only)
    pub fn new() -> Self {
        Self::with_config(ProjectionConfig {
            include_series: false,
            ..ProjectionConfig::default()
        })
    }

    pub fn with_config(config: ProjectionConfig) -> Self {
        Self {
            calculator: ProjectionCalculator::new(config),
        }
    }

    /// Run a single projection
    pub fn run(&self, input: &ProjectionInput) -> Result<ProjectionResult> {
        self.calculator.project(input)
    }

    /// Run projections for multiple inputs, failing on the first invalid one
    pub fn run_batch(&self, inputs: &[ProjectionInput]) -> Result<Vec<ProjectionResult>> {
        inputs.par_iter().map(|input| self.calculator.project(input)).collect()
    }

    /// Vary the contribution value, holding everything else fixed
    pub fn sweep_contribution_values(
        &self,
        base: &ProjectionInput,
        values: &[f64],
    ) -> Result<Vec<ScenarioOutcome>> {
        self.sweep(base, values, SweepAxis::ContributionValue)
    }

    /// Vary the annual return rate, holding everything else fixed
    pub fn sweep_return_rates(&self, base: &ProjectionInput, rates: &[f64]) -> Result<Vec<ScenarioOutcome>> {
        self.sweep(base, rates, SweepAxis::AnnualReturn)
    }

    fn sweep(&self, base: &ProjectionInput, values: &[f64], axis: SweepAxis) -> Result<Vec<ScenarioOutcome>> {
        values
            .par_iter()
            .map(|&value| {
                let input = match axis {
                    SweepAxis::ContributionValue => base.clone().with_contribution_value(value),
                    SweepAxis::AnnualReturn => base.clone().with_annual_return(value),
                };
                let result = self.calculator.project(&input)?;
                Ok(ScenarioOutcome { axis, value, result })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::ContributionType;

    fn test_input() -> ProjectionInput {
        ProjectionInput::new(35, 67, 90_000.0, ContributionType::Percentage, 6.0)
    }

    #[test]
    fn test_contribution_sweep_preserves_order() {
        let runner = ScenarioRunner::new();
        let outcomes = runner
            .sweep_contribution_values(&test_input(), &[3.0, 6.0, 10.0])
            .unwrap();

        assert_eq!(outcomes.len(), 3);
        assert_eq!(outcomes[0].value, 3.0);
        assert!(outcomes.iter().all(|o| o.result.series.is_none()));

        // Higher contribution should result in higher final balance
        assert!(outcomes[2].result.total_at_retirement > outcomes[1].result.total_at_retirement);
        assert!(outcomes[1].result.total_at_retirement > outcomes[0].result.total_at_retirement);
    }

    #[test]
    fn test_return_sweep() {
        let runner = ScenarioRunner::new();
        let outcomes = runner.sweep_return_rates(&test_input(), &[0.0, 0.05, 0.09]).unwrap();

        assert_eq!(outcomes[0].result.investment_gains, 0.0);
        assert!(outcomes[2].result.investment_gains > outcomes[1].result.investment_gains);
        // Contributions do not depend on the return assumption
        assert_eq!(outcomes[0].result.total_contributions, outcomes[2].result.total_contributions);
    }

    #[test]
    fn test_sweep_rejects_invalid_value() {
        let runner = ScenarioRunner::new();
        let err = runner
            .sweep_contribution_values(&test_input(), &[5.0, 150.0])
            .unwrap_err();
        assert_eq!(err.kind(), "invalid_input");
    }

    #[test]
    fn test_run_batch() {
        let runner = ScenarioRunner::default();
        let inputs = vec![test_input(), test_input().with_current_balance(20_000.0)];
        let results = runner.run_batch(&inputs).unwrap();
        assert_eq!(results.len(), 2);
        assert!(results[0].series.is_some());
        assert!(results[1].total_at_retirement > results[0].total_at_retirement);
    }
}
