//! Retirement balance projection
//!
//! Summary totals use monthly compounding with contributions paid at the end
//! of each month (ordinary annuity):
//!
//! ```text
//! FV = PV * (1 + r)^n + PMT * ((1 + r)^n - 1) / r
//! ```
//!
//! where `r` is the annual return divided by 12 and `n` the months to
//! retirement. With `r = 0` the annuity term is `PMT * n`.

use serde::{Deserialize, Serialize};

use super::result::ProjectionResult;
use super::series::{BalanceSeries, SeriesCompounding};
use crate::contribution::{monthly_contribution, ContributionImpact};
use crate::error::{PlannerError, Result};
use crate::policy::{validate, ContributionPolicy, ContributionType, PaycheckFrequency};

/// Default assumed annual rate of return (7%)
pub const DEFAULT_ANNUAL_RETURN: f64 = 0.07;

/// Largest balance a projection will report. Whole-unit figures below this
/// are exact in both `f64` and `i64`.
pub const MAX_PROJECTED_BALANCE: f64 = 1e15;

/// Future value of a starting balance plus a level end-of-period payment stream
pub fn future_value(present_value: f64, payment: f64, periodic_rate: f64, periods: u32) -> f64 {
    if periodic_rate == 0.0 {
        return present_value + payment * periods as f64;
    }
    let growth = (1.0 + periodic_rate).powi(periods as i32);
    present_value * growth + payment * (growth - 1.0) / periodic_rate
}

/// Inputs to a projection. Required fields are optional here so that a missing
/// value is reported as such rather than defaulted.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectionInput {
    pub current_age: Option<u32>,
    pub retirement_age: Option<u32>,
    pub annual_salary: Option<f64>,
    pub contribution_type: Option<ContributionType>,
    pub contribution_value: Option<f64>,
    pub current_balance: f64,
    pub annual_return_rate: f64,
    pub paycheck_frequency: PaycheckFrequency,
}

impl Default for ProjectionInput {
    fn default() -> Self {
        Self {
            current_age: None,
            retirement_age: None,
            annual_salary: None,
            contribution_type: None,
            contribution_value: None,
            current_balance: 0.0,
            annual_return_rate: DEFAULT_ANNUAL_RETURN,
            paycheck_frequency: PaycheckFrequency::Biweekly,
        }
    }
}

impl ProjectionInput {
    /// Input with every required field present
    pub fn new(
        current_age: u32,
        retirement_age: u32,
        annual_salary: f64,
        contribution_type: ContributionType,
        contribution_value: f64,
    ) -> Self {
        Self {
            current_age: Some(current_age),
            retirement_age: Some(retirement_age),
            annual_salary: Some(annual_salary),
            contribution_type: Some(contribution_type),
            contribution_value: Some(contribution_value),
            ..Self::default()
        }
    }

    /// Input taken from a stored record
    pub fn from_policy(policy: &ContributionPolicy) -> Self {
        Self {
            paycheck_frequency: policy.paycheck_frequency,
            ..Self::new(
                policy.current_age,
                policy.retirement_age,
                policy.annual_salary,
                policy.contribution_type,
                policy.contribution_value,
            )
        }
    }

    pub fn with_current_balance(mut self, balance: f64) -> Self {
        self.current_balance = balance;
        self
    }

    pub fn with_annual_return(mut self, rate: f64) -> Self {
        self.annual_return_rate = rate;
        self
    }

    pub fn with_contribution_value(mut self, value: f64) -> Self {
        self.contribution_value = Some(value);
        self
    }

    /// Per-paycheck, monthly and annual amounts for this election
    pub fn contribution_impact(&self) -> Result<ContributionImpact> {
        let annual_salary = validate::require("annualSalary", self.annual_salary)?;
        let contribution_type = validate::require("contributionType", self.contribution_type)?;
        let contribution_value = validate::require("contributionValue", self.contribution_value)?;
        Ok(ContributionImpact::new(
            contribution_type,
            contribution_value,
            annual_salary,
            self.paycheck_frequency,
        ))
    }

    /// Check the input and resolve it into concrete values
    pub fn validate(&self) -> Result<ValidatedInput> {
        let current_age = validate::require("currentAge", self.current_age)?;
        let retirement_age = validate::require("retirementAge", self.retirement_age)?;
        let annual_salary = validate::require("annualSalary", self.annual_salary)?;
        let contribution_type = validate::require("contributionType", self.contribution_type)?;
        let contribution_value = validate::require("contributionValue", self.contribution_value)?;

        validate::optional_age("currentAge", Some(current_age as i64))?;
        validate::optional_age("retirementAge", Some(retirement_age as i64))?;
        validate::age_order(current_age, retirement_age)?;
        validate::positive_salary(annual_salary)?;
        validate::contribution(contribution_type, contribution_value)?;
        validate::non_negative("currentBalance", self.current_balance)?;
        if !self.annual_return_rate.is_finite() || self.annual_return_rate <= -1.0 {
            return Err(PlannerError::out_of_range(
                "annualReturn",
                self.annual_return_rate,
                "must be a finite rate greater than -1",
            ));
        }

        Ok(ValidatedInput {
            current_age,
            years_to_retirement: retirement_age - current_age,
            current_balance: self.current_balance,
            annual_return_rate: self.annual_return_rate,
            monthly_contribution: monthly_contribution(
                contribution_type,
                contribution_value,
                annual_salary,
                self.paycheck_frequency,
            ),
        })
    }
}

/// Projection input after validation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValidatedInput {
    pub current_age: u32,
    pub years_to_retirement: u32,
    pub current_balance: f64,
    pub annual_return_rate: f64,
    pub monthly_contribution: f64,
}

impl ValidatedInput {
    pub fn months_to_retirement(&self) -> u32 {
        self.years_to_retirement * 12
    }

    pub fn monthly_return_rate(&self) -> f64 {
        self.annual_return_rate / 12.0
    }
}

/// Configuration for a projection run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectionConfig {
    /// Whether to attach the year-by-year series to the result
    pub include_series: bool,

    /// Compounding used for the series
    pub series_compounding: SeriesCompounding,
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self {
            include_series: true,
            series_compounding: SeriesCompounding::Annual,
        }
    }
}

/// Stateless projection calculator
#[derive(Debug, Clone, Copy, Default)]
pub struct ProjectionCalculator {
    config: ProjectionConfig,
}

impl ProjectionCalculator {
    pub fn new(config: ProjectionConfig) -> Self {
        Self { config }
    }

    /// Run a projection with this calculator's config
    pub fn project(&self, input: &ProjectionInput) -> Result<ProjectionResult> {
        self.project_with(input, &self.config)
    }

    /// Run a projection with an explicit per-call config
    pub fn project_with(
        &self,
        input: &ProjectionInput,
        config: &ProjectionConfig,
    ) -> Result<ProjectionResult> {
        let v = input.validate()?;

        let months = v.months_to_retirement();
        let total = future_value(
            v.current_balance,
            v.monthly_contribution,
            v.monthly_return_rate(),
            months,
        );
        let contributions = v.monthly_contribution * months as f64;
        if !representable(contributions) {
            return Err(PlannerError::out_of_range(
                "contributionValue",
                v.monthly_contribution,
                "contributions exceed the largest projectable balance",
            ));
        }
        if !representable(total) {
            return Err(PlannerError::out_of_range(
                "annualReturn",
                v.annual_return_rate,
                "drives the balance past the largest projectable amount",
            ));
        }

        let series = config.include_series.then(|| {
            series_for(&v, config.series_compounding).collect::<Vec<_>>()
        });

        Ok(ProjectionResult {
            total_at_retirement: total.round(),
            total_contributions: contributions.round(),
            investment_gains: (total - contributions - v.current_balance).round(),
            monthly_contribution: v.monthly_contribution,
            years_to_retirement: v.years_to_retirement,
            assumed_annual_return: v.annual_return_rate,
            series,
        })
    }

    /// Lazy year-by-year trajectory for `input`
    pub fn series(&self, input: &ProjectionInput, compounding: SeriesCompounding) -> Result<BalanceSeries> {
        let v = input.validate()?;
        Ok(series_for(&v, compounding))
    }
}

fn representable(amount: f64) -> bool {
    amount.is_finite() && amount.abs() <= MAX_PROJECTED_BALANCE
}

fn series_for(v: &ValidatedInput, compounding: SeriesCompounding) -> BalanceSeries {
    BalanceSeries::new(
        compounding,
        v.current_age,
        v.years_to_retirement,
        v.current_balance,
        v.monthly_contribution,
        v.annual_return_rate,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    fn baseline() -> ProjectionInput {
        ProjectionInput::new(30, 65, 75_000.0, ContributionType::Percentage, 6.0)
    }

    fn code(err: PlannerError) -> (&'static str, &'static str) {
        let issue = err.issue().expect("expected an input error");
        (issue.code(), issue.field())
    }

    #[test]
    fn test_baseline_projection() {
        let result = ProjectionCalculator::default().project(&baseline()).unwrap();

        assert_eq!(result.years_to_retirement, 35);
        assert_relative_eq!(result.monthly_contribution, 375.0, epsilon = 1e-9);
        assert_eq!(result.total_contributions, 157_500.0);
        assert!(result.total_at_retirement > result.total_contributions);

        let r: f64 = 0.07 / 12.0;
        let expected = 375.0 * ((1.0 + r).powi(420) - 1.0) / r;
        assert_abs_diff_eq!(result.total_at_retirement, expected.round(), epsilon = 0.5);
        assert_abs_diff_eq!(result.total_at_retirement, 675_395.0, epsilon = 1.0);
        assert_eq!(result.assumed_annual_return, 0.07);
    }

    #[test]
    fn test_fixed_per_paycheck() {
        let input = ProjectionInput::new(30, 65, 75_000.0, ContributionType::FixedPerPaycheck, 500.0);
        let result = ProjectionCalculator::default().project(&input).unwrap();
        assert_relative_eq!(result.monthly_contribution, 1083.333_333, epsilon = 1e-5);
        assert_eq!(result.total_contributions, (500.0_f64 * 26.0 / 12.0 * 420.0).round());
    }

    #[test]
    fn test_gains_identity() {
        let calc = ProjectionCalculator::default();
        for balance in [0.0, 1_234.56, 50_000.0] {
            for rate in [0.0, 0.03, 0.07, 0.12] {
                for value in [0.0, 1.0, 6.0, 15.5, 100.0] {
                    let input = baseline()
                        .with_contribution_value(value)
                        .with_current_balance(balance)
                        .with_annual_return(rate);
                    let result = calc.project(&input).unwrap();
                    let implied = result.total_at_retirement - result.total_contributions - balance;
                    assert!(
                        (implied - result.investment_gains).abs() <= 1.0,
                        "balance={} rate={} value={}",
                        balance,
                        rate,
                        value
                    );
                }
            }
        }
    }

    #[test]
    fn test_monotonic_in_contribution_value() {
        let calc = ProjectionCalculator::default();
        let mut previous: Option<ProjectionResult> = None;
        for value in [1.0, 2.0, 5.0, 6.0, 10.0, 25.0, 50.0, 100.0] {
            let result = calc.project(&baseline().with_contribution_value(value)).unwrap();
            if let Some(prev) = &previous {
                assert!(result.total_at_retirement > prev.total_at_retirement);
                assert!(result.total_contributions > prev.total_contributions);
            }
            previous = Some(result);
        }
    }

    #[test]
    fn test_zero_return() {
        let input = baseline().with_annual_return(0.0).with_current_balance(10_000.0);
        let result = ProjectionCalculator::default().project(&input).unwrap();
        assert_eq!(result.total_at_retirement, 10_000.0 + result.total_contributions);
        assert_eq!(result.investment_gains, 0.0);
    }

    #[test]
    fn test_existing_balance_compounds() {
        let input = baseline().with_contribution_value(0.0).with_current_balance(10_000.0);
        let result = ProjectionCalculator::default().project(&input).unwrap();
        let expected = 10_000.0 * (1.0 + 0.07 / 12.0_f64).powi(420);
        assert_abs_diff_eq!(result.total_at_retirement, expected.round(), epsilon = 0.5);
        assert_eq!(result.total_contributions, 0.0);
    }

    #[test]
    fn test_boundaries() {
        let calc = ProjectionCalculator::default();

        let same_age = ProjectionInput::new(65, 65, 75_000.0, ContributionType::Percentage, 6.0);
        assert_eq!(code(calc.project(&same_age).unwrap_err()), ("out_of_range", "retirementAge"));

        let negative = baseline().with_contribution_value(-1.0);
        assert_eq!(code(calc.project(&negative).unwrap_err()), ("out_of_range", "contributionValue"));

        let too_much = baseline().with_contribution_value(150.0);
        assert_eq!(code(calc.project(&too_much).unwrap_err()), ("out_of_range", "contributionValue"));

        let no_salary = ProjectionInput::new(30, 65, 0.0, ContributionType::Percentage, 6.0);
        assert_eq!(code(calc.project(&no_salary).unwrap_err()), ("out_of_range", "annualSalary"));
    }

    #[test]
    fn test_missing_fields() {
        let calc = ProjectionCalculator::default();
        let mut input = baseline();
        input.contribution_type = None;
        assert_eq!(code(calc.project(&input).unwrap_err()), ("missing_field", "contributionType"));

        let input = ProjectionInput::default();
        assert_eq!(code(calc.project(&input).unwrap_err()), ("missing_field", "currentAge"));
    }

    #[test]
    fn test_series_attached_by_default() {
        let result = ProjectionCalculator::default().project(&baseline()).unwrap();
        let series = result.series.as_ref().expect("series requested");
        assert_eq!(series.len(), 36);
        assert_eq!(series.first().map(|p| p.age), Some(30));
        assert_eq!(series.last().map(|p| p.age), Some(65));
        assert_relative_eq!(series[35].cumulative_contributions, 157_500.0, epsilon = 1e-6);

        // Annual compounding is an approximation of the monthly total
        let annual_final = series[35].cumulative_balance;
        assert!((annual_final - result.total_at_retirement).abs() > 1.0);
    }

    #[test]
    fn test_monthly_series_reconciles_with_total() {
        let config = ProjectionConfig {
            include_series: true,
            series_compounding: SeriesCompounding::Monthly,
        };
        let result = ProjectionCalculator::new(config).project(&baseline()).unwrap();
        let last = result.series.as_ref().and_then(|s| s.last()).copied().unwrap();
        assert_eq!(last.cumulative_balance.round(), result.total_at_retirement);
    }

    #[test]
    fn test_runaway_return_is_rejected() {
        let calc = ProjectionCalculator::default();
        for rate in [100.0, 5.0] {
            let err = calc.project(&baseline().with_annual_return(rate)).unwrap_err();
            assert_eq!(code(err), ("out_of_range", "annualReturn"));
        }

        let huge = ProjectionInput::new(30, 65, 1e12, ContributionType::FixedPerPaycheck, 1e13);
        assert_eq!(code(calc.project(&huge).unwrap_err()), ("out_of_range", "contributionValue"));

        // High but plausible rates still project
        let result = calc.project(&baseline().with_annual_return(0.5)).unwrap();
        assert!(result.total_at_retirement.is_finite());
        let implied = result.total_at_retirement - result.total_contributions;
        assert!((implied - result.investment_gains).abs() <= 1.0);
    }

    #[test]
    fn test_lazy_series_restarts() {
        let calc = ProjectionCalculator::default();
        let series = calc.series(&baseline(), SeriesCompounding::Monthly).unwrap();
        assert_eq!(series.len(), 36);

        let first: Vec<_> = series.clone().collect();
        let again: Vec<_> = series.collect();
        assert_eq!(first, again);

        let total = calc.project(&baseline()).unwrap().total_at_retirement;
        assert_eq!(first[35].cumulative_balance.round(), total);

        let err = calc
            .series(&baseline().with_annual_return(f64::NAN), SeriesCompounding::Annual)
            .unwrap_err();
        assert_eq!(code(err), ("out_of_range", "annualReturn"));
    }

    #[test]
    fn test_series_can_be_skipped() {
        let config = ProjectionConfig {
            include_series: false,
            ..ProjectionConfig::default()
        };
        let result = ProjectionCalculator::new(config).project(&baseline()).unwrap();
        assert!(result.series.is_none());
    }
}
