//! Contribution amounts derived from an election
//!
//! Converts a percentage-of-salary or fixed-per-paycheck election into
//! per-paycheck, monthly and annual currency amounts, and flags elections
//! whose annual total exceeds the IRS elective deferral limit. The limit is a
//! display threshold only; it is never enforced.

use serde::{Deserialize, Serialize};

use crate::policy::{ContributionType, PaycheckFrequency};

/// 2024 IRS elective deferral limit for 401(k) plans
pub const IRS_ELECTIVE_DEFERRAL_LIMIT_2024: f64 = 23_000.0;

/// Annual contribution implied by an election
pub fn annual_contribution(
    contribution_type: ContributionType,
    contribution_value: f64,
    annual_salary: f64,
    frequency: PaycheckFrequency,
) -> f64 {
    match contribution_type {
        ContributionType::Percentage => annual_salary * (contribution_value / 100.0),
        ContributionType::FixedPerPaycheck => contribution_value * frequency.periods_per_year() as f64,
    }
}

/// Monthly contribution used by the projection
pub fn monthly_contribution(
    contribution_type: ContributionType,
    contribution_value: f64,
    annual_salary: f64,
    frequency: PaycheckFrequency,
) -> f64 {
    annual_contribution(contribution_type, contribution_value, annual_salary, frequency) / 12.0
}

/// Amount withheld from a single paycheck
pub fn per_paycheck_contribution(
    contribution_type: ContributionType,
    contribution_value: f64,
    annual_salary: f64,
    frequency: PaycheckFrequency,
) -> f64 {
    match contribution_type {
        ContributionType::Percentage => {
            (annual_salary / frequency.periods_per_year() as f64) * (contribution_value / 100.0)
        }
        ContributionType::FixedPerPaycheck => contribution_value,
    }
}

/// Summary of what an election costs the saver
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContributionImpact {
    pub per_paycheck: f64,
    pub monthly: f64,
    pub annual: f64,
    pub irs_limit: f64,
    pub exceeds_irs_limit: bool,
}

impl ContributionImpact {
    pub fn new(
        contribution_type: ContributionType,
        contribution_value: f64,
        annual_salary: f64,
        frequency: PaycheckFrequency,
    ) -> Self {
        let annual = annual_contribution(contribution_type, contribution_value, annual_salary, frequency);
        Self {
            per_paycheck: per_paycheck_contribution(
                contribution_type,
                contribution_value,
                annual_salary,
                frequency,
            ),
            monthly: annual / 12.0,
            annual,
            irs_limit: IRS_ELECTIVE_DEFERRAL_LIMIT_2024,
            exceeds_irs_limit: annual > IRS_ELECTIVE_DEFERRAL_LIMIT_2024,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const BIWEEKLY: PaycheckFrequency = PaycheckFrequency::Biweekly;

    #[test]
    fn test_percentage_monthly() {
        let monthly = monthly_contribution(ContributionType::Percentage, 6.0, 75_000.0, BIWEEKLY);
        assert_relative_eq!(monthly, 375.0, epsilon = 1e-9);
    }

    #[test]
    fn test_fixed_monthly() {
        let monthly = monthly_contribution(ContributionType::FixedPerPaycheck, 500.0, 75_000.0, BIWEEKLY);
        assert_relative_eq!(monthly, 1083.333_333, epsilon = 1e-5);
    }

    #[test]
    fn test_per_paycheck() {
        let pct = per_paycheck_contribution(ContributionType::Percentage, 6.0, 78_000.0, BIWEEKLY);
        assert_relative_eq!(pct, 180.0, epsilon = 1e-9);
        let fixed = per_paycheck_contribution(ContributionType::FixedPerPaycheck, 500.0, 78_000.0, BIWEEKLY);
        assert_eq!(fixed, 500.0);
    }

    #[test]
    fn test_irs_limit_flag() {
        let under = ContributionImpact::new(ContributionType::Percentage, 6.0, 75_000.0, BIWEEKLY);
        assert!(!under.exceeds_irs_limit);
        assert_relative_eq!(under.annual, 4_500.0, epsilon = 1e-9);

        // 1000 * 26 = 26,000 > 23,000
        let over = ContributionImpact::new(ContributionType::FixedPerPaycheck, 1_000.0, 75_000.0, BIWEEKLY);
        assert!(over.exceeds_irs_limit);

        // Exactly at the limit is not over it
        let at = ContributionImpact::new(ContributionType::Percentage, 23.0, 100_000.0, BIWEEKLY);
        assert!(!at.exceeds_irs_limit);
    }
}
