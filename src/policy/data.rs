//! Contribution policy records and the default-merge used on upsert

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Result, ValidationIssue};

/// Number of pay periods in a year for a biweekly payroll
pub const PAYCHECKS_PER_YEAR: u32 = 26;

/// Basis of a contribution election
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContributionType {
    /// Percent of annual salary, 0-100
    #[serde(rename = "percentage")]
    Percentage,
    /// Flat currency amount withheld from every paycheck
    #[serde(rename = "fixed")]
    FixedPerPaycheck,
}

impl ContributionType {
    pub const EXPECTED: &'static str = "\"percentage\" or \"fixed\"";

    pub fn as_str(&self) -> &'static str {
        match self {
            ContributionType::Percentage => "percentage",
            ContributionType::FixedPerPaycheck => "fixed",
        }
    }

    /// Parse the wire name, reporting unknown names against `field`
    pub fn parse(field: &'static str, value: &str) -> Result<Self> {
        match value {
            "percentage" => Ok(ContributionType::Percentage),
            "fixed" => Ok(ContributionType::FixedPerPaycheck),
            other => Err(ValidationIssue::InvalidEnum {
                field,
                value: other.to_string(),
                expected: Self::EXPECTED,
            }
            .into()),
        }
    }
}

/// Payroll frequency. Only biweekly payroll is modelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PaycheckFrequency {
    #[default]
    #[serde(rename = "biweekly")]
    Biweekly,
}

impl PaycheckFrequency {
    pub fn periods_per_year(&self) -> u32 {
        match self {
            PaycheckFrequency::Biweekly => PAYCHECKS_PER_YEAR,
        }
    }

    pub fn parse(field: &'static str, value: &str) -> Result<Self> {
        match value {
            "biweekly" => Ok(PaycheckFrequency::Biweekly),
            other => Err(ValidationIssue::InvalidEnum {
                field,
                value: other.to_string(),
                expected: "\"biweekly\"",
            }
            .into()),
        }
    }
}

/// Demographic values filled in for a user's first upsert
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PolicyDefaults {
    pub annual_salary: f64,
    pub current_age: u32,
    pub retirement_age: u32,
    pub employer_match_percent: f64,
    pub paycheck_frequency: PaycheckFrequency,
    pub year_to_date_contributions: f64,
}

impl PolicyDefaults {
    pub const STANDARD: PolicyDefaults = PolicyDefaults {
        annual_salary: 75_000.0,
        current_age: 30,
        retirement_age: 65,
        employer_match_percent: 3.0,
        paycheck_frequency: PaycheckFrequency::Biweekly,
        // 6% of 75k over the first five months of the year
        year_to_date_contributions: 3_750.0,
    };
}

impl Default for PolicyDefaults {
    fn default() -> Self {
        Self::STANDARD
    }
}

/// A user's stored contribution election and demographics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContributionPolicy {
    pub user_id: String,

    pub contribution_type: ContributionType,

    /// Percent (0-100) or currency per paycheck, depending on `contribution_type`
    pub contribution_value: f64,

    pub annual_salary: f64,

    pub current_age: u32,

    pub retirement_age: u32,

    /// Informational only; never consumed by the projection
    #[serde(rename = "employerMatch")]
    pub employer_match_percent: f64,

    pub paycheck_frequency: PaycheckFrequency,

    #[serde(rename = "ytdContributions")]
    pub year_to_date_contributions: f64,

    pub last_updated: DateTime<Utc>,
}

/// A validated upsert request: the election plus optional demographic overrides
#[derive(Debug, Clone, PartialEq)]
pub struct PolicyUpdate {
    pub contribution_type: ContributionType,
    pub contribution_value: f64,
    pub annual_salary: Option<f64>,
    pub current_age: Option<u32>,
    pub retirement_age: Option<u32>,
    pub employer_match_percent: Option<f64>,
    pub year_to_date_contributions: Option<f64>,
}

impl PolicyUpdate {
    /// An update that only changes the election
    pub fn election(contribution_type: ContributionType, contribution_value: f64) -> Self {
        Self {
            contribution_type,
            contribution_value,
            annual_salary: None,
            current_age: None,
            retirement_age: None,
            employer_match_percent: None,
            year_to_date_contributions: None,
        }
    }
}

impl ContributionPolicy {
    /// The record a first-time user starts from, before the election is applied
    pub fn from_defaults(user_id: &str, defaults: &PolicyDefaults, now: DateTime<Utc>) -> Self {
        Self {
            user_id: user_id.to_string(),
            contribution_type: ContributionType::Percentage,
            contribution_value: 0.0,
            annual_salary: defaults.annual_salary,
            current_age: defaults.current_age,
            retirement_age: defaults.retirement_age,
            employer_match_percent: defaults.employer_match_percent,
            paycheck_frequency: defaults.paycheck_frequency,
            year_to_date_contributions: defaults.year_to_date_contributions,
            last_updated: now,
        }
    }

    /// Demo record seeded for the default user: 6% of a 75k salary
    pub fn demo(user_id: &str, now: DateTime<Utc>) -> Self {
        Self {
            contribution_type: ContributionType::Percentage,
            contribution_value: 6.0,
            ..Self::from_defaults(user_id, &PolicyDefaults::STANDARD, now)
        }
    }

    /// Apply `update` over `previous` (or over `defaults` for a new user).
    ///
    /// Pure: the election is always replaced, demographic fields are replaced
    /// only when the update carries them, and `last_updated` is set to `now`.
    pub fn merged(
        user_id: &str,
        previous: Option<&ContributionPolicy>,
        defaults: &PolicyDefaults,
        update: &PolicyUpdate,
        now: DateTime<Utc>,
    ) -> Self {
        let base = match previous {
            Some(existing) => existing.clone(),
            None => Self::from_defaults(user_id, defaults, now),
        };

        Self {
            user_id: user_id.to_string(),
            contribution_type: update.contribution_type,
            contribution_value: update.contribution_value,
            annual_salary: update.annual_salary.unwrap_or(base.annual_salary),
            current_age: update.current_age.unwrap_or(base.current_age),
            retirement_age: update.retirement_age.unwrap_or(base.retirement_age),
            employer_match_percent: update
                .employer_match_percent
                .unwrap_or(base.employer_match_percent),
            paycheck_frequency: base.paycheck_frequency,
            year_to_date_contributions: update
                .year_to_date_contributions
                .unwrap_or(base.year_to_date_contributions),
            last_updated: now,
        }
    }

    /// True when the two records differ only in `last_updated`
    pub fn same_election(&self, other: &ContributionPolicy) -> bool {
        Self {
            last_updated: other.last_updated,
            ..self.clone()
        } == *other
    }
}

/// Read-only demographic view of a stored record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DemographicSummary {
    pub user_id: String,
    pub annual_salary: f64,
    pub current_age: u32,
    pub retirement_age: u32,
    #[serde(rename = "employerMatch")]
    pub employer_match_percent: f64,
    pub paycheck_frequency: PaycheckFrequency,
}

impl From<&ContributionPolicy> for DemographicSummary {
    fn from(policy: &ContributionPolicy) -> Self {
        Self {
            user_id: policy.user_id.clone(),
            annual_salary: policy.annual_salary,
            current_age: policy.current_age,
            retirement_age: policy.retirement_age,
            employer_match_percent: policy.employer_match_percent,
            paycheck_frequency: policy.paycheck_frequency,
        }
    }
}
