//! Load seed contribution records from CSV

use super::data::{ContributionPolicy, ContributionType, PaycheckFrequency, PolicyDefaults};
use super::validate;
use crate::error::{PlannerError, Result};
use chrono::{DateTime, Utc};
use csv::Reader;
use std::path::Path;

/// Raw CSV row. Demographic columns may be left blank to take the defaults.
#[derive(Debug, serde::Deserialize)]
struct CsvRow {
    #[serde(rename = "userId")]
    user_id: String,
    #[serde(rename = "contributionType")]
    contribution_type: String,
    #[serde(rename = "contributionValue")]
    contribution_value: f64,
    #[serde(rename = "annualSalary", default)]
    annual_salary: Option<f64>,
    #[serde(rename = "currentAge", default)]
    current_age: Option<u32>,
    #[serde(rename = "retirementAge", default)]
    retirement_age: Option<u32>,
    #[serde(rename = "employerMatch", default)]
    employer_match: Option<f64>,
    #[serde(rename = "ytdContributions", default)]
    ytd_contributions: Option<f64>,
    #[serde(rename = "paycheckFrequency", default)]
    paycheck_frequency: Option<String>,
}

impl CsvRow {
    fn to_policy(self, defaults: &PolicyDefaults, now: DateTime<Utc>) -> Result<ContributionPolicy> {
        let contribution_type = ContributionType::parse("contributionType", self.contribution_type.trim())?;
        let paycheck_frequency = match self.paycheck_frequency.as_deref().map(str::trim) {
            None | Some("") => defaults.paycheck_frequency,
            Some(other) => PaycheckFrequency::parse("paycheckFrequency", other)?,
        };

        let policy = ContributionPolicy {
            user_id: self.user_id.trim().to_string(),
            contribution_type,
            contribution_value: self.contribution_value,
            annual_salary: self.annual_salary.unwrap_or(defaults.annual_salary),
            current_age: self.current_age.unwrap_or(defaults.current_age),
            retirement_age: self.retirement_age.unwrap_or(defaults.retirement_age),
            employer_match_percent: self.employer_match.unwrap_or(defaults.employer_match_percent),
            paycheck_frequency,
            year_to_date_contributions: self
                .ytd_contributions
                .unwrap_or(defaults.year_to_date_contributions),
            last_updated: now,
        };
        validate::policy(&policy)?;
        Ok(policy)
    }
}

/// Load all records from a CSV file
pub fn load_policies<P: AsRef<Path>>(path: P, defaults: &PolicyDefaults) -> Result<Vec<ContributionPolicy>> {
    let path = path.as_ref();
    let reader = Reader::from_path(path)
        .map_err(|e| PlannerError::Internal(format!("cannot open {}: {}", path.display(), e)))?;
    read_policies(reader, defaults)
}

/// Load records from any reader (e.g., string buffer, network stream)
pub fn load_policies_from_reader<R: std::io::Read>(
    reader: R,
    defaults: &PolicyDefaults,
) -> Result<Vec<ContributionPolicy>> {
    read_policies(Reader::from_reader(reader), defaults)
}

fn read_policies<R: std::io::Read>(
    mut reader: Reader<R>,
    defaults: &PolicyDefaults,
) -> Result<Vec<ContributionPolicy>> {
    let now = Utc::now();
    let mut policies = Vec::new();

    for (line, result) in reader.deserialize().enumerate() {
        let row: CsvRow = result?;
        let policy = row.to_policy(defaults, now).map_err(|e| match e {
            PlannerError::InvalidInput(issue) => {
                PlannerError::Internal(format!("seed row {}: {}", line + 1, issue))
            }
            other => other,
        })?;
        policies.push(policy);
    }

    Ok(policies)
}
