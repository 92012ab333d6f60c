//! Field validation for policy updates and projection inputs
//!
//! Every check returns `PlannerError::InvalidInput` carrying a
//! [`ValidationIssue`] so callers can tell a missing field from a bad enum
//! value from an out-of-range number.

use super::data::{ContributionPolicy, ContributionType, PolicyUpdate};
use crate::error::{PlannerError, Result};

/// Unwrap a required field or report it missing
pub fn require<T>(field: &'static str, value: Option<T>) -> Result<T> {
    value.ok_or_else(|| PlannerError::missing(field))
}

/// Accept an optional integer age, rejecting zero, negatives and absurd values
pub fn optional_age(field: &'static str, value: Option<i64>) -> Result<Option<u32>> {
    match value {
        None => Ok(None),
        Some(age) if age <= 0 => Err(PlannerError::out_of_range(
            field,
            age as f64,
            "must be a positive integer",
        )),
        Some(age) if age > 150 => Err(PlannerError::out_of_range(field, age as f64, "must be at most 150")),
        Some(age) => Ok(Some(age as u32)),
    }
}

/// Check that a contribution value fits its type's range
pub fn contribution(contribution_type: ContributionType, value: f64) -> Result<()> {
    if !value.is_finite() {
        return Err(PlannerError::out_of_range("contributionValue", value, "must be a finite number"));
    }
    match contribution_type {
        ContributionType::Percentage if !(0.0..=100.0).contains(&value) => Err(
            PlannerError::out_of_range("contributionValue", value, "percentage must be between 0 and 100"),
        ),
        ContributionType::FixedPerPaycheck if value < 0.0 => Err(PlannerError::out_of_range(
            "contributionValue",
            value,
            "fixed amount must be non-negative",
        )),
        _ => Ok(()),
    }
}

pub fn positive_salary(value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(PlannerError::out_of_range("annualSalary", value, "must be greater than 0"))
    }
}

pub fn non_negative(field: &'static str, value: f64) -> Result<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(PlannerError::out_of_range(field, value, "must be non-negative"))
    }
}

pub fn age_order(current_age: u32, retirement_age: u32) -> Result<()> {
    if retirement_age > current_age {
        Ok(())
    } else {
        Err(PlannerError::out_of_range(
            "retirementAge",
            retirement_age as f64,
            "must be greater than currentAge",
        ))
    }
}

pub fn user_id(user_id: &str) -> Result<()> {
    if user_id.trim().is_empty() {
        Err(PlannerError::missing("userId"))
    } else {
        Ok(())
    }
}

/// Validate every field an update carries
pub fn update(update: &PolicyUpdate) -> Result<()> {
    contribution(update.contribution_type, update.contribution_value)?;
    if let Some(salary) = update.annual_salary {
        positive_salary(salary)?;
    }
    if let Some(age) = update.current_age {
        optional_age("currentAge", Some(age as i64))?;
    }
    if let Some(age) = update.retirement_age {
        optional_age("retirementAge", Some(age as i64))?;
    }
    if let Some(pct) = update.employer_match_percent {
        non_negative("employerMatch", pct)?;
    }
    if let Some(ytd) = update.year_to_date_contributions {
        non_negative("ytdContributions", ytd)?;
    }
    Ok(())
}

/// Validate a complete record, e.g. after merging or when seeded from CSV
pub fn policy(policy: &ContributionPolicy) -> Result<()> {
    user_id(&policy.user_id)?;
    contribution(policy.contribution_type, policy.contribution_value)?;
    positive_salary(policy.annual_salary)?;
    age_order(policy.current_age, policy.retirement_age)?;
    non_negative("employerMatch", policy.employer_match_percent)?;
    non_negative("ytdContributions", policy.year_to_date_contributions)
}
