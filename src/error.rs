//! Error taxonomy shared by the store, the calculator and the HTTP layer

use thiserror::Error;

/// Why a field was rejected
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationIssue {
    /// A required field was absent from the request
    #[error("{field} is required")]
    MissingField { field: &'static str },

    /// A string field did not name a known variant
    #[error("{field} must be one of {expected}, got \"{value}\"")]
    InvalidEnum {
        field: &'static str,
        value: String,
        expected: &'static str,
    },

    /// A numeric field fell outside its allowed range
    #[error("{field} {reason} (got {value})")]
    OutOfRange {
        field: &'static str,
        value: f64,
        reason: &'static str,
    },

    /// The request body could not be decoded at all
    #[error("request body is malformed: {detail}")]
    Malformed { detail: String },
}

impl ValidationIssue {
    /// Machine-readable code for API responses
    pub fn code(&self) -> &'static str {
        match self {
            ValidationIssue::MissingField { .. } => "missing_field",
            ValidationIssue::InvalidEnum { .. } => "invalid_enum",
            ValidationIssue::OutOfRange { .. } => "out_of_range",
            ValidationIssue::Malformed { .. } => "malformed_body",
        }
    }

    /// Name of the offending field
    pub fn field(&self) -> &'static str {
        match self {
            ValidationIssue::MissingField { field }
            | ValidationIssue::InvalidEnum { field, .. }
            | ValidationIssue::OutOfRange { field, .. } => field,
            ValidationIssue::Malformed { .. } => "body",
        }
    }
}

/// Errors surfaced to callers of the planner
#[derive(Debug, Error)]
pub enum PlannerError {
    #[error("no contribution data found for user {user_id}")]
    NotFound { user_id: String },

    #[error("invalid input: {0}")]
    InvalidInput(#[from] ValidationIssue),

    #[error("internal error: {0}")]
    Internal(String),
}

impl PlannerError {
    /// Machine-readable error kind
    pub fn kind(&self) -> &'static str {
        match self {
            PlannerError::NotFound { .. } => "not_found",
            PlannerError::InvalidInput(_) => "invalid_input",
            PlannerError::Internal(_) => "internal_error",
        }
    }

    pub fn not_found(user_id: impl Into<String>) -> Self {
        PlannerError::NotFound { user_id: user_id.into() }
    }

    pub fn missing(field: &'static str) -> Self {
        ValidationIssue::MissingField { field }.into()
    }

    pub fn out_of_range(field: &'static str, value: f64, reason: &'static str) -> Self {
        ValidationIssue::OutOfRange { field, value, reason }.into()
    }

    /// The validation detail, if this is an input error
    pub fn issue(&self) -> Option<&ValidationIssue> {
        match self {
            PlannerError::InvalidInput(issue) => Some(issue),
            _ => None,
        }
    }
}

impl From<csv::Error> for PlannerError {
    fn from(err: csv::Error) -> Self {
        PlannerError::Internal(format!("csv: {}", err))
    }
}

impl From<std::io::Error> for PlannerError {
    fn from(err: std::io::Error) -> Self {
        PlannerError::Internal(format!("io: {}", err))
    }
}

pub type Result<T> = std::result::Result<T, PlannerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinds_and_codes() {
        assert_eq!(PlannerError::not_found("u1").kind(), "not_found");
        assert_eq!(PlannerError::Internal("boom".into()).kind(), "internal_error");

        let err = PlannerError::missing("contributionType");
        assert_eq!(err.kind(), "invalid_input");
        assert_eq!(err.issue().map(|i| i.code()), Some("missing_field"));
        assert_eq!(err.issue().map(|i| i.field()), Some("contributionType"));
    }

    #[test]
    fn test_messages_are_readable() {
        let err = PlannerError::out_of_range("contributionValue", 150.0, "must be between 0 and 100");
        assert_eq!(
            err.to_string(),
            "invalid input: contributionValue must be between 0 and 100 (got 150)"
        );

        let err: PlannerError = ValidationIssue::InvalidEnum {
            field: "contributionType",
            value: "bonus".into(),
            expected: "\"percentage\" or \"fixed\"",
        }
        .into();
        assert!(err.to_string().contains("\"bonus\""));
    }
}
