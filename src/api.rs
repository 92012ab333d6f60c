//! HTTP surface
//!
//! | Method | Path | |
//! |---|---|---|
//! | GET | `/api/health` | liveness |
//! | GET | `/api/contribution?userId=` | stored record |
//! | POST/PUT | `/api/contribution` | validate and upsert an election |
//! | GET | `/api/user/:user_id` | demographic summary |
//! | POST | `/api/calculate-projection` | projection for a (possibly unsaved) policy |
//!
//! Errors are returned as `{"error": kind, "code": issue, "field": name, "message": text}`
//! with 400 for invalid input, 404 for unknown users and 500 otherwise.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::{header, HeaderValue, StatusCode},
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use log::{error, info, warn};
use serde::{Deserialize, Serialize};

use crate::contribution::ContributionImpact;
use crate::error::{PlannerError, Result, ValidationIssue};
use crate::policy::{validate, ContributionPolicy, ContributionType, DemographicSummary, PolicyUpdate};
use crate::projection::{
    ProjectionCalculator, ProjectionConfig, ProjectionInput, ProjectionResult, SeriesCompounding,
    DEFAULT_ANNUAL_RETURN,
};
use crate::store::PolicyStore;

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    store: Arc<dyn PolicyStore>,
    calculator: ProjectionCalculator,
    default_user_id: Arc<str>,
}

impl AppState {
    pub fn new(store: Arc<dyn PolicyStore>, default_user_id: &str) -> Self {
        Self {
            store,
            calculator: ProjectionCalculator::default(),
            default_user_id: Arc::from(default_user_id),
        }
    }

    /// The requested user id, or the default user when none was given
    fn resolve_user(&self, user_id: Option<String>) -> String {
        user_id
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty())
            .unwrap_or_else(|| self.default_user_id.to_string())
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .route(
            "/api/contribution",
            get(get_contribution)
                .post(upsert_contribution)
                .put(upsert_contribution)
                .options(preflight),
        )
        .route("/api/user/:user_id", get(get_user))
        .route("/api/calculate-projection", post(calculate_projection).options(preflight))
        .layer(middleware::map_response(allow_any_origin))
        .with_state(state)
}

async fn allow_any_origin(mut response: Response) -> Response {
    let headers = response.headers_mut();
    headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static("GET, POST, PUT, OPTIONS"),
    );
    headers.insert(header::ACCESS_CONTROL_ALLOW_HEADERS, HeaderValue::from_static("Content-Type"));
    response
}

async fn preflight() -> StatusCode {
    StatusCode::NO_CONTENT
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// A planner error on its way out as an HTTP response
#[derive(Debug)]
pub struct ApiError(pub PlannerError);

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self.0 {
            PlannerError::NotFound { .. } => StatusCode::NOT_FOUND,
            PlannerError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            PlannerError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn body(&self) -> ErrorBody {
        let issue = self.0.issue();
        ErrorBody {
            error: self.0.kind(),
            code: issue.map(ValidationIssue::code),
            field: issue.map(ValidationIssue::field),
            message: self.0.to_string(),
        }
    }
}

impl From<PlannerError> for ApiError {
    fn from(err: PlannerError) -> Self {
        ApiError(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError(ValidationIssue::Malformed { detail: rejection.body_text() }.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("request failed: {}", self.0);
        } else {
            warn!("request rejected: {}", self.0);
        }
        (status, Json(self.body())).into_response()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorBody {
    pub error: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<&'static str>,
    pub message: String,
}

// ---------------------------------------------------------------------------
// Requests and responses
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserQuery {
    #[serde(rename = "userId")]
    pub user_id: Option<String>,
}

/// Body of an upsert. Everything is optional at this level so that missing
/// and malformed fields are reported through the validation taxonomy.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpsertRequest {
    pub user_id: Option<String>,
    pub contribution_type: Option<String>,
    pub contribution_value: Option<f64>,
    pub annual_salary: Option<f64>,
    pub current_age: Option<i64>,
    pub retirement_age: Option<i64>,
    pub employer_match: Option<f64>,
    pub ytd_contributions: Option<f64>,
}

impl UpsertRequest {
    pub fn to_update(&self) -> Result<PolicyUpdate> {
        let contribution_type = validate::require("contributionType", self.contribution_type.as_deref())?;
        let contribution_type = ContributionType::parse("contributionType", contribution_type)?;
        let contribution_value = validate::require("contributionValue", self.contribution_value)?;

        Ok(PolicyUpdate {
            contribution_type,
            contribution_value,
            annual_salary: self.annual_salary,
            current_age: validate::optional_age("currentAge", self.current_age)?,
            retirement_age: validate::optional_age("retirementAge", self.retirement_age)?,
            employer_match_percent: self.employer_match,
            year_to_date_contributions: self.ytd_contributions,
        })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct UpsertResponse {
    pub success: bool,
    pub message: &'static str,
    pub data: ContributionPolicy,
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectionRequest {
    pub current_age: Option<i64>,
    pub retirement_age: Option<i64>,
    pub annual_salary: Option<f64>,
    pub contribution_type: Option<String>,
    pub contribution_value: Option<f64>,
    pub current_balance: Option<f64>,
    /// Annual return as a decimal (0.07 for 7%)
    #[serde(alias = "annualReturnRate")]
    pub annual_return: Option<f64>,
    pub include_series: Option<bool>,
    pub series_compounding: Option<String>,
}

impl ProjectionRequest {
    pub fn to_input(&self) -> Result<(ProjectionInput, ProjectionConfig)> {
        let contribution_type = self
            .contribution_type
            .as_deref()
            .map(|t| ContributionType::parse("contributionType", t))
            .transpose()?;

        let series_compounding = match self.series_compounding.as_deref() {
            None => SeriesCompounding::default(),
            Some("annual") => SeriesCompounding::Annual,
            Some("monthly") => SeriesCompounding::Monthly,
            Some(other) => {
                return Err(ValidationIssue::InvalidEnum {
                    field: "seriesCompounding",
                    value: other.to_string(),
                    expected: "\"annual\" or \"monthly\"",
                }
                .into())
            }
        };

        let input = ProjectionInput {
            current_age: validate::optional_age("currentAge", self.current_age)?,
            retirement_age: validate::optional_age("retirementAge", self.retirement_age)?,
            annual_salary: self.annual_salary,
            contribution_type,
            contribution_value: self.contribution_value,
            current_balance: self.current_balance.unwrap_or(0.0),
            annual_return_rate: self.annual_return.unwrap_or(DEFAULT_ANNUAL_RETURN),
            ..ProjectionInput::default()
        };
        let config = ProjectionConfig {
            include_series: self.include_series.unwrap_or(true),
            series_compounding,
        };
        Ok((input, config))
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ProjectionEnvelope {
    pub projection: ProjectionView,
}

/// Projection as returned over HTTP: currency in whole units, return in percent
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectionView {
    pub total_at_retirement: i64,
    pub total_contributions: i64,
    pub investment_gains: i64,
    pub monthly_contribution: i64,
    pub years_to_retirement: u32,
    pub assumed_annual_return: f64,
    pub contribution_impact: ContributionImpact,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub series_compounding: Option<SeriesCompounding>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub series: Option<Vec<ChartPoint>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ChartPoint {
    pub age: u32,
    pub balance: i64,
    pub contributions: i64,
}

fn whole(value: f64) -> i64 {
    value.round() as i64
}

impl ProjectionView {
    fn new(result: ProjectionResult, impact: ContributionImpact, config: &ProjectionConfig) -> Self {
        let series = result.series.map(|points| {
            points
                .iter()
                .map(|p| ChartPoint {
                    age: p.age,
                    balance: whole(p.cumulative_balance),
                    contributions: whole(p.cumulative_contributions),
                })
                .collect::<Vec<_>>()
        });

        Self {
            total_at_retirement: whole(result.total_at_retirement),
            total_contributions: whole(result.total_contributions),
            investment_gains: whole(result.investment_gains),
            monthly_contribution: whole(result.monthly_contribution),
            years_to_retirement: result.years_to_retirement,
            // 0.07 * 100 is not exactly 7 in binary floating point
            assumed_annual_return: (result.assumed_annual_return * 100.0 * 1e6).round() / 1e6,
            contribution_impact: impact,
            series_compounding: series.as_ref().map(|_| config.series_compounding),
            series,
        }
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        timestamp: Utc::now(),
    })
}

pub async fn get_contribution(
    State(state): State<AppState>,
    Query(query): Query<UserQuery>,
) -> std::result::Result<Json<ContributionPolicy>, ApiError> {
    let user_id = state.resolve_user(query.user_id);
    Ok(Json(state.store.get(&user_id)?))
}

pub async fn upsert_contribution(
    State(state): State<AppState>,
    payload: std::result::Result<Json<UpsertRequest>, JsonRejection>,
) -> std::result::Result<Json<UpsertResponse>, ApiError> {
    let Json(request) = payload?;
    let update = request.to_update()?;
    let user_id = state.resolve_user(request.user_id);

    let data = state.store.upsert(&user_id, &update)?;
    info!(
        "updated contribution for {}: {} {}",
        user_id,
        data.contribution_type.as_str(),
        data.contribution_value
    );

    Ok(Json(UpsertResponse {
        success: true,
        message: "Contribution settings updated successfully",
        data,
    }))
}

pub async fn get_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> std::result::Result<Json<DemographicSummary>, ApiError> {
    let policy = state.store.get(&user_id)?;
    Ok(Json(DemographicSummary::from(&policy)))
}

pub async fn calculate_projection(
    State(state): State<AppState>,
    payload: std::result::Result<Json<ProjectionRequest>, JsonRejection>,
) -> std::result::Result<Json<ProjectionEnvelope>, ApiError> {
    let Json(request) = payload?;
    let (input, config) = request.to_input()?;

    let result = state.calculator.project_with(&input, &config)?;
    let impact = input.contribution_impact()?;

    Ok(Json(ProjectionEnvelope {
        projection: ProjectionView::new(result, impact, &config),
    }))
}
