//! Contribution Planner - 401(k) contribution elections and retirement projections
//!
//! This library provides:
//! - Contribution policy records with validation and default back-filling
//! - A policy store abstraction with an in-memory implementation
//! - Future-value projections of a contribution policy to retirement
//! - A lazy year-by-year balance series for charting
//! - Batch scenario sweeps over contribution values and return rates
//! - An HTTP API over the store and calculator

pub mod api;
pub mod config;
pub mod contribution;
pub mod error;
pub mod policy;
pub mod projection;
pub mod scenario;
pub mod store;

// Re-export commonly used types
pub use error::{PlannerError, ValidationIssue};
pub use policy::{ContributionPolicy, ContributionType, PolicyDefaults, PolicyUpdate};
pub use projection::{ProjectionCalculator, ProjectionInput, ProjectionResult, SeriesPoint};
pub use scenario::ScenarioRunner;
pub use store::{InMemoryPolicyStore, PolicyStore};
