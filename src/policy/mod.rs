//! Contribution policy records, validation and seed loading

mod data;
pub mod loader;
pub mod validate;

pub use data::{
    ContributionPolicy, ContributionType, DemographicSummary, PaycheckFrequency, PolicyDefaults,
    PolicyUpdate, PAYCHECKS_PER_YEAR,
};
pub use loader::{load_policies, load_policies_from_reader};
