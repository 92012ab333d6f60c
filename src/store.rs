//! Policy storage keyed by user id
//!
//! Handlers and tests depend on the [`PolicyStore`] trait rather than a
//! process-wide map. [`InMemoryPolicyStore`] is the bundled implementation:
//! a `HashMap` behind an `RwLock`, last write wins.

use std::collections::HashMap;
use std::sync::RwLock;

use chrono::{DateTime, Utc};
use log::{debug, info};

use crate::error::{PlannerError, Result};
use crate::policy::{validate, ContributionPolicy, PolicyDefaults, PolicyUpdate};

/// Read and upsert access to contribution records
pub trait PolicyStore: Send + Sync {
    /// Fetch the record for `user_id`
    fn get(&self, user_id: &str) -> Result<ContributionPolicy>;

    /// Validate `update`, merge it over the previous record (or the defaults
    /// for a new user), store and return the result. Nothing is written when
    /// validation fails.
    fn upsert(&self, user_id: &str, update: &PolicyUpdate) -> Result<ContributionPolicy>;

    /// Number of stored records
    fn len(&self) -> Result<usize>;

    fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }
}

/// In-process store
pub struct InMemoryPolicyStore {
    records: RwLock<HashMap<String, ContributionPolicy>>,
    defaults: PolicyDefaults,
    clock: fn() -> DateTime<Utc>,
}

impl InMemoryPolicyStore {
    pub fn new(defaults: PolicyDefaults) -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
            defaults,
            clock: Utc::now,
        }
    }

    /// Store pre-populated with seed records
    pub fn with_records<I>(defaults: PolicyDefaults, records: I) -> Self
    where
        I: IntoIterator<Item = ContributionPolicy>,
    {
        let records: HashMap<String, ContributionPolicy> = records
            .into_iter()
            .map(|policy| (policy.user_id.clone(), policy))
            .collect();
        Self {
            records: RwLock::new(records),
            defaults,
            clock: Utc::now,
        }
    }

    /// Replace the timestamp source
    pub fn with_clock(mut self, clock: fn() -> DateTime<Utc>) -> Self {
        self.clock = clock;
        self
    }
}

impl Default for InMemoryPolicyStore {
    fn default() -> Self {
        Self::new(PolicyDefaults::STANDARD)
    }
}

fn poisoned() -> PlannerError {
    PlannerError::Internal("policy store lock poisoned".to_string())
}

impl PolicyStore for InMemoryPolicyStore {
    fn get(&self, user_id: &str) -> Result<ContributionPolicy> {
        let records = self.records.read().map_err(|_| poisoned())?;
        records
            .get(user_id)
            .cloned()
            .ok_or_else(|| PlannerError::not_found(user_id))
    }

    fn upsert(&self, user_id: &str, update: &PolicyUpdate) -> Result<ContributionPolicy> {
        validate::user_id(user_id)?;
        validate::update(update)?;

        let mut records = self.records.write().map_err(|_| poisoned())?;
        let previous = records.get(user_id);
        let created = previous.is_none();
        let merged = ContributionPolicy::merged(user_id, previous, &self.defaults, update, (self.clock)());
        validate::policy(&merged)?;

        records.insert(user_id.to_string(), merged.clone());
        if created {
            info!("created contribution record for {}", user_id);
        }
        debug!("stored {:?}", merged);
        Ok(merged)
    }

    fn len(&self) -> Result<usize> {
        let records = self.records.read().map_err(|_| poisoned())?;
        Ok(records.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::ContributionType;
    use chrono::TimeZone;

    #[test]
    fn test_get_unknown_user() {
        let store = InMemoryPolicyStore::default();
        let err = store.get("nobody").unwrap_err();
        assert_eq!(err.kind(), "not_found");
        assert!(store.is_empty().unwrap());
    }

    #[test]
    fn test_upsert_creates_then_replaces() {
        let store = InMemoryPolicyStore::default();
        let created = store
            .upsert("u1", &PolicyUpdate::election(ContributionType::Percentage, 4.0))
            .unwrap();
        assert_eq!(created.annual_salary, PolicyDefaults::STANDARD.annual_salary);
        assert_eq!(store.len().unwrap(), 1);

        let update = PolicyUpdate {
            annual_salary: Some(120_000.0),
            ..PolicyUpdate::election(ContributionType::FixedPerPaycheck, 300.0)
        };
        let replaced = store.upsert("u1", &update).unwrap();
        assert_eq!(replaced.contribution_type, ContributionType::FixedPerPaycheck);
        assert_eq!(replaced.annual_salary, 120_000.0);
        assert_eq!(store.get("u1").unwrap(), replaced);
        assert_eq!(store.len().unwrap(), 1);
    }

    #[test]
    fn test_invalid_update_does_not_mutate() {
        let store = InMemoryPolicyStore::with_records(
            PolicyDefaults::STANDARD,
            [ContributionPolicy::demo("u1", Utc::now())],
        );
        let before = store.get("u1").unwrap();

        let err = store
            .upsert("u1", &PolicyUpdate::election(ContributionType::Percentage, 150.0))
            .unwrap_err();
        assert_eq!(err.kind(), "invalid_input");
        assert_eq!(store.get("u1").unwrap(), before);

        // Merged record with retirement before current age is rejected too
        let update = PolicyUpdate {
            retirement_age: Some(25),
            ..PolicyUpdate::election(ContributionType::Percentage, 5.0)
        };
        assert!(store.upsert("u1", &update).is_err());
        assert_eq!(store.get("u1").unwrap(), before);

        assert!(store.upsert("new", &PolicyUpdate::election(ContributionType::Percentage, -2.0)).is_err());
        assert!(store.get("new").is_err());
    }

    #[test]
    fn test_poisoned_lock_is_internal_error() {
        let store = InMemoryPolicyStore::default();
        let _ = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _guard = store.records.write().unwrap();
            panic!("writer died holding the lock");
        }));

        assert_eq!(store.len().unwrap_err().kind(), "internal_error");
        assert_eq!(store.get("u1").unwrap_err().kind(), "internal_error");
        let update = PolicyUpdate::election(ContributionType::Percentage, 5.0);
        assert_eq!(store.upsert("u1", &update).unwrap_err().kind(), "internal_error");
    }

    #[test]
    fn test_blank_user_id_rejected() {
        let store = InMemoryPolicyStore::default();
        let err = store
            .upsert("  ", &PolicyUpdate::election(ContributionType::Percentage, 5.0))
            .unwrap_err();
        assert_eq!(err.issue().map(|i| i.code()), Some("missing_field"));
    }

    #[test]
    fn test_upsert_twice_is_idempotent() {
        fn fixed_clock() -> DateTime<Utc> {
            Utc.timestamp_opt(1_700_000_000, 0).unwrap()
        }
        let store = InMemoryPolicyStore::default();
        let update = PolicyUpdate::election(ContributionType::Percentage, 7.0);
        let first = store.upsert("u1", &update).unwrap();
        let second = store.upsert("u1", &update).unwrap();
        assert!(first.same_election(&second));

        let store = InMemoryPolicyStore::default().with_clock(fixed_clock);
        let first = store.upsert("u2", &update).unwrap();
        let second = store.upsert("u2", &update).unwrap();
        assert_eq!(first, second);
    }
}
