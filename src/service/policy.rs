//! Policy registration.

use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::{info, warn};

use crate::calculation::find_overlapping_policy;
use crate::error::{EngineError, EngineResult};
use crate::models::{PolicyCategory, PolicyRecord, RequestContext};
use crate::store::{PolicyStore, StoreError};

/// Registers time-bounded multipliers, refusing same-category overlaps.
#[derive(Debug)]
pub struct PolicyService<S> {
    store: Arc<S>,
}

impl<S: PolicyStore> PolicyService<S> {
    /// Creates a service over `store`.
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Registers a new policy record.
    ///
    /// # Errors
    ///
    /// - `InvalidPolicy` if the multiplier is outside [0, 10]
    /// - `InvalidDateRange` if `valid_from` is after `valid_to`
    /// - `OverlappingPolicy` if an existing record of the same category has an
    ///   intersecting window
    ///
    /// # Example
    ///
    /// ```
    /// use std::sync::Arc;
    /// use chrono::NaiveDate;
    /// use payroll_engine::models::{PolicyCategory, RequestContext};
    /// use payroll_engine::service::PolicyService;
    /// use payroll_engine::store::InMemoryStore;
    /// use rust_decimal::Decimal;
    ///
    /// let service = PolicyService::new(Arc::new(InMemoryStore::new()));
    /// let ctx = RequestContext::new("admin");
    /// let jan = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    /// let jun = NaiveDate::from_ymd_opt(2024, 6, 30).unwrap();
    /// let mar = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
    ///
    /// service
    ///     .create_policy(&ctx, PolicyCategory::WeekendOvertime, Decimal::new(15, 1), jan, Some(jun))
    ///     .unwrap();
    /// assert!(service
    ///     .create_policy(&ctx, PolicyCategory::WeekendOvertime, Decimal::TWO, mar, None)
    ///     .is_err());
    /// assert!(service
    ///     .create_policy(&ctx, PolicyCategory::HolidayOvertime, Decimal::TWO, mar, None)
    ///     .is_ok());
    /// ```
    pub fn create_policy(
        &self,
        ctx: &RequestContext,
        category: PolicyCategory,
        multiplier: Decimal,
        valid_from: NaiveDate,
        valid_to: Option<NaiveDate>,
    ) -> EngineResult<PolicyRecord> {
        match self.register(ctx, category, multiplier, valid_from, valid_to) {
            Ok(record) => {
                info!(
                    correlation_id = %ctx.correlation_id,
                    policy_id = %record.id,
                    category = %record.category,
                    multiplier = %record.multiplier,
                    valid_from = %record.window.valid_from,
                    "Policy created"
                );
                Ok(record)
            }
            Err(err) => {
                warn!(
                    correlation_id = %ctx.correlation_id,
                    category = %category,
                    error = %err,
                    "Policy creation rejected"
                );
                Err(err)
            }
        }
    }

    fn register(
        &self,
        ctx: &RequestContext,
        category: PolicyCategory,
        multiplier: Decimal,
        valid_from: NaiveDate,
        valid_to: Option<NaiveDate>,
    ) -> EngineResult<PolicyRecord> {
        let record = PolicyRecord::new(category, multiplier, valid_from, valid_to, ctx.now)?;

        self.ensure_no_overlap(&record)?;
        match self.store.insert_policy(record.clone()) {
            Ok(stored) => Ok(stored),
            // Lost a race with a concurrent insert; report the record that won.
            Err(StoreError::Conflict) => {
                self.ensure_no_overlap(&record)?;
                Err(StoreError::Conflict.into())
            }
            Err(other) => Err(other.into()),
        }
    }

    fn ensure_no_overlap(&self, record: &PolicyRecord) -> EngineResult<()> {
        let existing = self.store.all_policies()?;
        match find_overlapping_policy(&existing, record.category, &record.window) {
            Some(clash) => Err(EngineError::OverlappingPolicy {
                category: record.category,
                valid_from: record.window.valid_from,
                existing_id: clash.id,
            }),
            None => Ok(()),
        }
    }

    /// Records in force on `on`.
    pub fn active_policies(&self, on: NaiveDate) -> EngineResult<Vec<PolicyRecord>> {
        Ok(self.store.active_policies(on)?)
    }
}
