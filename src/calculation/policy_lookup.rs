//! Policy temporal lookup and overlap detection.
//!
//! This module answers "which multiplier applies to category X on date D" over
//! a pre-fetched set of [`PolicyRecord`]s, and finds the record a new window
//! would collide with.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::models::{PolicyCategory, PolicyRecord, ValidityWindow, WorkType};

/// The multiplier chosen for one day and where it came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MultiplierLookup {
    /// The multiplier to apply.
    pub multiplier: Decimal,
    /// The record it was taken from, or `None` when the default applied.
    pub policy_id: Option<Uuid>,
}

/// Finds the policy record for `category` whose window contains `date`.
///
/// When several records match, the first one in `policies` is returned.
/// Returns `None` rather than an error when nothing matches.
///
/// # Example
///
/// ```
/// use payroll_engine::calculation::find_policy;
/// use payroll_engine::models::{PolicyCategory, PolicyRecord};
/// use chrono::{NaiveDate, Utc};
/// use rust_decimal::Decimal;
///
/// let jan = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
/// let policies = vec![PolicyRecord::new(
///     PolicyCategory::WeekendOvertime,
///     Decimal::new(15, 1),
///     jan,
///     None,
///     Utc::now(),
/// )
/// .unwrap()];
///
/// let hit = find_policy(&policies, PolicyCategory::WeekendOvertime, jan);
/// assert_eq!(hit.map(|p| p.multiplier), Some(Decimal::new(15, 1)));
/// assert!(find_policy(&policies, PolicyCategory::HolidayOvertime, jan).is_none());
/// ```
pub fn find_policy(
    policies: &[PolicyRecord],
    category: PolicyCategory,
    date: NaiveDate,
) -> Option<&PolicyRecord> {
    policies.iter().find(|p| p.applies_to(category, date))
}

/// Resolves the multiplier for a classified day.
///
/// Weekday work is always 1.0. Other work types look up their policy
/// category; an absent policy means no premium, so the multiplier is 1.0.
pub fn resolve_multiplier(
    policies: &[PolicyRecord],
    work_type: WorkType,
    date: NaiveDate,
) -> MultiplierLookup {
    let found = work_type
        .policy_category()
        .and_then(|category| find_policy(policies, category, date));

    match found {
        Some(policy) => MultiplierLookup {
            multiplier: policy.multiplier,
            policy_id: Some(policy.id),
        },
        None => MultiplierLookup {
            multiplier: Decimal::ONE,
            policy_id: None,
        },
    }
}

/// Finds an existing record of `category` whose window intersects `window`.
pub fn find_overlapping_policy<'a>(
    existing: &'a [PolicyRecord],
    category: PolicyCategory,
    window: &ValidityWindow,
) -> Option<&'a PolicyRecord> {
    existing
        .iter()
        .find(|p| p.category == category && p.window.overlaps(window))
}
