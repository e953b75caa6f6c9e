//! Policy multiplier records.
//!
//! A [`PolicyRecord`] states which multiplier applies to a [`PolicyCategory`]
//! during a [`ValidityWindow`]. Windows may be open-ended.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{EngineError, EngineResult};

/// Largest multiplier a policy may carry.
pub const MAX_MULTIPLIER: Decimal = Decimal::TEN;

/// The category a policy multiplier is registered under.
///
/// Distinct from the work-type a day is classified as; see
/// [`WorkType::policy_category`](super::WorkType::policy_category).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyCategory {
    /// Premium for weekday overtime (also used for night work).
    WeekdayOvertime,
    /// Premium for weekend work.
    WeekendOvertime,
    /// Premium for holiday work.
    HolidayOvertime,
    /// Night-shift premium.
    NightShift,
    /// Holiday work allowance.
    HolidayWork,
    /// Bonus multiplier.
    Bonus,
    /// General allowance multiplier.
    Allowance,
}

impl fmt::Display for PolicyCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PolicyCategory::WeekdayOvertime => "weekday_overtime",
            PolicyCategory::WeekendOvertime => "weekend_overtime",
            PolicyCategory::HolidayOvertime => "holiday_overtime",
            PolicyCategory::NightShift => "night_shift",
            PolicyCategory::HolidayWork => "holiday_work",
            PolicyCategory::Bonus => "bonus",
            PolicyCategory::Allowance => "allowance",
        };
        write!(f, "{}", name)
    }
}

/// The dates during which a policy is in force.
///
/// An absent `valid_to` means the window never ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ValidityWindow {
    /// First day the policy applies (inclusive).
    pub valid_from: NaiveDate,
    /// Last day the policy applies (inclusive), or `None` for open-ended.
    #[serde(default)]
    pub valid_to: Option<NaiveDate>,
}

impl ValidityWindow {
    /// Creates a window, rejecting an end before the start.
    pub fn new(valid_from: NaiveDate, valid_to: Option<NaiveDate>) -> EngineResult<Self> {
        if let Some(end) = valid_to {
            if end < valid_from {
                return Err(EngineError::InvalidDateRange {
                    start: valid_from,
                    end,
                });
            }
        }
        Ok(Self {
            valid_from,
            valid_to,
        })
    }

    /// Returns true if the policy is in force on `date`.
    ///
    /// # Example
    ///
    /// ```
    /// use payroll_engine::models::ValidityWindow;
    /// use chrono::NaiveDate;
    ///
    /// let from = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    /// let open = ValidityWindow::new(from, None).unwrap();
    /// assert!(open.contains(NaiveDate::from_ymd_opt(2099, 12, 31).unwrap()));
    /// assert!(!open.contains(NaiveDate::from_ymd_opt(2023, 12, 31).unwrap()));
    /// ```
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.valid_from && self.valid_to.is_none_or(|end| date <= end)
    }

    /// Returns true if the two windows share at least one day.
    ///
    /// Two windows overlap unless one ends strictly before the other starts;
    /// an absent end never ends.
    pub fn overlaps(&self, other: &ValidityWindow) -> bool {
        let self_ends_first = self.valid_to.is_some_and(|end| end < other.valid_from);
        let other_ends_first = other.valid_to.is_some_and(|end| end < self.valid_from);
        !self_ends_first && !other_ends_first
    }
}

/// A time-bounded multiplier for one policy category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyRecord {
    /// Unique identifier for the record.
    pub id: Uuid,
    /// The category this multiplier applies to.
    pub category: PolicyCategory,
    /// The multiplier, within `[0, MAX_MULTIPLIER]`.
    pub multiplier: Decimal,
    /// When the multiplier is in force.
    #[serde(flatten)]
    pub window: ValidityWindow,
    /// When the record was registered.
    pub created_at: DateTime<Utc>,
}

impl PolicyRecord {
    /// Creates a policy record after checking the multiplier bounds and window order.
    ///
    /// # Example
    ///
    /// ```
    /// use payroll_engine::models::{PolicyCategory, PolicyRecord};
    /// use chrono::{NaiveDate, Utc};
    /// use rust_decimal::Decimal;
    ///
    /// let from = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    /// let record = PolicyRecord::new(
    ///     PolicyCategory::WeekendOvertime,
    ///     Decimal::new(15, 1),
    ///     from,
    ///     None,
    ///     Utc::now(),
    /// )
    /// .unwrap();
    /// assert!(record.window.valid_to.is_none());
    ///
    /// assert!(PolicyRecord::new(
    ///     PolicyCategory::Bonus,
    ///     Decimal::from(11),
    ///     from,
    ///     None,
    ///     Utc::now(),
    /// )
    /// .is_err());
    /// ```
    pub fn new(
        category: PolicyCategory,
        multiplier: Decimal,
        valid_from: NaiveDate,
        valid_to: Option<NaiveDate>,
        created_at: DateTime<Utc>,
    ) -> EngineResult<Self> {
        let record = Self {
            id: Uuid::new_v4(),
            category,
            multiplier,
            window: ValidityWindow::new(valid_from, valid_to)?,
            created_at,
        };
        record.validate()?;
        Ok(record)
    }

    /// Checks the multiplier bounds and window order.
    pub fn validate(&self) -> EngineResult<()> {
        if self.multiplier.is_sign_negative() || self.multiplier > MAX_MULTIPLIER {
            return Err(EngineError::InvalidPolicy {
                message: format!(
                    "multiplier {} for {} must be between 0 and {}",
                    self.multiplier, self.category, MAX_MULTIPLIER
                ),
            });
        }
        ValidityWindow::new(self.window.valid_from, self.window.valid_to)?;
        Ok(())
    }

    /// Returns true if this record applies to `category` on `date`.
    pub fn applies_to(&self, category: PolicyCategory, date: NaiveDate) -> bool {
        self.category == category && self.window.contains(date)
    }
}
