//! Holiday calendar.
//!
//! A deterministic, in-process calendar: holidays that recur on the same
//! month/day every year plus one-off dated holidays. No network lookups.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// A holiday falling on the same month and day every year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecurringHoliday {
    /// Month (1-12).
    pub month: u32,
    /// Day of month.
    pub day: u32,
    /// Display name.
    pub name: String,
}

/// A holiday on one specific date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicHoliday {
    /// The date of the holiday.
    pub date: NaiveDate,
    /// Display name.
    pub name: String,
}

/// The set of dates classified as holidays.
///
/// # Example
///
/// ```
/// use payroll_engine::calculation::HolidayCalendar;
/// use chrono::NaiveDate;
///
/// let calendar = HolidayCalendar::default();
/// assert!(calendar.is_holiday(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()));
/// assert!(calendar.is_holiday(NaiveDate::from_ymd_opt(2031, 12, 25).unwrap()));
/// assert!(!calendar.is_holiday(NaiveDate::from_ymd_opt(2024, 1, 2).unwrap()));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HolidayCalendar {
    /// Holidays repeating every year.
    #[serde(default)]
    pub recurring: Vec<RecurringHoliday>,
    /// One-off holidays.
    #[serde(default)]
    pub dated: Vec<PublicHoliday>,
}

impl Default for HolidayCalendar {
    fn default() -> Self {
        let fixed = |month, day, name: &str| RecurringHoliday {
            month,
            day,
            name: name.to_string(),
        };
        Self {
            recurring: vec![
                fixed(1, 1, "New Year's Day"),
                fixed(5, 1, "Labour Day"),
                fixed(12, 25, "Christmas Day"),
            ],
            dated: Vec::new(),
        }
    }
}

impl HolidayCalendar {
    /// A calendar with no holidays at all.
    pub fn empty() -> Self {
        Self {
            recurring: Vec::new(),
            dated: Vec::new(),
        }
    }

    /// Returns a copy of this calendar with an extra dated holiday.
    pub fn with_holiday(&self, date: NaiveDate, name: impl Into<String>) -> Self {
        let mut dated = self.dated.clone();
        dated.push(PublicHoliday {
            date,
            name: name.into(),
        });
        Self {
            recurring: self.recurring.clone(),
            dated,
        }
    }

    /// Returns the holiday name for `date`, if it is one.
    pub fn holiday_name(&self, date: NaiveDate) -> Option<&str> {
        self.dated
            .iter()
            .find(|h| h.date == date)
            .map(|h| h.name.as_str())
            .or_else(|| {
                self.recurring
                    .iter()
                    .find(|h| h.month == date.month() && h.day == date.day())
                    .map(|h| h.name.as_str())
            })
    }

    /// Returns true if `date` is a holiday.
    pub fn is_holiday(&self, date: NaiveDate) -> bool {
        self.holiday_name(date).is_some()
    }
}
