//! Pay period and date range models.
//!
//! This module contains the [`PayPeriod`] type, a calendar year-month identifying
//! one settlement cycle, and [`DateRange`], the inclusive span of dates that
//! collaborators are queried with.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// An inclusive range of calendar dates.
///
/// # Example
///
/// ```
/// use payroll_engine::models::DateRange;
/// use chrono::NaiveDate;
///
/// let range = DateRange::new(
///     NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
///     NaiveDate::from_ymd_opt(2024, 1, 3).unwrap(),
/// )
/// .unwrap();
/// assert_eq!(range.day_count(), 3);
/// assert!(range.contains(NaiveDate::from_ymd_opt(2024, 1, 3).unwrap()));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateRange {
    /// The first day of the range (inclusive).
    pub start: NaiveDate,
    /// The last day of the range (inclusive).
    pub end: NaiveDate,
}

impl DateRange {
    /// Creates a range, rejecting a start after the end.
    pub fn new(start: NaiveDate, end: NaiveDate) -> EngineResult<Self> {
        if start > end {
            return Err(EngineError::InvalidDateRange { start, end });
        }
        Ok(Self { start, end })
    }

    /// Checks if a given date falls within this range (inclusive of both ends).
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }

    /// Returns true if the two ranges share at least one day.
    pub fn overlaps(&self, other: &DateRange) -> bool {
        self.start <= other.end && other.start <= self.end
    }

    /// Number of days in the range, counting both ends.
    pub fn day_count(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }

    /// Iterates over every date in the range in order.
    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.start.iter_days().take_while(move |d| *d <= self.end)
    }

    /// Returns the part of this range that lies within `bounds`, if any.
    pub fn clamp_to(&self, bounds: &DateRange) -> Option<DateRange> {
        if !self.overlaps(bounds) {
            return None;
        }
        Some(DateRange {
            start: self.start.max(bounds.start),
            end: self.end.min(bounds.end),
        })
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..={}", self.start, self.end)
    }
}

/// A calendar year-month identifying one payroll settlement cycle.
///
/// Serializes as a `"YYYY-MM"` string.
///
/// # Example
///
/// ```
/// use payroll_engine::models::PayPeriod;
/// use chrono::NaiveDate;
///
/// let period: PayPeriod = "2024-02".parse().unwrap();
/// assert_eq!(period.first_day(), NaiveDate::from_ymd_opt(2024, 2, 1).unwrap());
/// assert_eq!(period.last_day(), NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
/// assert_eq!(period.to_string(), "2024-02");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PayPeriod {
    year: i32,
    month: u32,
}

impl PayPeriod {
    /// Creates a period for the given year and month (1-12).
    pub fn new(year: i32, month: u32) -> EngineResult<Self> {
        if NaiveDate::from_ymd_opt(year, month, 1).is_none() {
            return Err(EngineError::InvalidPeriod {
                value: format!("{:04}-{:02}", year, month),
            });
        }
        Ok(Self { year, month })
    }

    /// Returns the period containing the given date.
    pub fn containing(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// The calendar year.
    pub fn year(&self) -> i32 {
        self.year
    }

    /// The calendar month (1-12).
    pub fn month(&self) -> u32 {
        self.month
    }

    /// The first day of the month.
    pub fn first_day(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or(NaiveDate::MIN)
    }

    /// The last day of the month.
    pub fn last_day(&self) -> NaiveDate {
        let (year, month) = if self.month == 12 {
            (self.year + 1, 1)
        } else {
            (self.year, self.month + 1)
        };
        NaiveDate::from_ymd_opt(year, month, 1)
            .and_then(|d| d.pred_opt())
            .unwrap_or(NaiveDate::MAX)
    }

    /// The full month as an inclusive date range.
    pub fn date_range(&self) -> DateRange {
        DateRange {
            start: self.first_day(),
            end: self.last_day(),
        }
    }

    /// Checks if a given date falls within this period.
    pub fn contains_date(&self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }
}

impl fmt::Display for PayPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for PayPeriod {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || EngineError::InvalidPeriod {
            value: s.to_string(),
        };
        let (year, month) = s.trim().split_once('-').ok_or_else(invalid)?;
        if month.len() != 2 {
            return Err(invalid());
        }
        let year: i32 = year.parse().map_err(|_| invalid())?;
        let month: u32 = month.parse().map_err(|_| invalid())?;
        PayPeriod::new(year, month).map_err(|_| invalid())
    }
}

impl TryFrom<String> for PayPeriod {
    type Error = EngineError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<PayPeriod> for String {
    fn from(value: PayPeriod) -> Self {
        value.to_string()
    }
}
