//! Work-type classification.
//!
//! This module assigns every attendance day exactly one [`WorkType`] by fixed
//! priority: Holiday, then Weekend, then Night, then Weekday.

use chrono::{Datelike, NaiveTime, Weekday};
use serde::{Deserialize, Serialize};

use crate::models::{AttendanceInterval, WorkType};

use super::holiday::HolidayCalendar;

/// The local time-of-day window counted as night.
///
/// `start` is inclusive and `end` exclusive. When `start` is later than `end`
/// the window wraps past midnight.
///
/// # Example
///
/// ```
/// use payroll_engine::calculation::NightWindow;
/// use chrono::NaiveTime;
///
/// let window = NightWindow::default(); // 22:00-06:00
/// assert!(window.contains(NaiveTime::from_hms_opt(23, 30, 0).unwrap()));
/// assert!(window.contains(NaiveTime::from_hms_opt(5, 59, 0).unwrap()));
/// assert!(!window.contains(NaiveTime::from_hms_opt(6, 0, 0).unwrap()));
/// assert!(!window.contains(NaiveTime::from_hms_opt(12, 0, 0).unwrap()));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NightWindow {
    /// When night begins.
    pub start: NaiveTime,
    /// When night ends.
    pub end: NaiveTime,
}

impl Default for NightWindow {
    fn default() -> Self {
        Self {
            start: NaiveTime::from_hms_opt(22, 0, 0).unwrap_or(NaiveTime::MIN),
            end: NaiveTime::from_hms_opt(6, 0, 0).unwrap_or(NaiveTime::MIN),
        }
    }
}

impl NightWindow {
    /// Returns true if `time` falls inside the window.
    pub fn contains(&self, time: NaiveTime) -> bool {
        if self.start <= self.end {
            time >= self.start && time < self.end
        } else {
            time >= self.start || time < self.end
        }
    }
}

/// Classifies attendance days using a holiday calendar and a night window.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkTypeClassifier {
    /// Dates treated as holidays.
    pub calendar: HolidayCalendar,
    /// Times of day treated as night.
    pub night_window: NightWindow,
}

impl WorkTypeClassifier {
    /// Creates a classifier from its parts.
    pub fn new(calendar: HolidayCalendar, night_window: NightWindow) -> Self {
        Self {
            calendar,
            night_window,
        }
    }

    /// Determines the work type for one attendance day.
    ///
    /// Priority is Holiday > Weekend > Night > Weekday. A day is Night when
    /// either the check-in or the check-out time falls in the night window;
    /// the whole day is then Night, not just the overlapping hours. An open
    /// record is judged on its check-in alone. Never fails.
    ///
    /// # Example
    ///
    /// ```
    /// use payroll_engine::calculation::WorkTypeClassifier;
    /// use payroll_engine::models::{AttendanceInterval, WorkType};
    /// use chrono::NaiveDate;
    ///
    /// let classifier = WorkTypeClassifier::default();
    ///
    /// // New Year's Day, checked in at 23:30: holiday beats night.
    /// let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    /// let attendance = AttendanceInterval::new(
    ///     "w1",
    ///     date,
    ///     date.and_hms_opt(23, 30, 0).unwrap(),
    ///     Some(date.succ_opt().unwrap().and_hms_opt(7, 30, 0).unwrap()),
    /// )
    /// .unwrap();
    /// assert_eq!(classifier.classify(&attendance), WorkType::Holiday);
    /// ```
    pub fn classify(&self, attendance: &AttendanceInterval) -> WorkType {
        if self.calendar.is_holiday(attendance.date) {
            return WorkType::Holiday;
        }
        if matches!(attendance.date.weekday(), Weekday::Sat | Weekday::Sun) {
            return WorkType::Weekend;
        }
        let touches_night = self.night_window.contains(attendance.check_in.time())
            || attendance
                .check_out
                .is_some_and(|out| self.night_window.contains(out.time()));
        if touches_night {
            return WorkType::Night;
        }
        WorkType::Weekday
    }
}
