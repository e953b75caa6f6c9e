//! Attendance model.
//!
//! This module defines the [`AttendanceInterval`] struct representing one
//! worker's check-in/check-out record for a calendar date.

use chrono::{Datelike, NaiveDate, NaiveDateTime, Weekday};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calculation::round_half_up;
use crate::error::{EngineError, EngineResult};

/// Represents one attendance record with timing information.
///
/// The check-out is optional while the record is still open; open records
/// are never priced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttendanceInterval {
    /// The worker this record belongs to.
    pub worker_id: String,
    /// The attendance date (used for holiday and weekend detection).
    pub date: NaiveDate,
    /// The check-in instant, in local time.
    pub check_in: NaiveDateTime,
    /// The check-out instant, absent while the record is open.
    #[serde(default)]
    pub check_out: Option<NaiveDateTime>,
}

impl AttendanceInterval {
    /// Creates an attendance record, rejecting a check-out before check-in.
    ///
    /// # Examples
    ///
    /// ```
    /// use payroll_engine::models::AttendanceInterval;
    /// use chrono::{NaiveDate, NaiveDateTime};
    ///
    /// let date = NaiveDate::from_ymd_opt(2024, 1, 10).unwrap();
    /// let check_in = date.and_hms_opt(17, 0, 0).unwrap();
    /// let check_out = date.and_hms_opt(9, 0, 0).unwrap();
    ///
    /// assert!(AttendanceInterval::new("w1", date, check_in, Some(check_out)).is_err());
    /// ```
    pub fn new(
        worker_id: impl Into<String>,
        date: NaiveDate,
        check_in: NaiveDateTime,
        check_out: Option<NaiveDateTime>,
    ) -> EngineResult<Self> {
        let interval = Self {
            worker_id: worker_id.into(),
            date,
            check_in,
            check_out,
        };
        interval.validate()?;
        Ok(interval)
    }

    /// Checks the ordering invariant on records that were deserialized or built directly.
    pub fn validate(&self) -> EngineResult<()> {
        match self.check_out {
            Some(check_out) if check_out < self.check_in => Err(EngineError::InvalidAttendance {
                worker_id: self.worker_id.clone(),
                date: self.date,
                message: format!(
                    "check-out {} is before check-in {}",
                    check_out, self.check_in
                ),
            }),
            _ => Ok(()),
        }
    }

    /// Returns true once the worker has checked out.
    pub fn is_complete(&self) -> bool {
        self.check_out.is_some()
    }

    /// Calculates the worked hours at minute precision, rounded half-up to 2 decimals.
    ///
    /// Returns `None` for open records.
    ///
    /// # Examples
    ///
    /// ```
    /// use payroll_engine::models::AttendanceInterval;
    /// use chrono::NaiveDate;
    /// use rust_decimal::Decimal;
    ///
    /// let date = NaiveDate::from_ymd_opt(2024, 1, 10).unwrap();
    /// let attendance = AttendanceInterval::new(
    ///     "w1",
    ///     date,
    ///     date.and_hms_opt(9, 0, 0).unwrap(),
    ///     Some(date.and_hms_opt(17, 20, 0).unwrap()),
    /// )
    /// .unwrap();
    /// assert_eq!(attendance.worked_hours(), Some(Decimal::new(833, 2))); // 8.33
    /// ```
    pub fn worked_hours(&self) -> Option<Decimal> {
        let check_out = self.check_out?;
        let minutes = (check_out - self.check_in).num_minutes();
        Some(round_half_up(Decimal::new(minutes, 0) / Decimal::new(60, 0)))
    }

    /// Returns the day of the week of the attendance date.
    pub fn day_of_week(&self) -> Weekday {
        self.date.weekday()
    }
}
