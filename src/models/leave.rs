//! Leave request and leave balance models.
//!
//! A [`LeaveInterval`] moves through a small state machine
//! (`Pending -> Approved | Rejected | Cancelled`, `Approved -> Cancelled`) and every
//! transition returns a new value. [`LeaveBalance`] holds the remaining entitled
//! days and is only changed by approving or cancelling an approved request.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::DateRange;
use crate::error::{EngineError, EngineResult};

/// Lifecycle status of a leave request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeaveStatus {
    /// Submitted and awaiting a decision.
    Pending,
    /// Approved; the day count has been deducted from the balance.
    Approved,
    /// Rejected by an approver. Terminal.
    Rejected,
    /// Withdrawn, either before or after approval. Terminal.
    Cancelled,
}

impl LeaveStatus {
    /// Returns true if moving from `self` to `next` is a legal transition.
    ///
    /// # Example
    ///
    /// ```
    /// use payroll_engine::models::LeaveStatus;
    ///
    /// assert!(LeaveStatus::Pending.can_transition_to(LeaveStatus::Approved));
    /// assert!(LeaveStatus::Approved.can_transition_to(LeaveStatus::Cancelled));
    /// assert!(!LeaveStatus::Approved.can_transition_to(LeaveStatus::Rejected));
    /// assert!(!LeaveStatus::Cancelled.can_transition_to(LeaveStatus::Approved));
    /// ```
    pub fn can_transition_to(self, next: LeaveStatus) -> bool {
        matches!(
            (self, next),
            (
                LeaveStatus::Pending,
                LeaveStatus::Approved | LeaveStatus::Rejected | LeaveStatus::Cancelled
            ) | (LeaveStatus::Approved, LeaveStatus::Cancelled)
        )
    }
}

impl fmt::Display for LeaveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LeaveStatus::Pending => write!(f, "pending"),
            LeaveStatus::Approved => write!(f, "approved"),
            LeaveStatus::Rejected => write!(f, "rejected"),
            LeaveStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// A leave request covering an inclusive range of dates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaveInterval {
    /// Unique identifier for the request.
    pub id: Uuid,
    /// The requesting worker.
    pub worker_id: String,
    /// First day of leave (inclusive).
    pub start_date: NaiveDate,
    /// Last day of leave (inclusive).
    pub end_date: NaiveDate,
    /// Current lifecycle status.
    pub status: LeaveStatus,
    /// When the request was submitted.
    pub requested_at: DateTime<Utc>,
    /// Who made the last decision (approver, rejecter, or canceller).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decided_by: Option<String>,
    /// When the last decision was made.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decided_at: Option<DateTime<Utc>>,
}

impl LeaveInterval {
    /// Creates a new Pending request.
    ///
    /// Returns `InvalidDateRange` if `start_date` is after `end_date`.
    pub fn request(
        worker_id: impl Into<String>,
        start_date: NaiveDate,
        end_date: NaiveDate,
        requested_at: DateTime<Utc>,
    ) -> EngineResult<Self> {
        DateRange::new(start_date, end_date)?;
        Ok(Self {
            id: Uuid::new_v4(),
            worker_id: worker_id.into(),
            start_date,
            end_date,
            status: LeaveStatus::Pending,
            requested_at,
            decided_by: None,
            decided_at: None,
        })
    }

    /// The covered dates as a range.
    pub fn date_range(&self) -> DateRange {
        DateRange {
            start: self.start_date,
            end: self.end_date,
        }
    }

    /// Number of leave days, counting both ends.
    pub fn day_count(&self) -> Decimal {
        Decimal::from(self.date_range().day_count())
    }

    /// Returns a copy of this request moved to `next`.
    ///
    /// Fails with `InvalidLeaveTransition` when the move is not allowed; the
    /// original value is left untouched either way.
    pub fn transition(
        &self,
        next: LeaveStatus,
        actor: &str,
        at: DateTime<Utc>,
    ) -> EngineResult<Self> {
        if !self.status.can_transition_to(next) {
            return Err(EngineError::InvalidLeaveTransition {
                leave_id: self.id,
                from: self.status,
                to: next,
            });
        }
        Ok(Self {
            status: next,
            decided_by: Some(actor.to_string()),
            decided_at: Some(at),
            ..self.clone()
        })
    }
}

/// A worker's remaining paid-leave entitlement in days.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaveBalance {
    /// The worker this balance belongs to.
    pub worker_id: String,
    /// Days remaining; never negative.
    pub remaining_days: Decimal,
}

impl LeaveBalance {
    /// Creates a balance with the given number of days.
    pub fn new(worker_id: impl Into<String>, remaining_days: Decimal) -> Self {
        Self {
            worker_id: worker_id.into(),
            remaining_days,
        }
    }

    /// Returns a new balance with `days` removed.
    ///
    /// Checked before anything is written, so a failed deduction leaves no trace.
    ///
    /// # Example
    ///
    /// ```
    /// use payroll_engine::models::LeaveBalance;
    /// use rust_decimal::Decimal;
    ///
    /// let balance = LeaveBalance::new("w1", Decimal::from(5));
    /// assert_eq!(balance.deduct(Decimal::from(3)).unwrap().remaining_days, Decimal::from(2));
    /// assert!(balance.deduct(Decimal::from(6)).is_err());
    /// ```
    pub fn deduct(&self, days: Decimal) -> EngineResult<Self> {
        if days > self.remaining_days {
            return Err(EngineError::InsufficientLeaveBalance {
                worker_id: self.worker_id.clone(),
                requested: days,
                available: self.remaining_days,
            });
        }
        Ok(Self {
            worker_id: self.worker_id.clone(),
            remaining_days: self.remaining_days - days,
        })
    }

    /// Returns a new balance with `days` added back.
    pub fn restore(&self, days: Decimal) -> Self {
        Self {
            worker_id: self.worker_id.clone(),
            remaining_days: self.remaining_days + days,
        }
    }
}
