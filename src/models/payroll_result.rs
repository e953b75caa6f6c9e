//! Payroll result models.
//!
//! This module contains the [`PayrollResult`] type and its associated structures
//! that capture the outputs of one worker's payroll computation for a period,
//! including the priced daily lines, totals, and an audit trace.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{PayPeriod, PolicyCategory};
use crate::error::{EngineError, EngineResult};

/// The work-type category one attendance day is classified as.
///
/// # Example
///
/// ```
/// use payroll_engine::models::{PolicyCategory, WorkType};
///
/// assert_eq!(WorkType::Weekday.policy_category(), None);
/// assert_eq!(WorkType::Weekend.policy_category(), Some(PolicyCategory::WeekendOvertime));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkType {
    /// Ordinary weekday work, paid at the plain hourly rate.
    Weekday,
    /// Work touching the night window.
    Night,
    /// Saturday or Sunday work.
    Weekend,
    /// Work on a holiday.
    Holiday,
}

impl WorkType {
    /// The policy category whose multiplier prices this work type.
    ///
    /// Weekday work has no premium and therefore no category. Night work is
    /// priced from the weekday overtime category.
    pub fn policy_category(self) -> Option<PolicyCategory> {
        match self {
            WorkType::Weekday => None,
            WorkType::Night => Some(PolicyCategory::WeekdayOvertime),
            WorkType::Weekend => Some(PolicyCategory::WeekendOvertime),
            WorkType::Holiday => Some(PolicyCategory::HolidayOvertime),
        }
    }

    /// Returns true if lines of this type count toward the overtime amount.
    pub fn is_overtime(self) -> bool {
        self != WorkType::Weekday
    }
}

impl fmt::Display for WorkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkType::Weekday => write!(f, "Weekday"),
            WorkType::Night => write!(f, "Night"),
            WorkType::Weekend => write!(f, "Weekend"),
            WorkType::Holiday => write!(f, "Holiday"),
        }
    }
}

/// One priced attendance day.
///
/// # Example
///
/// ```
/// use payroll_engine::models::{DailyPayrollLine, WorkType};
/// use rust_decimal::Decimal;
/// use chrono::NaiveDate;
/// use std::str::FromStr;
///
/// let line = DailyPayrollLine {
///     date: NaiveDate::from_ymd_opt(2024, 1, 10).unwrap(),
///     work_type: WorkType::Weekday,
///     hours: Decimal::from_str("8.00").unwrap(),
///     hourly_rate: Decimal::from_str("20.00").unwrap(),
///     multiplier: Decimal::ONE,
///     amount: Decimal::from_str("160.00").unwrap(),
///     policy_id: None,
/// };
/// assert!(!line.work_type.is_overtime());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyPayrollLine {
    /// The attendance date.
    pub date: NaiveDate,
    /// How the day was classified.
    pub work_type: WorkType,
    /// Worked hours, 2 decimals.
    pub hours: Decimal,
    /// The worker's hourly rate.
    pub hourly_rate: Decimal,
    /// The multiplier applied (1.0 when no policy matched).
    pub multiplier: Decimal,
    /// hours x rate x multiplier, rounded half-up to 2 decimals.
    pub amount: Decimal,
    /// The policy record the multiplier came from, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub policy_id: Option<Uuid>,
}

/// Aggregated totals for a worker and period.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PayrollTotals {
    /// Sum of hours across all lines.
    pub total_hours: Decimal,
    /// Sum of hours on non-weekday lines.
    pub overtime_hours: Decimal,
    /// Sum of Weekday line amounts.
    pub base_amount: Decimal,
    /// Sum of non-Weekday line amounts.
    pub overtime_amount: Decimal,
    /// Amount deducted from the gross, rounded half-up to 2 decimals.
    pub deductions: Decimal,
    /// base + overtime - deductions, rounded half-up to 2 decimals.
    pub total: Decimal,
}

/// A single step in the audit trace recording a calculation decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditStep {
    /// The sequential step number.
    pub step_number: u32,
    /// The identifier of the rule that was applied.
    pub rule_id: String,
    /// The human-readable name of the rule.
    pub rule_name: String,
    /// The input data for this step.
    pub input: serde_json::Value,
    /// The output data from this step.
    pub output: serde_json::Value,
    /// Human-readable explanation of the decision.
    pub reasoning: String,
}

/// The persisted outcome of one worker's payroll for one period.
///
/// Owns its daily lines. Created once per (worker, period).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayrollResult {
    /// Unique identifier for this result.
    pub id: Uuid,
    /// The worker the result is for.
    pub worker_id: String,
    /// The settled period.
    pub period: PayPeriod,
    /// Priced days, in date order.
    pub lines: Vec<DailyPayrollLine>,
    /// Aggregated amounts.
    pub totals: PayrollTotals,
    /// Whether the result has been paid out.
    pub paid: bool,
    /// When the computation ran.
    pub calculated_at: DateTime<Utc>,
    /// When the result was marked paid.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paid_at: Option<DateTime<Utc>>,
    /// The version of the engine that produced the result.
    pub engine_version: String,
    /// Ordered record of every decision taken during the computation.
    pub audit_steps: Vec<AuditStep>,
}

impl PayrollResult {
    /// Sum of Weekday line amounts.
    pub fn base_amount(&self) -> Decimal {
        self.totals.base_amount
    }

    /// Sum of non-Weekday line amounts.
    pub fn overtime_amount(&self) -> Decimal {
        self.totals.overtime_amount
    }

    /// The payable total.
    pub fn total(&self) -> Decimal {
        self.totals.total
    }

    /// Returns a paid copy of this result.
    ///
    /// A result can be paid only once.
    pub fn mark_paid(&self, at: DateTime<Utc>) -> EngineResult<Self> {
        if self.paid {
            return Err(EngineError::AlreadyPaid {
                worker_id: self.worker_id.clone(),
                period: self.period,
            });
        }
        Ok(Self {
            paid: true,
            paid_at: Some(at),
            ..self.clone()
        })
    }
}
