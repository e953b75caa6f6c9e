//! Error types for the Payroll Engine.
//!
//! This module provides strongly-typed errors using the `thiserror` crate
//! for all error conditions that can occur during payroll computation,
//! batch settlement, policy registration, and leave management.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{LeaveStatus, PayPeriod, PolicyCategory};

/// Broad classification of an [`EngineError`].
///
/// Callers use this to decide how to react: precondition errors describe an
/// invalid request, invariant violations describe malformed data that should
/// never have been constructed, and storage errors come from collaborators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The request was invalid before any computation started.
    Precondition,
    /// Malformed data (bad interval, out-of-range multiplier, reversed dates).
    InvariantViolation,
    /// Configuration could not be found or parsed.
    Configuration,
    /// A collaborator (store or provider) failed.
    Storage,
}

/// The main error type for the Payroll Engine.
///
/// All operations in the engine return this error type, making it easy
/// to handle errors consistently throughout the application.
///
/// # Example
///
/// ```
/// use payroll_engine::error::EngineError;
///
/// let error = EngineError::WorkerNotFound {
///     worker_id: "w404".to_string(),
/// };
/// assert_eq!(error.to_string(), "Worker not found: w404");
/// ```
#[derive(Debug, Error)]
pub enum EngineError {
    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },

    /// The worker does not exist in the directory.
    #[error("Worker not found: {worker_id}")]
    WorkerNotFound {
        /// The worker that was requested.
        worker_id: String,
    },

    /// A batch scope resolved to zero eligible workers.
    #[error("No eligible workers for scope '{scope}' (batch run {batch_run_id})")]
    NoEligibleWorkers {
        /// The scope that was requested, or "all".
        scope: String,
        /// The failed batch run that was recorded.
        batch_run_id: Uuid,
    },

    /// No attendance records exist for the worker in the period.
    #[error("No attendance records for worker '{worker_id}' in period {period}")]
    NoAttendanceRecords {
        /// The worker being computed.
        worker_id: String,
        /// The requested period.
        period: PayPeriod,
    },

    /// A payroll result already exists for the worker and period.
    #[error("Payroll result already exists for worker '{worker_id}' in period {period}")]
    DuplicatePayrollResult {
        /// The worker being computed.
        worker_id: String,
        /// The requested period.
        period: PayPeriod,
    },

    /// No payroll result exists for the worker and period.
    #[error("Payroll result not found for worker '{worker_id}' in period {period}")]
    PayrollResultNotFound {
        /// The worker requested.
        worker_id: String,
        /// The requested period.
        period: PayPeriod,
    },

    /// The payroll result has already been marked as paid.
    #[error("Payroll result for worker '{worker_id}' in period {period} is already paid")]
    AlreadyPaid {
        /// The worker requested.
        worker_id: String,
        /// The requested period.
        period: PayPeriod,
    },

    /// A new policy's validity window intersects an existing one of the same category.
    #[error(
        "Policy window for {category} starting {valid_from} overlaps existing policy {existing_id}"
    )]
    OverlappingPolicy {
        /// The category being registered.
        category: PolicyCategory,
        /// Start of the rejected window.
        valid_from: NaiveDate,
        /// The existing record that conflicts.
        existing_id: Uuid,
    },

    /// A policy record violates its own invariants.
    #[error("Invalid policy: {message}")]
    InvalidPolicy {
        /// A description of the violated invariant.
        message: String,
    },

    /// A leave request overlaps one of the worker's approved requests.
    #[error("Leave {start}..={end} for worker '{worker_id}' overlaps approved leave {existing_id}")]
    OverlappingLeave {
        /// The requesting worker.
        worker_id: String,
        /// Requested first day.
        start: NaiveDate,
        /// Requested last day.
        end: NaiveDate,
        /// The approved request it collides with.
        existing_id: Uuid,
    },

    /// The leave request does not exist.
    #[error("Leave request not found: {leave_id}")]
    LeaveNotFound {
        /// The requested leave id.
        leave_id: Uuid,
    },

    /// The requested leave status change is not allowed.
    #[error("Invalid leave transition for {leave_id}: {from} -> {to}")]
    InvalidLeaveTransition {
        /// The leave request.
        leave_id: Uuid,
        /// Current status.
        from: LeaveStatus,
        /// Requested status.
        to: LeaveStatus,
    },

    /// Approving the request would drive the leave balance negative.
    #[error("Insufficient leave balance for worker '{worker_id}': requested {requested}, available {available}")]
    InsufficientLeaveBalance {
        /// The worker whose balance is short.
        worker_id: String,
        /// Days requested.
        requested: Decimal,
        /// Days remaining.
        available: Decimal,
    },

    /// More workers are in scope than a batch run can count.
    #[error("Batch scope has {count} workers, more than a run can record")]
    BatchTooLarge {
        /// The number of eligible workers.
        count: usize,
    },

    /// The batch run is terminal or otherwise cannot take the requested transition.
    #[error("Invalid batch run transition for {batch_run_id}: {message}")]
    InvalidBatchTransition {
        /// The batch run.
        batch_run_id: Uuid,
        /// What was attempted.
        message: String,
    },

    /// A date range has its start after its end.
    #[error("Invalid date range: {start} is after {end}")]
    InvalidDateRange {
        /// The start date.
        start: NaiveDate,
        /// The end date.
        end: NaiveDate,
    },

    /// An attendance interval was malformed.
    #[error("Invalid attendance for worker '{worker_id}' on {date}: {message}")]
    InvalidAttendance {
        /// The worker.
        worker_id: String,
        /// The attendance date.
        date: NaiveDate,
        /// A description of what made the interval invalid.
        message: String,
    },

    /// A period string could not be parsed as a year-month.
    #[error("Invalid period '{value}': expected YYYY-MM")]
    InvalidPeriod {
        /// The rejected input.
        value: String,
    },

    /// A monetary input (rate or deduction) was out of range.
    #[error("Invalid amount for {field}: {message}")]
    InvalidAmount {
        /// Which input was rejected.
        field: String,
        /// A description of the problem.
        message: String,
    },

    /// A collaborator failed.
    #[error("Storage error: {message}")]
    Storage {
        /// A description of the collaborator failure.
        message: String,
    },
}

impl EngineError {
    /// Returns the taxonomy bucket this error belongs to.
    pub fn kind(&self) -> ErrorKind {
        match self {
            EngineError::ConfigNotFound { .. } | EngineError::ConfigParseError { .. } => {
                ErrorKind::Configuration
            }
            EngineError::WorkerNotFound { .. }
            | EngineError::NoEligibleWorkers { .. }
            | EngineError::NoAttendanceRecords { .. }
            | EngineError::DuplicatePayrollResult { .. }
            | EngineError::PayrollResultNotFound { .. }
            | EngineError::AlreadyPaid { .. }
            | EngineError::OverlappingPolicy { .. }
            | EngineError::OverlappingLeave { .. }
            | EngineError::LeaveNotFound { .. }
            | EngineError::InvalidLeaveTransition { .. }
            | EngineError::InsufficientLeaveBalance { .. }
            | EngineError::BatchTooLarge { .. }
            | EngineError::InvalidBatchTransition { .. }
            | EngineError::InvalidPeriod { .. } => ErrorKind::Precondition,
            EngineError::InvalidPolicy { .. }
            | EngineError::InvalidAmount { .. }
            | EngineError::InvalidDateRange { .. }
            | EngineError::InvalidAttendance { .. } => ErrorKind::InvariantViolation,
            EngineError::Storage { .. } => ErrorKind::Storage,
        }
    }

    /// Returns true if the caller's request was rejected before any computation.
    pub fn is_precondition(&self) -> bool {
        self.kind() == ErrorKind::Precondition
    }
}

/// A type alias for Results that return EngineError.
pub type EngineResult<T> = Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn period() -> PayPeriod {
        PayPeriod::new(2024, 1).unwrap()
    }

    #[test]
    fn test_config_not_found_displays_path() {
        let error = EngineError::ConfigNotFound {
            path: "/missing/engine.yaml".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Configuration file not found: /missing/engine.yaml"
        );
        assert_eq!(error.kind(), ErrorKind::Configuration);
    }

    #[test]
    fn test_duplicate_result_displays_worker_and_period() {
        let error = EngineError::DuplicatePayrollResult {
            worker_id: "w1".to_string(),
            period: period(),
        };
        assert_eq!(
            error.to_string(),
            "Payroll result already exists for worker 'w1' in period 2024-01"
        );
        assert!(error.is_precondition());
    }

    #[test]
    fn test_invalid_leave_transition_displays_statuses() {
        let leave_id = Uuid::nil();
        let error = EngineError::InvalidLeaveTransition {
            leave_id,
            from: LeaveStatus::Rejected,
            to: LeaveStatus::Approved,
        };
        assert_eq!(
            error.to_string(),
            format!("Invalid leave transition for {}: rejected -> approved", leave_id)
        );
    }

    #[test]
    fn test_invalid_date_range_is_invariant_violation() {
        let error = EngineError::InvalidDateRange {
            start: NaiveDate::from_ymd_opt(2024, 3, 2).unwrap(),
            end: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
        };
        assert_eq!(
            error.to_string(),
            "Invalid date range: 2024-03-02 is after 2024-03-01"
        );
        assert_eq!(error.kind(), ErrorKind::InvariantViolation);
        assert!(!error.is_precondition());
    }

    #[test]
    fn test_overlapping_policy_displays_category() {
        let error = EngineError::OverlappingPolicy {
            category: PolicyCategory::WeekendOvertime,
            valid_from: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            existing_id: Uuid::nil(),
        };
        assert!(error.to_string().contains("weekend_overtime"));
        assert!(error.to_string().contains("2024-03-01"));
    }

    #[test]
    fn test_storage_error_kind() {
        let error = EngineError::Storage {
            message: "connection reset".to_string(),
        };
        assert_eq!(error.kind(), ErrorKind::Storage);
        assert_eq!(error.to_string(), "Storage error: connection reset");
    }

    #[test]
    fn test_errors_implement_std_error() {
        fn assert_error<T: std::error::Error + Send + Sync>() {}
        assert_error::<EngineError>();
    }

    #[test]
    fn test_error_propagation_with_question_mark() {
        fn returns_not_found() -> EngineResult<()> {
            Err(EngineError::WorkerNotFound {
                worker_id: "w9".to_string(),
            })
        }

        fn propagates_error() -> EngineResult<()> {
            returns_not_found()?;
            Ok(())
        }

        assert!(propagates_error().is_err());
    }
}
