//! Collaborator interfaces for the Payroll Engine.
//!
//! The engine never touches storage directly. Attendance, leave, policies,
//! workers, and persisted results all come through the traits in this module,
//! so the services can run against any backend. [`InMemoryStore`] implements
//! every trait and is what the tests and benchmarks use.

mod memory;

use chrono::NaiveDate;
use uuid::Uuid;

use crate::error::EngineError;
use crate::models::{
    AttendanceInterval, BatchRun, DateRange, LeaveBalance, LeaveInterval, LeaveStatus, PayPeriod,
    PayrollResult, PolicyRecord, ValidityWindow, Worker,
};

pub use memory::InMemoryStore;

/// Error enumeration for collaborator failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// A record with the same key already exists, or an expected state no longer holds.
    #[error("record already exists")]
    Conflict,
    /// The record to update does not exist.
    #[error("record not found")]
    NotFound,
    /// The backend could not serve the request.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl From<StoreError> for EngineError {
    fn from(err: StoreError) -> Self {
        EngineError::Storage {
            message: err.to_string(),
        }
    }
}

/// Result type for collaborator calls.
pub type StoreResult<T> = Result<T, StoreError>;

/// Supplies completed attendance records.
pub trait AttendanceProvider: Send + Sync {
    /// Returns the worker's check-out-complete records dated within `range`.
    fn completed_attendance(
        &self,
        worker_id: &str,
        range: &DateRange,
    ) -> StoreResult<Vec<AttendanceInterval>>;
}

/// Supplies approved leave.
pub trait LeaveProvider: Send + Sync {
    /// Returns the worker's Approved requests sharing at least one day with `range`.
    fn approved_leave(&self, worker_id: &str, range: &DateRange) -> StoreResult<Vec<LeaveInterval>>;
}

/// Time-bounded multiplier records.
pub trait PolicyStore: Send + Sync {
    /// Every stored record, in lookup order.
    fn all_policies(&self) -> StoreResult<Vec<PolicyRecord>>;

    /// Stores a record.
    ///
    /// Returns `Conflict` when a record of the same category has an
    /// intersecting window; the check and the insert happen together.
    fn insert_policy(&self, record: PolicyRecord) -> StoreResult<PolicyRecord>;

    /// Records whose window contains `on`.
    fn active_policies(&self, on: NaiveDate) -> StoreResult<Vec<PolicyRecord>> {
        Ok(self
            .all_policies()?
            .into_iter()
            .filter(|p| p.window.contains(on))
            .collect())
    }

    /// Records whose window shares at least one day with `range`.
    fn policies_overlapping(&self, range: &DateRange) -> StoreResult<Vec<PolicyRecord>> {
        let window = ValidityWindow {
            valid_from: range.start,
            valid_to: Some(range.end),
        };
        Ok(self
            .all_policies()?
            .into_iter()
            .filter(|p| p.window.overlaps(&window))
            .collect())
    }
}

/// The workforce.
pub trait WorkerDirectory: Send + Sync {
    /// Looks up one worker.
    fn find_worker(&self, worker_id: &str) -> StoreResult<Option<Worker>>;

    /// Every known worker, active or not.
    fn all_workers(&self) -> StoreResult<Vec<Worker>>;

    /// Active workers in `scope` (a department), sorted by id.
    fn eligible_workers(&self, scope: Option<&str>) -> StoreResult<Vec<Worker>> {
        let mut workers: Vec<Worker> = self
            .all_workers()?
            .into_iter()
            .filter(|w| w.is_eligible(scope))
            .collect();
        workers.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(workers)
    }
}

/// Persistence for payroll results, unique per (worker, period).
pub trait PayrollRepository: Send + Sync {
    /// Looks up the result for a worker and period.
    fn find_result(&self, worker_id: &str, period: PayPeriod) -> StoreResult<Option<PayrollResult>>;

    /// Inserts a result, returning `Conflict` if one exists for the same pair.
    fn insert_result(&self, result: PayrollResult) -> StoreResult<PayrollResult>;

    /// Stores a paid copy of a result, only if the stored result is still unpaid.
    ///
    /// Returns `Conflict` if it was already paid and `NotFound` if nothing is
    /// stored for the pair.
    fn commit_payment(&self, paid: PayrollResult) -> StoreResult<()>;
}

/// Persistence for batch runs.
pub trait BatchRunRepository: Send + Sync {
    /// Inserts a new run.
    fn insert_run(&self, run: BatchRun) -> StoreResult<BatchRun>;

    /// Replaces an existing run.
    fn update_run(&self, run: BatchRun) -> StoreResult<()>;

    /// Looks up a run by id.
    fn find_run(&self, id: Uuid) -> StoreResult<Option<BatchRun>>;
}

/// A balance write guarded by the record it was derived from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BalanceUpdate {
    /// The stored balance the new value was computed from; `None` if the
    /// worker had no balance record yet.
    pub expected: Option<LeaveBalance>,
    /// The balance to store.
    pub next: LeaveBalance,
}

/// Persistence for leave requests and balances.
pub trait LeaveRepository: Send + Sync {
    /// Looks up one request.
    fn find_request(&self, id: Uuid) -> StoreResult<Option<LeaveInterval>>;

    /// Every request filed by a worker.
    fn requests_for_worker(&self, worker_id: &str) -> StoreResult<Vec<LeaveInterval>>;

    /// Inserts a new request.
    fn insert_request(&self, request: LeaveInterval) -> StoreResult<LeaveInterval>;

    /// Looks up a worker's balance.
    fn find_balance(&self, worker_id: &str) -> StoreResult<Option<LeaveBalance>>;

    /// Writes a request's new state and, optionally, the worker's new balance.
    ///
    /// Both writes apply together, and only if the stored request is still in
    /// `expected`, the stored balance still equals `balance.expected`, and an
    /// Approved request overlaps no other Approved request of the same worker.
    /// Otherwise nothing is written and `Conflict` is returned.
    fn commit_transition(
        &self,
        expected: LeaveStatus,
        request: LeaveInterval,
        balance: Option<BalanceUpdate>,
    ) -> StoreResult<()>;
}
