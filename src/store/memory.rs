//! In-memory store.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard};

use uuid::Uuid;

use super::{
    AttendanceProvider, BalanceUpdate, BatchRunRepository, LeaveProvider, LeaveRepository, PayrollRepository,
    PolicyStore, StoreError, StoreResult, WorkerDirectory,
};
use crate::models::{
    AttendanceInterval, BatchRun, DateRange, LeaveBalance, LeaveInterval, LeaveStatus, PayPeriod,
    PayrollResult, PolicyRecord, Worker,
};

#[derive(Debug, Default)]
struct State {
    workers: BTreeMap<String, Worker>,
    attendance: Vec<AttendanceInterval>,
    policies: Vec<PolicyRecord>,
    results: HashMap<(String, PayPeriod), PayrollResult>,
    runs: HashMap<Uuid, BatchRun>,
    leave_requests: HashMap<Uuid, LeaveInterval>,
    balances: HashMap<String, LeaveBalance>,
}

/// Thread-safe store holding every collaborator's data behind one lock.
///
/// Cloning shares the underlying data.
#[derive(Debug, Default, Clone)]
pub struct InMemoryStore {
    state: Arc<Mutex<State>>,
}

impl InMemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, State>> {
        self.state
            .lock()
            .map_err(|_| StoreError::Unavailable("store mutex poisoned".to_string()))
    }

    /// Adds or replaces a worker.
    pub fn put_worker(&self, worker: Worker) -> StoreResult<()> {
        self.lock()?.workers.insert(worker.id.clone(), worker);
        Ok(())
    }

    /// Records an attendance interval.
    pub fn add_attendance(&self, attendance: AttendanceInterval) -> StoreResult<()> {
        self.lock()?.attendance.push(attendance);
        Ok(())
    }

    /// Sets a worker's leave balance.
    pub fn put_balance(&self, balance: LeaveBalance) -> StoreResult<()> {
        self.lock()?
            .balances
            .insert(balance.worker_id.clone(), balance);
        Ok(())
    }

    /// Loads policy records without the overlap check, preserving order.
    pub fn seed_policies(&self, policies: impl IntoIterator<Item = PolicyRecord>) -> StoreResult<()> {
        self.lock()?.policies.extend(policies);
        Ok(())
    }
}

impl AttendanceProvider for InMemoryStore {
    fn completed_attendance(
        &self,
        worker_id: &str,
        range: &DateRange,
    ) -> StoreResult<Vec<AttendanceInterval>> {
        let guard = self.lock()?;
        Ok(guard
            .attendance
            .iter()
            .filter(|a| a.worker_id == worker_id && range.contains(a.date) && a.is_complete())
            .cloned()
            .collect())
    }
}

impl LeaveProvider for InMemoryStore {
    fn approved_leave(&self, worker_id: &str, range: &DateRange) -> StoreResult<Vec<LeaveInterval>> {
        let guard = self.lock()?;
        let mut approved: Vec<LeaveInterval> = guard
            .leave_requests
            .values()
            .filter(|l| {
                l.worker_id == worker_id
                    && l.status == LeaveStatus::Approved
                    && l.date_range().overlaps(range)
            })
            .cloned()
            .collect();
        approved.sort_by_key(|l| (l.start_date, l.id));
        Ok(approved)
    }
}

impl PolicyStore for InMemoryStore {
    fn all_policies(&self) -> StoreResult<Vec<PolicyRecord>> {
        Ok(self.lock()?.policies.clone())
    }

    fn insert_policy(&self, record: PolicyRecord) -> StoreResult<PolicyRecord> {
        let mut guard = self.lock()?;
        let clash = guard
            .policies
            .iter()
            .any(|p| p.category == record.category && p.window.overlaps(&record.window));
        if clash {
            return Err(StoreError::Conflict);
        }
        guard.policies.push(record.clone());
        Ok(record)
    }
}

impl WorkerDirectory for InMemoryStore {
    fn find_worker(&self, worker_id: &str) -> StoreResult<Option<Worker>> {
        Ok(self.lock()?.workers.get(worker_id).cloned())
    }

    fn all_workers(&self) -> StoreResult<Vec<Worker>> {
        Ok(self.lock()?.workers.values().cloned().collect())
    }
}

impl PayrollRepository for InMemoryStore {
    fn find_result(&self, worker_id: &str, period: PayPeriod) -> StoreResult<Option<PayrollResult>> {
        let guard = self.lock()?;
        Ok(guard.results.get(&(worker_id.to_string(), period)).cloned())
    }

    fn insert_result(&self, result: PayrollResult) -> StoreResult<PayrollResult> {
        let mut guard = self.lock()?;
        let key = (result.worker_id.clone(), result.period);
        if guard.results.contains_key(&key) {
            return Err(StoreError::Conflict);
        }
        guard.results.insert(key, result.clone());
        Ok(result)
    }

    fn commit_payment(&self, paid: PayrollResult) -> StoreResult<()> {
        let mut guard = self.lock()?;
        let key = (paid.worker_id.clone(), paid.period);
        match guard.results.get_mut(&key) {
            Some(slot) if slot.paid => Err(StoreError::Conflict),
            Some(slot) => {
                *slot = paid;
                Ok(())
            }
            None => Err(StoreError::NotFound),
        }
    }
}

impl BatchRunRepository for InMemoryStore {
    fn insert_run(&self, run: BatchRun) -> StoreResult<BatchRun> {
        let mut guard = self.lock()?;
        if guard.runs.contains_key(&run.id) {
            return Err(StoreError::Conflict);
        }
        guard.runs.insert(run.id, run.clone());
        Ok(run)
    }

    fn update_run(&self, run: BatchRun) -> StoreResult<()> {
        let mut guard = self.lock()?;
        match guard.runs.get_mut(&run.id) {
            Some(slot) => {
                *slot = run;
                Ok(())
            }
            None => Err(StoreError::NotFound),
        }
    }

    fn find_run(&self, id: Uuid) -> StoreResult<Option<BatchRun>> {
        Ok(self.lock()?.runs.get(&id).cloned())
    }
}

impl LeaveRepository for InMemoryStore {
    fn find_request(&self, id: Uuid) -> StoreResult<Option<LeaveInterval>> {
        Ok(self.lock()?.leave_requests.get(&id).cloned())
    }

    fn requests_for_worker(&self, worker_id: &str) -> StoreResult<Vec<LeaveInterval>> {
        let guard = self.lock()?;
        let mut requests: Vec<LeaveInterval> = guard
            .leave_requests
            .values()
            .filter(|l| l.worker_id == worker_id)
            .cloned()
            .collect();
        requests.sort_by_key(|l| (l.start_date, l.requested_at, l.id));
        Ok(requests)
    }

    fn insert_request(&self, request: LeaveInterval) -> StoreResult<LeaveInterval> {
        let mut guard = self.lock()?;
        if guard.leave_requests.contains_key(&request.id) {
            return Err(StoreError::Conflict);
        }
        guard.leave_requests.insert(request.id, request.clone());
        Ok(request)
    }

    fn find_balance(&self, worker_id: &str) -> StoreResult<Option<LeaveBalance>> {
        Ok(self.lock()?.balances.get(worker_id).cloned())
    }

    fn commit_transition(
        &self,
        expected: LeaveStatus,
        request: LeaveInterval,
        balance: Option<BalanceUpdate>,
    ) -> StoreResult<()> {
        let mut guard = self.lock()?;
        match guard.leave_requests.get(&request.id) {
            None => return Err(StoreError::NotFound),
            Some(current) if current.status != expected => return Err(StoreError::Conflict),
            Some(_) => {}
        }
        if let Some(update) = &balance {
            if guard.balances.get(&update.next.worker_id) != update.expected.as_ref() {
                return Err(StoreError::Conflict);
            }
        }
        if request.status == LeaveStatus::Approved {
            let range = request.date_range();
            let clash = guard.leave_requests.values().any(|other| {
                other.id != request.id
                    && other.worker_id == request.worker_id
                    && other.status == LeaveStatus::Approved
                    && other.date_range().overlaps(&range)
            });
            if clash {
                return Err(StoreError::Conflict);
            }
        }

        if let Some(update) = balance {
            guard
                .balances
                .insert(update.next.worker_id.clone(), update.next);
        }
        guard.leave_requests.insert(request.id, request);
        Ok(())
    }
}
