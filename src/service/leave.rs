//! Leave requests and the balance ledger.
//!
//! Every status change and its balance mutation are committed together,
//! guarded on the request status and the balance record they were computed
//! from. A commit that loses a race is recomputed from fresh reads.

use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::ConfigLoader;
use crate::error::{EngineError, EngineResult};
use crate::models::{LeaveBalance, LeaveInterval, LeaveStatus, RequestContext};
use crate::store::{BalanceUpdate, LeaveRepository, StoreError, WorkerDirectory};

const MAX_COMMIT_ATTEMPTS: u32 = 5;

/// Files, decides, and cancels leave while keeping balances consistent.
#[derive(Debug)]
pub struct LeaveService<S> {
    store: Arc<S>,
    default_entitlement: Decimal,
}

impl<S> LeaveService<S>
where
    S: LeaveRepository + WorkerDirectory,
{
    /// Creates a service over `store` using the configured default entitlement.
    pub fn new(store: Arc<S>, config: &ConfigLoader) -> Self {
        Self {
            store,
            default_entitlement: config.default_leave_entitlement(),
        }
    }

    /// Files a Pending request.
    ///
    /// # Errors
    ///
    /// - `WorkerNotFound` if the worker is unknown
    /// - `InvalidDateRange` if `start` is after `end`
    /// - `OverlappingLeave` if any day is already covered by one of the
    ///   worker's Approved requests
    pub fn request_leave(
        &self,
        ctx: &RequestContext,
        worker_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> EngineResult<LeaveInterval> {
        let outcome = self.file_request(ctx, worker_id, start, end);
        match &outcome {
            Ok(request) => info!(
                correlation_id = %ctx.correlation_id,
                leave_id = %request.id,
                worker_id = %worker_id,
                start = %start,
                end = %end,
                "Leave requested"
            ),
            Err(err) => warn!(
                correlation_id = %ctx.correlation_id,
                worker_id = %worker_id,
                error = %err,
                "Leave request rejected"
            ),
        }
        outcome
    }

    fn file_request(
        &self,
        ctx: &RequestContext,
        worker_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> EngineResult<LeaveInterval> {
        if self.store.find_worker(worker_id)?.is_none() {
            return Err(EngineError::WorkerNotFound {
                worker_id: worker_id.to_string(),
            });
        }
        let request = LeaveInterval::request(worker_id, start, end, ctx.now)?;
        let requested = request.date_range();

        let clash = self
            .store
            .requests_for_worker(worker_id)?
            .into_iter()
            .find(|l| l.status == LeaveStatus::Approved && l.date_range().overlaps(&requested));
        if let Some(existing) = clash {
            return Err(EngineError::OverlappingLeave {
                worker_id: worker_id.to_string(),
                start,
                end,
                existing_id: existing.id,
            });
        }

        Ok(self.store.insert_request(request)?)
    }

    /// Approves a Pending request and deducts its days from the worker's balance.
    ///
    /// The balance is checked before anything is written.
    ///
    /// # Errors
    ///
    /// - `LeaveNotFound` if the request does not exist
    /// - `InvalidLeaveTransition` if the request is not Pending
    /// - `OverlappingLeave` if another of the worker's requests covering any
    ///   of the same days is already Approved
    /// - `InsufficientLeaveBalance` if the deduction would go negative
    pub fn approve_leave(
        &self,
        ctx: &RequestContext,
        leave_id: Uuid,
        approver_id: &str,
    ) -> EngineResult<LeaveInterval> {
        self.decide(ctx, leave_id, LeaveStatus::Approved, approver_id)
    }

    /// Rejects a Pending request. The balance is untouched.
    pub fn reject_leave(
        &self,
        ctx: &RequestContext,
        leave_id: Uuid,
        approver_id: &str,
    ) -> EngineResult<LeaveInterval> {
        self.decide(ctx, leave_id, LeaveStatus::Rejected, approver_id)
    }

    /// Cancels a Pending or Approved request on behalf of the context's actor.
    ///
    /// Days are restored only when the request had been Approved.
    pub fn cancel_leave(&self, ctx: &RequestContext, leave_id: Uuid) -> EngineResult<LeaveInterval> {
        self.decide(ctx, leave_id, LeaveStatus::Cancelled, &ctx.actor)
    }

    /// The worker's current balance, or the default entitlement if none is recorded.
    pub fn leave_balance(&self, worker_id: &str) -> EngineResult<LeaveBalance> {
        Ok(self
            .store
            .find_balance(worker_id)?
            .unwrap_or_else(|| LeaveBalance::new(worker_id, self.default_entitlement)))
    }

    fn decide(
        &self,
        ctx: &RequestContext,
        leave_id: Uuid,
        next: LeaveStatus,
        actor: &str,
    ) -> EngineResult<LeaveInterval> {
        match self.apply_transition(ctx, leave_id, next, actor) {
            Ok((request, balance)) => {
                info!(
                    correlation_id = %ctx.correlation_id,
                    leave_id = %leave_id,
                    worker_id = %request.worker_id,
                    status = %request.status,
                    remaining_days = ?balance.map(|b| b.remaining_days),
                    "Leave status changed"
                );
                Ok(request)
            }
            Err(err) => {
                warn!(
                    correlation_id = %ctx.correlation_id,
                    leave_id = %leave_id,
                    to = %next,
                    error = %err,
                    "Leave transition rejected"
                );
                Err(err)
            }
        }
    }

    fn apply_transition(
        &self,
        ctx: &RequestContext,
        leave_id: Uuid,
        next: LeaveStatus,
        actor: &str,
    ) -> EngineResult<(LeaveInterval, Option<LeaveBalance>)> {
        for attempt in 1..=MAX_COMMIT_ATTEMPTS {
            let current = self
                .store
                .find_request(leave_id)?
                .ok_or(EngineError::LeaveNotFound { leave_id })?;
            let updated = current.transition(next, actor, ctx.now)?;
            if next == LeaveStatus::Approved {
                self.ensure_no_approved_overlap(&current)?;
            }

            let balance = self.balance_update(&current, next)?;
            let written = balance.as_ref().map(|update| update.next.clone());

            match self
                .store
                .commit_transition(current.status, updated.clone(), balance)
            {
                Ok(()) => return Ok((updated, written)),
                Err(StoreError::Conflict) => {
                    debug!(
                        correlation_id = %ctx.correlation_id,
                        leave_id = %leave_id,
                        attempt,
                        "Leave commit lost a race, retrying"
                    );
                }
                Err(StoreError::NotFound) => return Err(EngineError::LeaveNotFound { leave_id }),
                Err(other) => return Err(other.into()),
            }
        }
        Err(EngineError::Storage {
            message: format!(
                "leave request {} kept changing after {} attempts",
                leave_id, MAX_COMMIT_ATTEMPTS
            ),
        })
    }

    /// The guarded balance write a transition needs, if any.
    fn balance_update(
        &self,
        current: &LeaveInterval,
        next: LeaveStatus,
    ) -> EngineResult<Option<BalanceUpdate>> {
        let stored = self.store.find_balance(&current.worker_id)?;
        let balance = stored
            .clone()
            .unwrap_or_else(|| LeaveBalance::new(&current.worker_id, self.default_entitlement));

        let next_balance = match (current.status, next) {
            (LeaveStatus::Pending, LeaveStatus::Approved) => balance.deduct(current.day_count())?,
            (LeaveStatus::Approved, LeaveStatus::Cancelled) => balance.restore(current.day_count()),
            _ => return Ok(None),
        };
        Ok(Some(BalanceUpdate {
            expected: stored,
            next: next_balance,
        }))
    }

    fn ensure_no_approved_overlap(&self, request: &LeaveInterval) -> EngineResult<()> {
        let range = request.date_range();
        let clash = self
            .store
            .requests_for_worker(&request.worker_id)?
            .into_iter()
            .find(|l| {
                l.id != request.id
                    && l.status == LeaveStatus::Approved
                    && l.date_range().overlaps(&range)
            });
        match clash {
            Some(existing) => Err(EngineError::OverlappingLeave {
                worker_id: request.worker_id.clone(),
                start: request.start_date,
                end: request.end_date,
                existing_id: existing.id,
            }),
            None => Ok(()),
        }
    }
}
