//! Single-worker payroll computation.
//!
//! [`PayrollService`] fetches a worker's attendance, approved leave, and the
//! policies in force during the period, runs the calculation pipeline, and
//! persists the result under the (worker, period) uniqueness guard.

use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::{info, warn};
use uuid::Uuid;

use crate::calculation::{
    WorkTypeClassifier, aggregate_lines, aggregation_audit_step, calculate_period_lines,
};
use crate::config::ConfigLoader;
use crate::error::{EngineError, EngineResult};
use crate::models::{PayPeriod, PayrollResult, RequestContext};
use crate::store::{
    AttendanceProvider, LeaveProvider, PayrollRepository, PolicyStore, StoreError,
    WorkerDirectory,
};

/// Computes, persists, and pays out single-worker payroll results.
#[derive(Debug)]
pub struct PayrollService<S> {
    store: Arc<S>,
    classifier: WorkTypeClassifier,
    engine_version: String,
}

impl<S> Clone for PayrollService<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            classifier: self.classifier.clone(),
            engine_version: self.engine_version.clone(),
        }
    }
}

impl<S> PayrollService<S>
where
    S: AttendanceProvider + LeaveProvider + PolicyStore + WorkerDirectory + PayrollRepository,
{
    /// Creates a service over `store` using the configured calendar and night window.
    pub fn new(store: Arc<S>, config: &ConfigLoader) -> Self {
        Self {
            store,
            classifier: config.classifier(),
            engine_version: config.engine().version.clone(),
        }
    }

    /// Computes and persists the payroll result for one worker and period.
    ///
    /// Equivalent to [`compute_payroll_with_deductions`](Self::compute_payroll_with_deductions)
    /// with zero deductions.
    ///
    /// # Errors
    ///
    /// - `WorkerNotFound` if the worker is unknown
    /// - `DuplicatePayrollResult` if a result already exists for the pair
    /// - `NoAttendanceRecords` if the worker has no completed attendance in the period
    /// - `InvalidAttendance` if a supplied record checks out before it checks in
    /// - `InvalidAmount` if `hourly_rate` is not positive
    pub fn compute_payroll(
        &self,
        ctx: &RequestContext,
        worker_id: &str,
        period: PayPeriod,
        hourly_rate: Decimal,
    ) -> EngineResult<PayrollResult> {
        self.compute_payroll_with_deductions(ctx, worker_id, period, hourly_rate, Decimal::ZERO)
    }

    /// Computes and persists the payroll result, subtracting `deductions` from the total.
    pub fn compute_payroll_with_deductions(
        &self,
        ctx: &RequestContext,
        worker_id: &str,
        period: PayPeriod,
        hourly_rate: Decimal,
        deductions: Decimal,
    ) -> EngineResult<PayrollResult> {
        match self.compute(ctx, worker_id, period, hourly_rate, deductions) {
            Ok(result) => {
                info!(
                    correlation_id = %ctx.correlation_id,
                    worker_id = %worker_id,
                    period = %period,
                    lines = result.lines.len(),
                    total = %result.totals.total,
                    "Payroll computed"
                );
                Ok(result)
            }
            Err(err) => {
                warn!(
                    correlation_id = %ctx.correlation_id,
                    worker_id = %worker_id,
                    period = %period,
                    error = %err,
                    "Payroll computation rejected"
                );
                Err(err)
            }
        }
    }

    fn compute(
        &self,
        ctx: &RequestContext,
        worker_id: &str,
        period: PayPeriod,
        hourly_rate: Decimal,
        deductions: Decimal,
    ) -> EngineResult<PayrollResult> {
        if hourly_rate <= Decimal::ZERO {
            return Err(EngineError::InvalidAmount {
                field: "hourly_rate".to_string(),
                message: format!("must be positive, got {}", hourly_rate),
            });
        }

        self.store
            .find_worker(worker_id)?
            .ok_or_else(|| EngineError::WorkerNotFound {
                worker_id: worker_id.to_string(),
            })?;

        if self.store.find_result(worker_id, period)?.is_some() {
            return Err(duplicate(worker_id, period));
        }

        let range = period.date_range();
        let attendance = self.store.completed_attendance(worker_id, &range)?;
        if attendance.is_empty() {
            return Err(EngineError::NoAttendanceRecords {
                worker_id: worker_id.to_string(),
                period,
            });
        }
        for record in &attendance {
            record.validate()?;
        }
        let leave = self.store.approved_leave(worker_id, &range)?;
        let policies = self.store.policies_overlapping(&range)?;

        let priced = calculate_period_lines(
            &attendance,
            &leave,
            &range,
            hourly_rate,
            &policies,
            &self.classifier,
        );
        let totals = aggregate_lines(&priced.lines, deductions)?;

        let mut audit_steps = priced.audit_steps;
        audit_steps.push(aggregation_audit_step(
            audit_steps.len() as u32 + 1,
            priced.lines.len(),
            &totals,
        ));

        let result = PayrollResult {
            id: Uuid::new_v4(),
            worker_id: worker_id.to_string(),
            period,
            lines: priced.lines,
            totals,
            paid: false,
            calculated_at: ctx.now,
            paid_at: None,
            engine_version: self.engine_version.clone(),
            audit_steps,
        };

        self.store.insert_result(result).map_err(|err| match err {
            StoreError::Conflict => duplicate(worker_id, period),
            other => other.into(),
        })
    }

    /// Marks a computed result as paid.
    ///
    /// # Errors
    ///
    /// - `PayrollResultNotFound` if nothing was computed for the pair
    /// - `AlreadyPaid` if the result was paid before
    pub fn mark_paid(
        &self,
        ctx: &RequestContext,
        worker_id: &str,
        period: PayPeriod,
    ) -> EngineResult<PayrollResult> {
        match self.pay(ctx, worker_id, period) {
            Ok(paid) => {
                info!(
                    correlation_id = %ctx.correlation_id,
                    worker_id = %worker_id,
                    period = %period,
                    total = %paid.totals.total,
                    "Payroll result marked paid"
                );
                Ok(paid)
            }
            Err(err) => {
                warn!(
                    correlation_id = %ctx.correlation_id,
                    worker_id = %worker_id,
                    period = %period,
                    error = %err,
                    "Mark paid rejected"
                );
                Err(err)
            }
        }
    }

    fn pay(
        &self,
        ctx: &RequestContext,
        worker_id: &str,
        period: PayPeriod,
    ) -> EngineResult<PayrollResult> {
        let not_found = || EngineError::PayrollResultNotFound {
            worker_id: worker_id.to_string(),
            period,
        };
        let paid = self
            .store
            .find_result(worker_id, period)?
            .ok_or_else(not_found)?
            .mark_paid(ctx.now)?;

        // The store only accepts the write while the stored result is unpaid.
        self.store
            .commit_payment(paid.clone())
            .map_err(|err| match err {
                StoreError::Conflict => EngineError::AlreadyPaid {
                    worker_id: worker_id.to_string(),
                    period,
                },
                StoreError::NotFound => not_found(),
                other => other.into(),
            })?;
        Ok(paid)
    }

    /// Looks up a previously computed result.
    pub fn find_result(
        &self,
        worker_id: &str,
        period: PayPeriod,
    ) -> EngineResult<Option<PayrollResult>> {
        Ok(self.store.find_result(worker_id, period)?)
    }
}

fn duplicate(worker_id: &str, period: PayPeriod) -> EngineError {
    EngineError::DuplicatePayrollResult {
        worker_id: worker_id.to_string(),
        period,
    }
}
