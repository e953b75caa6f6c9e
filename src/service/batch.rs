//! Batch settlement orchestration.
//!
//! Runs the single-worker computation across every eligible worker in a scope,
//! isolating per-worker failures and recording progress on a [`BatchRun`].

use std::sync::Arc;

use tracing::{info, warn};

use crate::config::ConfigLoader;
use crate::error::{EngineError, EngineResult};
use crate::models::{BatchRun, PayPeriod, RequestContext};
use crate::store::{
    AttendanceProvider, BatchRunRepository, LeaveProvider, PayrollRepository, PolicyStore,
    WorkerDirectory,
};

use super::PayrollService;

/// Settles a whole workforce for one period.
#[derive(Debug)]
pub struct BatchSettlement<S> {
    store: Arc<S>,
    payroll: PayrollService<S>,
}

impl<S> BatchSettlement<S>
where
    S: AttendanceProvider
        + LeaveProvider
        + PolicyStore
        + WorkerDirectory
        + PayrollRepository
        + BatchRunRepository,
{
    /// Creates an orchestrator over `store`.
    pub fn new(store: Arc<S>, config: &ConfigLoader) -> Self {
        Self {
            payroll: PayrollService::new(Arc::clone(&store), config),
            store,
        }
    }

    /// Computes payroll for every active worker in `scope`.
    ///
    /// Workers are processed sequentially in id order, each at their own
    /// hourly rate. A worker whose computation fails (including one that
    /// already has a result for the period) is counted as a failure and the
    /// run moves on. Counters are persisted after every worker.
    ///
    /// When the scope has no eligible workers a `Failed` run with zero totals
    /// is persisted and `NoEligibleWorkers` is returned, carrying its id.
    ///
    /// Once per-worker processing starts the run is always returned; failures
    /// to persist progress are logged, not raised.
    ///
    /// # Example
    ///
    /// ```
    /// use std::sync::Arc;
    /// use payroll_engine::config::ConfigLoader;
    /// use payroll_engine::error::EngineError;
    /// use payroll_engine::models::{PayPeriod, RequestContext};
    /// use payroll_engine::service::BatchSettlement;
    /// use payroll_engine::store::{BatchRunRepository, InMemoryStore};
    ///
    /// let store = Arc::new(InMemoryStore::new());
    /// let batch = BatchSettlement::new(Arc::clone(&store), &ConfigLoader::default());
    /// let ctx = RequestContext::new("scheduler");
    ///
    /// let err = batch
    ///     .run_batch_settlement(&ctx, PayPeriod::new(2024, 1).unwrap(), Some("ops"))
    ///     .unwrap_err();
    /// match err {
    ///     EngineError::NoEligibleWorkers { batch_run_id, .. } => {
    ///         assert!(store.find_run(batch_run_id).unwrap().is_some());
    ///     }
    ///     other => panic!("unexpected error: {other}"),
    /// }
    /// ```
    pub fn run_batch_settlement(
        &self,
        ctx: &RequestContext,
        period: PayPeriod,
        scope: Option<&str>,
    ) -> EngineResult<BatchRun> {
        let scope_owned = scope.map(str::to_string);
        let workers = self.store.eligible_workers(scope)?;

        if workers.is_empty() {
            let scope_label = scope.unwrap_or("all").to_string();
            let run = BatchRun::start(period, scope_owned, 0, ctx.now).fail(
                format!("no eligible workers for scope '{}'", scope_label),
                ctx.now,
            )?;
            let run = self.store.insert_run(run)?;
            warn!(
                correlation_id = %ctx.correlation_id,
                batch_run_id = %run.id,
                period = %period,
                scope = %scope_label,
                "Batch settlement failed: no eligible workers"
            );
            return Err(EngineError::NoEligibleWorkers {
                scope: scope_label,
                batch_run_id: run.id,
            });
        }

        let total = worker_count(workers.len())?;
        let mut run = self
            .store
            .insert_run(BatchRun::start(period, scope_owned, total, ctx.now))?;
        info!(
            correlation_id = %ctx.correlation_id,
            batch_run_id = %run.id,
            period = %period,
            total = run.total_count,
            "Batch settlement started"
        );

        for worker in &workers {
            run = match self
                .payroll
                .compute_payroll(ctx, &worker.id, period, worker.hourly_rate)
            {
                Ok(_) => run.record_success()?,
                Err(err) => {
                    warn!(
                        correlation_id = %ctx.correlation_id,
                        batch_run_id = %run.id,
                        worker_id = %worker.id,
                        error = %err,
                        "Worker settlement failed"
                    );
                    run.record_failure(worker.id.as_str(), err.to_string())?
                }
            };
            self.persist_progress(ctx, &run);
        }

        let run = run.finish(ctx.now)?;
        self.persist_progress(ctx, &run);
        info!(
            correlation_id = %ctx.correlation_id,
            batch_run_id = %run.id,
            status = ?run.status,
            total = run.total_count,
            success = run.success_count,
            failure = run.failure_count,
            "Batch settlement finished"
        );
        Ok(run)
    }

    /// Looks up a recorded run.
    pub fn find_run(&self, id: uuid::Uuid) -> EngineResult<Option<BatchRun>> {
        Ok(self.store.find_run(id)?)
    }

    fn persist_progress(&self, ctx: &RequestContext, run: &BatchRun) {
        if let Err(err) = self.store.update_run(run.clone()) {
            warn!(
                correlation_id = %ctx.correlation_id,
                batch_run_id = %run.id,
                error = %err,
                "Failed to persist batch run progress"
            );
        }
    }
}

fn worker_count(count: usize) -> EngineResult<u32> {
    u32::try_from(count).map_err(|_| EngineError::BatchTooLarge { count })
}
