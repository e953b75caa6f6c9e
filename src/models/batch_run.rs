//! Batch settlement run model.
//!
//! A [`BatchRun`] records one unattended settlement across a workforce. It is
//! created `Running` and moves exactly once to `Completed`, `PartialSuccess`, or
//! `Failed`. Every transition returns a new value.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::PayPeriod;
use crate::error::{EngineError, EngineResult};

/// Lifecycle status of a batch run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BatchStatus {
    /// Workers are being processed.
    Running,
    /// Every attempted worker succeeded.
    Completed,
    /// At least one worker failed.
    PartialSuccess,
    /// The run could not start per-worker processing.
    Failed,
}

impl BatchStatus {
    /// Returns true once no further transitions are possible.
    pub fn is_terminal(self) -> bool {
        self != BatchStatus::Running
    }
}

/// One worker that could not be settled in a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerFailure {
    /// The worker that failed.
    pub worker_id: String,
    /// The error message.
    pub message: String,
}

/// Bookkeeping for one batch settlement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchRun {
    /// Unique identifier for the run.
    pub id: Uuid,
    /// The period being settled.
    pub period: PayPeriod,
    /// Optional department scope.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    /// Current status.
    pub status: BatchStatus,
    /// Number of workers the run will attempt.
    pub total_count: u32,
    /// Workers settled successfully so far.
    pub success_count: u32,
    /// Workers that failed so far.
    pub failure_count: u32,
    /// Per-worker failure details.
    #[serde(default)]
    pub failures: Vec<WorkerFailure>,
    /// When the run was created.
    pub started_at: DateTime<Utc>,
    /// When the run reached a terminal status.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    /// Run-level error text for failed runs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl BatchRun {
    /// Creates a run in `Running` with zeroed counters.
    ///
    /// # Example
    ///
    /// ```
    /// use payroll_engine::models::{BatchRun, BatchStatus, PayPeriod};
    /// use chrono::Utc;
    ///
    /// let run = BatchRun::start(PayPeriod::new(2024, 1).unwrap(), None, 3, Utc::now());
    /// assert_eq!(run.status, BatchStatus::Running);
    /// assert_eq!(run.success_count + run.failure_count, 0);
    ///
    /// let run = run.record_success().unwrap().record_success().unwrap();
    /// let run = run.record_failure("w3", "no attendance").unwrap();
    /// let run = run.finish(Utc::now()).unwrap();
    /// assert_eq!(run.status, BatchStatus::PartialSuccess);
    /// ```
    pub fn start(
        period: PayPeriod,
        scope: Option<String>,
        total_count: u32,
        started_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            period,
            scope,
            status: BatchStatus::Running,
            total_count,
            success_count: 0,
            failure_count: 0,
            failures: Vec::new(),
            started_at,
            completed_at: None,
            error: None,
        }
    }

    /// Number of workers attempted so far.
    pub fn attempted(&self) -> u32 {
        self.success_count + self.failure_count
    }

    /// Returns a copy with one more success.
    pub fn record_success(&self) -> EngineResult<Self> {
        self.ensure_accepts_attempt()?;
        Ok(Self {
            success_count: self.success_count + 1,
            ..self.clone()
        })
    }

    /// Returns a copy with one more failure and its details.
    pub fn record_failure(
        &self,
        worker_id: impl Into<String>,
        message: impl Into<String>,
    ) -> EngineResult<Self> {
        self.ensure_accepts_attempt()?;
        let mut failures = self.failures.clone();
        failures.push(WorkerFailure {
            worker_id: worker_id.into(),
            message: message.into(),
        });
        Ok(Self {
            failure_count: self.failure_count + 1,
            failures,
            ..self.clone()
        })
    }

    /// Moves the run to `Completed` or `PartialSuccess` and stamps completion time.
    pub fn finish(&self, at: DateTime<Utc>) -> EngineResult<Self> {
        self.ensure_running("finish")?;
        if self.attempted() != self.total_count {
            return Err(self.invalid(format!(
                "cannot finish after {} of {} workers",
                self.attempted(),
                self.total_count
            )));
        }
        let status = if self.failure_count == 0 {
            BatchStatus::Completed
        } else {
            BatchStatus::PartialSuccess
        };
        Ok(Self {
            status,
            completed_at: Some(at),
            ..self.clone()
        })
    }

    /// Moves the run to `Failed` with the given error text.
    pub fn fail(&self, error: impl Into<String>, at: DateTime<Utc>) -> EngineResult<Self> {
        self.ensure_running("fail")?;
        Ok(Self {
            status: BatchStatus::Failed,
            completed_at: Some(at),
            error: Some(error.into()),
            ..self.clone()
        })
    }

    fn ensure_running(&self, action: &str) -> EngineResult<()> {
        if self.status.is_terminal() {
            return Err(self.invalid(format!("cannot {} a run in {:?}", action, self.status)));
        }
        Ok(())
    }

    fn ensure_accepts_attempt(&self) -> EngineResult<()> {
        self.ensure_running("record a worker on")?;
        if self.attempted() >= self.total_count {
            return Err(self.invalid(format!(
                "all {} workers already recorded",
                self.total_count
            )));
        }
        Ok(())
    }

    fn invalid(&self, message: String) -> EngineError {
        EngineError::InvalidBatchTransition {
            batch_run_id: self.id,
            message,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn start(total: u32) -> BatchRun {
        BatchRun::start(PayPeriod::new(2024, 1).unwrap(), None, total, Utc::now())
    }

    #[test]
    fn test_new_run_is_running_with_zero_counts() {
        let run = start(5);
        assert_eq!(run.status, BatchStatus::Running);
        assert_eq!(run.total_count, 5);
        assert_eq!(run.success_count, 0);
        assert_eq!(run.failure_count, 0);
        assert!(run.completed_at.is_none());
    }

    #[test]
    fn test_all_successes_complete() {
        let run = start(2)
            .record_success()
            .unwrap()
            .record_success()
            .unwrap()
            .finish(Utc::now())
            .unwrap();
        assert_eq!(run.status, BatchStatus::Completed);
        assert!(run.completed_at.is_some());
    }

    #[test]
    fn test_any_failure_is_partial_success() {
        let run = start(2)
            .record_success()
            .unwrap()
            .record_failure("w2", "boom")
            .unwrap()
            .finish(Utc::now())
            .unwrap();
        assert_eq!(run.status, BatchStatus::PartialSuccess);
        assert_eq!(run.failures.len(), 1);
        assert_eq!(run.failures[0].worker_id, "w2");
    }

    #[test]
    fn test_recording_does_not_mutate_original() {
        let run = start(1);
        let next = run.record_success().unwrap();
        assert_eq!(run.success_count, 0);
        assert_eq!(next.success_count, 1);
    }

    #[test]
    fn test_cannot_finish_before_all_workers_attempted() {
        let run = start(3).record_success().unwrap();
        assert!(matches!(
            run.finish(Utc::now()),
            Err(EngineError::InvalidBatchTransition { .. })
        ));
    }

    #[test]
    fn test_cannot_record_more_than_total() {
        let run = start(1).record_success().unwrap();
        assert!(run.record_success().is_err());
        assert!(run.record_failure("w2", "x").is_err());
    }

    #[test]
    fn test_terminal_runs_reject_transitions() {
        let failed = start(0).fail("no workers", Utc::now()).unwrap();
        assert_eq!(failed.status, BatchStatus::Failed);
        assert_eq!(failed.error.as_deref(), Some("no workers"));
        assert!(failed.finish(Utc::now()).is_err());
        assert!(failed.fail("again", Utc::now()).is_err());
        assert!(failed.record_success().is_err());

        let completed = start(0).finish(Utc::now()).unwrap();
        assert_eq!(completed.status, BatchStatus::Completed);
        assert!(completed.fail("late", Utc::now()).is_err());
    }

    #[test]
    fn test_status_serialization() {
        let json = serde_json::to_string(&BatchStatus::PartialSuccess).unwrap();
        assert_eq!(json, "\"PARTIAL_SUCCESS\"");
    }
}
