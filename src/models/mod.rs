//! Core data models for the Payroll Engine.
//!
//! This module contains all the domain models used throughout the engine.

mod attendance;
mod batch_run;
mod context;
mod leave;
mod pay_period;
mod payroll_result;
mod policy;
mod worker;

pub use attendance::AttendanceInterval;
pub use batch_run::{BatchRun, BatchStatus, WorkerFailure};
pub use context::RequestContext;
pub use leave::{LeaveBalance, LeaveInterval, LeaveStatus};
pub use pay_period::{DateRange, PayPeriod};
pub use payroll_result::{AuditStep, DailyPayrollLine, PayrollResult, PayrollTotals, WorkType};
pub use policy::{MAX_MULTIPLIER, PolicyCategory, PolicyRecord, ValidityWindow};
pub use worker::Worker;
