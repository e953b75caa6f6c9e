//! Calculation logic for the Payroll Engine.
//!
//! This module contains the pure computation pipeline: half-up rounding, the
//! holiday calendar, work-type classification, temporal policy lookup, daily
//! line pricing, and aggregation into period totals. Nothing in here performs
//! I/O; every input is pre-fetched by the service layer.

mod aggregator;
mod classifier;
mod daily_payroll;
mod holiday;
mod policy_lookup;
mod rounding;

pub use aggregator::{aggregate_lines, aggregation_audit_step};
pub use classifier::{NightWindow, WorkTypeClassifier};
pub use daily_payroll::{
    DailyOutcome, PeriodLines, approved_leave_dates, calculate_daily_line, calculate_period_lines,
};
pub use holiday::{HolidayCalendar, PublicHoliday, RecurringHoliday};
pub use policy_lookup::{
    MultiplierLookup, find_overlapping_policy, find_policy, resolve_multiplier,
};
pub use rounding::{MONEY_SCALE, round_half_up};
