//! Daily payroll calculation.
//!
//! This module turns one completed attendance day into a priced
//! [`DailyPayrollLine`], and runs that over a whole period of pre-fetched
//! attendance and leave. Everything here is pure: all inputs are supplied
//! by the caller.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::debug;

use crate::models::{
    AttendanceInterval, AuditStep, DailyPayrollLine, DateRange, LeaveInterval, LeaveStatus,
    PolicyRecord,
};

use super::classifier::WorkTypeClassifier;
use super::policy_lookup::resolve_multiplier;
use super::rounding::round_half_up;

/// What happened to one attendance record.
#[derive(Debug, Clone, PartialEq)]
pub enum DailyOutcome {
    /// The day was priced.
    Priced {
        /// The resulting line.
        line: DailyPayrollLine,
        /// The audit step recording the pricing.
        audit_step: AuditStep,
    },
    /// The date is covered by approved leave, so no line was produced.
    OnLeave {
        /// The audit step recording the skip.
        audit_step: AuditStep,
    },
    /// The record has no check-out and cannot be priced.
    Incomplete,
}

/// The priced lines and audit trail for a whole period.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PeriodLines {
    /// Priced days in date order.
    pub lines: Vec<DailyPayrollLine>,
    /// One audit step per priced or leave-skipped record.
    pub audit_steps: Vec<AuditStep>,
    /// Attendance records dropped because the date was on approved leave.
    pub skipped_leave_days: u32,
    /// Attendance records dropped because they had no check-out.
    pub incomplete_records: u32,
}

/// Collects every date covered by an approved leave interval, clipped to `range`.
///
/// Intervals in any other status are ignored.
pub fn approved_leave_dates(leave: &[LeaveInterval], range: &DateRange) -> BTreeSet<NaiveDate> {
    leave
        .iter()
        .filter(|l| l.status == LeaveStatus::Approved)
        .filter_map(|l| l.date_range().clamp_to(range))
        .flat_map(|r| r.dates().collect::<Vec<_>>())
        .collect()
}

/// Prices one attendance record.
///
/// # Arguments
///
/// * `attendance` - The attendance record
/// * `leave_dates` - Dates the worker was on approved leave
/// * `hourly_rate` - The worker's hourly rate
/// * `policies` - Policy records to resolve multipliers from
/// * `classifier` - Work-type classifier
/// * `step_number` - The audit step number to assign
///
/// # Returns
///
/// [`DailyOutcome::OnLeave`] when the date is on approved leave (even if the
/// record is complete), [`DailyOutcome::Incomplete`] when there is no check-out,
/// and otherwise a priced line where
/// `amount = round_half_up(hours * rate * multiplier)`.
///
/// # Example
///
/// ```
/// use payroll_engine::calculation::{calculate_daily_line, DailyOutcome, WorkTypeClassifier};
/// use payroll_engine::models::{AttendanceInterval, WorkType};
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
/// use std::collections::BTreeSet;
///
/// let date = NaiveDate::from_ymd_opt(2024, 1, 10).unwrap();
/// let attendance = AttendanceInterval::new(
///     "w1",
///     date,
///     date.and_hms_opt(9, 0, 0).unwrap(),
///     Some(date.and_hms_opt(17, 0, 0).unwrap()),
/// )
/// .unwrap();
///
/// let outcome = calculate_daily_line(
///     &attendance,
///     &BTreeSet::new(),
///     Decimal::from(20),
///     &[],
///     &WorkTypeClassifier::default(),
///     1,
/// );
/// match outcome {
///     DailyOutcome::Priced { line, .. } => {
///         assert_eq!(line.work_type, WorkType::Weekday);
///         assert_eq!(line.amount, Decimal::new(16000, 2));
///     }
///     other => panic!("unexpected {:?}", other),
/// }
/// ```
pub fn calculate_daily_line(
    attendance: &AttendanceInterval,
    leave_dates: &BTreeSet<NaiveDate>,
    hourly_rate: Decimal,
    policies: &[PolicyRecord],
    classifier: &WorkTypeClassifier,
    step_number: u32,
) -> DailyOutcome {
    if leave_dates.contains(&attendance.date) {
        debug!(
            worker_id = %attendance.worker_id,
            date = %attendance.date,
            "Skipping attendance on approved leave"
        );
        return DailyOutcome::OnLeave {
            audit_step: AuditStep {
                step_number,
                rule_id: "approved_leave_exclusion".to_string(),
                rule_name: "Approved Leave Exclusion".to_string(),
                input: serde_json::json!({
                    "date": attendance.date.to_string(),
                    "check_in": attendance.check_in.to_string(),
                }),
                output: serde_json::json!({ "priced": false }),
                reasoning: format!(
                    "{} is covered by approved leave; attendance is not paid",
                    attendance.date
                ),
            },
        };
    }

    let Some(hours) = attendance.worked_hours() else {
        return DailyOutcome::Incomplete;
    };

    let work_type = classifier.classify(attendance);
    let lookup = resolve_multiplier(policies, work_type, attendance.date);
    let amount = round_half_up(hours * hourly_rate * lookup.multiplier);

    debug!(
        worker_id = %attendance.worker_id,
        date = %attendance.date,
        work_type = %work_type,
        hours = %hours,
        amount = %amount,
        "Priced attendance day"
    );

    let holiday = classifier.calendar.holiday_name(attendance.date);
    let line = DailyPayrollLine {
        date: attendance.date,
        work_type,
        hours,
        hourly_rate,
        multiplier: lookup.multiplier,
        amount,
        policy_id: lookup.policy_id,
    };

    let audit_step = AuditStep {
        step_number,
        rule_id: "daily_payroll".to_string(),
        rule_name: "Daily Payroll Line".to_string(),
        input: serde_json::json!({
            "date": attendance.date.to_string(),
            "check_in": attendance.check_in.to_string(),
            "check_out": attendance.check_out.map(|t| t.to_string()),
            "hourly_rate": hourly_rate.to_string(),
        }),
        output: serde_json::json!({
            "work_type": work_type,
            "hours": hours.to_string(),
            "multiplier": lookup.multiplier.to_string(),
            "policy_id": lookup.policy_id,
            "amount": amount.to_string(),
        }),
        reasoning: match (holiday, lookup.policy_id) {
            (Some(name), _) => format!(
                "{} is {}: {}h x ${} x {} = ${}",
                attendance.date, name, hours, hourly_rate, lookup.multiplier, amount
            ),
            (None, None) if work_type.is_overtime() => format!(
                "{} work with no policy in force: {}h x ${} = ${}",
                work_type, hours, hourly_rate, amount
            ),
            _ => format!(
                "{} work: {}h x ${} x {} = ${}",
                work_type, hours, hourly_rate, lookup.multiplier, amount
            ),
        },
    };

    DailyOutcome::Priced { line, audit_step }
}

/// Prices every attendance record in `range`.
///
/// Records are processed in (date, check-in) order and records dated outside
/// `range` are ignored. Audit steps are numbered from 1.
pub fn calculate_period_lines(
    attendance: &[AttendanceInterval],
    leave: &[LeaveInterval],
    range: &DateRange,
    hourly_rate: Decimal,
    policies: &[PolicyRecord],
    classifier: &WorkTypeClassifier,
) -> PeriodLines {
    let leave_dates = approved_leave_dates(leave, range);

    let mut ordered: Vec<&AttendanceInterval> =
        attendance.iter().filter(|a| range.contains(a.date)).collect();
    ordered.sort_by_key(|a| (a.date, a.check_in));

    let mut result = PeriodLines::default();
    for record in ordered {
        let step_number = result.audit_steps.len() as u32 + 1;
        match calculate_daily_line(
            record,
            &leave_dates,
            hourly_rate,
            policies,
            classifier,
            step_number,
        ) {
            DailyOutcome::Priced { line, audit_step } => {
                result.lines.push(line);
                result.audit_steps.push(audit_step);
            }
            DailyOutcome::OnLeave { audit_step } => {
                result.skipped_leave_days += 1;
                result.audit_steps.push(audit_step);
            }
            DailyOutcome::Incomplete => result.incomplete_records += 1,
        }
    }
    result
}
