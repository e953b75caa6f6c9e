//! End-to-end tests for the Payroll Engine.
//!
//! This test suite drives the services over the in-memory store, configured
//! from `config/default`, and covers:
//! - Work-type priority (holiday over weekend and night)
//! - Decimal-exact line amounts and totals
//! - Approved leave exclusion
//! - Policy overlap guard
//! - Batch settlement with per-worker failure isolation
//! - Leave balance deduction and restoration, including concurrent approvals
//! - Rejection of malformed attendance
//! - Duplicate result guard

use std::collections::BTreeSet;
use std::str::FromStr;
use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime};
use proptest::prelude::*;
use rust_decimal::Decimal;

use payroll_engine::calculation::{
    DailyOutcome, WorkTypeClassifier, aggregate_lines, calculate_daily_line, round_half_up,
};
use payroll_engine::config::ConfigLoader;
use payroll_engine::error::{EngineError, ErrorKind};
use payroll_engine::models::{
    AttendanceInterval, BatchStatus, LeaveBalance, PayPeriod, PolicyCategory, PolicyRecord,
    RequestContext, WorkType, Worker,
};
use payroll_engine::service::{BatchSettlement, LeaveService, PayrollService, PolicyService};
use payroll_engine::store::{BatchRunRepository, InMemoryStore, PayrollRepository};

// =============================================================================
// Test Helpers
// =============================================================================

struct Harness {
    store: Arc<InMemoryStore>,
    payroll: PayrollService<InMemoryStore>,
    batch: BatchSettlement<InMemoryStore>,
    policies: PolicyService<InMemoryStore>,
    leave: LeaveService<InMemoryStore>,
}

fn create_harness() -> Harness {
    let config = ConfigLoader::load("./config/default").expect("Failed to load config");
    let store = Arc::new(InMemoryStore::new());
    store
        .seed_policies(config.policies().to_vec())
        .expect("Failed to seed policies");
    Harness {
        payroll: PayrollService::new(Arc::clone(&store), &config),
        batch: BatchSettlement::new(Arc::clone(&store), &config),
        policies: PolicyService::new(Arc::clone(&store)),
        leave: LeaveService::new(Arc::clone(&store), &config),
        store,
    }
}

fn ctx() -> RequestContext {
    RequestContext::new("integration-test")
}

fn decimal(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn datetime(s: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M").unwrap()
}

fn period(s: &str) -> PayPeriod {
    PayPeriod::from_str(s).unwrap()
}

fn hire(h: &Harness, id: &str, department: &str, rate: &str) {
    h.store
        .put_worker(Worker {
            id: id.to_string(),
            name: format!("Worker {}", id),
            department: Some(department.to_string()),
            hourly_rate: decimal(rate),
            active: true,
        })
        .unwrap();
}

fn clock(h: &Harness, worker_id: &str, day: &str, check_in: &str, check_out: &str) {
    h.store
        .add_attendance(
            AttendanceInterval::new(
                worker_id,
                date(day),
                datetime(check_in),
                Some(datetime(check_out)),
            )
            .unwrap(),
        )
        .unwrap();
}

// =============================================================================
// Classification
// =============================================================================

#[test]
fn test_new_year_late_check_in_is_holiday_not_night() {
    let h = create_harness();
    hire(&h, "w1", "ops", "20.00");
    clock(&h, "w1", "2024-01-01", "2024-01-01T23:30", "2024-01-02T07:30");

    let result = h
        .payroll
        .compute_payroll(&ctx(), "w1", period("2024-01"), decimal("20.00"))
        .unwrap();

    assert_eq!(result.lines.len(), 1);
    let line = &result.lines[0];
    assert_eq!(line.work_type, WorkType::Holiday);
    assert_eq!(line.hours, decimal("8.00"));
    assert_eq!(line.multiplier, decimal("2.0"));
    assert_eq!(line.amount, decimal("320.00"));
    assert!(result.audit_steps[0].reasoning.contains("New Year's Day"));
}

#[test]
fn test_holiday_on_saturday_is_holiday() {
    let h = create_harness();
    hire(&h, "w1", "ops", "20.00");
    // 2022-01-01 is a Saturday
    clock(&h, "w1", "2022-01-01", "2022-01-01T09:00", "2022-01-01T13:00");

    let result = h
        .payroll
        .compute_payroll(&ctx(), "w1", period("2022-01"), decimal("20.00"))
        .unwrap();
    assert_eq!(result.lines[0].work_type, WorkType::Holiday);
}

#[test]
fn test_mixed_month_splits_base_and_overtime() {
    let h = create_harness();
    hire(&h, "w1", "ops", "20.00");
    clock(&h, "w1", "2024-01-10", "2024-01-10T09:00", "2024-01-10T17:00"); // weekday 8h
    clock(&h, "w1", "2024-01-11", "2024-01-11T14:00", "2024-01-11T22:30"); // night 8.5h x1.5
    clock(&h, "w1", "2024-01-14", "2024-01-14T10:00", "2024-01-14T14:00"); // Sunday 4h x1.5

    let result = h
        .payroll
        .compute_payroll(&ctx(), "w1", period("2024-01"), decimal("20.00"))
        .unwrap();

    let types: Vec<WorkType> = result.lines.iter().map(|l| l.work_type).collect();
    assert_eq!(types, vec![WorkType::Weekday, WorkType::Night, WorkType::Weekend]);
    assert_eq!(result.base_amount(), decimal("160.00"));
    assert_eq!(result.overtime_amount(), decimal("375.00"));
    assert_eq!(result.total(), decimal("535.00"));
    assert_eq!(result.totals.total_hours, decimal("20.50"));
    assert_eq!(result.totals.overtime_hours, decimal("12.50"));
}

// =============================================================================
// Arithmetic
// =============================================================================

#[test]
fn test_half_up_boundary_values() {
    assert_eq!(round_half_up(decimal("7.995")), decimal("8.00"));
    assert_eq!(round_half_up(decimal("7.994")), decimal("7.99"));
    assert_eq!(round_half_up(decimal("0.005")), decimal("0.01"));
}

#[test]
fn test_amount_rounds_half_up_at_the_cent() {
    let h = create_harness();
    hire(&h, "w1", "ops", "10.333");
    // 7.5h x 10.333 = 77.4975
    clock(&h, "w1", "2024-01-10", "2024-01-10T09:00", "2024-01-10T16:30");

    let result = h
        .payroll
        .compute_payroll(&ctx(), "w1", period("2024-01"), decimal("10.333"))
        .unwrap();
    assert_eq!(result.lines[0].amount, decimal("77.50"));
    assert_eq!(result.total(), decimal("77.50"));
}

#[test]
fn test_total_subtracts_deductions_with_half_up() {
    let h = create_harness();
    hire(&h, "w1", "ops", "20.00");
    clock(&h, "w1", "2024-01-10", "2024-01-10T09:00", "2024-01-10T17:00");

    let result = h
        .payroll
        .compute_payroll_with_deductions(
            &ctx(),
            "w1",
            period("2024-01"),
            decimal("20.00"),
            decimal("0.005"),
        )
        .unwrap();
    assert_eq!(result.totals.deductions, decimal("0.01"));
    assert_eq!(result.total(), decimal("159.99"));
    assert_eq!(
        result.total(),
        round_half_up(result.base_amount() + result.overtime_amount() - result.totals.deductions)
    );
}

#[test]
fn test_attendance_insertion_order_does_not_change_totals() {
    let h = create_harness();
    let shifts = [
        ("2024-01-10", "2024-01-10T09:00", "2024-01-10T17:00"),
        ("2024-01-13", "2024-01-13T09:00", "2024-01-13T12:15"),
        ("2024-01-16", "2024-01-16T05:00", "2024-01-16T13:07"),
    ];
    hire(&h, "forward", "ops", "23.17");
    hire(&h, "backward", "ops", "23.17");
    for (day, check_in, check_out) in shifts {
        clock(&h, "forward", day, check_in, check_out);
    }
    for (day, check_in, check_out) in shifts.iter().rev() {
        clock(&h, "backward", day, check_in, check_out);
    }

    let a = h
        .payroll
        .compute_payroll(&ctx(), "forward", period("2024-01"), decimal("23.17"))
        .unwrap();
    let b = h
        .payroll
        .compute_payroll(&ctx(), "backward", period("2024-01"), decimal("23.17"))
        .unwrap();
    assert_eq!(a.totals, b.totals);
    assert_eq!(a.lines, b.lines);
}

proptest! {
    #[test]
    fn prop_line_amount_is_rounded_product(
        minutes in 1i64..1_440,
        rate_cents in 1i64..20_000,
        multiplier_tenths in 0i64..=100,
    ) {
        let day = date("2024-03-02"); // Saturday
        let policies = vec![PolicyRecord::new(
            PolicyCategory::WeekendOvertime,
            Decimal::new(multiplier_tenths, 1),
            date("2024-01-01"),
            None,
            chrono::Utc::now(),
        )
        .unwrap()];
        let check_in = day.and_hms_opt(0, 0, 0).unwrap();
        let attendance = AttendanceInterval::new(
            "w1",
            day,
            check_in,
            Some(check_in + chrono::Duration::minutes(minutes)),
        )
        .unwrap();
        let rate = Decimal::new(rate_cents, 2);

        let outcome = calculate_daily_line(
            &attendance,
            &BTreeSet::new(),
            rate,
            &policies,
            &WorkTypeClassifier::default(),
            1,
        );
        let line = match outcome {
            DailyOutcome::Priced { line, .. } => line,
            other => panic!("unexpected outcome {:?}", other),
        };
        prop_assert_eq!(line.hours, round_half_up(Decimal::from(minutes) / Decimal::from(60)));
        prop_assert_eq!(line.amount, round_half_up(line.hours * rate * line.multiplier));

        let totals = aggregate_lines(std::slice::from_ref(&line), Decimal::ZERO).unwrap();
        prop_assert_eq!(totals.total, round_half_up(totals.base_amount + totals.overtime_amount));
    }
}

// =============================================================================
// Approved Leave
// =============================================================================

#[test]
fn test_approved_leave_day_produces_no_line() {
    let h = create_harness();
    hire(&h, "w1", "ops", "20.00");
    h.store
        .put_balance(LeaveBalance::new("w1", decimal("10")))
        .unwrap();
    clock(&h, "w1", "2024-01-10", "2024-01-10T09:00", "2024-01-10T17:00");
    clock(&h, "w1", "2024-01-11", "2024-01-11T09:00", "2024-01-11T17:00");

    let request = h
        .leave
        .request_leave(&ctx(), "w1", date("2024-01-11"), date("2024-01-12"))
        .unwrap();
    h.leave.approve_leave(&ctx(), request.id, "mgr").unwrap();

    let result = h
        .payroll
        .compute_payroll(&ctx(), "w1", period("2024-01"), decimal("20.00"))
        .unwrap();
    assert_eq!(result.lines.len(), 1);
    assert_eq!(result.lines[0].date, date("2024-01-10"));
    assert_eq!(result.total(), decimal("160.00"));
    assert!(
        result
            .audit_steps
            .iter()
            .any(|s| s.rule_id == "approved_leave_exclusion")
    );
}

#[test]
fn test_pending_leave_does_not_exclude() {
    let h = create_harness();
    hire(&h, "w1", "ops", "20.00");
    clock(&h, "w1", "2024-01-11", "2024-01-11T09:00", "2024-01-11T17:00");
    h.leave
        .request_leave(&ctx(), "w1", date("2024-01-11"), date("2024-01-11"))
        .unwrap();

    let result = h
        .payroll
        .compute_payroll(&ctx(), "w1", period("2024-01"), decimal("20.00"))
        .unwrap();
    assert_eq!(result.lines.len(), 1);
}

// =============================================================================
// Policies
// =============================================================================

#[test]
fn test_create_policy_overlap_guard() {
    let h = create_harness();
    let ctx = ctx();
    // Seeded categories are open-ended from 2020, so use ones the seed leaves free.
    h.policies
        .create_policy(
            &ctx,
            PolicyCategory::NightShift,
            decimal("1.5"),
            date("2024-01-01"),
            Some(date("2024-06-30")),
        )
        .unwrap();

    let clash = h.policies.create_policy(
        &ctx,
        PolicyCategory::NightShift,
        decimal("1.75"),
        date("2024-03-01"),
        None,
    );
    assert!(matches!(clash, Err(EngineError::OverlappingPolicy { .. })));
    assert_eq!(clash.unwrap_err().kind(), ErrorKind::Precondition);

    let other = h.policies.create_policy(
        &ctx,
        PolicyCategory::HolidayWork,
        decimal("1.75"),
        date("2024-03-01"),
        None,
    );
    assert!(other.is_ok());
}

#[test]
fn test_weekend_overtime_overlap_with_seed() {
    let h = create_harness();
    let result = h.policies.create_policy(
        &ctx(),
        PolicyCategory::WeekendOvertime,
        decimal("1.75"),
        date("2024-03-01"),
        None,
    );
    assert!(matches!(result, Err(EngineError::OverlappingPolicy { .. })));
}

#[test]
fn test_policy_change_mid_period_applies_by_date() {
    let store = Arc::new(InMemoryStore::new());
    let config = ConfigLoader::default();
    let policies = PolicyService::new(Arc::clone(&store));
    let payroll = PayrollService::new(Arc::clone(&store), &config);
    let ctx = ctx();

    policies
        .create_policy(
            &ctx,
            PolicyCategory::WeekendOvertime,
            decimal("1.5"),
            date("2024-01-01"),
            Some(date("2024-01-15")),
        )
        .unwrap();
    policies
        .create_policy(
            &ctx,
            PolicyCategory::WeekendOvertime,
            decimal("2.0"),
            date("2024-01-16"),
            None,
        )
        .unwrap();
    store
        .put_worker(Worker {
            id: "w1".to_string(),
            name: "Ada".to_string(),
            department: None,
            hourly_rate: decimal("10.00"),
            active: true,
        })
        .unwrap();
    for day in ["2024-01-13", "2024-01-20"] {
        let d = date(day);
        store
            .add_attendance(
                AttendanceInterval::new(
                    "w1",
                    d,
                    d.and_hms_opt(9, 0, 0).unwrap(),
                    Some(d.and_hms_opt(11, 0, 0).unwrap()),
                )
                .unwrap(),
            )
            .unwrap();
    }

    let result = payroll
        .compute_payroll(&ctx, "w1", period("2024-01"), decimal("10.00"))
        .unwrap();
    assert_eq!(result.lines[0].amount, decimal("30.00"));
    assert_eq!(result.lines[1].amount, decimal("40.00"));
}

// =============================================================================
// Batch Settlement
// =============================================================================

#[test]
fn test_batch_with_one_failing_worker_is_partial_success() {
    let h = create_harness();
    for id in ["w1", "w2", "w3", "w4", "w5"] {
        hire(&h, id, "ops", "20.00");
        // Worker #3 has no attendance, so its computation fails.
        if id != "w3" {
            clock(&h, id, "2024-01-10", "2024-01-10T09:00", "2024-01-10T17:00");
        }
    }

    let run = h
        .batch
        .run_batch_settlement(&ctx(), period("2024-01"), Some("ops"))
        .unwrap();

    assert_eq!(run.total_count, 5);
    assert_eq!(run.success_count, 4);
    assert_eq!(run.failure_count, 1);
    assert_eq!(run.status, BatchStatus::PartialSuccess);
    assert_eq!(run.failures[0].worker_id, "w3");
    assert!(run.completed_at.is_some());

    let stored = h.store.find_run(run.id).unwrap().unwrap();
    assert_eq!(stored, run);
    for id in ["w1", "w2", "w4", "w5"] {
        assert!(h.store.find_result(id, period("2024-01")).unwrap().is_some());
    }
    assert!(h.store.find_result("w3", period("2024-01")).unwrap().is_none());
}

#[test]
fn test_batch_counts_pre_existing_result_as_failure() {
    let h = create_harness();
    for id in ["w1", "w2"] {
        hire(&h, id, "ops", "20.00");
        clock(&h, id, "2024-01-10", "2024-01-10T09:00", "2024-01-10T17:00");
    }
    h.payroll
        .compute_payroll(&ctx(), "w1", period("2024-01"), decimal("20.00"))
        .unwrap();

    let run = h
        .batch
        .run_batch_settlement(&ctx(), period("2024-01"), None)
        .unwrap();
    assert_eq!((run.success_count, run.failure_count), (1, 1));
    assert_eq!(run.status, BatchStatus::PartialSuccess);
    assert_eq!(run.success_count + run.failure_count, run.total_count);
}

#[test]
fn test_batch_records_inverted_attendance_as_worker_failure() {
    let h = create_harness();
    for id in ["w1", "w2"] {
        hire(&h, id, "ops", "20.00");
        clock(&h, id, "2024-01-10", "2024-01-10T09:00", "2024-01-10T17:00");
    }
    h.store
        .add_attendance(AttendanceInterval {
            worker_id: "w2".to_string(),
            date: date("2024-01-11"),
            check_in: datetime("2024-01-11T17:00"),
            check_out: Some(datetime("2024-01-11T09:00")),
        })
        .unwrap();

    let err = h
        .payroll
        .compute_payroll(&ctx(), "w2", period("2024-01"), decimal("20.00"))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvariantViolation);

    let run = h
        .batch
        .run_batch_settlement(&ctx(), period("2024-01"), None)
        .unwrap();
    assert_eq!((run.success_count, run.failure_count), (1, 1));
    assert_eq!(run.failures[0].worker_id, "w2");
    assert!(h.store.find_result("w2", period("2024-01")).unwrap().is_none());
}

#[test]
fn test_batch_with_no_eligible_workers_is_distinct_failure() {
    let h = create_harness();
    hire(&h, "w1", "ops", "20.00");

    let err = h
        .batch
        .run_batch_settlement(&ctx(), period("2024-01"), Some("finance"))
        .unwrap_err();
    assert!(err.is_precondition());

    let EngineError::NoEligibleWorkers { batch_run_id, .. } = &err else {
        panic!("Expected NoEligibleWorkers, got {:?}", err);
    };
    let run = h.store.find_run(*batch_run_id).unwrap().unwrap();
    assert_eq!(run.status, BatchStatus::Failed);
    assert_eq!(run.total_count, 0);
    assert!(run.error.is_some());
}

// =============================================================================
// Leave Balance
// =============================================================================

#[test]
fn test_leave_approve_then_cancel_restores_balance() {
    let h = create_harness();
    hire(&h, "w1", "ops", "20.00");
    h.store
        .put_balance(LeaveBalance::new("w1", decimal("5")))
        .unwrap();

    let request = h
        .leave
        .request_leave(&ctx(), "w1", date("2024-02-05"), date("2024-02-07"))
        .unwrap();
    h.leave.approve_leave(&ctx(), request.id, "mgr").unwrap();
    assert_eq!(h.leave.leave_balance("w1").unwrap().remaining_days, decimal("2"));

    h.leave.cancel_leave(&ctx(), request.id).unwrap();
    assert_eq!(h.leave.leave_balance("w1").unwrap().remaining_days, decimal("5"));
}

#[test]
fn test_concurrent_approvals_cannot_overdraw_balance() {
    let h = create_harness();
    hire(&h, "w1", "ops", "20.00");
    h.store
        .put_balance(LeaveBalance::new("w1", decimal("5")))
        .unwrap();
    let ids: Vec<_> = [("2024-02-05", "2024-02-07"), ("2024-03-04", "2024-03-06")]
        .into_iter()
        .map(|(start, end)| {
            h.leave
                .request_leave(&ctx(), "w1", date(start), date(end))
                .unwrap()
                .id
        })
        .collect();

    let approved = std::thread::scope(|scope| {
        let handles: Vec<_> = ids
            .iter()
            .map(|&id| {
                let leave = &h.leave;
                scope.spawn(move || leave.approve_leave(&ctx(), id, "mgr").is_ok())
            })
            .collect();
        handles
            .into_iter()
            .map(|handle| handle.join().unwrap())
            .filter(|ok| *ok)
            .count()
    });

    assert_eq!(approved, 1);
    assert_eq!(h.leave.leave_balance("w1").unwrap().remaining_days, decimal("2"));
}

#[test]
fn test_default_entitlement_from_config() {
    let h = create_harness();
    hire(&h, "w2", "ops", "20.00");
    assert_eq!(h.leave.leave_balance("w2").unwrap().remaining_days, decimal("15"));

    let request = h
        .leave
        .request_leave(&ctx(), "w2", date("2024-02-05"), date("2024-02-09"))
        .unwrap();
    h.leave.approve_leave(&ctx(), request.id, "mgr").unwrap();
    assert_eq!(h.leave.leave_balance("w2").unwrap().remaining_days, decimal("10"));
}

// =============================================================================
// Duplicate Guard
// =============================================================================

#[test]
fn test_compute_payroll_twice_is_rejected() {
    let h = create_harness();
    hire(&h, "w1", "ops", "20.00");
    clock(&h, "w1", "2024-01-10", "2024-01-10T09:00", "2024-01-10T17:00");

    let first = h
        .payroll
        .compute_payroll(&ctx(), "w1", period("2024-01"), decimal("20.00"))
        .unwrap();
    let second = h
        .payroll
        .compute_payroll(&ctx(), "w1", period("2024-01"), decimal("20.00"));

    match second {
        Err(EngineError::DuplicatePayrollResult { worker_id, period: p }) => {
            assert_eq!(worker_id, "w1");
            assert_eq!(p.to_string(), "2024-01");
        }
        other => panic!("Expected DuplicatePayrollResult, got {:?}", other),
    }
    assert_eq!(
        h.store.find_result("w1", period("2024-01")).unwrap(),
        Some(first)
    );
}

#[test]
fn test_result_serializes_with_string_decimals() {
    let h = create_harness();
    hire(&h, "w1", "ops", "20.00");
    clock(&h, "w1", "2024-01-10", "2024-01-10T09:00", "2024-01-10T17:00");
    let result = h
        .payroll
        .compute_payroll(&ctx(), "w1", period("2024-01"), decimal("20.00"))
        .unwrap();

    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(json["period"], "2024-01");
    assert_eq!(json["totals"]["total"], "160.00");
    assert_eq!(json["lines"][0]["work_type"], "weekday");
}
