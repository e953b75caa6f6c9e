//! Payroll aggregation.
//!
//! Folds a worker's daily lines into [`PayrollTotals`]. The fold is pure and
//! order-independent; an empty list yields zero totals.

use rust_decimal::Decimal;

use crate::error::{EngineError, EngineResult};
use crate::models::{AuditStep, DailyPayrollLine, PayrollTotals};

use super::rounding::round_half_up;

/// Sums daily lines into base, overtime, and total amounts.
///
/// Weekday lines make up the base amount and every other work type the
/// overtime amount. Base, overtime and deductions are each rounded once, and
/// `total = round_half_up(base + overtime - deductions)` over those rounded values.
///
/// Returns `InvalidAmount` if `deductions` is negative.
///
/// # Example
///
/// ```
/// use payroll_engine::calculation::aggregate_lines;
/// use rust_decimal::Decimal;
///
/// let totals = aggregate_lines(&[], Decimal::ZERO).unwrap();
/// assert_eq!(totals.total, Decimal::ZERO);
/// ```
pub fn aggregate_lines(
    lines: &[DailyPayrollLine],
    deductions: Decimal,
) -> EngineResult<PayrollTotals> {
    if deductions.is_sign_negative() && !deductions.is_zero() {
        return Err(EngineError::InvalidAmount {
            field: "deductions".to_string(),
            message: format!("must not be negative, got {}", deductions),
        });
    }

    let (total_hours, overtime_hours, base, overtime) = lines.iter().fold(
        (Decimal::ZERO, Decimal::ZERO, Decimal::ZERO, Decimal::ZERO),
        |(hours, ot_hours, base, overtime), line| {
            if line.work_type.is_overtime() {
                (
                    hours + line.hours,
                    ot_hours + line.hours,
                    base,
                    overtime + line.amount,
                )
            } else {
                (hours + line.hours, ot_hours, base + line.amount, overtime)
            }
        },
    );

    let base = round_half_up(base);
    let overtime = round_half_up(overtime);
    let deductions = round_half_up(deductions);

    Ok(PayrollTotals {
        total_hours: round_half_up(total_hours),
        overtime_hours: round_half_up(overtime_hours),
        base_amount: base,
        overtime_amount: overtime,
        deductions,
        total: round_half_up(base + overtime - deductions),
    })
}

/// Builds the audit step recording an aggregation.
pub fn aggregation_audit_step(
    step_number: u32,
    line_count: usize,
    totals: &PayrollTotals,
) -> AuditStep {
    AuditStep {
        step_number,
        rule_id: "payroll_aggregation".to_string(),
        rule_name: "Payroll Aggregation".to_string(),
        input: serde_json::json!({
            "line_count": line_count,
            "deductions": totals.deductions.to_string(),
        }),
        output: serde_json::json!({
            "base_amount": totals.base_amount.to_string(),
            "overtime_amount": totals.overtime_amount.to_string(),
            "total_hours": totals.total_hours.to_string(),
            "total": totals.total.to_string(),
        }),
        reasoning: format!(
            "Base ${} + overtime ${} - deductions ${} = ${}",
            totals.base_amount, totals.overtime_amount, totals.deductions, totals.total
        ),
    }
}
