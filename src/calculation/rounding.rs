//! Monetary and hours rounding.
//!
//! Every hours figure and monetary amount the engine produces has a 2-digit
//! scale and is rounded half-up (midpoints move away from zero).

use rust_decimal::{Decimal, RoundingStrategy};

/// Number of decimal places kept for hours and amounts.
pub const MONEY_SCALE: u32 = 2;

/// Rounds a value half-up to [`MONEY_SCALE`] decimal places.
///
/// The result always carries exactly two decimal places, so `8` becomes `8.00`.
///
/// # Examples
///
/// ```
/// use payroll_engine::calculation::round_half_up;
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// assert_eq!(round_half_up(Decimal::from_str("7.995").unwrap()).to_string(), "8.00");
/// assert_eq!(round_half_up(Decimal::from_str("7.994").unwrap()).to_string(), "7.99");
/// assert_eq!(round_half_up(Decimal::from(8)).to_string(), "8.00");
/// ```
pub fn round_half_up(value: Decimal) -> Decimal {
    let mut rounded =
        value.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(MONEY_SCALE);
    rounded
}
