//! Checked fixed-point arithmetic on [`Decimal`] values.
//!
//! All monetary and ratio values in OpenSynth carry at most
//! [`constants::VALUE_DP`] (18) fractional digits. Every operation here is
//! overflow-checked and returns [`OpensynthError::ArithmeticOverflow`]
//! instead of wrapping or panicking; division by zero folds into the same
//! error kind.
//!
//! Share accounting needs explicit rounding direction, so alongside the
//! half-up [`mul`]/[`div`] pair there are fused [`mul_div_down`] /
//! [`mul_div_up`] helpers that keep full precision through the intermediate
//! product and round only the final quotient.

use rust_decimal::{Decimal, RoundingStrategy};

use crate::constants::VALUE_DP;
use crate::error::{OpensynthError, Result};

/// Checked addition.
pub fn add(a: Decimal, b: Decimal) -> Result<Decimal> {
    a.checked_add(b).ok_or(OpensynthError::ArithmeticOverflow)
}

/// Checked subtraction.
pub fn sub(a: Decimal, b: Decimal) -> Result<Decimal> {
    a.checked_sub(b).ok_or(OpensynthError::ArithmeticOverflow)
}

/// Checked multiplication, rounded half-up to 18 fractional digits.
pub fn mul(a: Decimal, b: Decimal) -> Result<Decimal> {
    a.checked_mul(b)
        .map(|v| v.round_dp_with_strategy(VALUE_DP, RoundingStrategy::MidpointAwayFromZero))
        .ok_or(OpensynthError::ArithmeticOverflow)
}

/// Checked multiplication, rounded toward zero.
pub fn mul_down(a: Decimal, b: Decimal) -> Result<Decimal> {
    a.checked_mul(b)
        .map(|v| v.round_dp_with_strategy(VALUE_DP, RoundingStrategy::ToZero))
        .ok_or(OpensynthError::ArithmeticOverflow)
}

/// Checked division, rounded half-up to 18 fractional digits.
pub fn div(a: Decimal, b: Decimal) -> Result<Decimal> {
    a.checked_div(b)
        .map(|v| v.round_dp_with_strategy(VALUE_DP, RoundingStrategy::MidpointAwayFromZero))
        .ok_or(OpensynthError::ArithmeticOverflow)
}

/// Checked division, rounded toward zero.
pub fn div_down(a: Decimal, b: Decimal) -> Result<Decimal> {
    a.checked_div(b)
        .map(|v| v.round_dp_with_strategy(VALUE_DP, RoundingStrategy::ToZero))
        .ok_or(OpensynthError::ArithmeticOverflow)
}

/// Checked division, rounded away from zero.
pub fn div_up(a: Decimal, b: Decimal) -> Result<Decimal> {
    a.checked_div(b)
        .map(|v| v.round_dp_with_strategy(VALUE_DP, RoundingStrategy::AwayFromZero))
        .ok_or(OpensynthError::ArithmeticOverflow)
}

/// `a × b / c` rounded toward zero. The intermediate product keeps full
/// precision; only the final quotient is quantized.
pub fn mul_div_down(a: Decimal, b: Decimal, c: Decimal) -> Result<Decimal> {
    let product = a.checked_mul(b).ok_or(OpensynthError::ArithmeticOverflow)?;
    div_down(product, c)
}

/// `a × b / c` rounded away from zero.
pub fn mul_div_up(a: Decimal, b: Decimal, c: Decimal) -> Result<Decimal> {
    let product = a.checked_mul(b).ok_or(OpensynthError::ArithmeticOverflow)?;
    div_up(product, c)
}
