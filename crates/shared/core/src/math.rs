//! Fixed-point arithmetic
//!
//! Amounts are raw `u128` token units and prices are 18-decimal wads.
//! Products are formed in 256 bits so `a * b / d` never overflows before
//! the division; only the final narrowing back to `u128` can fail.
//!
//! Every multiply-divide exists in a round-down and a round-up flavour.
//! Outputs paid by the pool round down, inputs owed to the pool round up.

use primitive_types::U256;
use rust_decimal::Decimal;
use thiserror::Error;

/// 1.0 in 18-decimal fixed point
pub const WAD: u128 = 1_000_000_000_000_000_000;

/// 100% in basis points
pub const BPS: u128 = 10_000;

/// Largest token decimals accepted for unit conversion
pub const MAX_DECIMALS: u8 = 30;

const WAD_DECIMALS: u32 = 18;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MathError {
    #[error("Arithmetic overflow")]
    Overflow,

    #[error("Arithmetic underflow")]
    Underflow,

    #[error("Division by zero")]
    DivisionByZero,
}

pub type MathResult<T> = std::result::Result<T, MathError>;

fn narrow(value: U256) -> MathResult<u128> {
    if value > U256::from(u128::MAX) {
        return Err(MathError::Overflow);
    }
    Ok(value.low_u128())
}

/// Rounding direction for a division
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rounding {
    Down,
    Up,
}

fn divide(numerator: U256, denominator: U256, rounding: Rounding) -> MathResult<u128> {
    if denominator.is_zero() {
        return Err(MathError::DivisionByZero);
    }
    let quotient = numerator / denominator;
    match rounding {
        Rounding::Up if !(numerator % denominator).is_zero() => narrow(quotient + U256::one()),
        _ => narrow(quotient),
    }
}

/// `a * b / denominator` with an explicit rounding direction
pub fn mul_div(a: u128, b: u128, denominator: u128, rounding: Rounding) -> MathResult<u128> {
    divide(
        U256::from(a) * U256::from(b),
        U256::from(denominator),
        rounding,
    )
}

/// `a * b * 10^shift / denominator` (negative shift scales the denominator)
///
/// Used for converting between tokens with different decimals without an
/// intermediate rounding step.
pub fn scaled_mul_div(
    a: u128,
    b: u128,
    denominator: u128,
    decimal_shift: i32,
    rounding: Rounding,
) -> MathResult<u128> {
    let factor = U256::from(pow10(decimal_shift.unsigned_abs().min(u8::MAX as u32) as u8)?);
    let mut numerator = U256::from(a) * U256::from(b);
    let mut denominator = U256::from(denominator);
    if decimal_shift >= 0 {
        numerator = numerator.checked_mul(factor).ok_or(MathError::Overflow)?;
    } else {
        denominator = denominator
            .checked_mul(factor)
            .ok_or(MathError::Overflow)?;
    }
    divide(numerator, denominator, rounding)
}

/// `a * b / denominator`, rounded toward zero
#[inline]
pub fn mul_div_down(a: u128, b: u128, denominator: u128) -> MathResult<u128> {
    mul_div(a, b, denominator, Rounding::Down)
}

/// `a * b / denominator`, rounded away from zero
#[inline]
pub fn mul_div_up(a: u128, b: u128, denominator: u128) -> MathResult<u128> {
    mul_div(a, b, denominator, Rounding::Up)
}

/// `amount * bps / 10_000`, rounded down
#[inline]
pub fn apply_bps_down(amount: u128, bps: u32) -> MathResult<u128> {
    mul_div_down(amount, bps as u128, BPS)
}

/// `amount * bps / 10_000`, rounded up
#[inline]
pub fn apply_bps_up(amount: u128, bps: u32) -> MathResult<u128> {
    mul_div_up(amount, bps as u128, BPS)
}

/// `part / whole` expressed in bps, rounded down and saturated to `u32`
pub fn to_bps_down(part: u128, whole: u128) -> MathResult<u32> {
    Ok(saturate_bps(mul_div_down(part, BPS, whole)?))
}

/// `part / whole` expressed in bps, rounded up and saturated to `u32`
pub fn to_bps_up(part: u128, whole: u128) -> MathResult<u32> {
    Ok(saturate_bps(mul_div_up(part, BPS, whole)?))
}

/// Clamp a wide bps value into `u32`
#[inline]
pub fn saturate_bps(value: u128) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}

#[inline]
pub fn abs_diff(a: u128, b: u128) -> u128 {
    a.abs_diff(b)
}

/// Relative move of `current` against `reference`, in bps (rounded down)
pub fn drift_bps(current: u128, reference: u128) -> MathResult<u32> {
    to_bps_down(abs_diff(current, reference), reference)
}

/// Divergence between two independent prices, relative to the smaller one
pub fn divergence_bps(a: u128, b: u128) -> MathResult<u32> {
    to_bps_down(abs_diff(a, b), a.min(b))
}

/// `10^decimals` as `u128`
pub fn pow10(decimals: u8) -> MathResult<u128> {
    if decimals > MAX_DECIMALS {
        return Err(MathError::Overflow);
    }
    10u128
        .checked_pow(decimals as u32)
        .ok_or(MathError::Overflow)
}

/// Convert a human-readable decimal into a wad, truncating past 18 places
pub fn wad_from_decimal(value: Decimal) -> MathResult<u128> {
    if value.is_sign_negative() && !value.is_zero() {
        return Err(MathError::Underflow);
    }
    let mantissa = u128::try_from(value.mantissa()).map_err(|_| MathError::Underflow)?;
    let scale = value.scale();
    if scale <= WAD_DECIMALS {
        let factor = 10u128.pow(WAD_DECIMALS - scale);
        mantissa.checked_mul(factor).ok_or(MathError::Overflow)
    } else {
        Ok(mantissa / 10u128.pow(scale - WAD_DECIMALS))
    }
}

/// Convert a wad into a decimal for logging and display
pub fn wad_to_decimal(value: u128) -> MathResult<Decimal> {
    let mantissa = i128::try_from(value).map_err(|_| MathError::Overflow)?;
    Decimal::try_from_i128_with_scale(mantissa, WAD_DECIMALS)
        .map(|d| d.normalize())
        .map_err(|_| MathError::Overflow)
}
