use crate::error::InputError;
use rust_decimal::Decimal;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};

/// Smallest non-zero magnitude a `Decimal` can hold (scale 28).
pub const DECIMAL_EPSILON: f64 = 1e-28;

/// Converts an `f64` produced by the sqrt-price math into a `Decimal`
/// amount, flushing magnitudes below [`DECIMAL_EPSILON`] to zero.
///
/// Non-finite values and values beyond the `Decimal` range fail with
/// `InputError::Unrepresentable`, so float blow-ups never leak into
/// liquidity or token amounts.
pub fn to_decimal(value: f64) -> Result<Decimal, InputError> {
    if !value.is_finite() {
        return Err(InputError::Unrepresentable);
    }
    if value.abs() < DECIMAL_EPSILON {
        return Ok(Decimal::ZERO);
    }
    Decimal::from_f64(value).ok_or(InputError::Unrepresentable)
}

/// Converts a `Decimal` amount into an `f64` for use in sqrt-price math.
pub fn to_f64(value: Decimal) -> Result<f64, InputError> {
    value
        .to_f64()
        .filter(|v| v.is_finite())
        .ok_or(InputError::Unrepresentable)
}

/// Scales a decimal `liquidity` by an `f64` price factor and converts the
/// product once.
///
/// Price factors at deep ticks sit far below the 28 fractional digits a
/// `Decimal` keeps, while the liquidity-scaled product usually does not,
/// so the multiplication happens in `f64` before any rounding to scale.
pub fn scale_liquidity(liquidity: Decimal, factor: f64) -> Result<Decimal, InputError> {
    to_decimal(to_f64(liquidity)? * factor)
}

/// `a * b` on decimal amounts, mapping overflow to `InputError::Unrepresentable`.
#[inline]
pub fn mul(a: Decimal, b: Decimal) -> Result<Decimal, InputError> {
    a.checked_mul(b).ok_or(InputError::Unrepresentable)
}

/// `a / b` on decimal amounts, mapping overflow and division by zero
/// to `InputError::Unrepresentable`.
#[inline]
pub fn div(a: Decimal, b: Decimal) -> Result<Decimal, InputError> {
    a.checked_div(b).ok_or(InputError::Unrepresentable)
}
