use crate::Q96_F64;
use crate::error::{Error, InputError};
use alloy_primitives::U256;

pub const MIN_TICK: i32 = -887272;
pub const MAX_TICK: i32 = -MIN_TICK;

/// Q64.96 sqrt price at `MIN_TICK`.
pub const MIN_SQRT_RATIO: U256 = U256::from_limbs([4295128739, 0, 0, 0]);
/// Q64.96 sqrt price at `MAX_TICK`.
pub const MAX_SQRT_RATIO: U256 =
    U256::from_limbs([6743328256752651558, 17280870778742802505, 4294805859, 0]);

const TWO_POW_64: f64 = 18446744073709551616.0;

/// Price ratio between adjacent ticks.
pub const TICK_BASE: f64 = 1.0001;
/// `ln(sqrt(1.0001))`.
pub const LN_SQRT_TICK_BASE: f64 = 4.999750016664866e-05;

/// Returns the sqrt price `sqrt(1.0001)^tick` at a (possibly fractional)
/// tick index.
///
/// Evaluated as `exp(tick * ln(sqrt(1.0001)))`, which keeps the mapping
/// strictly increasing in `tick`. The result is unscaled; multiply by
/// [`Q96_F64`] for the on-chain Q64.96 representation.
#[inline]
pub fn tick_to_sqrt_price(tick: f64) -> f64 {
    (tick * LN_SQRT_TICK_BASE).exp()
}

/// Returns the price `1.0001^tick` at a tick index.
#[inline]
pub fn price_at_tick(tick: f64) -> f64 {
    let sqrt_price = tick_to_sqrt_price(tick);
    sqrt_price * sqrt_price
}

/// Computes the tick index a Q64.96-scaled sqrt price falls into, i.e.
/// `floor(log_sqrt(1.0001)(sqrt_price_x96 / 2^96))`.
///
/// The logarithm only gives an estimate; it is corrected against
/// [`tick_to_sqrt_price`] so the result is the largest tick whose sqrt
/// price does not exceed the input. That makes
/// `sqrt_price_to_tick(tick_to_sqrt_price(t) * 2^96) == t` hold exactly.
pub fn sqrt_price_to_tick(sqrt_price_x96: f64) -> Result<i32, Error> {
    if !sqrt_price_x96.is_finite() {
        return Err(InputError::NonFiniteSqrtPrice.into());
    }

    let sqrt_price = sqrt_price_x96 / Q96_F64;
    if sqrt_price <= 0.0 {
        return Err(InputError::NonPositiveSqrtPrice.into());
    }

    let estimate = (sqrt_price.ln() / LN_SQRT_TICK_BASE).floor();
    if !(i32::MIN as f64..=i32::MAX as f64).contains(&estimate) {
        return Err(InputError::TickOutOfRange.into());
    }

    let tick_low = estimate as i64;
    let tick_high = tick_low + 1;

    let tick = if tick_to_sqrt_price(tick_high as f64) <= sqrt_price {
        tick_high
    } else if tick_to_sqrt_price(tick_low as f64) > sqrt_price {
        tick_low - 1
    } else {
        tick_low
    };

    i32::try_from(tick).map_err(|_| InputError::TickOutOfRange.into())
}

/// Approximates a `U256` as an `f64`, folding limbs from the most significant.
#[inline]
fn u256_to_f64(value: U256) -> f64 {
    value
        .as_limbs()
        .iter()
        .rev()
        .fold(0.0, |acc, limb| acc * TWO_POW_64 + *limb as f64)
}

/// Same as [`sqrt_price_to_tick`] for an on-chain style integer Q64.96
/// sqrt price, enforcing the standard Uniswap V3 bounds.
pub fn tick_at_sqrt_ratio_x96(sqrt_price_x96: U256) -> Result<i32, Error> {
    if sqrt_price_x96 < MIN_SQRT_RATIO || sqrt_price_x96 >= MAX_SQRT_RATIO {
        return Err(InputError::SqrtPriceOutOfBounds.into());
    }

    let tick = sqrt_price_to_tick(u256_to_f64(sqrt_price_x96))?;

    Ok(tick.clamp(MIN_TICK, MAX_TICK))
}
