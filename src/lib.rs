//! Tick-indexed liquidity ledger and multi-segment swap walk for
//! concentrated-liquidity (Uniswap V3 style) pools in pure Rust.
//!
//! This crate exposes:
//! - A stateless price/tick codec (`math::tick_math`) converting between
//!   tick indices and (Q64.96-scaled) square-root prices.
//! - A `Ledger` mapping ticks to the liquidity active over each segment,
//!   plus a `SharedLedger` handle for concurrent use.
//! - `Ledger::compute_output`, which walks consecutive tick segments and
//!   converts an input amount until it is exhausted or the range ends.
//!
//! Liquidity and token amounts are `Decimal`s; sqrt-price math is `f64`.
//!
//! # Examples
//!
//! ## Pure math
//! ```
//! use clmm_segment_swap::{Q96_F64, math::tick_math};
//!
//! let sqrt_price = tick_math::tick_to_sqrt_price(5000.0);
//! let tick = tick_math::sqrt_price_to_tick(sqrt_price * Q96_F64).unwrap();
//! assert_eq!(tick, 5000);
//! ```
//!
//! ## Walking a tick range
//! ```
//! use clmm_segment_swap::{FillStatus, Ledger, SwapRequest};
//! use rust_decimal::Decimal;
//!
//! let mut ledger = Ledger::new();
//! ledger.add_liquidity(5000, Decimal::from(100));
//! ledger.add_liquidity(6000, Decimal::from(200));
//!
//! let request = SwapRequest::new(Decimal::from(10), 5000, 6000, 10);
//! let result = ledger.compute_output(request).unwrap();
//! assert!(result.amount_out >= Decimal::ZERO);
//! if result.fill_status() == FillStatus::Partial {
//!     println!("unfilled: {}", result.amount_remaining);
//! }
//! ```

pub use alloy_primitives::U256;
pub use rust_decimal::Decimal;

pub mod error;
mod hash;
pub mod math;

pub use hash::FastMap;

pub mod pool;

pub use error::{Error, InputError, LedgerError};
pub use math::segment_math::SegmentModel;
pub use pool::ledger::{Ledger, SharedLedger};
pub use pool::swap::{FillStatus, SwapRequest, SwapResult, compute_output};

pub const RESOLUTION: u8 = 96;
pub const Q96: U256 = U256::from_limbs([0, 4294967296, 0, 0]);
/// `2^96` as a float, the scale of Q64.96 sqrt prices.
pub const Q96_F64: f64 = 79228162514264337593543950336.0;
