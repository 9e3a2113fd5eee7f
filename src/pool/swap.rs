use crate::error::{Error, InputError};
use crate::math::math_helpers::to_decimal;
use crate::math::segment_math::{SegmentModel, compute_segment_step};
use crate::math::tick_math::tick_to_sqrt_price;
use crate::pool::ledger::Ledger;
use rust_decimal::Decimal;
use tracing::{debug, instrument, trace};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SwapRequest {
    /// Input amount to convert. Must not be negative.
    pub amount_in: Decimal,
    /// First segment walked, `[start_tick, start_tick + tick_spacing)`.
    pub start_tick: i32,
    /// Last tick (inclusive) at which a segment may start.
    pub end_tick: i32,
    /// Distance between consecutive segment boundaries. Must be positive.
    pub tick_spacing: i32,
    /// Per-segment output formula.
    pub model: SegmentModel,
}

impl SwapRequest {
    /// Creates a request using the reference segment model.
    #[inline]
    pub fn new(amount_in: Decimal, start_tick: i32, end_tick: i32, tick_spacing: i32) -> Self {
        Self {
            amount_in,
            start_tick,
            end_tick,
            tick_spacing,
            model: SegmentModel::Reference,
        }
    }

    /// Creates a request from a floating-point amount, rejecting NaN and
    /// infinities with `InputError::NonFiniteAmount`.
    pub fn try_from_f64(
        amount_in: f64,
        start_tick: i32,
        end_tick: i32,
        tick_spacing: i32,
    ) -> Result<Self, Error> {
        if !amount_in.is_finite() {
            return Err(InputError::NonFiniteAmount.into());
        }
        Ok(Self::new(
            to_decimal(amount_in)?,
            start_tick,
            end_tick,
            tick_spacing,
        ))
    }

    #[inline]
    pub fn with_model(mut self, model: SegmentModel) -> Self {
        self.model = model;
        self
    }

    fn validate(&self) -> Result<(), InputError> {
        if self.tick_spacing <= 0 {
            return Err(InputError::NonPositiveTickSpacing(self.tick_spacing));
        }
        if self.amount_in < Decimal::ZERO {
            return Err(InputError::NegativeAmountIn);
        }
        Ok(())
    }
}

/// Whether a swap converted all of its input.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FillStatus {
    Filled,
    Partial,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SwapResult {
    /// Output accumulated over every segment walked.
    pub amount_out: Decimal,
    /// Input left unconverted; zero means fully filled.
    pub amount_remaining: Decimal,
    /// Segments visited by the walk, including empty ones.
    pub segments_visited: u64,
}

impl SwapResult {
    fn empty(amount_in: Decimal) -> Self {
        Self {
            amount_out: Decimal::ZERO,
            amount_remaining: amount_in,
            segments_visited: 0,
        }
    }

    pub fn fill_status(&self) -> FillStatus {
        if self.amount_remaining > Decimal::ZERO {
            FillStatus::Partial
        } else {
            FillStatus::Filled
        }
    }

    #[inline]
    pub fn is_partial_fill(&self) -> bool {
        self.fill_status() == FillStatus::Partial
    }

    /// Input actually converted, given the amount the swap started with.
    pub fn amount_consumed(&self, amount_in: Decimal) -> Decimal {
        amount_in - self.amount_remaining
    }
}

// the state carried from one segment to the next
struct SwapState {
    // the tick the current segment starts at
    tick: i32,
    // input not yet converted
    amount_remaining: Decimal,
    // output accumulated so far
    amount_out: Decimal,
    segments_visited: u64,
}

impl Ledger {
    /// Walks the segments `[tick, tick + tick_spacing)` for every tick from
    /// `start_tick` up to and including `end_tick`, converting input into
    /// output with the liquidity recorded at each segment's starting tick
    /// until the input runs out or the range ends.
    ///
    /// The ledger is only read; liquidity used by the swap is not written
    /// back. A reversed range (`start_tick > end_tick`) is an empty walk
    /// that returns the whole input as remaining. Input left when the walk
    /// ends is reported in [`SwapResult::amount_remaining`].
    #[instrument(level = "debug", skip(self))]
    pub fn compute_output(&self, request: SwapRequest) -> Result<SwapResult, Error> {
        request.validate()?;

        if request.start_tick > request.end_tick {
            return Ok(SwapResult::empty(request.amount_in));
        }

        let spacing = request.tick_spacing;
        let mut state = SwapState {
            tick: request.start_tick,
            amount_remaining: request.amount_in,
            amount_out: Decimal::ZERO,
            segments_visited: 0,
        };

        while state.tick <= request.end_tick && state.amount_remaining > Decimal::ZERO {
            state.segments_visited += 1;
            let liquidity = self.liquidity_at(state.tick);

            if liquidity > Decimal::ZERO {
                let sqrt_start = tick_to_sqrt_price(state.tick as f64);
                let sqrt_end = tick_to_sqrt_price(state.tick as f64 + spacing as f64);

                let step = compute_segment_step(
                    request.model,
                    state.tick,
                    sqrt_start,
                    sqrt_end,
                    liquidity,
                    state.amount_remaining,
                )?;

                state.amount_out = state
                    .amount_out
                    .checked_add(step.amount_out)
                    .ok_or(InputError::Unrepresentable)?;
                state.amount_remaining = (state.amount_remaining - step.amount_in).max(Decimal::ZERO);

                trace!(
                    tick = state.tick,
                    %liquidity,
                    amount_in = %step.amount_in,
                    amount_out = %step.amount_out,
                    capped = step.capped,
                    "segment step"
                );
            }

            state.tick = match state.tick.checked_add(spacing) {
                Some(next) => next,
                None => break,
            };
        }

        let result = SwapResult {
            amount_out: state.amount_out,
            amount_remaining: state.amount_remaining,
            segments_visited: state.segments_visited,
        };

        if result.is_partial_fill() {
            debug!(
                amount_remaining = %result.amount_remaining,
                amount_out = %result.amount_out,
                "order not fully filled"
            );
        }

        Ok(result)
    }
}

/// Convenience wrapper over [`Ledger::compute_output`] using the reference
/// segment model.
pub fn compute_output(
    ledger: &Ledger,
    amount_in: Decimal,
    start_tick: i32,
    end_tick: i32,
    tick_spacing: i32,
) -> Result<SwapResult, Error> {
    ledger.compute_output(SwapRequest::new(
        amount_in,
        start_tick,
        end_tick,
        tick_spacing,
    ))
}
