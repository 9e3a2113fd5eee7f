use crate::Q96_F64;
use crate::error::InputError;
use crate::math::math_helpers::{div, mul, scale_liquidity, to_decimal, to_f64};
use rust_decimal::Decimal;

/// Per-segment output formula used by the swap walk.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SegmentModel {
    /// Reserve-ratio proxy: output grows with `x_end / x_start` and is
    /// capped by the depth bound `min(x_end, x_start) * L / sqrt(x_end - x_start)`,
    /// with `x = sqrt_price^2 / 2^96`. Not the protocol invariant.
    #[default]
    Reference,
    /// Standard concentrated-liquidity invariant
    /// (`Δy = L·(√Pb − √Pa)`, `Δx = L·(1/√Pa − 1/√Pb)`), token1 in and
    /// token0 out while the price moves up through the segment.
    ConstantLiquidity,
}

/// Amounts moved by a single segment step.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct SegmentStep {
    /// input consumed, never more than the amount offered
    pub amount_in: Decimal,
    pub amount_out: Decimal,
    /// whether the segment's capacity bounded the step
    pub capped: bool,
}

/// Computes how much of `amount_remaining` a segment `[sqrt_start, sqrt_end)`
/// with `liquidity` converts, and the output it yields.
///
/// Returns `InputError::DegenerateSegment` (tagged with `tick`) when the
/// sqrt prices are non-finite or the segment has no width.
pub fn compute_segment_step(
    model: SegmentModel,
    tick: i32,
    sqrt_start: f64,
    sqrt_end: f64,
    liquidity: Decimal,
    amount_remaining: Decimal,
) -> Result<SegmentStep, InputError> {
    if !sqrt_start.is_finite() || !sqrt_end.is_finite() || sqrt_start <= 0.0 || sqrt_end <= sqrt_start
    {
        return Err(InputError::DegenerateSegment(tick));
    }
    if liquidity <= Decimal::ZERO || amount_remaining <= Decimal::ZERO {
        return Ok(SegmentStep::default());
    }

    match model {
        SegmentModel::Reference => {
            reference_step(tick, sqrt_start, sqrt_end, liquidity, amount_remaining)
        }
        SegmentModel::ConstantLiquidity => {
            constant_liquidity_step(sqrt_start, sqrt_end, liquidity, amount_remaining)
        }
    }
}

fn reference_step(
    tick: i32,
    sqrt_start: f64,
    sqrt_end: f64,
    liquidity: Decimal,
    amount_remaining: Decimal,
) -> Result<SegmentStep, InputError> {
    let x_start = sqrt_start * sqrt_start / Q96_F64;
    let x_end = sqrt_end * sqrt_end / Q96_F64;

    let width = (x_end - x_start).sqrt();
    if width.is_nan() || width <= 0.0 {
        return Err(InputError::DegenerateSegment(tick));
    }

    let depth_end = scale_liquidity(liquidity, x_end / width)?;
    let depth_start = scale_liquidity(liquidity, x_start / width)?;
    let depth = depth_end.min(depth_start);

    // x_end / x_start, taken from the sqrt ratio to avoid the 2^-96 scale
    let ratio = to_decimal((sqrt_end / sqrt_start).powi(2))?;
    if ratio <= Decimal::ZERO {
        return Err(InputError::DegenerateSegment(tick));
    }

    let candidate = mul(amount_remaining, ratio)?;
    if candidate > depth {
        Ok(SegmentStep {
            amount_in: div(depth, ratio)?.min(amount_remaining),
            amount_out: depth,
            capped: true,
        })
    } else {
        Ok(SegmentStep {
            amount_in: amount_remaining,
            amount_out: candidate,
            capped: false,
        })
    }
}

fn constant_liquidity_step(
    sqrt_start: f64,
    sqrt_end: f64,
    liquidity: Decimal,
    amount_remaining: Decimal,
) -> Result<SegmentStep, InputError> {
    let capacity = scale_liquidity(liquidity, sqrt_end - sqrt_start)?;

    if amount_remaining >= capacity {
        // 1/√Pa − 1/√Pb without the cancellation of two reciprocals
        let out_per_liquidity = (sqrt_end - sqrt_start) / (sqrt_start * sqrt_end);
        return Ok(SegmentStep {
            amount_in: capacity,
            amount_out: scale_liquidity(liquidity, out_per_liquidity)?,
            capped: true,
        });
    }

    // L·(√Pn − √Pa) is the remaining input itself
    let remaining = to_f64(amount_remaining)?;
    let sqrt_next = (sqrt_start + remaining / to_f64(liquidity)?).min(sqrt_end);
    let amount_out = to_decimal(remaining / (sqrt_start * sqrt_next))?;

    Ok(SegmentStep {
        amount_in: amount_remaining,
        amount_out,
        capped: false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::tick_math::{MAX_TICK, MIN_TICK, tick_to_sqrt_price};
    use rust_decimal_macros::dec;

    fn segment(tick: i32, spacing: i32) -> (f64, f64) {
        (
            tick_to_sqrt_price(tick as f64),
            tick_to_sqrt_price((tick + spacing) as f64),
        )
    }

    fn assert_relative(got: Decimal, expected: f64, tolerance: f64) {
        let got = to_f64(got).unwrap();
        let err = ((got - expected) / expected).abs();
        assert!(
            err < tolerance,
            "expected {expected}, got {got} (relative error {err})"
        );
    }

    // depth bound evaluated in plain f64, straight from the formula
    fn f64_depth(tick: i32, spacing: i32, liquidity: f64) -> f64 {
        let (s, e) = segment(tick, spacing);
        let xs = s * s / Q96_F64;
        let xe = e * e / Q96_F64;
        (xe * liquidity).min(xs * liquidity) / (xe - xs).sqrt()
    }

    fn assert_close(got: Decimal, expected: Decimal, tolerance: Decimal) {
        assert!(
            (got - expected).abs() <= tolerance,
            "expected {expected} ± {tolerance}, got {got}"
        );
    }

    #[test]
    fn degenerate_segment_is_rejected() {
        let (s, _) = segment(5000, 10);
        let res = compute_segment_step(SegmentModel::Reference, 5000, s, s, dec!(100), dec!(10));
        assert!(matches!(res, Err(InputError::DegenerateSegment(5000))));

        let res = compute_segment_step(
            SegmentModel::ConstantLiquidity,
            7,
            s,
            f64::INFINITY,
            dec!(100),
            dec!(10),
        );
        assert!(matches!(res, Err(InputError::DegenerateSegment(7))));
    }

    #[test]
    fn zero_liquidity_moves_nothing() {
        let (s, e) = segment(5000, 10);
        let step =
            compute_segment_step(SegmentModel::Reference, 5000, s, e, Decimal::ZERO, dec!(10))
                .unwrap();
        assert_eq!(step, SegmentStep::default());
    }

    #[test]
    fn reference_step_is_capped_by_depth_bound() {
        // depth = 100 * x_start / sqrt(x_end - x_start) ≈ 1.44221723e-11
        let (s, e) = segment(5000, 10);
        let step =
            compute_segment_step(SegmentModel::Reference, 5000, s, e, dec!(100), dec!(10)).unwrap();

        assert!(step.capped);
        assert_close(
            step.amount_out,
            dec!(0.0000000000144221723078),
            dec!(0.000000000000000001),
        );
        assert!(step.amount_in < step.amount_out);
        assert!(step.amount_in > Decimal::ZERO);
    }

    #[test]
    fn reference_step_uncapped_consumes_everything() {
        // deep enough that the whole input fits: out = in * 1.0001^10
        let (s, e) = segment(5000, 10);
        let step = compute_segment_step(
            SegmentModel::Reference,
            5000,
            s,
            e,
            dec!(1000000000000000),
            dec!(10),
        )
        .unwrap();

        assert!(!step.capped);
        assert_eq!(step.amount_in, dec!(10));
        assert_close(step.amount_out, dec!(10.010004501200), dec!(0.000000001));
    }

    #[test]
    fn constant_liquidity_full_segment() {
        // capacity = 100 * (√P(5010) − √P(5000)) ≈ 0.0642133
        let (s, e) = segment(5000, 10);
        let step = compute_segment_step(
            SegmentModel::ConstantLiquidity,
            5000,
            s,
            e,
            dec!(100),
            dec!(10),
        )
        .unwrap();

        assert!(step.capped);
        assert_close(step.amount_in, dec!(0.0642133097545905), dec!(0.000000001));
        assert_close(step.amount_out, dec!(0.0389288464421211), dec!(0.000000001));
    }

    #[test]
    fn constant_liquidity_partial_segment_stays_inside() {
        let (s, e) = segment(5000, 10);
        let step = compute_segment_step(
            SegmentModel::ConstantLiquidity,
            5000,
            s,
            e,
            dec!(100),
            dec!(0.01),
        )
        .unwrap();

        assert!(!step.capped);
        assert_eq!(step.amount_in, dec!(0.01));
        // less output than the whole segment would give
        assert!(step.amount_out > Decimal::ZERO);
        assert!(step.amount_out < dec!(0.0389288464421211));
        // average price inside the segment: out/in ≈ 1/P(5000)
        let price = to_decimal(1.0 / (s * s)).unwrap();
        assert_close(step.amount_out, dec!(0.01) * price, dec!(0.00001));
    }

    #[test]
    fn reference_depth_matches_f64_formula_at_deep_ticks() {
        let cases = [
            (-400000, dec!(100000000000000000000)),
            (-500000, dec!(1000000000000000000000000)),
            (-600000, dec!(100000000000000000000000000)),
            (-620000, dec!(1000000000000000000000000000)),
            (-700000, dec!(10000000000000000000000000000)),
            (MIN_TICK, dec!(10000000000000000000000000000)),
        ];
        for (tick, liquidity) in cases {
            let (s, e) = segment(tick, 10);
            let step = compute_segment_step(
                SegmentModel::Reference,
                tick,
                s,
                e,
                liquidity,
                dec!(1000000000),
            )
            .unwrap();

            assert!(step.capped, "segment at {tick} should be capped");
            assert!(step.amount_out > Decimal::ZERO, "no output at {tick}");
            let expected = f64_depth(tick, 10, to_f64(liquidity).unwrap());
            assert_relative(step.amount_out, expected, 1e-9);
        }
    }

    #[test]
    fn reference_depth_matches_f64_formula_at_high_ticks() {
        for tick in [500000, 800000, MAX_TICK - 10] {
            let (s, e) = segment(tick, 10);
            let step = compute_segment_step(
                SegmentModel::Reference,
                tick,
                s,
                e,
                dec!(1000),
                dec!(1000000000000000000),
            )
            .unwrap();

            assert!(step.capped);
            assert_relative(step.amount_out, f64_depth(tick, 10, 1000.0), 1e-9);
        }
    }

    #[test]
    fn constant_liquidity_matches_f64_formula_near_tick_bounds() {
        // (tick, liquidity): outputs stay inside the decimal range
        let cases = [
            (MIN_TICK, 1000000.0),
            (-700000, 1000000.0),
            (-500000, 1000000000.0),
            (500000, 1000000000.0),
            (MAX_TICK - 10, 10000000000.0),
        ];
        for (tick, liquidity) in cases {
            let (s, e) = segment(tick, 10);
            let liquidity_dec = to_decimal(liquidity).unwrap();

            // whole segment
            let step = compute_segment_step(
                SegmentModel::ConstantLiquidity,
                tick,
                s,
                e,
                liquidity_dec,
                Decimal::MAX,
            )
            .unwrap();
            assert!(step.capped);
            assert_relative(step.amount_in, liquidity * (e - s), 1e-9);
            assert_relative(step.amount_out, liquidity * (1.0 / s - 1.0 / e), 1e-9);

            // half the capacity
            let half = liquidity * (e - s) / 2.0;
            let step = compute_segment_step(
                SegmentModel::ConstantLiquidity,
                tick,
                s,
                e,
                liquidity_dec,
                to_decimal(half).unwrap(),
            )
            .unwrap();
            assert!(!step.capped);
            let sqrt_next = s + half / liquidity;
            assert_relative(step.amount_out, liquidity * (1.0 / s - 1.0 / sqrt_next), 1e-9);
        }
    }
}
