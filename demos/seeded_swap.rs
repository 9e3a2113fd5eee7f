//! Seeds a ledger with two ticks and walks a swap across them under both
//! segment models.
//!
//! Run with: RUST_LOG=clmm_segment_swap=debug cargo run --example seeded_swap

use clmm_segment_swap::{Decimal, Error, FillStatus, Ledger, SegmentModel, SwapRequest};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let mut ledger = Ledger::new();
    ledger.add_liquidity(5000, Decimal::from(100));
    ledger.add_liquidity(6000, Decimal::from(200));

    for model in [SegmentModel::Reference, SegmentModel::ConstantLiquidity] {
        let request = SwapRequest::new(Decimal::TEN, 5000, 6000, 10).with_model(model);
        let result = ledger.compute_output(request)?;

        println!("{model:?}");
        println!("  amount out:       {}", result.amount_out);
        println!("  segments visited: {}", result.segments_visited);
        if result.fill_status() == FillStatus::Partial {
            println!("  not fully filled, remaining: {}", result.amount_remaining);
        }
    }

    Ok(())
}
