use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum InputError {
    #[error("Input error - tick spacing must be positive, got {0}")]
    NonPositiveTickSpacing(i32),
    #[error("Input error - amount in is negative")]
    NegativeAmountIn,
    #[error("Input error - amount is not a finite number")]
    NonFiniteAmount,
    #[error("Input error - sqrt price is not a finite number")]
    NonFiniteSqrtPrice,
    #[error("Input error - sqrt price must be positive")]
    NonPositiveSqrtPrice,
    #[error("Input error - sqrtPriceX96 out of bounds")]
    SqrtPriceOutOfBounds,
    #[error("Input error - tick out of range")]
    TickOutOfRange,
    #[error("Input error - degenerate price segment starting at tick {0}")]
    DegenerateSegment(i32),
    #[error("Input error - value not representable as a decimal amount")]
    Unrepresentable,
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum LedgerError {
    #[error("Ledger error - no liquidity recorded at tick {0}")]
    UnknownTick(i32),
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum Error {
    #[error(transparent)]
    InvalidInput(#[from] crate::error::InputError),

    #[error(transparent)]
    Ledger(#[from] crate::error::LedgerError),
}
