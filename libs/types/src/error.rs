//! Engine error taxonomy.
//!
//! Every variant is an immediately-reported, non-retryable validation or
//! numerical failure. An error aborts the triggering operation with no
//! state mutation; retry policy, if any, belongs to the caller.

use ethers_core::types::U256;

/// All the ways an engine operation can fail.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    // ---- input validation ----
    /// Deposit or trade amounts malformed (all zero, or zero where a
    /// positive value is required).
    #[error("amounts must contain at least one positive entry")]
    InvalidAmounts,

    /// A vector or index does not match the pool's token count.
    #[error("length mismatch: expected {expected}, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    /// Swap requested with identical source and destination tokens.
    #[error("token in equals token out (index {0})")]
    SameToken(usize),

    // ---- state / reserve validation ----
    /// A mutation would push a reserve component outside `[0, r]`.
    #[error("reserves out of range: {0}")]
    InvalidReserves(String),

    /// Requested more than the pool or position can cover.
    #[error("insufficient liquidity: requested {requested}, available {available}")]
    InsufficientLiquidity { requested: U256, available: U256 },

    /// An operation needs at least one Interior tick to absorb marginal
    /// flow and none exists.
    #[error("no tick currently has interior status")]
    NoInteriorLiquidity,

    // ---- invariant validation ----
    /// The invariant constant `k` cannot be represented exactly, or a
    /// stored constant disagrees with the reserves it describes.
    #[error("invalid invariant constant: {0}")]
    InvalidKValue(String),

    /// A touched tick failed post-mutation invariant revalidation.
    #[error("tick invariant unsatisfied: {0}")]
    UnsatisfiedInvariant(String),

    /// The consolidated torus equation has no real solution for the
    /// requested trade under current reserves.
    #[error("torus invariant unsolvable: {0}")]
    TorusInvariantCallFailed(String),

    // ---- numerical failure ----
    /// Overflow, division by zero, or a non-convergent square root.
    #[error("numerical failure: {0}")]
    Numerical(String),

    // ---- economic guard ----
    /// Resolved output fell below the caller's minimum.
    #[error("slippage exceeded: amount out {amount_out} below minimum {min_amount_out}")]
    SlippageExceeded {
        amount_out: U256,
        min_amount_out: U256,
    },
}

/// Engine-wide result alias.
pub type Result<T> = std::result::Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn errors_render_their_context() {
        let err = EngineError::InvalidLength {
            expected: 5,
            actual: 3,
        };
        assert_eq!(err.to_string(), "length mismatch: expected 5, got 3");

        let err = EngineError::SlippageExceeded {
            amount_out: U256::from(99u64),
            min_amount_out: U256::from(100u64),
        };
        assert!(err.to_string().contains("below minimum"));
    }
}
