//! A single liquidity tick.
//!
//! Each tick owns its reserve vector exclusively; pool-level reserves are
//! the componentwise sum over ticks. The invariant constant `k = Σ x_i²`
//! and the status classification are recomputed from the reserves after
//! every mutation, never carried stale.

use ethers_core::types::U256;
use orbital_math::fixed::abs_diff;
use orbital_math::geometry::{boundary_circle_radius, classify, squared_norm};
use orbital_math::sqrt_fixed;
use orbital_types::{EngineError, Result, TickStatus};

/// One concentrated-liquidity position band, keyed by price parameter.
#[derive(Debug, Clone)]
pub struct Tick {
    /// Price parameter identifying this tick.
    pub p: U256,
    /// Radius derived from `p` through the pool's radius curve.
    pub radius: U256,
    /// Reserve vector, one component per pool token, each in `[0, radius]`.
    pub reserves: Vec<U256>,
    /// Invariant constant `k = Σ x_i²`.
    pub invariant: U256,
    /// Scale-invariant depth measure, `√k`.
    pub liquidity: U256,
    /// Outstanding LP shares against this tick.
    pub total_lp_shares: U256,
    pub status: TickStatus,
}

impl Tick {
    pub fn new(p: U256, radius: U256, token_count: usize) -> Self {
        Self {
            p,
            radius,
            reserves: vec![U256::zero(); token_count],
            invariant: U256::zero(),
            liquidity: U256::zero(),
            total_lp_shares: U256::zero(),
            status: TickStatus::Inactive,
        }
    }

    /// Recompute `k` and the liquidity measure from current reserves.
    /// An unrepresentable squared norm is an `InvalidKValue`.
    pub fn recompute_invariant(&mut self) -> Result<()> {
        let k = squared_norm(&self.reserves)
            .map_err(|e| EngineError::InvalidKValue(format!("tick {}: {e}", self.p)))?;
        self.invariant = k;
        self.liquidity = sqrt_fixed(k)?;
        Ok(())
    }

    /// Re-derive status from the post-mutation reserve vector.
    pub fn refresh_status(&mut self) -> TickStatus {
        self.status = if self.total_lp_shares.is_zero() {
            TickStatus::Inactive
        } else {
            classify(&self.reserves, self.radius)
        };
        self.status
    }

    /// Compare the stored invariant constant against the recomputed one.
    pub fn validate_invariant(&self, tolerance: U256) -> Result<()> {
        let recomputed = squared_norm(&self.reserves)
            .map_err(|e| EngineError::InvalidKValue(format!("tick {}: {e}", self.p)))?;
        let drift = abs_diff(self.invariant, recomputed);
        if drift > tolerance {
            return Err(EngineError::UnsatisfiedInvariant(format!(
                "tick {}: stored k {} vs recomputed {} (drift {drift})",
                self.p, self.invariant, recomputed
            )));
        }
        Ok(())
    }

    /// Radius of the circle this tick trades on while boundary-pinned.
    pub fn boundary_circle(&self) -> Result<U256> {
        boundary_circle_radius(&self.reserves, self.radius, self.invariant)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use orbital_math::scale;

    fn fp(v: u64) -> U256 {
        U256::from(v) * scale()
    }

    fn seeded_tick() -> Tick {
        let mut tick = Tick::new(fp(2000), fp(2000), 2);
        tick.reserves = vec![fp(30), fp(40)];
        tick.total_lp_shares = fp(1);
        tick.recompute_invariant().unwrap();
        tick.refresh_status();
        tick
    }

    #[test]
    fn recompute_tracks_reserves() {
        let tick = seeded_tick();
        assert_eq!(tick.invariant, fp(2500));
        assert_eq!(tick.liquidity, fp(50));
        assert_eq!(tick.status, TickStatus::Interior);
    }

    #[test]
    fn validation_accepts_fresh_invariant_and_catches_drift() {
        let mut tick = seeded_tick();
        assert!(tick.validate_invariant(U256::zero()).is_ok());

        tick.invariant = tick.invariant + fp(1);
        let err = tick.validate_invariant(U256::exp10(12)).unwrap_err();
        assert!(matches!(err, EngineError::UnsatisfiedInvariant(_)));
    }

    #[test]
    fn drained_tick_is_inactive_regardless_of_reserves() {
        let mut tick = seeded_tick();
        tick.total_lp_shares = U256::zero();
        assert_eq!(tick.refresh_status(), TickStatus::Inactive);
    }
}
