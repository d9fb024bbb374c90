//! Engine configuration.
//!
//! All tunables live here with production defaults; hosts construct one
//! `EngineConfig`, validate it, and hand it to the pool at construction.
//! Nothing is read from ambient state at runtime.

use ethers_core::types::U256;
use orbital_types::{EngineError, Result};
use serde::{Deserialize, Serialize};

/// Validated parameters for a pool engine instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Protocol fee in basis points, retained from every swap input
    /// (30 = 0.30%). Applied up front; the fee never enters the curve.
    pub fee_bps: u32,
    /// Absolute tolerance when comparing a stored invariant constant
    /// against the recomputed `Σ x_i²` (raw fixed-point units).
    pub invariant_tolerance: U256,
    /// Convergence tolerance for the torus measure residual, in area
    /// units at 18-decimal scale.
    pub torus_tolerance: U256,
    /// Iteration cap shared by the Newton solvers.
    pub max_solver_iterations: usize,
    /// Hard cap on boundary-crossing segments per swap, as a multiple of
    /// the active tick count.
    pub max_segments_per_tick: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            fee_bps: 30,
            invariant_tolerance: U256::exp10(12),
            torus_tolerance: U256::exp10(18),
            max_solver_iterations: 64,
            max_segments_per_tick: 4,
        }
    }
}

impl EngineConfig {
    /// Reject configurations that cannot produce a working engine.
    pub fn validate(&self) -> Result<()> {
        if self.fee_bps >= 10_000 {
            return Err(EngineError::InvalidAmounts);
        }
        if self.max_solver_iterations == 0 || self.max_solver_iterations > 256 {
            return Err(EngineError::Numerical(format!(
                "solver iteration cap {} outside 1..=256",
                self.max_solver_iterations
            )));
        }
        if self.max_segments_per_tick == 0 {
            return Err(EngineError::Numerical(
                "segment cap must be positive".to_string(),
            ));
        }
        Ok(())
    }
}
