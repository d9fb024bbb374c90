//! Tick geometry on the reserve sphere.
//!
//! A tick with radius `r` holds its reserve vector inside the box
//! `[0, r]^N` on the sphere `Σ x_i² = k`. The projection of the vector
//! onto the all-ones diagonal decides how far the tick sits from a
//! balanced state; components pinned at `0` or `r` put the tick on the
//! rim of its spherical cap.

use ethers_core::types::U256;
use orbital_types::{EngineError, Result, TickStatus};

use crate::fixed::{checked_add, checked_sub, fixed_div, fixed_mul, scale, sqrt_fixed};

/// Relation between a tick's price parameter `p` and its radius `r`.
///
/// The exact closed form is a deployment decision; implementations must be
/// strictly monotone increasing in `p` so tick ordering by price parameter
/// matches ordering by radius.
pub trait RadiusCurve: Send + Sync + std::fmt::Debug {
    fn radius(&self, p: U256) -> Result<U256>;
}

/// Default curve: `r = p * units_per_p`, both fixed point.
#[derive(Debug, Clone)]
pub struct LinearRadiusCurve {
    pub units_per_p: U256,
}

impl Default for LinearRadiusCurve {
    fn default() -> Self {
        Self {
            units_per_p: scale(),
        }
    }
}

impl RadiusCurve for LinearRadiusCurve {
    fn radius(&self, p: U256) -> Result<U256> {
        fixed_mul(p, self.units_per_p)
    }
}

/// Fixed-point `√n` for an n-token pool.
pub fn sqrt_n_fixed(n: usize) -> Result<U256> {
    sqrt_fixed(U256::from(n) * scale())
}

/// Radius such that an equal per-token deposit `amount` lands exactly on
/// the sphere: `r = amount / (1 - 1/√n)`.
pub fn radius_for_balanced_deposit(amount: U256, root_n: U256) -> Result<U256> {
    let one = scale();
    let denominator = checked_sub(one, fixed_div(one, root_n)?)?;
    fixed_div(amount, denominator)
}

/// The invariant constant `k = Σ x_i²`, fixed point.
pub fn squared_norm(reserves: &[U256]) -> Result<U256> {
    let mut acc = U256::zero();
    for &x in reserves {
        acc = checked_add(acc, fixed_mul(x, x)?)?;
    }
    Ok(acc)
}

/// Classify a liquidity-bearing reserve vector against its radius.
///
/// Interior means every component is strictly inside `(0, r)`; any
/// component pinned at `0` or `r` puts the tick on the boundary.
/// Callers handle the share-supply check that maps to `Inactive`.
pub fn classify(reserves: &[U256], radius: U256) -> TickStatus {
    let pinned = reserves
        .iter()
        .any(|&x| x.is_zero() || x == radius);
    if pinned {
        TickStatus::Boundary
    } else {
        TickStatus::Interior
    }
}

/// Require `0 <= x_i <= r` for every component.
pub fn check_bounds(reserves: &[U256], radius: U256) -> Result<()> {
    for (i, &x) in reserves.iter().enumerate() {
        if x > radius {
            return Err(EngineError::InvalidReserves(format!(
                "component {i} ({x}) exceeds tick radius {radius}"
            )));
        }
    }
    Ok(())
}

/// Radius of the circle a boundary tick is confined to: the sphere cut by
/// its pinned hyperplanes, `s = √(k - Σ pinned_i²)`. Components pinned at
/// zero contribute nothing; components pinned at `r` contribute `r²`.
pub fn boundary_circle_radius(reserves: &[U256], radius: U256, k: U256) -> Result<U256> {
    let mut pinned_sq = U256::zero();
    for &x in reserves {
        if x == radius {
            pinned_sq = checked_add(pinned_sq, fixed_mul(x, x)?)?;
        }
    }
    let free = checked_sub(k, pinned_sq).map_err(|_| {
        EngineError::InvalidKValue(format!(
            "pinned components exceed invariant constant {k}"
        ))
    })?;
    sqrt_fixed(free)
}

/// Perpendicular distance of a reserve vector from the all-ones diagonal:
/// `√(Σ x_i² - (Σ x_i)² / n)`.
pub fn diagonal_deviation(reserves: &[U256]) -> Result<U256> {
    let n = U256::from(reserves.len()) * scale();
    let mut sum = U256::zero();
    for &x in reserves {
        sum = checked_add(sum, x)?;
    }
    let norm_sq = squared_norm(reserves)?;
    let diag_sq = fixed_div(fixed_mul(sum, sum)?, n)?;
    // Cauchy-Schwarz keeps norm_sq >= diag_sq; floor rounding can push the
    // difference a hair negative, which clamps to zero.
    let perp_sq = norm_sq.checked_sub(diag_sq).unwrap_or_else(U256::zero);
    sqrt_fixed(perp_sq)
}

/// Diagonal component of a reserve vector: `(Σ x_i) / √n`.
pub fn diagonal_offset(reserves: &[U256], root_n: U256) -> Result<U256> {
    let mut sum = U256::zero();
    for &x in reserves {
        sum = checked_add(sum, x)?;
    }
    fixed_div(sum, root_n)
}
