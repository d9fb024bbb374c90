//! Consolidated torus-invariant trade solvers.
//!
//! A trade removes `d` from the in-token component and credits the
//! out-token component with whatever keeps the invariant measure intact.
//! Two regimes:
//!
//! - no boundary liquidity: the aggregate moves on the circle
//!   `x_in² + x_out² = const`, solved in closed form;
//! - boundary liquidity present: the aggregate must preserve the torus
//!   measure `(α - c)² + (dev - s)²`, where `α` is the aggregate's
//!   diagonal component, `dev` its perpendicular deviation, and `c`/`s`
//!   the diagonal offset and circle radius of the frozen boundary
//!   reserves. Solved by bounded Newton iteration with a numerical
//!   derivative.
//!
//! Both solvers report `TorusInvariantCallFailed` when the requested
//! trade has no real solution under current reserves.

use ethers_core::types::U256;
use orbital_types::{EngineError, Result};
use tracing::debug;

use crate::fixed::{abs_diff, checked_add, checked_sub, fixed_div, fixed_mul, scale, sqrt_fixed};
use crate::geometry::{diagonal_deviation, diagonal_offset};

/// Inputs for the Newton torus solve.
#[derive(Debug, Clone)]
pub struct TorusSolveInput<'a> {
    /// Aggregate reserves over every active tick.
    pub total_reserves: &'a [U256],
    pub token_in: usize,
    pub token_out: usize,
    /// Post-fee input, already bounded by the segment's crossing capacity.
    pub amount_in: U256,
    /// Diagonal offset of the reserves that hold still during this trade.
    pub frozen_offset: U256,
    /// Summed boundary-circle radii of the reserves that hold still.
    pub frozen_radius: U256,
    /// Fixed-point `√n` for the pool.
    pub root_n: U256,
    /// Convergence tolerance on the measure residual (area units).
    pub tolerance: U256,
    pub max_iterations: usize,
}

/// Closed-form solve on the pair circle `x_in² + x_out² = const`:
/// removing `amount_in` from the in component yields
/// `out = √(x_out² + x_in² - (x_in - amount_in)²) - x_out`.
pub fn solve_sphere_trade(x_in: U256, x_out: U256, amount_in: U256) -> Result<U256> {
    let remaining_in = x_in.checked_sub(amount_in).ok_or_else(|| {
        EngineError::TorusInvariantCallFailed(format!(
            "amount in {amount_in} exceeds available depth {x_in}"
        ))
    })?;
    let gain = checked_sub(fixed_mul(x_in, x_in)?, fixed_mul(remaining_in, remaining_in)?)?;
    let new_out_sq = checked_add(fixed_mul(x_out, x_out)?, gain)?;
    let new_out = sqrt_fixed(new_out_sq)?;
    // floor rounding in the square root can only under-credit
    Ok(new_out.saturating_sub(x_out))
}

/// Input that moves the out component exactly to `bound` on the pair
/// circle, or `None` if the circle never reaches it.
pub fn input_to_reach_output_bound(
    x_in: U256,
    x_out: U256,
    bound: U256,
) -> Result<Option<U256>> {
    let reach_sq = checked_add(fixed_mul(x_in, x_in)?, fixed_mul(x_out, x_out)?)?;
    let bound_sq = fixed_mul(bound, bound)?;
    let rest_sq = match reach_sq.checked_sub(bound_sq) {
        Some(v) => v,
        None => return Ok(None),
    };
    let rest = sqrt_fixed(rest_sq)?;
    Ok(Some(x_in.saturating_sub(rest)))
}

/// The torus measure `(α - c)² + (dev - s)²` of a reserve vector: the
/// quantity a trade must preserve. With no frozen reserves (`c = s = 0`)
/// it reduces to `Σ x_i²`, the sphere invariant itself.
pub fn torus_measure(
    reserves: &[U256],
    frozen_offset: U256,
    frozen_radius: U256,
    root_n: U256,
) -> Result<U256> {
    let alpha = diagonal_offset(reserves, root_n)?;
    let first = abs_diff(alpha, frozen_offset);
    let dev = diagonal_deviation(reserves)?;
    let second = abs_diff(dev, frozen_radius);
    checked_add(fixed_mul(first, first)?, fixed_mul(second, second)?)
}

/// Sign-and-magnitude residual bookkeeping for the Newton loop; the
/// unsigned kernel stays free of wrapping subtraction.
#[derive(Debug, Clone, Copy)]
struct Signed {
    neg: bool,
    mag: U256,
}

fn signed_diff(a: U256, b: U256) -> Signed {
    if a >= b {
        Signed {
            neg: false,
            mag: a - b,
        }
    } else {
        Signed {
            neg: true,
            mag: b - a,
        }
    }
}

fn signed_sub(a: Signed, b: Signed) -> Result<Signed> {
    Ok(match (a.neg, b.neg) {
        (false, false) => signed_diff(a.mag, b.mag),
        (true, true) => signed_diff(b.mag, a.mag),
        (false, true) => Signed {
            neg: false,
            mag: checked_add(a.mag, b.mag)?,
        },
        (true, false) => Signed {
            neg: true,
            mag: checked_add(a.mag, b.mag)?,
        },
    })
}

/// Solve the consolidated torus equation for the out-token component.
///
/// The trade must preserve the torus measure of the aggregate reserve
/// vector: the in component drops by `amount_in`, and the out component
/// rises to the unique `x_j` that restores the pre-trade measure.
/// Returns the credited output `x_j - x_out`.
pub fn solve_torus_trade(input: &TorusSolveInput<'_>) -> Result<U256> {
    let x_in = input.total_reserves[input.token_in];
    let x_out = input.total_reserves[input.token_out];

    let target = torus_measure(
        input.total_reserves,
        input.frozen_offset,
        input.frozen_radius,
        input.root_n,
    )?;

    let mut updated = input.total_reserves.to_vec();
    updated[input.token_in] = x_in.checked_sub(input.amount_in).ok_or_else(|| {
        EngineError::TorusInvariantCallFailed(format!(
            "amount in {} exceeds aggregate depth {x_in}",
            input.amount_in
        ))
    })?;

    // Pair-circle estimate seeds Newton close to the root; a half-input
    // credit is the fallback when the circle itself has no solution.
    let seed_gain = solve_sphere_trade(x_in, x_out, input.amount_in)
        .unwrap_or(input.amount_in / 2);
    let mut x_j = checked_add(x_out, seed_gain)?;

    // The pair circle caps the out component at √(x_in² + x_out²) ≤ x_in + x_out.
    let max_out = checked_add(x_out, checked_add(x_in, input.amount_in)?)?;
    let epsilon = scale();

    let mut residual_at = |x: U256| -> Result<Signed> {
        updated[input.token_out] = x;
        let measure = torus_measure(
            &updated,
            input.frozen_offset,
            input.frozen_radius,
            input.root_n,
        )?;
        Ok(signed_diff(measure, target))
    };

    for iteration in 0..input.max_iterations {
        let f = residual_at(x_j)?;
        if f.mag <= input.tolerance {
            debug!(iteration, x_j = %x_j, "torus solve converged");
            let out = x_j.saturating_sub(x_out);
            return Ok(out);
        }

        let f_shifted = residual_at(checked_add(x_j, epsilon)?)?;
        let slope = signed_sub(f_shifted, f)?;
        let derivative = fixed_div(slope.mag, epsilon)?;
        if derivative.is_zero() {
            return Err(EngineError::Numerical(
                "torus residual derivative vanished".to_string(),
            ));
        }

        let step = fixed_div(f.mag, derivative)?;
        // Newton update x ← x - f / f', honoring the residual signs.
        x_j = if f.neg == slope.neg {
            x_j.saturating_sub(step).max(x_out)
        } else {
            checked_add(x_j, step)?.min(max_out)
        };
    }

    Err(EngineError::TorusInvariantCallFailed(format!(
        "measure residual did not converge within {} iterations",
        input.max_iterations
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::sqrt_n_fixed;

    fn fp(v: u64) -> U256 {
        U256::from(v) * scale()
    }

    #[test]
    fn sphere_trade_balanced_reserves() {
        // (1000, 1000), trade 100: out = √(10⁶ + (10⁶ - 900²)) - 1000 ≈ 90.8712
        let out = solve_sphere_trade(fp(1000), fp(1000), fp(100)).unwrap();
        assert!(out > U256::from(90_870_000_000_000_000_000u128));
        assert!(out < U256::from(90_880_000_000_000_000_000u128));
    }

    #[test]
    fn sphere_trade_output_below_input_when_balanced() {
        let out = solve_sphere_trade(fp(1000), fp(1000), fp(100)).unwrap();
        assert!(out < fp(100));
    }

    #[test]
    fn sphere_trade_is_monotone_in_input() {
        let small = solve_sphere_trade(fp(1000), fp(1000), fp(50)).unwrap();
        let large = solve_sphere_trade(fp(1000), fp(1000), fp(100)).unwrap();
        assert!(large > small);
    }

    #[test]
    fn sphere_trade_rejects_overdrain() {
        let err = solve_sphere_trade(fp(100), fp(1000), fp(101)).unwrap_err();
        assert!(matches!(err, EngineError::TorusInvariantCallFailed(_)));
    }

    #[test]
    fn crossing_input_lands_exactly_on_bound() {
        let x_in = fp(1000);
        let x_out = fp(1000);
        let bound = fp(1090);
        let d = input_to_reach_output_bound(x_in, x_out, bound)
            .unwrap()
            .expect("bound reachable");
        let out = solve_sphere_trade(x_in, x_out, d).unwrap();
        let landed = x_out + out;
        assert!(abs_diff(landed, bound) < fp(1) / 1000, "landed at {landed}");
    }

    #[test]
    fn crossing_none_when_circle_cannot_reach() {
        // max of x_out on the circle is √(2)·1000 ≈ 1414 < 1500
        let d = input_to_reach_output_bound(fp(1000), fp(1000), fp(1500)).unwrap();
        assert!(d.is_none());
    }

    #[test]
    fn torus_degenerates_to_sphere_without_frozen_reserves() {
        let reserves = vec![fp(1000), fp(1000)];
        let input = TorusSolveInput {
            total_reserves: &reserves,
            token_in: 0,
            token_out: 1,
            amount_in: fp(100),
            frozen_offset: U256::zero(),
            frozen_radius: U256::zero(),
            root_n: sqrt_n_fixed(2).unwrap(),
            tolerance: scale(),
            max_iterations: 64,
        };
        let torus_out = solve_torus_trade(&input).unwrap();
        let sphere_out = solve_sphere_trade(fp(1000), fp(1000), fp(100)).unwrap();
        // both preserve Σx², so they agree to solver tolerance
        assert!(abs_diff(torus_out, sphere_out) < fp(1) / 100, "torus {torus_out} sphere {sphere_out}");
    }

    #[test]
    fn torus_with_frozen_reserves_preserves_the_measure() {
        // participants aggregate (1000, 1000, 500) plus a frozen boundary
        // tick (0, 200, 300) pinned at component 0
        let total = vec![fp(1000), fp(1200), fp(800)];
        let root_n = sqrt_n_fixed(3).unwrap();
        let frozen = [U256::zero(), fp(200), fp(300)];
        let frozen_offset = diagonal_offset(&frozen, root_n).unwrap();
        let frozen_radius = sqrt_fixed(
            checked_add(fixed_mul(fp(200), fp(200)).unwrap(), fixed_mul(fp(300), fp(300)).unwrap())
                .unwrap(),
        )
        .unwrap();

        let before = torus_measure(&total, frozen_offset, frozen_radius, root_n).unwrap();

        let input = TorusSolveInput {
            total_reserves: &total,
            token_in: 0,
            token_out: 1,
            amount_in: fp(100),
            frozen_offset,
            frozen_radius,
            root_n,
            tolerance: scale(),
            max_iterations: 64,
        };
        let out = solve_torus_trade(&input).unwrap();
        assert!(out > U256::zero() && out < fp(300), "out {out}");

        let mut after = total.clone();
        after[0] = after[0] - fp(100);
        after[1] = after[1] + out;
        let measure = torus_measure(&after, frozen_offset, frozen_radius, root_n).unwrap();
        assert!(abs_diff(measure, before) <= fp(2), "measure drift");
    }
}
