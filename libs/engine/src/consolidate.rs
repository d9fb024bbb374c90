//! Invariant consolidation.
//!
//! The consolidator is the single source of truth for whether the pool's
//! invariant is satisfied. It collapses all Interior ticks into one
//! virtual n-sphere and all Boundary ticks into one virtual
//! lower-dimensional sphere on the boundary hyperplane; the swap engine
//! additionally asks for a trade-direction-aware partition, splitting
//! ticks into those that can absorb flow for a given (in, out) pair and
//! those that hold still.

use std::collections::BTreeMap;

use ethers_core::types::U256;
use orbital_math::fixed::checked_add;
use orbital_math::geometry::diagonal_offset;
use orbital_types::{Result, TickStatus};
use serde::Serialize;

use crate::tick::Tick;

/// Pool-wide consolidated view over the Interior/Boundary split.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Consolidation {
    /// Σ k over Interior ticks: the virtual n-sphere constant.
    pub k_interior: U256,
    /// Σ radius over Interior ticks.
    pub r_interior: U256,
    /// Σ k over Boundary ticks.
    pub k_boundary: U256,
    /// Σ boundary-circle radii over Boundary ticks.
    pub s_boundary: U256,
    /// Componentwise reserve sum over Interior ticks.
    pub interior_reserves: Vec<U256>,
    /// Componentwise reserve sum over Boundary ticks.
    pub boundary_reserves: Vec<U256>,
    /// Componentwise reserve sum over every active tick.
    pub total_reserves: Vec<U256>,
    pub interior_ticks: usize,
    pub boundary_ticks: usize,
}

/// Build the Interior/Boundary consolidated snapshot.
pub fn consolidate(ticks: &BTreeMap<U256, Tick>, token_count: usize) -> Result<Consolidation> {
    let mut out = Consolidation {
        k_interior: U256::zero(),
        r_interior: U256::zero(),
        k_boundary: U256::zero(),
        s_boundary: U256::zero(),
        interior_reserves: vec![U256::zero(); token_count],
        boundary_reserves: vec![U256::zero(); token_count],
        total_reserves: vec![U256::zero(); token_count],
        interior_ticks: 0,
        boundary_ticks: 0,
    };

    for tick in ticks.values() {
        let side = match tick.status {
            TickStatus::Inactive => continue,
            TickStatus::Interior => {
                out.k_interior = checked_add(out.k_interior, tick.invariant)?;
                out.r_interior = checked_add(out.r_interior, tick.radius)?;
                out.interior_ticks += 1;
                &mut out.interior_reserves
            }
            TickStatus::Boundary => {
                out.k_boundary = checked_add(out.k_boundary, tick.invariant)?;
                out.s_boundary = checked_add(out.s_boundary, tick.boundary_circle()?)?;
                out.boundary_ticks += 1;
                &mut out.boundary_reserves
            }
        };
        for ((acc, total), &x) in side.iter_mut().zip(&mut out.total_reserves).zip(&tick.reserves) {
            *acc = checked_add(*acc, x)?;
            *total = checked_add(*total, x)?;
        }
    }

    Ok(out)
}

/// Ticks able to absorb flow for a specific trade direction, plus the
/// consolidated constants of everything that holds still.
#[derive(Debug, Clone)]
pub(crate) struct TradePartition {
    /// Price parameters of participating ticks, in registry order.
    pub participants: Vec<U256>,
    /// Σ in-component over participants.
    pub participant_in_sum: U256,
    /// Componentwise reserve sum over every active tick.
    pub total_reserves: Vec<U256>,
    /// Diagonal offset of the frozen (non-participating) reserves.
    pub frozen_offset: U256,
    /// Σ boundary-circle radii of the frozen ticks.
    pub frozen_radius: U256,
    /// Whether any active tick holds still this segment.
    pub frozen_any: bool,
}

/// A tick participates when the trade direction can move it: the in
/// component has something left to give and the out component has room
/// below the radius. Everything else is frozen for the segment.
pub(crate) fn partition_for_trade(
    ticks: &BTreeMap<U256, Tick>,
    token_in: usize,
    token_out: usize,
    root_n: U256,
    token_count: usize,
) -> Result<TradePartition> {
    let mut partition = TradePartition {
        participants: Vec::new(),
        participant_in_sum: U256::zero(),
        total_reserves: vec![U256::zero(); token_count],
        frozen_offset: U256::zero(),
        frozen_radius: U256::zero(),
        frozen_any: false,
    };
    let mut frozen_reserves = vec![U256::zero(); token_count];

    for tick in ticks.values() {
        if tick.status == TickStatus::Inactive {
            continue;
        }
        for (acc, &x) in partition.total_reserves.iter_mut().zip(&tick.reserves) {
            *acc = checked_add(*acc, x)?;
        }

        let can_give = !tick.reserves[token_in].is_zero();
        let can_take = tick.reserves[token_out] < tick.radius;
        if can_give && can_take {
            partition.participants.push(tick.p);
            partition.participant_in_sum =
                checked_add(partition.participant_in_sum, tick.reserves[token_in])?;
        } else {
            partition.frozen_any = true;
            partition.frozen_radius =
                checked_add(partition.frozen_radius, tick.boundary_circle()?)?;
            for (acc, &x) in frozen_reserves.iter_mut().zip(&tick.reserves) {
                *acc = checked_add(*acc, x)?;
            }
        }
    }

    if partition.frozen_any {
        partition.frozen_offset = diagonal_offset(&frozen_reserves, root_n)?;
    }

    Ok(partition)
}

#[cfg(test)]
mod tests {
    use super::*;
    use orbital_math::scale;

    fn fp(v: u64) -> U256 {
        U256::from(v) * scale()
    }

    fn tick_with(p: u64, radius: u64, reserves: &[u64]) -> Tick {
        let mut tick = Tick::new(fp(p), fp(radius), reserves.len());
        tick.reserves = reserves.iter().map(|&v| fp(v)).collect();
        tick.total_lp_shares = fp(1);
        tick.recompute_invariant().unwrap();
        tick.refresh_status();
        tick
    }

    #[test]
    fn consolidation_splits_interior_and_boundary() {
        let mut ticks = BTreeMap::new();
        ticks.insert(fp(1), tick_with(1, 100, &[30, 40]));
        ticks.insert(fp(2), tick_with(2, 50, &[50, 10])); // pinned at radius

        let c = consolidate(&ticks, 2).unwrap();
        assert_eq!(c.interior_ticks, 1);
        assert_eq!(c.boundary_ticks, 1);
        assert_eq!(c.k_interior, fp(2500));
        assert_eq!(c.r_interior, fp(100));
        assert_eq!(c.k_boundary, fp(2600));
        // boundary circle strips the pinned 50² component: s = √100 = 10
        assert_eq!(c.s_boundary, fp(10));
        assert_eq!(c.interior_reserves, vec![fp(30), fp(40)]);
        assert_eq!(c.boundary_reserves, vec![fp(50), fp(10)]);
        assert_eq!(c.total_reserves, vec![fp(80), fp(50)]);
    }

    #[test]
    fn inactive_ticks_are_ignored() {
        let mut ticks = BTreeMap::new();
        let mut dead = tick_with(1, 100, &[30, 40]);
        dead.total_lp_shares = U256::zero();
        dead.refresh_status();
        ticks.insert(fp(1), dead);

        let c = consolidate(&ticks, 2).unwrap();
        assert_eq!(c.interior_ticks + c.boundary_ticks, 0);
        assert_eq!(c.total_reserves, vec![U256::zero(), U256::zero()]);
    }

    #[test]
    fn partition_freezes_ticks_pinned_against_the_trade() {
        let mut ticks = BTreeMap::new();
        ticks.insert(fp(1), tick_with(1, 100, &[30, 40]));
        // in-component drained: cannot give token 0
        ticks.insert(fp(2), tick_with(2, 100, &[0, 60]));

        let root_n = orbital_math::geometry::sqrt_n_fixed(2).unwrap();
        let p = partition_for_trade(&ticks, 0, 1, root_n, 2).unwrap();
        assert_eq!(p.participants, vec![fp(1)]);
        assert_eq!(p.participant_in_sum, fp(30));
        assert!(p.frozen_any);
        assert_eq!(p.total_reserves, vec![fp(30), fp(100)]);

        // reverse direction: the drained tick can absorb token 0 again
        let p = partition_for_trade(&ticks, 1, 0, root_n, 2).unwrap();
        assert_eq!(p.participants.len(), 2);
    }
}
