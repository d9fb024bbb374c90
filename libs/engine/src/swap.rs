//! Swap engine.
//!
//! A swap removes value from the in-token component and credits the
//! out-token component, walking boundary crossings segment by segment:
//! each segment consolidates the registry, caps the step at the nearest
//! crossing, solves the consolidated invariant for the segment output,
//! and applies the flow pro rata across participating ticks. The whole
//! multi-segment walk runs on a working copy of the registry and commits
//! atomically, so no caller ever observes a partially-applied trade.

use std::collections::BTreeMap;

use ethers_core::types::{Address, U256};
use orbital_math::fixed::{abs_diff, checked_add, checked_sub, mul_div};
use orbital_math::torus::torus_measure;
use orbital_math::{input_to_reach_output_bound, solve_sphere_trade, solve_torus_trade,
                   TorusSolveInput};
use orbital_types::events::{Swap as SwapEvent, TickStatusChanged};
use orbital_types::{EngineError, PoolEvent, Result};
use tracing::{debug, info};

use crate::consolidate::partition_for_trade;
use crate::pool::Pool;
use crate::tick::Tick;

/// Segments capped below this many raw units are treated as exhausted
/// capacity rather than walked wei by wei.
const MIN_SEGMENT_INPUT: u64 = 1_000_000;

impl Pool {
    /// Trade `amount_in` of `token_in` for `token_out`, returning the
    /// credited output. The protocol fee comes off the input up front and
    /// never touches the curve.
    pub fn swap(
        &mut self,
        trader: Address,
        amount_in: U256,
        token_in: usize,
        token_out: usize,
        min_amount_out: U256,
    ) -> Result<U256> {
        self.check_pair(token_in, token_out)?;
        if amount_in.is_zero() {
            return Err(EngineError::InvalidAmounts);
        }

        let fee = mul_div(
            amount_in,
            U256::from(self.config.fee_bps),
            U256::from(10_000u64),
        )?;
        let net = checked_sub(amount_in, fee)?;
        if net.is_zero() {
            return Err(EngineError::InvalidAmounts);
        }

        let mut working = self.ticks.clone();
        let mut events: Vec<PoolEvent> = Vec::new();
        let mut remaining = net;
        let mut total_out = U256::zero();

        let active = working.values().filter(|t| t.status.is_active()).count();
        let max_segments = active * self.config.max_segments_per_tick + 2;
        let mut segments = 0usize;

        while !remaining.is_zero() {
            segments += 1;
            if segments > max_segments {
                return Err(EngineError::Numerical(format!(
                    "swap walk exceeded {max_segments} segments"
                )));
            }
            let step_out =
                self.execute_segment(&mut working, &mut events, token_in, token_out, &mut remaining)?;
            total_out = checked_add(total_out, step_out)?;
        }

        if total_out < min_amount_out {
            return Err(EngineError::SlippageExceeded {
                amount_out: total_out,
                min_amount_out,
            });
        }

        // destination reserves must stay within the global liquidity bound
        let mut destination = U256::zero();
        let mut bound = U256::zero();
        for tick in working.values().filter(|t| t.status.is_active()) {
            destination = checked_add(destination, tick.reserves[token_out])?;
            bound = checked_add(bound, tick.radius)?;
        }
        if destination > bound {
            return Err(EngineError::InsufficientLiquidity {
                requested: destination,
                available: bound,
            });
        }

        // final invariant revalidation over every touched tick
        for tick in working.values().filter(|t| t.status.is_active()) {
            tick.validate_invariant(self.config.invariant_tolerance)?;
        }

        let fee_total = checked_add(self.protocol_fees[token_in], fee)?;

        // commit
        self.ticks = working;
        self.protocol_fees[token_in] = fee_total;
        events.push(PoolEvent::Swap(SwapEvent {
            trader,
            token_in: token_in as u32,
            token_out: token_out as u32,
            amount_in,
            amount_out: total_out,
            fee,
        }));
        self.events.extend(events);
        info!(%trader, token_in, token_out, %amount_in, %total_out, %fee, segments, "swap committed");
        Ok(total_out)
    }

    /// One boundary-to-boundary segment: consolidate, cap at the nearest
    /// crossing, solve, apportion. Returns the segment's credited output
    /// and shrinks `remaining` by the consumed input.
    fn execute_segment(
        &self,
        working: &mut BTreeMap<U256, Tick>,
        events: &mut Vec<PoolEvent>,
        token_in: usize,
        token_out: usize,
        remaining: &mut U256,
    ) -> Result<U256> {
        let partition =
            partition_for_trade(working, token_in, token_out, self.root_n, self.tokens.len())?;
        // An Interior tick always participates, so an empty set means no
        // tick can absorb marginal flow in this direction.
        if partition.participants.is_empty() {
            return Err(EngineError::NoInteriorLiquidity);
        }
        let in_sum = partition.participant_in_sum;

        let tick_at = |map: &BTreeMap<U256, Tick>, key: &U256| -> Result<Tick> {
            map.get(key)
                .cloned()
                .ok_or_else(|| EngineError::Numerical(format!("tick {key} missing mid-walk")))
        };

        let mut out_sum = U256::zero();
        for key in &partition.participants {
            let tick = tick_at(working, key)?;
            out_sum = checked_add(out_sum, tick.reserves[token_out])?;
        }

        // nearest crossing caps the segment: draining the in side, or any
        // participant's out component reaching its radius
        let mut capacity = in_sum;
        for key in &partition.participants {
            let tick = tick_at(working, key)?;
            let headroom = checked_sub(tick.radius, tick.reserves[token_out])?;
            let out_gain_at_pin = mul_div(headroom, in_sum, tick.reserves[token_in])?;
            let pinned_sum = checked_add(out_sum, out_gain_at_pin)?;
            if let Some(d) = input_to_reach_output_bound(in_sum, out_sum, pinned_sum)? {
                capacity = capacity.min(d);
            }
        }

        let step = (*remaining).min(capacity);
        if step < U256::from(MIN_SEGMENT_INPUT) && *remaining > step {
            return Err(EngineError::InsufficientLiquidity {
                requested: *remaining,
                available: capacity,
            });
        }

        let quote = if partition.frozen_any {
            solve_torus_trade(&TorusSolveInput {
                total_reserves: &partition.total_reserves,
                token_in,
                token_out,
                amount_in: step,
                frozen_offset: partition.frozen_offset,
                frozen_radius: partition.frozen_radius,
                root_n: self.root_n,
                tolerance: self.config.torus_tolerance,
                max_iterations: self.config.max_solver_iterations,
            })?
        } else {
            solve_sphere_trade(
                partition.total_reserves[token_in],
                partition.total_reserves[token_out],
                step,
            )?
        };

        let measure_before = torus_measure(
            &partition.total_reserves,
            partition.frozen_offset,
            partition.frozen_radius,
            self.root_n,
        )?;

        // apportion pro rata by in-component share; the last participant
        // absorbs rounding remainders so the sums stay exact
        let last = partition.participants.len() - 1;
        let mut applied_in = U256::zero();
        let mut applied_out = U256::zero();
        for (idx, key) in partition.participants.iter().enumerate() {
            let snapshot = tick_at(working, key)?;
            let (share_in, share_out) = if idx == last {
                (
                    checked_sub(step, applied_in)?.min(snapshot.reserves[token_in]),
                    checked_sub(quote, applied_out)?,
                )
            } else {
                (
                    mul_div(step, snapshot.reserves[token_in], in_sum)?,
                    mul_div(quote, snapshot.reserves[token_in], in_sum)?,
                )
            };

            let tick = working
                .get_mut(key)
                .ok_or_else(|| EngineError::Numerical(format!("tick {key} missing mid-walk")))?;
            let old_status = tick.status;
            tick.reserves[token_in] = checked_sub(tick.reserves[token_in], share_in)?;
            let headroom = checked_sub(tick.radius, tick.reserves[token_out])?;
            let credited = share_out.min(headroom);
            tick.reserves[token_out] = checked_add(tick.reserves[token_out], credited)?;
            tick.recompute_invariant()?;
            let new_status = tick.refresh_status();
            if old_status != new_status {
                events.push(PoolEvent::TickStatusChanged(TickStatusChanged {
                    p: *key,
                    old_status,
                    new_status,
                }));
            }
            applied_in = checked_add(applied_in, share_in)?;
            applied_out = checked_add(applied_out, credited)?;
        }
        if applied_out < quote {
            debug!(dust = %(quote - applied_out), "out-side rounding dust stopped at tick radius");
        }

        // the segment must preserve the consolidated invariant measure
        let mut after_total = vec![U256::zero(); self.tokens.len()];
        for tick in working.values().filter(|t| t.status.is_active()) {
            for (acc, &x) in after_total.iter_mut().zip(&tick.reserves) {
                *acc = checked_add(*acc, x)?;
            }
        }
        let measure_after = torus_measure(
            &after_total,
            partition.frozen_offset,
            partition.frozen_radius,
            self.root_n,
        )?;
        let audit_tolerance = self.config.torus_tolerance.saturating_mul(U256::from(4u64));
        let drift = abs_diff(measure_after, measure_before);
        if drift > audit_tolerance {
            return Err(EngineError::UnsatisfiedInvariant(format!(
                "segment drifted the consolidated measure by {drift} (allowed {audit_tolerance})"
            )));
        }

        *remaining = checked_sub(*remaining, step)?;
        debug!(%step, %applied_out, "segment resolved");
        Ok(applied_out)
    }
}
