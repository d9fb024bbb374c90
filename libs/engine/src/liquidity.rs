//! Liquidity engine: LP share mint and burn against a tick.
//!
//! Both operations validate fully, build the mutated tick as a working
//! copy, and only then commit registry, position book, and events
//! together. Any error leaves the pool untouched.

use ethers_core::types::{Address, U256};
use orbital_math::fixed::{checked_add, checked_sub, mul_div};
use orbital_math::geometry::check_bounds;
use orbital_types::events::{LiquidityAdded, LiquidityRemoved, TickStatusChanged};
use orbital_types::{EngineError, PoolEvent, Result};
use tracing::info;

use crate::pool::Pool;
use crate::tick::Tick;

impl Pool {
    /// Mint LP shares for `provider` against the tick at `p`, creating
    /// the tick on first deposit. Returns the minted share count.
    pub fn add_liquidity(&mut self, provider: Address, p: U256, amounts: &[U256]) -> Result<U256> {
        let n = self.tokens.len();
        if amounts.len() != n {
            return Err(EngineError::InvalidLength {
                expected: n,
                actual: amounts.len(),
            });
        }
        if amounts.iter().all(|a| a.is_zero()) {
            return Err(EngineError::InvalidAmounts);
        }

        let mut working = match self.ticks.get(&p) {
            Some(tick) => tick.clone(),
            None => {
                let radius = self.radius_curve.radius(p)?;
                if radius.is_zero() {
                    return Err(EngineError::InvalidReserves(format!(
                        "price parameter {p} maps to a zero radius"
                    )));
                }
                Tick::new(p, radius, n)
            }
        };
        let old_status = working.status;
        let old_liquidity = working.liquidity;
        let total_before = working.total_lp_shares;

        for (reserve, &amount) in working.reserves.iter_mut().zip(amounts) {
            *reserve = checked_add(*reserve, amount)?;
        }
        check_bounds(&working.reserves, working.radius)?;

        working.recompute_invariant()?;

        let minted = if total_before.is_zero() {
            // seed mint: shares equal the liquidity measure
            working.liquidity
        } else {
            let grown = checked_sub(working.liquidity, old_liquidity)?;
            mul_div(total_before, grown, old_liquidity)?
        };
        if minted.is_zero() {
            return Err(EngineError::InvalidAmounts);
        }

        working.total_lp_shares = checked_add(total_before, minted)?;
        let new_status = working.refresh_status();
        working.validate_invariant(self.config.invariant_tolerance)?;

        let position = self.lp_balance(p, provider);
        let new_position = checked_add(position, minted)?;

        // commit
        self.ticks.insert(p, working);
        self.positions.insert((p, provider), new_position);
        if old_status != new_status {
            self.events
                .push(PoolEvent::TickStatusChanged(TickStatusChanged {
                    p,
                    old_status,
                    new_status,
                }));
        }
        self.events.push(PoolEvent::LiquidityAdded(LiquidityAdded {
            provider,
            p,
            amounts: amounts.to_vec(),
            lp_shares: minted,
        }));
        info!(%provider, %p, %minted, status = %new_status, "liquidity added");
        Ok(minted)
    }

    /// Burn `lp_shares` of `provider`'s position at `p` and withdraw the
    /// proportional share of every reserve component.
    pub fn remove_liquidity(
        &mut self,
        provider: Address,
        p: U256,
        lp_shares: U256,
    ) -> Result<Vec<U256>> {
        if lp_shares.is_zero() {
            return Err(EngineError::InvalidAmounts);
        }
        let position = self.lp_balance(p, provider);
        if position < lp_shares {
            return Err(EngineError::InsufficientLiquidity {
                requested: lp_shares,
                available: position,
            });
        }
        let tick = self
            .ticks
            .get(&p)
            .ok_or_else(|| EngineError::InsufficientLiquidity {
                requested: lp_shares,
                available: U256::zero(),
            })?;

        let mut working = tick.clone();
        let old_status = working.status;
        let total_before = working.total_lp_shares;

        let mut withdrawn = Vec::with_capacity(working.reserves.len());
        for i in 0..working.reserves.len() {
            let share = mul_div(working.reserves[i], lp_shares, total_before)?;
            working.reserves[i] = checked_sub(working.reserves[i], share)?;
            withdrawn.push(share);
        }
        working.total_lp_shares = checked_sub(total_before, lp_shares)?;

        working.recompute_invariant()?;
        let new_status = working.refresh_status();
        working.validate_invariant(self.config.invariant_tolerance)?;

        let new_position = checked_sub(position, lp_shares)?;

        // commit
        self.ticks.insert(p, working);
        if new_position.is_zero() {
            self.positions.remove(&(p, provider));
        } else {
            self.positions.insert((p, provider), new_position);
        }
        if old_status != new_status {
            self.events
                .push(PoolEvent::TickStatusChanged(TickStatusChanged {
                    p,
                    old_status,
                    new_status,
                }));
        }
        self.events
            .push(PoolEvent::LiquidityRemoved(LiquidityRemoved {
                provider,
                p,
                amounts: withdrawn.clone(),
                lp_shares,
            }));
        info!(%provider, %p, %lp_shares, status = %new_status, "liquidity removed");
        Ok(withdrawn)
    }
}
