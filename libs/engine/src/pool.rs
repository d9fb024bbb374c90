//! Pool state and the read-only query surface.
//!
//! The pool owns the tick registry, LP position book, retained protocol
//! fees, and the event journal. All mutation goes through the liquidity
//! and swap engines (`liquidity.rs`, `swap.rs`), which operate on a
//! working copy of the registry and commit atomically.

use std::collections::BTreeMap;

use ethers_core::types::{Address, U256};
use orbital_math::fixed::{checked_add, fixed_div};
use orbital_math::geometry::{sqrt_n_fixed, RadiusCurve};
use orbital_types::{EngineError, PoolEvent, Result, TickStatus, TokenId};
use serde::Serialize;

use crate::config::EngineConfig;
use crate::consolidate::{consolidate, Consolidation};
use crate::tick::Tick;

/// Read-only projection of one tick for hosts and the indexer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TickInfo {
    pub p: U256,
    pub radius: U256,
    pub reserves: Vec<U256>,
    pub invariant: U256,
    pub liquidity: U256,
    pub total_lp_shares: U256,
    pub status: TickStatus,
}

impl TickInfo {
    fn from_tick(t: &Tick) -> Self {
        Self {
            p: t.p,
            radius: t.radius,
            reserves: t.reserves.clone(),
            invariant: t.invariant,
            liquidity: t.liquidity,
            total_lp_shares: t.total_lp_shares,
            status: t.status,
        }
    }
}

/// The engine's entire mutable state, owned explicitly and passed by
/// reference into each operation. No ambient or static state anywhere.
#[derive(Debug)]
pub struct Pool {
    pub(crate) tokens: Vec<TokenId>,
    pub(crate) config: EngineConfig,
    pub(crate) radius_curve: Box<dyn RadiusCurve>,
    /// Fixed-point `√N`, precomputed once at construction.
    pub(crate) root_n: U256,
    pub(crate) ticks: BTreeMap<U256, Tick>,
    pub(crate) positions: BTreeMap<(U256, Address), U256>,
    /// Per-token protocol fees retained from swap inputs.
    pub(crate) protocol_fees: Vec<U256>,
    pub(crate) events: Vec<PoolEvent>,
}

impl Pool {
    pub fn new(
        tokens: Vec<TokenId>,
        config: EngineConfig,
        radius_curve: Box<dyn RadiusCurve>,
    ) -> Result<Self> {
        config.validate()?;
        if tokens.len() < 2 {
            return Err(EngineError::InvalidLength {
                expected: 2,
                actual: tokens.len(),
            });
        }
        let token_count = tokens.len();
        let root_n = sqrt_n_fixed(token_count)?;
        Ok(Self {
            tokens,
            config,
            radius_curve,
            root_n,
            ticks: BTreeMap::new(),
            positions: BTreeMap::new(),
            protocol_fees: vec![U256::zero(); token_count],
            events: Vec::new(),
        })
    }

    // ---- query surface: pure reads over current state ----

    pub fn token_count(&self) -> usize {
        self.tokens.len()
    }

    pub fn tokens(&self) -> &[TokenId] {
        &self.tokens
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Tick parameters and radius for a given price parameter.
    pub fn tick_info(&self, p: U256) -> Option<TickInfo> {
        self.ticks.get(&p).map(TickInfo::from_tick)
    }

    /// Every known tick, in price-parameter order.
    pub fn ticks(&self) -> Vec<TickInfo> {
        self.ticks.values().map(TickInfo::from_tick).collect()
    }

    /// Outstanding LP shares for a tick, zero if the tick is unknown.
    pub fn total_lp_shares(&self, p: U256) -> U256 {
        self.ticks
            .get(&p)
            .map(|t| t.total_lp_shares)
            .unwrap_or_else(U256::zero)
    }

    /// A provider's LP share balance for a tick.
    pub fn lp_balance(&self, p: U256, provider: Address) -> U256 {
        self.positions
            .get(&(p, provider))
            .copied()
            .unwrap_or_else(U256::zero)
    }

    /// Componentwise reserve sum across all ticks.
    pub fn total_reserves(&self) -> Result<Vec<U256>> {
        let mut totals = vec![U256::zero(); self.tokens.len()];
        for tick in self.ticks.values() {
            for (acc, &x) in totals.iter_mut().zip(&tick.reserves) {
                *acc = checked_add(*acc, x)?;
            }
        }
        Ok(totals)
    }

    /// Protocol fees retained so far, per token.
    pub fn protocol_fees(&self) -> &[U256] {
        &self.protocol_fees
    }

    /// The Interior/Boundary consolidated snapshot for host-side quoting.
    pub fn consolidation(&self) -> Result<Consolidation> {
        consolidate(&self.ticks, self.tokens.len())
    }

    /// Marginal price of `token_out` in units of `token_in` from the
    /// aggregate reserve state: `x_in / x_out`.
    pub fn spot_price(&self, token_in: usize, token_out: usize) -> Result<U256> {
        self.check_pair(token_in, token_out)?;
        let totals = self.total_reserves()?;
        fixed_div(totals[token_in], totals[token_out])
    }

    /// Drain the event journal; called by the host after each batch of
    /// operations.
    pub fn take_events(&mut self) -> Vec<PoolEvent> {
        std::mem::take(&mut self.events)
    }

    // ---- shared validation helpers ----

    pub(crate) fn check_pair(&self, token_in: usize, token_out: usize) -> Result<()> {
        let n = self.tokens.len();
        if token_in >= n || token_out >= n {
            return Err(EngineError::InvalidLength {
                expected: n,
                actual: token_in.max(token_out) + 1,
            });
        }
        if token_in == token_out {
            return Err(EngineError::SameToken(token_in));
        }
        Ok(())
    }
}
