//! Thread-safe pool wrapper.
//!
//! The engine is a sequential state machine; in a multi-threaded host the
//! registry lives behind a single mutual-exclusion domain. Mutations hold
//! the write lock for their full duration — a multi-segment swap never
//! interleaves with another mutation — while the query surface takes the
//! read lock and sees a consistent snapshot.

use ethers_core::types::{Address, U256};
use orbital_types::{PoolEvent, Result, TokenId};
use parking_lot::RwLock;

use crate::consolidate::Consolidation;
use crate::pool::{Pool, TickInfo};

/// Shared handle over a pool. Hosts typically wrap it in an `Arc`.
#[derive(Debug)]
pub struct PoolManager {
    inner: RwLock<Pool>,
}

impl PoolManager {
    pub fn new(pool: Pool) -> Self {
        Self {
            inner: RwLock::new(pool),
        }
    }

    // ---- mutations (write lock) ----

    pub fn add_liquidity(&self, provider: Address, p: U256, amounts: &[U256]) -> Result<U256> {
        self.inner.write().add_liquidity(provider, p, amounts)
    }

    pub fn remove_liquidity(&self, provider: Address, p: U256, lp_shares: U256) -> Result<Vec<U256>> {
        self.inner.write().remove_liquidity(provider, p, lp_shares)
    }

    pub fn swap(
        &self,
        trader: Address,
        amount_in: U256,
        token_in: usize,
        token_out: usize,
        min_amount_out: U256,
    ) -> Result<U256> {
        self.inner
            .write()
            .swap(trader, amount_in, token_in, token_out, min_amount_out)
    }

    /// Drain the event journal for the indexer.
    pub fn drain_events(&self) -> Vec<PoolEvent> {
        self.inner.write().take_events()
    }

    // ---- queries (read lock, consistent snapshot) ----

    pub fn token_count(&self) -> usize {
        self.inner.read().token_count()
    }

    pub fn tokens(&self) -> Vec<TokenId> {
        self.inner.read().tokens().to_vec()
    }

    pub fn tick_info(&self, p: U256) -> Option<TickInfo> {
        self.inner.read().tick_info(p)
    }

    pub fn ticks(&self) -> Vec<TickInfo> {
        self.inner.read().ticks()
    }

    pub fn total_lp_shares(&self, p: U256) -> U256 {
        self.inner.read().total_lp_shares(p)
    }

    pub fn lp_balance(&self, p: U256, provider: Address) -> U256 {
        self.inner.read().lp_balance(p, provider)
    }

    pub fn total_reserves(&self) -> Result<Vec<U256>> {
        self.inner.read().total_reserves()
    }

    pub fn protocol_fees(&self) -> Vec<U256> {
        self.inner.read().protocol_fees().to_vec()
    }

    pub fn consolidation(&self) -> Result<Consolidation> {
        self.inner.read().consolidation()
    }

    pub fn spot_price(&self, token_in: usize, token_out: usize) -> Result<U256> {
        self.inner.read().spot_price(token_in, token_out)
    }
}
