//! Pool events consumed by the indexer and UI.
//!
//! Field order and types are the compatibility contract: the downstream
//! subgraph copies these fields into entities verbatim. Amounts are
//! 18-decimal fixed-point `U256`; token references in `Swap` are indices
//! into the pool's immutable token list.

use ethers_core::types::{Address, U256};
use serde::{Deserialize, Serialize};

use crate::status::TickStatus;

/// LP shares minted against a tick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiquidityAdded {
    pub provider: Address,
    pub p: U256,
    pub amounts: Vec<U256>,
    pub lp_shares: U256,
}

/// LP shares burned against a tick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiquidityRemoved {
    pub provider: Address,
    pub p: U256,
    pub amounts: Vec<U256>,
    pub lp_shares: U256,
}

/// A completed trade, fee already retained by the protocol.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Swap {
    pub trader: Address,
    pub token_in: u32,
    pub token_out: u32,
    pub amount_in: U256,
    pub amount_out: U256,
    pub fee: U256,
}

/// A tick moved between Inactive, Interior, and Boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickStatusChanged {
    pub p: U256,
    pub old_status: TickStatus,
    pub new_status: TickStatus,
}

/// Envelope over everything the engine can emit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PoolEvent {
    LiquidityAdded(LiquidityAdded),
    LiquidityRemoved(LiquidityRemoved),
    Swap(Swap),
    TickStatusChanged(TickStatusChanged),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn swap_event_field_order_is_stable() {
        let ev = Swap {
            trader: Address::zero(),
            token_in: 0,
            token_out: 1,
            amount_in: U256::from(100u64),
            amount_out: U256::from(99u64),
            fee: U256::from(1u64),
        };
        let json = serde_json::to_string(&ev).unwrap();
        let trader = json.find("trader").unwrap();
        let token_in = json.find("token_in").unwrap();
        let amount_out = json.find("amount_out").unwrap();
        let fee = json.find("fee").unwrap();
        assert!(trader < token_in && token_in < amount_out && amount_out < fee);
    }

    #[test]
    fn status_change_round_trips() {
        let ev = TickStatusChanged {
            p: U256::from(42u64),
            old_status: TickStatus::Interior,
            new_status: TickStatus::Boundary,
        };
        let json = serde_json::to_string(&ev).unwrap();
        let back: TickStatusChanged = serde_json::from_str(&json).unwrap();
        assert_eq!(ev, back);
    }
}
