//! # Orbital Shared Types
//!
//! Domain types shared across the Orbital AMM engine crates.
//!
//! ## Design Philosophy
//!
//! - **No Precision Loss**: every financial value is an 18-decimal
//!   fixed-point `U256`; floating point never enters the engine.
//! - **Typed Failures**: one error taxonomy (`EngineError`) covering input
//!   validation, state validation, invariant validation, numerical failure,
//!   and the economic slippage guard. Callers branch on the kind.
//! - **Stable Event Shapes**: the four pool events are the compatibility
//!   contract with the indexer; field order and types do not change.
//!
//! ## Quick Start
//!
//! ```rust
//! use orbital_types::{EngineError, PoolEvent, TickStatus};
//!
//! fn classify(ev: &PoolEvent) -> &'static str {
//!     match ev {
//!         PoolEvent::LiquidityAdded(_) => "mint",
//!         PoolEvent::LiquidityRemoved(_) => "burn",
//!         PoolEvent::Swap(_) => "swap",
//!         PoolEvent::TickStatusChanged(_) => "status",
//!     }
//! }
//!
//! assert_ne!(TickStatus::Interior, TickStatus::Boundary);
//! let _: EngineError = EngineError::NoInteriorLiquidity;
//! ```

pub mod error;
pub mod events;
pub mod status;

pub use error::{EngineError, Result};
pub use events::{LiquidityAdded, LiquidityRemoved, PoolEvent, Swap, TickStatusChanged};
pub use status::TickStatus;

/// Token identity as seen by hosts and the indexer.
pub type TokenId = ethers_core::types::Address;
