//! # Orbital AMM Engine
//!
//! ## Purpose
//!
//! Deterministic computation core for an n-token sphere-invariant AMM
//! with concentrated-liquidity ticks. Each tick keeps its reserve vector
//! on the sphere `Σ x_i² = k` inside the box `[0, r]^N`; the consolidator
//! collapses Interior and Boundary ticks into the torus invariant that
//! prices trades; the swap engine walks boundary crossings segment by
//! segment; the liquidity engine mints and burns tick-scoped LP shares.
//!
//! ## Integration Points
//!
//! - **Input**: operation calls from a host (ledger adapter, simulator,
//!   test harness) holding a [`PoolManager`] handle
//! - **Output**: operation results plus the [`orbital_types::PoolEvent`]
//!   journal the indexer drains
//! - **State**: everything lives in one explicitly-owned [`Pool`] struct;
//!   no ambient or static state, no I/O, no suspension points
//!
//! ## Architecture Role
//!
//! ```text
//! Liquidity Engine ──┐                       ┌── Query Surface
//!                    ├─→ Tick Registry ←─────┤
//! Swap Engine ───────┘        ↑              └── Event Journal
//!                     Invariant Consolidator
//!                             ↑
//!                     Fixed-Point Kernel
//! ```
//!
//! Every mutation validates, transforms a working copy, revalidates the
//! invariants, and commits atomically; an error leaves no trace.

pub mod config;
pub mod consolidate;
pub mod liquidity;
pub mod manager;
pub mod pool;
pub mod swap;
pub mod tick;

pub use config::EngineConfig;
pub use consolidate::Consolidation;
pub use manager::PoolManager;
pub use pool::{Pool, TickInfo};
pub use tick::Tick;
