//! # Orbital Math Library - Sphere-Invariant AMM Mathematics
//!
//! ## Purpose
//!
//! Pure mathematical core for the Orbital n-token AMM: exact unsigned
//! fixed-point arithmetic, the sphere invariant `k = Σ x_i²` that each
//! liquidity tick maintains, and the consolidated torus invariant that
//! prices trades across Interior and Boundary ticks simultaneously.
//!
//! ## Core Principles
//!
//! - **Safety:** every operation uses `checked_` arithmetic; overflow,
//!   underflow, and division by zero surface as typed errors, never wrap.
//! - **Precision:** multiplications run through `U512` intermediates so an
//!   18-decimal product never loses bits before the scale division.
//! - **Determinism:** integer-only computation; identical inputs produce
//!   identical outputs on every platform.
//! - **Statelessness:** functions operate only on the values passed in.
//!   Registry state, status bookkeeping, and event emission live in the
//!   engine crate.

pub mod fixed;
pub mod geometry;
pub mod torus;

pub use fixed::{abs_diff, checked_add, checked_sub, fixed_div, fixed_mul, integer_sqrt, mul_div,
                scale, sqrt_fixed};
pub use geometry::{classify, radius_for_balanced_deposit, sqrt_n_fixed, squared_norm,
                   LinearRadiusCurve, RadiusCurve};
pub use torus::{input_to_reach_output_bound, solve_sphere_trade, solve_torus_trade, torus_measure,
                TorusSolveInput};
