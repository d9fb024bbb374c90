//! Unsigned fixed-point kernel at 18-decimal precision.
//!
//! Every quantity the engine handles — reserves, radii, invariant
//! constants, LP shares — is a `U256` scaled by `10^18`. Products of two
//! scaled values are computed through `U512` so no intermediate bit is
//! lost before dividing the scale back out.

use ethers_core::types::{U256, U512};
use orbital_types::{EngineError, Result};

/// Newton-Raphson iteration cap for [`integer_sqrt`]. Convergence from a
/// bit-length seed takes O(log bits) steps; hitting the cap means the
/// input is pathological and is reported, not retried.
pub const MAX_SQRT_ITERATIONS: usize = 64;

/// The fixed-point scale, `10^18`.
pub fn scale() -> U256 {
    U256::exp10(18)
}

/// Checked addition.
pub fn checked_add(a: U256, b: U256) -> Result<U256> {
    a.checked_add(b)
        .ok_or_else(|| EngineError::Numerical(format!("addition overflow: {a} + {b}")))
}

/// Checked subtraction.
pub fn checked_sub(a: U256, b: U256) -> Result<U256> {
    a.checked_sub(b)
        .ok_or_else(|| EngineError::Numerical(format!("subtraction underflow: {a} - {b}")))
}

/// `|a - b|` without sign bookkeeping.
pub fn abs_diff(a: U256, b: U256) -> U256 {
    if a >= b {
        a - b
    } else {
        b - a
    }
}

/// `a * b / denominator` with a full-width `U512` intermediate.
pub fn mul_div(a: U256, b: U256, denominator: U256) -> Result<U256> {
    if denominator.is_zero() {
        return Err(EngineError::Numerical("division by zero".to_string()));
    }
    let product = U512::from(a) * U512::from(b);
    let quotient = product / U512::from(denominator);
    U256::try_from(quotient)
        .map_err(|_| EngineError::Numerical(format!("mul_div overflow: {a} * {b} / {denominator}")))
}

/// Fixed-point multiplication: `a * b / 10^18`.
pub fn fixed_mul(a: U256, b: U256) -> Result<U256> {
    mul_div(a, b, scale())
}

/// Fixed-point division: `a * 10^18 / b`.
pub fn fixed_div(a: U256, b: U256) -> Result<U256> {
    mul_div(a, scale(), b)
}

/// Floor of the exact integer square root by Newton-Raphson.
///
/// Seeded from the bit length of `x` (so the first guess already bounds
/// the root from above), iterating `g' = (g + x/g) / 2` until successive
/// guesses differ by at most one, then floor-corrected so that
/// `result² <= x < (result + 1)²`.
pub fn integer_sqrt(x: U256) -> Result<U256> {
    if x.is_zero() {
        return Ok(U256::zero());
    }
    if x == U256::one() {
        return Ok(U256::one());
    }

    // 2^ceil(bits/2) >= sqrt(x), so Newton descends monotonically.
    let mut guess = U256::one() << ((x.bits() + 1) / 2);

    for _ in 0..MAX_SQRT_ITERATIONS {
        let next = (guess + x / guess) >> 1;
        if abs_diff(next, guess) <= U256::one() {
            return Ok(floor_correct(next.min(guess), x));
        }
        guess = next;
    }

    Err(EngineError::Numerical(format!(
        "integer sqrt did not converge within {MAX_SQRT_ITERATIONS} iterations for {x}"
    )))
}

/// Square root in the fixed-point domain: for `x` at 18-decimal scale,
/// returns `sqrt(x)` at the same scale.
pub fn sqrt_fixed(x: U256) -> Result<U256> {
    let widened = mul_div(x, scale(), U256::one())?;
    integer_sqrt(widened)
}

fn floor_correct(candidate: U256, x: U256) -> U256 {
    let mut root = candidate;
    // Newton can land one above the floor; squares near 2^256 are handled
    // by treating multiplication overflow as "too big".
    while root.checked_mul(root).map(|sq| sq > x).unwrap_or(true) {
        root = root - U256::one();
    }
    loop {
        let up = root + U256::one();
        match up.checked_mul(up) {
            Some(sq) if sq <= x => root = up,
            _ => break,
        }
    }
    root
}
