//! Fixed-point arithmetic on 256-bit integers
//!
//! Two scales are used by the pair engine:
//!
//! - **128.128 binary fixed point** for bin prices and fee-per-share
//!   accumulators (`SCALE = 2^128`)
//! - **1e18 decimal fixed point** for fee rates and liquidity distributions
//!   (`PRECISION = 10^18`)
//!
//! ## Design Principles
//!
//! - **Full Precision**: `x * y / d` is computed on a 512-bit intermediate so a
//!   product that overflows 256 bits still divides exactly
//! - **Explicit Rounding**: every helper comes in a `_round_down` and a
//!   `_round_up` flavour; callers pick up for amounts owed by the trader and
//!   down for amounts owed to the trader
//! - **Checked Narrowing**: conversion back to `u128` fails instead of truncating

use crate::common::errors::MathError;
use alloy_primitives::U256;

/// Number of fractional bits of the 128.128 representation
pub const SCALE_OFFSET: usize = 128;

/// 1.0 in 128.128 fixed point
pub const SCALE: U256 = U256::from_limbs([0, 0, 1, 0]);

/// 1.0 in 1e18 decimal fixed point
pub const PRECISION: u128 = 1_000_000_000_000_000_000;

/// PRECISION squared (1e36 still fits in a u128)
pub const SQUARED_PRECISION: u128 = PRECISION * PRECISION;

/// 100% expressed in basis points
pub const BASIS_POINT_MAX: u128 = 10_000;

const U256_TWO: U256 = U256::from_limbs([2, 0, 0, 0]);
const U256_THREE: U256 = U256::from_limbs([3, 0, 0, 0]);

/// Computes `floor(x * y / denominator)` with a 512-bit intermediate product.
///
/// Returns `MathError::DivisionByZero` for a zero denominator and
/// `MathError::Overflow` when the quotient does not fit in 256 bits.
pub fn mul_div_round_down(x: U256, y: U256, denominator: U256) -> Result<U256, MathError> {
    if denominator.is_zero() {
        return Err(MathError::DivisionByZero);
    }

    // prod1 * 2^256 + prod0 == x * y
    let mm = x.mul_mod(y, U256::MAX);
    let mut prod0 = x.wrapping_mul(y);
    let (mut prod1, borrow) = mm.overflowing_sub(prod0);
    if borrow {
        prod1 = prod1.wrapping_sub(U256::ONE);
    }

    if prod1.is_zero() {
        return Ok(prod0 / denominator);
    }

    if denominator <= prod1 {
        return Err(MathError::Overflow);
    }

    // Make the 512-bit product divisible by the denominator
    let remainder = x.mul_mod(y, denominator);
    let (reduced, borrow) = prod0.overflowing_sub(remainder);
    prod0 = reduced;
    if borrow {
        prod1 = prod1.wrapping_sub(U256::ONE);
    }

    // Factor powers of two out of the denominator
    let mut denominator = denominator;
    let twos = denominator & denominator.wrapping_neg();
    denominator /= twos;
    prod0 /= twos;
    let flip = (twos.wrapping_neg() / twos).wrapping_add(U256::ONE);
    prod0 |= prod1.wrapping_mul(flip);

    // Modular inverse of the (now odd) denominator, Newton-Raphson to 256 bits
    let mut inverse = U256_THREE.wrapping_mul(denominator) ^ U256_TWO;
    for _ in 0..6 {
        inverse = inverse.wrapping_mul(U256_TWO.wrapping_sub(denominator.wrapping_mul(inverse)));
    }

    Ok(prod0.wrapping_mul(inverse))
}

/// Computes `ceil(x * y / denominator)` with a 512-bit intermediate product.
pub fn mul_div_round_up(x: U256, y: U256, denominator: U256) -> Result<U256, MathError> {
    let result = mul_div_round_down(x, y, denominator)?;
    if x.mul_mod(y, denominator).is_zero() {
        return Ok(result);
    }
    result.checked_add(U256::ONE).ok_or(MathError::Overflow)
}

/// Computes `floor(x * y / 2^offset)`.
pub fn mul_shift_round_down(x: U256, y: U256, offset: usize) -> Result<U256, MathError> {
    mul_div_round_down(x, y, pow2(offset)?)
}

/// Computes `ceil(x * y / 2^offset)`.
pub fn mul_shift_round_up(x: U256, y: U256, offset: usize) -> Result<U256, MathError> {
    mul_div_round_up(x, y, pow2(offset)?)
}

/// Computes `floor(x * 2^offset / y)`.
pub fn shift_div_round_down(x: U256, offset: usize, y: U256) -> Result<U256, MathError> {
    mul_div_round_down(x, pow2(offset)?, y)
}

/// Computes `ceil(x * 2^offset / y)`.
pub fn shift_div_round_up(x: U256, offset: usize, y: U256) -> Result<U256, MathError> {
    mul_div_round_up(x, pow2(offset)?, y)
}

/// Narrows a 256-bit value to `u128`, failing instead of truncating.
pub fn to_u128(value: U256) -> Result<u128, MathError> {
    let limbs = value.as_limbs();
    if limbs[2] != 0 || limbs[3] != 0 {
        return Err(MathError::Overflow);
    }
    Ok(((limbs[1] as u128) << 64) | limbs[0] as u128)
}

fn pow2(offset: usize) -> Result<U256, MathError> {
    if offset >= 256 {
        return Err(MathError::Overflow);
    }
    Ok(U256::ONE << offset)
}
