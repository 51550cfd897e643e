//! Bit scanning over 256-bit bitmaps
//!
//! Used by the bin tree to locate the nearest populated slot inside a single
//! 256-bit level without iterating bit by bit.

use crate::common::errors::MathError;
use alloy_primitives::U256;

/// Index (0-255) of the most significant set bit, or `MathError::ZeroValue`
/// for zero.
pub fn most_significant_bit(x: U256) -> Result<u8, MathError> {
    if x.is_zero() {
        return Err(MathError::ZeroValue);
    }
    Ok(255 - x.leading_zeros() as u8)
}

/// Index (0-255) of the least significant set bit, or `MathError::ZeroValue`
/// for zero.
pub fn least_significant_bit(x: U256) -> Result<u8, MathError> {
    if x.is_zero() {
        return Err(MathError::ZeroValue);
    }
    Ok(x.trailing_zeros() as u8)
}

/// Highest set bit at or below `bit`, if any.
pub fn closest_bit_right(x: U256, bit: u8) -> Option<u8> {
    let shift = 255 - bit as usize;
    let masked = x << shift;
    most_significant_bit(masked)
        .ok()
        .map(|msb| msb - shift as u8)
}

/// Lowest set bit at or above `bit`, if any.
pub fn closest_bit_left(x: U256, bit: u8) -> Option<u8> {
    let masked = x >> bit as usize;
    least_significant_bit(masked).ok().map(|lsb| lsb + bit)
}
