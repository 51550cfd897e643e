//! Bin id and price conversion
//!
//! Prices are quoted as amount of Y per unit of X in 128.128 fixed point. The
//! price of bin `id` is `(1 + bin_step / 10_000)^(id - 2^23)`, so id `2^23`
//! always trades at exactly 1.0 and each step up multiplies the price by
//! `1 + bin_step / 10_000`.

use rust_decimal::Decimal;
use types::bit_math::most_significant_bit;
use types::fixed_point::{BASIS_POINT_MAX, SCALE, SCALE_OFFSET};
use types::fixed_point::{mul_shift_round_down, to_u128};
use types::{MathError, ID_OFFSET, MAX_BIN_ID, U256};

/// Exponents at or above 2^20 always underflow the 128.128 result
const MAX_POW_EXPONENT: u32 = 0x100000;

/// 2^127, the unit of the internal 129.127 log representation
const LOG_SCALE_OFFSET: usize = 127;

/// Decimal places kept by [`price_to_decimal`]
const DECIMAL_SCALE: u32 = 18;

/// `1 + bin_step / 10_000` in 128.128 fixed point
pub fn base(bin_step: u16) -> U256 {
    SCALE + (U256::from(bin_step) << SCALE_OFFSET) / U256::from(BASIS_POINT_MAX)
}

/// Price of a bin in 128.128 fixed point
pub fn price_from_id(id: u32, bin_step: u16) -> Result<U256, MathError> {
    if id > MAX_BIN_ID {
        return Err(MathError::IdOutOfBounds { id: id as i64 });
    }
    let exponent = id as i32 - ID_OFFSET as i32;
    pow(base(bin_step), exponent)
}

/// Bin id whose price is closest to `price`, truncating the log ratio toward
/// zero.
///
/// Not an exact inverse of [`price_from_id`]: a price exactly on a bin may map
/// to the neighbouring id toward `2^23` because the binary logarithm is
/// approximated.
pub fn id_from_price(price: U256, bin_step: u16) -> Result<u32, MathError> {
    let (price_negative, log_price) = log2(price)?;
    let (_, log_base) = log2(base(bin_step))?;
    if log_base.is_zero() {
        return Err(MathError::DivisionByZero);
    }

    let quotient = log_price / log_base;
    let quotient = i64::try_from(to_u128(quotient)?)
        .map_err(|_| MathError::Overflow)?;
    let id = if price_negative {
        ID_OFFSET as i64 - quotient
    } else {
        ID_OFFSET as i64 + quotient
    };

    if !(0..=MAX_BIN_ID as i64).contains(&id) {
        return Err(MathError::IdOutOfBounds { id });
    }
    Ok(id as u32)
}

/// `x^y` for a 128.128 `x` by square-and-multiply over the 20 low bits of `|y|`.
///
/// Bases above 1.0 are inverted first so every intermediate product stays below
/// 2^256; the result is inverted back at the end when needed.
pub fn pow(x: U256, y: i32) -> Result<U256, MathError> {
    if y == 0 {
        return Ok(SCALE);
    }

    let mut invert = y < 0;
    let abs_y = y.unsigned_abs();

    let mut result = U256::ZERO;
    if abs_y < MAX_POW_EXPONENT {
        result = SCALE;
        let mut squared = x;
        if x > U256::from(u128::MAX) {
            squared = U256::MAX / x;
            invert = !invert;
        }

        for bit in 0..20 {
            if abs_y & (1 << bit) != 0 {
                result = result.wrapping_mul(squared) >> SCALE_OFFSET;
            }
            squared = squared.wrapping_mul(squared) >> SCALE_OFFSET;
        }
    }

    if result.is_zero() {
        return Err(MathError::PowUnderflow { exponent: y });
    }

    Ok(if invert { U256::MAX / result } else { result })
}

/// Binary logarithm of a 128.128 number as `(is_negative, |log2(x)|)`, the
/// magnitude itself in 128.128 fixed point.
pub fn log2(x: U256) -> Result<(bool, U256), MathError> {
    if x.is_zero() {
        return Err(MathError::ZeroValue);
    }
    if x == U256::ONE {
        // 2^-128, the smallest representable value
        return Ok((true, U256::from(128u64) << SCALE_OFFSET));
    }

    // Work in 129.127 so that y * y below fits in 256 bits
    let log_scale = U256::ONE << LOG_SCALE_OFFSET;
    let mut x = x >> 1usize;

    let negative = x < log_scale;
    if negative {
        x = (U256::ONE << (2 * LOG_SCALE_OFFSET)) / x;
    }

    let n = most_significant_bit(x >> LOG_SCALE_OFFSET).unwrap_or(0) as usize;
    let mut result = U256::from(n) << LOG_SCALE_OFFSET;
    let mut y = x >> n;

    if y != log_scale {
        let two = U256::ONE << (LOG_SCALE_OFFSET + 1);
        let mut delta = U256::ONE << (LOG_SCALE_OFFSET - 1);
        while !delta.is_zero() {
            y = y.wrapping_mul(y) >> LOG_SCALE_OFFSET;
            if y >= two {
                result += delta;
                y >>= 1usize;
            }
            delta >>= 1usize;
        }
    }

    Ok((negative, result << 1usize))
}

/// Human-readable price with 18 decimal places
pub fn price_to_decimal(price: U256) -> Result<Decimal, MathError> {
    let integer = to_u128(price >> SCALE_OFFSET)?;
    let fraction_mask = SCALE - U256::ONE;
    let fraction = mul_shift_round_down(
        price & fraction_mask,
        U256::from(10u64.pow(DECIMAL_SCALE)),
        SCALE_OFFSET,
    )?;
    let fraction = to_u128(fraction)?;

    let mantissa = integer
        .checked_mul(10u128.pow(DECIMAL_SCALE))
        .and_then(|v| v.checked_add(fraction))
        .and_then(|v| i128::try_from(v).ok())
        .ok_or(MathError::Overflow)?;
    Decimal::try_from_i128_with_scale(mantissa, DECIMAL_SCALE).map_err(|_| MathError::Overflow)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn assert_close(actual: Decimal, expected: Decimal, tolerance: Decimal) {
        assert!(
            (actual - expected).abs() <= tolerance,
            "expected {} within {} of {}",
            actual,
            tolerance,
            expected
        );
    }

    #[test]
    fn test_offset_id_is_unit_price() {
        for bin_step in [1u16, 10, 25, 100] {
            assert_eq!(price_from_id(ID_OFFSET, bin_step).unwrap(), SCALE);
        }
    }

    #[test]
    fn test_adjacent_bins_one_percent_step() {
        let up = price_to_decimal(price_from_id(ID_OFFSET + 1, 100).unwrap()).unwrap();
        assert_close(up, dec!(1.01), dec!(0.000000000001));

        let down = price_to_decimal(price_from_id(ID_OFFSET - 1, 100).unwrap()).unwrap();
        assert_close(down, dec!(0.990099009900990099), dec!(0.000000000001));

        let ten_up = price_to_decimal(price_from_id(ID_OFFSET + 10, 100).unwrap()).unwrap();
        // 1.01^10
        assert_close(ten_up, dec!(1.104622125411204), dec!(0.000000001));
    }

    #[test]
    fn test_price_is_monotonic_in_id() {
        let mut previous = U256::ZERO;
        for id in (ID_OFFSET - 50)..(ID_OFFSET + 50) {
            let price = price_from_id(id, 25).unwrap();
            assert!(price > previous, "price not increasing at id {}", id);
            previous = price;
        }
    }

    #[test]
    fn test_far_ids_underflow() {
        assert!(matches!(
            price_from_id(0, 100),
            Err(MathError::PowUnderflow { .. })
        ));
        assert!(matches!(
            price_from_id(MAX_BIN_ID, 100),
            Err(MathError::PowUnderflow { .. })
        ));
        assert_eq!(
            price_from_id(MAX_BIN_ID + 1, 1),
            Err(MathError::IdOutOfBounds {
                id: (MAX_BIN_ID + 1) as i64
            })
        );
    }

    #[test]
    fn test_id_from_unit_price() {
        for bin_step in [1u16, 20, 100] {
            assert_eq!(id_from_price(SCALE, bin_step).unwrap(), ID_OFFSET);
        }
    }

    #[test]
    fn test_id_from_price_round_trip_within_one_bin() {
        // Exact round trips are not guaranteed at bin edges: truncation of the
        // approximate logarithm can land one bin closer to 2^23.
        for bin_step in [1u16, 15, 100] {
            for delta in [-5_000i64, -731, -2, -1, 1, 2, 731, 5_000] {
                let id = (ID_OFFSET as i64 + delta) as u32;
                let price = price_from_id(id, bin_step).unwrap();
                let recovered = id_from_price(price, bin_step).unwrap() as i64;
                assert!(
                    (recovered - id as i64).abs() <= 1,
                    "bin_step {} id {} recovered {}",
                    bin_step,
                    id,
                    recovered
                );
            }
        }
    }

    #[test]
    fn test_id_from_price_between_bins() {
        // 1.015 sits between bin +1 (1.01) and bin +2 (1.0201) for a 1% step
        let price = SCALE + (SCALE * U256::from(15u64)) / U256::from(1000u64);
        assert_eq!(id_from_price(price, 100).unwrap(), ID_OFFSET + 1);

        // 0.985 sits between bin -1 (0.990) and bin -2 (0.980): truncation toward
        // zero picks -1
        let price = SCALE - (SCALE * U256::from(15u64)) / U256::from(1000u64);
        assert_eq!(id_from_price(price, 100).unwrap(), ID_OFFSET - 1);
    }

    #[test]
    fn test_log2_of_powers_of_two() {
        let (negative, value) = log2(SCALE << 3usize).unwrap();
        assert!(!negative);
        assert_eq!(value, U256::from(3u64) << SCALE_OFFSET);

        let (negative, value) = log2(SCALE >> 2usize).unwrap();
        assert!(negative);
        assert_eq!(value, U256::from(2u64) << SCALE_OFFSET);

        assert_eq!(log2(U256::ZERO), Err(MathError::ZeroValue));
    }

    #[test]
    fn test_smallest_price_maps_far_below_offset() {
        let (negative, value) = log2(U256::ONE).unwrap();
        assert!(negative);
        assert_eq!(value, U256::from(128u64) << SCALE_OFFSET);

        // log_1.01(2^-128) = -8916.57, log_1.01(2^-127) = -8846.91
        assert_eq!(id_from_price(U256::ONE, 100).unwrap(), ID_OFFSET - 8916);
        assert_eq!(id_from_price(U256::from(2u64), 100).unwrap(), ID_OFFSET - 8846);
    }

    #[test]
    fn test_pow_matches_repeated_multiplication() {
        let b = base(50);
        let mut expected = SCALE;
        for _ in 0..7 {
            expected = (expected * b) >> SCALE_OFFSET;
        }
        let actual = pow(b, 7).unwrap();
        let diff = if actual > expected {
            actual - expected
        } else {
            expected - actual
        };
        // Both paths round at every step; they agree to a few ulps
        assert!(diff < U256::from(1_000_000u64), "diff {}", diff);
    }
}
