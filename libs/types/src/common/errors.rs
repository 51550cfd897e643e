//! Error types for fixed-point arithmetic and bin id validation
//!
//! Every arithmetic helper in this crate is checked: results that do not fit
//! their destination width are reported instead of being silently truncated.

use thiserror::Error;

/// Errors that can occur during wide-integer and fixed-point arithmetic
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum MathError {
    /// Result exceeds the destination type
    #[error("Math error - overflow")]
    Overflow,

    /// Result is below zero for an unsigned destination
    #[error("Math error - underflow")]
    Underflow,

    /// Division by zero in fixed-point arithmetic
    #[error("Math error - division by zero")]
    DivisionByZero,

    /// Bit scan or logarithm of zero
    #[error("Math error - zero input value")]
    ZeroValue,

    /// Bin id outside the 24-bit id space
    #[error("Bin id {id} is outside the 24-bit id space")]
    IdOutOfBounds { id: i64 },

    /// Exponentiation result collapsed to zero or the exponent is too large
    #[error("Power underflow for exponent {exponent}")]
    PowUnderflow { exponent: i32 },
}
