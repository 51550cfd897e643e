//! Protocol bounds
//!
//! Hard limits enforced when a fee preset or pair configuration is accepted.
//! Field widths mirror the packed storage of the fee parameters: periods are
//! 12-bit, the variable fee control 24-bit and the volatility accumulator
//! 20-bit.

/// Bin step limits (basis points)
pub mod bin_step {
    /// Smallest bin step (0.01% per bin)
    pub const MIN_BIN_STEP: u16 = 1;

    /// Largest bin step (1% per bin)
    pub const MAX_BIN_STEP: u16 = 100;
}

/// Fee limits (1e18 fixed point)
pub mod fees {
    /// Total swap fee cap at maximum volatility: 10%
    pub const MAX_FEE: u128 = 100_000_000_000_000_000;

    /// Flash loan fee cap: 10%
    pub const MAX_FLASH_LOAN_FEE: u64 = 100_000_000_000_000_000;

    /// Protocol share of swap fees, in basis points (25%)
    pub const MAX_PROTOCOL_SHARE: u16 = 2_500;

    /// Reduction factor denominator; the factor itself may not exceed it
    pub const MAX_REDUCTION_FACTOR: u16 = 10_000;
}

/// Packed field widths of the volatility parameters
pub mod widths {
    /// Filter period upper bound (12 bits, seconds)
    pub const MAX_FILTER_PERIOD: u16 = (1 << 12) - 1;

    /// Decay period upper bound (12 bits, seconds)
    pub const MAX_DECAY_PERIOD: u16 = (1 << 12) - 1;

    /// Variable fee control upper bound (24 bits)
    pub const MAX_VARIABLE_FEE_CONTROL: u32 = (1 << 24) - 1;

    /// Volatility accumulator upper bound (20 bits)
    pub const MAX_VOLATILITY_ACCUMULATOR: u32 = (1 << 20) - 1;
}

/// Oracle limits
pub mod oracle {
    /// Largest number of oracle slots a pair may allocate
    pub const MAX_ORACLE_LENGTH: u16 = u16::MAX;
}
