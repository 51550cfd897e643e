//! Configuration validation errors

use thiserror::Error;

/// Reasons a fee preset or pair configuration is rejected
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Bin step outside `[MIN_BIN_STEP, MAX_BIN_STEP]`
    #[error("Bin step {bin_step} out of range [{min}, {max}]")]
    BinStepOutOfRange { bin_step: u16, min: u16, max: u16 },

    /// Filter period must be strictly below the decay period
    #[error("Filter period {filter_period} must be lower than decay period {decay_period}")]
    InvalidPeriods {
        filter_period: u16,
        decay_period: u16,
    },

    /// A packed field exceeds its storage width or protocol cap
    #[error("{field} = {value} exceeds maximum {max}")]
    ValueTooLarge {
        field: &'static str,
        value: u64,
        max: u64,
    },

    /// Base fee plus the variable fee at maximum volatility exceeds the cap
    #[error("Maximum total fee {fee} exceeds cap {max}")]
    FeeTooHigh { fee: u128, max: u128 },

    /// Both sides of the pair are the same token
    #[error("Token X and token Y must differ")]
    IdenticalTokens,

    /// A required address is the zero address
    #[error("{field} must not be the zero address")]
    ZeroAddress { field: &'static str },

    /// Initial active id outside the 24-bit id space
    #[error("Active id {id} outside the bin id space")]
    ActiveIdOutOfRange { id: u32 },

    /// Oracle length of zero
    #[error("Oracle length must be at least 1, got {length}")]
    InvalidOracleLength { length: u16 },

    /// No built-in preset for this bin step
    #[error("No standard fee preset for bin step {bin_step}")]
    PresetNotFound { bin_step: u16 },

    /// TOML could not be parsed into a configuration
    #[error("Failed to parse configuration: {0}")]
    Parse(String),

    /// Configuration could not be rendered as TOML
    #[error("Failed to serialize configuration: {0}")]
    Serialize(String),
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::Parse(err.to_string())
    }
}

impl From<toml::ser::Error> for ConfigError {
    fn from(err: toml::ser::Error) -> Self {
        ConfigError::Serialize(err.to_string())
    }
}
