//! Default values for pair configuration
//!
//! Used when a pair configuration file omits the optional sections.

/// Oracle defaults
pub mod oracle {
    /// Minimum seconds between two written oracle samples
    pub const DEFAULT_SAMPLE_LIFETIME: u16 = 120;

    /// Slots allocated at pair creation
    pub const DEFAULT_ORACLE_LENGTH: u16 = 2;
}

/// Flash loan defaults
pub mod flash_loan {
    /// 0.05% in 1e18 fixed point
    pub const DEFAULT_FLASH_LOAN_FEE: u64 = 500_000_000_000_000;
}

/// Configuration file locations
pub mod paths {
    /// Pair configuration loaded when no path is given
    pub const DEFAULT_PAIR_CONFIG: &str = "config/pair.toml";

    /// Directory (relative to the base file) holding per-environment overlays
    pub const ENVIRONMENTS_DIR: &str = "environments";

    /// Prefix of environment variable overrides, e.g. `LB__FEE__BASE_FACTOR`
    pub const ENV_PREFIX: &str = "LB";

    /// Separator between prefix and nested keys
    pub const ENV_SEPARATOR: &str = "__";
}
