//! # Liquidity Book Pair Configuration
//!
//! Constants, fee presets and pair configuration loading for the pair engine.
//!
//! ## Features
//!
//! - **Protocol Bounds**: bin step range, fee caps, packed field widths
//! - **Fee Presets**: standard static fee parameters per bin step
//! - **Pair Configuration**: TOML files with environment overlays and
//!   `LB__` environment variable overrides, validated before use
//!
//! ## Usage
//!
//! ```rust
//! use lb_config::{protocol, FeePreset};
//!
//! let preset = FeePreset::standard(25).unwrap();
//! assert!(preset.validate().is_ok());
//! assert!(preset.bin_step <= protocol::bin_step::MAX_BIN_STEP);
//! ```

pub mod defaults;
pub mod error;
pub mod pair_config;
pub mod preset;
pub mod protocol;

// Re-export commonly used types
pub use error::ConfigError;
pub use pair_config::{load_pair_config, OracleSettings, PairConfig, PairRoles};
pub use preset::FeePreset;
