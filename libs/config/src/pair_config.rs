//! Pair Configuration Module
//!
//! Parameters a registry hands to a pair at creation. Loaded from a TOML file,
//! layered with an optional per-environment overlay and `LB__`-prefixed
//! environment variables, then validated.

use crate::defaults::{flash_loan, oracle as oracle_defaults, paths};
use crate::error::ConfigError;
use crate::preset::FeePreset;
use crate::protocol::{fees, oracle as oracle_bounds};
use anyhow::{Context, Result};
use config_crate::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use types::{Address, MAX_BIN_ID};

/// Everything needed to initialize one pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairConfig {
    pub token_x: Address,
    pub token_y: Address,

    /// Bin id the pair starts trading at
    pub active_id: u32,

    /// Static fee parameters
    pub fee: FeePreset,

    #[serde(default)]
    pub oracle: OracleSettings,

    pub roles: PairRoles,

    /// Flash loan fee (1e18 fixed point)
    #[serde(default = "default_flash_loan_fee")]
    pub flash_loan_fee: u64,
}

/// Oracle bookkeeping set at creation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OracleSettings {
    /// Minimum seconds between two written samples
    pub sample_lifetime: u16,
    /// Slots allocated at creation
    pub initial_length: u16,
}

/// Accounts with privileged access to the pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairRoles {
    /// Registry owner: may force decay and update fee parameters
    pub owner: Address,
    /// Only account allowed to collect protocol fees
    pub protocol_fee_recipient: Address,
}

impl Default for OracleSettings {
    fn default() -> Self {
        Self {
            sample_lifetime: oracle_defaults::DEFAULT_SAMPLE_LIFETIME,
            initial_length: oracle_defaults::DEFAULT_ORACLE_LENGTH,
        }
    }
}

fn default_flash_loan_fee() -> u64 {
    flash_loan::DEFAULT_FLASH_LOAN_FEE
}

impl PairConfig {
    /// Build a configuration around a standard preset
    pub fn with_standard_preset(
        token_x: Address,
        token_y: Address,
        bin_step: u16,
        active_id: u32,
        roles: PairRoles,
    ) -> Result<Self, ConfigError> {
        let config = Self {
            token_x,
            token_y,
            active_id,
            fee: FeePreset::standard(bin_step)?,
            oracle: OracleSettings::default(),
            roles,
            flash_loan_fee: default_flash_loan_fee(),
        };
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a file with environment overrides
    pub fn load(base_path: Option<&Path>, environment: Option<&str>) -> Result<Self> {
        let base = match base_path {
            Some(path) => expand_path(path)?,
            None => PathBuf::from(paths::DEFAULT_PAIR_CONFIG),
        };
        debug!("Loading pair config: {:?}", base);

        let mut builder = Config::builder().add_source(File::from(base.as_path()).required(true));

        // Add environment-specific overrides if specified
        if let Some(env) = environment {
            let env_file = base
                .parent()
                .unwrap_or_else(|| Path::new("."))
                .join(paths::ENVIRONMENTS_DIR)
                .join(format!("{}.toml", env));

            if env_file.exists() {
                info!("Loading environment config: {:?}", env_file);
                builder = builder.add_source(File::from(env_file));
            } else {
                warn!("Environment config not found: {:?}", env_file);
            }
        }

        // Override with environment variables (LB__ prefix, nested with __)
        builder = builder.add_source(
            Environment::with_prefix(paths::ENV_PREFIX)
                .prefix_separator(paths::ENV_SEPARATOR)
                .separator(paths::ENV_SEPARATOR)
                .try_parsing(true),
        );

        let config: PairConfig = builder
            .build()
            .context("Failed to build configuration")?
            .try_deserialize()
            .context("Failed to deserialize configuration")?;

        config
            .validate()
            .with_context(|| format!("Invalid pair configuration in {:?}", base))?;

        info!(
            bin_step = config.fee.bin_step,
            active_id = config.active_id,
            "Loaded pair configuration"
        );
        Ok(config)
    }

    /// Parse and validate a TOML document
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: PairConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Render as TOML
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Check every bound the engine relies on
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.fee.validate()?;

        if self.token_x == self.token_y {
            return Err(ConfigError::IdenticalTokens);
        }
        if self.token_x == Address::ZERO {
            return Err(ConfigError::ZeroAddress { field: "token_x" });
        }
        if self.token_y == Address::ZERO {
            return Err(ConfigError::ZeroAddress { field: "token_y" });
        }
        if self.roles.owner == Address::ZERO {
            return Err(ConfigError::ZeroAddress { field: "owner" });
        }

        if self.active_id > MAX_BIN_ID {
            return Err(ConfigError::ActiveIdOutOfRange { id: self.active_id });
        }

        if self.oracle.initial_length == 0 {
            return Err(ConfigError::InvalidOracleLength {
                length: self.oracle.initial_length,
            });
        }
        if self.oracle.initial_length > oracle_bounds::MAX_ORACLE_LENGTH {
            return Err(ConfigError::ValueTooLarge {
                field: "oracle.initial_length",
                value: self.oracle.initial_length as u64,
                max: oracle_bounds::MAX_ORACLE_LENGTH as u64,
            });
        }

        if self.flash_loan_fee > fees::MAX_FLASH_LOAN_FEE {
            return Err(ConfigError::ValueTooLarge {
                field: "flash_loan_fee",
                value: self.flash_loan_fee,
                max: fees::MAX_FLASH_LOAN_FEE,
            });
        }

        Ok(())
    }
}

/// Expand `~` and `$VAR` in a configuration path
fn expand_path(path: &Path) -> Result<PathBuf> {
    let raw = path.to_string_lossy();
    let expanded = shellexpand::full(&raw).context("Failed to expand config path")?;
    Ok(PathBuf::from(expanded.as_ref()))
}

/// Convenience function to load configuration from the default location
pub fn load_pair_config(environment: Option<&str>) -> Result<PairConfig> {
    PairConfig::load(None, environment)
}
