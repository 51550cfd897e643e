//! Fee presets
//!
//! A preset is the static half of a pair's fee parameters. The registry picks
//! one per bin step; the engine copies it into its runtime fee parameters and
//! never mutates it except through an owner-only update.

use crate::error::ConfigError;
use crate::protocol::{bin_step, fees, widths};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Multiplier turning `base_factor * bin_step` into a 1e18 fee rate
const BASE_FEE_MULTIPLIER: u128 = 10_000_000_000;

/// Static fee configuration of a pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeePreset {
    /// Price increment between adjacent bins, in basis points
    pub bin_step: u16,
    pub base_factor: u16,
    /// Seconds of inactivity before the volatility reference is refreshed
    pub filter_period: u16,
    /// Seconds of inactivity after which volatility is forgotten entirely
    pub decay_period: u16,
    /// Share of the accumulator kept as reference, in basis points
    pub reduction_factor: u16,
    pub variable_fee_control: u32,
    /// Protocol share of every swap fee, in basis points
    pub protocol_share: u16,
    pub max_volatility_accumulator: u32,
}

impl FeePreset {
    /// Base fee rate, `base_factor * bin_step * 1e10` (1e18 fixed point)
    pub fn base_fee(&self) -> u128 {
        self.base_factor as u128 * self.bin_step as u128 * BASE_FEE_MULTIPLIER
    }

    /// Variable fee rate reached at `max_volatility_accumulator`
    pub fn max_variable_fee(&self) -> u128 {
        let prod = self.max_volatility_accumulator as u128 * self.bin_step as u128;
        (self.variable_fee_control as u128 * prod * prod).div_ceil(100)
    }

    /// Check every bound a preset must satisfy before reaching a pair
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(bin_step::MIN_BIN_STEP..=bin_step::MAX_BIN_STEP).contains(&self.bin_step) {
            return Err(ConfigError::BinStepOutOfRange {
                bin_step: self.bin_step,
                min: bin_step::MIN_BIN_STEP,
                max: bin_step::MAX_BIN_STEP,
            });
        }

        if self.filter_period >= self.decay_period {
            return Err(ConfigError::InvalidPeriods {
                filter_period: self.filter_period,
                decay_period: self.decay_period,
            });
        }

        check_max("decay_period", self.decay_period as u64, widths::MAX_DECAY_PERIOD as u64)?;
        check_max(
            "reduction_factor",
            self.reduction_factor as u64,
            fees::MAX_REDUCTION_FACTOR as u64,
        )?;
        check_max(
            "variable_fee_control",
            self.variable_fee_control as u64,
            widths::MAX_VARIABLE_FEE_CONTROL as u64,
        )?;
        check_max(
            "protocol_share",
            self.protocol_share as u64,
            fees::MAX_PROTOCOL_SHARE as u64,
        )?;
        check_max(
            "max_volatility_accumulator",
            self.max_volatility_accumulator as u64,
            widths::MAX_VOLATILITY_ACCUMULATOR as u64,
        )?;

        let max_fee = self.base_fee() + self.max_variable_fee();
        if max_fee > fees::MAX_FEE {
            return Err(ConfigError::FeeTooHigh {
                fee: max_fee,
                max: fees::MAX_FEE,
            });
        }

        Ok(())
    }

    /// Built-in preset for a bin step, if one exists
    pub fn standard(bin_step: u16) -> Result<FeePreset, ConfigError> {
        STANDARD_PRESETS
            .get(&bin_step)
            .copied()
            .ok_or(ConfigError::PresetNotFound { bin_step })
    }

    /// Bin steps that have a built-in preset, ascending
    pub fn standard_bin_steps() -> Vec<u16> {
        let mut steps: Vec<u16> = STANDARD_PRESETS.keys().copied().collect();
        steps.sort_unstable();
        steps
    }
}

fn check_max(field: &'static str, value: u64, max: u64) -> Result<(), ConfigError> {
    if value > max {
        return Err(ConfigError::ValueTooLarge { field, value, max });
    }
    Ok(())
}

/// (bin_step, base_factor, filter, decay, reduction, variable_fee_control, max_va)
const PRESET_TABLE: [(u16, u16, u16, u16, u16, u32, u32); 7] = [
    (1, 20_000, 10, 120, 5_000, 2_000_000, 100_000),
    (5, 8_000, 30, 600, 5_000, 120_000, 300_000),
    (10, 10_000, 30, 600, 5_000, 40_000, 350_000),
    (15, 10_000, 30, 600, 5_000, 30_000, 350_000),
    (20, 10_000, 30, 600, 5_000, 20_000, 350_000),
    (25, 10_000, 30, 600, 5_000, 15_000, 350_000),
    (100, 8_000, 30, 600, 5_000, 1_000, 350_000),
];

/// Protocol share applied to every standard preset (10%)
const STANDARD_PROTOCOL_SHARE: u16 = 1_000;

static STANDARD_PRESETS: Lazy<HashMap<u16, FeePreset>> = Lazy::new(|| {
    PRESET_TABLE
        .iter()
        .map(|&(bin_step, base_factor, filter, decay, reduction, vfc, max_va)| {
            (
                bin_step,
                FeePreset {
                    bin_step,
                    base_factor,
                    filter_period: filter,
                    decay_period: decay,
                    reduction_factor: reduction,
                    variable_fee_control: vfc,
                    protocol_share: STANDARD_PROTOCOL_SHARE,
                    max_volatility_accumulator: max_va,
                },
            )
        })
        .collect()
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_presets_are_valid() {
        for step in FeePreset::standard_bin_steps() {
            let preset = FeePreset::standard(step).unwrap();
            assert_eq!(preset.bin_step, step);
            preset
                .validate()
                .unwrap_or_else(|e| panic!("preset {} invalid: {}", step, e));
        }
    }

    #[test]
    fn test_base_fee_one_percent_bin() {
        let preset = FeePreset::standard(100).unwrap();
        // 8_000 * 100 * 1e10 = 0.8%
        assert_eq!(preset.base_fee(), 8_000_000_000_000_000);
    }

    #[test]
    fn test_unknown_preset() {
        assert_eq!(
            FeePreset::standard(7),
            Err(ConfigError::PresetNotFound { bin_step: 7 })
        );
    }

    #[test]
    fn test_rejects_bad_periods() {
        let mut preset = FeePreset::standard(25).unwrap();
        preset.filter_period = preset.decay_period;
        assert!(matches!(
            preset.validate(),
            Err(ConfigError::InvalidPeriods { .. })
        ));
    }

    #[test]
    fn test_rejects_bin_step_out_of_range() {
        let mut preset = FeePreset::standard(100).unwrap();
        preset.bin_step = 101;
        assert!(matches!(
            preset.validate(),
            Err(ConfigError::BinStepOutOfRange { bin_step: 101, .. })
        ));
        preset.bin_step = 0;
        assert!(matches!(
            preset.validate(),
            Err(ConfigError::BinStepOutOfRange { bin_step: 0, .. })
        ));
    }

    #[test]
    fn test_rejects_field_widths_and_caps() {
        let mut preset = FeePreset::standard(20).unwrap();
        preset.protocol_share = 2_501;
        assert!(matches!(
            preset.validate(),
            Err(ConfigError::ValueTooLarge { field: "protocol_share", .. })
        ));

        let mut preset = FeePreset::standard(20).unwrap();
        preset.max_volatility_accumulator = 1 << 20;
        assert!(matches!(
            preset.validate(),
            Err(ConfigError::ValueTooLarge { field: "max_volatility_accumulator", .. })
        ));
    }

    #[test]
    fn test_rejects_total_fee_above_cap() {
        let mut preset = FeePreset::standard(100).unwrap();
        preset.variable_fee_control = 1_000_000;
        assert!(matches!(preset.validate(), Err(ConfigError::FeeTooHigh { .. })));
    }
}
