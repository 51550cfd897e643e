//! Volatility accumulator and dynamic fees
//!
//! The swap fee is `base_fee + variable_fee`. The variable part grows with
//! the number of bins the price has crossed recently, tracked by the
//! volatility accumulator:
//!
//! - at the start of every swap the references are refreshed: after
//!   `filter_period` seconds of quiet the index reference snaps to the active
//!   id and the volatility reference becomes a reduced copy of the
//!   accumulator; after `decay_period` seconds it is forgotten entirely
//! - every bin visited by the swap sets the accumulator to
//!   `volatility_reference + |active_id - index_reference| * 10_000`, capped at
//!   `max_volatility_accumulator`
//!
//! All fee rates are 1e18 fixed point.

use lb_config::FeePreset;
use serde::{Deserialize, Serialize};
use types::fixed_point::{
    mul_div_round_down, mul_div_round_up, to_u128, BASIS_POINT_MAX, PRECISION, SQUARED_PRECISION,
};
use types::{MathError, U256};

const BASE_FEE_MULTIPLIER: u128 = 10_000_000_000;

/// Fee split between the protocol and liquidity providers
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeDistribution {
    pub total: u128,
    pub protocol: u128,
}

impl FeeDistribution {
    pub fn lp(&self) -> u128 {
        self.total - self.protocol
    }
}

/// Static and runtime fee parameters of a pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeParameters {
    pub bin_step: u16,
    pub base_factor: u16,
    pub filter_period: u16,
    pub decay_period: u16,
    pub reduction_factor: u16,
    pub variable_fee_control: u32,
    pub protocol_share: u16,
    pub max_volatility_accumulator: u32,

    pub volatility_accumulator: u32,
    pub volatility_reference: u32,
    pub index_reference: u32,
    pub last_update_time: u64,
}

impl FeeParameters {
    pub fn new(preset: &FeePreset, active_id: u32) -> Self {
        Self {
            bin_step: preset.bin_step,
            base_factor: preset.base_factor,
            filter_period: preset.filter_period,
            decay_period: preset.decay_period,
            reduction_factor: preset.reduction_factor,
            variable_fee_control: preset.variable_fee_control,
            protocol_share: preset.protocol_share,
            max_volatility_accumulator: preset.max_volatility_accumulator,
            volatility_accumulator: 0,
            volatility_reference: 0,
            index_reference: active_id,
            last_update_time: 0,
        }
    }

    /// Replace the static half, keeping the runtime state
    pub fn set_static(&mut self, preset: &FeePreset) {
        let runtime = *self;
        *self = Self::new(preset, runtime.index_reference);
        self.volatility_accumulator = runtime
            .volatility_accumulator
            .min(preset.max_volatility_accumulator);
        self.volatility_reference = runtime.volatility_reference;
        self.last_update_time = runtime.last_update_time;
    }

    pub fn static_preset(&self) -> FeePreset {
        FeePreset {
            bin_step: self.bin_step,
            base_factor: self.base_factor,
            filter_period: self.filter_period,
            decay_period: self.decay_period,
            reduction_factor: self.reduction_factor,
            variable_fee_control: self.variable_fee_control,
            protocol_share: self.protocol_share,
            max_volatility_accumulator: self.max_volatility_accumulator,
        }
    }

    /// Refresh the references at the start of a swap.
    pub fn update_references(&mut self, active_id: u32, now: u64) {
        let elapsed = now.saturating_sub(self.last_update_time);

        if elapsed >= self.filter_period as u64 || self.last_update_time == 0 {
            self.index_reference = active_id;
            self.volatility_reference = if elapsed < self.decay_period as u64 {
                (self.volatility_accumulator as u64 * self.reduction_factor as u64
                    / BASIS_POINT_MAX as u64) as u32
            } else {
                0
            };
        }

        self.last_update_time = now;
    }

    /// Recompute the accumulator for a bin visited by the current swap.
    pub fn update_volatility_accumulator(&mut self, active_id: u32) {
        let delta_id = active_id.abs_diff(self.index_reference) as u64;
        let accumulator = self.volatility_reference as u64 + delta_id * BASIS_POINT_MAX as u64;
        self.volatility_accumulator =
            accumulator.min(self.max_volatility_accumulator as u64) as u32;
    }

    /// Both updates at once, as done for a deposit into the active bin
    pub fn update_volatility_parameters(&mut self, active_id: u32, now: u64) {
        self.update_references(active_id, now);
        self.update_volatility_accumulator(active_id);
    }

    /// Cool the reference down without a swap.
    pub fn force_decay(&mut self, active_id: u32) {
        self.volatility_reference = (self.volatility_reference as u64
            * self.reduction_factor as u64
            / BASIS_POINT_MAX as u64) as u32;
        self.index_reference = active_id;
    }

    pub fn base_fee(&self) -> u128 {
        self.base_factor as u128 * self.bin_step as u128 * BASE_FEE_MULTIPLIER
    }

    pub fn variable_fee(&self) -> u128 {
        if self.variable_fee_control == 0 {
            return 0;
        }
        // 20-bit accumulator times a bin step below 2^7 squares to < 2^54
        let prod = self.volatility_accumulator as u128 * self.bin_step as u128;
        (prod * prod * self.variable_fee_control as u128).div_ceil(100)
    }

    pub fn total_fee(&self) -> u128 {
        self.base_fee() + self.variable_fee()
    }

    /// Fee to charge on top of a net `amount`
    pub fn fee_amount(&self, amount: u128) -> Result<u128, MathError> {
        let fee = mul_div_round_up(
            U256::from(amount),
            U256::from(self.total_fee()),
            U256::from(PRECISION),
        )?;
        to_u128(fee)
    }

    /// Fee contained in a gross `amount_with_fees`
    pub fn fee_amount_from(&self, amount_with_fees: u128) -> Result<u128, MathError> {
        let total_fee = self.total_fee();
        let fee = mul_div_round_up(
            U256::from(amount_with_fees),
            U256::from(total_fee),
            U256::from(PRECISION + total_fee),
        )?;
        to_u128(fee)
    }

    /// Fee charged on the unbalanced part of an active bin deposit
    pub fn composition_fee(&self, amount: u128) -> Result<u128, MathError> {
        let total_fee = U256::from(self.total_fee());
        let rate = total_fee * (total_fee + U256::from(PRECISION));
        let fee = mul_div_round_up(U256::from(amount), rate, U256::from(SQUARED_PRECISION))?;
        to_u128(fee)
    }

    /// Split a fee into its protocol and LP parts
    pub fn distribute(&self, fee: u128) -> Result<FeeDistribution, MathError> {
        let protocol = mul_div_round_down(
            U256::from(fee),
            U256::from(self.protocol_share),
            U256::from(BASIS_POINT_MAX),
        )?;
        Ok(FeeDistribution {
            total: fee,
            protocol: to_u128(protocol)?,
        })
    }
}
