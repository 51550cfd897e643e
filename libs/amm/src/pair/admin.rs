//! Owner operations and oracle maintenance

use super::LbPair;
use crate::error::PairError;
use crate::ledger::ShareLedger;
use crate::vault::TokenVault;
use lb_config::FeePreset;
use tracing::info;
use types::Address;

impl<L: ShareLedger, V: TokenVault> LbPair<L, V> {
    /// Decay the volatility reference and re-anchor it at the active id.
    pub fn force_decay(&mut self, caller: Address) -> Result<(), PairError> {
        self.execute("force_decay", |pair| {
            pair.ensure_owner(caller)?;
            let active_id = pair.state.active_id;
            pair.fee_parameters.force_decay(active_id);
            info!(
                active_id,
                volatility_reference = pair.fee_parameters.volatility_reference,
                "Volatility decayed"
            );
            Ok(())
        })
    }

    /// Replace the static fee parameters. The bin step cannot change.
    pub fn set_fee_parameters(
        &mut self,
        caller: Address,
        preset: FeePreset,
    ) -> Result<(), PairError> {
        self.execute("set_fee_parameters", |pair| {
            pair.ensure_owner(caller)?;
            preset.validate()?;
            if preset.bin_step != pair.fee_parameters.bin_step {
                return Err(PairError::InvalidInput("bin step is immutable"));
            }
            pair.fee_parameters.set_static(&preset);
            info!(
                base_factor = preset.base_factor,
                variable_fee_control = preset.variable_fee_control,
                protocol_share = preset.protocol_share,
                "Fee parameters updated"
            );
            Ok(())
        })
    }

    /// Grow the oracle ring to `new_length` slots.
    pub fn increase_oracle_length(&mut self, new_length: u16) -> Result<(), PairError> {
        self.execute("increase_oracle_length", |pair| {
            pair.oracle.increase_length(new_length)?;
            info!(new_length, "Oracle length increased");
            Ok(())
        })
    }
}
