//! Flash loans
//!
//! The pair lends from custody, hands control to the receiver and checks on
//! return that custody grew by at least the flash loan fee. The receiver gets
//! `&mut LbPair`, so it can read state and repay through the vault, but every
//! state-changing pair call it makes is rejected by the reentrancy guard.

use super::{Interaction, LbPair};
use crate::error::PairError;
use crate::ledger::ShareLedger;
use crate::vault::TokenVault;
use tracing::{debug, info};
use types::fixed_point::{mul_div_round_up, to_u128, PRECISION};
use types::{Address, Amounts, MathError, TokenSide, U256};

/// Callback target of a flash loan
pub trait FlashLoanReceiver<L: ShareLedger, V: TokenVault> {
    /// Account the loan is paid to
    fn address(&self) -> Address;

    /// Called with the borrowed `amounts` already transferred. Must return
    /// `amounts + fees` to the pair's vault before returning.
    fn on_flash_loan(
        &mut self,
        pair: &mut LbPair<L, V>,
        sender: Address,
        amounts: Amounts,
        fees: Amounts,
        data: &[u8],
    ) -> anyhow::Result<()>;
}

impl<L: ShareLedger, V: TokenVault> LbPair<L, V> {
    /// Lend `amounts` to `receiver` for the duration of its callback.
    ///
    /// Returns the fees collected, which may exceed the required fee if the
    /// receiver paid back more.
    pub fn flash_loan<R: FlashLoanReceiver<L, V>>(
        &mut self,
        sender: Address,
        receiver: &mut R,
        amounts: Amounts,
        data: &[u8],
    ) -> Result<Amounts, PairError> {
        self.execute("flash_loan", |pair| {
            pair.flash_loan_inner(sender, receiver, amounts, data)
        })
    }

    fn flash_loan_inner<R: FlashLoanReceiver<L, V>>(
        &mut self,
        sender: Address,
        receiver: &mut R,
        amounts: Amounts,
        data: &[u8],
    ) -> Result<Amounts, PairError> {
        if amounts.is_zero() {
            return Err(PairError::ZeroBorrowAmount);
        }

        let fees = Amounts::new(
            self.flash_loan_fee_for(amounts.x)?,
            self.flash_loan_fee_for(amounts.y)?,
        );
        let receiver_address = receiver.address();
        let before = self.vault.balances();

        self.pay(receiver_address, amounts)?;
        let callback = receiver.on_flash_loan(self, sender, amounts, fees, data);

        // Whatever came back is returned to the receiver if the loan unwinds
        let after = self.vault.balances();
        let returned = after
            .checked_add(amounts)
            .ok_or(MathError::Overflow)?
            .saturating_sub(before);
        if !returned.is_zero() {
            self.interactions.push(Interaction::Returned {
                from: receiver_address,
                amounts: returned,
            });
        }

        callback.map_err(|err| PairError::FlashLoanCallback(format!("{err:#}")))?;

        for side in [TokenSide::X, TokenSide::Y] {
            let required = before
                .get(side)
                .checked_add(fees.get(side))
                .ok_or(MathError::Overflow)?;
            if after.get(side) < required {
                return Err(PairError::FlashLoanInsufficientAmount {
                    side,
                    balance: after.get(side),
                    required,
                });
            }
        }

        let collected = after.saturating_sub(before);
        let active_id = self.state.active_id;
        let mut bin = self.get_bin(active_id);
        let total_supply = self.ledger.total_supply(active_id);
        for side in [TokenSide::X, TokenSide::Y] {
            let fee = collected.get(side);
            if fee == 0 {
                continue;
            }
            let distribution = self.fee_parameters.distribute(fee)?;
            self.credit_fees(&mut bin, side, distribution, total_supply)?;
            debug!(id = active_id, ?side, fee, "Flash loan fee credited");
        }
        self.store_bin(active_id, bin);

        info!(
            %sender,
            receiver = %receiver_address,
            x = amounts.x,
            y = amounts.y,
            fee_x = collected.x,
            fee_y = collected.y,
            "Flash loan repaid"
        );

        Ok(collected)
    }

    fn flash_loan_fee_for(&self, amount: u128) -> Result<u128, MathError> {
        to_u128(mul_div_round_up(
            U256::from(amount),
            U256::from(self.flash_loan_fee),
            U256::from(PRECISION),
        )?)
    }
}
