//! LP fee claims, protocol fee collection and share transfers

use super::LbPair;
use crate::error::PairError;
use crate::ledger::ShareLedger;
use crate::vault::TokenVault;
use std::collections::BTreeSet;
use tracing::info;
use types::{Address, Amounts, MathError};

impl<L: ShareLedger, V: TokenVault> LbPair<L, V> {
    /// Fees `account` could claim from `ids`, plus fees already parked for it
    pub fn pending_fees(&self, account: Address, ids: &[u32]) -> Result<Amounts, PairError> {
        let ids: BTreeSet<u32> = ids.iter().copied().collect();
        let mut total = self.fee_ledger.unclaimed(account);

        for id in ids {
            let balance = self.ledger.balance_of(account, id);
            if balance == 0 {
                continue;
            }
            let pending = self
                .fee_ledger
                .pending(account, id, &self.get_bin(id), balance)?;
            total = total.checked_add(pending).ok_or(MathError::Overflow)?;
        }
        Ok(total)
    }

    /// Pay `account` its fees from `ids` and its parked fees.
    pub fn collect_fees(&mut self, account: Address, ids: &[u32]) -> Result<Amounts, PairError> {
        self.execute("collect_fees", |pair| {
            let ids: BTreeSet<u32> = ids.iter().copied().collect();
            let mut amounts = pair.fee_ledger.take_unclaimed(account);

            for id in ids {
                let balance = pair.ledger.balance_of(account, id);
                if balance == 0 {
                    continue;
                }
                let bin = pair.get_bin(id);
                let pending = pair.fee_ledger.settle(account, id, &bin, balance)?;
                amounts = amounts.checked_add(pending).ok_or(MathError::Overflow)?;
            }

            pair.state.fees.total = pair
                .state
                .fees
                .total
                .checked_sub(amounts)
                .ok_or(MathError::Underflow)?;
            pair.pay(account, amounts)?;

            info!(%account, x = amounts.x, y = amounts.y, "Fees collected");
            Ok(amounts)
        })
    }

    /// Pay the accrued protocol fees to the fee recipient.
    pub fn collect_protocol_fees(&mut self, caller: Address) -> Result<Amounts, PairError> {
        self.execute("collect_protocol_fees", |pair| {
            if caller != pair.roles.protocol_fee_recipient {
                return Err(PairError::AccessDenied { caller });
            }

            let amounts = pair.state.fees.protocol;
            pair.state.fees.total = pair
                .state
                .fees
                .total
                .checked_sub(amounts)
                .ok_or(MathError::Underflow)?;
            pair.state.fees.protocol = Amounts::ZERO;
            pair.pay(caller, amounts)?;

            info!(recipient = %caller, x = amounts.x, y = amounts.y, "Protocol fees collected");
            Ok(amounts)
        })
    }

    /// Move shares between accounts, settling both sides' fees first.
    pub fn transfer_shares(
        &mut self,
        from: Address,
        to: Address,
        id: u32,
        amount: u128,
    ) -> Result<(), PairError> {
        self.execute("transfer_shares", |pair| {
            pair.move_shares(from, to, id, amount)
        })
    }

    /// Settle fees ahead of a share movement made directly on the ledger.
    ///
    /// Ledgers that move shares without going through the pair must call
    /// this before changing any balance. `from` is `None` for a mint and
    /// `to` is `None` for a burn.
    pub fn on_before_transfer(
        &mut self,
        from: Option<Address>,
        to: Option<Address>,
        id: u32,
        amount: u128,
    ) -> Result<(), PairError> {
        self.execute("on_before_transfer", |pair| {
            pair.cache_transfer_fees(from, to, id, amount)
        })
    }
}
