//! Fee-per-share accounting
//!
//! Every bin carries an accumulator of LP fees earned per share (128.128).
//! An account's share of the fees is `balance * acc / 2^128` minus a debt
//! snapshot taken the last time its balance changed or it claimed. Before any
//! balance change the pending amount is computed against the old balance and
//! parked in the account's unclaimed bucket; the debt is then reset against
//! the new balance. This keeps fee attribution tied to the balance actually
//! held while the fees accrued.

use crate::journal::Journaled;
use crate::pair::Bin;
use serde::{Deserialize, Serialize};
use types::fixed_point::{mul_shift_round_down, shift_div_round_down, to_u128, SCALE_OFFSET};
use types::{Address, Amounts, MathError, TokenSide, U256};

/// Fees already attributed to an account for one bin, 128.128-scaled shares
/// times accumulator
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Debt {
    pub x: U256,
    pub y: U256,
}

#[derive(Debug, Clone, Default)]
pub struct FeeAccrualLedger {
    debts: Journaled<(Address, u32), Debt>,
    unclaimed: Journaled<Address, Amounts>,
}

impl FeeAccrualLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add LP fees to a bin's accumulator.
    ///
    /// Returns `false` without touching the bin when it has no shares
    /// outstanding; the caller must then route the fee elsewhere.
    pub fn credit(
        bin: &mut Bin,
        side: TokenSide,
        lp_fee: u128,
        total_supply: u128,
    ) -> Result<bool, MathError> {
        if total_supply == 0 {
            return Ok(lp_fee == 0);
        }
        if lp_fee == 0 {
            return Ok(true);
        }

        let per_share = shift_div_round_down(
            U256::from(lp_fee),
            SCALE_OFFSET,
            U256::from(total_supply),
        )?;
        let acc = bin.acc_per_share_mut(side);
        *acc = acc.checked_add(per_share).ok_or(MathError::Overflow)?;
        Ok(true)
    }

    pub fn debt(&self, account: Address, id: u32) -> Debt {
        self.debts.get(&(account, id)).copied().unwrap_or_default()
    }

    pub fn unclaimed(&self, account: Address) -> Amounts {
        self.unclaimed.get(&account).copied().unwrap_or_default()
    }

    /// Fees earned in `bin` since the last snapshot, for the given balance
    pub fn pending(
        &self,
        account: Address,
        id: u32,
        bin: &Bin,
        balance: u128,
    ) -> Result<Amounts, MathError> {
        let accrued = accrued(bin, balance)?;
        let debt = self.debt(account, id);
        Ok(Amounts::new(
            to_u128(accrued.x.saturating_sub(debt.x))?,
            to_u128(accrued.y.saturating_sub(debt.y))?,
        ))
    }

    /// Park fees earned under `previous_balance` and re-snapshot at
    /// `new_balance`. Must run before the balance actually changes.
    pub fn cache_fees(
        &mut self,
        account: Address,
        id: u32,
        bin: &Bin,
        previous_balance: u128,
        new_balance: u128,
    ) -> Result<(), MathError> {
        let pending = self.pending(account, id, bin, previous_balance)?;
        self.debts.insert((account, id), accrued(bin, new_balance)?);

        if !pending.is_zero() {
            let unclaimed = self
                .unclaimed(account)
                .checked_add(pending)
                .ok_or(MathError::Overflow)?;
            self.unclaimed.insert(account, unclaimed);
        }
        Ok(())
    }

    /// Return pending fees for a bin and reset the debt.
    pub fn settle(
        &mut self,
        account: Address,
        id: u32,
        bin: &Bin,
        balance: u128,
    ) -> Result<Amounts, MathError> {
        let pending = self.pending(account, id, bin, balance)?;
        self.debts.insert((account, id), accrued(bin, balance)?);
        Ok(pending)
    }

    /// Remove and return the account's unclaimed bucket
    pub fn take_unclaimed(&mut self, account: Address) -> Amounts {
        self.unclaimed.remove(&account).unwrap_or_default()
    }

    pub fn begin(&mut self) {
        self.debts.begin();
        self.unclaimed.begin();
    }

    pub fn commit(&mut self) {
        self.debts.commit();
        self.unclaimed.commit();
    }

    pub fn rollback(&mut self) {
        self.debts.rollback();
        self.unclaimed.rollback();
    }
}

fn accrued(bin: &Bin, balance: u128) -> Result<Debt, MathError> {
    let balance = U256::from(balance);
    Ok(Debt {
        x: mul_shift_round_down(balance, bin.acc_per_share_x, SCALE_OFFSET)?,
        y: mul_shift_round_down(balance, bin.acc_per_share_y, SCALE_OFFSET)?,
    })
}
