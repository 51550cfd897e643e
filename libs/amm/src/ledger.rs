//! Liquidity share ledger
//!
//! The pair does not own share balances; it drives an external multi-token
//! ledger keyed by `(account, bin_id)`. The pair settles fee debts before every
//! balance change it requests.

use std::collections::HashMap;
use thiserror::Error;
use types::Address;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("Account {account} holds {balance} shares of bin {id}, {requested} requested")]
    InsufficientBalance {
        account: Address,
        id: u32,
        balance: u128,
        requested: u128,
    },

    #[error("Share supply of bin {id} would overflow")]
    SupplyOverflow { id: u32 },
}

/// Share bookkeeping the pair relies on
pub trait ShareLedger {
    fn balance_of(&self, account: Address, id: u32) -> u128;

    fn total_supply(&self, id: u32) -> u128;

    fn mint(&mut self, to: Address, id: u32, amount: u128) -> Result<(), LedgerError>;

    fn burn(&mut self, from: Address, id: u32, amount: u128) -> Result<(), LedgerError>;

    fn transfer(
        &mut self,
        from: Address,
        to: Address,
        id: u32,
        amount: u128,
    ) -> Result<(), LedgerError>;
}

/// `HashMap` backed ledger for tests and the simulator
#[derive(Debug, Clone, Default)]
pub struct InMemoryShareLedger {
    balances: HashMap<(Address, u32), u128>,
    supplies: HashMap<u32, u128>,
}

impl InMemoryShareLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bins in which `account` holds shares, ascending
    pub fn bins_of(&self, account: Address) -> Vec<u32> {
        let mut ids: Vec<u32> = self
            .balances
            .iter()
            .filter(|((owner, _), balance)| *owner == account && **balance > 0)
            .map(|((_, id), _)| *id)
            .collect();
        ids.sort_unstable();
        ids
    }

    fn debit(&mut self, account: Address, id: u32, amount: u128) -> Result<(), LedgerError> {
        let balance = self.balance_of(account, id);
        let remaining = balance
            .checked_sub(amount)
            .ok_or(LedgerError::InsufficientBalance {
                account,
                id,
                balance,
                requested: amount,
            })?;
        if remaining == 0 {
            self.balances.remove(&(account, id));
        } else {
            self.balances.insert((account, id), remaining);
        }
        Ok(())
    }

    fn credit(&mut self, account: Address, id: u32, amount: u128) -> Result<(), LedgerError> {
        let balance = self.balance_of(account, id);
        let updated = balance
            .checked_add(amount)
            .ok_or(LedgerError::SupplyOverflow { id })?;
        self.balances.insert((account, id), updated);
        Ok(())
    }
}

impl ShareLedger for InMemoryShareLedger {
    fn balance_of(&self, account: Address, id: u32) -> u128 {
        self.balances.get(&(account, id)).copied().unwrap_or(0)
    }

    fn total_supply(&self, id: u32) -> u128 {
        self.supplies.get(&id).copied().unwrap_or(0)
    }

    fn mint(&mut self, to: Address, id: u32, amount: u128) -> Result<(), LedgerError> {
        let supply = self
            .total_supply(id)
            .checked_add(amount)
            .ok_or(LedgerError::SupplyOverflow { id })?;
        self.credit(to, id, amount)?;
        self.supplies.insert(id, supply);
        Ok(())
    }

    fn burn(&mut self, from: Address, id: u32, amount: u128) -> Result<(), LedgerError> {
        self.debit(from, id, amount)?;
        let supply = self.total_supply(id).saturating_sub(amount);
        if supply == 0 {
            self.supplies.remove(&id);
        } else {
            self.supplies.insert(id, supply);
        }
        Ok(())
    }

    fn transfer(
        &mut self,
        from: Address,
        to: Address,
        id: u32,
        amount: u128,
    ) -> Result<(), LedgerError> {
        self.debit(from, id, amount)?;
        self.credit(to, id, amount)
    }
}
