//! Token custody
//!
//! The pair never moves tokens itself; it asks a [`TokenVault`] to pay out of
//! the pair's custody. Deposits happen before a call: whatever custody holds
//! beyond reserves and accrued fees counts as received.

use std::collections::HashMap;
use thiserror::Error;
use types::{Address, Amounts, TokenSide};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransferError {
    #[error("Pair custody holds {available} of token {side:?}, {requested} requested")]
    InsufficientCustody {
        side: TokenSide,
        available: u128,
        requested: u128,
    },

    #[error("Account {account} holds {available} of token {side:?}, {requested} requested")]
    InsufficientBalance {
        account: Address,
        side: TokenSide,
        available: u128,
        requested: u128,
    },

    #[error("Token {side:?} balance overflow")]
    Overflow { side: TokenSide },
}

/// Custody of the pair's two tokens
pub trait TokenVault {
    /// Tokens currently held by the pair
    fn balances(&self) -> Amounts;

    /// Pay `amounts` out of custody to `to`
    fn transfer(&mut self, to: Address, amounts: Amounts) -> Result<(), TransferError>;

    /// Pull back a previous payout; used when an operation is rolled back
    fn reclaim(&mut self, from: Address, amounts: Amounts) -> Result<(), TransferError>;
}

/// In-memory token balances of accounts and of the pair
#[derive(Debug, Clone, Default)]
pub struct TokenAccounts {
    custody: Amounts,
    accounts: HashMap<Address, Amounts>,
}

impl TokenAccounts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn balance_of(&self, account: Address) -> Amounts {
        self.accounts.get(&account).copied().unwrap_or_default()
    }

    /// Create tokens in an account
    pub fn mint_to(&mut self, account: Address, amounts: Amounts) -> Result<(), TransferError> {
        let balance = self.balance_of(account);
        let updated = add(balance, amounts)?;
        self.accounts.insert(account, updated);
        Ok(())
    }

    /// Move tokens from an account into the pair's custody
    pub fn deposit(&mut self, from: Address, amounts: Amounts) -> Result<(), TransferError> {
        let balance = self.balance_of(from);
        let remaining = sub_account(from, balance, amounts)?;
        let custody = add(self.custody, amounts)?;
        self.accounts.insert(from, remaining);
        self.custody = custody;
        Ok(())
    }
}

impl TokenVault for TokenAccounts {
    fn balances(&self) -> Amounts {
        self.custody
    }

    fn transfer(&mut self, to: Address, amounts: Amounts) -> Result<(), TransferError> {
        let custody = sub_custody(self.custody, amounts)?;
        let balance = add(self.balance_of(to), amounts)?;
        self.custody = custody;
        self.accounts.insert(to, balance);
        Ok(())
    }

    fn reclaim(&mut self, from: Address, amounts: Amounts) -> Result<(), TransferError> {
        self.deposit(from, amounts)
    }
}

fn add(a: Amounts, b: Amounts) -> Result<Amounts, TransferError> {
    Ok(Amounts::new(
        a.x.checked_add(b.x)
            .ok_or(TransferError::Overflow { side: TokenSide::X })?,
        a.y.checked_add(b.y)
            .ok_or(TransferError::Overflow { side: TokenSide::Y })?,
    ))
}

fn sub_custody(available: Amounts, requested: Amounts) -> Result<Amounts, TransferError> {
    for side in [TokenSide::X, TokenSide::Y] {
        if available.get(side) < requested.get(side) {
            return Err(TransferError::InsufficientCustody {
                side,
                available: available.get(side),
                requested: requested.get(side),
            });
        }
    }
    Ok(available.saturating_sub(requested))
}

fn sub_account(
    account: Address,
    available: Amounts,
    requested: Amounts,
) -> Result<Amounts, TransferError> {
    for side in [TokenSide::X, TokenSide::Y] {
        if available.get(side) < requested.get(side) {
            return Err(TransferError::InsufficientBalance {
                account,
                side,
                available: available.get(side),
                requested: requested.get(side),
            });
        }
    }
    Ok(available.saturating_sub(requested))
}
