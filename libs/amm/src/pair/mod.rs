//! The pair engine
//!
//! [`LbPair`] owns all state of one trading pair and drives its two external
//! collaborators, a [`ShareLedger`] for LP shares and a [`TokenVault`] for
//! token custody.
//!
//! Every state-changing entry point runs through `execute`, which
//!
//! 1. rejects the call if another one is in progress,
//! 2. opens the journals over bins and fee debts and snapshots the small
//!    structs,
//! 3. runs the operation, which performs ledger mints/burns and token payouts
//!    last and logs each of them,
//! 4. on error undoes the logged interactions in reverse and restores every
//!    snapshot, so a failed call leaves no trace.

mod admin;
mod fees;
mod flash_loan;
mod liquidity;
mod state;
mod swap;

pub use flash_loan::FlashLoanReceiver;
pub use state::{
    Bin, BurnReceipt, FeeTotals, MintReceipt, PairState, SwapQuote, SwapReceipt, SwapStep,
};

use crate::bin_tree::BinTree;
use crate::clock::Clock;
use crate::error::PairError;
use crate::fee_ledger::FeeAccrualLedger;
use crate::journal::Journaled;
use crate::ledger::{LedgerError, ShareLedger};
use crate::oracle::{Oracle, OracleCheckpoint, OracleParameters, OracleSample};
use crate::price::price_from_id;
use crate::vault::TokenVault;
use crate::volatility::{FeeDistribution, FeeParameters};
use lb_config::{PairConfig, PairRoles};
use std::sync::Arc;
use tracing::{error, info, warn};
use types::{Address, Amounts, MathError, SearchDirection, TokenSide};

/// Reentrancy guard state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CallStatus {
    Idle,
    InProgress,
}

/// External effect performed during an operation, undone on rollback
#[derive(Debug, Clone, Copy)]
enum Interaction {
    Minted { to: Address, id: u32, amount: u128 },
    Burned { from: Address, id: u32, amount: u128 },
    Moved { from: Address, to: Address, id: u32, amount: u128 },
    Paid { to: Address, amounts: Amounts },
    Returned { from: Address, amounts: Amounts },
}

struct Checkpoint {
    state: PairState,
    fee_parameters: FeeParameters,
    oracle: OracleCheckpoint,
}

pub struct LbPair<L: ShareLedger, V: TokenVault> {
    token_x: Address,
    token_y: Address,
    roles: PairRoles,
    flash_loan_fee: u128,

    state: PairState,
    fee_parameters: FeeParameters,
    oracle: Oracle,
    bins: Journaled<u32, Bin>,
    tree: BinTree,
    fee_ledger: FeeAccrualLedger,

    ledger: L,
    vault: V,
    clock: Arc<dyn Clock>,

    status: CallStatus,
    interactions: Vec<Interaction>,
}

impl<L: ShareLedger, V: TokenVault> LbPair<L, V> {
    /// Initialize a pair from registry parameters
    pub fn new(
        config: &PairConfig,
        ledger: L,
        vault: V,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, PairError> {
        config.validate()?;
        // The starting bin must have a representable price
        price_from_id(config.active_id, config.fee.bin_step)?;

        info!(
            token_x = %config.token_x,
            token_y = %config.token_y,
            bin_step = config.fee.bin_step,
            active_id = config.active_id,
            "Pair initialized"
        );

        Ok(Self {
            token_x: config.token_x,
            token_y: config.token_y,
            roles: config.roles,
            flash_loan_fee: config.flash_loan_fee as u128,
            state: PairState {
                active_id: config.active_id,
                ..Default::default()
            },
            fee_parameters: FeeParameters::new(&config.fee, config.active_id),
            oracle: Oracle::new(config.oracle.sample_lifetime, config.oracle.initial_length),
            bins: Journaled::new(),
            tree: BinTree::new(),
            fee_ledger: FeeAccrualLedger::new(),
            ledger,
            vault,
            clock,
            status: CallStatus::Idle,
            interactions: Vec::new(),
        })
    }

    pub fn token_x(&self) -> Address {
        self.token_x
    }

    pub fn token_y(&self) -> Address {
        self.token_y
    }

    pub fn roles(&self) -> PairRoles {
        self.roles
    }

    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    pub fn vault(&self) -> &V {
        &self.vault
    }

    /// Mutable custody access, used to deposit tokens before a call or to
    /// repay a flash loan from inside the callback
    pub fn vault_mut(&mut self) -> &mut V {
        &mut self.vault
    }

    pub fn get_bin(&self, id: u32) -> Bin {
        self.bins.get(&id).cloned().unwrap_or_default()
    }

    pub fn get_reserves_and_id(&self) -> (Amounts, u32) {
        (self.state.reserves, self.state.active_id)
    }

    pub fn get_global_fees(&self) -> FeeTotals {
        self.state.fees
    }

    pub fn get_oracle_parameters(&self) -> OracleParameters {
        self.oracle.parameters()
    }

    /// Cumulative oracle values `lookback` seconds ago
    pub fn get_oracle_sample_from(&self, lookback: u64) -> OracleSample {
        let now = self.clock.now();
        let lookup = now.saturating_sub(lookback);

        // Extrapolation uses the volatility a swap right now would see
        let mut parameters = self.fee_parameters;
        parameters.update_volatility_parameters(self.state.active_id, now);

        self.oracle.sample_at(
            lookup,
            self.state.active_id,
            parameters.volatility_accumulator,
        )
    }

    pub fn fee_parameters(&self) -> &FeeParameters {
        &self.fee_parameters
    }

    pub fn flash_loan_fee(&self) -> u128 {
        self.flash_loan_fee
    }

    /// Nearest populated bin in the swap direction, or a sentinel
    pub fn find_first_non_empty_bin_id(&self, from: u32, swap_for_y: bool) -> u32 {
        self.tree
            .find_first_non_empty(from, SearchDirection::for_swap(swap_for_y))
    }

    /// Tokens in custody not yet accounted as reserves or fees
    pub fn amounts_received(&self) -> Amounts {
        self.vault
            .balances()
            .saturating_sub(self.state.reserves)
            .saturating_sub(self.state.fees.total)
    }

    /// Run a state-changing operation atomically under the reentrancy guard
    fn execute<T>(
        &mut self,
        operation: &'static str,
        f: impl FnOnce(&mut Self) -> Result<T, PairError>,
    ) -> Result<T, PairError> {
        if self.status == CallStatus::InProgress {
            warn!(operation, "Reentrant call rejected");
            return Err(PairError::Reentrancy);
        }
        self.status = CallStatus::InProgress;

        let checkpoint = self.begin();
        let result = f(self);
        match &result {
            Ok(_) => self.commit(),
            Err(err) => {
                warn!(operation, error = %err, "Operation failed, rolling back");
                self.rollback(checkpoint);
            }
        }

        self.status = CallStatus::Idle;
        result
    }

    fn begin(&mut self) -> Checkpoint {
        self.bins.begin();
        self.fee_ledger.begin();
        self.interactions.clear();
        Checkpoint {
            state: self.state,
            fee_parameters: self.fee_parameters,
            oracle: self.oracle.checkpoint(),
        }
    }

    fn commit(&mut self) {
        self.bins.commit();
        self.fee_ledger.commit();
        self.interactions.clear();
    }

    fn rollback(&mut self, checkpoint: Checkpoint) {
        let interactions = std::mem::take(&mut self.interactions);
        for interaction in interactions.into_iter().rev() {
            if let Err(err) = self.undo(interaction) {
                error!(?interaction, error = %err, "Failed to undo interaction");
            }
        }

        for id in self.bins.rollback() {
            self.sync_tree(id);
        }
        self.fee_ledger.rollback();

        self.state = checkpoint.state;
        self.fee_parameters = checkpoint.fee_parameters;
        self.oracle.restore(checkpoint.oracle);
    }

    fn undo(&mut self, interaction: Interaction) -> Result<(), PairError> {
        match interaction {
            Interaction::Minted { to, id, amount } => self.ledger.burn(to, id, amount)?,
            Interaction::Burned { from, id, amount } => self.ledger.mint(from, id, amount)?,
            Interaction::Moved {
                from,
                to,
                id,
                amount,
            } => self.ledger.transfer(to, from, id, amount)?,
            Interaction::Paid { to, amounts } => self.vault.reclaim(to, amounts)?,
            Interaction::Returned { from, amounts } => self.vault.transfer(from, amounts)?,
        }
        Ok(())
    }

    fn ensure_owner(&self, caller: Address) -> Result<(), PairError> {
        if caller != self.roles.owner {
            return Err(PairError::AccessDenied { caller });
        }
        Ok(())
    }

    fn store_bin(&mut self, id: u32, bin: Bin) {
        self.bins.insert(id, bin);
        self.sync_tree(id);
    }

    fn sync_tree(&mut self, id: u32) {
        if self.get_bin(id).is_empty() {
            self.tree.remove(id);
        } else {
            self.tree.insert(id);
        }
    }

    /// Book a fee taken in `side`: LP part into the bin accumulator (or to the
    /// protocol when the bin has no shares), totals into the pair.
    fn credit_fees(
        &mut self,
        bin: &mut Bin,
        side: TokenSide,
        fees: FeeDistribution,
        total_supply: u128,
    ) -> Result<(), PairError> {
        let credited = FeeAccrualLedger::credit(bin, side, fees.lp(), total_supply)?;
        let protocol = if credited { fees.protocol } else { fees.total };

        let totals = &mut self.state.fees;
        let total = totals.total.get_mut(side);
        *total = total.checked_add(fees.total).ok_or(MathError::Overflow)?;
        let protocol_total = totals.protocol.get_mut(side);
        *protocol_total = protocol_total
            .checked_add(protocol)
            .ok_or(MathError::Overflow)?;
        Ok(())
    }

    /// Settle fee debts for both sides of a share movement before it
    /// happens. `None` stands for a mint (`from`) or a burn (`to`).
    fn cache_transfer_fees(
        &mut self,
        from: Option<Address>,
        to: Option<Address>,
        id: u32,
        amount: u128,
    ) -> Result<(), PairError> {
        for account in [from, to].into_iter().flatten() {
            ensure_account(account)?;
        }
        if from.is_none() && to.is_none() {
            return Err(PairError::InvalidInput("share movement without an account"));
        }
        if from == to {
            return Ok(());
        }
        let bin = self.get_bin(id);

        if let Some(from) = from {
            let balance = self.ledger.balance_of(from, id);
            let remaining = balance
                .checked_sub(amount)
                .ok_or(PairError::InsufficientShares {
                    id,
                    balance,
                    requested: amount,
                })?;
            self.fee_ledger
                .cache_fees(from, id, &bin, balance, remaining)?;
        }

        if let Some(to) = to {
            let balance = self.ledger.balance_of(to, id);
            let updated = balance
                .checked_add(amount)
                .ok_or(LedgerError::SupplyOverflow { id })?;
            self.fee_ledger.cache_fees(to, id, &bin, balance, updated)?;
        }

        Ok(())
    }

    fn mint_shares(&mut self, to: Address, id: u32, amount: u128) -> Result<(), PairError> {
        self.cache_transfer_fees(None, Some(to), id, amount)?;
        self.ledger.mint(to, id, amount)?;
        self.interactions
            .push(Interaction::Minted { to, id, amount });
        Ok(())
    }

    fn burn_shares(&mut self, from: Address, id: u32, amount: u128) -> Result<(), PairError> {
        self.cache_transfer_fees(Some(from), None, id, amount)?;
        self.ledger.burn(from, id, amount)?;
        self.interactions
            .push(Interaction::Burned { from, id, amount });
        Ok(())
    }

    fn move_shares(
        &mut self,
        from: Address,
        to: Address,
        id: u32,
        amount: u128,
    ) -> Result<(), PairError> {
        self.cache_transfer_fees(Some(from), Some(to), id, amount)?;
        self.ledger.transfer(from, to, id, amount)?;
        self.interactions.push(Interaction::Moved {
            from,
            to,
            id,
            amount,
        });
        Ok(())
    }

    /// Pay tokens out of custody; always the last effect of an operation
    fn pay(&mut self, to: Address, amounts: Amounts) -> Result<(), PairError> {
        if amounts.is_zero() {
            return Ok(());
        }
        self.vault.transfer(to, amounts)?;
        self.interactions.push(Interaction::Paid { to, amounts });
        Ok(())
    }
}

/// Share holders and payout targets must be real accounts
fn ensure_account(account: Address) -> Result<(), PairError> {
    if account == Address::ZERO {
        return Err(PairError::InvalidInput("zero address account"));
    }
    Ok(())
}

fn add_reserve(reserve: &mut u128, amount: u128, id: u32) -> Result<(), PairError> {
    *reserve = reserve
        .checked_add(amount)
        .ok_or(PairError::ReserveOverflow { id })?;
    Ok(())
}

fn sub_reserve(reserve: &mut u128, amount: u128) -> Result<(), PairError> {
    *reserve = reserve.checked_sub(amount).ok_or(MathError::Underflow)?;
    Ok(())
}
