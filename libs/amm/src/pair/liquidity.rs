//! Adding and removing liquidity
//!
//! Deposits are split across bins by 1e18-scaled weights. Bins below the
//! active id hold only Y, bins above it only X; the active bin may take both.
//! A deposit into the active bin that changes its composition pays the
//! composition fee on the imbalanced side, credited to the existing LPs.

use super::{add_reserve, ensure_account, sub_reserve, Bin, BurnReceipt, LbPair, MintReceipt};
use crate::error::PairError;
use crate::ledger::ShareLedger;
use crate::price::price_from_id;
use crate::vault::TokenVault;
use crate::volatility::FeeParameters;
use tracing::{debug, info};
use types::fixed_point::{
    mul_div_round_down, mul_shift_round_down, to_u128, PRECISION, SCALE_OFFSET,
};
use types::{Address, Amounts, MathError, TokenSide, U256};

impl<L: ShareLedger, V: TokenVault> LbPair<L, V> {
    /// Deposit the tokens previously sent to the vault into `ids` and mint
    /// shares to `to`. Undistributed tokens are refunded to `to`.
    pub fn mint(
        &mut self,
        to: Address,
        ids: &[u32],
        distribution_x: &[u64],
        distribution_y: &[u64],
    ) -> Result<MintReceipt, PairError> {
        self.execute("mint", |pair| {
            pair.mint_inner(to, ids, distribution_x, distribution_y)
        })
    }

    /// Burn `amounts[i]` shares of `ids[i]` held by `from` and pay the
    /// withdrawn reserves to `to`.
    pub fn burn(
        &mut self,
        from: Address,
        to: Address,
        ids: &[u32],
        amounts: &[u128],
    ) -> Result<BurnReceipt, PairError> {
        self.execute("burn", |pair| pair.burn_inner(from, to, ids, amounts))
    }

    fn mint_inner(
        &mut self,
        to: Address,
        ids: &[u32],
        distribution_x: &[u64],
        distribution_y: &[u64],
    ) -> Result<MintReceipt, PairError> {
        ensure_account(to)?;
        if ids.is_empty() {
            return Err(PairError::InvalidInput("no bins to mint"));
        }
        if ids.len() != distribution_x.len() || ids.len() != distribution_y.len() {
            return Err(PairError::InvalidInput(
                "ids and distributions lengths differ",
            ));
        }

        let received = self.amounts_received();
        let active_id = self.state.active_id;

        // The composition fee sees the volatility a swap right now would see
        let mut parameters = self.fee_parameters;
        parameters.update_volatility_parameters(active_id, self.clock.now());

        let mut total_dx = 0u128;
        let mut total_dy = 0u128;
        let mut amounts_added = Amounts::ZERO;
        let mut composition_fees = Amounts::ZERO;
        let mut minted: Vec<(u32, u128)> = Vec::with_capacity(ids.len());

        for ((&id, &dx), &dy) in ids.iter().zip(distribution_x).zip(distribution_y) {
            let (dx, dy) = (dx as u128, dy as u128);
            total_dx += dx;
            total_dy += dy;
            if total_dx > PRECISION || total_dy > PRECISION {
                return Err(PairError::DistributionsOverflow);
            }
            if (id < active_id && dx != 0) || (id > active_id && dy != 0) {
                return Err(PairError::CompositionFactorFlawed { id });
            }

            let mut amounts = Amounts::new(
                weighted(received.x, dx)?,
                weighted(received.y, dy)?,
            );
            let price = price_from_id(id, parameters.bin_step)?;
            let mut bin = self.get_bin(id);
            let total_supply = self.ledger.total_supply(id);

            if id == active_id && total_supply > 0 {
                if let Some((side, fee)) =
                    composition_fee(&parameters, &bin, price, total_supply, amounts)?
                {
                    let amount = amounts.get_mut(side);
                    *amount = amount.checked_sub(fee).ok_or(MathError::Underflow)?;
                    let fees = parameters.distribute(fee)?;
                    self.credit_fees(&mut bin, side, fees, total_supply)?;
                    *composition_fees.get_mut(side) += fee;
                    debug!(id, ?side, fee, "Composition fee charged");
                }
            }

            let liquidity = liquidity_of(price, amounts)?;
            if liquidity == 0 {
                return Err(PairError::InsufficientLiquidityMinted { id });
            }

            add_reserve(&mut bin.reserve_x, amounts.x, id)?;
            add_reserve(&mut bin.reserve_y, amounts.y, id)?;
            self.store_bin(id, bin);

            add_reserve(&mut self.state.reserves.x, amounts.x, id)?;
            add_reserve(&mut self.state.reserves.y, amounts.y, id)?;
            amounts_added = amounts_added
                .checked_add(amounts)
                .ok_or(MathError::Overflow)?;

            debug!(id, x = amounts.x, y = amounts.y, liquidity, "Deposited into bin");
            self.mint_shares(to, id, liquidity)?;
            minted.push((id, liquidity));
        }

        let amounts_refunded = received
            .saturating_sub(amounts_added)
            .saturating_sub(composition_fees);
        self.pay(to, amounts_refunded)?;

        info!(
            %to,
            bins = minted.len(),
            x = amounts_added.x,
            y = amounts_added.y,
            "Liquidity added"
        );

        Ok(MintReceipt {
            liquidity_minted: minted,
            amounts_added,
            composition_fees,
            amounts_refunded,
        })
    }

    fn burn_inner(
        &mut self,
        from: Address,
        to: Address,
        ids: &[u32],
        amounts: &[u128],
    ) -> Result<BurnReceipt, PairError> {
        ensure_account(from)?;
        ensure_account(to)?;
        if ids.is_empty() {
            return Err(PairError::InvalidInput("no bins to burn"));
        }
        if ids.len() != amounts.len() {
            return Err(PairError::InvalidInput("ids and amounts lengths differ"));
        }

        let mut scheduled: Vec<(u32, u128)> = Vec::with_capacity(ids.len());
        let mut withdrawn = Vec::with_capacity(ids.len());
        let mut total = Amounts::ZERO;

        for (&id, &amount) in ids.iter().zip(amounts) {
            if amount == 0 {
                return Err(PairError::InsufficientLiquidityBurned { id });
            }

            let already_burned: u128 = scheduled
                .iter()
                .filter(|(scheduled_id, _)| *scheduled_id == id)
                .map(|(_, amount)| *amount)
                .sum();
            let balance = self
                .ledger
                .balance_of(from, id)
                .saturating_sub(already_burned);
            if amount > balance {
                return Err(PairError::InsufficientShares {
                    id,
                    balance,
                    requested: amount,
                });
            }
            let total_supply = self.ledger.total_supply(id) - already_burned;

            let mut bin = self.get_bin(id);
            let out = Amounts::new(
                pro_rata(amount, bin.reserve_x, total_supply)?,
                pro_rata(amount, bin.reserve_y, total_supply)?,
            );
            if out.is_zero() {
                return Err(PairError::InsufficientLiquidityBurned { id });
            }

            sub_reserve(&mut bin.reserve_x, out.x)?;
            sub_reserve(&mut bin.reserve_y, out.y)?;
            self.store_bin(id, bin);

            self.state.reserves = self
                .state
                .reserves
                .checked_sub(out)
                .ok_or(MathError::Underflow)?;
            total = total.checked_add(out).ok_or(MathError::Overflow)?;

            debug!(id, x = out.x, y = out.y, shares = amount, "Withdrew from bin");
            withdrawn.push((id, out));
            scheduled.push((id, amount));
        }

        for &(id, amount) in &scheduled {
            self.burn_shares(from, id, amount)?;
        }
        self.pay(to, total)?;

        info!(%from, %to, bins = scheduled.len(), x = total.x, y = total.y, "Liquidity removed");

        Ok(BurnReceipt {
            withdrawn,
            amounts: total,
        })
    }
}

/// `amount * weight / 1e18`, rounded down
fn weighted(amount: u128, weight: u128) -> Result<u128, MathError> {
    to_u128(mul_div_round_down(
        U256::from(amount),
        U256::from(weight),
        U256::from(PRECISION),
    )?)
}

fn pro_rata(shares: u128, reserve: u128, total_supply: u128) -> Result<u128, MathError> {
    to_u128(mul_div_round_down(
        U256::from(shares),
        U256::from(reserve),
        U256::from(total_supply),
    )?)
}

/// Liquidity of an amount pair in Y terms: `price * x + y`
fn liquidity_of(price: U256, amounts: Amounts) -> Result<u128, MathError> {
    let x_in_y = mul_shift_round_down(price, U256::from(amounts.x), SCALE_OFFSET)?;
    let liquidity = x_in_y
        .checked_add(U256::from(amounts.y))
        .ok_or(MathError::Overflow)?;
    to_u128(liquidity)
}

/// Fee owed by a deposit into the active bin whose ratio differs from the
/// bin's, as `(side, fee)` on the side the depositor over-supplies.
fn composition_fee(
    parameters: &FeeParameters,
    bin: &Bin,
    price: U256,
    total_supply: u128,
    amounts: Amounts,
) -> Result<Option<(TokenSide, u128)>, MathError> {
    let user_liquidity = U256::from(liquidity_of(price, amounts)?);
    let supply_after = U256::from(total_supply) + user_liquidity;

    // What the new shares would redeem for right after the deposit
    let redeem = |reserve: u128, amount: u128| -> Result<u128, MathError> {
        let after = U256::from(reserve) + U256::from(amount);
        to_u128(mul_div_round_down(user_liquidity, after, supply_after)?)
    };
    let received_x = redeem(bin.reserve_x, amounts.x)?;
    let received_y = redeem(bin.reserve_y, amounts.y)?;

    if amounts.x > received_x {
        let fee = parameters.composition_fee(amounts.x - received_x)?;
        Ok(Some((TokenSide::X, fee)))
    } else if amounts.y > received_y {
        let fee = parameters.composition_fee(amounts.y - received_y)?;
        Ok(Some((TokenSide::Y, fee)))
    } else {
        Ok(None)
    }
}
