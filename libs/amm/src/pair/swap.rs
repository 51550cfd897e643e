//! Swaps across bins
//!
//! A swap is planned on copies first: the fee parameters are refreshed, then
//! bins are visited from the active id in the swap direction until the input
//! is exhausted. Each visited bin is filled at its own constant price. The
//! plan is only applied once it is known to succeed.

use super::{add_reserve, sub_reserve, Bin, LbPair, SwapQuote, SwapReceipt, SwapStep};
use crate::bin_tree::{SENTINEL_DOWN, SENTINEL_UP};
use crate::error::PairError;
use crate::ledger::ShareLedger;
use crate::price::price_from_id;
use crate::vault::TokenVault;
use crate::volatility::{FeeDistribution, FeeParameters};
use tracing::{debug, info};
use types::fixed_point::{
    mul_shift_round_down, mul_shift_round_up, shift_div_round_down, shift_div_round_up, to_u128,
    SCALE_OFFSET,
};
use types::{Address, Amounts, SearchDirection, TokenSide, U256};

struct SwapPlan {
    steps: Vec<SwapStep>,
    amount_in_left: u128,
    amount_out: u128,
    fee: u128,
    end_id: u32,
    parameters: FeeParameters,
}

impl<L: ShareLedger, V: TokenVault> LbPair<L, V> {
    /// Swap `amount_in` of the input token, previously sent to the vault, and
    /// pay the output to `to`.
    pub fn swap(
        &mut self,
        swap_for_y: bool,
        amount_in: u128,
        to: Address,
    ) -> Result<SwapReceipt, PairError> {
        self.execute("swap", |pair| pair.swap_inner(swap_for_y, amount_in, to))
    }

    /// Simulate a swap at the current time without touching state.
    ///
    /// Unlike `swap`, running out of liquidity is not an error: the unfilled
    /// input is reported in `amount_in_left`.
    pub fn get_swap_out(&self, swap_for_y: bool, amount_in: u128) -> Result<SwapQuote, PairError> {
        let plan = self.plan_swap(swap_for_y, amount_in, self.clock.now())?;
        Ok(SwapQuote {
            amount_in_left: plan.amount_in_left,
            amount_out: plan.amount_out,
            fee: plan.fee,
        })
    }

    fn swap_inner(
        &mut self,
        swap_for_y: bool,
        amount_in: u128,
        to: Address,
    ) -> Result<SwapReceipt, PairError> {
        let (input, output) = if swap_for_y {
            (TokenSide::X, TokenSide::Y)
        } else {
            (TokenSide::Y, TokenSide::X)
        };

        let received = self.amounts_received().get(input);
        if amount_in == 0 || amount_in > received {
            return Err(PairError::InsufficientAmountIn {
                requested: amount_in,
                received,
            });
        }

        let now = self.clock.now();
        let start_id = self.state.active_id;
        let plan = self.plan_swap(swap_for_y, amount_in, now)?;
        if plan.amount_in_left > 0 {
            return Err(PairError::OutOfLiquidity);
        }
        if plan.amount_out == 0 {
            return Err(PairError::InsufficientAmountOut);
        }

        for step in &plan.steps {
            let mut bin = self.get_bin(step.id);
            add_reserve(bin.reserve_mut(input), step.amount_in_to_bin, step.id)?;
            sub_reserve(bin.reserve_mut(output), step.amount_out)?;

            let total_supply = self.ledger.total_supply(step.id);
            let fees = FeeDistribution {
                total: step.fee,
                protocol: step.protocol_fee,
            };
            self.credit_fees(&mut bin, input, fees, total_supply)?;
            self.store_bin(step.id, bin);

            add_reserve(
                self.state.reserves.get_mut(input),
                step.amount_in_to_bin,
                step.id,
            )?;
            sub_reserve(self.state.reserves.get_mut(output), step.amount_out)?;

            debug!(
                id = step.id,
                amount_in = step.amount_in_to_bin,
                amount_out = step.amount_out,
                fee = step.fee,
                "Swapped in bin"
            );
        }

        self.state.active_id = plan.end_id;
        self.fee_parameters = plan.parameters;
        let bins_crossed = start_id.abs_diff(plan.end_id);
        self.oracle.update(
            now,
            plan.end_id,
            plan.parameters.volatility_accumulator,
            bins_crossed,
        );

        self.pay(to, Amounts::only(output, plan.amount_out))?;

        info!(
            swap_for_y,
            amount_in,
            amount_out = plan.amount_out,
            fee = plan.fee,
            start_id,
            end_id = plan.end_id,
            "Swap executed"
        );

        Ok(SwapReceipt {
            swap_for_y,
            amount_in,
            amount_out: plan.amount_out,
            fee: plan.fee,
            start_id,
            end_id: plan.end_id,
            steps: plan.steps,
        })
    }

    fn plan_swap(
        &self,
        swap_for_y: bool,
        amount_in: u128,
        now: u64,
    ) -> Result<SwapPlan, PairError> {
        let output = if swap_for_y { TokenSide::Y } else { TokenSide::X };
        let direction = SearchDirection::for_swap(swap_for_y);

        let mut parameters = self.fee_parameters;
        let mut id = self.state.active_id;
        parameters.update_references(id, now);

        let mut steps = Vec::new();
        let mut remaining = amount_in;
        let mut amount_out = 0u128;
        let mut fee = 0u128;

        while remaining > 0 {
            let bin = self.get_bin(id);
            if bin.reserve(output) != 0 {
                parameters.update_volatility_accumulator(id);
                let step = bin_swap_step(&bin, &parameters, swap_for_y, id, remaining)?;

                remaining -= step.amount_in_to_bin + step.fee;
                amount_out += step.amount_out;
                fee += step.fee;
                steps.push(step);

                if remaining == 0 {
                    break;
                }
            }

            let next = self.tree.find_first_non_empty(id, direction);
            if next == SENTINEL_UP || next == SENTINEL_DOWN {
                break;
            }
            id = next;
        }

        Ok(SwapPlan {
            steps,
            amount_in_left: remaining,
            amount_out,
            fee,
            end_id: id,
            parameters,
        })
    }
}

/// Fill as much of `amount_in` (fees included) as a single bin allows.
fn bin_swap_step(
    bin: &Bin,
    parameters: &FeeParameters,
    swap_for_y: bool,
    id: u32,
    amount_in: u128,
) -> Result<SwapStep, PairError> {
    let price = price_from_id(id, parameters.bin_step)?;

    // Net input that would drain the bin's output side
    let (reserve_out, max_in) = if swap_for_y {
        let reserve_y = bin.reserve_y;
        (
            reserve_y,
            shift_div_round_up(U256::from(reserve_y), SCALE_OFFSET, price)?,
        )
    } else {
        let reserve_x = bin.reserve_x;
        (
            reserve_x,
            mul_shift_round_up(price, U256::from(reserve_x), SCALE_OFFSET)?,
        )
    };

    let drain = match to_u128(max_in) {
        Ok(max_in) => {
            let fee = parameters.fee_amount(max_in)?;
            match max_in.checked_add(fee) {
                Some(gross) if gross <= amount_in => Some((max_in, fee)),
                _ => None,
            }
        }
        Err(_) => None,
    };

    let (amount_in_to_bin, fee, amount_out) = match drain {
        Some((max_in, fee)) => (max_in, fee, reserve_out),
        None => {
            let fee = parameters.fee_amount_from(amount_in)?;
            let net = amount_in - fee;
            let out = if swap_for_y {
                mul_shift_round_down(price, U256::from(net), SCALE_OFFSET)?
            } else {
                shift_div_round_down(U256::from(net), SCALE_OFFSET, price)?
            };
            let out = to_u128(out).map_or(reserve_out, |out| out.min(reserve_out));
            (net, fee, out)
        }
    };

    let fees = parameters.distribute(fee)?;

    Ok(SwapStep {
        id,
        amount_in_to_bin,
        amount_out,
        fee,
        protocol_fee: fees.protocol,
    })
}
