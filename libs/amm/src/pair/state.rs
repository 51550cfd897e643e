//! Pair state and operation receipts

use serde::{Deserialize, Serialize};
use types::{Amounts, TokenSide, U256};

/// Reserves and fee accumulators of a single price level
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bin {
    pub reserve_x: u128,
    pub reserve_y: u128,
    /// LP fees in X per share, 128.128
    pub acc_per_share_x: U256,
    /// LP fees in Y per share, 128.128
    pub acc_per_share_y: U256,
}

impl Bin {
    pub fn is_empty(&self) -> bool {
        self.reserve_x == 0 && self.reserve_y == 0
    }

    pub fn reserves(&self) -> Amounts {
        Amounts::new(self.reserve_x, self.reserve_y)
    }

    pub fn reserve(&self, side: TokenSide) -> u128 {
        match side {
            TokenSide::X => self.reserve_x,
            TokenSide::Y => self.reserve_y,
        }
    }

    pub fn reserve_mut(&mut self, side: TokenSide) -> &mut u128 {
        match side {
            TokenSide::X => &mut self.reserve_x,
            TokenSide::Y => &mut self.reserve_y,
        }
    }

    pub fn acc_per_share_mut(&mut self, side: TokenSide) -> &mut U256 {
        match side {
            TokenSide::X => &mut self.acc_per_share_x,
            TokenSide::Y => &mut self.acc_per_share_y,
        }
    }
}

/// Fees held by the pair, per token
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeTotals {
    /// All fees not yet paid out (LP and protocol)
    pub total: Amounts,
    /// Protocol part of `total`
    pub protocol: Amounts,
}

/// Aggregate state of a pair
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairState {
    pub active_id: u32,
    /// Sum of all bin reserves
    pub reserves: Amounts,
    pub fees: FeeTotals,
}

/// One bin visited by a swap
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapStep {
    pub id: u32,
    pub amount_in_to_bin: u128,
    pub amount_out: u128,
    pub fee: u128,
    pub protocol_fee: u128,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapReceipt {
    pub swap_for_y: bool,
    pub amount_in: u128,
    pub amount_out: u128,
    /// Total fee charged, in the input token
    pub fee: u128,
    pub start_id: u32,
    pub end_id: u32,
    pub steps: Vec<SwapStep>,
}

impl SwapReceipt {
    pub fn bins_crossed(&self) -> u32 {
        self.start_id.abs_diff(self.end_id)
    }
}

/// Quote returned by `get_swap_out`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapQuote {
    pub amount_in_left: u128,
    pub amount_out: u128,
    pub fee: u128,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MintReceipt {
    /// `(bin id, shares minted)` in call order
    pub liquidity_minted: Vec<(u32, u128)>,
    pub amounts_added: Amounts,
    pub composition_fees: Amounts,
    pub amounts_refunded: Amounts,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BurnReceipt {
    /// `(bin id, amounts withdrawn)` in call order
    pub withdrawn: Vec<(u32, Amounts)>,
    pub amounts: Amounts,
}
