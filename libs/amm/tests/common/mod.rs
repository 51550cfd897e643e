//! Shared fixtures for pair integration tests

#![allow(dead_code)]

use lb_amm::{
    InMemoryShareLedger, LbPair, ManualClock, MintReceipt, PairError, SwapReceipt, TokenAccounts,
    TokenVault,
};
use lb_config::{PairConfig, PairRoles};
use std::sync::Arc;
use types::{Address, Amounts, ID_OFFSET};

pub const ONE: u128 = 1_000_000_000_000_000_000;
pub const FULL: u64 = 1_000_000_000_000_000_000;
pub const START_TIME: u64 = 1_700_000_000;

pub const OWNER: Address = Address::repeat_byte(0x01);
pub const FEE_RECIPIENT: Address = Address::repeat_byte(0x02);
pub const ALICE: Address = Address::repeat_byte(0xa1);
pub const BOB: Address = Address::repeat_byte(0xb0);
pub const TRADER: Address = Address::repeat_byte(0x7e);

pub type TestPair = LbPair<InMemoryShareLedger, TokenAccounts>;

pub fn config(bin_step: u16) -> PairConfig {
    let roles = PairRoles {
        owner: OWNER,
        protocol_fee_recipient: FEE_RECIPIENT,
    };
    PairConfig::with_standard_preset(
        Address::repeat_byte(0x0a),
        Address::repeat_byte(0x0b),
        bin_step,
        ID_OFFSET,
        roles,
    )
    .unwrap()
}

pub struct Harness {
    pub pair: TestPair,
    pub clock: Arc<ManualClock>,
}

impl Harness {
    pub fn new(bin_step: u16) -> Self {
        let clock = Arc::new(ManualClock::new(START_TIME));
        let pair = LbPair::new(
            &config(bin_step),
            InMemoryShareLedger::new(),
            TokenAccounts::new(),
            clock.clone(),
        )
        .unwrap();
        Self { pair, clock }
    }

    /// Fund `from` and move the tokens into the pair's custody
    pub fn send(&mut self, from: Address, amounts: Amounts) {
        let vault = self.pair.vault_mut();
        vault.mint_to(from, amounts).unwrap();
        vault.deposit(from, amounts).unwrap();
    }

    pub fn add_liquidity(
        &mut self,
        to: Address,
        amounts: Amounts,
        ids: &[u32],
        distribution_x: &[u64],
        distribution_y: &[u64],
    ) -> MintReceipt {
        self.send(to, amounts);
        self.pair
            .mint(to, ids, distribution_x, distribution_y)
            .unwrap()
    }

    /// Spread `per_side` evenly over the active bin and `spread` bins on
    /// each side of it
    pub fn seed_symmetric(&mut self, to: Address, per_side: u128, spread: u32) -> MintReceipt {
        let ids: Vec<u32> = (ID_OFFSET - spread..=ID_OFFSET + spread).collect();
        let weight = FULL / (spread as u64 + 1);
        let distribution_x: Vec<u64> = ids
            .iter()
            .map(|&id| if id >= ID_OFFSET { weight } else { 0 })
            .collect();
        let distribution_y: Vec<u64> = ids
            .iter()
            .map(|&id| if id <= ID_OFFSET { weight } else { 0 })
            .collect();
        self.add_liquidity(
            to,
            Amounts::new(per_side, per_side),
            &ids,
            &distribution_x,
            &distribution_y,
        )
    }

    pub fn swap(&mut self, swap_for_y: bool, amount_in: u128) -> Result<SwapReceipt, PairError> {
        let input = if swap_for_y {
            Amounts::new(amount_in, 0)
        } else {
            Amounts::new(0, amount_in)
        };
        self.send(TRADER, input);
        self.pair.swap(swap_for_y, amount_in, TRADER)
    }

    pub fn custody(&self) -> Amounts {
        self.pair.vault().balances()
    }

    pub fn wallet(&self, account: Address) -> Amounts {
        self.pair.vault().balance_of(account)
    }
}
