//! End-to-end pair scenarios
//!
//! Each test drives a full pair through the public API with an in-memory
//! ledger, vault and a manual clock.

mod common;

use common::*;
use lb_amm::{
    FlashLoanReceiver, InMemoryShareLedger, LbPair, PairError, ShareLedger, TokenAccounts,
};
use lb_config::FeePreset;
use types::{Address, Amounts, TokenSide, ID_OFFSET, MAX_BIN_ID};

#[test]
fn test_swap_within_single_bin_at_one_percent_step() {
    let mut h = Harness::new(100);
    h.add_liquidity(ALICE, Amounts::new(0, 100 * ONE), &[ID_OFFSET], &[0], &[FULL]);

    let receipt = h.swap(true, ONE).unwrap();

    assert!(receipt.amount_out > 0);
    assert!(receipt.amount_out < ONE + ONE / 100);
    assert_eq!(receipt.steps.len(), 1);
    assert_eq!(receipt.start_id, ID_OFFSET);
    assert_eq!(receipt.end_id, ID_OFFSET);
    assert_eq!(receipt.bins_crossed(), 0);

    let step = receipt.steps[0];
    assert_eq!(step.amount_in_to_bin + step.fee, ONE);

    let bin = h.pair.get_bin(ID_OFFSET);
    assert_eq!(bin.reserve_x, step.amount_in_to_bin);
    assert_eq!(bin.reserve_y, 100 * ONE - receipt.amount_out);
    assert_eq!(h.wallet(TRADER), Amounts::new(0, receipt.amount_out));

    // No other bin holds anything
    assert_eq!(h.pair.find_first_non_empty_bin_id(ID_OFFSET, true), MAX_BIN_ID);
    assert_eq!(h.pair.find_first_non_empty_bin_id(ID_OFFSET, false), 0);
}

#[test]
fn test_swap_crosses_bins_and_moves_active_id() {
    let mut h = Harness::new(25);
    h.seed_symmetric(ALICE, 3 * ONE, 2);

    let receipt = h.swap(true, 5 * ONE / 2).unwrap();

    assert_eq!(receipt.steps.len(), 3);
    assert_eq!(receipt.end_id, ID_OFFSET - 2);
    assert_eq!(receipt.bins_crossed(), 2);
    let total_in: u128 = receipt
        .steps
        .iter()
        .map(|step| step.amount_in_to_bin + step.fee)
        .sum();
    assert_eq!(total_in, 5 * ONE / 2);

    // Drained bins keep the X they received and stay indexed
    let drained = h.pair.get_bin(ID_OFFSET - 1);
    assert_eq!(drained.reserve_y, 0);
    assert!(drained.reserve_x > 0);

    let (reserves, active_id) = h.pair.get_reserves_and_id();
    assert_eq!(active_id, ID_OFFSET - 2);
    assert_eq!(reserves.y, 3 * ONE - 3 - receipt.amount_out);

    // Volatility grew with the distance travelled
    assert_eq!(h.pair.fee_parameters().volatility_accumulator, 20_000);
}

#[test]
fn test_quote_matches_executed_swap() {
    let mut h = Harness::new(25);
    h.seed_symmetric(ALICE, 10 * ONE, 5);
    h.clock.advance(30);

    let quote = h.pair.get_swap_out(false, 4 * ONE).unwrap();
    let receipt = h.swap(false, 4 * ONE).unwrap();

    assert_eq!(quote.amount_in_left, 0);
    assert_eq!(quote.amount_out, receipt.amount_out);
    assert_eq!(quote.fee, receipt.fee);
}

#[test]
fn test_quote_reports_unfilled_input() {
    let mut h = Harness::new(25);
    h.add_liquidity(ALICE, Amounts::new(0, ONE), &[ID_OFFSET], &[0], &[FULL]);

    let quote = h.pair.get_swap_out(true, 10 * ONE).unwrap();
    assert!(quote.amount_in_left > 0);
    assert_eq!(quote.amount_out, ONE);
}

#[test]
fn test_swap_out_of_liquidity_leaves_state_untouched() {
    let mut h = Harness::new(25);
    h.seed_symmetric(ALICE, ONE, 1);
    let bins_before: Vec<_> = (ID_OFFSET - 1..=ID_OFFSET + 1)
        .map(|id| h.pair.get_bin(id))
        .collect();
    let reserves_before = h.pair.get_reserves_and_id();
    let fees_before = h.pair.get_global_fees();
    let parameters_before = *h.pair.fee_parameters();
    let oracle_before = h.pair.get_oracle_parameters();

    let err = h.swap(true, 100 * ONE).unwrap_err();
    assert_eq!(err, PairError::OutOfLiquidity);

    let bins_after: Vec<_> = (ID_OFFSET - 1..=ID_OFFSET + 1)
        .map(|id| h.pair.get_bin(id))
        .collect();
    assert_eq!(bins_after, bins_before);
    assert_eq!(h.pair.get_reserves_and_id(), reserves_before);
    assert_eq!(h.pair.get_global_fees(), fees_before);
    assert_eq!(*h.pair.fee_parameters(), parameters_before);
    assert_eq!(h.pair.get_oracle_parameters(), oracle_before);

    // The trader's input is still waiting in custody
    assert_eq!(h.pair.amounts_received(), Amounts::new(100 * ONE, 0));
    assert_eq!(h.wallet(TRADER), Amounts::ZERO);
}

#[test]
fn test_swap_without_input_is_rejected() {
    let mut h = Harness::new(25);
    h.seed_symmetric(ALICE, ONE, 1);

    let err = h.pair.swap(true, ONE, TRADER).unwrap_err();
    assert_eq!(
        err,
        PairError::InsufficientAmountIn {
            requested: ONE,
            received: 0
        }
    );

    let err = h.pair.swap(true, 0, TRADER).unwrap_err();
    assert!(matches!(err, PairError::InsufficientAmountIn { .. }));
}

#[test]
fn test_unbalanced_deposit_pays_composition_fee() {
    let mut h = Harness::new(25);
    h.add_liquidity(
        ALICE,
        Amounts::new(ONE, ONE),
        &[ID_OFFSET],
        &[FULL],
        &[FULL],
    );

    let receipt = h.add_liquidity(BOB, Amounts::new(0, ONE), &[ID_OFFSET], &[0], &[FULL]);

    assert_eq!(receipt.composition_fees.x, 0);
    assert!(receipt.composition_fees.y > 0);
    let (_, minted) = receipt.liquidity_minted[0];
    // At price 1.0 the naive share count equals the Y deposited
    assert!(minted < ONE);
    assert_eq!(receipt.amounts_added.y + receipt.composition_fees.y, ONE);

    // Existing LPs earn the fee, the depositor does not
    let alice_fees = h.pair.pending_fees(ALICE, &[ID_OFFSET]).unwrap();
    assert!(alice_fees.y > 0);
    assert_eq!(h.pair.pending_fees(BOB, &[ID_OFFSET]).unwrap(), Amounts::ZERO);

    let fees = h.pair.get_global_fees();
    assert_eq!(fees.total.y, receipt.composition_fees.y);
    assert!(fees.protocol.y > 0);
}

#[test]
fn test_balanced_deposit_pays_no_composition_fee() {
    let mut h = Harness::new(25);
    h.add_liquidity(ALICE, Amounts::new(ONE, ONE), &[ID_OFFSET], &[FULL], &[FULL]);
    let receipt = h.add_liquidity(BOB, Amounts::new(ONE, ONE), &[ID_OFFSET], &[FULL], &[FULL]);

    assert_eq!(receipt.composition_fees, Amounts::ZERO);
    assert_eq!(receipt.liquidity_minted, vec![(ID_OFFSET, 2 * ONE)]);
}

#[test]
fn test_mint_refunds_undistributed_tokens() {
    let mut h = Harness::new(25);
    let receipt = h.add_liquidity(
        ALICE,
        Amounts::new(ONE, ONE),
        &[ID_OFFSET],
        &[FULL / 2],
        &[FULL / 4],
    );

    assert_eq!(receipt.amounts_added, Amounts::new(ONE / 2, ONE / 4));
    assert_eq!(receipt.amounts_refunded, Amounts::new(ONE / 2, 3 * ONE / 4));
    assert_eq!(h.wallet(ALICE), receipt.amounts_refunded);
    assert_eq!(h.pair.amounts_received(), Amounts::ZERO);
}

#[test]
fn test_mint_rejects_malformed_distributions() {
    let mut h = Harness::new(25);
    h.send(ALICE, Amounts::new(ONE, ONE));

    let err = h
        .pair
        .mint(ALICE, &[ID_OFFSET - 1], &[FULL], &[0])
        .unwrap_err();
    assert_eq!(err, PairError::CompositionFactorFlawed { id: ID_OFFSET - 1 });

    let err = h
        .pair
        .mint(ALICE, &[ID_OFFSET + 1], &[0], &[FULL])
        .unwrap_err();
    assert_eq!(err, PairError::CompositionFactorFlawed { id: ID_OFFSET + 1 });

    let err = h
        .pair
        .mint(ALICE, &[ID_OFFSET, ID_OFFSET + 1], &[FULL, 1], &[0, 0])
        .unwrap_err();
    assert_eq!(err, PairError::DistributionsOverflow);

    let err = h.pair.mint(ALICE, &[ID_OFFSET], &[FULL, 0], &[0]).unwrap_err();
    assert!(matches!(err, PairError::InvalidInput(_)));

    let err = h.pair.mint(ALICE, &[ID_OFFSET], &[0], &[0]).unwrap_err();
    assert_eq!(err, PairError::InsufficientLiquidityMinted { id: ID_OFFSET });

    // Nothing was minted or paid out
    assert_eq!(h.pair.ledger().total_supply(ID_OFFSET), 0);
    assert_eq!(h.pair.amounts_received(), Amounts::new(ONE, ONE));
}

#[test]
fn test_burn_returns_proportional_reserves() {
    let mut h = Harness::new(25);
    h.seed_symmetric(ALICE, 2 * ONE, 1);
    let shares = h.pair.ledger().balance_of(ALICE, ID_OFFSET);

    let receipt = h
        .pair
        .burn(ALICE, ALICE, &[ID_OFFSET], &[shares / 2])
        .unwrap();

    let bin = h.pair.get_bin(ID_OFFSET);
    assert_eq!(receipt.amounts, Amounts::new(ONE / 2, ONE / 2));
    assert_eq!(bin.reserves(), Amounts::new(ONE / 2, ONE / 2));
    assert_eq!(h.wallet(ALICE), receipt.amounts);
}

#[test]
fn test_burn_everything_empties_the_tree() {
    let mut h = Harness::new(25);
    h.seed_symmetric(ALICE, ONE, 1);
    let ids = [ID_OFFSET - 1, ID_OFFSET, ID_OFFSET + 1];
    let amounts: Vec<u128> = ids
        .iter()
        .map(|&id| h.pair.ledger().balance_of(ALICE, id))
        .collect();

    h.pair.burn(ALICE, ALICE, &ids, &amounts).unwrap();

    let (reserves, _) = h.pair.get_reserves_and_id();
    assert_eq!(reserves, Amounts::ZERO);
    assert_eq!(h.pair.find_first_non_empty_bin_id(ID_OFFSET + 5, true), MAX_BIN_ID);
    assert_eq!(h.pair.find_first_non_empty_bin_id(ID_OFFSET - 5, false), 0);
    assert!(h.pair.ledger().bins_of(ALICE).is_empty());
}

#[test]
fn test_failed_burn_rolls_back_earlier_bins() {
    let mut h = Harness::new(25);
    h.seed_symmetric(ALICE, ONE, 1);
    let below = ID_OFFSET - 1;
    let shares_below = h.pair.ledger().balance_of(ALICE, below);
    let shares_active = h.pair.ledger().balance_of(ALICE, ID_OFFSET);
    let bin_before = h.pair.get_bin(below);

    let err = h
        .pair
        .burn(ALICE, ALICE, &[below, ID_OFFSET], &[shares_below, shares_active + 1])
        .unwrap_err();
    assert_eq!(
        err,
        PairError::InsufficientShares {
            id: ID_OFFSET,
            balance: shares_active,
            requested: shares_active + 1
        }
    );

    assert_eq!(h.pair.get_bin(below), bin_before);
    assert_eq!(h.pair.ledger().balance_of(ALICE, below), shares_below);
    assert_eq!(h.pair.find_first_non_empty_bin_id(ID_OFFSET, true), below);
    assert_eq!(h.wallet(ALICE), Amounts::ZERO);
}

#[test]
fn test_fees_are_shared_pro_rata_and_settle_once() {
    let mut h = Harness::new(25);
    h.add_liquidity(ALICE, Amounts::new(ONE, ONE), &[ID_OFFSET], &[FULL], &[FULL]);
    h.add_liquidity(BOB, Amounts::new(ONE, ONE), &[ID_OFFSET], &[FULL], &[FULL]);

    for _ in 0..3 {
        h.swap(true, ONE / 100).unwrap();
        h.clock.advance(10);
        h.swap(false, ONE / 100).unwrap();
        h.clock.advance(10);
    }

    let fees = h.pair.get_global_fees();
    let alice = h.pair.collect_fees(ALICE, &[ID_OFFSET]).unwrap();
    let bob = h.pair.collect_fees(BOB, &[ID_OFFSET, ID_OFFSET]).unwrap();

    assert!(alice.x > 0 && alice.y > 0);
    assert!(alice.x.abs_diff(bob.x) <= 1);
    assert!(alice.y.abs_diff(bob.y) <= 1);

    let lp_fees = fees.total.saturating_sub(fees.protocol);
    assert!(alice.x + bob.x <= lp_fees.x);
    assert!(alice.y + bob.y <= lp_fees.y);

    // A second claim without new swaps pays nothing
    assert_eq!(h.pair.collect_fees(ALICE, &[ID_OFFSET]).unwrap(), Amounts::ZERO);
    assert_eq!(h.wallet(ALICE), alice);

    let protocol = h.pair.collect_protocol_fees(FEE_RECIPIENT).unwrap();
    assert_eq!(protocol, fees.protocol);
    assert_eq!(h.pair.get_global_fees().protocol, Amounts::ZERO);
}

#[test]
fn test_share_transfer_keeps_earned_fees_with_sender() {
    let mut h = Harness::new(25);
    h.add_liquidity(ALICE, Amounts::new(ONE, ONE), &[ID_OFFSET], &[FULL], &[FULL]);
    h.swap(true, ONE / 10).unwrap();

    let earned = h.pair.pending_fees(ALICE, &[ID_OFFSET]).unwrap();
    assert!(earned.x > 0);

    let shares = h.pair.ledger().balance_of(ALICE, ID_OFFSET);
    h.pair.transfer_shares(ALICE, BOB, ID_OFFSET, shares).unwrap();

    assert_eq!(h.pair.pending_fees(ALICE, &[ID_OFFSET]).unwrap(), earned);
    assert_eq!(h.pair.pending_fees(BOB, &[ID_OFFSET]).unwrap(), Amounts::ZERO);

    h.clock.advance(60);
    h.swap(true, ONE / 10).unwrap();
    assert_eq!(h.pair.pending_fees(ALICE, &[ID_OFFSET]).unwrap(), earned);
    assert!(h.pair.pending_fees(BOB, &[ID_OFFSET]).unwrap().x > 0);

    let err = h
        .pair
        .transfer_shares(ALICE, BOB, ID_OFFSET, 1)
        .unwrap_err();
    assert!(matches!(err, PairError::InsufficientShares { .. }));
}

#[test]
fn test_zero_address_never_holds_shares() {
    let mut h = Harness::new(25);
    h.add_liquidity(ALICE, Amounts::new(ONE, ONE), &[ID_OFFSET], &[FULL], &[FULL]);
    h.swap(true, ONE / 10).unwrap();
    let earned = h.pair.pending_fees(ALICE, &[ID_OFFSET]).unwrap();
    let shares = h.pair.ledger().balance_of(ALICE, ID_OFFSET);

    let err = h
        .pair
        .transfer_shares(ALICE, Address::ZERO, ID_OFFSET, shares / 2)
        .unwrap_err();
    assert!(matches!(err, PairError::InvalidInput(_)));
    let err = h
        .pair
        .transfer_shares(Address::ZERO, ALICE, ID_OFFSET, 0)
        .unwrap_err();
    assert!(matches!(err, PairError::InvalidInput(_)));

    let err = h
        .pair
        .on_before_transfer(Some(ALICE), Some(Address::ZERO), ID_OFFSET, 1)
        .unwrap_err();
    assert!(matches!(err, PairError::InvalidInput(_)));
    let err = h
        .pair
        .on_before_transfer(None, None, ID_OFFSET, 1)
        .unwrap_err();
    assert!(matches!(err, PairError::InvalidInput(_)));

    h.send(BOB, Amounts::new(ONE, ONE));
    let err = h
        .pair
        .mint(Address::ZERO, &[ID_OFFSET], &[FULL], &[FULL])
        .unwrap_err();
    assert!(matches!(err, PairError::InvalidInput(_)));
    assert_eq!(h.pair.amounts_received(), Amounts::new(ONE, ONE));

    for (from, to) in [(ALICE, Address::ZERO), (Address::ZERO, ALICE)] {
        let err = h.pair.burn(from, to, &[ID_OFFSET], &[1]).unwrap_err();
        assert!(matches!(err, PairError::InvalidInput(_)));
    }

    assert_eq!(h.pair.ledger().balance_of(Address::ZERO, ID_OFFSET), 0);
    assert_eq!(h.pair.ledger().balance_of(ALICE, ID_OFFSET), shares);

    // Alice still owns every LP fee the bin earned
    let fees = h.pair.get_global_fees();
    let lp_fees = fees.total.saturating_sub(fees.protocol);
    assert_eq!(h.pair.collect_fees(ALICE, &[ID_OFFSET]).unwrap(), earned);
    assert!(lp_fees.x - earned.x <= 1);
}

#[test]
fn test_repeated_active_id_in_one_mint_leaves_no_stuck_fees() {
    let mut h = Harness::new(25);
    h.add_liquidity(ALICE, Amounts::new(ONE, ONE), &[ID_OFFSET], &[FULL], &[FULL]);

    let receipt = h.add_liquidity(
        BOB,
        Amounts::new(ONE, ONE),
        &[ID_OFFSET, ID_OFFSET],
        &[FULL, 0],
        &[FULL / 2, FULL / 2],
    );
    assert_eq!(receipt.liquidity_minted.len(), 2);
    assert!(receipt.composition_fees.y > 0);
    let minted: u128 = receipt.liquidity_minted.iter().map(|(_, amount)| amount).sum();
    assert_eq!(h.pair.ledger().balance_of(BOB, ID_OFFSET), minted);

    let fees = h.pair.get_global_fees();
    let lp_fees = fees.total.saturating_sub(fees.protocol);
    let alice = h.pair.collect_fees(ALICE, &[ID_OFFSET]).unwrap();
    let bob = h.pair.collect_fees(BOB, &[ID_OFFSET]).unwrap();

    // Bob's first shares earn part of the fee of his second entry
    assert!(bob.y > 0);
    assert!(lp_fees.covers(&alice.checked_add(bob).unwrap()));

    let after = h.pair.get_global_fees();
    let dust = after.total.saturating_sub(after.protocol);
    assert!(dust.x <= 2 && dust.y <= 2, "unclaimable LP fees {:?}", dust);
}

#[test]
fn test_oracle_extrapolates_beyond_history() {
    let mut h = Harness::new(25);
    h.seed_symmetric(ALICE, 10 * ONE, 3);
    h.clock.advance(100);
    h.swap(true, ONE / 10).unwrap();
    let (_, active_id) = h.pair.get_reserves_and_id();

    h.clock.advance(50);
    let now = START_TIME + 150;

    let latest = h.pair.get_oracle_sample_from(0);
    assert_eq!(latest.timestamp, now);
    assert_eq!(latest.cumulative_id, active_id as u128 * 50);

    let recent = h.pair.get_oracle_sample_from(20);
    assert_eq!(recent.cumulative_id, active_id as u128 * 30);

    // Far before the first sample: walked back and clamped at zero
    let ancient = h.pair.get_oracle_sample_from(10_000);
    assert_eq!(ancient.timestamp, now - 10_000);
    assert_eq!(ancient.cumulative_id, 0);

    let parameters = h.pair.get_oracle_parameters();
    assert_eq!(parameters.active_size, 1);
    assert_eq!(parameters.last_timestamp, START_TIME + 100);
}

#[test]
fn test_oracle_writes_new_sample_after_lifetime() {
    let mut h = Harness::new(25);
    h.seed_symmetric(ALICE, 10 * ONE, 3);
    h.pair.increase_oracle_length(4).unwrap();

    h.clock.advance(10);
    h.swap(true, ONE / 10).unwrap();
    h.clock.advance(200);
    h.swap(false, ONE / 10).unwrap();

    let parameters = h.pair.get_oracle_parameters();
    assert_eq!(parameters.size, 4);
    assert_eq!(parameters.active_size, 2);
    assert_eq!(parameters.write_index, 1);

    let err = h.pair.increase_oracle_length(3).unwrap_err();
    assert!(matches!(err, PairError::Oracle(_)));
}

struct Borrower {
    address: Address,
    repay_fee: bool,
    reentry: Option<PairError>,
    reserves_seen: Option<Amounts>,
}

impl Borrower {
    fn new(repay_fee: bool) -> Self {
        Self {
            address: Address::repeat_byte(0xf1),
            repay_fee,
            reentry: None,
            reserves_seen: None,
        }
    }
}

impl FlashLoanReceiver<InMemoryShareLedger, TokenAccounts> for Borrower {
    fn address(&self) -> Address {
        self.address
    }

    fn on_flash_loan(
        &mut self,
        pair: &mut LbPair<InMemoryShareLedger, TokenAccounts>,
        _sender: Address,
        amounts: Amounts,
        fees: Amounts,
        _data: &[u8],
    ) -> anyhow::Result<()> {
        self.reserves_seen = Some(pair.get_reserves_and_id().0);
        self.reentry = pair.swap(true, 1, self.address).err();

        let mut repay = amounts;
        if self.repay_fee {
            pair.vault_mut().mint_to(self.address, fees)?;
            repay = Amounts::new(amounts.x + fees.x, amounts.y + fees.y);
        }
        pair.vault_mut().deposit(self.address, repay)?;
        Ok(())
    }
}

#[test]
fn test_flash_loan_rejects_reentry_and_credits_fee() {
    let mut h = Harness::new(25);
    h.seed_symmetric(ALICE, 10 * ONE, 2);
    let (reserves, _) = h.pair.get_reserves_and_id();
    let mut borrower = Borrower::new(true);

    let fees = h
        .pair
        .flash_loan(TRADER, &mut borrower, Amounts::new(ONE, 0), b"arb")
        .unwrap();

    // 0.05% default flash loan fee
    assert_eq!(fees, Amounts::new(ONE / 2_000, 0));
    assert_eq!(borrower.reentry, Some(PairError::Reentrancy));
    assert_eq!(borrower.reserves_seen, Some(reserves));

    let global = h.pair.get_global_fees();
    assert_eq!(global.total.x, ONE / 2_000);
    assert_eq!(global.protocol.x, ONE / 20_000);
    assert!(h.pair.pending_fees(ALICE, &[ID_OFFSET]).unwrap().x > 0);
    assert_eq!(h.wallet(borrower.address), Amounts::ZERO);
    assert_eq!(h.pair.amounts_received(), Amounts::ZERO);
}

#[test]
fn test_unpaid_flash_loan_is_unwound() {
    let mut h = Harness::new(25);
    h.seed_symmetric(ALICE, 10 * ONE, 2);
    let custody_before = h.custody();
    let mut borrower = Borrower::new(false);

    let err = h
        .pair
        .flash_loan(TRADER, &mut borrower, Amounts::new(ONE, 0), &[])
        .unwrap_err();
    assert_eq!(
        err,
        PairError::FlashLoanInsufficientAmount {
            side: TokenSide::X,
            balance: custody_before.x,
            required: custody_before.x + ONE / 2_000,
        }
    );

    assert_eq!(h.custody(), custody_before);
    assert_eq!(h.wallet(borrower.address), Amounts::ZERO);
    assert_eq!(h.pair.get_global_fees().total, Amounts::ZERO);

    let err = h
        .pair
        .flash_loan(TRADER, &mut borrower, Amounts::ZERO, &[])
        .unwrap_err();
    assert_eq!(err, PairError::ZeroBorrowAmount);
}

#[test]
fn test_admin_operations_require_roles() {
    let mut h = Harness::new(25);
    let stranger = Address::repeat_byte(0x99);

    assert_eq!(
        h.pair.force_decay(stranger).unwrap_err(),
        PairError::AccessDenied { caller: stranger }
    );
    assert_eq!(
        h.pair.collect_protocol_fees(stranger).unwrap_err(),
        PairError::AccessDenied { caller: stranger }
    );

    let mut preset = FeePreset::standard(25).unwrap();
    preset.base_factor = 5_000;
    assert_eq!(
        h.pair.set_fee_parameters(stranger, preset).unwrap_err(),
        PairError::AccessDenied { caller: stranger }
    );

    h.pair.set_fee_parameters(OWNER, preset).unwrap();
    assert_eq!(h.pair.fee_parameters().base_factor, 5_000);

    let other_step = FeePreset::standard(100).unwrap();
    assert!(matches!(
        h.pair.set_fee_parameters(OWNER, other_step).unwrap_err(),
        PairError::InvalidInput(_)
    ));

    let mut invalid = preset;
    invalid.decay_period = invalid.filter_period;
    assert!(matches!(
        h.pair.set_fee_parameters(OWNER, invalid).unwrap_err(),
        PairError::Config(_)
    ));

    h.pair.force_decay(OWNER).unwrap();
}

#[test]
fn test_force_decay_reduces_reference() {
    let mut h = Harness::new(25);
    h.seed_symmetric(ALICE, 3 * ONE, 2);
    h.swap(true, 5 * ONE / 2).unwrap();
    h.clock.advance(100);
    // A tiny swap after the filter period moves the accumulator into the reference
    h.swap(true, 1_000).unwrap();
    let reference = h.pair.fee_parameters().volatility_reference;
    assert_eq!(reference, 10_000);

    h.pair.force_decay(OWNER).unwrap();
    let parameters = h.pair.fee_parameters();
    assert_eq!(parameters.volatility_reference, 5_000);
    assert_eq!(parameters.index_reference, h.pair.get_reserves_and_id().1);
}
