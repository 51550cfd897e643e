//! Pair simulator
//!
//! Builds a pair from a config file (or a standard preset), seeds liquidity
//! symmetrically around the active bin, runs one swap and prints the
//! resulting pair state as JSON.

use anyhow::{Context, Result};
use clap::Parser;
use lb_amm::price::{price_from_id, price_to_decimal};
use lb_amm::{
    Clock, FeeParameters, FeeTotals, InMemoryShareLedger, LbPair, ManualClock, MintReceipt,
    OracleParameters, OracleSample, SwapReceipt, TokenAccounts,
};
use lb_config::{PairConfig, PairRoles};
use rust_decimal::Decimal;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;
use types::fixed_point::PRECISION;
use types::{Address, Amounts, ID_OFFSET};

#[derive(Parser, Debug)]
#[command(author, version, about = "Simulate swaps against a liquidity book pair", long_about = None)]
struct Args {
    /// Pair configuration file; a standard preset is used when absent
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Environment overlay name (environments/<name>.toml next to the config)
    #[arg(short, long)]
    environment: Option<String>,

    /// Bin step of the standard preset
    #[arg(long, default_value_t = 25)]
    bin_step: u16,

    /// Bins seeded on each side of the active bin
    #[arg(long, default_value_t = 10)]
    spread: u32,

    /// Token X deposited across the active bin and the bins above it
    #[arg(long, default_value_t = 1_000_000_000_000_000_000_000)]
    liquidity_x: u128,

    /// Token Y deposited across the active bin and the bins below it
    #[arg(long, default_value_t = 1_000_000_000_000_000_000_000)]
    liquidity_y: u128,

    /// Swap input amount
    #[arg(long, default_value_t = 10_000_000_000_000_000_000)]
    amount_in: u128,

    /// Swap Y for X instead of X for Y
    #[arg(long)]
    buy_x: bool,

    /// Seconds between seeding and the swap
    #[arg(long, default_value_t = 60)]
    advance: u64,

    /// Start time of the simulated clock (unix seconds)
    #[arg(long, default_value_t = 1_700_000_000)]
    start_time: u64,
}

#[derive(Debug, Serialize)]
struct Report {
    active_id: u32,
    active_price: Decimal,
    reserves: Amounts,
    fees: FeeTotals,
    fee_parameters: FeeParameters,
    oracle: OracleParameters,
    oracle_sample: OracleSample,
    mint: MintReceipt,
    swap: SwapReceipt,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = load_config(&args)?;
    info!(
        bin_step = config.fee.bin_step,
        active_id = config.active_id,
        "Simulating pair"
    );

    let clock = Arc::new(ManualClock::new(args.start_time));
    let mut pair = LbPair::new(
        &config,
        InMemoryShareLedger::new(),
        TokenAccounts::new(),
        clock.clone(),
    )
    .context("Failed to initialize pair")?;

    let provider = Address::repeat_byte(0x11);
    let trader = Address::repeat_byte(0x22);

    let mint = seed_liquidity(&mut pair, provider, &args)?;
    clock.advance(args.advance);

    let swap_for_y = !args.buy_x;
    let input = if swap_for_y {
        Amounts::new(args.amount_in, 0)
    } else {
        Amounts::new(0, args.amount_in)
    };
    pair.vault_mut()
        .mint_to(trader, input)
        .context("Failed to fund trader")?;
    pair.vault_mut()
        .deposit(trader, input)
        .context("Failed to send swap input")?;
    let swap = pair
        .swap(swap_for_y, args.amount_in, trader)
        .context("Swap failed")?;

    let (reserves, active_id) = pair.get_reserves_and_id();
    let active_price = price_from_id(active_id, config.fee.bin_step)
        .and_then(price_to_decimal)
        .context("Failed to price active bin")?;

    let report = Report {
        active_id,
        active_price,
        reserves,
        fees: pair.get_global_fees(),
        fee_parameters: *pair.fee_parameters(),
        oracle: pair.get_oracle_parameters(),
        oracle_sample: pair.get_oracle_sample_from(0),
        mint,
        swap,
    };
    info!(now = clock.now(), "Simulation complete");

    println!(
        "{}",
        serde_json::to_string_pretty(&report).context("Failed to serialize report")?
    );
    Ok(())
}

fn load_config(args: &Args) -> Result<PairConfig> {
    match &args.config {
        Some(path) => PairConfig::load(Some(path.as_path()), args.environment.as_deref()),
        None => {
            let roles = PairRoles {
                owner: Address::repeat_byte(0x01),
                protocol_fee_recipient: Address::repeat_byte(0x02),
            };
            PairConfig::with_standard_preset(
                Address::repeat_byte(0x0a),
                Address::repeat_byte(0x0b),
                args.bin_step,
                ID_OFFSET,
                roles,
            )
            .context("Failed to build standard pair config")
        }
    }
}

fn seed_liquidity(
    pair: &mut LbPair<InMemoryShareLedger, TokenAccounts>,
    provider: Address,
    args: &Args,
) -> Result<MintReceipt> {
    let (_, active_id) = pair.get_reserves_and_id();
    let low = active_id
        .checked_sub(args.spread)
        .context("Spread reaches below the first bin")?;
    let high = active_id
        .checked_add(args.spread)
        .context("Spread reaches above the last bin")?;

    let per_bin = PRECISION / (args.spread as u128 + 1);
    let ids: Vec<u32> = (low..=high).collect();
    let distribution_x: Vec<u64> = ids
        .iter()
        .map(|&id| if id >= active_id { per_bin as u64 } else { 0 })
        .collect();
    let distribution_y: Vec<u64> = ids
        .iter()
        .map(|&id| if id <= active_id { per_bin as u64 } else { 0 })
        .collect();

    let deposit = Amounts::new(args.liquidity_x, args.liquidity_y);
    pair.vault_mut()
        .mint_to(provider, deposit)
        .context("Failed to fund provider")?;
    pair.vault_mut()
        .deposit(provider, deposit)
        .context("Failed to send liquidity")?;

    pair.mint(provider, &ids, &distribution_x, &distribution_y)
        .context("Failed to seed liquidity")
}
