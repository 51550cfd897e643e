//! # Liquidity Book Pair Engine
//!
//! ## Purpose
//!
//! Exchange engine for a single token pair whose liquidity sits in discrete
//! constant-price bins. Traders walk across bins in price order; liquidity
//! providers hold per-bin shares and earn fees pro rata to the time they held
//! them. Fees combine a static base rate with a variable rate driven by recent
//! volatility, and a ring-buffer oracle records time-weighted cumulatives.
//!
//! ## Integration Points
//!
//! - **Configuration**: [`lb_config::PairConfig`] supplies tokens, bin step,
//!   fee preset, oracle settings and roles
//! - **Share Ledger**: [`ShareLedger`] holds LP balances per `(account, bin)`;
//!   [`InMemoryShareLedger`] ships for tests and simulation
//! - **Token Custody**: [`TokenVault`] holds the pair's tokens and executes
//!   payouts; [`TokenAccounts`] is the in-memory version
//! - **Time**: [`Clock`] ([`SystemClock`], or [`ManualClock`] in tests)
//!
//! ## Architecture Role
//!
//! Leaf components first:
//!
//! - [`price`]: bin id <-> 128.128 price conversion
//! - [`bin_tree`]: three-level bitmap locating the next populated bin
//! - [`volatility`]: volatility accumulator and fee computation
//! - [`oracle`]: cumulative sample ring with interpolation
//! - [`fee_ledger`]: fee-per-share accumulators and account debts
//! - [`pair`]: [`LbPair`], tying everything together behind an atomic,
//!   reentrancy-guarded call interface
//!
//! ## Quick Start
//!
//! ```rust
//! use lb_amm::{InMemoryShareLedger, LbPair, ManualClock, TokenAccounts};
//! use lb_config::{PairConfig, PairRoles};
//! use std::sync::Arc;
//! use types::{Address, Amounts, ID_OFFSET};
//!
//! let roles = PairRoles {
//!     owner: Address::repeat_byte(0x01),
//!     protocol_fee_recipient: Address::repeat_byte(0x02),
//! };
//! let config = PairConfig::with_standard_preset(
//!     Address::repeat_byte(0x0a),
//!     Address::repeat_byte(0x0b),
//!     25,
//!     ID_OFFSET,
//!     roles,
//! )
//! .unwrap();
//!
//! let clock = Arc::new(ManualClock::new(1_000));
//! let mut pair = LbPair::new(
//!     &config,
//!     InMemoryShareLedger::new(),
//!     TokenAccounts::new(),
//!     clock,
//! )
//! .unwrap();
//!
//! let lp = Address::repeat_byte(0x10);
//! pair.vault_mut().mint_to(lp, Amounts::new(1_000_000, 1_000_000)).unwrap();
//! pair.vault_mut().deposit(lp, Amounts::new(1_000_000, 1_000_000)).unwrap();
//! pair.mint(lp, &[ID_OFFSET], &[1_000_000_000_000_000_000], &[1_000_000_000_000_000_000])
//!     .unwrap();
//!
//! let (reserves, active_id) = pair.get_reserves_and_id();
//! assert_eq!(reserves, Amounts::new(1_000_000, 1_000_000));
//! assert_eq!(active_id, ID_OFFSET);
//! ```

pub mod bin_tree;
pub mod clock;
pub mod error;
pub mod fee_ledger;
pub mod journal;
pub mod ledger;
pub mod oracle;
pub mod pair;
pub mod price;
pub mod vault;
pub mod volatility;

pub use bin_tree::BinTree;
pub use clock::{Clock, ManualClock, SystemClock};
pub use error::PairError;
pub use fee_ledger::FeeAccrualLedger;
pub use ledger::{InMemoryShareLedger, LedgerError, ShareLedger};
pub use oracle::{Oracle, OracleError, OracleParameters, OracleSample};
pub use pair::{
    Bin, BurnReceipt, FeeTotals, FlashLoanReceiver, LbPair, MintReceipt, PairState, SwapQuote,
    SwapReceipt, SwapStep,
};
pub use vault::{TokenAccounts, TokenVault, TransferError};
pub use volatility::{FeeDistribution, FeeParameters};
