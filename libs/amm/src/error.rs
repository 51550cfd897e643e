//! Pair operation errors
//!
//! Every variant aborts the whole operation; no partial state survives an
//! error.

use crate::ledger::LedgerError;
use crate::oracle::OracleError;
use crate::vault::TransferError;
use lb_config::ConfigError;
use thiserror::Error;
use types::{Address, MathError, TokenSide};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PairError {
    /// Deposit puts the wrong token on one side of the active bin
    #[error("Composition factor flawed for bin {id}")]
    CompositionFactorFlawed { id: u32 },

    /// Distribution weights sum above 1e18
    #[error("Distributions overflow")]
    DistributionsOverflow,

    #[error("Insufficient liquidity minted in bin {id}")]
    InsufficientLiquidityMinted { id: u32 },

    #[error("Insufficient liquidity burned in bin {id}")]
    InsufficientLiquidityBurned { id: u32 },

    #[error("Account holds {balance} shares of bin {id}, {requested} requested")]
    InsufficientShares {
        id: u32,
        balance: u128,
        requested: u128,
    },

    /// Malformed arguments (length mismatches, empty lists, immutable fields)
    #[error("Invalid input: {0}")]
    InvalidInput(&'static str),

    /// Declared input is zero or exceeds what the pair received
    #[error("Insufficient amount in: requested {requested}, received {received}")]
    InsufficientAmountIn { requested: u128, received: u128 },

    #[error("Swap produced no output")]
    InsufficientAmountOut,

    /// No populated bin left in the swap direction
    #[error("Out of liquidity")]
    OutOfLiquidity,

    /// A bin or aggregate reserve would exceed u128
    #[error("Reserve overflow in bin {id}")]
    ReserveOverflow { id: u32 },

    #[error("Math error: {0}")]
    Math(#[from] MathError),

    #[error("Access denied for {caller}")]
    AccessDenied { caller: Address },

    /// A state-changing call was made while another one is in progress
    #[error("Reentrant call rejected")]
    Reentrancy,

    #[error("Flash loan requested zero amounts")]
    ZeroBorrowAmount,

    #[error("Flash loan not repaid for token {side:?}: balance {balance}, required {required}")]
    FlashLoanInsufficientAmount {
        side: TokenSide,
        balance: u128,
        required: u128,
    },

    #[error("Flash loan callback failed: {0}")]
    FlashLoanCallback(String),

    #[error("Transfer failed: {0}")]
    Transfer(#[from] TransferError),

    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),

    #[error("Oracle error: {0}")]
    Oracle(#[from] OracleError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}
