//! # Liquidity Book Shared Types
//!
//! Primitive types and fixed-point math shared by the pair engine and its
//! configuration crate.
//!
//! ## Design Philosophy
//!
//! - **No Precision Loss**: prices are 128.128 fixed point, fee rates 1e18 fixed
//!   point, both carried in 256-bit integers
//! - **Checked Arithmetic**: every helper returns `Result<_, MathError>`
//! - **Clear Boundaries**: amounts are `u128`; widening to `U256` happens only
//!   inside the math helpers
//!
//! ## Quick Start
//!
//! ```rust
//! use types::{fixed_point, Amounts, U256};
//!
//! // 0.5 * 3 in 128.128 fixed point, rounded up
//! let half = fixed_point::SCALE >> 1usize;
//! let value = fixed_point::mul_shift_round_up(half, U256::from(3u64), 128).unwrap();
//! assert_eq!(value, U256::from(2u64));
//!
//! let received = Amounts::new(1_000, 2_000);
//! assert!(!received.is_zero());
//! ```

pub mod common;
pub mod primitives;

pub use alloy_primitives::{Address, U256};
pub use common::bit_math;
pub use common::errors::MathError;
pub use common::fixed_point;
pub use primitives::{Amounts, SearchDirection, TokenSide, ID_OFFSET, MAX_BIN_ID};
