//! Bin id constants and token amount pairs

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Bin id whose price is exactly 1.0
pub const ID_OFFSET: u32 = 1 << 23;

/// Largest valid bin id (ids are 24-bit)
pub const MAX_BIN_ID: u32 = (1 << 24) - 1;

/// One of the two assets of a pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum TokenSide {
    X,
    Y,
}

impl TokenSide {
    pub fn other(self) -> Self {
        match self {
            TokenSide::X => TokenSide::Y,
            TokenSide::Y => TokenSide::X,
        }
    }
}

/// Direction to walk the bin tree from a starting id
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum SearchDirection {
    /// Towards higher ids (higher price of X)
    Up,
    /// Towards lower ids
    Down,
}

impl SearchDirection {
    /// Walk direction for a swap: selling X for Y pushes the price down.
    pub fn for_swap(swap_for_y: bool) -> Self {
        if swap_for_y {
            SearchDirection::Down
        } else {
            SearchDirection::Up
        }
    }
}

/// A pair of token amounts, X first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Amounts {
    pub x: u128,
    pub y: u128,
}

impl Amounts {
    pub const ZERO: Amounts = Amounts { x: 0, y: 0 };

    pub const fn new(x: u128, y: u128) -> Self {
        Self { x, y }
    }

    /// Amount on a single side, zero on the other
    pub fn only(side: TokenSide, amount: u128) -> Self {
        match side {
            TokenSide::X => Self::new(amount, 0),
            TokenSide::Y => Self::new(0, amount),
        }
    }

    pub fn get(&self, side: TokenSide) -> u128 {
        match side {
            TokenSide::X => self.x,
            TokenSide::Y => self.y,
        }
    }

    pub fn get_mut(&mut self, side: TokenSide) -> &mut u128 {
        match side {
            TokenSide::X => &mut self.x,
            TokenSide::Y => &mut self.y,
        }
    }

    pub fn is_zero(&self) -> bool {
        self.x == 0 && self.y == 0
    }

    pub fn checked_add(self, other: Amounts) -> Option<Amounts> {
        Some(Amounts::new(
            self.x.checked_add(other.x)?,
            self.y.checked_add(other.y)?,
        ))
    }

    pub fn checked_sub(self, other: Amounts) -> Option<Amounts> {
        Some(Amounts::new(
            self.x.checked_sub(other.x)?,
            self.y.checked_sub(other.y)?,
        ))
    }

    pub fn saturating_sub(self, other: Amounts) -> Amounts {
        Amounts::new(
            self.x.saturating_sub(other.x),
            self.y.saturating_sub(other.y),
        )
    }

    /// True when both sides are greater than or equal to `other`'s
    pub fn covers(&self, other: &Amounts) -> bool {
        self.x >= other.x && self.y >= other.y
    }
}
