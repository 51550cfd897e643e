//! Three-level bitmap index over the 24-bit bin id space
//!
//! Each level consumes one byte of the id: the root bitmap marks populated
//! top bytes, the middle bitmaps mark populated `id >> 8` prefixes and the
//! leaves mark individual ids. Finding the nearest populated bin touches at
//! most three bitmaps on the way up and three on the way down, no matter how
//! many bins are populated.

use std::collections::HashMap;
use types::bit_math::{
    closest_bit_left, closest_bit_right, least_significant_bit, most_significant_bit,
};
use types::{SearchDirection, MAX_BIN_ID, U256};

/// Returned by `find_first_non_empty` when nothing exists above
pub const SENTINEL_UP: u32 = 0;

/// Returned by `find_first_non_empty` when nothing exists below
pub const SENTINEL_DOWN: u32 = MAX_BIN_ID;

#[derive(Debug, Clone)]
pub struct BinTree {
    level0: U256,
    /// Keyed by `id >> 16`
    level1: Vec<U256>,
    /// Keyed by `id >> 8`; empty leaves are dropped
    level2: HashMap<u32, U256>,
    len: usize,
}

impl Default for BinTree {
    fn default() -> Self {
        Self::new()
    }
}

impl BinTree {
    pub fn new() -> Self {
        Self {
            level0: U256::ZERO,
            level1: vec![U256::ZERO; 256],
            level2: HashMap::new(),
            len: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.level0.is_zero()
    }

    pub fn contains(&self, id: u32) -> bool {
        if id > MAX_BIN_ID {
            return false;
        }
        self.level2
            .get(&(id >> 8))
            .map(|leaves| leaves.bit((id & 0xff) as usize))
            .unwrap_or(false)
    }

    /// Mark `id` as populated. Returns false if it already was or is out of range.
    pub fn insert(&mut self, id: u32) -> bool {
        if id > MAX_BIN_ID || self.contains(id) {
            return false;
        }

        let key2 = id >> 8;
        let key1 = (id >> 16) as usize;
        let leaves = self.level2.entry(key2).or_insert(U256::ZERO);
        *leaves |= bit(id & 0xff);
        self.level1[key1] |= bit(key2 & 0xff);
        self.level0 |= bit(key1 as u32);

        self.len += 1;
        true
    }

    /// Clear `id`. Returns false if it was not populated.
    pub fn remove(&mut self, id: u32) -> bool {
        if !self.contains(id) {
            return false;
        }

        let key2 = id >> 8;
        let key1 = (id >> 16) as usize;

        let leaf_empty = match self.level2.get_mut(&key2) {
            Some(leaves) => {
                *leaves &= !bit(id & 0xff);
                leaves.is_zero()
            }
            None => false,
        };

        if leaf_empty {
            self.level2.remove(&key2);
            self.level1[key1] &= !bit(key2 & 0xff);
            if self.level1[key1].is_zero() {
                self.level0 &= !bit(key1 as u32);
            }
        }

        self.len -= 1;
        true
    }

    /// Nearest populated id strictly above (`Up`) or below (`Down`) `from`.
    ///
    /// Returns [`SENTINEL_UP`] or [`SENTINEL_DOWN`] when there is none; callers
    /// must treat those as "no liquidity" rather than as a bin.
    pub fn find_first_non_empty(&self, from: u32, direction: SearchDirection) -> u32 {
        match direction {
            SearchDirection::Down => self.find_below(from).unwrap_or(SENTINEL_DOWN),
            SearchDirection::Up => self.find_above(from).unwrap_or(SENTINEL_UP),
        }
    }

    fn leaves(&self, key2: u32) -> U256 {
        self.level2.get(&key2).copied().unwrap_or(U256::ZERO)
    }

    fn find_below(&self, id: u32) -> Option<u32> {
        let key2 = id >> 8;
        let bit2 = (id & 0xff) as u8;
        if bit2 != 0 {
            if let Some(found) = closest_bit_right(self.leaves(key2), bit2 - 1) {
                return Some(key2 << 8 | found as u32);
            }
        }

        let key1 = key2 >> 8;
        let bit1 = (key2 & 0xff) as u8;
        if bit1 != 0 {
            if let Some(found) = closest_bit_right(self.level1[key1 as usize], bit1 - 1) {
                let key2 = key1 << 8 | found as u32;
                return self.highest_in_leaf(key2);
            }
        }

        let bit0 = (key1 & 0xff) as u8;
        if bit0 != 0 {
            if let Some(found) = closest_bit_right(self.level0, bit0 - 1) {
                let key1 = found as u32;
                let middle = most_significant_bit(self.level1[key1 as usize]).ok()?;
                return self.highest_in_leaf(key1 << 8 | middle as u32);
            }
        }

        None
    }

    fn find_above(&self, id: u32) -> Option<u32> {
        let key2 = id >> 8;
        let bit2 = (id & 0xff) as u8;
        if bit2 != u8::MAX {
            if let Some(found) = closest_bit_left(self.leaves(key2), bit2 + 1) {
                return Some(key2 << 8 | found as u32);
            }
        }

        let key1 = key2 >> 8;
        let bit1 = (key2 & 0xff) as u8;
        if bit1 != u8::MAX {
            if let Some(found) = closest_bit_left(self.level1[key1 as usize], bit1 + 1) {
                let key2 = key1 << 8 | found as u32;
                return self.lowest_in_leaf(key2);
            }
        }

        let bit0 = (key1 & 0xff) as u8;
        if bit0 != u8::MAX {
            if let Some(found) = closest_bit_left(self.level0, bit0 + 1) {
                let key1 = found as u32;
                let middle = least_significant_bit(self.level1[key1 as usize]).ok()?;
                return self.lowest_in_leaf(key1 << 8 | middle as u32);
            }
        }

        None
    }

    fn highest_in_leaf(&self, key2: u32) -> Option<u32> {
        let leaf = most_significant_bit(self.leaves(key2)).ok()?;
        Some(key2 << 8 | leaf as u32)
    }

    fn lowest_in_leaf(&self, key2: u32) -> Option<u32> {
        let leaf = least_significant_bit(self.leaves(key2)).ok()?;
        Some(key2 << 8 | leaf as u32)
    }
}

fn bit(position: u32) -> U256 {
    U256::ONE << position as usize
}
