//! Time-weighted oracle
//!
//! A fixed-capacity ring of cumulative samples. Each sample carries
//! `sum(active_id * dt)`, `sum(volatility * dt)` and `sum(bins_crossed * dt)`
//! since genesis, so the average over any window is the difference of two
//! samples divided by the elapsed time. Cumulatives wrap on overflow; only
//! differences are meaningful.
//!
//! Updates within `sample_lifetime` of the last written sample fold into the
//! same slot; a new slot is used at most once per lifetime.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;
use types::fixed_point::to_u128;
use types::U256;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum OracleError {
    /// Oracle length can only grow
    #[error("Oracle length {requested} must exceed current length {current}")]
    InvalidLength { current: u16, requested: u16 },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OracleSample {
    pub timestamp: u64,
    pub cumulative_id: u128,
    pub cumulative_volatility: u128,
    pub cumulative_bins_crossed: u128,
}

impl OracleSample {
    /// Fold this sample forward to `now` with values held since its timestamp
    fn advanced(&self, now: u64, active_id: u32, volatility: u32, bins_crossed: u32) -> Self {
        let dt = now.saturating_sub(self.timestamp) as u128;
        Self {
            timestamp: now,
            cumulative_id: self
                .cumulative_id
                .wrapping_add((active_id as u128).wrapping_mul(dt)),
            cumulative_volatility: self
                .cumulative_volatility
                .wrapping_add((volatility as u128).wrapping_mul(dt)),
            cumulative_bins_crossed: self
                .cumulative_bins_crossed
                .wrapping_add((bins_crossed as u128).wrapping_mul(dt)),
        }
    }

    /// Walk this sample back to `earlier` assuming constant values
    fn rewound(&self, earlier: u64, active_id: u32, volatility: u32) -> Self {
        let dt = self.timestamp.saturating_sub(earlier) as u128;
        Self {
            timestamp: earlier,
            cumulative_id: self
                .cumulative_id
                .saturating_sub((active_id as u128).saturating_mul(dt)),
            cumulative_volatility: self
                .cumulative_volatility
                .saturating_sub((volatility as u128).saturating_mul(dt)),
            cumulative_bins_crossed: self.cumulative_bins_crossed,
        }
    }
}

/// Oracle bookkeeping
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OracleParameters {
    pub sample_lifetime: u16,
    /// Allocated slots
    pub size: u16,
    /// Slots holding written samples
    pub active_size: u16,
    /// Timestamp of the last slot change; zero before the first update
    pub last_timestamp: u64,
    pub write_index: u16,
}

/// State needed to undo one `update`
#[derive(Debug, Clone)]
pub struct OracleCheckpoint {
    parameters: OracleParameters,
    len: usize,
    slots: Vec<(usize, OracleSample)>,
}

#[derive(Debug, Clone)]
pub struct Oracle {
    parameters: OracleParameters,
    samples: Vec<OracleSample>,
}

impl Oracle {
    pub fn new(sample_lifetime: u16, length: u16) -> Self {
        Self {
            parameters: OracleParameters {
                sample_lifetime,
                size: length,
                ..Default::default()
            },
            samples: vec![OracleSample::default(); length as usize],
        }
    }

    pub fn parameters(&self) -> OracleParameters {
        self.parameters
    }

    pub fn sample(&self, index: u16) -> Option<OracleSample> {
        self.samples.get(index as usize).copied()
    }

    /// Grow capacity; fresh slots start zeroed.
    pub fn increase_length(&mut self, new_length: u16) -> Result<(), OracleError> {
        if new_length <= self.parameters.size {
            return Err(OracleError::InvalidLength {
                current: self.parameters.size,
                requested: new_length,
            });
        }
        self.samples
            .resize(new_length as usize, OracleSample::default());
        self.parameters.size = new_length;
        debug!(new_length, "Oracle length increased");
        Ok(())
    }

    /// Record the state left by a swap.
    pub fn update(&mut self, now: u64, active_id: u32, volatility: u32, bins_crossed: u32) {
        let params = &mut self.parameters;
        if params.size == 0 {
            return;
        }

        if params.last_timestamp == 0 {
            // Genesis: zero cumulatives anchored at `now`
            params.write_index = 0;
            params.last_timestamp = now;
            params.active_size = params.active_size.max(1);
            self.samples[0] = OracleSample {
                timestamp: now,
                ..Default::default()
            };
            return;
        }

        let current = params.write_index as usize;
        let updated = self.samples[current].advanced(now, active_id, volatility, bins_crossed);

        if now.saturating_sub(params.last_timestamp) >= params.sample_lifetime as u64 {
            let next = (params.write_index as usize + 1) % params.size as usize;
            params.write_index = next as u16;
            params.last_timestamp = now;
            if next == params.active_size as usize {
                params.active_size += 1;
            }
            self.samples[next] = updated;
        } else {
            self.samples[current] = updated;
        }
    }

    /// Cumulative values at `lookup_timestamp`.
    ///
    /// Interpolates between the bracketing samples. Lookups outside the
    /// recorded range are extrapolated with the given active id and
    /// volatility, backwards from the oldest sample or forwards from the
    /// newest.
    pub fn sample_at(&self, lookup_timestamp: u64, active_id: u32, volatility: u32) -> OracleSample {
        let params = &self.parameters;
        if params.active_size == 0 {
            return OracleSample {
                timestamp: lookup_timestamp,
                ..Default::default()
            };
        }

        let active_size = params.active_size as usize;
        let newest_index = params.write_index as usize;
        let oldest_index = (newest_index + 1) % active_size;
        let oldest = self.samples[oldest_index];
        let newest = self.samples[newest_index];

        if lookup_timestamp <= oldest.timestamp {
            return oldest.rewound(lookup_timestamp, active_id, volatility);
        }
        if lookup_timestamp >= newest.timestamp {
            return newest.advanced(lookup_timestamp, active_id, volatility, 0);
        }

        // Last logical position whose timestamp is <= lookup
        let physical = |k: usize| (oldest_index + k) % active_size;
        let (mut low, mut high) = (0usize, active_size - 1);
        while high - low > 1 {
            let middle = (low + high) / 2;
            if self.samples[physical(middle)].timestamp <= lookup_timestamp {
                low = middle;
            } else {
                high = middle;
            }
        }

        let before = self.samples[physical(low)];
        let after = self.samples[physical(high)];
        if before.timestamp == lookup_timestamp {
            return before;
        }
        interpolate(&before, &after, lookup_timestamp)
    }

    pub fn checkpoint(&self) -> OracleCheckpoint {
        let params = self.parameters;
        let mut slots = Vec::with_capacity(2);
        if params.size > 0 {
            let current = params.write_index as usize;
            let next = (current + 1) % params.size as usize;
            slots.push((current, self.samples[current]));
            slots.push((next, self.samples[next]));
        }
        OracleCheckpoint {
            parameters: params,
            len: self.samples.len(),
            slots,
        }
    }

    pub fn restore(&mut self, checkpoint: OracleCheckpoint) {
        self.samples
            .resize(checkpoint.len, OracleSample::default());
        for (index, sample) in checkpoint.slots {
            if let Some(slot) = self.samples.get_mut(index) {
                *slot = sample;
            }
        }
        self.parameters = checkpoint.parameters;
    }
}

fn interpolate(before: &OracleSample, after: &OracleSample, lookup: u64) -> OracleSample {
    let span = U256::from(after.timestamp - before.timestamp);
    let elapsed = U256::from(lookup - before.timestamp);
    let lerp = |a: u128, b: u128| -> u128 {
        // elapsed < span, so the scaled delta always fits back into a u128
        let delta = U256::from(b.wrapping_sub(a)) * elapsed / span;
        a.wrapping_add(to_u128(delta).unwrap_or(u128::MAX))
    };
    OracleSample {
        timestamp: lookup,
        cumulative_id: lerp(before.cumulative_id, after.cumulative_id),
        cumulative_volatility: lerp(before.cumulative_volatility, after.cumulative_volatility),
        cumulative_bins_crossed: lerp(
            before.cumulative_bins_crossed,
            after.cumulative_bins_crossed,
        ),
    }
}
