//! MapConfig: initial bucket count and growth trigger ratio.

use crate::error::{ConfigError, Result};
use slotmap::DefaultKey;

/// Construction options for `ChainedHashMap`.
///
/// `capacity` is the number of buckets allocated up front; `load_factor` is
/// the ratio of entries to buckets at which the table doubles.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MapConfig {
    pub capacity: usize,
    pub load_factor: f32,
}

impl MapConfig {
    pub const DEFAULT_CAPACITY: usize = 16;
    pub const DEFAULT_LOAD_FACTOR: f32 = 0.75;
    /// Largest bucket count whose table fits in `isize::MAX` bytes.
    pub const MAX_CAPACITY: usize =
        isize::MAX as usize / core::mem::size_of::<Option<DefaultKey>>();

    pub const fn new(capacity: usize, load_factor: f32) -> Self {
        Self {
            capacity,
            load_factor,
        }
    }

    /// Caller-chosen capacity with the default load factor.
    pub const fn with_capacity(capacity: usize) -> Self {
        Self::new(capacity, Self::DEFAULT_LOAD_FACTOR)
    }

    /// Checks the configuration. An infinite load factor is accepted and
    /// disables growth.
    pub fn validate(&self) -> Result<()> {
        if self.capacity == 0 {
            return Err(ConfigError::ZeroCapacity);
        }
        if self.capacity > Self::MAX_CAPACITY {
            return Err(ConfigError::CapacityTooLarge(self.capacity));
        }
        // `!(x > 0.0)` also rejects NaN.
        if !(self.load_factor > 0.0) {
            return Err(ConfigError::InvalidLoadFactor(self.load_factor));
        }
        Ok(())
    }

    /// Entry count at which a table of `capacity` buckets grows.
    pub fn threshold(&self) -> usize {
        threshold_for(self.capacity, self.load_factor)
    }
}

impl Default for MapConfig {
    fn default() -> Self {
        Self::new(Self::DEFAULT_CAPACITY, Self::DEFAULT_LOAD_FACTOR)
    }
}

/// floor(capacity × load_factor), saturating at `usize::MAX`.
pub(crate) fn threshold_for(capacity: usize, load_factor: f32) -> usize {
    // Float-to-int `as` casts saturate, so an infinite product maps to MAX.
    (capacity as f64 * f64::from(load_factor)).floor() as usize
}
