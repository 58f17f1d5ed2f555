//! Construction errors.
//!
//! Lookup misses are not errors: `get` yields `None` and `remove` yields
//! `false`. The only fallible step is building a map from a `MapConfig`.

use thiserror::Error;

/// Rejected map configuration.
#[derive(Error, Clone, Copy, Debug, PartialEq)]
pub enum ConfigError {
    /// The initial bucket count was zero.
    #[error("initial capacity must be greater than zero")]
    ZeroCapacity,

    /// The load factor was zero, negative, or NaN.
    #[error("load factor must be greater than zero, got {0}")]
    InvalidLoadFactor(f32),

    /// The bucket table for this capacity cannot be allocated.
    #[error("initial capacity {0} is too large to allocate")]
    CapacityTooLarge(usize),
}

/// Result type of the fallible constructors.
pub type Result<T> = core::result::Result<T, ConfigError>;
