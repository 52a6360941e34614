use std::collections::TryReserveError;

use thiserror::Error;

mod bucket;
mod dict;
mod hash;
mod hash_table;
mod primes;

pub use bucket::{AddOutcome, BUCKET_INITIAL_CAPACITY, CollisionBucket, MAX_KEY, Pair, keys_match};
pub use dict::{Dict, DictStats};
pub use hash::hash;
pub use hash_table::{IntoIter, Iter};
pub use primes::{PRIMES, next_capacity};

/// Slot count of a dictionary built with [`Dict::new`]
pub const DEFAULT_INITIAL_CAPACITY: usize = 5;

/// Resize threshold of a dictionary built with [`Dict::new`]
pub const DEFAULT_LOAD_FACTOR: f64 = 0.75;

#[derive(Error, Debug)]
pub enum DictError {
    #[error("Attempt to use uninitialized dictionary")]
    Uninitialized,
    #[error("Invalid initial capacity {capacity}, need at least 2 slots")]
    InvalidCapacity { capacity: usize },
    #[error("Invalid load factor {load_factor}, valid range: (0, 1]")]
    InvalidLoadFactor { load_factor: f64 },
    #[error("Allocation failed: {0}")]
    Allocation(#[from] TryReserveError),
    #[error("Rehash lost entries, old dictionary had {before}, new dictionary has {after}")]
    RehashMismatch { before: usize, after: usize },
}

/// Construction parameters for a [`Dict`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DictConfig {
    /// Number of slots to start with, ideally prime
    pub initial_capacity: usize,
    /// Grow once `entries > load_factor * capacity`
    pub load_factor: f64,
}

impl Default for DictConfig {
    fn default() -> Self {
        Self {
            initial_capacity: DEFAULT_INITIAL_CAPACITY,
            load_factor: DEFAULT_LOAD_FACTOR,
        }
    }
}

impl DictConfig {
    pub fn validate(&self) -> Result<(), DictError> {
        // the index is taken modulo `capacity - 1`
        if self.initial_capacity < 2 {
            return Err(DictError::InvalidCapacity {
                capacity: self.initial_capacity,
            });
        }
        if !(self.load_factor > 0.0 && self.load_factor <= 1.0) {
            return Err(DictError::InvalidLoadFactor {
                load_factor: self.load_factor,
            });
        }
        Ok(())
    }
}

/// Finds `n` distinct keys that all land on slot `target` of a table with
/// `slots` slots.
#[cfg(test)]
pub(crate) fn colliding_keys(slots: usize, target: usize, n: usize) -> Vec<String> {
    (0..)
        .map(|i| format!("k{i}"))
        .filter(|k| (hash(k.as_bytes()) % (slots as u64 - 1)) as usize == target)
        .take(n)
        .collect()
}
