//! In-memory string dictionary: djb2 hashing, prime-sized slot arrays and
//! per-slot collision buckets.
mod macros;
pub mod hashmap;

pub use hashmap::{Dict, DictConfig, DictError, DictStats, Pair};
