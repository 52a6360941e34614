//! djb2 string hash (`h * 33 + c`), masked to a positive `i64` range
//! after every step.

/// Starting value of the djb2 recurrence
pub const SEED: u64 = 5381;

/// Low-order bit mask applied after each step, `0x7fff_ffff_ffff_ffff`
pub const MASK: u64 = i64::MAX as u64;

/// Hashes `bytes` with djb2.
///
/// The intermediate `(h << 5) + h + c` wraps on overflow and is then masked,
/// so the result is never above `i64::MAX`. There is no seeding: equal byte
/// strings always hash equal.
pub fn hash(bytes: &[u8]) -> u64 {
    bytes.iter().fold(SEED, |h, &c| {
        ((h << 5).wrapping_add(h).wrapping_add(c as u64)) & MASK
    })
}
