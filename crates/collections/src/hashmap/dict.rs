use std::fmt;

use log::{debug, error, trace};

use super::bucket::Pair;
use super::hash_table::{HashTable, IntoIter, Iter};
use super::primes::next_capacity;
use super::{DEFAULT_LOAD_FACTOR, DictConfig, DictError};
use crate::pair;

/// String-keyed dictionary with chained collision buckets.
///
/// Keys are byte strings copied into the dictionary on insert and freed on
/// removal. Values are moved in and handed back on replace, remove and
/// [`into_values`](Dict::into_values); the dictionary never looks at them.
///
/// Keys follow C string rules: everything from the first NUL byte on is
/// ignored.
///
/// Not thread-safe; wrap the whole dictionary in a `Mutex` to share it.
#[derive(Debug)]
pub struct Dict<V> {
    table: HashTable<V>,
    load_factor: f64,
}

/// Snapshot of the dictionary's counters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DictStats {
    pub entries: usize,
    pub collisions: usize,
    pub max_chain: usize,
    pub capacity: usize,
}

impl fmt::Display for DictStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} entries, {} collisions, maximum chain = {}",
            self.entries, self.collisions, self.max_chain
        )
    }
}

impl<V> Dict<V> {
    /// Creates a dictionary without slot storage.
    ///
    /// # Note
    ///
    /// This is a `const` function since it does not allocate. Every keyed
    /// operation on it fails with [`DictError::Uninitialized`].
    pub const fn new_empty() -> Self {
        Self {
            table: HashTable::new_empty(),
            load_factor: DEFAULT_LOAD_FACTOR,
        }
    }

    /// Creates a dictionary with 5 slots and a load factor of 0.75
    pub fn new() -> Result<Self, DictError> {
        Self::from_config(DictConfig::default())
    }

    pub fn with_capacity(initial_capacity: usize) -> Result<Self, DictError> {
        Self::from_config(DictConfig {
            initial_capacity,
            ..Default::default()
        })
    }

    /// Creates a dictionary with `initial_capacity` slots that grows once it
    /// holds more than `load_factor * capacity` entries
    pub fn with_capacity_and_load(initial_capacity: usize, load_factor: f64) -> Result<Self, DictError> {
        Self::from_config(DictConfig {
            initial_capacity,
            load_factor,
        })
    }

    pub fn from_config(config: DictConfig) -> Result<Self, DictError> {
        config.validate()?;
        Ok(Self {
            table: HashTable::new_with_slots(config.initial_capacity)?,
            load_factor: config.load_factor,
        })
    }

    /// Stores `value` under `key`, returning the value it replaced.
    ///
    /// The key is copied. The replaced value (if any) goes back to the
    /// caller, who owns it from here on. A new key may trigger a resize.
    pub fn put<K: AsRef<[u8]>>(&mut self, key: K, value: V) -> Result<Option<V>, DictError> {
        let key = c_key(key.as_ref());
        self.check_initialized()?;
        trace!("put '{}'", String::from_utf8_lossy(key));

        let before = self.table.used();
        let previous = self.table.insert(pair!(key, value))?;

        if self.table.used() > before && self.over_load_factor() {
            let new_size = next_capacity(self.table.used() * 2);
            self.rebuild_table(new_size)?;
        }

        Ok(previous)
    }

    pub fn get<K: AsRef<[u8]>>(&self, key: K) -> Result<Option<&V>, DictError> {
        let key = c_key(key.as_ref());
        self.check_initialized()?;
        Ok(self.table.get(key))
    }

    pub fn contains_key<K: AsRef<[u8]>>(&self, key: K) -> Result<bool, DictError> {
        let key = c_key(key.as_ref());
        self.check_initialized()?;
        Ok(self.table.contains_key(key))
    }

    /// Removes `key`, handing its value back to the caller.
    ///
    /// The dictionary's copy of the key is freed.
    pub fn remove<K: AsRef<[u8]>>(&mut self, key: K) -> Result<Option<V>, DictError> {
        let key = c_key(key.as_ref());
        self.check_initialized()?;
        trace!("remove '{}'", String::from_utf8_lossy(key));

        Ok(self.table.remove(key).map(|pair| pair.value))
    }

    /// Calls `visit` once for every pair: slot order, then bucket order
    /// within a slot.
    pub fn enumerate<F>(&self, mut visit: F)
    where
        F: FnMut(&[u8], &V),
    {
        for pair in self.iter() {
            visit(pair.key(), pair.value());
        }
    }

    pub fn iter(&self) -> Iter<'_, V> {
        self.table.iter()
    }

    /// Frees the dictionary and every key it owns, handing all stored values
    /// back to the caller.
    pub fn into_values(self) -> impl Iterator<Item = V> {
        self.table.into_iter().map(|pair| pair.value)
    }

    /// Returns the number of entries
    pub fn len(&self) -> usize {
        self.table.used()
    }

    /// Shorthand for `self.len() == 0`
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the number of slots
    pub fn capacity(&self) -> usize {
        self.table.slot_count()
    }

    pub fn load_factor(&self) -> f64 {
        self.load_factor
    }

    /// Entries stored beyond the first one of every bucket
    pub fn collision_count(&self) -> usize {
        self.table.collisions
    }

    /// Longest bucket seen since the slot array was last built
    pub fn max_chain_length(&self) -> usize {
        self.table.max_chain
    }

    pub fn stats(&self) -> DictStats {
        DictStats {
            entries: self.len(),
            collisions: self.collision_count(),
            max_chain: self.max_chain_length(),
            capacity: self.capacity(),
        }
    }

    // [private]

    fn check_initialized(&self) -> Result<(), DictError> {
        if self.table.slot_count() < 2 {
            error!("Attempt to use uninitialized dictionary {:p}", self);
            return Err(DictError::Uninitialized);
        }
        Ok(())
    }

    fn over_load_factor(&self) -> bool {
        self.table.used() as f64 > self.load_factor * self.table.slot_count() as f64
    }

    /// Rehashes every pair into a fresh table of `new_size` slots
    ///
    /// The new table brings its own collision and chain statistics.
    ///
    /// # Errors
    ///
    /// Fails with [`DictError::RehashMismatch`] if the new table does not end
    /// up with exactly as many entries as the old one.
    fn rebuild_table(&mut self, new_size: usize) -> Result<(), DictError> {
        debug!(
            "Resizing dictionary from {} to {} ({} entries, {} collisions)",
            self.table.slot_count(),
            new_size,
            self.table.used(),
            self.table.collisions
        );

        let mut rebuilt = HashTable::new_with_slots(new_size)?;
        let old = std::mem::replace(&mut self.table, HashTable::new_empty());
        let before = old.used();

        for pair in old {
            rebuilt.insert(pair)?;
        }

        let after = rebuilt.used();
        self.table = rebuilt;

        if before != after {
            error!("Old dictionary entries {before} does not match new dictionary {after}");
            return Err(DictError::RehashMismatch { before, after });
        }
        Ok(())
    }
}

impl<V> IntoIterator for Dict<V> {
    type Item = (Box<[u8]>, V);
    type IntoIter = std::iter::Map<IntoIter<V>, fn(Pair<V>) -> (Box<[u8]>, V)>;

    fn into_iter(self) -> Self::IntoIter {
        self.table
            .into_iter()
            .map(Pair::into_parts as fn(Pair<V>) -> (Box<[u8]>, V))
    }
}

impl<'a, V> IntoIterator for &'a Dict<V> {
    type Item = &'a Pair<V>;
    type IntoIter = Iter<'a, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Cuts `key` at its first NUL byte
fn c_key(key: &[u8]) -> &[u8] {
    match key.iter().position(|&b| b == 0) {
        Some(end) => &key[..end],
        None => key,
    }
}
