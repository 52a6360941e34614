use std::slice;

use super::DictError;

/// Pairs reserved the first time a bucket stores anything
pub const BUCKET_INITIAL_CAPACITY: usize = 16;

/// Extra pairs reserved each time a full bucket grows
pub const BUCKET_GROWTH: usize = 8;

/// Keys are compared on at most this many leading bytes
pub const MAX_KEY: usize = 4096;

/// Compares two keys on their first [`MAX_KEY`] bytes.
pub fn keys_match(a: &[u8], b: &[u8]) -> bool {
    a[..a.len().min(MAX_KEY)] == b[..b.len().min(MAX_KEY)]
}

/// A key owned by the dictionary together with the caller's value
#[derive(PartialEq, Eq)]
pub struct Pair<V> {
    pub(crate) key: Box<[u8]>,
    pub(crate) value: V,
}

impl<V> Pair<V> {
    /// Copies `key` into a fresh allocation.
    pub fn new<K: AsRef<[u8]> + ?Sized>(key: &K, value: V) -> Self {
        Self {
            key: key.as_ref().into(),
            value,
        }
    }

    pub fn key(&self) -> &[u8] {
        &self.key
    }

    pub fn value(&self) -> &V {
        &self.value
    }

    pub fn into_parts(self) -> (Box<[u8]>, V) {
        (self.key, self.value)
    }
}

impl<V: std::fmt::Debug> std::fmt::Debug for Pair<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "<{}, {:?}>", String::from_utf8_lossy(&self.key), self.value)
    }
}

/// What [`CollisionBucket::add_or_replace`] did with the pair
#[derive(Debug, PartialEq, Eq)]
pub enum AddOutcome<V> {
    /// The key was new and the pair was appended
    Added,
    /// The key was already present; holds the superseded value
    Replaced(V),
}

/// Overflow chain for every key that lands on one slot.
///
/// Storage is reserved lazily: 16 pairs on first use, then 8 more each time
/// the bucket is full. Order is insertion order until a removal swaps the
/// last pair into the hole.
#[derive(Debug)]
pub struct CollisionBucket<V> {
    pairs: Vec<Pair<V>>,
}

impl<V> CollisionBucket<V> {
    /// Creates an empty bucket. This is `const` since it does not allocate.
    pub(crate) const fn new() -> Self {
        Self { pairs: Vec::new() }
    }

    /// Creates an empty bucket with the initial 16 pairs already reserved
    pub(crate) fn reserved() -> Result<Self, DictError> {
        let mut bucket = Self::new();
        bucket.grow_if_full()?;
        Ok(bucket)
    }

    /// Fills a bucket made for a fresh collision: the incoming pair first,
    /// then the pair that used to sit directly in the slot.
    pub(crate) fn seed(&mut self, incoming: Pair<V>, resident: Pair<V>) {
        self.pairs.push(incoming);
        self.pairs.push(resident);
    }

    /// Number of pairs in the bucket
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Number of pairs the bucket can hold before it has to grow
    pub fn capacity(&self) -> usize {
        self.pairs.capacity()
    }

    pub fn get(&self, key: &[u8]) -> Option<&V> {
        self.pairs
            .iter()
            .find(|p| keys_match(&p.key, key))
            .map(|p| &p.value)
    }

    /// Overwrites the value of an existing key in place, or appends the pair.
    ///
    /// On replacement the superseded value is handed back, and the key already
    /// held by the bucket is kept.
    pub fn add_or_replace(&mut self, pair: Pair<V>) -> Result<AddOutcome<V>, DictError> {
        if let Some(existing) = self.pairs.iter_mut().find(|p| keys_match(&p.key, &pair.key)) {
            let old = std::mem::replace(&mut existing.value, pair.value);
            return Ok(AddOutcome::Replaced(old));
        }

        self.grow_if_full()?;
        self.pairs.push(pair);
        Ok(AddOutcome::Added)
    }

    pub fn iter(&self) -> slice::Iter<'_, Pair<V>> {
        self.pairs.iter()
    }

    // [removal support, driven by the owning table]

    pub(crate) fn position(&self, key: &[u8]) -> Option<usize> {
        self.pairs.iter().position(|p| keys_match(&p.key, key))
    }

    /// Removes the pair at `idx`, moving the last pair into its place.
    pub(crate) fn swap_remove(&mut self, idx: usize) -> Pair<V> {
        self.pairs.swap_remove(idx)
    }

    /// Tears the bucket down, handing back its only pair.
    ///
    /// Returns `None` if the bucket does not hold exactly one pair.
    pub(crate) fn into_sole_pair(mut self) -> Option<Pair<V>> {
        if self.pairs.len() == 1 { self.pairs.pop() } else { None }
    }

    // [private]

    /// Reserves storage ahead of a push: the initial 16 pairs on first use,
    /// or exactly 8 more once the bucket is full.
    fn grow_if_full(&mut self) -> Result<(), DictError> {
        if self.pairs.capacity() == 0 {
            self.pairs.try_reserve_exact(BUCKET_INITIAL_CAPACITY)?;
        } else if self.pairs.len() == self.pairs.capacity() {
            self.pairs.try_reserve_exact(BUCKET_GROWTH)?;
        }
        Ok(())
    }
}

impl<V> IntoIterator for CollisionBucket<V> {
    type Item = Pair<V>;
    type IntoIter = std::vec::IntoIter<Pair<V>>;

    fn into_iter(self) -> Self::IntoIter {
        self.pairs.into_iter()
    }
}
