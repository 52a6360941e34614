use std::{mem, slice, vec};

use log::trace;

use super::DictError;
use super::bucket::{AddOutcome, CollisionBucket, Pair, keys_match};
use super::hash::hash;

/// One position of the primary array
#[derive(Debug)]
pub(crate) enum Slot<V> {
    Empty,
    /// Exactly one pair, stored without a bucket
    Direct(Pair<V>),
    /// Two or more pairs sharing this slot
    Bucketed(CollisionBucket<V>),
}

impl<V> Default for Slot<V> {
    fn default() -> Self {
        Slot::Empty
    }
}

impl<V> Slot<V> {
    /// Takes the direct pair out, leaving the slot empty.
    /// Any other state is left untouched.
    fn take_direct(&mut self) -> Option<Pair<V>> {
        match mem::take(self) {
            Slot::Direct(pair) => Some(pair),
            other => {
                *self = other;
                None
            }
        }
    }

    /// Turns a bucket that is down to its last pair back into a direct entry.
    fn dissolve(&mut self) {
        if let Slot::Bucketed(bucket) = mem::take(self) {
            *self = match bucket.into_sole_pair() {
                Some(pair) => Slot::Direct(pair),
                None => unreachable!("dissolving a bucket that does not hold exactly one pair"),
            };
        }
    }
}

/// The slot array plus the counters the dictionary reports.
///
/// This never resizes itself; growing is the job of [`Dict`](super::Dict).
#[derive(Debug)]
pub(crate) struct HashTable<V> {
    pub(crate) slots: Vec<Slot<V>>,
    /// Number of pairs stored
    pub(crate) items: usize,
    /// Pairs beyond the first in every bucket
    pub(crate) collisions: usize,
    /// Largest bucket seen since this table was built
    pub(crate) max_chain: usize,
}

#[derive(Debug)]
pub struct Iter<'a, V> {
    slots: slice::Iter<'a, Slot<V>>,
    bucket: slice::Iter<'a, Pair<V>>,
}

#[derive(Debug)]
pub struct IntoIter<V> {
    slots: vec::IntoIter<Slot<V>>,
    bucket: vec::IntoIter<Pair<V>>,
}

impl<V> HashTable<V> {
    /// Creates a table without any slots
    ///
    /// # Note
    ///
    /// This is a `const` function since it does not allocate,
    /// every keyed lookup on it must be refused by the caller
    pub const fn new_empty() -> Self {
        Self {
            slots: Vec::new(),
            items: 0,
            collisions: 0,
            max_chain: 0,
        }
    }

    /// Creates a table with `cap` empty slots
    pub fn new_with_slots(cap: usize) -> Result<Self, DictError> {
        let mut slots = Vec::new();
        slots.try_reserve_exact(cap)?;
        slots.extend((0..cap).map(|_| Slot::Empty));

        Ok(Self {
            slots,
            ..Self::new_empty()
        })
    }

    /// Returns the number of pairs in the table
    pub fn used(&self) -> usize {
        self.items
    }

    /// Returns the number of slots
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// Slot index of `key`.
    ///
    /// The hash is reduced modulo `slot_count - 1`, so the last slot is never
    /// addressed. Callers guarantee at least two slots.
    pub fn idx(&self, key: &[u8]) -> usize {
        (hash(key) % (self.slot_count() as u64 - 1)) as usize
    }

    /// Inserts a pair without ever resizing,
    /// returning the previous value (if there was any)
    pub fn insert(&mut self, pair: Pair<V>) -> Result<Option<V>, DictError> {
        let i = self.idx(&pair.key);
        let slot = &mut self.slots[i];

        match slot {
            Slot::Empty => {
                trace!("slot {i}: new direct entry");
                *slot = Slot::Direct(pair);
                self.items += 1;
                Ok(None)
            }
            Slot::Direct(resident) if keys_match(&resident.key, &pair.key) => {
                trace!("slot {i}: replacing direct value");
                Ok(Some(mem::replace(&mut resident.value, pair.value)))
            }
            Slot::Direct(_) => {
                trace!("slot {i}: collision, moving both pairs into a bucket");
                // reserve first so a failed allocation leaves the slot intact
                let mut bucket = CollisionBucket::reserved()?;
                if let Some(resident) = slot.take_direct() {
                    bucket.seed(pair, resident);
                }
                let len = bucket.len();
                *slot = Slot::Bucketed(bucket);
                self.items += 1;
                self.note_chain(len);
                Ok(None)
            }
            Slot::Bucketed(bucket) => match bucket.add_or_replace(pair)? {
                AddOutcome::Added => {
                    trace!("slot {i}: appended to bucket of {}", bucket.len());
                    let len = bucket.len();
                    self.items += 1;
                    self.note_chain(len);
                    Ok(None)
                }
                AddOutcome::Replaced(old) => {
                    trace!("slot {i}: replaced value inside bucket");
                    Ok(Some(old))
                }
            },
        }
    }

    pub fn get(&self, key: &[u8]) -> Option<&V> {
        match &self.slots[self.idx(key)] {
            Slot::Empty => None,
            Slot::Direct(pair) => keys_match(&pair.key, key).then_some(&pair.value),
            Slot::Bucketed(bucket) => bucket.get(key),
        }
    }

    pub fn contains_key(&self, key: &[u8]) -> bool {
        self.get(key).is_some()
    }

    /// Removes `key`, handing back its pair.
    ///
    /// A bucket left with a single pair is dissolved into a direct entry.
    pub fn remove(&mut self, key: &[u8]) -> Option<Pair<V>> {
        let i = self.idx(key);
        let slot = &mut self.slots[i];

        let removed = match slot {
            Slot::Empty => None,
            Slot::Direct(pair) if keys_match(&pair.key, key) => slot.take_direct(),
            Slot::Direct(_) => None,
            Slot::Bucketed(bucket) => {
                let pos = bucket.position(key)?;
                let pair = bucket.swap_remove(pos);
                self.collisions -= 1;
                if bucket.len() == 1 {
                    trace!("slot {i}: promoting last bucket pair to a direct entry");
                    slot.dissolve();
                }
                Some(pair)
            }
        };

        if removed.is_some() {
            self.items -= 1;
        }
        removed
    }

    /// Returns `true` if the slot at `i` holds a direct entry
    #[cfg(test)]
    pub fn is_direct(&self, i: usize) -> bool {
        matches!(self.slots.get(i), Some(Slot::Direct(_)))
    }

    /// Number of pairs chained in the bucket at slot `i` (0 if there is none)
    #[cfg(test)]
    pub fn chain_len(&self, i: usize) -> usize {
        match self.slots.get(i) {
            Some(Slot::Bucketed(bucket)) => bucket.len(),
            _ => 0,
        }
    }

    // [adapters]

    pub fn iter(&self) -> Iter<'_, V> {
        Iter {
            slots: self.slots.iter(),
            bucket: Default::default(),
        }
    }

    // [private]

    /// Book-keeping after a bucket grew to `len` pairs
    fn note_chain(&mut self, len: usize) {
        if len > 1 {
            self.collisions += 1;
        }
        self.max_chain = self.max_chain.max(len);
    }
}

impl<V> IntoIterator for HashTable<V> {
    type Item = Pair<V>;
    type IntoIter = IntoIter<V>;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter {
            slots: self.slots.into_iter(),
            bucket: Vec::new().into_iter(),
        }
    }
}

impl<'a, V> Iterator for Iter<'a, V> {
    type Item = &'a Pair<V>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(pair) = self.bucket.next() {
                return Some(pair);
            }
            match self.slots.next()? {
                Slot::Empty => continue,
                Slot::Direct(pair) => return Some(pair),
                Slot::Bucketed(bucket) => self.bucket = bucket.iter(),
            }
        }
    }
}

impl<V> Iterator for IntoIter<V> {
    type Item = Pair<V>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(pair) = self.bucket.next() {
                return Some(pair);
            }
            match self.slots.next()? {
                Slot::Empty => continue,
                Slot::Direct(pair) => return Some(pair),
                Slot::Bucketed(bucket) => self.bucket = bucket.into_iter(),
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::{HashTable, Slot};
    use crate::hashmap::colliding_keys;
    use crate::pair;

    fn collisions_by_hand<V>(t: &HashTable<V>) -> usize {
        t.slots
            .iter()
            .map(|s| match s {
                Slot::Bucketed(b) => b.len() - 1,
                _ => 0,
            })
            .sum()
    }

    #[test]
    fn insert() {
        let mut t = HashTable::new_with_slots(11).unwrap();

        let old = t.insert(pair!("foo", "bar")).unwrap();
        assert_eq!(old, None);
        assert_eq!(t.used(), 1);

        let old = t.insert(pair!("foo", "baz")).unwrap();
        assert_eq!(old, Some("bar"));
        assert_eq!(t.used(), 1);

        t.insert(pair!("peti", "is a baby")).unwrap();
        t.insert(pair!("sina", "is a tiny baby")).unwrap();

        assert_eq!(t.used(), 3);
        assert_eq!(t.slot_count(), 11);
        dbg!(t);
    }

    #[test]
    fn get() {
        let mut t = HashTable::new_with_slots(11).unwrap();

        t.insert(pair!("peti", "is a baby")).unwrap();
        t.insert(pair!("sina", "is a tiny baby")).unwrap();

        assert_eq!(t.get(b"peti"), Some(&"is a baby"));
        assert_eq!(t.get(b"sina"), Some(&"is a tiny baby"));
        assert_eq!(t.get(b"nobody"), None);
        assert!(t.contains_key(b"peti"));
    }

    #[test]
    fn last_slot_is_never_addressed() {
        let mut t = HashTable::new_with_slots(5).unwrap();
        for i in 0..200 {
            t.insert(pair!(&format!("{i}"), i)).unwrap();
        }
        assert!(matches!(t.slots[4], Slot::Empty));
        assert_eq!(t.used(), 200);
    }

    #[test]
    fn collision_promotes_to_bucket() {
        let keys = colliding_keys(11, 3, 3);
        let mut t = HashTable::new_with_slots(11).unwrap();

        t.insert(pair!(&keys[0], 0)).unwrap();
        assert!(t.is_direct(3));

        t.insert(pair!(&keys[1], 1)).unwrap();
        assert!(!t.is_direct(3));
        assert_eq!(t.chain_len(3), 2);
        assert_eq!(t.collisions, 1);
        assert_eq!(t.max_chain, 2);

        t.insert(pair!(&keys[2], 2)).unwrap();
        assert_eq!(t.chain_len(3), 3);
        assert_eq!(t.collisions, 2);
        assert_eq!(t.max_chain, 3);

        // replacing inside the bucket changes no counters
        assert_eq!(t.insert(pair!(&keys[1], 10)).unwrap(), Some(1));
        assert_eq!(t.used(), 3);
        assert_eq!(t.collisions, 2);

        for (i, k) in keys.iter().enumerate() {
            let want = if i == 1 { 10 } else { i };
            assert_eq!(t.get(k.as_bytes()), Some(&want));
        }
    }

    #[test]
    fn remove_dissolves_bucket() {
        let keys = colliding_keys(11, 7, 3);
        let mut t = HashTable::new_with_slots(11).unwrap();
        for (i, k) in keys.iter().enumerate() {
            t.insert(pair!(k, i)).unwrap();
        }

        let removed = t.remove(keys[0].as_bytes()).unwrap();
        assert_eq!(removed, pair!(&keys[0], 0));
        assert_eq!(t.chain_len(7), 2);
        assert_eq!(t.used(), 2);
        assert_eq!(t.collisions, collisions_by_hand(&t));

        t.remove(keys[1].as_bytes()).unwrap();
        assert!(t.is_direct(7));
        assert_eq!(t.get(keys[2].as_bytes()), Some(&2));
        assert_eq!(t.collisions, 0);

        t.remove(keys[2].as_bytes()).unwrap();
        assert!(matches!(t.slots[7], Slot::Empty));
        assert_eq!(t.used(), 0);

        assert_eq!(t.remove(keys[2].as_bytes()), None);
        assert_eq!(t.used(), 0);
    }

    #[test]
    fn remove_missing_from_bucket_changes_nothing() {
        let keys = colliding_keys(11, 2, 3);
        let mut t = HashTable::new_with_slots(11).unwrap();
        t.insert(pair!(&keys[0], 0)).unwrap();
        t.insert(pair!(&keys[1], 1)).unwrap();

        assert_eq!(t.remove(keys[2].as_bytes()), None);
        assert_eq!(t.used(), 2);
        assert_eq!(t.collisions, 1);
        assert_eq!(t.chain_len(2), 2);
    }

    #[test]
    fn iter() {
        let mut t = HashTable::new_with_slots(7).unwrap();

        for i in 0..32 {
            t.insert(pair!(&format!("{i}"), i)).unwrap();
        }

        let mut seen: Vec<i32> = t.iter().map(|p| p.value).collect();
        seen.sort();
        assert_eq!(seen, (0..32).collect::<Vec<_>>());

        let mut owned: Vec<i32> = t.into_iter().map(|p| p.value).collect();
        owned.sort();
        assert_eq!(owned, (0..32).collect::<Vec<_>>());
    }

    #[test]
    fn iter_empty() {
        let t: HashTable<()> = HashTable::new_empty();
        assert_eq!(t.iter().count(), 0);

        let t: HashTable<()> = HashTable::new_with_slots(3).unwrap();
        assert_eq!(t.iter().count(), 0);
    }
}
