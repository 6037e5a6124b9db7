//! The signature table.
//!
//! A `SignDict` owns a fixed-size bucket index and a growable arena of
//! entries. Colliding signatures chain through the arena by slot index with
//! head insertion; the arena grows in fixed blocks and indices stay stable
//! across growth.
//!
//! The table is not thread-safe. Share it behind a lock if concurrent access
//! is needed; every operation is a bounded in-memory computation.

use tracing::trace;

use crate::constants::ARENA_BLOCK_ENTRIES;
use crate::entry::{Entry, TOMBSTONE};
use crate::error::DictError;
use crate::sign::Signature;
use crate::slot::Slot;

/// Outcome of an insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upsert {
    /// No entry with this signature existed; a new one was appended.
    Inserted,
    /// An entry with this signature existed; its payload was overwritten.
    Updated,
}

/// A signature-keyed dictionary: fixed bucket index over a growable arena.
pub struct SignDict {
    pub(crate) hash_size: u32,
    pub(crate) buckets: Vec<Slot>,
    pub(crate) arena: Vec<Entry>,
}

impl SignDict {
    /// Create an empty dictionary with `hash_size` buckets and arena space
    /// reserved for `capacity` entries.
    ///
    /// The bucket count is fixed for the dictionary's lifetime; only the
    /// arena grows. Fails with [`DictError::InvalidHashSize`] for a zero
    /// bucket count and [`DictError::OutOfMemory`] if either allocation
    /// cannot be satisfied.
    pub fn create(hash_size: u32, capacity: usize) -> Result<Self, DictError> {
        if hash_size == 0 {
            return Err(DictError::InvalidHashSize);
        }

        let mut buckets = Vec::new();
        buckets
            .try_reserve_exact(hash_size as usize)
            .map_err(|_| DictError::OutOfMemory {
                entries: hash_size as usize,
            })?;
        buckets.resize(hash_size as usize, Slot::NIL);

        let mut arena = Vec::new();
        arena
            .try_reserve_exact(capacity)
            .map_err(|_| DictError::OutOfMemory { entries: capacity })?;

        Ok(Self {
            hash_size,
            buckets,
            arena,
        })
    }

    /// Number of buckets, fixed at creation or load.
    #[inline]
    pub fn hash_size(&self) -> u32 {
        self.hash_size
    }

    /// Number of entries in the arena, tombstones included.
    #[inline]
    pub fn len(&self) -> usize {
        self.arena.len()
    }

    /// Whether the arena holds no entries at all.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    /// Number of live (non-tombstoned) entries.
    pub fn live_len(&self) -> usize {
        self.iter().count()
    }

    /// Entry capacity currently reserved in the arena.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.arena.capacity()
    }

    /// Insert or update by key bytes.
    ///
    /// The key is reduced to its signature and never retained. Returns
    /// [`Upsert::Updated`] and overwrites `(code, value)` in place when an
    /// entry with the same signature already chains from the target bucket;
    /// otherwise appends a new entry at the head of the chain.
    pub fn insert(&mut self, key: &[u8], code: i32, value: i32) -> Result<Upsert, DictError> {
        self.insert_signature(Signature::of(key), code, value)
    }

    /// Insert or update by pre-computed signature.
    ///
    /// This is the primitive [`insert`](Self::insert) delegates to; use it
    /// when signatures are produced elsewhere (bulk builds, merges).
    pub fn insert_signature(
        &mut self,
        sig: Signature,
        code: i32,
        value: i32,
    ) -> Result<Upsert, DictError> {
        let bucket = sig.bucket(self.hash_size) as usize;

        let mut slot = self.buckets[bucket];
        while !slot.is_nil() {
            let entry = &mut self.arena[slot.index()];
            if entry.sig == sig {
                entry.code = code;
                entry.value = value;
                return Ok(Upsert::Updated);
            }
            slot = entry.next;
        }

        // No match in the chain: append at the head.
        self.grow_if_full()?;
        let new_slot = Slot::new(self.arena.len() as u32);
        self.arena.push(Entry {
            sig,
            code,
            value,
            next: self.buckets[bucket],
        });
        self.buckets[bucket] = new_slot;
        Ok(Upsert::Inserted)
    }

    /// Reserve another arena block when the arena is full.
    ///
    /// Growth appends capacity in fixed blocks and never moves an entry to a
    /// different index, so slots held across an insert stay valid.
    fn grow_if_full(&mut self) -> Result<(), DictError> {
        if self.arena.len() == self.arena.capacity() {
            self.arena
                .try_reserve_exact(ARENA_BLOCK_ENTRIES)
                .map_err(|_| DictError::OutOfMemory {
                    entries: ARENA_BLOCK_ENTRIES,
                })?;
            trace!(
                len = self.arena.len(),
                capacity = self.arena.capacity(),
                "arena grown"
            );
        }
        Ok(())
    }

    /// Look up `(code, value)` by key bytes.
    ///
    /// This is the raw view: a tombstoned entry is still returned, with
    /// `code == TOMBSTONE`. Callers that need the visible view check the
    /// code themselves or use [`iter`](Self::iter).
    pub fn lookup(&self, key: &[u8]) -> Option<(i32, i32)> {
        self.lookup_signature(Signature::of(key))
            .map(|entry| (entry.code, entry.value))
    }

    /// Look up an entry by pre-computed signature.
    ///
    /// Walks the chain of the signature's bucket and returns the first
    /// structural match, tombstoned or not.
    pub fn lookup_signature(&self, sig: Signature) -> Option<&Entry> {
        let bucket = sig.bucket(self.hash_size) as usize;

        let mut slot = self.buckets[bucket];
        while !slot.is_nil() {
            let entry = &self.arena[slot.index()];
            if entry.sig == sig {
                return Some(entry);
            }
            slot = entry.next;
        }
        None
    }

    /// Tombstone the entry for `key`.
    ///
    /// The entry and its chain links stay in place; only `code` is set to
    /// [`TOMBSTONE`]. Returns whether a matching entry existed (a match that
    /// was already tombstoned counts). Arena space is not reclaimed; see
    /// [`compact`](Self::compact).
    pub fn delete(&mut self, key: &[u8]) -> bool {
        let sig = Signature::of(key);
        let bucket = sig.bucket(self.hash_size) as usize;

        let mut slot = self.buckets[bucket];
        while !slot.is_nil() {
            let entry = &mut self.arena[slot.index()];
            if entry.sig == sig {
                entry.code = TOMBSTONE;
                return true;
            }
            slot = entry.next;
        }
        false
    }

    /// Iterate live entries in arena (insertion) order.
    ///
    /// Tombstoned entries are skipped: iteration is the visible view of the
    /// dictionary, in contrast to the raw lookups. The iterator is finite
    /// and forward-only; call `iter()` again to restart.
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            arena: &self.arena,
            pos: 0,
        }
    }

    /// Logically empty the dictionary, keeping its allocations.
    ///
    /// The arena length drops to zero and every bucket reverts to nil; the
    /// bucket count and reserved capacity are unchanged, so the dictionary
    /// can be refilled without reallocating.
    pub fn reset(&mut self) {
        self.arena.clear();
        self.buckets.fill(Slot::NIL);
    }

    /// Rebuild the table without its tombstoned entries.
    ///
    /// An explicit maintenance pass for long-lived tables that delete a lot:
    /// surviving entries keep their relative arena order but are assigned new
    /// slots, so any previously observed slot or entry reference is invalid
    /// afterwards. Returns the number of entries reclaimed.
    pub fn compact(&mut self) -> Result<usize, DictError> {
        let before = self.arena.len();
        let mut rebuilt = Self::create(self.hash_size, before)?;
        for entry in self.iter() {
            rebuilt.insert_signature(entry.sig, entry.code, entry.value)?;
        }
        let reclaimed = before - rebuilt.arena.len();
        *self = rebuilt;
        trace!(reclaimed, live = self.arena.len(), "compacted");
        Ok(reclaimed)
    }
}

/// Iterator over live entries in arena order. See [`SignDict::iter`].
pub struct Iter<'a> {
    arena: &'a [Entry],
    pos: usize,
}

impl<'a> Iterator for Iter<'a> {
    type Item = &'a Entry;

    fn next(&mut self) -> Option<&'a Entry> {
        while self.pos < self.arena.len() {
            let entry = &self.arena[self.pos];
            self.pos += 1;
            if !entry.is_tombstone() {
                return Some(entry);
            }
        }
        None
    }
}

impl<'a> IntoIterator for &'a SignDict {
    type Item = &'a Entry;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Iter<'a> {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_zero_hash_size() {
        assert!(matches!(
            SignDict::create(0, 16),
            Err(DictError::InvalidHashSize)
        ));
    }

    #[test]
    fn test_insert_then_lookup() {
        let mut dict = SignDict::create(128, 8).unwrap();

        assert_eq!(dict.insert(b"k1", 1, 10).unwrap(), Upsert::Inserted);
        assert_eq!(dict.insert(b"k2", 2, 20).unwrap(), Upsert::Inserted);

        assert_eq!(dict.lookup(b"k1"), Some((1, 10)));
        assert_eq!(dict.lookup(b"k2"), Some((2, 20)));
        assert_eq!(dict.lookup(b"k3"), None);
        assert_eq!(dict.len(), 2);
    }

    #[test]
    fn test_update_in_place() {
        let mut dict = SignDict::create(128, 8).unwrap();

        assert_eq!(dict.insert(b"k", 1, 10).unwrap(), Upsert::Inserted);
        assert_eq!(dict.insert(b"k", 2, 20).unwrap(), Upsert::Updated);

        assert_eq!(dict.len(), 1);
        assert_eq!(dict.lookup(b"k"), Some((2, 20)));
    }

    #[test]
    fn test_head_insertion_chains() {
        // A single bucket forces every key into one chain.
        let mut dict = SignDict::create(1, 4).unwrap();

        for (i, key) in [&b"a"[..], b"b", b"c"].iter().enumerate() {
            dict.insert(key, i as i32, i as i32 * 10).unwrap();
        }

        // All three reachable despite the shared bucket, and updating a
        // mid-chain entry must not duplicate it.
        assert_eq!(dict.lookup(b"a"), Some((0, 0)));
        assert_eq!(dict.lookup(b"b"), Some((1, 10)));
        assert_eq!(dict.lookup(b"c"), Some((2, 20)));

        assert_eq!(dict.insert(b"a", 7, 70).unwrap(), Upsert::Updated);
        assert_eq!(dict.len(), 3);
        assert_eq!(dict.lookup(b"a"), Some((7, 70)));
    }

    #[test]
    fn test_delete_is_tombstone() {
        let mut dict = SignDict::create(64, 4).unwrap();
        dict.insert(b"k", 5, 50).unwrap();

        assert!(dict.delete(b"k"));
        assert!(!dict.delete(b"missing"));

        // Raw lookups still reach the entry; iteration hides it.
        assert_eq!(dict.lookup(b"k"), Some((TOMBSTONE, 50)));
        let entry = dict.lookup_signature(Signature::of(b"k")).unwrap();
        assert!(entry.is_tombstone());
        assert_eq!(dict.iter().count(), 0);
        assert_eq!(dict.len(), 1);

        // Deleting again still reports a match.
        assert!(dict.delete(b"k"));
    }

    #[test]
    fn test_reinsert_after_delete_revives() {
        let mut dict = SignDict::create(64, 4).unwrap();
        dict.insert(b"k", 5, 50).unwrap();
        dict.delete(b"k");

        // The tombstoned entry is structurally present, so this is an update.
        assert_eq!(dict.insert(b"k", 6, 60).unwrap(), Upsert::Updated);
        assert_eq!(dict.lookup(b"k"), Some((6, 60)));
        assert_eq!(dict.iter().count(), 1);
    }

    #[test]
    fn test_growth_preserves_entries() {
        let mut dict = SignDict::create(16, 4).unwrap();

        for i in 0..100u32 {
            let key = format!("key-{}", i);
            dict.insert(key.as_bytes(), i as i32, (i * 10) as i32)
                .unwrap();
        }
        assert_eq!(dict.len(), 100);
        assert!(dict.capacity() >= 100);

        for i in 0..100u32 {
            let key = format!("key-{}", i);
            assert_eq!(
                dict.lookup(key.as_bytes()),
                Some((i as i32, (i * 10) as i32)),
                "key {}",
                i
            );
        }
    }

    #[test]
    fn test_iteration_order_is_insertion_order() {
        let mut dict = SignDict::create(8, 8).unwrap();
        dict.insert(b"first", 1, 0).unwrap();
        dict.insert(b"second", 2, 0).unwrap();
        dict.insert(b"third", 3, 0).unwrap();

        let codes: Vec<i32> = dict.iter().map(|e| e.code).collect();
        assert_eq!(codes, vec![1, 2, 3]);

        dict.delete(b"second");
        let codes: Vec<i32> = dict.iter().map(|e| e.code).collect();
        assert_eq!(codes, vec![1, 3]);
    }

    #[test]
    fn test_reset_keeps_allocations() {
        let mut dict = SignDict::create(32, 8).unwrap();
        for i in 0..20u32 {
            dict.insert(format!("k{}", i).as_bytes(), i as i32, 0).unwrap();
        }
        let capacity = dict.capacity();

        dict.reset();

        assert_eq!(dict.len(), 0);
        assert!(dict.is_empty());
        assert_eq!(dict.capacity(), capacity);
        assert_eq!(dict.lookup(b"k0"), None);

        // Refill after reset.
        dict.insert(b"k0", 9, 90).unwrap();
        assert_eq!(dict.lookup(b"k0"), Some((9, 90)));
    }

    #[test]
    fn test_compact_drops_tombstones() {
        let mut dict = SignDict::create(16, 8).unwrap();
        for i in 0..10u32 {
            dict.insert(format!("k{}", i).as_bytes(), i as i32, (i * 2) as i32)
                .unwrap();
        }
        for i in (0..10u32).step_by(2) {
            assert!(dict.delete(format!("k{}", i).as_bytes()));
        }
        assert_eq!(dict.len(), 10);
        assert_eq!(dict.live_len(), 5);

        let reclaimed = dict.compact().unwrap();
        assert_eq!(reclaimed, 5);
        assert_eq!(dict.len(), 5);

        for i in 0..10u32 {
            let key = format!("k{}", i);
            if i % 2 == 0 {
                assert_eq!(dict.lookup(key.as_bytes()), None);
            } else {
                assert_eq!(dict.lookup(key.as_bytes()), Some((i as i32, (i * 2) as i32)));
            }
        }

        // Survivors keep their relative order.
        let codes: Vec<i32> = dict.iter().map(|e| e.code).collect();
        assert_eq!(codes, vec![1, 3, 5, 7, 9]);
    }

    #[test]
    fn test_insert_signature_direct() {
        let mut dict = SignDict::create(64, 4).unwrap();
        let sig = Signature::of(b"via-signature");

        assert_eq!(dict.insert_signature(sig, 3, 30).unwrap(), Upsert::Inserted);
        assert_eq!(dict.lookup(b"via-signature"), Some((3, 30)));
        assert_eq!(dict.lookup_signature(sig).unwrap().value, 30);
    }
}
