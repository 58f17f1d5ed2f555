//! ChainedHashMap: separate chaining over an arena of entries.
//!
//! Entries live in a `SlotMap`; each bucket of the table holds the arena key
//! of its chain head and every entry holds the key of its successor. Growth
//! relinks arena keys into a larger table and never moves or reallocates the
//! entries themselves.

use crate::config::{threshold_for, MapConfig};
use crate::error::{ConfigError, Result};
use crate::reentrancy::DebugReentrancy;
use core::borrow::Borrow;
use core::fmt;
use core::hash::{BuildHasher, BuildHasherDefault, Hash};
use core::iter::FusedIterator;
use core::mem;
use hashbrown::HashSet;
use slotmap::{DefaultKey, SlotMap};
use std::collections::hash_map::DefaultHasher;

struct Entry<K, V> {
    key: K,
    value: V,
    hash: i64,
    next: Option<DefaultKey>,
}

/// A hash map resolving collisions by separate chaining, doubling its bucket
/// count whenever the entry count reaches `floor(capacity × load_factor)`.
///
/// New keys are pushed at the head of their bucket's chain, so within one
/// bucket chains read in reverse insertion order. No order is promised
/// across buckets. The table never shrinks.
pub struct ChainedHashMap<K, V> {
    table: Vec<Option<DefaultKey>>, // chain heads, one per bucket
    slots: SlotMap<DefaultKey, Entry<K, V>>,
    load_factor: f32,
    threshold: usize,
    reentrancy: DebugReentrancy,
}

/// Unseeded SipHash, so every map hashes a key to the same value.
type KeyHasher = BuildHasherDefault<DefaultHasher>;

/// Signed 64-bit hash of a key, deterministic across maps and runs.
pub(crate) fn make_hash<Q>(q: &Q) -> i64
where
    Q: ?Sized + Hash,
{
    KeyHasher::default().hash_one(q) as i64
}

/// Allocates `capacity` empty buckets, or `None` if the allocator refuses.
fn alloc_table(capacity: usize) -> Option<Vec<Option<DefaultKey>>> {
    let mut table = Vec::new();
    table.try_reserve_exact(capacity).ok()?;
    table.resize(capacity, None);
    Some(table)
}

/// `|hash| mod capacity`. The magnitude is taken as `u64`, so `i64::MIN`
/// maps to `2^63 mod capacity` instead of overflowing.
pub(crate) fn bucket_index(hash: i64, capacity: usize) -> usize {
    (hash.unsigned_abs() % capacity as u64) as usize
}

/// Walks one chain from its head.
struct Chain<'a, K, V> {
    slots: &'a SlotMap<DefaultKey, Entry<K, V>>,
    cur: Option<DefaultKey>,
}

impl<'a, K, V> Iterator for Chain<'a, K, V> {
    type Item = &'a Entry<K, V>;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        let e = &self.slots[self.cur?];
        self.cur = e.next;
        Some(e)
    }
}

/// Iterator over `(&K, &V)`, bucket by bucket and head to tail.
pub struct Iter<'a, K, V> {
    heads: core::slice::Iter<'a, Option<DefaultKey>>,
    chain: Chain<'a, K, V>,
    remaining: usize,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(e) = self.chain.next() {
                self.remaining -= 1;
                return Some((&e.key, &e.value));
            }
            self.chain.cur = *self.heads.next()?;
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}
impl<K, V> FusedIterator for Iter<'_, K, V> {}

impl<K, V> ChainedHashMap<K, V>
where
    K: Eq + Hash,
{
    /// 16 buckets, load factor 0.75.
    pub fn new() -> Self {
        let config = MapConfig::default();
        Self::from_table(vec![None; config.capacity], config)
    }

    /// `capacity` counts buckets, not entries: the map grows once it holds
    /// `floor(capacity × 0.75)` entries. Fails on 0 or on a bucket count
    /// that cannot be allocated.
    pub fn with_capacity(capacity: usize) -> Result<Self> {
        Self::with_config(MapConfig::with_capacity(capacity))
    }

    pub fn with_capacity_and_load_factor(capacity: usize, load_factor: f32) -> Result<Self> {
        Self::with_config(MapConfig::new(capacity, load_factor))
    }

    /// Fails with `ConfigError` for a zero or unallocatable capacity, or a
    /// load factor that is not strictly positive.
    pub fn with_config(config: MapConfig) -> Result<Self> {
        config.validate()?;
        let table =
            alloc_table(config.capacity).ok_or(ConfigError::CapacityTooLarge(config.capacity))?;
        Ok(Self::from_table(table, config))
    }

    fn from_table(table: Vec<Option<DefaultKey>>, config: MapConfig) -> Self {
        Self {
            table,
            slots: SlotMap::with_key(),
            load_factor: config.load_factor,
            threshold: config.threshold(),
            reentrancy: DebugReentrancy::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Current bucket count.
    pub fn capacity(&self) -> usize {
        self.table.len()
    }

    pub fn load_factor(&self) -> f32 {
        self.load_factor
    }

    /// Entry count that triggers the next doubling.
    pub fn threshold(&self) -> usize {
        self.threshold
    }

    /// Linear scan of the chain `hash` indexes into. Runs `Eq` only on
    /// entries whose stored hash matches.
    fn find_slot<Q>(&self, hash: i64, q: &Q) -> Option<DefaultKey>
    where
        K: Borrow<Q>,
        Q: ?Sized + Eq,
    {
        let mut cur = self.table[bucket_index(hash, self.table.len())];
        while let Some(k) = cur {
            let e = &self.slots[k];
            if e.hash == hash && e.key.borrow() == q {
                return Some(k);
            }
            cur = e.next;
        }
        None
    }

    /// Inserts `key` or overwrites its value in place, returning the value
    /// it replaced. A new key goes to the head of its chain; if the map then
    /// holds `threshold` entries or more, the table doubles.
    pub fn put(&mut self, key: K, value: V) -> Option<V> {
        {
            let _g = self.reentrancy.enter();
            let hash = make_hash(&key);
            if let Some(slot) = self.find_slot(hash, &key) {
                return Some(mem::replace(&mut self.slots[slot].value, value));
            }
            let idx = bucket_index(hash, self.table.len());
            let head = self.table[idx];
            let slot = self.slots.insert(Entry {
                key,
                value,
                hash,
                next: head,
            });
            self.table[idx] = Some(slot);
        }
        if self.slots.len() >= self.threshold {
            self.grow();
        }
        None
    }

    pub fn get<Q>(&self, q: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let _g = self.reentrancy.enter();
        let slot = self.find_slot(make_hash(q), q)?;
        self.slots.get(slot).map(|e| &e.value)
    }

    pub fn get_mut<Q>(&mut self, q: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let _g = self.reentrancy.enter();
        let slot = self.find_slot(make_hash(q), q)?;
        self.slots.get_mut(slot).map(|e| &mut e.value)
    }

    pub fn contains_key<Q>(&self, q: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let _g = self.reentrancy.enter();
        self.find_slot(make_hash(q), q).is_some()
    }

    /// Values are not indexed: this visits every chain of every bucket.
    pub fn contains_value(&self, value: &V) -> bool
    where
        V: PartialEq,
    {
        let _g = self.reentrancy.enter();
        self.iter().any(|(_, v)| v == value)
    }

    /// Unlinks the entry for `q` with a trailing-pointer walk. The entry is
    /// handed back so that `K`/`V` drop after the guard is released.
    fn unlink<Q>(&mut self, q: &Q) -> Option<Entry<K, V>>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let _g = self.reentrancy.enter();
        let hash = make_hash(q);
        let idx = bucket_index(hash, self.table.len());
        let mut prev: Option<DefaultKey> = None;
        let mut cur = self.table[idx];
        while let Some(k) = cur {
            let e = &self.slots[k];
            if e.hash == hash && e.key.borrow() == q {
                let next = e.next;
                match prev {
                    Some(p) => self.slots[p].next = next,
                    None => self.table[idx] = next,
                }
                return self.slots.remove(k);
            }
            prev = cur;
            cur = e.next;
        }
        None
    }

    /// Removes `q` if present and reports whether anything was removed.
    /// Capacity is never reduced.
    pub fn remove<Q>(&mut self, q: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.unlink(q).is_some()
    }

    /// Like `remove`, but returns the value that was stored.
    pub fn take<Q>(&mut self, q: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.unlink(q).map(|e| e.value)
    }

    /// Drops every entry. Capacity and threshold are left as they are.
    pub fn clear(&mut self) {
        self.table.fill(None);
        self.slots.clear();
    }

    /// Snapshot of the stored keys.
    pub fn key_set(&self) -> HashSet<K>
    where
        K: Clone,
    {
        let _g = self.reentrancy.enter();
        self.iter().map(|(k, _)| k.clone()).collect()
    }

    /// Snapshot of the stored pairs. Mutating it does not touch the map.
    pub fn entry_set(&self) -> HashSet<(K, V)>
    where
        K: Clone,
        V: Clone + Hash + Eq,
    {
        let _g = self.reentrancy.enter();
        self.iter().map(|(k, v)| (k.clone(), v.clone())).collect()
    }

    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            heads: self.table.iter(),
            chain: Chain {
                slots: &self.slots,
                cur: None,
            },
            remaining: self.slots.len(),
        }
    }

    /// Bucket count and threshold after growth: the smallest doubling that
    /// brings `len` below the threshold. A load factor too small for any
    /// addressable table to reach that falls back to a single doubling.
    fn grown_capacity(&self, len: usize) -> Option<(usize, usize)> {
        let single = self
            .table
            .len()
            .checked_mul(2)
            .filter(|&c| c <= MapConfig::MAX_CAPACITY)?;
        let mut capacity = single;
        loop {
            let threshold = threshold_for(capacity, self.load_factor);
            if len < threshold {
                return Some((capacity, threshold));
            }
            match capacity.checked_mul(2) {
                Some(c) if c <= MapConfig::MAX_CAPACITY => capacity = c,
                _ => return Some((single, threshold_for(single, self.load_factor))),
            }
        }
    }

    /// Relinks every entry into a larger table in one pass. If no larger
    /// table can be had, the current one is kept.
    fn grow(&mut self) {
        let old_capacity = self.table.len();
        let len = self.slots.len();
        let Some((new_capacity, threshold)) = self.grown_capacity(len) else {
            tracing::warn!(
                capacity = old_capacity,
                len,
                "bucket count at its limit; growth stopped"
            );
            return;
        };
        let Some(new_table) = alloc_table(new_capacity) else {
            tracing::warn!(
                capacity = old_capacity,
                new_capacity,
                len,
                "bucket table allocation failed; keeping current table"
            );
            return;
        };

        let old_table = mem::replace(&mut self.table, new_table);
        for head in old_table {
            let mut cur = head;
            while let Some(k) = cur {
                let e = &mut self.slots[k];
                cur = e.next;
                let idx = bucket_index(e.hash, new_capacity);
                e.next = self.table[idx];
                self.table[idx] = Some(k);
            }
        }
        self.threshold = threshold;

        tracing::debug!(
            old_capacity,
            new_capacity,
            len,
            threshold,
            "resized chained hash map"
        );
    }

    /// Keys of one bucket, head first.
    #[cfg(test)]
    pub(crate) fn chain_keys(&self, bucket: usize) -> Vec<&K> {
        Chain {
            slots: &self.slots,
            cur: self.table[bucket],
        }
        .map(|e| &e.key)
        .collect()
    }

    /// Panics if the chain structure disagrees with the entry count, holds a
    /// duplicate key, files an entry under the wrong bucket, or sits at or
    /// above its threshold while non-empty.
    #[cfg(test)]
    pub(crate) fn assert_invariants(&self) {
        let capacity = self.table.len();
        let mut reachable = 0;
        for (i, &head) in self.table.iter().enumerate() {
            let chain: Vec<&Entry<K, V>> = Chain {
                slots: &self.slots,
                cur: head,
            }
            .collect();
            for (n, e) in chain.iter().enumerate() {
                assert_eq!(e.hash, make_hash(&e.key), "stale stored hash");
                assert_eq!(bucket_index(e.hash, capacity), i, "entry in wrong bucket");
                assert!(
                    chain[..n].iter().all(|o| o.key != e.key),
                    "duplicate key within a chain"
                );
            }
            reachable += chain.len();
        }
        assert_eq!(reachable, self.slots.len(), "unreachable or extra entries");
        assert_eq!(self.threshold, threshold_for(capacity, self.load_factor));
        assert!(
            self.slots.is_empty() || self.slots.len() < self.threshold,
            "len {} at or above threshold {}",
            self.slots.len(),
            self.threshold
        );
    }
}

impl<K, V> Default for ChainedHashMap<K, V>
where
    K: Eq + Hash,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> fmt::Debug for ChainedHashMap<K, V>
where
    K: fmt::Debug,
    V: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for head in &self.table {
            let chain = Chain {
                slots: &self.slots,
                cur: *head,
            };
            for e in chain {
                map.entry(&e.key, &e.value);
            }
        }
        map.finish()
    }
}

impl<'a, K, V> IntoIterator for &'a ChainedHashMap<K, V>
where
    K: Eq + Hash,
{
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K, V> Extend<(K, V)> for ChainedHashMap<K, V>
where
    K: Eq + Hash,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (k, v) in iter {
            self.put(k, v);
        }
    }
}

impl<K, V> FromIterator<(K, V)> for ChainedHashMap<K, V>
where
    K: Eq + Hash,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut m = Self::new();
        m.extend(iter);
        m
    }
}
