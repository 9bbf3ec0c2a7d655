//! HashedIndex: separate-chaining hash table with prime-sized bucket arrays.
//!
//! The bucket count is always a prime taken from a lazily sieved
//! `PrimeTable`. Resizing uses the bucket (slot) count as its basis:
//! - grow after an insert leaves `len * 2 > slots`, to the smallest prime
//!   `>= 2 * slots`;
//! - shrink after a remove leaves `len * 8 <= slots`, to the smallest prime
//!   `>= ceil(slots / 2)`, never below the configured initial size.
//!
//! Each entry caches its folded key, so rehashing never calls back into
//! `IndexKey::fold`.

use crate::config::{IndexConfig, DEFAULT_INITIAL_SLOTS};
use crate::error::{ConfigError, InsertError};
use crate::hash_func::{HashParams, IndexKey};
use crate::primes::PrimeTable;
use core::borrow::Borrow;
use tracing::debug;

#[derive(Debug)]
struct Entry<K, V> {
    key: K,
    value: V,
    folded: u64,
}

type Chain<K, V> = Vec<Entry<K, V>>;

#[derive(Debug)]
pub struct HashedIndex<K, V> {
    params: HashParams,
    buckets: Vec<Chain<K, V>>,
    len: usize,
    primes: PrimeTable,
    min_slots: usize,
}

/// Iterator over `(key, value)` pairs in bucket order.
pub struct Iter<'a, K, V> {
    it: core::iter::Flatten<core::slice::Iter<'a, Chain<K, V>>>,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);
    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.it.next().map(|e| (&e.key, &e.value))
    }
}

impl<K, V> HashedIndex<K, V>
where
    K: IndexKey,
{
    pub fn new() -> Self {
        let primes = PrimeTable::default();
        let slots = primes
            .next_known_prime(DEFAULT_INITIAL_SLOTS)
            .unwrap_or(DEFAULT_INITIAL_SLOTS);
        Self::from_parts(HashParams::default(), primes, slots)
    }

    pub fn with_config(config: IndexConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut primes = PrimeTable::new(config.sieve_bound);
        let slots = primes
            .next_prime(config.initial_slots)
            .ok_or(ConfigError::SlotsTooLarge(config.initial_slots))?;
        Ok(Self::from_parts(config.params, primes, slots))
    }

    fn from_parts(params: HashParams, primes: PrimeTable, slots: usize) -> Self {
        Self {
            params,
            buckets: empty_buckets(slots),
            len: 0,
            primes,
            min_slots: slots,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of buckets. Always a prime and never zero.
    pub fn slot_count(&self) -> usize {
        self.buckets.len()
    }

    pub fn params(&self) -> &HashParams {
        &self.params
    }

    /// Bucket and chain position of `q`, if present.
    fn locate<Q>(&self, q: &Q) -> Option<(usize, usize)>
    where
        K: Borrow<Q>,
        Q: ?Sized + IndexKey,
    {
        let folded = q.fold(&self.params);
        let bucket = self.params.bucket(folded, self.slot_count());
        self.buckets[bucket]
            .iter()
            .position(|e| e.folded == folded && e.key.borrow() == q)
            .map(|pos| (bucket, pos))
    }

    pub fn contains<Q>(&self, q: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + IndexKey,
    {
        self.locate(q).is_some()
    }

    pub fn get<Q>(&self, q: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + IndexKey,
    {
        let (bucket, pos) = self.locate(q)?;
        Some(&self.buckets[bucket][pos].value)
    }

    pub fn get_mut<Q>(&mut self, q: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: ?Sized + IndexKey,
    {
        let (bucket, pos) = self.locate(q)?;
        Some(&mut self.buckets[bucket][pos].value)
    }

    pub fn get_key_value<Q>(&self, q: &Q) -> Option<(&K, &V)>
    where
        K: Borrow<Q>,
        Q: ?Sized + IndexKey,
    {
        let (bucket, pos) = self.locate(q)?;
        let e = &self.buckets[bucket][pos];
        Some((&e.key, &e.value))
    }

    /// Insert a new pair. Duplicate keys are rejected and leave the index
    /// untouched; so does a failed grow.
    pub fn insert(&mut self, key: K, value: V) -> Result<(), InsertError> {
        let folded = key.fold(&self.params);
        let bucket = self.params.bucket(folded, self.slot_count());
        if self.buckets[bucket]
            .iter()
            .any(|e| e.folded == folded && e.key == key)
        {
            return Err(InsertError::DuplicateKey);
        }

        let len = self.len + 1;
        if len.saturating_mul(2) > self.slot_count() {
            let target = self.grow_target(len)?;
            self.rehash(target);
        }

        let bucket = self.params.bucket(folded, self.slot_count());
        self.buckets[bucket].push(Entry { key, value, folded });
        self.len = len;
        Ok(())
    }

    pub fn remove<Q>(&mut self, q: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + IndexKey,
    {
        self.remove_entry(q).map(|(_, v)| v)
    }

    pub fn remove_entry<Q>(&mut self, q: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: ?Sized + IndexKey,
    {
        let (bucket, pos) = self.locate(q)?;
        let entry = self.buckets[bucket].remove(pos);
        self.len -= 1;
        if self.len.saturating_mul(8) <= self.slot_count() {
            self.shrink();
        }
        Some((entry.key, entry.value))
    }

    /// Drop every entry and return to the initial bucket count.
    pub fn clear(&mut self) {
        self.buckets = empty_buckets(self.min_slots);
        self.len = 0;
    }

    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            it: self.buckets.iter().flatten(),
        }
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.iter().map(|(k, _)| k)
    }

    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.iter().map(|(_, v)| v)
    }

    /// Length of every chain, in bucket order.
    pub fn chain_lengths(&self) -> impl Iterator<Item = usize> + '_ {
        self.buckets.iter().map(Vec::len)
    }

    pub fn max_chain_len(&self) -> usize {
        self.chain_lengths().max().unwrap_or(0)
    }

    /// Smallest prime `>= 2 * slots` that holds `len` entries under the
    /// load bound.
    fn grow_target(&mut self, len: usize) -> Result<usize, InsertError> {
        let requested = self
            .slot_count()
            .checked_mul(2)
            .ok_or(InsertError::CapacityExhausted {
                requested: usize::MAX,
            })?;
        let mut size = self
            .primes
            .next_prime(requested)
            .ok_or(InsertError::CapacityExhausted { requested })?;
        // Small tables can land on a prime that re-triggers growth at once.
        while len.saturating_mul(2) > size {
            let requested = size
                .checked_add(1)
                .ok_or(InsertError::CapacityExhausted { requested: size })?;
            size = self
                .primes
                .next_prime(requested)
                .ok_or(InsertError::CapacityExhausted { requested })?;
        }
        Ok(size)
    }

    #[cfg(test)]
    pub(crate) fn saturate_sieve(&mut self) {
        self.primes.saturate_bound();
    }

    fn shrink(&mut self) {
        let slots = self.slot_count();
        let half = slots / 2 + slots % 2;
        // Every prime below the current size is already sieved.
        let Some(target) = self.primes.next_known_prime(half) else {
            return;
        };
        if target < slots && target >= self.min_slots && self.len.saturating_mul(2) <= target {
            self.rehash(target);
        }
    }

    fn rehash(&mut self, slots: usize) {
        let old = core::mem::replace(&mut self.buckets, empty_buckets(slots));
        let from = old.len();
        for entry in old.into_iter().flatten() {
            let bucket = self.params.bucket(entry.folded, slots);
            self.buckets[bucket].push(entry);
        }
        debug!(from, to = slots, entries = self.len, "rehashed index");
    }
}

impl<K, V> Default for HashedIndex<K, V>
where
    K: IndexKey,
{
    fn default() -> Self {
        Self::new()
    }
}

fn empty_buckets<K, V>(slots: usize) -> Vec<Chain<K, V>> {
    (0..slots).map(|_| Vec::new()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    /// Invariant: Duplicate keys are rejected and the index remains unchanged.
    #[test]
    fn duplicate_insert_rejected() {
        let mut m: HashedIndex<String, i32> = HashedIndex::new();
        m.insert("dup".to_string(), 1).unwrap();
        match m.insert("dup".to_string(), 2) {
            Err(InsertError::DuplicateKey) => {}
            other => panic!("unexpected result: {:?}", other),
        }
        assert_eq!(m.get("dup"), Some(&1));
        assert_eq!(m.len(), 1);
    }

    /// Invariant: `get(k).is_some() == contains(k)` for present/absent keys.
    #[test]
    fn get_contains_parity() {
        let mut m: HashedIndex<u64, u64> = HashedIndex::new();
        for k in [3u64, 14, 15, 92, 65] {
            m.insert(k, k * 10).unwrap();
        }
        for k in [3u64, 14, 15, 92, 65] {
            assert!(m.contains(&k));
            assert_eq!(m.get(&k), Some(&(k * 10)));
        }
        for k in [0u64, 1, 2, 1000] {
            assert!(!m.contains(&k));
            assert!(m.get(&k).is_none());
        }
    }

    /// Invariant: Borrowed lookup works (store `String`, query with `&str`).
    #[test]
    fn borrowed_lookup_with_str() {
        let mut m: HashedIndex<String, i32> = HashedIndex::new();
        m.insert("hello".to_string(), 1).unwrap();
        assert!(m.contains("hello"));
        assert!(!m.contains("world"));
        assert_eq!(m.remove("hello"), Some(1));
        assert!(m.is_empty());
    }

    /// Invariant: The bucket count follows the prime doubling sequence on
    /// growth, measured against the slot count.
    #[test]
    fn growth_follows_prime_sequence() {
        let mut m: HashedIndex<u64, ()> = HashedIndex::new();
        assert_eq!(m.slot_count(), 3);
        let mut seen = Vec::new();
        for k in 0..9u64 {
            m.insert(k, ()).unwrap();
            seen.push(m.slot_count());
        }
        assert_eq!(seen, vec![3, 7, 7, 17, 17, 17, 17, 17, 37]);
    }

    /// Invariant: Removals halve the bucket count once `len * 8 <= slots`,
    /// never dropping below the initial size.
    #[test]
    fn shrink_follows_halving_sequence() {
        let mut m: HashedIndex<u64, ()> = HashedIndex::new();
        for k in 0..9u64 {
            m.insert(k, ()).unwrap();
        }
        let mut seen = Vec::new();
        for k in 0..9u64 {
            assert_eq!(m.remove(&k), Some(()));
            seen.push(m.slot_count());
        }
        assert_eq!(seen, vec![37, 37, 37, 37, 19, 19, 11, 7, 5]);

        // Shrinking stops at the floor.
        for round in 0..4u64 {
            m.insert(round, ()).unwrap();
            m.remove(&round);
        }
        assert!(m.slot_count() >= 3);
    }

    /// Invariant: Removing an absent key fails and changes nothing.
    #[test]
    fn remove_absent_is_noop() {
        let mut m: HashedIndex<i64, &str> = HashedIndex::new();
        m.insert(-5, "neg").unwrap();
        let slots = m.slot_count();
        assert_eq!(m.remove(&7), None);
        assert_eq!(m.len(), 1);
        assert_eq!(m.slot_count(), slots);
        assert_eq!(m.get(&-5), Some(&"neg"));
    }

    /// Invariant: Inserting then removing a key leaves every other key's
    /// presence unchanged.
    #[test]
    fn insert_remove_round_trip() {
        let mut m: HashedIndex<u32, u32> = HashedIndex::new();
        for k in (0..200).step_by(3) {
            m.insert(k, k).unwrap();
        }
        let before: Vec<bool> = (0..200).map(|k| m.contains(&k)).collect();
        m.insert(1000, 1).unwrap();
        assert_eq!(m.remove(&1000), Some(1));
        let after: Vec<bool> = (0..200).map(|k| m.contains(&k)).collect();
        assert_eq!(before, after);
    }

    /// Invariant: Iteration yields each live entry exactly once.
    #[test]
    fn iteration_covers_all_entries() {
        let mut m: HashedIndex<String, usize> = HashedIndex::new();
        let keys = ["k1", "k2", "k3", "k4"];
        for (i, k) in keys.iter().enumerate() {
            m.insert((*k).to_string(), i).unwrap();
        }
        let seen: BTreeSet<String> = m.keys().cloned().collect();
        let expected: BTreeSet<String> = keys.iter().map(|s| (*s).to_string()).collect();
        assert_eq!(seen, expected);
        assert_eq!(m.values().sum::<usize>(), 6);
        assert_eq!(m.chain_lengths().sum::<usize>(), m.len());
    }

    /// Invariant: `get_mut` updates the stored value in place.
    #[test]
    fn get_mut_updates_value() {
        let mut m: HashedIndex<u64, usize> = HashedIndex::new();
        m.insert(9, 1).unwrap();
        *m.get_mut(&9).unwrap() += 41;
        assert_eq!(m.get(&9), Some(&42));
        assert_eq!(m.get_key_value(&9), Some((&9, &42)));
        assert!(m.get_mut(&10).is_none());
    }

    /// Invariant: `clear` empties the index and restores the initial size.
    #[test]
    fn clear_resets() {
        let mut m: HashedIndex<u64, ()> = HashedIndex::new();
        for k in 0..50 {
            m.insert(k, ()).unwrap();
        }
        m.clear();
        assert!(m.is_empty());
        assert_eq!(m.slot_count(), 3);
        assert!(!m.contains(&1));
        m.insert(1, ()).unwrap();
        assert!(m.contains(&1));
    }

    /// Invariant: A configured initial size is rounded up to a prime.
    #[test]
    fn config_rounds_initial_slots_to_prime() {
        let c = IndexConfig::default().with_initial_slots(20).with_sieve_bound(8);
        let m: HashedIndex<u64, ()> = HashedIndex::with_config(c).unwrap();
        assert_eq!(m.slot_count(), 23);

        let bad = IndexConfig::default().with_initial_slots(0);
        assert!(matches!(
            HashedIndex::<u64, ()>::with_config(bad),
            Err(ConfigError::ZeroSlots)
        ));
    }

    /// Invariant: Pseudo-random keys stay evenly spread; no chain grows past a
    /// small constant.
    #[test]
    fn chains_stay_short_for_many_keys() {
        let mut m: HashedIndex<u64, u64> = HashedIndex::new();
        let mut s = 0x9e37_79b9_7f4a_7c15u64;
        for _ in 0..10_000 {
            s = s.wrapping_mul(6364136223846793005).wrapping_add(1);
            let _ = m.insert(s, s);
        }
        assert!(m.len() <= 10_000);
        assert!(m.len() * 2 <= m.slot_count());
        assert!(m.max_chain_len() <= 10, "max chain {}", m.max_chain_len());
        assert_eq!(m.iter().count(), m.len());
    }

    /// Invariant: A grow that needs an unrepresentable sieve bound fails with
    /// `CapacityExhausted` and leaves the index as it was.
    #[test]
    fn grow_past_sieve_limit_is_capacity_exhausted() {
        let c = IndexConfig::default().with_initial_slots(2).with_sieve_bound(2);
        let mut m: HashedIndex<u64, u64> = HashedIndex::with_config(c).unwrap();
        assert_eq!(m.slot_count(), 2);
        m.saturate_sieve();
        m.insert(1, 10).unwrap();
        assert_eq!(
            m.insert(2, 20),
            Err(InsertError::CapacityExhausted { requested: 4 })
        );
        assert_eq!(m.len(), 1);
        assert_eq!(m.slot_count(), 2);
        assert!(!m.contains(&2));
        assert_eq!(m.get(&1), Some(&10));
        // Duplicates are still detected first.
        assert_eq!(m.insert(1, 11), Err(InsertError::DuplicateKey));
    }

    /// Invariant: Bucket indices cover the whole table, so a table larger
    /// than `2^19 - 1` slots fills more than that many buckets.
    #[test]
    fn large_tables_use_every_bucket_range() {
        let mut m: HashedIndex<u64, ()> = HashedIndex::new();
        for k in 0..600_000u64 {
            m.insert(k, ()).unwrap();
        }
        assert!(m.slot_count() > 1_200_000);
        let nonempty = m.chain_lengths().filter(|&n| n > 0).count();
        assert!(nonempty > 524_287, "only {nonempty} buckets in use");
        assert!(m.max_chain_len() <= 2, "max chain {}", m.max_chain_len());
    }
}
