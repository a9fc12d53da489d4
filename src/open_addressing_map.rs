use std::{borrow::Borrow, mem};

use tracing::{debug, warn};

use crate::{
    MapError,
    analysis,
    hash_functions::{self, HashFn},
    probing::{self, ProbeFn},
    table::{HashTable, key_matches},
};

/// Slot count used by [`OpenAddressingMap::new`]
const DEFAULT_CAPACITY: usize = 16;
/// Default load factor threshold, as a percentage
const DEFAULT_LOAD_FACTOR_THRESHOLD: usize = 75;

/// A slot containing a key-value pair
#[derive(Debug, Clone)]
struct Bucket<K, V> {
    /// The key in the key-value pair
    key: K,
    /// The value associated with the key
    value: V,
    /// Flag indicating whether this entry has been deleted (tombstone)
    deleted: bool,
}

/// A hash table that resolves collisions by probing a single flat slot array.
///
/// The slot tried on attempt `i` for a key is `probe(hash(key, capacity), i, capacity)`, with
/// both functions injected at construction. Removal leaves a tombstone that lookups walk past and
/// inserts may reuse. Before an insert would push the load factor over the threshold the table
/// doubles, as many times as needed, and rehashes its live entries, dropping every tombstone.
///
/// A probe walk is bounded by `capacity` attempts. Probe sequences that do not cover the whole
/// table can therefore fail to find a free slot even below the threshold; such inserts return
/// [`MapError::TableFull`] and leave the table unchanged.
#[derive(Debug, Clone)]
pub struct OpenAddressingMap<K, V> {
    /// The slots storing the key-value pairs
    buckets: Vec<Option<Bucket<K, V>>>,
    /// Current number of live elements in the hash table
    size: usize,
    /// Threshold for load factor before resizing - stored as percentage (0-100)
    load_factor_threshold: usize,
    /// Hash function, called with the current capacity as modulus
    hash: HashFn,
    /// Probe function producing the slot for each attempt
    probe: ProbeFn,
}

impl<K, V> Default for OpenAddressingMap<K, V>
where
    K: Borrow<str>,
{
    fn default() -> Self {
        Self::new(hash_functions::default_hash, probing::linear)
    }
}

impl<K, V> Extend<(K, V)> for OpenAddressingMap<K, V>
where
    K: Borrow<str>,
{
    /// Adds every pair, stopping at the first insert that fails with [`MapError::TableFull`]
    fn extend<T: IntoIterator<Item = (K, V)>>(&mut self, iter: T) {
        for (k, v) in iter {
            if let Err(err) = self.add(k, v) {
                warn!(%err, stored = self.size, "extend stopped, remaining pairs dropped");
                break;
            }
        }
    }
}

impl<K, V> OpenAddressingMap<K, V>
where
    K: Borrow<str>,
{
    /// Creates a new `OpenAddressingMap` with the default initial capacity
    #[must_use]
    pub fn new(hash: HashFn, probe: ProbeFn) -> Self {
        Self::with_capacity(DEFAULT_CAPACITY, hash, probe)
    }

    /// Creates a new `OpenAddressingMap` with the specified initial capacity (at least 1)
    #[must_use]
    pub fn with_capacity(capacity: usize, hash: HashFn, probe: ProbeFn) -> Self {
        let mut buckets = Vec::new();
        buckets.resize_with(capacity.max(1), || None);

        Self {
            buckets,
            size: 0,
            load_factor_threshold: DEFAULT_LOAD_FACTOR_THRESHOLD,
            hash,
            probe,
        }
    }

    /// Index of the live slot holding `key`, if it is reachable on its probe path
    fn find_index(&self, key: &str) -> Option<usize> {
        let capacity = self.buckets.len();
        let base = (self.hash)(key, capacity);

        for attempt in 0..capacity {
            let index = (self.probe)(base, attempt, capacity);
            match self.buckets.get(index) {
                // An empty slot proves the key was never inserted along this path
                None | Some(None) => return None,
                Some(Some(bucket)) if !bucket.deleted && key_matches(&bucket.key, key) => {
                    return Some(index);
                }
                Some(Some(_)) => {}
            }
        }

        None
    }

    /// First empty or tombstoned slot on `key`'s probe path in an occupancy map
    fn free_slot<F>(&self, key: &str, capacity: usize, is_free: F) -> Result<usize, MapError>
    where
        F: Fn(usize) -> bool,
    {
        let base = (self.hash)(key, capacity);
        (0..capacity)
            .map(|attempt| (self.probe)(base, attempt, capacity))
            .find(|&index| is_free(index))
            .ok_or(MapError::TableFull { capacity, attempts: capacity })
    }

    /// Whether inserting one more entry would push the load factor over the threshold
    fn needs_resize(&self) -> bool {
        self.size.saturating_add(1).saturating_mul(100) >
            self.buckets.len().saturating_mul(self.load_factor_threshold)
    }

    /// Doubles the capacity and rehashes every live entry, dropping tombstones.
    ///
    /// Target slots are planned before anything moves, so a failure leaves the table untouched.
    fn resize(&mut self) -> Result<(), MapError> {
        let old_capacity = self.buckets.len();
        let new_capacity = old_capacity.saturating_mul(2);
        let mut occupied = vec![false; new_capacity];
        let mut plan = Vec::with_capacity(self.size);

        for bucket in self.buckets.iter().flatten().filter(|bucket| !bucket.deleted) {
            let index = self.free_slot(bucket.key.borrow(), new_capacity, |index| {
                !occupied.get(index).copied().unwrap_or(true)
            })?;
            if let Some(flag) = occupied.get_mut(index) {
                *flag = true;
            }
            plan.push(index);
        }

        let tombstones = self.tombstones();
        let mut new_buckets = Vec::new();
        new_buckets.resize_with(new_capacity, || None);

        let live = mem::take(&mut self.buckets).into_iter().flatten().filter(|b| !b.deleted);
        for (bucket, index) in live.zip(plan) {
            if let Some(slot) = new_buckets.get_mut(index) {
                *slot = Some(bucket);
            }
        }

        self.buckets = new_buckets;
        debug!(old_capacity, new_capacity, live = self.size, tombstones, "resized table");
        Ok(())
    }

    /// Returns the slot currently holding `key`
    #[must_use]
    pub fn slot_of(&self, key: &str) -> Option<usize> {
        self.find_index(key)
    }

    /// Returns the number of tombstoned slots
    #[must_use]
    pub fn tombstones(&self) -> usize {
        self.buckets.iter().flatten().filter(|bucket| bucket.deleted).count()
    }

    /// Run lengths of consecutive live slots, in slot order.
    ///
    /// Empty and tombstoned slots end a run.
    #[must_use]
    pub fn cluster_lengths(&self) -> Vec<usize> {
        analysis::cluster_lengths(&self.chain_lengths())
    }

    /// Provide a way to configure the load factor threshold, as a percentage
    pub fn set_load_factor_threshold(&mut self, threshold: usize) {
        self.load_factor_threshold = threshold.clamp(1, 95); // Keep within reasonable range
    }

    /// Returns the load factor threshold as a percentage
    #[must_use]
    pub fn load_factor_threshold(&self) -> usize {
        self.load_factor_threshold
    }

    /// Returns an iterator over the live key-value pairs in slot order
    #[must_use]
    #[allow(clippy::iter_without_into_iter)]
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter { buckets: &self.buckets, index: 0 }
    }

    /// Clears the table, removing all entries and tombstones but keeping the capacity
    pub fn clear(&mut self) {
        for bucket in &mut self.buckets {
            *bucket = None;
        }
        self.size = 0;
    }
}

impl<K, V> HashTable<K, V> for OpenAddressingMap<K, V>
where
    K: Borrow<str>,
{
    fn add(&mut self, key: K, value: V) -> Result<Option<V>, MapError> {
        if let Some(index) = self.find_index(key.borrow()) {
            if let Some(Some(bucket)) = self.buckets.get_mut(index) {
                return Ok(Some(mem::replace(&mut bucket.value, value)));
            }
        }

        // A low threshold can need more than one doubling
        while self.needs_resize() {
            if let Err(err) = self.resize() {
                warn!(%err, "resize abandoned");
                return Err(err);
            }
        }

        let capacity = self.buckets.len();
        let index = self
            .free_slot(key.borrow(), capacity, |index| {
                matches!(self.buckets.get(index), Some(None) | Some(Some(Bucket { deleted: true, .. })))
            })
            .inspect_err(|err| warn!(%err, "insert failed"))?;

        if let Some(slot) = self.buckets.get_mut(index) {
            *slot = Some(Bucket { key, value, deleted: false });
            self.size = self.size.saturating_add(1);
        }
        Ok(None)
    }

    fn get(&self, key: &str) -> Result<&V, MapError> {
        self.find_index(key)
            .and_then(|index| self.buckets.get(index))
            .and_then(Option::as_ref)
            .map(|bucket| &bucket.value)
            .ok_or_else(|| MapError::KeyNotFound(key.to_owned()))
    }

    fn remove(&mut self, key: &str) -> bool {
        let Some(index) = self.find_index(key) else {
            return false;
        };
        match self.buckets.get_mut(index) {
            Some(Some(bucket)) => {
                bucket.deleted = true;
                self.size = self.size.saturating_sub(1);
                true
            }
            _ => false,
        }
    }

    fn len(&self) -> usize {
        self.size
    }

    fn capacity(&self) -> usize {
        self.buckets.len()
    }

    /// Returns `len / capacity`
    #[allow(clippy::cast_precision_loss)]
    fn load_factor(&self) -> f64 {
        self.size as f64 / self.buckets.len() as f64
    }

    /// One entry per slot: 1 for a live entry, 0 for an empty or tombstoned slot
    fn chain_lengths(&self) -> Vec<usize> {
        self.buckets
            .iter()
            .map(|bucket| usize::from(bucket.as_ref().is_some_and(|bucket| !bucket.deleted)))
            .collect()
    }
}

/// Iterator over the live key-value pairs of an [`OpenAddressingMap`]
#[derive(Debug, Clone)]
pub struct Iter<'a, K, V> {
    /// Reference to the slots in the table
    buckets: &'a [Option<Bucket<K, V>>],
    /// Current position in the iteration
    index: usize,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(slot) = self.buckets.get(self.index) {
            self.index = self.index.saturating_add(1);
            if let Some(bucket) = slot {
                if !bucket.deleted {
                    return Some((&bucket.key, &bucket.value));
                }
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{hash_functions::ALL_HASH_FUNCTIONS, probing::PROBE_FUNCTIONS};
    use proptest::prelude::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Calls made to `counting_hash`, only used by `test_hash_computed_once_per_walk`
    static HASH_CALLS: AtomicUsize = AtomicUsize::new(0);

    fn counting_hash(_key: &str, _modulus: usize) -> usize {
        HASH_CALLS.fetch_add(1, Ordering::Relaxed);
        0
    }

    fn zero_hash(_key: &str, _modulus: usize) -> usize {
        0
    }

    fn stuck_probe(_base: usize, _attempt: usize, _capacity: usize) -> usize {
        0
    }

    /// Walks a table of up to three slots but sends every attempt to slot 0 once it grows
    fn shrinking_probe(_base: usize, attempt: usize, capacity: usize) -> usize {
        if capacity <= 3 { attempt % capacity.max(1) } else { 0 }
    }

    #[test]
    fn test_add_and_get() {
        let mut map = OpenAddressingMap::default();
        assert_eq!(map.add("key1".to_string(), 1), Ok(None));
        assert_eq!(map.add("key2".to_string(), 2), Ok(None));
        assert_eq!(map.add("key3".to_string(), 3), Ok(None));

        assert_eq!(map.get("key1"), Ok(&1));
        assert_eq!(map.get("key2"), Ok(&2));
        assert_eq!(map.get("key3"), Ok(&3));
        assert_eq!(map.get("key4"), Err(MapError::KeyNotFound("key4".to_string())));
    }

    #[test]
    fn test_update() {
        let mut map = OpenAddressingMap::default();
        assert_eq!(map.add("key1".to_string(), 1), Ok(None));
        assert_eq!(map.add("key1".to_string(), 10), Ok(Some(1)));
        assert_eq!(map.get("key1"), Ok(&10));
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn test_remove() {
        let mut map = OpenAddressingMap::default();
        map.extend([("key1".to_string(), 1), ("key2".to_string(), 2)]);

        assert!(map.remove("key1"));
        assert_eq!(map.get("key1"), Err(MapError::KeyNotFound("key1".to_string())));
        assert_eq!(map.get("key2"), Ok(&2));
        assert!(!map.remove("key1"));
        assert_eq!(map.tombstones(), 1);
    }

    #[test]
    fn test_linear_collisions_fill_consecutive_slots() {
        let mut map = OpenAddressingMap::with_capacity(4, zero_hash, probing::linear);
        map.extend([("a", 1), ("b", 2), ("c", 3)]);

        assert_eq!(map.capacity(), 4);
        assert_eq!(map.slot_of("a"), Some(0));
        assert_eq!(map.slot_of("b"), Some(1));
        assert_eq!(map.slot_of("c"), Some(2));
        assert_eq!(map.get("c"), Ok(&3));
        assert_eq!(map.get("a"), Ok(&1));
        assert_eq!(map.get("b"), Ok(&2));
        assert_eq!(map.chain_lengths(), vec![1, 1, 1, 0]);
        assert_eq!(map.cluster_lengths(), vec![3]);
    }

    #[test]
    fn test_tombstone_slot_reuse() {
        let mut map = OpenAddressingMap::with_capacity(8, zero_hash, probing::linear);
        assert_eq!(map.add("first", 1), Ok(None));
        assert!(map.remove("first"));
        assert_eq!(map.chain_lengths(), vec![0; 8]);

        assert_eq!(map.add("second", 2), Ok(None));
        assert_eq!(map.slot_of("second"), Some(0));
        assert_eq!(map.tombstones(), 0);
    }

    #[test]
    fn test_lookup_walks_past_tombstones() {
        let mut map = OpenAddressingMap::with_capacity(8, zero_hash, probing::linear);
        map.extend([("a", 1), ("b", 2), ("c", 3)]);
        assert!(map.remove("b"));

        assert_eq!(map.get("c"), Ok(&3));
        assert_eq!(map.cluster_lengths(), vec![1, 1]);
    }

    #[test]
    fn test_resize() {
        let mut map = OpenAddressingMap::with_capacity(4, hash_functions::polynomial, probing::linear);
        map.set_load_factor_threshold(50);

        assert_eq!(map.add("key1".to_string(), 1), Ok(None));
        assert_eq!(map.add("key2".to_string(), 2), Ok(None));
        // A third entry would exceed 50% of 4 slots
        assert_eq!(map.add("key3".to_string(), 3), Ok(None));

        assert_eq!(map.get("key1"), Ok(&1));
        assert_eq!(map.get("key2"), Ok(&2));
        assert_eq!(map.get("key3"), Ok(&3));
        assert_eq!(map.capacity(), 8);
    }

    #[test]
    fn test_resize_drops_tombstones() {
        let mut map = OpenAddressingMap::with_capacity(4, zero_hash, probing::linear);
        map.extend([("a", 1), ("b", 2), ("c", 3)]);
        assert!(map.remove("a"));
        assert_eq!(map.tombstones(), 1);

        // Two live entries plus one more exceed 50% of 4 slots
        map.set_load_factor_threshold(50);
        assert_eq!(map.add("d", 4), Ok(None));

        assert_eq!(map.capacity(), 8);
        assert_eq!(map.tombstones(), 0);
        assert_eq!(map.len(), 3);
        assert_eq!(map.slot_of("b"), Some(0));
        assert_eq!(map.slot_of("c"), Some(1));
        assert_eq!(map.slot_of("d"), Some(2));
        assert_eq!(map.get("a"), Err(MapError::KeyNotFound("a".to_string())));
    }

    #[test]
    fn test_table_full_when_probe_is_stuck() {
        let mut map = OpenAddressingMap::with_capacity(4, zero_hash, stuck_probe);
        assert_eq!(map.add("a", 1), Ok(None));
        assert_eq!(map.add("b", 2), Err(MapError::TableFull { capacity: 4, attempts: 4 }));
        assert_eq!(map.len(), 1);
        assert_eq!(map.get("a"), Ok(&1));
    }

    #[test]
    fn test_failed_resize_keeps_table() {
        let mut map = OpenAddressingMap::with_capacity(3, zero_hash, shrinking_probe);
        map.set_load_factor_threshold(95);
        assert_eq!(map.add("a", 1), Ok(None));
        assert_eq!(map.add("b", 2), Ok(None));

        // Growing to 6 slots cannot place "b" anymore, so the insert fails as a whole
        assert_eq!(map.add("c", 3), Err(MapError::TableFull { capacity: 6, attempts: 6 }));
        assert_eq!(map.capacity(), 3);
        assert_eq!(map.len(), 2);
        assert_eq!(map.get("a"), Ok(&1));
        assert_eq!(map.get("b"), Ok(&2));
    }

    #[test]
    fn test_low_threshold_grows_until_bound_holds() {
        let mut map = OpenAddressingMap::with_capacity(4, hash_functions::polynomial, probing::linear);
        map.set_load_factor_threshold(10);

        assert_eq!(map.add("k0".to_string(), 0), Ok(None));
        assert_eq!(map.capacity(), 16);

        for i in 1..40 {
            assert_eq!(map.add(format!("k{i}"), i), Ok(None));
            assert!(map.len() * 100 <= map.capacity() * 10, "len {} cap {}", map.len(), map.capacity());
        }
        for i in 0..40 {
            assert_eq!(map.get(&format!("k{i}")), Ok(&i));
        }
    }

    #[test]
    fn test_hash_computed_once_per_walk() {
        let mut map = OpenAddressingMap::with_capacity(8, counting_hash, probing::linear);
        map.set_load_factor_threshold(95);
        map.extend([("a", 1), ("b", 2), ("c", 3), ("d", 4)]);

        // "e" walks past four occupied slots on lookup and on insert
        HASH_CALLS.store(0, Ordering::Relaxed);
        assert_eq!(map.add("e", 5), Ok(None));
        assert_eq!(HASH_CALLS.load(Ordering::Relaxed), 2);
        assert_eq!(map.slot_of("e"), Some(4));
    }

    #[test]
    fn test_extend_stops_at_first_failure() {
        let mut map = OpenAddressingMap::with_capacity(4, zero_hash, stuck_probe);
        map.extend([("a", 1), ("b", 2), ("c", 3)]);

        assert_eq!(map.len(), 1);
        assert_eq!(map.get("a"), Ok(&1));
        assert!(!map.contains_key("b"));
        assert!(!map.contains_key("c"));
    }

    #[test]
    fn test_threshold_is_clamped() {
        let mut map: OpenAddressingMap<String, i32> = OpenAddressingMap::default();
        map.set_load_factor_threshold(0);
        assert_eq!(map.load_factor_threshold(), 1);
        map.set_load_factor_threshold(100);
        assert_eq!(map.load_factor_threshold(), 95);
    }

    #[test]
    fn test_iter_and_clear() {
        let mut map = OpenAddressingMap::default();
        map.extend([("key1", 1), ("key2", 2), ("key3", 3)]);
        assert!(map.remove("key2"));

        let mut sum = 0;
        let mut count = 0;
        for (_, &value) in map.iter() {
            sum += value;
            count += 1;
        }
        assert_eq!(count, 2);
        assert_eq!(sum, 4);

        map.clear();
        assert!(map.is_empty());
        assert_eq!(map.iter().count(), 0);
        assert_eq!(map.tombstones(), 0);
    }

    #[test]
    fn test_round_trip_every_combination() {
        for (hash_name, hash) in ALL_HASH_FUNCTIONS {
            for (probe_name, probe) in PROBE_FUNCTIONS {
                let mut map = OpenAddressingMap::with_capacity(7, *hash, *probe);
                let mut stored = Vec::new();
                for i in 0..100 {
                    let key = format!("key-{i}");
                    match map.add(key.clone(), i) {
                        Ok(previous) => {
                            assert_eq!(previous, None, "{hash_name}/{probe_name}");
                            stored.push((key, i));
                        }
                        Err(err) => assert!(
                            matches!(err, MapError::TableFull { .. }),
                            "{hash_name}/{probe_name}: {err}"
                        ),
                    }
                }
                assert_eq!(map.len(), stored.len(), "{hash_name}/{probe_name}");
                for (key, value) in &stored {
                    assert_eq!(map.get(key), Ok(value), "{hash_name}/{probe_name}");
                }
            }
        }
    }

    proptest! {
        #[test]
        fn prop_growth_keeps_keys_and_bounds_load(
            keys in proptest::collection::hash_set("[a-z0-9]{1,12}", 1..200),
            capacity in 1_usize..32,
        ) {
            let mut map = OpenAddressingMap::with_capacity(capacity, hash_functions::default_hash, probing::linear);
            for key in &keys {
                prop_assert_eq!(map.add(key.clone(), key.len()), Ok(None));
                prop_assert!(map.load_factor() <= 0.75);
            }
            if keys.len() * 100 > capacity * 75 {
                prop_assert!(map.capacity() >= capacity * 2);
            }
            for key in &keys {
                prop_assert_eq!(map.get(key), Ok(&key.len()));
            }
        }

        #[test]
        fn prop_load_bound_holds_for_any_threshold(
            keys in proptest::collection::hash_set("[a-z0-9]{1,12}", 1..100),
            capacity in 1_usize..16,
            threshold in 1_usize..=95,
        ) {
            let mut map = OpenAddressingMap::with_capacity(capacity, hash_functions::polynomial, probing::linear);
            map.set_load_factor_threshold(threshold);
            for key in &keys {
                prop_assert_eq!(map.add(key.clone(), ()), Ok(None));
                prop_assert!(map.len() * 100 <= map.capacity() * threshold);
            }
            prop_assert_eq!(map.len(), keys.len());
        }

        #[test]
        fn prop_remove_then_get_fails(
            keys in proptest::collection::hash_set("[a-z]{1,8}", 1..64),
        ) {
            let mut map = OpenAddressingMap::new(hash_functions::polynomial, probing::linear);
            for key in &keys {
                prop_assert!(map.add(key.clone(), ()).is_ok());
            }
            for key in &keys {
                prop_assert!(map.remove(key));
                prop_assert!(map.get(key).is_err());
                prop_assert!(!map.remove(key));
            }
            prop_assert!(map.is_empty());
        }
    }
}
