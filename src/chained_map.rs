use std::{borrow::Borrow, mem};

use crate::{
    MapError,
    hash_functions::{self, HashFn},
    table::{HashTable, key_matches},
};

/// Bucket count used by [`ChainedHashMap::default`]
const DEFAULT_BUCKETS: usize = 16;

/// A key-value pair stored in a chain
#[derive(Debug, Clone)]
struct Entry<K, V> {
    /// The key in the key-value pair
    key: K,
    /// The value associated with the key
    value: V,
}

/// A hash table that resolves collisions by separate chaining.
///
/// The bucket array has a fixed length chosen at construction and never grows; every bucket is a
/// sequence of entries kept in insertion order. A bucket stays unallocated until its first
/// insertion. Adding a key that is already present replaces its value, so a key occurs at most
/// once.
#[derive(Debug, Clone)]
pub struct ChainedHashMap<K, V> {
    /// One optional chain per bucket
    buckets: Vec<Option<Vec<Entry<K, V>>>>,
    /// Current number of entries across all chains
    size: usize,
    /// Hash function used to pick a bucket, called with the bucket count as modulus
    hash: HashFn,
}

impl<K, V> Default for ChainedHashMap<K, V>
where
    K: Borrow<str>,
{
    fn default() -> Self {
        Self::new(DEFAULT_BUCKETS, hash_functions::default_hash)
    }
}

impl<K, V> Extend<(K, V)> for ChainedHashMap<K, V>
where
    K: Borrow<str>,
{
    fn extend<T: IntoIterator<Item = (K, V)>>(&mut self, iter: T) {
        for (k, v) in iter {
            if self.add(k, v).is_err() {
                break;
            }
        }
    }
}

impl<K, V> ChainedHashMap<K, V>
where
    K: Borrow<str>,
{
    /// Creates a table with `buckets` chains (at least one) using `hash` to place keys
    #[must_use]
    pub fn new(buckets: usize, hash: HashFn) -> Self {
        let mut chains = Vec::new();
        chains.resize_with(buckets.max(1), || None);
        Self { buckets: chains, size: 0, hash }
    }

    /// Gets the bucket index for a key
    fn bucket_index(&self, key: &str) -> usize {
        let bucket_count = self.buckets.len();
        (self.hash)(key, bucket_count).checked_rem(bucket_count).unwrap_or(0)
    }

    /// Returns the chain for `key`'s bucket, if it was ever allocated
    fn chain(&self, key: &str) -> Option<&Vec<Entry<K, V>>> {
        self.buckets.get(self.bucket_index(key)).and_then(Option::as_ref)
    }

    /// Returns the fraction of buckets that hold at least one entry.
    ///
    /// This measures how evenly the hash function spreads keys, unlike the classic
    /// `len / capacity` ratio which can exceed 1 for chained tables.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn filled_ratio(&self) -> f64 {
        self.filled_buckets() as f64 / self.buckets.len() as f64
    }

    /// Number of buckets holding at least one entry
    #[must_use]
    pub fn filled_buckets(&self) -> usize {
        self.buckets.iter().flatten().filter(|chain| !chain.is_empty()).count()
    }

    /// Returns an iterator over the key-value pairs, bucket by bucket in insertion order
    #[must_use]
    #[allow(clippy::iter_without_into_iter)]
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter { buckets: &self.buckets, bucket: 0, position: 0 }
    }

    /// Clears the table, keeping the bucket count
    pub fn clear(&mut self) {
        for bucket in &mut self.buckets {
            *bucket = None;
        }
        self.size = 0;
    }
}

impl<K, V> HashTable<K, V> for ChainedHashMap<K, V>
where
    K: Borrow<str>,
{
    fn add(&mut self, key: K, value: V) -> Result<Option<V>, MapError> {
        let index = self.bucket_index(key.borrow());

        if let Some(slot) = self.buckets.get_mut(index) {
            let chain = slot.get_or_insert_with(Vec::new);
            if let Some(entry) = chain.iter_mut().find(|entry| key_matches(&entry.key, key.borrow())) {
                return Ok(Some(mem::replace(&mut entry.value, value)));
            }

            chain.push(Entry { key, value });
            self.size = self.size.saturating_add(1);
        }
        Ok(None)
    }

    fn get(&self, key: &str) -> Result<&V, MapError> {
        self.chain(key)
            .and_then(|chain| chain.iter().find(|entry| key_matches(&entry.key, key)))
            .map(|entry| &entry.value)
            .ok_or_else(|| MapError::KeyNotFound(key.to_owned()))
    }

    fn remove(&mut self, key: &str) -> bool {
        let index = self.bucket_index(key);
        let Some(Some(chain)) = self.buckets.get_mut(index) else {
            return false;
        };
        match chain.iter().position(|entry| key_matches(&entry.key, key)) {
            Some(position) => {
                chain.remove(position);
                self.size = self.size.saturating_sub(1);
                true
            }
            None => false,
        }
    }

    fn len(&self) -> usize {
        self.size
    }

    fn capacity(&self) -> usize {
        self.buckets.len()
    }

    /// For a chained table this is [`ChainedHashMap::filled_ratio`]
    fn load_factor(&self) -> f64 {
        self.filled_ratio()
    }

    fn chain_lengths(&self) -> Vec<usize> {
        self.buckets.iter().map(|bucket| bucket.as_ref().map_or(0, Vec::len)).collect()
    }
}

/// Iterator over the key-value pairs of a [`ChainedHashMap`]
#[derive(Debug, Clone)]
pub struct Iter<'a, K, V> {
    /// Reference to the buckets in the table
    buckets: &'a [Option<Vec<Entry<K, V>>>],
    /// Bucket currently being walked
    bucket: usize,
    /// Position inside the current chain
    position: usize,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(bucket) = self.buckets.get(self.bucket) {
            if let Some(entry) = bucket.as_ref().and_then(|chain| chain.get(self.position)) {
                self.position = self.position.saturating_add(1);
                return Some((&entry.key, &entry.value));
            }
            self.bucket = self.bucket.saturating_add(1);
            self.position = 0;
        }
        None
    }
}
