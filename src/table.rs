//! The capability interface implemented by both table layouts

use crate::MapError;

/// Operations common to [`ChainedHashMap`](crate::ChainedHashMap) and
/// [`OpenAddressingMap`](crate::OpenAddressingMap).
///
/// Keys are looked up by `&str`; any key type that borrows as `str` works.
pub trait HashTable<K, V> {
    /// Inserts a key-value pair, returning the previous value if the key was already present
    ///
    /// # Errors
    ///
    /// Returns [`MapError::TableFull`] when an open-addressing table cannot find a free slot.
    fn add(&mut self, key: K, value: V) -> Result<Option<V>, MapError>;

    /// Returns the value stored for `key`
    ///
    /// # Errors
    ///
    /// Returns [`MapError::KeyNotFound`] when no live entry for `key` is reachable.
    fn get(&self, key: &str) -> Result<&V, MapError>;

    /// Removes `key`, returning whether an entry was removed
    fn remove(&mut self, key: &str) -> bool;

    /// Number of live entries
    fn len(&self) -> usize;

    /// Number of buckets or slots in the backing array
    fn capacity(&self) -> usize;

    /// Layout-specific load factor
    fn load_factor(&self) -> f64;

    /// Number of live entries stored at each bucket or slot, in index order
    fn chain_lengths(&self) -> Vec<usize>;

    /// Returns true if the table holds no live entries
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns true if `key` is present
    fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_ok()
    }
}

/// Compares a stored key against a lookup key through its `str` borrow
pub(crate) fn key_matches<K: std::borrow::Borrow<str>>(stored: &K, key: &str) -> bool {
    <K as std::borrow::Borrow<str>>::borrow(stored) == key
}
