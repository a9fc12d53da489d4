//! Error type shared by both table implementations

use thiserror::Error;

/// Errors returned by [`HashTable`](crate::HashTable) operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MapError {
    /// No live entry for the key is reachable on its bucket or probe path
    #[error("key '{0}' not found")]
    KeyNotFound(String),
    /// The probe walk ran out of attempts without finding a free slot
    #[error("table is full: no free slot found after {attempts} probes (capacity {capacity})")]
    TableFull {
        /// Capacity of the table at the time of the failure
        capacity: usize,
        /// Number of probe attempts that were made
        attempts: usize,
    },
}
