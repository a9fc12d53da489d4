//! # Probebench
//!
//! Hash tables built from scratch, with pluggable hash and probe functions and a harness that
//! scores how evenly each combination spreads keys.
//!
//! This crate provides two hash table implementations behind the [`HashTable`] trait:
//!
//! - `ChainedHashMap`: a fixed array of buckets, each holding a chain of entries
//! - `OpenAddressingMap`: a flat slot array with probing, tombstones and automatic growth
//!
//! Hash functions ([`hash_functions`]) and probe sequences ([`probing`]) are plain function
//! pointers injected at construction, and [`analysis`] measures chain and cluster lengths after
//! bulk random insertion.
//!
//! ## Basic Usage
//!
//! ```rust
//! use probebench::{HashTable, MapError, OpenAddressingMap, hash_functions, probing};
//!
//! // Create a table hashing with the polynomial function and probing linearly
//! let mut map = OpenAddressingMap::new(hash_functions::polynomial, probing::linear);
//!
//! // Insert values
//! map.add("apple".to_string(), 1).unwrap();
//! map.add("banana".to_string(), 2).unwrap();
//!
//! // Retrieve values
//! assert_eq!(map.get("apple"), Ok(&1));
//!
//! // Update values
//! assert_eq!(map.add("apple".to_string(), 10), Ok(Some(1)));
//! assert_eq!(map.get("apple"), Ok(&10));
//!
//! // Remove values
//! assert!(map.remove("apple"));
//! assert_eq!(map.get("apple"), Err(MapError::KeyNotFound("apple".to_string())));
//! ```
//!
//! ## Comparing Hash Functions
//!
//! ```rust
//! use probebench::{analysis, hash_functions};
//! use rand::{SeedableRng, rngs::StdRng};
//!
//! let pairs = analysis::generate_pairs(1_000, &mut StdRng::seed_from_u64(7));
//! let ranked =
//!     analysis::run_chained_suite(hash_functions::CHAINED_HASH_FUNCTIONS, 100, &pairs);
//!
//! // Best configuration first
//! assert!(ranked.windows(2).all(|w| w[0].max_chain <= w[1].max_chain));
//! ```

/// Distribution statistics and the comparison harness
pub mod analysis;
/// Hash table resolving collisions by separate chaining
mod chained_map;
/// Error type shared by the tables
mod error;
/// Interchangeable string hash functions
pub mod hash_functions;
/// Hash table resolving collisions by open addressing
mod open_addressing_map;
/// Probe sequence generators
pub mod probing;
/// The interface shared by both tables
mod table;

pub use chained_map::ChainedHashMap;
pub use error::MapError;
pub use open_addressing_map::OpenAddressingMap;
pub use table::HashTable;
