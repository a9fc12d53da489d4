//! Distribution analysis for hash function and probe sequence combinations.
//!
//! The harness fills a table with a batch of unique random keys and then reads the occupancy
//! back through [`HashTable::chain_lengths`]. Chained tables are scored by their longest chain,
//! open-addressing tables by their longest cluster of consecutive live slots. Lower is better;
//! ties go to the configuration that spreads keys over more of the table.

use std::collections::HashSet;

use rand::Rng;
use tracing::{debug, info};

use crate::{
    ChainedHashMap, HashTable, MapError, OpenAddressingMap, hash_functions::HashFn,
    probing::ProbeFn,
};

/// Exclusive upper bound of the numeric suffix of generated values
const VALUE_RANGE_END: u32 = 100_000;

/// Statistics of a chained table after bulk insertion
#[derive(Debug, Clone, PartialEq)]
pub struct ChainReport {
    /// Name of the hash function
    pub name: String,
    /// Buckets holding at least one entry
    pub filled_buckets: usize,
    /// Total number of buckets
    pub capacity: usize,
    /// `filled_buckets / capacity` as a percentage
    pub fill_percent: f64,
    /// Length of the longest chain
    pub max_chain: usize,
    /// Length of the shortest non-empty chain, 0 when every bucket is empty
    pub min_chain: usize,
}

/// Statistics of an open-addressing table after bulk insertion
#[derive(Debug, Clone, PartialEq)]
pub struct ClusterReport {
    /// Name of the hash function
    pub name: String,
    /// Name of the probe function
    pub probe: String,
    /// Number of pairs stored before the run ended
    pub inserted: usize,
    /// Capacity of the table at the end of the run
    pub capacity: usize,
    /// `inserted / capacity`
    pub load_factor: f64,
    /// Length of the longest run of consecutive live slots
    pub max_cluster: usize,
    /// Whether insertion stopped early on [`MapError::TableFull`]
    pub table_full: bool,
}

/// Generates `count` pairs with unique eight-digit hex keys and `Value_<n>` values
#[must_use]
pub fn generate_pairs<R: Rng + ?Sized>(count: usize, rng: &mut R) -> Vec<(String, String)> {
    let mut seen = HashSet::with_capacity(count);
    let mut pairs = Vec::with_capacity(count);

    while pairs.len() < count {
        let key = format!("{:08x}", rng.random::<u32>());
        if seen.insert(key.clone()) {
            let value = format!("Value_{}", rng.random_range(1..VALUE_RANGE_END));
            pairs.push((key, value));
        }
    }

    pairs
}

/// Lengths of the maximal runs of non-zero entries, in order
#[must_use]
pub fn cluster_lengths(occupancy: &[usize]) -> Vec<usize> {
    let mut clusters = Vec::new();
    let mut current: usize = 0;

    for &slot in occupancy {
        if slot > 0 {
            current = current.saturating_add(1);
        } else if current > 0 {
            clusters.push(current);
            current = 0;
        }
    }
    if current > 0 {
        clusters.push(current);
    }

    clusters
}

/// Length of the longest run of non-zero entries
#[must_use]
pub fn max_cluster(occupancy: &[usize]) -> usize {
    cluster_lengths(occupancy).into_iter().max().unwrap_or(0)
}

/// Inserts every pair into a chained table of `capacity` buckets and measures its chains
#[must_use]
pub fn analyze_chained(
    name: &str,
    hash: HashFn,
    capacity: usize,
    pairs: &[(String, String)],
) -> ChainReport {
    let mut map = ChainedHashMap::new(capacity, hash);
    map.extend(pairs.iter().map(|(key, value)| (key.as_str(), value.as_str())));

    let chains = map.chain_lengths();
    let filled_buckets = map.filled_buckets();
    let report = ChainReport {
        name: name.to_owned(),
        filled_buckets,
        capacity: map.capacity(),
        fill_percent: map.filled_ratio() * 100.0,
        max_chain: chains.iter().copied().max().unwrap_or(0),
        min_chain: chains.iter().copied().filter(|&len| len > 0).min().unwrap_or(0),
    };

    debug!(?report, "chained run finished");
    report
}

/// Inserts pairs into an open-addressing table until done or full and measures its clusters
#[must_use]
pub fn analyze_open_addressing(
    name: &str,
    hash: HashFn,
    probe_name: &str,
    probe: ProbeFn,
    capacity: usize,
    pairs: &[(String, String)],
) -> ClusterReport {
    let mut map = OpenAddressingMap::with_capacity(capacity, hash, probe);
    let mut table_full = false;

    for (key, value) in pairs {
        if let Err(err) = map.add(key.as_str(), value.as_str()) {
            info!(hash = name, probe = probe_name, %err, "insertion stopped");
            table_full = matches!(err, MapError::TableFull { .. });
            break;
        }
    }

    let report = ClusterReport {
        name: name.to_owned(),
        probe: probe_name.to_owned(),
        inserted: map.len(),
        capacity: map.capacity(),
        load_factor: map.load_factor(),
        max_cluster: map.cluster_lengths().into_iter().max().unwrap_or(0),
        table_full,
    };

    debug!(?report, "open-addressing run finished");
    report
}

/// Orders chained reports best first: shortest longest chain, then highest fill
pub fn rank_chained(reports: &mut [ChainReport]) {
    reports.sort_by(|a, b| {
        a.max_chain.cmp(&b.max_chain).then_with(|| b.fill_percent.total_cmp(&a.fill_percent))
    });
}

/// Orders open-addressing reports best first.
///
/// Runs that stored every pair come before runs that overflowed, since an overflowed table
/// holds fewer keys and its clusters are not comparable. Within each group the shortest
/// longest cluster wins, then the highest load factor.
pub fn rank_open_addressing(reports: &mut [ClusterReport]) {
    reports.sort_by(|a, b| {
        a.table_full
            .cmp(&b.table_full)
            .then_with(|| a.max_cluster.cmp(&b.max_cluster))
            .then_with(|| b.load_factor.total_cmp(&a.load_factor))
    });
}

/// Analyzes every hash function on a chained table and returns the ranked reports
#[must_use]
pub fn run_chained_suite(
    hashes: &[(&str, HashFn)],
    capacity: usize,
    pairs: &[(String, String)],
) -> Vec<ChainReport> {
    info!(functions = hashes.len(), capacity, pairs = pairs.len(), "running chained suite");
    let mut reports: Vec<ChainReport> = hashes
        .iter()
        .map(|&(name, hash)| analyze_chained(name, hash, capacity, pairs))
        .collect();
    rank_chained(&mut reports);
    reports
}

/// Analyzes every hash and probe combination on an open-addressing table and returns the
/// ranked reports
#[must_use]
pub fn run_open_addressing_suite(
    hashes: &[(&str, HashFn)],
    probes: &[(&str, ProbeFn)],
    capacity: usize,
    pairs: &[(String, String)],
) -> Vec<ClusterReport> {
    info!(
        functions = hashes.len(),
        probes = probes.len(),
        capacity,
        pairs = pairs.len(),
        "running open-addressing suite"
    );
    let mut reports: Vec<ClusterReport> = hashes
        .iter()
        .flat_map(|&(name, hash)| {
            probes.iter().map(move |&(probe_name, probe)| {
                analyze_open_addressing(name, hash, probe_name, probe, capacity, pairs)
            })
        })
        .collect();
    rank_open_addressing(&mut reports);
    reports
}
