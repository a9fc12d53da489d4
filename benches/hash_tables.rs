#![allow(
    missing_docs,
    clippy::missing_docs_in_private_items,
    clippy::unwrap_used,
    clippy::similar_names
)]
use std::{collections::HashMap, hint::black_box};

use criterion::{Criterion, criterion_group, criterion_main};
use probebench::{ChainedHashMap, HashTable, OpenAddressingMap, hash_functions, probing};
use proptest::{
    prelude::{Strategy, any},
    strategy::ValueTree,
    test_runner::TestRunner,
};

const ITEMS_AMOUNT: usize = 1000;
const SAMPLE_SIZE: usize = 10;
const CHAINED_BUCKETS: usize = 256;

fn hash_map_benches(c: &mut Criterion) {
    let mut runner = TestRunner::default();
    let items: Vec<(String, u32)> =
        proptest::collection::vec(("[a-z0-9]{8}", any::<u32>()), ITEMS_AMOUNT)
            .new_tree(&mut runner)
            .unwrap()
            .current();

    let mut group = c.benchmark_group("Hash map comparison benchmark");
    group.sample_size(SAMPLE_SIZE);

    group.bench_function("chained add", |b| {
        b.iter(|| {
            let mut map = ChainedHashMap::new(CHAINED_BUCKETS, hash_functions::polynomial);
            for (key, value) in &items {
                assert!(map.add(key.as_str(), *value).is_ok());
            }
            black_box(map)
        });
    });
    group.bench_function("open addressing add", |b| {
        b.iter(|| {
            let mut map = OpenAddressingMap::new(hash_functions::polynomial, probing::linear);
            for (key, value) in &items {
                assert!(map.add(key.as_str(), *value).is_ok());
            }
            black_box(map)
        });
    });
    group.bench_function("rust std insert", |b| {
        b.iter(|| {
            let mut map = HashMap::new();
            for (key, value) in &items {
                map.insert(key.as_str(), *value);
            }
            black_box(map)
        });
    });

    let mut chained_map = ChainedHashMap::new(CHAINED_BUCKETS, hash_functions::polynomial);
    let mut open_map = OpenAddressingMap::new(hash_functions::polynomial, probing::linear);
    let mut rust_map = HashMap::new();
    for (key, value) in &items {
        chained_map.add(key.as_str(), *value).unwrap();
        open_map.add(key.as_str(), *value).unwrap();
        rust_map.insert(key.as_str(), *value);
    }

    group.bench_function("chained get", |b| {
        b.iter(|| {
            for (key, _) in &items {
                assert!(black_box(chained_map.get(key)).is_ok());
            }
        });
    });
    group.bench_function("open addressing get", |b| {
        b.iter(|| {
            for (key, _) in &items {
                assert!(black_box(open_map.get(key)).is_ok());
            }
        });
    });
    group.bench_function("rust std get", |b| {
        b.iter(|| {
            for (key, _) in &items {
                black_box(rust_map.get(key.as_str()));
            }
        });
    });
    group.finish();
}

criterion_group!(benches, hash_map_benches);

criterion_main!(benches);
