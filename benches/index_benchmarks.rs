use std::collections::BTreeMap;

use avl_index::experiment::Experiment;
use avl_index::{AvlMap, Record};
use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};

const N: usize = 10_000;

// ─── Helper functions to generate key sequences ─────────────────────────────

fn ordered_keys(n: usize) -> Vec<i64> {
    (0..n as i64).collect()
}

fn random_keys(n: usize) -> Vec<i64> {
    // Simple LCG for a deterministic pseudo-random sequence
    let mut keys = Vec::with_capacity(n);
    let mut x: u64 = 12345;
    for _ in 0..n {
        x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
        keys.push((x >> 33) as i64);
    }
    keys
}

// ─── Insert ─────────────────────────────────────────────────────────────────

fn bench_insert(c: &mut Criterion) {
    for (name, keys) in [("ordered", ordered_keys(N)), ("random", random_keys(N))] {
        let mut group = c.benchmark_group(format!("insert_{name}"));

        group.bench_function(BenchmarkId::new("AvlMap", N), |b| {
            b.iter(|| {
                let mut map = AvlMap::with_capacity(keys.len());
                for &k in &keys {
                    map.insert(k, k);
                }
                map
            });
        });

        group.bench_function(BenchmarkId::new("BTreeMap", N), |b| {
            b.iter(|| {
                let mut map = BTreeMap::new();
                for &k in &keys {
                    map.entry(k).or_insert(k);
                }
                map
            });
        });

        group.finish();
    }
}

// ─── Lookup ─────────────────────────────────────────────────────────────────

fn bench_lookup(c: &mut Criterion) {
    for (name, keys) in [("ordered", ordered_keys(N)), ("random", random_keys(N))] {
        let avl: AvlMap<i64, i64> = keys.iter().map(|&k| (k, k)).collect();
        let btree: BTreeMap<i64, i64> = keys.iter().map(|&k| (k, k)).collect();

        let mut group = c.benchmark_group(format!("lookup_{name}"));

        group.bench_function(BenchmarkId::new("AvlMap", N), |b| {
            b.iter(|| {
                let mut sum = 0i64;
                for &k in &keys {
                    if let Some(&v) = avl.lookup(&k) {
                        sum = sum.wrapping_add(v);
                    }
                }
                sum
            });
        });

        group.bench_function(BenchmarkId::new("BTreeMap", N), |b| {
            b.iter(|| {
                let mut sum = 0i64;
                for &k in &keys {
                    if let Some(&v) = btree.get(&k) {
                        sum = sum.wrapping_add(v);
                    }
                }
                sum
            });
        });

        group.finish();
    }
}

// ─── Experiment ─────────────────────────────────────────────────────────────

fn bench_experiment(c: &mut Criterion) {
    let records: Vec<Record> = random_keys(N)
        .into_iter()
        .map(|k| Record::new(format!("term{k}"), "tag", 0.5))
        .collect();
    let queries: Vec<String> = records.iter().step_by(10).map(|r| r.term.clone()).collect();
    let experiment = Experiment::new(vec![5, 50, 500, 5_000], 1);

    c.bench_function("experiment_run", |b| {
        b.iter(|| experiment.run(&records, &queries));
    });
}

criterion_group!(benches, bench_insert, bench_lookup, bench_experiment);
criterion_main!(benches);
