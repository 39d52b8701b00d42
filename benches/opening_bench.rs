//! Opening-engine throughput benchmarks: boxes per second for fixed-quantity
//! runs and parallel speedup for completion batches.
//!
//! Run with: `cargo bench`

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use pandora::parallel::{run_batch, run_batch_parallel, WorkerPool};
use pandora::sim::driver::{open_amount, open_until, CompletionTarget};
use pandora::table::loader::{load_loot_table, DEFAULT_LOOT_TABLE_PATH};
use pandora::table::model::{LootTable, Tier};

fn reference_table() -> LootTable {
    load_loot_table(DEFAULT_LOOT_TABLE_PATH).expect("shipped loot table")
}

fn bench_opening(c: &mut Criterion) {
    let table = reference_table();

    let mut group = c.benchmark_group("opening");
    group.sample_size(60);

    let amount = 1_000u64;
    group.throughput(Throughput::Elements(amount));
    group.bench_function("open_amount_1000", |b| {
        let mut seed = 0u64;
        b.iter(|| {
            seed = seed.wrapping_add(1);
            open_amount(black_box(&table), amount, seed).expect("run")
        });
    });

    group.bench_function("open_until_tier1", |b| {
        let mut seed = 0u64;
        b.iter(|| {
            seed = seed.wrapping_add(1);
            open_until(black_box(&table), CompletionTarget::Tier(Tier::One), seed).expect("run")
        });
    });

    group.finish();
}

fn bench_batch(c: &mut Criterion) {
    let table = reference_table();
    let target = CompletionTarget::Tier(Tier::One);
    let iterations = 32usize;

    let mut group = c.benchmark_group("batch");
    group.sample_size(20);
    group.throughput(Throughput::Elements(iterations as u64));

    group.bench_function("sequential", |b| {
        b.iter(|| run_batch(black_box(&table), target, iterations, 7).expect("batch"));
    });

    let pool = WorkerPool::default();
    group.bench_function("parallel_all_cores", |b| {
        b.iter(|| {
            run_batch_parallel(black_box(&table), target, iterations, 7, &pool).expect("batch")
        });
    });

    group.finish();
}

criterion_group!(benches, bench_opening, bench_batch);
criterion_main!(benches);
