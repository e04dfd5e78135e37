//! Assignment and gating benchmarks for tagsmith

use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::hint::black_box;
use tagsmith::{AbConfig, BoundaryTable, BucketAssigner, MemoryStore, Tagsmith};

fn lookup_benchmark(c: &mut Criterion) {
    let table = BoundaryTable::new(&AbConfig::default());

    let mut group = c.benchmark_group("boundary_lookup");
    group.throughput(Throughput::Elements(1));

    group.bench_function("first_slot", |b| {
        b.iter(|| black_box(table.lookup(black_box(0.01))));
    });

    group.bench_function("last_slot", |b| {
        b.iter(|| black_box(table.lookup(black_box(0.99))));
    });

    group.finish();
}

fn resolve_benchmark(c: &mut Criterion) {
    let assigner = BucketAssigner::new(BoundaryTable::new(&AbConfig::default()));
    let mut rng = StdRng::seed_from_u64(42);

    let mut group = c.benchmark_group("resolve");

    group.bench_function("stored_factor", |b| {
        let mut store = MemoryStore::with_factor(0.5);
        b.iter(|| black_box(assigner.resolve(&mut store, &mut rng)));
    });

    group.bench_function("fresh_visitor", |b| {
        b.iter(|| {
            let mut store = MemoryStore::new();
            black_box(assigner.resolve(&mut store, &mut rng))
        });
    });

    group.finish();
}

fn page_load_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("page_load");

    group.bench_function("build_and_gate_ten_widgets", |b| {
        b.iter(|| {
            let engine = Tagsmith::builder()
                .store(Box::new(MemoryStore::with_factor(0.07)))
                .build();
            for i in 1..=10 {
                black_box(engine.enable("widget", &format!("test{}_exp1", i)));
            }
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    lookup_benchmark,
    resolve_benchmark,
    page_load_benchmark
);
criterion_main!(benches);
