//! Criterion benches for the cover construction and a full simulated exploration.
//!
//! - cover: `init_cover` on `[1, 100]^d` boxes for d in 2..=6.
//! - explore: hosts x users against the simulated platform.

use capmap::prelude::*;
use capmap::sizing::Dimension;
use capmap::space::corners;
use criterion::{criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};

fn bench_cover(c: &mut Criterion) {
    let mut group = c.benchmark_group("cover");
    for d in 2..=6usize {
        let bounds: Vec<Bound> = (0..d).map(|_| Bound::new(1, 100)).collect();
        group.bench_function(BenchmarkId::new("init_cover", d), |b| {
            b.iter_batched(
                || {
                    let mut registry = PointRegistry::new();
                    let ids: Vec<VertexId> = corners(&bounds)
                        .into_iter()
                        .map(|c| registry.register(c))
                        .collect();
                    (registry, ids)
                },
                |(registry, ids)| init_cover(&registry, &ids),
                BatchSize::SmallInput,
            )
        });
    }
    group.finish();
}

fn bench_explore(c: &mut Criterion) {
    let mut group = c.benchmark_group("explore");
    group.sample_size(20);
    let bounds = SizingBounds::new(
        vec![Dimension::count("host", 1, 200), Dimension::count("users", 1, 60)],
        100_000,
    )
    .unwrap();
    let space = bounds.reduce(&["host", "users"]).unwrap();
    let range = WorkloadRange::new(1, bounds.max_workload()).unwrap();
    group.bench_function("hosts_users_sim", |b| {
        b.iter_batched(
            || SimulatedPlatform::new(90_000),
            |platform| {
                let mut ex = Explorer::new(
                    space.clone(),
                    platform,
                    MemorySink::default(),
                    range,
                    RefineCfg::default(),
                )
                .unwrap();
                ex.run().unwrap()
            },
            BatchSize::SmallInput,
        )
    });
    group.finish();
}

criterion_group!(benches, bench_cover, bench_explore);
criterion_main!(benches);
