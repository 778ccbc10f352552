use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;
use waypoint_bench::fixtures::synthetic_steps;
use waypoint_core::TourKey;
use waypoint_geometry::Metrics;
use waypoint_tour::build_chain;

fn bench_build_chain_500_steps(c: &mut Criterion) {
    let steps = synthetic_steps(500);
    let metrics = Metrics::default();

    c.bench_function("build_chain_500_steps", |b| {
        b.iter(|| {
            let chain = build_chain(TourKey::new("bench"), black_box(&steps), &metrics)
                .expect("synthetic steps are valid");
            black_box(chain.total_length());
        })
    });
}

criterion_group!(benches, bench_build_chain_500_steps);
criterion_main!(benches);
