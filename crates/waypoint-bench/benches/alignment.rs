use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;
use waypoint_bench::fixtures::anchor_grid;
use waypoint_geometry::kurbo::{Rect, Size};
use waypoint_geometry::{Alignment, AlignmentEngine, PreferredSide};

const CONTAINER: Rect = Rect::new(0.0, 0.0, 1280.0, 800.0);

fn bench_compute_alignment_grid(c: &mut Criterion) {
    let engine = AlignmentEngine::default();
    let anchors = anchor_grid(CONTAINER, 20, 12, Size::new(40.0, 24.0));
    let callout = Size::new(280.0, 140.0);

    c.bench_function("compute_alignment_240_anchors", |b| {
        b.iter(|| {
            for anchor in &anchors {
                let alignment = engine.compute_alignment(
                    black_box(*anchor),
                    CONTAINER,
                    callout,
                    Some(Alignment::InnerLeft),
                    PreferredSide::Bottom,
                );
                black_box(alignment);
            }
        })
    });
}

fn bench_layout_with_outline(c: &mut Criterion) {
    let engine = AlignmentEngine::default();
    let anchors = anchor_grid(CONTAINER, 20, 12, Size::new(40.0, 24.0));
    let callout = Size::new(280.0, 140.0);

    c.bench_function("layout_with_outline_240_anchors", |b| {
        b.iter(|| {
            for anchor in &anchors {
                let placement =
                    engine.layout(black_box(*anchor), CONTAINER, callout, None, PreferredSide::Right);
                black_box(placement);
            }
        })
    });
}

criterion_group!(benches, bench_compute_alignment_grid, bench_layout_with_outline);
criterion_main!(benches);
