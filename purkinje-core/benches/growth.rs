//! Full growth runs with the grid index against the brute-force scan.

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use purkinje_core::{BruteForceIndex, FractalTree, GridIndex, GrowthParams, Point3};

fn params(generations: u32) -> GrowthParams {
    GrowthParams {
        generations,
        target_length: 0.3,
        segment_length: 0.01,
        branch_angle: 0.15,
        repulsion_weight: 0.1,
        init_node: Point3::ZERO,
        second_node: Point3::Z,
        ..GrowthParams::default()
    }
}

fn bench_growth(c: &mut Criterion) {
    let mut group = c.benchmark_group("growth");
    group.sample_size(10);

    for generations in [4u32, 6, 8] {
        let tree = FractalTree::new(params(generations)).expect("valid parameters");

        group.bench_with_input(BenchmarkId::new("grid", generations), &tree, |b, tree| {
            b.iter(|| black_box(tree.grow_with::<GridIndex>().expect("growth")))
        });
        group.bench_with_input(BenchmarkId::new("sized_grid", generations), &tree, |b, tree| {
            b.iter(|| black_box(tree.grow().expect("growth")))
        });
        // Quadratic; keep it to the smaller trees.
        if generations <= 6 {
            group.bench_with_input(BenchmarkId::new("brute_force", generations), &tree, |b, tree| {
                b.iter(|| black_box(tree.grow_with::<BruteForceIndex>().expect("growth")))
            });
        }
    }

    group.finish();
}

criterion_group!(benches, bench_growth);
criterion_main!(benches);
