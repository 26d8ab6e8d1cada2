//! Criterion benchmarks for point location and geometry traversal.
//! Mesh sizes: n×n grids with n in {4, 16, 64} (2n² triangles).
//! Results: by default under target/criterion; to store under data/bench, run:
//!   CARGO_TARGET_DIR=data/bench cargo bench -p fineltra

use criterion::{criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};
use fineltra::geometry::{Coord, Geometry, Shape};
use fineltra::mesh::rand::{grid_mesh, points_in, GridCfg, ReplayToken};
use fineltra::mesh::FineltraCfg;
use fineltra::transform::transform_geometry;

fn bench_transform(c: &mut Criterion) {
    let mut group = c.benchmark_group("fineltra");
    for &n in &[4usize, 16, 64] {
        let cfg = GridCfg {
            nx: n,
            ny: n,
            ..GridCfg::default()
        };
        let set = grid_mesh(cfg, ReplayToken { seed: 43, index: 0 }, FineltraCfg::default());
        let pts = points_in(cfg.bounds, 1000, ReplayToken { seed: 43, index: 1 });

        group.bench_with_input(BenchmarkId::new("locate_1000", n), &n, |b, _| {
            b.iter(|| pts.iter().filter(|p| matches!(set.locate(**p), Ok(Some(_)))).count())
        });

        let line = Geometry::new(
            0,
            Shape::LineString(pts.iter().map(|p| Coord::xy(p.x, p.y)).collect()),
        );
        group.bench_with_input(BenchmarkId::new("transform_line_1000", n), &n, |b, _| {
            b.iter_batched(
                || line.clone(),
                |mut g| {
                    transform_geometry(&mut g, &set).unwrap();
                    g
                },
                BatchSize::SmallInput,
            )
        });
    }
    group.finish();
}

criterion_group!(benches, bench_transform);
criterion_main!(benches);
