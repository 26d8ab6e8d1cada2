//! Rubber-sheet a polygon through a jittered grid and report the displacement.
//!
//! Purpose
//! - Show the full call path: candidate rows in a `MemorySource`, name cache,
//!   `fineltra`, and the resulting geometry.
//! - Give a quick timing for a few thousand vertices on a 32×32 grid.

use std::collections::HashMap;
use std::time::Instant;

use fineltra::geometry::{Coord, Geometry, Shape};
use fineltra::mesh::rand::{grid_pairs, GridCfg, ReplayToken};
use fineltra::mesh::FineltraCfg;
use fineltra::source::{fineltra, MemoryRelation, MemorySource, RelationId};
use fineltra::Pt2;

fn main() {
    let cfg = GridCfg {
        nx: 32,
        ny: 32,
        jitter_frac: 0.3,
        offset: Pt2::new(2_600_000.0, 1_200_000.0),
        srid_src: 21781,
        srid_tgt: 2056,
        ..GridCfg::default()
    };
    let pairs = grid_pairs(cfg, ReplayToken { seed: 7, index: 0 });
    let relation = MemoryRelation::from_pairs(
        "public.chenyx06",
        "the_geom_lv03",
        "the_geom_lv95",
        &pairs,
        cfg.srid_src,
        cfg.srid_tgt,
    );
    let id = RelationId(1);
    let source = MemorySource::new().with_relation(id, relation);
    let mut cache: HashMap<RelationId, String> = HashMap::new();

    // A circle of 4096 vertices around the grid center.
    let n = 4096;
    let ring: Vec<Coord> = (0..=n)
        .map(|k| {
            let th = 2.0 * std::f64::consts::PI * (k % n) as f64 / n as f64;
            Coord::xy(50.0 + 40.0 * th.cos(), 50.0 + 40.0 * th.sin())
        })
        .collect();
    let input = Geometry::new(cfg.srid_src, Shape::Polygon(vec![ring]));

    let start = Instant::now();
    let out = fineltra(
        input.clone(),
        id,
        "the_geom_lv03",
        "the_geom_lv95",
        &source,
        &mut cache,
        FineltraCfg::default(),
    )
    .expect("circle lies inside the grid");
    let elapsed = start.elapsed().as_secs_f64() * 1e3;

    let (Shape::Polygon(a), Shape::Polygon(b)) = (&input.shape, &out.shape) else {
        unreachable!()
    };
    let max_shift = a[0]
        .iter()
        .zip(b[0].iter())
        .map(|(p, q)| (q.pt() - p.pt() - cfg.offset).norm())
        .fold(0.0, f64::max);
    println!(
        "srid {} -> {}, {} vertices in {:.3} ms, max residual shift {:.3}",
        input.srid,
        out.srid,
        out.shape.num_vertices(),
        elapsed,
        max_shift
    );
}
