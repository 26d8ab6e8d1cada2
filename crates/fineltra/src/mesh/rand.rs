//! Random rubber-sheet meshes (jittered grids + replay tokens).
//!
//! Model
//! - A regular `nx × ny` grid over `bounds`; each cell splits into two
//!   triangles along its rising diagonal.
//! - Target nodes are source nodes plus a global `offset` and a bounded
//!   random displacement. Displacements live on nodes, so adjacent target
//!   triangles agree on shared edges and the sheet stays continuous.
//! - Determinism uses a replay token `(seed, index)` mixed into a single RNG.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use super::{FineltraCfg, Triangle, TrianglePair, TriangleSet};
use crate::geometry::Bbox;
use crate::{Pt2, Srid};

/// Replay token to make draws reproducible and indexable.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReplayToken {
    pub seed: u64,
    pub index: u64,
}

impl ReplayToken {
    #[inline]
    fn to_std_rng(self) -> StdRng {
        fn mix(mut x: u64) -> u64 {
            x ^= x >> 30;
            x = x.wrapping_mul(0xbf58476d1ce4e5b9);
            x ^= x >> 27;
            x = x.wrapping_mul(0x94d049bb133111eb);
            x ^ (x >> 31)
        }
        let k = mix(self.seed ^ mix(self.index.wrapping_add(0x9e3779b97f4a7c15)));
        StdRng::seed_from_u64(k)
    }
}

/// Jittered grid configuration.
#[derive(Clone, Copy, Debug)]
pub struct GridCfg {
    pub bounds: Bbox,
    pub nx: usize,
    pub ny: usize,
    /// Node displacement as a fraction of the cell size. Clamped to [0, 0.49].
    pub jitter_frac: f64,
    /// Translation applied to every target node.
    pub offset: Pt2,
    /// Shuffle the pairs to mimic an unordered candidate query.
    pub shuffle: bool,
    pub srid_src: Srid,
    pub srid_tgt: Srid,
}

impl Default for GridCfg {
    fn default() -> Self {
        Self {
            bounds: Bbox {
                min: Pt2::new(0.0, 0.0),
                max: Pt2::new(100.0, 100.0),
            },
            nx: 10,
            ny: 10,
            jitter_frac: 0.2,
            offset: Pt2::zeros(),
            shuffle: true,
            srid_src: 0,
            srid_tgt: 0,
        }
    }
}

/// Triangle pairs of a jittered grid, two per cell.
pub fn grid_pairs(cfg: GridCfg, tok: ReplayToken) -> Vec<TrianglePair> {
    let mut rng = tok.to_std_rng();
    let nx = cfg.nx.max(1);
    let ny = cfg.ny.max(1);
    let dx = cfg.bounds.width() / nx as f64;
    let dy = cfg.bounds.height() / ny as f64;
    let jf = cfg.jitter_frac.clamp(0.0, 0.49);

    let node = |i: usize, j: usize| {
        Pt2::new(
            cfg.bounds.min.x + i as f64 * dx,
            cfg.bounds.min.y + j as f64 * dy,
        )
    };
    let mut displaced: Vec<Pt2> = Vec::with_capacity((nx + 1) * (ny + 1));
    for j in 0..=ny {
        for i in 0..=nx {
            let jitter = Pt2::new(
                (rng.gen::<f64>() * 2.0 - 1.0) * jf * dx,
                (rng.gen::<f64>() * 2.0 - 1.0) * jf * dy,
            );
            displaced.push(node(i, j) + cfg.offset + jitter);
        }
    }
    let tgt = |i: usize, j: usize| displaced[j * (nx + 1) + i];

    let mut pairs = Vec::with_capacity(2 * nx * ny);
    for j in 0..ny {
        for i in 0..nx {
            let corners = [(i, j), (i + 1, j), (i + 1, j + 1), (i, j + 1)];
            for [a, b, c] in [[0, 1, 2], [0, 2, 3]] {
                let (ia, ib, ic) = (corners[a], corners[b], corners[c]);
                pairs.push(TrianglePair::new(
                    Triangle::new(node(ia.0, ia.1), node(ib.0, ib.1), node(ic.0, ic.1)),
                    Triangle::new(tgt(ia.0, ia.1), tgt(ib.0, ib.1), tgt(ic.0, ic.1)),
                ));
            }
        }
    }
    if cfg.shuffle {
        pairs.shuffle(&mut rng);
    }
    pairs
}

/// Jittered grid as a `TriangleSet`.
pub fn grid_mesh(cfg: GridCfg, tok: ReplayToken, set_cfg: FineltraCfg) -> TriangleSet {
    TriangleSet::from_pairs(grid_pairs(cfg, tok), cfg.srid_src, cfg.srid_tgt, set_cfg)
}

/// `n` uniform points inside `bounds`.
pub fn points_in(bounds: Bbox, n: usize, tok: ReplayToken) -> Vec<Pt2> {
    let mut rng = tok.to_std_rng();
    (0..n)
        .map(|_| {
            Pt2::new(
                bounds.min.x + rng.gen::<f64>() * bounds.width(),
                bounds.min.y + rng.gen::<f64>() * bounds.height(),
            )
        })
        .collect()
}
