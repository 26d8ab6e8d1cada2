//! Triangles, orientation predicates, and the coverage test.

use std::cmp::Ordering;

use crate::geometry::{Coord, Geometry, Shape};
use crate::{FineltraError, FineltraResult, Pt2, Srid};

/// Sign of the turn a→b→c.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Orientation {
    CounterClockwise,
    Clockwise,
    Collinear,
}

/// Orientation of c relative to the directed line a→b, from the sign of
/// `(b − a) × (c − a)`. Exact zero only; no tolerance.
#[inline]
pub fn orient(a: Pt2, b: Pt2, c: Pt2) -> Orientation {
    let ab = b - a;
    let ac = c - a;
    let cross = ab.x * ac.y - ab.y * ac.x;
    if cross > 0.0 {
        Orientation::CounterClockwise
    } else if cross < 0.0 {
        Orientation::Clockwise
    } else {
        Orientation::Collinear
    }
}

/// `0.5 · ((c.x − a.x)(b.y − a.y) − (b.x − a.x)(c.y − a.y))`.
///
/// Negative for counterclockwise a→b→c.
#[inline]
pub fn signed_area(a: Pt2, b: Pt2, c: Pt2) -> f64 {
    0.5 * ((c.x - a.x) * (b.y - a.y) - (b.x - a.x) * (c.y - a.y))
}

/// Ordered vertex triple. The order fixes the winding used by `covers` and
/// the positional correspondence with a paired triangle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Triangle {
    pub t1: Pt2,
    pub t2: Pt2,
    pub t3: Pt2,
}

impl Triangle {
    #[inline]
    pub fn new(t1: Pt2, t2: Pt2, t3: Pt2) -> Self {
        Self { t1, t2, t3 }
    }

    #[inline]
    pub fn vertices(&self) -> [Pt2; 3] {
        [self.t1, self.t2, self.t3]
    }

    #[inline]
    pub fn winding(&self) -> Orientation {
        orient(self.t1, self.t2, self.t3)
    }

    #[inline]
    pub fn is_degenerate(&self) -> bool {
        self.winding() == Orientation::Collinear
    }

    #[inline]
    pub fn area(&self) -> f64 {
        signed_area(self.t1, self.t2, self.t3).abs()
    }

    /// Boundary-inclusive point-in-triangle test.
    ///
    /// Edges are visited as t1→t2, t2→t3, t3→t1. The first edge whose line
    /// holds `p` accepts it, including points on that line beyond the edge's
    /// endpoints; an edge with `p` on its outer side rejects it. A degenerate
    /// triangle covers only points on its supporting line.
    pub fn covers(&self, p: Pt2) -> bool {
        let tri_side = self.winding();
        for (a, b) in [(self.t1, self.t2), (self.t2, self.t3), (self.t3, self.t1)] {
            let side = orient(a, b, p);
            if side == Orientation::Collinear {
                return true;
            }
            if side != tri_side {
                return false;
            }
        }
        true
    }

    /// Build from a ring: three points, or four with the last closing on the first.
    pub fn from_ring(ring: &[Coord]) -> FineltraResult<Self> {
        let pts: Vec<Pt2> = ring.iter().map(Coord::pt).collect();
        match pts.as_slice() {
            [a, b, c] => Ok(Self::new(*a, *b, *c)),
            [a, b, c, d] if a == d => Ok(Self::new(*a, *b, *c)),
            [_, _, _, _] => Err(FineltraError::InvalidTriangleGeometry(
                "4-point ring is not closed".into(),
            )),
            short if short.len() < 3 => Err(FineltraError::InvalidTriangleGeometry(format!(
                "ring has {} points, need 3",
                short.len()
            ))),
            long => Err(FineltraError::InvalidTriangleGeometry(format!(
                "ring has {} points, not a triangle",
                long.len()
            ))),
        }
    }

    /// Build from a decoded triangle cell: a single-ring polygon or a
    /// triangle outline.
    pub fn from_geometry(g: &Geometry) -> FineltraResult<Self> {
        match &g.shape {
            Shape::Polygon(rings) if rings.len() == 1 => Self::from_ring(&rings[0]),
            Shape::Polygon(rings) => Err(FineltraError::InvalidTriangleGeometry(format!(
                "polygon has {} rings, need 1",
                rings.len()
            ))),
            Shape::Triangle(ring) => Self::from_ring(ring),
            other => Err(FineltraError::InvalidTriangleGeometry(format!(
                "geometry type code {} is not a polygon",
                other.type_code()
            ))),
        }
    }

    /// Closed single-ring polygon `t1, t2, t3, t1`.
    pub fn to_geometry(&self, srid: Srid) -> Geometry {
        let ring = [self.t1, self.t2, self.t3, self.t1]
            .iter()
            .map(|p| Coord::xy(p.x, p.y))
            .collect();
        Geometry::new(srid, Shape::Polygon(vec![ring]))
    }

    /// Total lexicographic order over (t1.x, t1.y, t2.x, …).
    pub(crate) fn total_cmp(&self, other: &Triangle) -> Ordering {
        let a = self.vertices();
        let b = other.vertices();
        a.iter()
            .zip(b.iter())
            .map(|(p, q)| p.x.total_cmp(&q.x).then(p.y.total_cmp(&q.y)))
            .find(|o| *o != Ordering::Equal)
            .unwrap_or(Ordering::Equal)
    }
}

/// Source triangle and its vertex-order-correspondent target triangle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TrianglePair {
    pub src: Triangle,
    pub tgt: Triangle,
}

impl TrianglePair {
    #[inline]
    pub fn new(src: Triangle, tgt: Triangle) -> Self {
        Self { src, tgt }
    }

    /// Same triangle on both sides.
    #[inline]
    pub fn identity(t: Triangle) -> Self {
        Self { src: t, tgt: t }
    }

    pub(crate) fn total_cmp(&self, other: &TrianglePair) -> Ordering {
        self.src
            .total_cmp(&other.src)
            .then_with(|| self.tgt.total_cmp(&other.tgt))
    }
}
