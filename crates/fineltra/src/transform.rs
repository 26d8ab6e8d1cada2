//! Geometry traversal: apply a triangle set to every vertex of a geometry.
//!
//! Structural recursion over `Shape`: leaf kinds move their vertex list,
//! polygons move each ring in order, collections recurse into each child in
//! order. The tree shape (ring, child, vertex counts) never changes.

use tracing::debug;

use crate::geometry::{Coord, Geometry, Shape};
use crate::mesh::{barycentric, TriangleSet};
use crate::{FineltraError, FineltraResult};

/// Move every vertex of `geom` through `set`, in place.
///
/// - Empty geometries are left untouched (srid included).
/// - `geom.srid` must equal `set.srid_src()`; checked before any vertex moves.
/// - On success the srid becomes `set.srid_tgt()`.
/// - On failure vertices already moved stay moved.
pub fn transform_geometry(geom: &mut Geometry, set: &TriangleSet) -> FineltraResult<()> {
    if geom.is_empty() {
        debug!(srid = geom.srid, "empty geometry, nothing to transform");
        return Ok(());
    }
    if geom.srid != set.srid_src() {
        return Err(FineltraError::ReferenceMismatch {
            expected: set.srid_src(),
            found: geom.srid,
        });
    }
    transform_shape(&mut geom.shape, set)?;
    debug!(
        from = geom.srid,
        to = set.srid_tgt(),
        vertices = geom.shape.num_vertices(),
        "geometry transformed"
    );
    geom.srid = set.srid_tgt();
    Ok(())
}

/// Like `transform_geometry`, but works on a copy: the input is never
/// modified and a result exists only if every vertex moved.
pub fn transformed(geom: &Geometry, set: &TriangleSet) -> FineltraResult<Geometry> {
    let mut out = geom.clone();
    transform_geometry(&mut out, set)?;
    Ok(out)
}

fn transform_shape(shape: &mut Shape, set: &TriangleSet) -> FineltraResult<()> {
    match shape {
        Shape::Point(c) => c.iter_mut().try_for_each(|c| transform_coord(c, set)),
        Shape::LineString(v) | Shape::CircularString(v) | Shape::Triangle(v) => {
            transform_coords(v, set)
        }
        Shape::Polygon(rings) => rings.iter_mut().try_for_each(|r| transform_coords(r, set)),
        Shape::Unknown(code) => Err(FineltraError::UnsupportedGeometryType(*code)),
        other => {
            let code = other.type_code();
            other
                .children_mut()
                .ok_or(FineltraError::UnsupportedGeometryType(code))?
                .iter_mut()
                .try_for_each(|child| transform_shape(child, set))
        }
    }
}

fn transform_coords(coords: &mut [Coord], set: &TriangleSet) -> FineltraResult<()> {
    coords.iter_mut().try_for_each(|c| transform_coord(c, set))
}

fn transform_coord(c: &mut Coord, set: &TriangleSet) -> FineltraResult<()> {
    let p = c.pt();
    let pair = set
        .locate(p)?
        .ok_or(FineltraError::VertexOutsideCoverage { x: p.x, y: p.y })?;
    c.set_pt(barycentric::transform(p, pair)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::{FineltraCfg, Triangle, TrianglePair};
    use nalgebra::vector;

    const SRC: i32 = 2056;
    const TGT: i32 = 21781;

    /// Square [0,10]² split along the diagonal, shifted by (100, 200).
    fn shifted_square() -> TriangleSet {
        let d = vector![100.0, 200.0];
        let shift = |t: Triangle| Triangle::new(t.t1 + d, t.t2 + d, t.t3 + d);
        let lower = Triangle::new(vector![0.0, 0.0], vector![10.0, 0.0], vector![10.0, 10.0]);
        let upper = Triangle::new(vector![0.0, 0.0], vector![10.0, 10.0], vector![0.0, 10.0]);
        TriangleSet::from_pairs(
            vec![
                TrianglePair::new(lower, shift(lower)),
                TrianglePair::new(upper, shift(upper)),
            ],
            SRC,
            TGT,
            FineltraCfg::default(),
        )
    }

    fn ring(pts: &[(f64, f64)]) -> Vec<Coord> {
        pts.iter().map(|&p| Coord::from(p)).collect()
    }

    #[test]
    fn point_moves_and_srid_updates() {
        let mut g = Geometry::new(SRC, Shape::Point(Some(Coord::xyz(2.0, 3.0, 42.0))));
        transform_geometry(&mut g, &shifted_square()).unwrap();
        assert_eq!(g.srid, TGT);
        let Shape::Point(Some(c)) = g.shape else {
            panic!("expected point");
        };
        assert!((c.x - 102.0).abs() < 1e-9 && (c.y - 203.0).abs() < 1e-9);
        assert_eq!(c.z, Some(42.0));
    }

    #[test]
    fn polygon_with_hole_keeps_structure() {
        let shell = ring(&[(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0), (0.0, 0.0)]);
        let hole = ring(&[(2.0, 2.0), (4.0, 2.0), (4.0, 4.0), (2.0, 2.0)]);
        let mut g = Geometry::new(SRC, Shape::Polygon(vec![shell, hole]));
        transform_geometry(&mut g, &shifted_square()).unwrap();
        let Shape::Polygon(rings) = &g.shape else {
            panic!("expected polygon");
        };
        assert_eq!(rings.len(), 2);
        assert_eq!((rings[0].len(), rings[1].len()), (5, 4));
        assert!((rings[1][1].x - 104.0).abs() < 1e-9);
        assert!((rings[1][1].y - 202.0).abs() < 1e-9);
    }

    #[test]
    fn nested_collections_recurse() {
        let line = Shape::LineString(ring(&[(1.0, 1.0), (9.0, 9.0)]));
        let inner = Shape::MultiPoint(vec![
            Shape::Point(Some(Coord::xy(5.0, 5.0))),
            Shape::Point(None),
        ]);
        let mut g = Geometry::new(SRC, Shape::GeometryCollection(vec![line, inner]));
        transform_geometry(&mut g, &shifted_square()).unwrap();
        let mut xs = Vec::new();
        g.shape.for_each_coord(&mut |c| xs.push(c.x));
        assert_eq!(xs.len(), 3);
        assert!(xs.iter().all(|x| *x > 100.0));
    }

    #[test]
    fn failing_second_ring_fails_the_call() {
        let shell = ring(&[(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 0.0)]);
        let hole = ring(&[(2.0, 1.0), (4.0, 1.0), (50.0, 3.0), (2.0, 1.0)]);
        let mut g = Geometry::new(SRC, Shape::Polygon(vec![shell, hole]));
        let err = transform_geometry(&mut g, &shifted_square()).unwrap_err();
        assert_eq!(err, FineltraError::VertexOutsideCoverage { x: 50.0, y: 3.0 });
        assert_eq!(g.srid, SRC);
    }

    #[test]
    fn transformed_leaves_input_alone_on_failure() {
        let g = Geometry::new(
            SRC,
            Shape::LineString(ring(&[(1.0, 1.0), (20.0, 25.0)])),
        );
        let before = g.clone();
        assert!(transformed(&g, &shifted_square()).is_err());
        assert_eq!(g, before);
    }

    #[test]
    fn empty_geometry_is_a_noop() {
        let mut g = Geometry::new(999, Shape::MultiPolygon(vec![Shape::Polygon(vec![])]));
        let before = g.clone();
        transform_geometry(&mut g, &shifted_square()).unwrap();
        assert_eq!(g, before);
    }

    #[test]
    fn srid_mismatch_checked_before_mutation() {
        let mut g = Geometry::new(4326, Shape::Point(Some(Coord::xy(1.0, 1.0))));
        let before = g.clone();
        let err = transform_geometry(&mut g, &shifted_square()).unwrap_err();
        assert_eq!(
            err,
            FineltraError::ReferenceMismatch {
                expected: SRC,
                found: 4326
            }
        );
        assert_eq!(g, before);
    }

    #[test]
    fn unknown_kind_is_unsupported() {
        let mut g = Geometry::new(SRC, Shape::GeometryCollection(vec![Shape::Unknown(99)]));
        assert_eq!(
            transform_geometry(&mut g, &shifted_square()),
            Err(FineltraError::UnsupportedGeometryType(99))
        );
    }
}
