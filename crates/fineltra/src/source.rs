//! Triangle supply and the transform entry point.
//!
//! The core never talks to storage. A `TriangleSource` resolves an opaque
//! relation identifier to a name and runs the bounding-box pre-filter over
//! that relation; a `NameCache` remembers resolved names across calls.
//! `fineltra` wires both to the triangle set and the traversal.

use std::cell::Cell;
use std::collections::HashMap;
use std::fmt;

use tracing::debug;

use crate::geometry::{Bbox, Geometry};
use crate::mesh::{FineltraCfg, TrianglePair, TriangleSet};
use crate::transform::transform_geometry;
use crate::{FineltraError, FineltraResult, Srid};

/// Opaque identifier of a triangle-correspondence relation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RelationId(pub u32);

impl fmt::Display for RelationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One decoded candidate row. `tgt` is `None` when the target cell is null.
#[derive(Clone, Debug, PartialEq)]
pub struct CandidatePair {
    pub src: Geometry,
    pub tgt: Option<Geometry>,
}

/// Supplier of candidate triangle pairs.
pub trait TriangleSource {
    /// Qualified name of the relation behind `id`.
    fn relation_name(&self, id: RelationId) -> FineltraResult<String>;

    /// Rows of `relation` whose source triangle's bbox intersects `bbox`.
    ///
    /// Rows with a null source cell never match; a null target cell comes
    /// back as `tgt: None`.
    fn fetch(
        &self,
        relation: &str,
        src_col: &str,
        tgt_col: &str,
        bbox: &Bbox,
    ) -> FineltraResult<Vec<CandidatePair>>;
}

/// Cross-call cache of relation names. Only a shortcut: a miss falls back
/// to `TriangleSource::relation_name`.
pub trait NameCache {
    fn get(&self, id: RelationId) -> Option<String>;
    fn put(&mut self, id: RelationId, name: String);
}

impl NameCache for HashMap<RelationId, String> {
    fn get(&self, id: RelationId) -> Option<String> {
        HashMap::get(self, &id).cloned()
    }

    fn put(&mut self, id: RelationId, name: String) {
        self.insert(id, name);
    }
}

/// Cache that never remembers.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoCache;

impl NameCache for NoCache {
    fn get(&self, _id: RelationId) -> Option<String> {
        None
    }

    fn put(&mut self, _id: RelationId, _name: String) {}
}

/// Table of nullable geometry cells with named columns.
#[derive(Clone, Debug, Default)]
pub struct MemoryRelation {
    pub name: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Option<Geometry>>>,
}

impl MemoryRelation {
    /// Two-column relation holding `pairs` as closed triangle polygons.
    pub fn from_pairs(
        name: &str,
        src_col: &str,
        tgt_col: &str,
        pairs: &[TrianglePair],
        srid_src: Srid,
        srid_tgt: Srid,
    ) -> Self {
        let rows = pairs
            .iter()
            .map(|p| {
                vec![
                    Some(p.src.to_geometry(srid_src)),
                    Some(p.tgt.to_geometry(srid_tgt)),
                ]
            })
            .collect();
        Self {
            name: name.to_string(),
            columns: vec![src_col.to_string(), tgt_col.to_string()],
            rows,
        }
    }

    fn column(&self, column: &str) -> FineltraResult<usize> {
        self.columns
            .iter()
            .position(|c| c == column)
            .ok_or_else(|| FineltraError::UnknownColumn {
                relation: self.name.clone(),
                column: column.to_string(),
            })
    }
}

/// In-memory `TriangleSource` with a linear bbox scan.
#[derive(Debug, Default)]
pub struct MemorySource {
    relations: HashMap<RelationId, MemoryRelation>,
    resolutions: Cell<usize>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_relation(mut self, id: RelationId, relation: MemoryRelation) -> Self {
        self.relations.insert(id, relation);
        self
    }

    /// Number of `relation_name` calls served so far.
    pub fn resolutions(&self) -> usize {
        self.resolutions.get()
    }
}

impl TriangleSource for MemorySource {
    fn relation_name(&self, id: RelationId) -> FineltraResult<String> {
        self.resolutions.set(self.resolutions.get() + 1);
        self.relations
            .get(&id)
            .map(|r| r.name.clone())
            .ok_or(FineltraError::UnknownRelation(id))
    }

    fn fetch(
        &self,
        relation: &str,
        src_col: &str,
        tgt_col: &str,
        bbox: &Bbox,
    ) -> FineltraResult<Vec<CandidatePair>> {
        let rel = self
            .relations
            .values()
            .find(|r| r.name == relation)
            .ok_or_else(|| FineltraError::Source(format!("no relation named {relation:?}")))?;
        let si = rel.column(src_col)?;
        let ti = rel.column(tgt_col)?;
        let mut out = Vec::new();
        for row in &rel.rows {
            let Some(src) = row.get(si).and_then(Option::as_ref) else {
                continue;
            };
            if !src.bbox().is_some_and(|b| b.intersects(bbox)) {
                continue;
            }
            out.push(CandidatePair {
                src: src.clone(),
                tgt: row.get(ti).cloned().flatten(),
            });
        }
        Ok(out)
    }
}

/// Transform `geom` through the triangle relation `relation`.
///
/// Steps: empty input comes back unchanged; otherwise resolve the relation
/// name (cache first), fetch candidates overlapping the input bbox, build the
/// triangle set, and move every vertex. Any failure aborts the call.
pub fn fineltra<S, C>(
    mut geom: Geometry,
    relation: RelationId,
    src_col: &str,
    tgt_col: &str,
    source: &S,
    cache: &mut C,
    cfg: FineltraCfg,
) -> FineltraResult<Geometry>
where
    S: TriangleSource + ?Sized,
    C: NameCache + ?Sized,
{
    if geom.is_empty() {
        debug!(srid = geom.srid, "empty input returned unchanged");
        return Ok(geom);
    }
    let bbox = geom
        .bbox()
        .ok_or(FineltraError::UnsupportedGeometryType(geom.shape.type_code()))?;
    let name = match cache.get(relation) {
        Some(name) => name,
        None => {
            let name = source.relation_name(relation)?;
            cache.put(relation, name.clone());
            name
        }
    };
    let candidates = source.fetch(&name, src_col, tgt_col, &bbox)?;
    debug!(
        relation = %name,
        src_col,
        tgt_col,
        candidates = candidates.len(),
        "fetched candidate triangles"
    );
    let set = TriangleSet::from_candidates(candidates, cfg)?;
    transform_geometry(&mut geom, &set)?;
    Ok(geom)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Coord, Shape};
    use crate::mesh::Triangle;
    use nalgebra::vector;

    const REL: RelationId = RelationId(7);

    fn source() -> MemorySource {
        // Two cells: [0,10]x[0,10] translated by (+1, 0); [20,30]x[0,10] by (0, +1).
        let t = |a: (f64, f64), b: (f64, f64), c: (f64, f64)| {
            Triangle::new(vector![a.0, a.1], vector![b.0, b.1], vector![c.0, c.1])
        };
        let shift = |tr: Triangle, dx: f64, dy: f64| {
            let d = vector![dx, dy];
            Triangle::new(tr.t1 + d, tr.t2 + d, tr.t3 + d)
        };
        let a = t((0.0, 0.0), (10.0, 0.0), (0.0, 10.0));
        let b = t((20.0, 0.0), (30.0, 0.0), (20.0, 10.0));
        let pairs = [
            TrianglePair::new(a, shift(a, 1.0, 0.0)),
            TrianglePair::new(b, shift(b, 0.0, 1.0)),
        ];
        MemorySource::new().with_relation(
            REL,
            MemoryRelation::from_pairs("mesh.lv95", "src", "tgt", &pairs, 2056, 21781),
        )
    }

    fn point(x: f64, y: f64) -> Geometry {
        Geometry::new(2056, Shape::Point(Some(Coord::xy(x, y))))
    }

    #[test]
    fn prefilter_keeps_overlapping_rows_only() {
        let src = source();
        let bb = Bbox::from_point(vector![1.0, 1.0]);
        let hits = src.fetch("mesh.lv95", "src", "tgt", &bb).unwrap();
        assert_eq!(hits.len(), 1);
        let far = Bbox::from_point(vector![100.0, 100.0]);
        assert!(src.fetch("mesh.lv95", "src", "tgt", &far).unwrap().is_empty());
    }

    #[test]
    fn fetch_reports_unknown_column() {
        let err = source()
            .fetch("mesh.lv95", "src", "nope", &Bbox::from_point(vector![1.0, 1.0]))
            .unwrap_err();
        assert!(matches!(err, FineltraError::UnknownColumn { column, .. } if column == "nope"));
    }

    #[test]
    fn end_to_end_point() {
        let src = source();
        let out = fineltra(
            point(2.0, 2.0),
            REL,
            "src",
            "tgt",
            &src,
            &mut NoCache,
            FineltraCfg::default(),
        )
        .unwrap();
        assert_eq!(out.srid, 21781);
        let Shape::Point(Some(c)) = out.shape else {
            panic!("expected point");
        };
        assert!((c.x - 3.0).abs() < 1e-9 && (c.y - 2.0).abs() < 1e-9);
    }

    #[test]
    fn cache_skips_resolution() {
        let src = source();
        let mut cache: HashMap<RelationId, String> = HashMap::new();
        for _ in 0..3 {
            fineltra(
                point(21.0, 1.0),
                REL,
                "src",
                "tgt",
                &src,
                &mut cache,
                FineltraCfg::default(),
            )
            .unwrap();
        }
        assert_eq!(src.resolutions(), 1);
        assert_eq!(NameCache::get(&cache, REL).as_deref(), Some("mesh.lv95"));
    }

    #[test]
    fn empty_input_skips_the_source() {
        let src = source();
        let empty = Geometry::new(4326, Shape::LineString(vec![]));
        let out = fineltra(
            empty.clone(),
            RelationId(999),
            "src",
            "tgt",
            &src,
            &mut NoCache,
            FineltraCfg::default(),
        )
        .unwrap();
        assert_eq!(out, empty);
        assert_eq!(src.resolutions(), 0);
    }

    #[test]
    fn no_overlap_means_no_candidates() {
        let err = fineltra(
            point(100.0, 100.0),
            REL,
            "src",
            "tgt",
            &source(),
            &mut NoCache,
            FineltraCfg::default(),
        )
        .unwrap_err();
        assert_eq!(err, FineltraError::NoCandidateTriangles);
    }

    #[test]
    fn unknown_relation() {
        let err = fineltra(
            point(1.0, 1.0),
            RelationId(1),
            "src",
            "tgt",
            &source(),
            &mut NoCache,
            FineltraCfg::default(),
        )
        .unwrap_err();
        assert_eq!(err, FineltraError::UnknownRelation(RelationId(1)));
    }

    #[test]
    fn null_target_cell() {
        let mut rel = MemoryRelation::from_pairs(
            "mesh.broken",
            "src",
            "tgt",
            &[TrianglePair::identity(Triangle::new(
                vector![0.0, 0.0],
                vector![10.0, 0.0],
                vector![0.0, 10.0],
            ))],
            2056,
            2056,
        );
        rel.rows[0][1] = None;
        let src = MemorySource::new().with_relation(REL, rel);
        let err = fineltra(
            point(1.0, 1.0),
            REL,
            "src",
            "tgt",
            &src,
            &mut NoCache,
            FineltraCfg::default(),
        )
        .unwrap_err();
        assert_eq!(err, FineltraError::NullCorrespondence { index: 0 });
    }

    #[test]
    fn null_target_neighbour_does_not_block() {
        let good = Triangle::new(vector![0.0, 0.0], vector![10.0, 0.0], vector![0.0, 10.0]);
        let other = Triangle::new(vector![10.0, 0.0], vector![10.0, 10.0], vector![0.0, 10.0]);
        let mut rel = MemoryRelation::from_pairs(
            "mesh.partial",
            "src",
            "tgt",
            &[TrianglePair::identity(good), TrianglePair::identity(other)],
            2056,
            2056,
        );
        rel.rows[1][1] = None;
        let src = MemorySource::new().with_relation(REL, rel);
        let line = Geometry::new(
            2056,
            Shape::LineString(vec![Coord::xy(1.0, 1.0), Coord::xy(2.0, 3.0)]),
        );
        let out = fineltra(
            line,
            REL,
            "src",
            "tgt",
            &src,
            &mut NoCache,
            FineltraCfg::default(),
        )
        .unwrap();
        assert_eq!(out.shape.num_vertices(), 2);

        let err = fineltra(
            point(8.0, 8.0),
            REL,
            "src",
            "tgt",
            &src,
            &mut NoCache,
            FineltraCfg::default(),
        )
        .unwrap_err();
        assert_eq!(err, FineltraError::NullCorrespondence { index: 1 });
    }

    #[test]
    fn srid_mismatch_surfaces() {
        let mut g = point(1.0, 1.0);
        g.srid = 4326;
        let err = fineltra(
            g,
            REL,
            "src",
            "tgt",
            &source(),
            &mut NoCache,
            FineltraCfg::default(),
        )
        .unwrap_err();
        assert_eq!(
            err,
            FineltraError::ReferenceMismatch {
                expected: 2056,
                found: 4326
            }
        );
    }
}
