//! Triangle sets: the per-call correspondence mesh and its point locator.

use std::cmp::Ordering;

use tracing::{debug, trace};

use super::triangle::{Triangle, TrianglePair};
use crate::source::CandidatePair;
use crate::{FineltraError, FineltraResult, Pt2, Srid};

/// Scan order of the candidates in a `TriangleSet`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CandidateOrder {
    /// Sort by source then target vertex coordinates, so a point on a shared
    /// edge (or in overlapping triangles) always resolves to the same pair
    /// regardless of the order the source delivered them in.
    #[default]
    Canonical,
    /// Keep the source's delivery order.
    Arrival,
}

/// Transform configuration.
#[derive(Clone, Copy, Debug, Default)]
pub struct FineltraCfg {
    pub order: CandidateOrder,
}

/// One scanned row: a source triangle and its target, or the delivery index
/// of a row whose target cell was null.
#[derive(Clone, Debug, PartialEq)]
enum Row {
    Paired(TrianglePair),
    Unpaired { src: Triangle, index: usize },
}

impl Row {
    #[inline]
    fn src(&self) -> &Triangle {
        match self {
            Row::Paired(pair) => &pair.src,
            Row::Unpaired { src, .. } => src,
        }
    }

    /// Source vertices first; on equal sources a paired row precedes an
    /// unpaired one.
    fn total_cmp(&self, other: &Row) -> Ordering {
        match (self, other) {
            (Row::Paired(a), Row::Paired(b)) => a.total_cmp(b),
            (Row::Paired(a), Row::Unpaired { src, .. }) => {
                a.src.total_cmp(src).then(Ordering::Less)
            }
            (Row::Unpaired { src, .. }, Row::Paired(b)) => {
                src.total_cmp(&b.src).then(Ordering::Greater)
            }
            (Row::Unpaired { src: a, index: i }, Row::Unpaired { src: b, index: j }) => {
                a.total_cmp(b).then(i.cmp(j))
            }
        }
    }
}

/// Ordered triangle rows plus the reference identifiers shared by all
/// source triangles and all target triangles.
///
/// Built for one transform call and read-only afterwards.
#[derive(Clone, Debug)]
pub struct TriangleSet {
    rows: Vec<Row>,
    srid_src: Srid,
    srid_tgt: Srid,
}

impl TriangleSet {
    /// Wrap already-decoded pairs, applying the configured scan order.
    pub fn from_pairs(
        pairs: Vec<TrianglePair>,
        srid_src: Srid,
        srid_tgt: Srid,
        cfg: FineltraCfg,
    ) -> Self {
        let rows = pairs.into_iter().map(Row::Paired).collect();
        Self::from_rows(rows, srid_src, srid_tgt, cfg)
    }

    fn from_rows(mut rows: Vec<Row>, srid_src: Srid, srid_tgt: Srid, cfg: FineltraCfg) -> Self {
        if cfg.order == CandidateOrder::Canonical {
            rows.sort_by(|a, b| a.total_cmp(b));
        }
        Self {
            rows,
            srid_src,
            srid_tgt,
        }
    }

    /// Decode candidate rows from a triangle source.
    ///
    /// Fails on an empty candidate list, a cell that is not a triangle, or
    /// candidates that disagree on their srid. A row without target is kept;
    /// it only fails a transform whose vertex it covers.
    pub fn from_candidates(candidates: Vec<CandidatePair>, cfg: FineltraCfg) -> FineltraResult<Self> {
        let Some(first) = candidates.first() else {
            return Err(FineltraError::NoCandidateTriangles);
        };
        let srid_src = first.src.srid;
        let mut srid_tgt: Option<Srid> = None;
        let mut rows = Vec::with_capacity(candidates.len());
        for (index, cand) in candidates.iter().enumerate() {
            if cand.src.srid != srid_src {
                return Err(FineltraError::ReferenceMismatch {
                    expected: srid_src,
                    found: cand.src.srid,
                });
            }
            let src = Triangle::from_geometry(&cand.src)?;
            let Some(tgt) = cand.tgt.as_ref() else {
                rows.push(Row::Unpaired { src, index });
                continue;
            };
            match srid_tgt {
                None => srid_tgt = Some(tgt.srid),
                Some(s) if s != tgt.srid => {
                    return Err(FineltraError::ReferenceMismatch {
                        expected: s,
                        found: tgt.srid,
                    })
                }
                Some(_) => {}
            }
            rows.push(Row::Paired(TrianglePair::new(src, Triangle::from_geometry(tgt)?)));
        }
        let srid_tgt = srid_tgt.unwrap_or(srid_src);
        let unpaired = rows.iter().filter(|r| matches!(r, Row::Unpaired { .. })).count();
        debug!(
            rows = rows.len(),
            unpaired,
            srid_src,
            srid_tgt,
            order = ?cfg.order,
            "triangle set built"
        );
        Ok(Self::from_rows(rows, srid_src, srid_tgt, cfg))
    }

    #[inline]
    pub fn srid_src(&self) -> Srid {
        self.srid_src
    }

    #[inline]
    pub fn srid_tgt(&self) -> Srid {
        self.srid_tgt
    }

    /// Complete pairs in scan order.
    pub fn pairs(&self) -> impl Iterator<Item = &TrianglePair> + '_ {
        self.rows.iter().filter_map(|r| match r {
            Row::Paired(pair) => Some(pair),
            Row::Unpaired { .. } => None,
        })
    }

    /// Every source triangle in scan order, paired or not.
    pub fn sources(&self) -> impl Iterator<Item = &Triangle> + '_ {
        self.rows.iter().map(Row::src)
    }

    /// Number of rows, unpaired ones included.
    #[inline]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// First pair, in scan order, whose source triangle covers `p`.
    ///
    /// `Ok(None)` if no row covers `p`; `NullCorrespondence` if the first
    /// covering row has no target triangle.
    pub fn locate(&self, p: Pt2) -> FineltraResult<Option<&TrianglePair>> {
        let hit = self.rows.iter().position(|row| row.src().covers(p));
        trace!(x = p.x, y = p.y, hit = ?hit, "locate");
        match hit.map(|i| &self.rows[i]) {
            None => Ok(None),
            Some(Row::Paired(pair)) => Ok(Some(pair)),
            Some(Row::Unpaired { index, .. }) => {
                Err(FineltraError::NullCorrespondence { index: *index })
            }
        }
    }
}
