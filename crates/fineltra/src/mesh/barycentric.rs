//! Area-weighted barycentric displacement.
//!
//! Each source vertex contributes its translation vector `tgt.t_i − src.t_i`
//! weighted by the area of the sub-triangle opposite to it. At a vertex the
//! opposite sub-triangle is the whole triangle and the other two vanish, so
//! the vertex lands exactly on its target counterpart.

use super::triangle::{signed_area, TrianglePair};
use crate::{FineltraError, FineltraResult, Pt2};

/// Sub-triangle weights `[P1, P2, P3]` of `p` in the source triangle.
#[inline]
pub fn weights(p: Pt2, pair: &TrianglePair) -> [f64; 3] {
    let s = &pair.src;
    [
        signed_area(p, s.t2, s.t3).abs(),
        signed_area(p, s.t1, s.t3).abs(),
        signed_area(p, s.t1, s.t2).abs(),
    ]
}

/// Move `p` from the source triangle to the target triangle.
///
/// Pre: `pair.src` covers `p` (not re-checked).
pub fn transform(p: Pt2, pair: &TrianglePair) -> FineltraResult<Pt2> {
    let [p1, p2, p3] = weights(p, pair);
    let total = p1 + p2 + p3;
    if total == 0.0 {
        return Err(FineltraError::DegenerateTriangle);
    }
    let v1 = pair.tgt.t1 - pair.src.t1;
    let v2 = pair.tgt.t2 - pair.src.t2;
    let v3 = pair.tgt.t3 - pair.src.t3;
    let d = (v1 * p1 + v2 * p2 + v3 * p3) / total;
    Ok(p + d)
}
