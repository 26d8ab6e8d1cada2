//! Correspondence mesh: triangles, triangle sets, point location, and the
//! barycentric transform.
//!
//! - `Triangle`, `TrianglePair`: ordered vertex triples and their pairing.
//! - `TriangleSet::locate`: first pair (scan order) covering a point.
//! - `barycentric::transform`: displacement of a covered point.
//! - `rand`: seeded jittered-grid meshes for experiments and benches.
//!
//! All predicates are exact (no epsilon): boundary points are covered, and a
//! zero-area configuration is an error rather than a division.

pub mod barycentric;
pub mod rand;
mod set;
mod triangle;

pub use set::{CandidateOrder, FineltraCfg, TriangleSet};
pub use triangle::{orient, signed_area, Orientation, Triangle, TrianglePair};
