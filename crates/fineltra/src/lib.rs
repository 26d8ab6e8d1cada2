//! Rubber-sheet transform of vector geometries over a triangulated
//! correspondence mesh.
//!
//! Every vertex of an input geometry is located in a source triangle of the
//! mesh and moved by area-weighted barycentric interpolation towards the
//! paired target triangle.
//!
//! Layout
//! - `geometry`: in-memory geometry tree (`Geometry`, `Shape`, `Coord`, `Bbox`).
//! - `mesh`: triangles, triangle sets, point location, barycentric transform,
//!   and a seeded sampler for synthetic meshes (benches, property tests).
//! - `transform`: recursive traversal applying the mesh to every vertex.
//! - `source`: triangle-source and name-cache collaborators, and the
//!   `fineltra` entry point tying everything together.

pub mod api;
pub mod error;
pub mod geometry;
pub mod mesh;
pub mod source;
pub mod transform;

/// Library version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub use error::{FineltraError, FineltraResult};

/// 2D point used by the mesh (x, y only).
pub type Pt2 = nalgebra::Vector2<f64>;

/// Spatial reference identifier.
pub type Srid = i32;

/// Common exports for quick imports in callers.
pub mod prelude {
    pub use crate::geometry::{Bbox, Coord, Geometry, Shape};
    pub use crate::mesh::{CandidateOrder, FineltraCfg, Triangle, TrianglePair, TriangleSet};
    pub use crate::source::{
        fineltra, CandidatePair, MemorySource, NameCache, NoCache, RelationId, TriangleSource,
    };
    pub use crate::transform::{transform_geometry, transformed};
    pub use crate::{FineltraError, FineltraResult, Pt2, Srid};
}
