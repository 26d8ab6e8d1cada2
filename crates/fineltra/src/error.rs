//! Error types for rubber-sheet transforms.

use thiserror::Error;

use crate::source::RelationId;
use crate::Srid;

/// Errors that abort a transform call.
///
/// Every variant is fatal to the enclosing call. Vertices moved before the
/// failing one are not restored; use `transform::transformed` when the input
/// must survive a failure untouched.
#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum FineltraError {
    /// Malformed geometry encoding.
    #[error("cannot parse geometry: {0}")]
    Parse(String),

    /// The triangle source returned no pair overlapping the input.
    #[error("no candidate triangles overlap the input geometry")]
    NoCandidateTriangles,

    /// A triangle cell is not a 3-point polygon ring.
    #[error("invalid triangle geometry: {0}")]
    InvalidTriangleGeometry(String),

    /// Reference systems of input and mesh disagree.
    #[error("reference mismatch: expected srid {expected}, found {found}")]
    ReferenceMismatch {
        /// The srid required by the mesh.
        expected: Srid,
        /// The srid actually carried.
        found: Srid,
    },

    /// The source triangle covering a vertex has no paired target triangle.
    #[error("source triangle #{index} has no target triangle")]
    NullCorrespondence {
        /// Position of the row in the candidate list.
        index: usize,
    },

    /// No source triangle covers a vertex.
    #[error("vertex ({x}, {y}) is not covered by any source triangle")]
    VertexOutsideCoverage {
        /// Vertex x.
        x: f64,
        /// Vertex y.
        y: f64,
    },

    /// Zero total sub-triangle area during interpolation.
    #[error("degenerate source triangle (zero area)")]
    DegenerateTriangle,

    /// The traversal met a geometry kind it does not handle.
    #[error("unsupported geometry type code {0}")]
    UnsupportedGeometryType(u32),

    /// The triangle source does not know the relation identifier.
    #[error("unknown triangle relation {0}")]
    UnknownRelation(RelationId),

    /// The relation has no column with that name.
    #[error("relation {relation} has no column {column:?}")]
    UnknownColumn {
        /// Qualified relation name.
        relation: String,
        /// Requested column.
        column: String,
    },

    /// Backend failure reported by a triangle source.
    #[error("triangle source failed: {0}")]
    Source(String),
}

impl From<serde_json::Error> for FineltraError {
    fn from(e: serde_json::Error) -> Self {
        FineltraError::Parse(e.to_string())
    }
}

/// Result type for transform operations.
pub type FineltraResult<T> = Result<T, FineltraError>;
