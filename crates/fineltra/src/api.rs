//! Curated surface for embedding hosts.
//!
//! A host integration (database extension, service handler) needs the entry
//! point, the collaborator traits it must implement, and the error type it
//! has to map. Everything else stays behind the module paths.

pub use crate::error::{FineltraError, FineltraResult};
pub use crate::geometry::{Bbox, Geometry};
pub use crate::mesh::{CandidateOrder, FineltraCfg};
pub use crate::source::{fineltra, CandidatePair, NameCache, NoCache, RelationId, TriangleSource};
