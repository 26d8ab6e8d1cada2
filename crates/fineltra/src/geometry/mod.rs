//! In-memory geometry tree consumed and produced by the transform.
//!
//! - `Geometry`: reference identifier plus a `Shape`.
//! - `Shape`: tagged variant over leaf kinds (flat vertex lists), polygons
//!   (rings) and collection kinds (child shapes).
//! - `Coord`: one vertex; x/y plus optional z/m ordinates.
//! - `Bbox`: axis-aligned bounds used by triangle-source pre-filters.
//!
//! The JSON codec (`Geometry::from_json`/`to_json`) is a convenience exchange
//! format; binary encodings are a host concern.

mod bbox;
mod types;

pub use bbox::Bbox;
pub use types::{Coord, Geometry, Shape};
