use serde::{Deserialize, Serialize};

use super::Bbox;
use crate::{FineltraResult, Pt2, Srid};

/// One vertex. Only `x`/`y` take part in the transform; `z`/`m` ride along.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Coord {
    pub x: f64,
    pub y: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub z: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub m: Option<f64>,
}

impl Coord {
    #[inline]
    pub fn xy(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            z: None,
            m: None,
        }
    }

    #[inline]
    pub fn xyz(x: f64, y: f64, z: f64) -> Self {
        Self {
            x,
            y,
            z: Some(z),
            m: None,
        }
    }

    #[inline]
    pub fn pt(&self) -> Pt2 {
        Pt2::new(self.x, self.y)
    }

    /// Overwrite x/y, keeping the extra ordinates.
    #[inline]
    pub fn set_pt(&mut self, p: Pt2) {
        self.x = p.x;
        self.y = p.y;
    }
}

impl From<(f64, f64)> for Coord {
    fn from((x, y): (f64, f64)) -> Self {
        Coord::xy(x, y)
    }
}

/// Geometry kinds.
///
/// Leaf kinds own a flat vertex list, `Polygon` owns rings (ring 0 is the
/// exterior), collection kinds own child shapes of any kind. `Unknown` keeps
/// the type code of a kind the decoder could not map.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "coordinates")]
pub enum Shape {
    Point(Option<Coord>),
    LineString(Vec<Coord>),
    CircularString(Vec<Coord>),
    Triangle(Vec<Coord>),
    Polygon(Vec<Vec<Coord>>),
    MultiPoint(Vec<Shape>),
    MultiLineString(Vec<Shape>),
    MultiPolygon(Vec<Shape>),
    GeometryCollection(Vec<Shape>),
    CompoundCurve(Vec<Shape>),
    CurvePolygon(Vec<Shape>),
    MultiCurve(Vec<Shape>),
    MultiSurface(Vec<Shape>),
    PolyhedralSurface(Vec<Shape>),
    Tin(Vec<Shape>),
    Unknown(u32),
}

impl Shape {
    /// ISO type code of the kind.
    pub fn type_code(&self) -> u32 {
        match self {
            Shape::Point(_) => 1,
            Shape::LineString(_) => 2,
            Shape::Polygon(_) => 3,
            Shape::MultiPoint(_) => 4,
            Shape::MultiLineString(_) => 5,
            Shape::MultiPolygon(_) => 6,
            Shape::GeometryCollection(_) => 7,
            Shape::CircularString(_) => 8,
            Shape::CompoundCurve(_) => 9,
            Shape::CurvePolygon(_) => 10,
            Shape::MultiCurve(_) => 11,
            Shape::MultiSurface(_) => 12,
            Shape::PolyhedralSurface(_) => 15,
            Shape::Tin(_) => 16,
            Shape::Triangle(_) => 17,
            Shape::Unknown(code) => *code,
        }
    }

    /// Child shapes of a collection kind, `None` for everything else.
    pub fn children(&self) -> Option<&[Shape]> {
        match self {
            Shape::MultiPoint(c)
            | Shape::MultiLineString(c)
            | Shape::MultiPolygon(c)
            | Shape::GeometryCollection(c)
            | Shape::CompoundCurve(c)
            | Shape::CurvePolygon(c)
            | Shape::MultiCurve(c)
            | Shape::MultiSurface(c)
            | Shape::PolyhedralSurface(c)
            | Shape::Tin(c) => Some(c),
            _ => None,
        }
    }

    pub fn children_mut(&mut self) -> Option<&mut [Shape]> {
        match self {
            Shape::MultiPoint(c)
            | Shape::MultiLineString(c)
            | Shape::MultiPolygon(c)
            | Shape::GeometryCollection(c)
            | Shape::CompoundCurve(c)
            | Shape::CurvePolygon(c)
            | Shape::MultiCurve(c)
            | Shape::MultiSurface(c)
            | Shape::PolyhedralSurface(c)
            | Shape::Tin(c) => Some(c),
            _ => None,
        }
    }

    /// True when the tree holds no vertex at all. `Unknown` is never empty.
    pub fn is_empty(&self) -> bool {
        match self {
            Shape::Point(c) => c.is_none(),
            Shape::LineString(v) | Shape::CircularString(v) | Shape::Triangle(v) => v.is_empty(),
            Shape::Polygon(rings) => rings.iter().all(Vec::is_empty),
            Shape::Unknown(_) => false,
            other => other
                .children()
                .is_none_or(|c| c.iter().all(Shape::is_empty)),
        }
    }

    /// Visit every vertex in storage order.
    pub fn for_each_coord<F: FnMut(&Coord)>(&self, f: &mut F) {
        match self {
            Shape::Point(c) => {
                if let Some(c) = c {
                    f(c);
                }
            }
            Shape::LineString(v) | Shape::CircularString(v) | Shape::Triangle(v) => {
                v.iter().for_each(|c| f(c))
            }
            Shape::Polygon(rings) => rings.iter().flatten().for_each(|c| f(c)),
            Shape::Unknown(_) => {}
            other => {
                for child in other.children().unwrap_or_default() {
                    child.for_each_coord(f);
                }
            }
        }
    }

    pub fn num_vertices(&self) -> usize {
        let mut n = 0usize;
        self.for_each_coord(&mut |_| n += 1);
        n
    }
}

/// A shape tagged with its reference identifier.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Geometry {
    pub srid: Srid,
    pub shape: Shape,
}

impl Geometry {
    #[inline]
    pub fn new(srid: Srid, shape: Shape) -> Self {
        Self { srid, shape }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.shape.is_empty()
    }

    /// x/y bounds of all vertices; `None` for empty geometries.
    pub fn bbox(&self) -> Option<Bbox> {
        let mut bb: Option<Bbox> = None;
        self.shape.for_each_coord(&mut |c| match bb.as_mut() {
            Some(b) => b.expand(c.pt()),
            None => bb = Some(Bbox::from_point(c.pt())),
        });
        bb
    }

    pub fn from_json(s: &str) -> FineltraResult<Self> {
        Ok(serde_json::from_str(s)?)
    }

    pub fn to_json(&self) -> FineltraResult<String> {
        Ok(serde_json::to_string(self)?)
    }
}
