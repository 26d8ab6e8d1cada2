use crate::Pt2;

/// Axis-aligned bounding box in x/y.
///
/// Invariant: `min.x <= max.x` and `min.y <= max.y`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bbox {
    pub min: Pt2,
    pub max: Pt2,
}

impl Bbox {
    #[inline]
    pub fn from_point(p: Pt2) -> Self {
        Self { min: p, max: p }
    }

    /// Bounds of a point set; `None` if empty.
    pub fn from_points<I: IntoIterator<Item = Pt2>>(points: I) -> Option<Self> {
        let mut it = points.into_iter();
        let mut bb = Self::from_point(it.next()?);
        for p in it {
            bb.expand(p);
        }
        Some(bb)
    }

    #[inline]
    pub fn expand(&mut self, p: Pt2) {
        self.min.x = self.min.x.min(p.x);
        self.min.y = self.min.y.min(p.y);
        self.max.x = self.max.x.max(p.x);
        self.max.y = self.max.y.max(p.y);
    }

    /// Closed-box overlap (touching boxes intersect).
    #[inline]
    pub fn intersects(&self, other: &Bbox) -> bool {
        self.min.x <= other.max.x
            && other.min.x <= self.max.x
            && self.min.y <= other.max.y
            && other.min.y <= self.max.y
    }

    #[inline]
    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    #[inline]
    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }
}
