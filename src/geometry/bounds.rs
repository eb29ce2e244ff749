use geo::{Coord, MultiPolygon};

/// Axis-aligned bounding box in source coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min_x: f64,
    pub max_x: f64,
    pub min_y: f64,
    pub max_y: f64,
}

impl Bounds {
    /// Create bounds from a set of coordinates
    pub fn from_coords<'a>(coords: impl IntoIterator<Item = &'a Coord<f64>>) -> Option<Self> {
        let mut coords = coords.into_iter();
        let first = coords.next()?;

        let mut bounds = Self {
            min_x: first.x,
            max_x: first.x,
            min_y: first.y,
            max_y: first.y,
        };
        bounds.expand(coords);

        Some(bounds)
    }

    /// Bounds of every exterior ring of a multi-polygon
    ///
    /// Holes lie inside their exterior ring, so they never widen the box.
    /// Returns `None` when the geometry has no coordinates at all.
    pub fn of_multipolygon(geometry: &MultiPolygon<f64>) -> Option<Self> {
        Self::from_coords(geometry.iter().flat_map(|polygon| polygon.exterior().0.iter()))
    }

    /// Expand bounds to include another set of coordinates
    pub fn expand<'a>(&mut self, coords: impl IntoIterator<Item = &'a Coord<f64>>) {
        for c in coords {
            self.min_x = self.min_x.min(c.x);
            self.max_x = self.max_x.max(c.x);
            self.min_y = self.min_y.min(c.y);
            self.max_y = self.max_y.max(c.y);
        }
    }

    /// Grow the box by `margin` on every side
    pub fn inflate(&self, margin: f64) -> Self {
        Self {
            min_x: self.min_x - margin,
            max_x: self.max_x + margin,
            min_y: self.min_y - margin,
            max_y: self.max_y + margin,
        }
    }

    /// True when the two boxes share at least one point (closed intervals)
    pub fn intersects(&self, other: &Bounds) -> bool {
        self.min_x <= other.max_x
            && other.min_x <= self.max_x
            && self.min_y <= other.max_y
            && other.min_y <= self.max_y
    }
}
