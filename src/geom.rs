use euclid::TypedPoint2D;

/// Level coordinates: arbitrary signed units, y grows upwards.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct MapSpace;
/// Image coordinates: pixels, origin at the top left, y grows downwards.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ScreenSpace;

pub type Coord = f64;
pub type Point = TypedPoint2D<Coord, MapSpace>;
pub type ScreenPoint = TypedPoint2D<f64, ScreenSpace>;

/// Axis-aligned extent of some level geometry.  Always satisfies `left <= right` and
/// `bottom <= top`, but either extent may be zero.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct BoundingBox {
    pub left: Coord,
    pub right: Coord,
    pub bottom: Coord,
    pub top: Coord,
}

impl BoundingBox {
    /// Smallest box containing every point, or `None` for no points at all.
    pub fn from_points<I>(points: I) -> Option<BoundingBox>
    where
        I: IntoIterator<Item = Point>,
    {
        let mut points = points.into_iter();
        let first = points.next()?;
        let mut bbox = BoundingBox {
            left: first.x,
            right: first.x,
            bottom: first.y,
            top: first.y,
        };
        for point in points {
            bbox.include(point);
        }
        Some(bbox)
    }

    pub fn include(&mut self, point: Point) {
        self.left = self.left.min(point.x);
        self.right = self.right.max(point.x);
        self.bottom = self.bottom.min(point.y);
        self.top = self.top.max(point.y);
    }

    pub fn width(&self) -> Coord {
        self.right - self.left
    }

    pub fn height(&self) -> Coord {
        self.top - self.bottom
    }

    /// True if the box has no area, i.e. all the points were on one line.
    pub fn is_degenerate(&self) -> bool {
        self.width() == 0.0 || self.height() == 0.0
    }
}
