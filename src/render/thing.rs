use std::fmt;
use std::str::FromStr;

use ::errors::{Error, ErrorKind};
use ::geom::Point;

/// How things are marked on the map.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ThingMarker {
    /// An arrowhead pointing the way the thing faces, sized in level units.
    Triangle,
    /// A small circle of fixed pixel size, ignoring facing.
    Circle,
}

impl fmt::Display for ThingMarker {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match *self {
            ThingMarker::Triangle => "triangle",
            ThingMarker::Circle => "circle",
        })
    }
}

impl FromStr for ThingMarker {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "triangle" => Ok(ThingMarker::Triangle),
            "circle" => Ok(ThingMarker::Circle),
            _ => Err(ErrorKind::Msg(format!("unknown thing marker '{}'", s)).into()),
        }
    }
}

/// Half the size of a thing marker, in level units.  Roughly a player's radius.
pub const THING_RADIUS: f64 = 16.0;
/// Radius of circle markers, in pixels.
pub const THING_CIRCLE_PIXELS: i32 = 3;

/// The automap's thing arrow, facing east, in units of `THING_RADIUS`.
const TRIANGLE: [(f64, f64); 3] = [
    (-0.5, -0.7),
    (1.0, 0.0),
    (-0.5, 0.7),
];

/// The outline of a thing's triangle marker in level space: three segments, closing the loop.
/// `angle` is in degrees counter-clockwise from east.
pub fn footprint(position: Point, angle: f64) -> [(Point, Point); 3] {
    let (sin, cos) = angle.to_radians().sin_cos();
    let corner = |(x, y): (f64, f64)| {
        let (x, y) = (x * THING_RADIUS, y * THING_RADIUS);
        Point::new(position.x + x * cos - y * sin, position.y + x * sin + y * cos)
    };
    let a = corner(TRIANGLE[0]);
    let b = corner(TRIANGLE[1]);
    let c = corner(TRIANGLE[2]);
    [(a, b), (b, c), (c, a)]
}
