use ::errors::{ErrorKind, Result};
use ::geom::{BoundingBox, Point, ScreenPoint};

/// Uniform scale-and-translate from level space into image space.  y is flipped, since levels
/// grow upwards and images grow downwards.
///
/// The scale is the largest one that fits the bounding box inside the image minus its borders;
/// whichever axis runs out of room first sits against its borders, and the other axis is centered.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct LinearTransform {
    scale: f64,
    left: f64,
    top: f64,
    xoffset: f64,
    yoffset: f64,
    width: u32,
    height: u32,
}

impl LinearTransform {
    /// Fits `bbox` into a `width` x `height` image, leaving `border_percent` of each dimension
    /// empty on both sides.
    ///
    /// A box with zero extent on one axis is fitted using the other axis alone.  A box with zero
    /// extent on both axes (a single point) gets one pixel per level unit, centered.
    pub fn new(bbox: &BoundingBox, width: u32, height: u32, border_percent: f64) -> Result<Self> {
        if !(bbox.width().is_finite() && bbox.height().is_finite()) {
            bail!(ErrorKind::DegenerateGeometry("bounding box is not finite".to_owned()));
        }
        if !(border_percent >= 0.0 && border_percent < 50.0) {
            bail!(ErrorKind::DegenerateGeometry(format!("a {}% border leaves no room to draw", border_percent)));
        }

        let (full_x, full_y) = (width as f64, height as f64);
        let border_x = full_x * border_percent / 100.0;
        let border_y = full_y * border_percent / 100.0;
        let avail_x = full_x - 2.0 * border_x;
        let avail_y = full_y - 2.0 * border_y;
        if avail_x <= 0.0 || avail_y <= 0.0 {
            bail!(ErrorKind::DegenerateGeometry(format!("a {}x{} image has no room to draw", width, height)));
        }

        let x_scale = if bbox.width() > 0.0 { Some(avail_x / bbox.width()) } else { None };
        let y_scale = if bbox.height() > 0.0 { Some(avail_y / bbox.height()) } else { None };

        let mut transform = LinearTransform {
            scale: 1.0,
            left: bbox.left,
            top: bbox.top,
            xoffset: 0.0,
            yoffset: 0.0,
            width,
            height,
        };
        match (x_scale, y_scale) {
            (Some(xs), Some(ys)) if xs <= ys => {
                transform.scale = xs;
                transform.xoffset = border_x;
                transform.yoffset = (full_y - xs * bbox.height()) / 2.0;
            }
            (Some(xs), None) => {
                transform.scale = xs;
                transform.xoffset = border_x;
                transform.yoffset = full_y / 2.0;
            }
            (_, Some(ys)) => {
                transform.scale = ys;
                transform.xoffset = (full_x - ys * bbox.width()) / 2.0;
                transform.yoffset = border_y;
            }
            (None, None) => {
                transform.xoffset = full_x / 2.0;
                transform.yoffset = full_y / 2.0;
            }
        }
        if bbox.is_degenerate() {
            debug!("{:?} has no area, so it's centered on the flat axis", bbox);
        }
        debug!("fitted {:?} into {}x{} at {:.4} px/unit", bbox, width, height, transform.scale);
        Ok(transform)
    }

    /// Limits the scale to at most `max_scale` pixels per unit.  If that shrinks the content, it's
    /// re-centered on both axes.
    pub fn with_max_scale(self, bbox: &BoundingBox, max_scale: f64) -> Self {
        if !(max_scale > 0.0) || self.scale <= max_scale {
            return self;
        }
        LinearTransform {
            scale: max_scale,
            xoffset: (self.width as f64 - max_scale * bbox.width()) / 2.0,
            yoffset: (self.height as f64 - max_scale * bbox.height()) / 2.0,
            ..self
        }
    }

    /// A transform with the same scale as this one, for drawing only `bbox` into a small image of
    /// its own.  Returns the transform and where the small image's top-left corner lands in this
    /// transform's image.  `padding` pixels are left around the content.
    pub fn local(&self, bbox: &BoundingBox, padding: u32) -> (LinearTransform, (i32, i32)) {
        let corner = self.map_to_screen(Point::new(bbox.left, bbox.top));
        let origin_x = corner.x.floor() as i32 - padding as i32;
        let origin_y = corner.y.floor() as i32 - padding as i32;
        let width = (self.scale * bbox.width()).ceil() as u32 + 2 * padding + 1;
        let height = (self.scale * bbox.height()).ceil() as u32 + 2 * padding + 1;
        let local = LinearTransform {
            scale: self.scale,
            left: bbox.left,
            top: bbox.top,
            xoffset: corner.x - origin_x as f64,
            yoffset: corner.y - origin_y as f64,
            width,
            height,
        };
        (local, (origin_x, origin_y))
    }

    pub fn map_to_screen(&self, point: Point) -> ScreenPoint {
        ScreenPoint::new(
            self.scale * (point.x - self.left) + self.xoffset,
            self.scale * (self.top - point.y) + self.yoffset,
        )
    }

    pub fn screen_to_map(&self, point: ScreenPoint) -> Point {
        Point::new(
            (point.x - self.xoffset) / self.scale + self.left,
            self.top - (point.y - self.yoffset) / self.scale,
        )
    }

    /// Pixels per level unit.
    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn offset(&self) -> (f64, f64) {
        (self.xoffset, self.yoffset)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }
}
