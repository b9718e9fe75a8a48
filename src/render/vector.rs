use std::path::Path;

use image::Rgb;
use svg;
use svg::Document;
use svg::Node;
use svg::node::element::{Circle, Group, Line, Path as PathElement, Polygon, Rectangle};
use svg::node::element::path::Data;

use ::errors::{ErrorKind, Result};
use ::geom::ScreenPoint;
use super::canvas::{write_atomically, Canvas, OutputFormat};
use super::color::Color;

/// A canvas that builds an SVG document instead of pixels.  Same coordinates as the raster
/// canvas, so the same transform works for both.
pub struct VectorCanvas {
    width: u32,
    height: u32,
    background: Option<Color>,
    content: Group,
}

fn css(color: Color) -> String {
    let Rgb([r, g, b]) = color;
    format!("rgb({}, {}, {})", r, g, b)
}

impl VectorCanvas {
    pub fn to_document(&self) -> Document {
        let mut doc = Document::new()
            .set("width", self.width)
            .set("height", self.height)
            .set("viewBox", (0, 0, self.width, self.height));
        if let Some(color) = self.background {
            doc = doc.add(
                Rectangle::new()
                .set("width", self.width)
                .set("height", self.height)
                .set("fill", css(color))
            );
        }
        doc.add(self.content.clone())
    }
}

impl Canvas for VectorCanvas {
    fn create(width: u32, height: u32, background: Option<Color>) -> Self {
        VectorCanvas {
            width,
            height,
            background,
            content: Group::new().set("stroke-linecap", "round"),
        }
    }

    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn draw_line(&mut self, from: ScreenPoint, to: ScreenPoint, color: Color) {
        self.content.append(
            Line::new()
            .set("x1", from.x)
            .set("y1", from.y)
            .set("x2", to.x)
            .set("y2", to.y)
            .set("stroke", css(color))
        );
    }

    fn draw_point(&mut self, at: ScreenPoint, color: Color) {
        self.content.append(
            Circle::new()
            .set("cx", at.x)
            .set("cy", at.y)
            .set("r", 0.5)
            .set("fill", css(color))
        );
    }

    fn draw_polygon(&mut self, points: &[ScreenPoint], fill: Color) {
        if points.is_empty() {
            return;
        }
        let coords: Vec<String> = points.iter().map(|p| format!("{},{}", p.x, p.y)).collect();
        self.content.append(
            Polygon::new()
            .set("points", coords.join(" "))
            .set("fill", css(fill))
        );
    }

    fn draw_shape(&mut self, outlines: &[Vec<ScreenPoint>], fill: Color) {
        let mut data = Data::new();
        for outline in outlines.iter().filter(|outline| !outline.is_empty()) {
            data = data.move_to((outline[0].x, outline[0].y));
            for point in &outline[1..] {
                data = data.line_to((point.x, point.y));
            }
            data = data.close();
        }
        if data.is_empty() {
            return;
        }
        self.content.append(
            PathElement::new()
            .set("d", data)
            .set("fill-rule", "evenodd")
            .set("fill", css(fill))
        );
    }

    fn draw_ellipse(&mut self, center: ScreenPoint, radius: f64, outline: Color) {
        self.content.append(
            Circle::new()
            .set("cx", center.x)
            .set("cy", center.y)
            .set("r", radius)
            .set("fill", "none")
            .set("stroke", css(outline))
        );
    }

    fn paste(&mut self, other: &Self, top_left: (i32, i32)) {
        let mut piece = other.content.clone();
        piece.assign("transform", format!("translate({} {})", top_left.0, top_left.1));
        self.content.append(piece);
    }

    fn save(&self, path: &Path, format: OutputFormat) -> Result<()> {
        if !format.is_vector() {
            bail!(ErrorKind::UnsupportedFormat(format!("{} from a vector canvas", format)));
        }
        let doc = self.to_document();
        write_atomically(path, |temp| {
            svg::save(temp, &doc)?;
            Ok(())
        })
    }
}


#[cfg(test)]
mod tests {
    use std::env;
    use std::fs;

    use super::*;

    const BLACK: Color = Rgb([0, 0, 0]);

    #[test]
    fn builds_a_document() {
        let mut canvas = VectorCanvas::create(100, 50, Some(Rgb([255, 255, 255])));
        canvas.draw_line(ScreenPoint::new(1.0, 2.0), ScreenPoint::new(30.0, 40.0), BLACK);
        let mut piece = VectorCanvas::create(10, 10, None);
        piece.draw_polygon(&[ScreenPoint::new(0.0, 0.0), ScreenPoint::new(5.0, 0.0), ScreenPoint::new(5.0, 5.0)], BLACK);
        canvas.paste(&piece, (7, -3));

        let text = canvas.to_document().to_string();
        assert!(text.contains("viewBox=\"0 0 100 50\""));
        assert!(text.contains("<line"));
        assert!(text.contains("stroke=\"rgb(0, 0, 0)\""));
        assert!(text.contains("points=\"0,0 5,0 5,5\""));
        assert!(text.contains("translate(7 -3)"));
        assert!(text.contains("fill=\"rgb(255, 255, 255)\""));
    }

    #[test]
    fn shapes_use_the_even_odd_rule() {
        let mut canvas = VectorCanvas::create(20, 20, None);
        canvas.draw_shape(&[
            vec![ScreenPoint::new(0.0, 0.0), ScreenPoint::new(10.0, 0.0), ScreenPoint::new(10.0, 10.0)],
            vec![],
            vec![ScreenPoint::new(2.0, 1.0), ScreenPoint::new(8.0, 1.0), ScreenPoint::new(8.0, 7.0)],
        ], BLACK);
        canvas.draw_shape(&[], BLACK);

        let text = canvas.to_document().to_string();
        assert_eq!(text.matches("<path").count(), 1);
        assert!(text.contains("fill-rule=\"evenodd\""));
        assert!(text.contains("d=\"M0,0 L10,0 L10,10 z M2,1 L8,1 L8,7 z\""));
    }

    #[test]
    fn saves_only_svg() {
        let path = env::temp_dir().join(format!("automap-vector-{}.svg", ::std::process::id()));
        let canvas = VectorCanvas::create(4, 4, None);
        assert!(canvas.save(&path, OutputFormat::Png).is_err());
        canvas.save(&path, OutputFormat::Svg).unwrap();
        assert!(fs::read_to_string(&path).unwrap().starts_with("<svg"));
        fs::remove_file(&path).unwrap();
    }
}
