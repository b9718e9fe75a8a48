use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use ::errors::{Error, ErrorKind, Result};
use ::geom::ScreenPoint;
use super::color::Color;

/// Something the renderer can draw on.  Coordinates are in pixels, and anything drawn outside the
/// canvas is clipped.
pub trait Canvas: Sized {
    /// A blank canvas.  With no background it starts out transparent, which is how pieces meant for
    /// `paste` are made.
    fn create(width: u32, height: u32, background: Option<Color>) -> Self;

    fn width(&self) -> u32;
    fn height(&self) -> u32;

    fn draw_line(&mut self, from: ScreenPoint, to: ScreenPoint, color: Color);
    fn draw_point(&mut self, at: ScreenPoint, color: Color);
    /// Fills a polygon.  The outline is implicitly closed, so the last point shouldn't repeat the
    /// first.
    fn draw_polygon(&mut self, points: &[ScreenPoint], fill: Color);
    /// Fills several outlines as one shape, with the even-odd rule: a pixel is filled when it's
    /// inside an odd number of outlines, so an outline nested in another cuts a hole.
    fn draw_shape(&mut self, outlines: &[Vec<ScreenPoint>], fill: Color);
    fn draw_ellipse(&mut self, center: ScreenPoint, radius: f64, outline: Color);

    /// Composites another canvas over this one, with its top-left corner at `top_left`.
    fn paste(&mut self, other: &Self, top_left: (i32, i32));

    /// Encodes and writes the canvas.  Nothing is left at `path` if this fails.
    fn save(&self, path: &Path, format: OutputFormat) -> Result<()>;
}

/// File formats a rendered level can be written as.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Png,
    Bmp,
    Jpeg,
    Svg,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match *self {
            OutputFormat::Png => "png",
            OutputFormat::Bmp => "bmp",
            OutputFormat::Jpeg => "jpeg",
            OutputFormat::Svg => "svg",
        }
    }

    pub fn is_vector(&self) -> bool {
        *self == OutputFormat::Svg
    }

    /// Guesses the format from a file's extension.
    pub fn from_path(path: &Path) -> Result<OutputFormat> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) => ext.parse(),
            None => bail!(ErrorKind::UnsupportedFormat(path.display().to_string())),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for OutputFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "png" => Ok(OutputFormat::Png),
            "bmp" => Ok(OutputFormat::Bmp),
            "jpeg" | "jpg" => Ok(OutputFormat::Jpeg),
            "svg" => Ok(OutputFormat::Svg),
            _ => Err(ErrorKind::UnsupportedFormat(s.to_owned()).into()),
        }
    }
}

/// Writes a file through a temporary sibling, renamed into place only once `write` succeeds.
pub fn write_atomically<F>(path: &Path, write: F) -> Result<()>
where
    F: FnOnce(&Path) -> Result<()>,
{
    let temp = temporary_path(path);
    if let Err(err) = write(&temp) {
        let _ = fs::remove_file(&temp);
        return Err(err);
    }
    if let Err(err) = fs::rename(&temp, path) {
        let _ = fs::remove_file(&temp);
        return Err(err.into());
    }
    Ok(())
}

fn temporary_path(path: &Path) -> PathBuf {
    let name = path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "automap".to_owned());
    path.with_file_name(format!(".{}.tmp", name))
}


/// What a `RecordingCanvas` saw.
#[cfg(test)]
#[derive(Clone, Debug, PartialEq)]
pub enum DrawCall {
    Line(ScreenPoint, ScreenPoint, Color),
    Point(ScreenPoint, Color),
    Polygon(Vec<ScreenPoint>, Color),
    Shape(Vec<Vec<ScreenPoint>>, Color),
    Ellipse(ScreenPoint, f64, Color),
    Paste((i32, i32), Vec<DrawCall>),
}

/// A canvas that only remembers what was drawn on it, in order.
#[cfg(test)]
pub struct RecordingCanvas {
    pub width: u32,
    pub height: u32,
    pub background: Option<Color>,
    pub calls: Vec<DrawCall>,
}

#[cfg(test)]
impl RecordingCanvas {
    pub fn lines(&self) -> Vec<(ScreenPoint, ScreenPoint, Color)> {
        self.calls.iter()
            .filter_map(|call| match *call {
                DrawCall::Line(a, b, color) => Some((a, b, color)),
                _ => None,
            })
            .collect()
    }
}

#[cfg(test)]
impl Canvas for RecordingCanvas {
    fn create(width: u32, height: u32, background: Option<Color>) -> Self {
        RecordingCanvas { width, height, background, calls: Vec::new() }
    }

    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn draw_line(&mut self, from: ScreenPoint, to: ScreenPoint, color: Color) {
        self.calls.push(DrawCall::Line(from, to, color));
    }

    fn draw_point(&mut self, at: ScreenPoint, color: Color) {
        self.calls.push(DrawCall::Point(at, color));
    }

    fn draw_polygon(&mut self, points: &[ScreenPoint], fill: Color) {
        self.calls.push(DrawCall::Polygon(points.to_vec(), fill));
    }

    fn draw_shape(&mut self, outlines: &[Vec<ScreenPoint>], fill: Color) {
        self.calls.push(DrawCall::Shape(outlines.to_vec(), fill));
    }

    fn draw_ellipse(&mut self, center: ScreenPoint, radius: f64, outline: Color) {
        self.calls.push(DrawCall::Ellipse(center, radius, outline));
    }

    fn paste(&mut self, other: &Self, top_left: (i32, i32)) {
        self.calls.push(DrawCall::Paste(top_left, other.calls.clone()));
    }

    fn save(&self, path: &Path, _format: OutputFormat) -> Result<()> {
        write_atomically(path, |temp| {
            fs::write(temp, format!("{:#?}", self.calls))?;
            Ok(())
        })
    }
}
