use std::path::Path;

use image::{DynamicImage, GrayImage, ImageFormat, Luma, Rgb, Rgba, RgbaImage};
use image::imageops;
use imageproc::drawing::{draw_hollow_circle_mut, draw_line_segment_mut, draw_polygon_mut};
use imageproc::drawing::Canvas as PixelCanvas;
use imageproc::point::Point as PixelPoint;

use ::errors::{ErrorKind, Result};
use ::geom::ScreenPoint;
use super::canvas::{write_atomically, Canvas, OutputFormat};
use super::color::Color;

/// A canvas backed by an in-memory RGBA image, encoded with `image`.
pub struct RasterCanvas {
    image: RgbaImage,
}

fn opaque(color: Color) -> Rgba<u8> {
    let Rgb([r, g, b]) = color;
    Rgba([r, g, b, 255])
}

fn pixel_point(point: ScreenPoint) -> PixelPoint<i32> {
    PixelPoint::new(point.x.round() as i32, point.y.round() as i32)
}

/// Fills one outline on anything imageproc can draw on, degenerate outlines included.
fn fill_outline<C: PixelCanvas>(canvas: &mut C, points: &[ScreenPoint], pixel: C::Pixel) {
    // imageproc wants an open path with no repeated corners, and panics otherwise
    let mut outline: Vec<PixelPoint<i32>> = Vec::with_capacity(points.len());
    for &point in points {
        let pixel = pixel_point(point);
        if outline.last() != Some(&pixel) {
            outline.push(pixel);
        }
    }
    while outline.len() > 1 && outline.first() == outline.last() {
        outline.pop();
    }

    match outline.len() {
        0 => {}
        1 => {
            let (width, height) = canvas.dimensions();
            let only = outline[0];
            if only.x >= 0 && only.y >= 0 && (only.x as u32) < width && (only.y as u32) < height {
                canvas.draw_pixel(only.x as u32, only.y as u32, pixel);
            }
        }
        2 => draw_line_segment_mut(
            canvas,
            (outline[0].x as f32, outline[0].y as f32),
            (outline[1].x as f32, outline[1].y as f32),
            pixel,
        ),
        _ => draw_polygon_mut(canvas, &outline, pixel),
    }
}

impl RasterCanvas {
    pub fn image(&self) -> &RgbaImage {
        &self.image
    }
}

impl Canvas for RasterCanvas {
    fn create(width: u32, height: u32, background: Option<Color>) -> Self {
        let fill = match background {
            Some(color) => opaque(color),
            None => Rgba([0, 0, 0, 0]),
        };
        RasterCanvas { image: RgbaImage::from_pixel(width, height, fill) }
    }

    fn width(&self) -> u32 {
        self.image.width()
    }

    fn height(&self) -> u32 {
        self.image.height()
    }

    fn draw_line(&mut self, from: ScreenPoint, to: ScreenPoint, color: Color) {
        draw_line_segment_mut(
            &mut self.image,
            (from.x as f32, from.y as f32),
            (to.x as f32, to.y as f32),
            opaque(color),
        );
    }

    fn draw_point(&mut self, at: ScreenPoint, color: Color) {
        let (x, y) = (at.x.round(), at.y.round());
        if x >= 0.0 && y >= 0.0 && x < self.image.width() as f64 && y < self.image.height() as f64 {
            self.image.put_pixel(x as u32, y as u32, opaque(color));
        }
    }

    fn draw_polygon(&mut self, points: &[ScreenPoint], fill: Color) {
        fill_outline(&mut self.image, points, opaque(fill));
    }

    fn draw_shape(&mut self, outlines: &[Vec<ScreenPoint>], fill: Color) {
        let (width, height) = (self.image.width(), self.image.height());
        let mut parity = GrayImage::new(width, height);
        for outline in outlines {
            let mut inside = GrayImage::new(width, height);
            fill_outline(&mut inside, outline, Luma([1]));
            for (odd, covered) in parity.pixels_mut().zip(inside.pixels()) {
                odd.0[0] ^= covered.0[0];
            }
        }
        let color = opaque(fill);
        for (x, y, odd) in parity.enumerate_pixels() {
            if odd.0[0] != 0 {
                self.image.put_pixel(x, y, color);
            }
        }
    }

    fn draw_ellipse(&mut self, center: ScreenPoint, radius: f64, outline: Color) {
        let center = pixel_point(center);
        let radius = radius.round().max(1.0) as i32;
        draw_hollow_circle_mut(&mut self.image, (center.x, center.y), radius, opaque(outline));
    }

    fn paste(&mut self, other: &Self, top_left: (i32, i32)) {
        imageops::overlay(&mut self.image, &other.image, top_left.0 as i64, top_left.1 as i64);
    }

    fn save(&self, path: &Path, format: OutputFormat) -> Result<()> {
        let format = match format {
            OutputFormat::Png => ImageFormat::Png,
            OutputFormat::Bmp => ImageFormat::Bmp,
            OutputFormat::Jpeg => ImageFormat::Jpeg,
            OutputFormat::Svg => bail!(ErrorKind::UnsupportedFormat("svg from a raster canvas".to_owned())),
        };
        // None of the formats need alpha, and JPEG can't have it
        let flattened = DynamicImage::ImageRgba8(self.image.clone()).to_rgb8();
        write_atomically(path, |temp| {
            flattened.save_with_format(temp, format)?;
            Ok(())
        })
    }
}
