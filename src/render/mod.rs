//! Drawing levels as automap images.
//!
//! Level coordinates go through a `LinearTransform` into pixels; lines are colored by
//! `classify`, sectors filled by `sector`, things marked by `thing`, and the whole lot drawn onto
//! whatever `Canvas` the caller picks.

pub mod canvas;
pub mod classify;
pub mod color;
pub mod pipeline;
pub mod raster;
pub mod sector;
pub mod thing;
pub mod transform;
pub mod vector;

pub use self::canvas::{Canvas, OutputFormat};
pub use self::classify::ClassifyRule;
pub use self::color::{ColorClass, ColorScheme};
pub use self::pipeline::{output_path, render, render_batch, render_to_file, LevelOutcome, RenderConfig, RenderMode, Rendered, ScaleTally};
pub use self::raster::RasterCanvas;
pub use self::sector::PolygonStrategy;
pub use self::thing::ThingMarker;
pub use self::transform::LinearTransform;
pub use self::vector::VectorCanvas;
