use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use ::archive::LevelSource;
use ::errors::{Error, ErrorKind, Result};
use ::geom::{Point, ScreenPoint};
use ::map::{Line, Map};
use super::canvas::{Canvas, OutputFormat};
use super::classify::{classify_lines, ClassifyRule};
use super::color::{Color, ColorScheme, AXIS_COLOR, LEGEND_COLOR, SEG_COLOR, UNUSED_VERTEX_COLOR};
use super::raster::RasterCanvas;
use super::sector::{self, PolygonStrategy};
use super::thing::{footprint, ThingMarker, THING_CIRCLE_PIXELS};
use super::transform::LinearTransform;
use super::vector::VectorCanvas;

/// What to draw.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RenderMode {
    /// Lines, colored by class.
    Edges,
    /// Lines in one color, plus any vertices no line uses.
    Vertices,
    /// Every sector filled with its own color.
    Sectors,
    /// Edges, plus the segs the node builder cut out of the middle of a line.  Experimental: only
    /// segs are shown, not subsectors or the partition lines.
    Nodes,
}

impl fmt::Display for RenderMode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match *self {
            RenderMode::Edges => "edges",
            RenderMode::Vertices => "vertices",
            RenderMode::Sectors => "sectors",
            RenderMode::Nodes => "nodes",
        })
    }
}

impl FromStr for RenderMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "edges" => Ok(RenderMode::Edges),
            "vertices" => Ok(RenderMode::Vertices),
            "sectors" => Ok(RenderMode::Sectors),
            "nodes" => Ok(RenderMode::Nodes),
            _ => Err(ErrorKind::Msg(format!("unknown render mode '{}'", s)).into()),
        }
    }
}

#[derive(Clone, Debug)]
pub struct RenderConfig {
    pub width: u32,
    pub height: u32,
    /// Empty space on each side, as a percentage of the image size.
    pub border_percent: f64,
    pub mode: RenderMode,
    pub scheme: ColorScheme,
    pub classify_rule: ClassifyRule,
    pub polygon_strategy: PolygonStrategy,
    pub thing_marker: ThingMarker,
    /// Draw every line five times, a pixel apart, for a bolder stroke.
    pub thick_lines: bool,
    pub draw_axis: bool,
    pub draw_legend: bool,
    pub draw_things: bool,
    /// Never draw larger than this many pixels per level unit, so small levels aren't blown up.
    pub max_scale: Option<f64>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        RenderConfig {
            width: 1000,
            height: 1000,
            border_percent: 4.0,
            mode: RenderMode::Edges,
            scheme: ColorScheme::WORLD,
            classify_rule: ClassifyRule::Action,
            polygon_strategy: PolygonStrategy::StartVertices,
            thing_marker: ThingMarker::Triangle,
            thick_lines: true,
            draw_axis: false,
            draw_legend: false,
            draw_things: false,
            max_scale: None,
        }
    }
}

/// Length of the scale legend, in level units.
pub const LEGEND_UNITS: f64 = 256.0;
/// Distance of the legend's corner from the image's bottom-left corner, in pixels.
const LEGEND_INSET: f64 = 10.0;
/// Offsets of the strokes making up a thick line.
const THICK_OFFSETS: [(f64, f64); 5] = [(0.0, 0.0), (1.0, 0.0), (-1.0, 0.0), (0.0, 1.0), (0.0, -1.0)];

/// Running average of the scales levels were fitted at.  Levels held back by `max_scale` aren't
/// counted.  Owned by the caller and threaded through each `render_to_file`.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct ScaleTally {
    levels: usize,
    pixels_per_unit: f64,
}

impl ScaleTally {
    pub fn new() -> Self {
        ScaleTally::default()
    }

    pub fn record(self, transform: &LinearTransform) -> Self {
        ScaleTally {
            levels: self.levels + 1,
            pixels_per_unit: self.pixels_per_unit + transform.scale(),
        }
    }

    pub fn levels(&self) -> usize {
        self.levels
    }

    /// Level units per pixel at the average scale, or `None` before anything's been recorded.
    pub fn average_units_per_pixel(&self) -> Option<f64> {
        if self.levels == 0 || self.pixels_per_unit <= 0.0 {
            None
        }
        else {
            Some(self.levels as f64 / self.pixels_per_unit)
        }
    }
}

/// A finished drawing, before it's been written anywhere.
pub struct Rendered<C> {
    pub canvas: C,
    pub transform: LinearTransform,
    /// Sectors no line refers to, which had nothing to fill.
    pub empty_sectors: usize,
    /// Whether `max_scale` kept the level smaller than it would have been fitted.
    pub capped: bool,
}

struct Painter<C> {
    canvas: C,
    transform: LinearTransform,
    thick: bool,
}

impl<C: Canvas> Painter<C> {
    fn stroke(&mut self, from: Point, to: Point, color: Color) {
        let a = self.transform.map_to_screen(from);
        let b = self.transform.map_to_screen(to);
        self.stroke_screen(a, b, color);
    }

    fn stroke_screen(&mut self, a: ScreenPoint, b: ScreenPoint, color: Color) {
        if self.thick {
            for &(dx, dy) in THICK_OFFSETS.iter() {
                self.canvas.draw_line(
                    ScreenPoint::new(a.x + dx, a.y + dy),
                    ScreenPoint::new(b.x + dx, b.y + dy),
                    color,
                );
            }
        }
        else {
            self.canvas.draw_line(a, b, color);
        }
    }

    fn stroke_line(&mut self, map: &Map, line: &Line, color: Color) {
        let (from, to) = map.line_points(line);
        self.stroke(from, to, color);
    }
}

/// Draws one level onto a fresh canvas.
pub fn render<C: Canvas>(map: &Map, config: &RenderConfig) -> Result<Rendered<C>> {
    let bbox = match map.bbox() {
        Some(bbox) => bbox,
        None => bail!(ErrorKind::DegenerateGeometry("level has no vertices".to_owned())),
    };
    let fitted = LinearTransform::new(&bbox, config.width, config.height, config.border_percent)?;
    let transform = match config.max_scale {
        Some(max_scale) => fitted.with_max_scale(&bbox, max_scale),
        None => fitted,
    };
    let capped = transform.scale() < fitted.scale();

    let mut painter = Painter {
        canvas: C::create(config.width, config.height, Some(config.scheme.background)),
        transform,
        thick: config.thick_lines,
    };
    let mut empty_sectors = 0;
    match config.mode {
        RenderMode::Edges => draw_edges(&mut painter, map, config),
        RenderMode::Vertices => draw_vertices(&mut painter, map, config),
        RenderMode::Sectors => empty_sectors = draw_sectors(&mut painter, map, config),
        RenderMode::Nodes => draw_nodes(&mut painter, map, config),
    }
    if config.draw_things {
        draw_things(&mut painter, map, config);
    }
    if config.draw_axis {
        draw_axis(&mut painter);
    }
    if config.draw_legend {
        draw_legend(&mut painter);
    }

    Ok(Rendered {
        canvas: painter.canvas,
        transform,
        empty_sectors,
        capped,
    })
}

fn draw_edges<C: Canvas>(painter: &mut Painter<C>, map: &Map, config: &RenderConfig) {
    for (handle, class) in classify_lines(map, config.classify_rule) {
        let color = config.scheme.color(class.class);
        painter.stroke_line(map, map.line(handle), color);
    }
}

fn draw_vertices<C: Canvas>(painter: &mut Painter<C>, map: &Map, config: &RenderConfig) {
    for line in map.iter_lines() {
        painter.stroke_line(map, line, config.scheme.wall);
    }
    for handle in map.unused_vertices() {
        let at = painter.transform.map_to_screen(map.vertex(handle).point());
        painter.canvas.draw_point(at, UNUSED_VERTEX_COLOR);
        painter.canvas.draw_ellipse(at, 2.0, UNUSED_VERTEX_COLOR);
    }
}

fn draw_sectors<C: Canvas>(painter: &mut Painter<C>, map: &Map, config: &RenderConfig) -> usize {
    let adjacency = map.sector_adjacency();
    let mut empty = 0;
    for s in 0..map.sector_count() {
        let polygon = sector::build(map, &adjacency, s.into(), config.polygon_strategy);
        if polygon.is_empty() {
            warn!("sector {} has no lines, so there's nothing to fill", s);
            empty += 1;
            continue;
        }
        if let Some((piece, top_left)) = polygon.rasterize::<C>(&painter.transform) {
            painter.canvas.paste(&piece, top_left);
        }
    }
    empty
}

fn draw_nodes<C: Canvas>(painter: &mut Painter<C>, map: &Map, config: &RenderConfig) {
    draw_edges(painter, map, config);
    if map.iter_segs().next().is_none() {
        warn!("level has no segs; has it been through a node builder?");
    }
    for seg in map.iter_segs() {
        if seg.is_split(map.line(seg.line)) {
            let from = map.vertex(seg.start).point();
            let to = map.vertex(seg.end).point();
            painter.stroke(from, to, SEG_COLOR);
        }
    }
}

fn draw_things<C: Canvas>(painter: &mut Painter<C>, map: &Map, config: &RenderConfig) {
    let color = config.scheme.thing;
    for thing in map.iter_things() {
        match config.thing_marker {
            ThingMarker::Triangle => {
                for &(from, to) in footprint(thing.point(), thing.angle()).iter() {
                    painter.stroke(from, to, color);
                }
            }
            ThingMarker::Circle => {
                let at = painter.transform.map_to_screen(thing.point());
                painter.canvas.draw_ellipse(at, THING_CIRCLE_PIXELS as f64, color);
            }
        }
    }
}

/// Two lines through the level's origin, across the whole image.
fn draw_axis<C: Canvas>(painter: &mut Painter<C>) {
    let origin = painter.transform.map_to_screen(Point::new(0.0, 0.0));
    let (width, height) = (painter.canvas.width() as f64, painter.canvas.height() as f64);
    painter.stroke_screen(ScreenPoint::new(0.0, origin.y), ScreenPoint::new(width, origin.y), AXIS_COLOR);
    painter.stroke_screen(ScreenPoint::new(origin.x, 0.0), ScreenPoint::new(origin.x, height), AXIS_COLOR);
}

/// A right angle in the bottom-left corner, each arm `LEGEND_UNITS` long.
fn draw_legend<C: Canvas>(painter: &mut Painter<C>) {
    let length = LEGEND_UNITS * painter.transform.scale();
    let corner = ScreenPoint::new(LEGEND_INSET, painter.canvas.height() as f64 - LEGEND_INSET);
    painter.stroke_screen(corner, ScreenPoint::new(corner.x + length, corner.y), LEGEND_COLOR);
    painter.stroke_screen(corner, ScreenPoint::new(corner.x, corner.y - length), LEGEND_COLOR);
}

/// Renders a level and writes it to `path`, picking a raster or vector canvas to suit `format`.
/// Returns `tally` with this level's scale added, unless the level was capped.
pub fn render_to_file(map: &Map, config: &RenderConfig, path: &Path, format: OutputFormat, tally: ScaleTally) -> Result<ScaleTally> {
    let (transform, capped) = if format.is_vector() {
        let rendered = render::<VectorCanvas>(map, config)?;
        rendered.canvas.save(path, format)?;
        (rendered.transform, rendered.capped)
    }
    else {
        let rendered = render::<RasterCanvas>(map, config)?;
        rendered.canvas.save(path, format)?;
        (rendered.transform, rendered.capped)
    };
    info!("wrote {} at {:.2} units per pixel", path.display(), 1.0 / transform.scale());
    if capped {
        debug!("{} hit the scale limit, so it's left out of the average", path.display());
        return Ok(tally);
    }
    Ok(tally.record(&transform))
}

/// Where a level's image goes: `<stem>_<LEVEL>.<ext>` in `dir`.
pub fn output_path(dir: &Path, stem: &str, level: &str, format: OutputFormat) -> PathBuf {
    dir.join(format!("{}_{}.{}", stem, level, format.extension()))
}

/// How one level in a batch went.
pub struct LevelOutcome {
    pub name: String,
    pub path: PathBuf,
    pub result: Result<()>,
}

/// Renders several levels, one file each.  A level that fails is logged and recorded, and the
/// rest carry on regardless.
pub fn render_batch<S, F>(
    source: &S,
    names: &[String],
    config: &RenderConfig,
    format: OutputFormat,
    mut path_for: F,
    mut tally: ScaleTally,
) -> (Vec<LevelOutcome>, ScaleTally)
where
    S: LevelSource + ?Sized,
    F: FnMut(&str) -> PathBuf,
{
    let mut outcomes = Vec::with_capacity(names.len());
    for name in names {
        let path = path_for(name);
        let result = source.load_level(name)
            .and_then(|map| render_to_file(&map, config, &path, format, tally));
        let result = match result {
            Ok(new_tally) => {
                tally = new_tally;
                Ok(())
            }
            Err(err) => {
                error!("couldn't draw {}: {}", name, err);
                Err(err)
            }
        };
        outcomes.push(LevelOutcome { name: name.clone(), path, result });
    }
    (outcomes, tally)
}
