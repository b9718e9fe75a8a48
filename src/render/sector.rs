use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use ::errors::{Error, ErrorKind};
use ::geom::{BoundingBox, Point, ScreenPoint};
use ::map::{Handle, Line, Map, Sector, SectorAdjacency, Vertex};
use super::canvas::Canvas;
use super::color::{sector_color, Color};
use super::transform::LinearTransform;

/// How a sector's outline is pieced together from its lines.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PolygonStrategy {
    /// The start vertex of every line bordering the sector, in line order.  Fast and usually close
    /// enough, but sectors with several outlines (pillars, courtyards, detached pieces) come out
    /// as a tangle.
    StartVertices,
    /// Follows lines end to end to recover each closed outline separately.  Lines with the same
    /// sector on both sides don't bound anything and are skipped.
    TracedLoops,
}

impl fmt::Display for PolygonStrategy {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match *self {
            PolygonStrategy::StartVertices => "start-vertices",
            PolygonStrategy::TracedLoops => "traced",
        })
    }
}

impl FromStr for PolygonStrategy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "start-vertices" | "vertices" => Ok(PolygonStrategy::StartVertices),
            "traced" | "loops" => Ok(PolygonStrategy::TracedLoops),
            _ => Err(ErrorKind::Msg(format!("unknown polygon strategy '{}'", s)).into()),
        }
    }
}

/// The filled shape of one sector, in level space.
pub struct SectorPolygon {
    pub sector: Handle<Sector>,
    pub color: Color,
    /// Each outline is implicitly closed.  Empty for a sector no line refers to.
    pub outlines: Vec<Vec<Point>>,
}

impl SectorPolygon {
    pub fn is_empty(&self) -> bool {
        self.outlines.iter().all(|outline| outline.is_empty())
    }

    pub fn bbox(&self) -> Option<BoundingBox> {
        BoundingBox::from_points(self.outlines.iter().flat_map(|outline| outline.iter().cloned()))
    }

    /// Draws the sector onto a transparent canvas just big enough to hold it, at the same scale
    /// as `global`.  Returns the canvas and where its top-left corner goes in the global image, or
    /// `None` if there's nothing to draw.
    pub fn rasterize<C: Canvas>(&self, global: &LinearTransform) -> Option<(C, (i32, i32))> {
        let bbox = self.bbox()?;
        let (local, offset) = global.local(&bbox, 1);
        let mut canvas = C::create(local.width(), local.height(), None);
        let mut outlines: Vec<Vec<ScreenPoint>> = self.outlines.iter()
            .map(|outline| outline.iter().map(|&p| local.map_to_screen(p)).collect())
            .collect();
        if outlines.len() == 1 {
            canvas.draw_polygon(&outlines.remove(0), self.color);
        }
        else {
            // a loop inside another is a pillar or courtyard, and should come out as a hole
            canvas.draw_shape(&outlines, self.color);
        }
        Some((canvas, offset))
    }
}

/// Builds one sector's polygon from the lines bordering it.
pub fn build(map: &Map, adjacency: &SectorAdjacency, sector: Handle<Sector>, strategy: PolygonStrategy) -> SectorPolygon {
    let lines = adjacency.lines(sector);
    let outlines = match strategy {
        PolygonStrategy::StartVertices => {
            if lines.is_empty() {
                Vec::new()
            }
            else {
                vec![lines.iter().map(|&h| map.vertex(map.line(h).start).point()).collect()]
            }
        }
        PolygonStrategy::TracedLoops => trace_outlines(map, lines),
    };
    SectorPolygon {
        sector,
        color: sector_color(sector.index()),
        outlines,
    }
}

fn trace_outlines(map: &Map, lines: &[Handle<Line>]) -> Vec<Vec<Point>> {
    // Deduplicate, and throw out lines with this sector on both sides
    let mut edges: Vec<(Handle<Vertex>, Handle<Vertex>)> = Vec::new();
    let mut seen_lines = Vec::with_capacity(lines.len());
    for &handle in lines {
        if seen_lines.contains(&handle) {
            // second appearance means both sides face this sector
            if let Some(i) = edges.iter().position(|&(a, b)| (a, b) == map.line(handle).vertex_indices()) {
                edges.remove(i);
            }
            continue;
        }
        seen_lines.push(handle);
        edges.push(map.line(handle).vertex_indices());
    }

    let mut vertices_to_edges: HashMap<Handle<Vertex>, Vec<usize>> = HashMap::new();
    for (i, &(v0, v1)) in edges.iter().enumerate() {
        vertices_to_edges.entry(v0).or_insert_with(Vec::new).push(i);
        vertices_to_edges.entry(v1).or_insert_with(Vec::new).push(i);
    }

    // Walk from the first unused edge until we come back around, or run out of road
    let mut used = vec![false; edges.len()];
    let mut outlines = Vec::new();
    while let Some(first) = used.iter().position(|&u| !u) {
        used[first] = true;
        let (start, mut current) = edges[first];
        let mut outline = vec![map.vertex(start).point()];
        while current != start {
            outline.push(map.vertex(current).point());
            let next = vertices_to_edges.get(&current)
                .and_then(|candidates| candidates.iter().cloned().find(|&e| !used[e]));
            match next {
                Some(e) => {
                    used[e] = true;
                    let (v0, v1) = edges[e];
                    current = if v0 == current { v1 } else { v0 };
                }
                // Unclosed; fill whatever we got
                None => break,
            }
        }
        outlines.push(outline);
    }
    outlines
}


#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, Rgba};
    use ::render::canvas::{DrawCall, RecordingCanvas};
    use ::render::raster::RasterCanvas;

    /// A 256x256 room (sector 0) with a 64x64 pillar in the middle, a second room (sector 1) off
    /// to the east sharing one line, and an unused sector 2.
    fn courtyard() -> Map {
        let mut map = Map::new();
        let room = map.add_sector(0, 128);
        let annex = map.add_sector(16, 128);
        map.add_sector(0, 0);

        let corners = [(0.0, 0.0), (256.0, 0.0), (256.0, 256.0), (0.0, 256.0)];
        let outer: Vec<_> = corners.iter().map(|&(x, y)| map.add_vertex(x, y)).collect();
        let pillar: Vec<_> = corners.iter().map(|&(x, y)| map.add_vertex(96.0 + x / 4.0, 96.0 + y / 4.0)).collect();
        let east = [map.add_vertex(384.0, 0.0), map.add_vertex(384.0, 256.0)];

        let wall = |map: &mut Map, v0: Handle<Vertex>, v1: Handle<Vertex>, front: Handle<Sector>, back: Option<Handle<Sector>>| {
            let line = map.add_line(v0, v1);
            let side = map.add_side(front);
            map.line_mut(line).front = Some(side);
            if let Some(back) = back {
                let side = map.add_side(back);
                map.line_mut(line).back = Some(side);
            }
        };
        wall(&mut map, outer[0], outer[1], room, None);
        wall(&mut map, outer[1], outer[2], room, Some(annex));
        wall(&mut map, outer[2], outer[3], room, None);
        wall(&mut map, outer[3], outer[0], room, None);
        // pillar faces outwards, into the room
        for i in 0..4 {
            wall(&mut map, pillar[(i + 1) % 4], pillar[i], room, None);
        }
        wall(&mut map, outer[1], east[0], annex, None);
        wall(&mut map, east[0], east[1], annex, None);
        wall(&mut map, east[1], outer[2], annex, None);
        map
    }

    #[test]
    fn start_vertices_follow_line_order() {
        let map = courtyard();
        let adjacency = map.sector_adjacency();
        let polygon = build(&map, &adjacency, 1.into(), PolygonStrategy::StartVertices);
        assert_eq!(polygon.outlines, vec![vec![
            Point::new(256.0, 0.0),
            Point::new(256.0, 0.0),
            Point::new(384.0, 0.0),
            Point::new(384.0, 256.0),
        ]]);

        // the room's pillar gets mixed into its outline
        let polygon = build(&map, &adjacency, 0.into(), PolygonStrategy::StartVertices);
        assert_eq!(polygon.outlines.len(), 1);
        assert_eq!(polygon.outlines[0].len(), 8);
    }

    #[test]
    fn traced_loops_separate_outlines() {
        let map = courtyard();
        let adjacency = map.sector_adjacency();
        let polygon = build(&map, &adjacency, 0.into(), PolygonStrategy::TracedLoops);
        assert_eq!(polygon.outlines.len(), 2);
        assert_eq!(polygon.outlines[0], vec![
            Point::new(0.0, 0.0),
            Point::new(256.0, 0.0),
            Point::new(256.0, 256.0),
            Point::new(0.0, 256.0),
        ]);
        assert_eq!(polygon.outlines[1].len(), 4);
        assert!(polygon.outlines[1].iter().all(|p| p.x >= 96.0 && p.x <= 160.0));

        let polygon = build(&map, &adjacency, 1.into(), PolygonStrategy::TracedLoops);
        assert_eq!(polygon.outlines.len(), 1);
        assert_eq!(polygon.outlines[0].len(), 4);
    }

    #[test]
    fn self_referencing_lines_are_skipped() {
        let mut map = Map::new();
        let sector = map.add_sector(0, 64);
        let v: Vec<_> = [(0.0, 0.0), (64.0, 0.0), (64.0, 64.0), (0.0, 64.0)].iter()
            .map(|&(x, y)| map.add_vertex(x, y))
            .collect();
        for i in 0..4 {
            let line = map.add_line(v[i], v[(i + 1) % 4]);
            let side = map.add_side(sector);
            map.line_mut(line).front = Some(side);
        }
        // a diagonal with the same sector on both sides
        let line = map.add_line(v[0], v[2]);
        let (front, back) = (map.add_side(sector), map.add_side(sector));
        map.line_mut(line).front = Some(front);
        map.line_mut(line).back = Some(back);

        let adjacency = map.sector_adjacency();
        let traced = build(&map, &adjacency, sector, PolygonStrategy::TracedLoops);
        assert_eq!(traced.outlines.len(), 1);
        assert_eq!(traced.outlines[0].len(), 4);

        // the naive outline keeps both references
        let naive = build(&map, &adjacency, sector, PolygonStrategy::StartVertices);
        assert_eq!(naive.outlines[0].len(), 6);
    }

    #[test]
    fn empty_sector_draws_nothing() {
        let map = courtyard();
        let adjacency = map.sector_adjacency();
        let transform = LinearTransform::new(&map.bbox().unwrap(), 100, 100, 0.0).unwrap();
        for &strategy in [PolygonStrategy::StartVertices, PolygonStrategy::TracedLoops].iter() {
            let polygon = build(&map, &adjacency, 2.into(), strategy);
            assert!(polygon.is_empty());
            assert!(polygon.bbox().is_none());
            assert!(polygon.rasterize::<RecordingCanvas>(&transform).is_none());
        }
    }

    #[test]
    fn colors_come_from_the_palette() {
        let map = courtyard();
        let adjacency = map.sector_adjacency();
        for i in 0..3 {
            let polygon = build(&map, &adjacency, i.into(), PolygonStrategy::StartVertices);
            assert_eq!(polygon.color, sector_color(i));
        }
    }

    #[test]
    fn rasterized_pieces_line_up_with_the_full_image() {
        let map = courtyard();
        let adjacency = map.sector_adjacency();
        let transform = LinearTransform::new(&map.bbox().unwrap(), 500, 400, 4.0).unwrap();
        let polygon = build(&map, &adjacency, 1.into(), PolygonStrategy::TracedLoops);
        let (canvas, (ox, oy)): (RecordingCanvas, _) = polygon.rasterize(&transform).unwrap();

        assert!(canvas.background.is_none());
        assert_eq!(canvas.calls.len(), 1);
        match canvas.calls[0] {
            DrawCall::Polygon(ref points, color) => {
                assert_eq!(color, polygon.color);
                for (local, level) in points.iter().zip(polygon.outlines[0].iter()) {
                    let global = transform.map_to_screen(*level);
                    assert!((local.x + ox as f64 - global.x).abs() < 1e-9);
                    assert!((local.y + oy as f64 - global.y).abs() < 1e-9);
                    assert!(local.x >= 0.0 && local.x < canvas.width as f64);
                    assert!(local.y >= 0.0 && local.y < canvas.height as f64);
                }
            }
            ref other => panic!("unexpected call {:?}", other),
        }
        let bbox: BoundingBox = polygon.bbox().unwrap();
        assert_eq!((bbox.left, bbox.right), (256.0, 384.0));
    }

    #[test]
    fn traced_pillars_stay_hollow() {
        let map = courtyard();
        let adjacency = map.sector_adjacency();
        let transform = LinearTransform::new(&map.bbox().unwrap(), 384, 256, 0.0).unwrap();
        let polygon = build(&map, &adjacency, 0.into(), PolygonStrategy::TracedLoops);

        let (recorded, _): (RecordingCanvas, _) = polygon.rasterize(&transform).unwrap();
        match recorded.calls[..] {
            [DrawCall::Shape(ref outlines, color)] => {
                assert_eq!(outlines.len(), 2);
                assert_eq!(color, polygon.color);
            }
            ref other => panic!("unexpected calls {:?}", other),
        }

        let (canvas, (ox, oy)): (RasterCanvas, _) = polygon.rasterize(&transform).unwrap();
        let pixel_at = |x: f64, y: f64| {
            let global = transform.map_to_screen(Point::new(x, y));
            let (px, py) = (global.x.round() as i32 - ox, global.y.round() as i32 - oy);
            *canvas.image().get_pixel(px as u32, py as u32)
        };
        let Rgb([r, g, b]) = polygon.color;
        assert_eq!(pixel_at(32.0, 32.0), Rgba([r, g, b, 255]));
        assert_eq!(pixel_at(200.0, 128.0), Rgba([r, g, b, 255]));
        assert_eq!(pixel_at(128.0, 128.0)[3], 0);
        assert_eq!(pixel_at(110.0, 140.0)[3], 0);
    }
}
