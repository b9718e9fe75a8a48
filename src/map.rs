use std::collections::HashSet;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

use std;

use super::errors::{ErrorKind, Result};
use super::geom::{BoundingBox, Coord, Point};
use super::parse::map::{BareBinaryLine, BareBinaryMap, BareBinaryThing, BareMap};
use super::parse::util::optional_index;


#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MapFormat {
    Doom,
    Hexen,
    UDMF,
}

/// Name of a vanilla map slot.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum MapName {
    ExMy(u8, u8),
    MAPxx(u8),
}

impl fmt::Display for MapName {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            MapName::ExMy(e, m) => write!(f, "E{}M{}", e, m),
            MapName::MAPxx(xx) => write!(f, "MAP{:02}", xx),
        }
    }
}

bitflags! {
    /// Linedef flags shared by Doom and Hexen.  Hexen reuses the high bits for activation type,
    /// which we don't care about.
    pub struct LineFlags: u16 {
        const BLOCKS_PLAYERS = 0x0001;
        const BLOCKS_MONSTERS = 0x0002;
        const TWO_SIDED = 0x0004;
        const UPPER_UNPEGGED = 0x0008;
        const LOWER_UNPEGGED = 0x0010;
        /// Drawn as a solid wall on the automap
        const SECRET = 0x0020;
        const BLOCKS_SOUND = 0x0040;
        const NEVER_ON_AUTOMAP = 0x0080;
        const ALWAYS_ON_AUTOMAP = 0x0100;
    }
}


/// A level, independent of whatever format it was loaded from.  Everything refers to everything
/// else by `Handle`, which is just an index into the owning `Map`.
pub struct Map {
    lines: Vec<Line>,
    sides: Vec<Side>,
    sectors: Vec<Sector>,
    things: Vec<Thing>,
    vertices: Vec<Vertex>,
    segs: Vec<Seg>,
}

impl Map {
    pub fn new() -> Self {
        return Map {
            lines: Vec::new(),
            sides: Vec::new(),
            sectors: Vec::new(),
            things: Vec::new(),
            vertices: Vec::new(),
            segs: Vec::new(),
        };
    }

    pub fn from_bare_map(bare_map: &BareMap) -> Result<Self> {
        match *bare_map {
            BareMap::Doom(ref map) => Map::from_bare(map),
            BareMap::Hexen(ref map) => Map::from_bare(map),
        }
    }

    /// Converts a freshly-parsed map, checking that every cross-reference actually points at
    /// something.
    pub fn from_bare<L: BareBinaryLine, T: BareBinaryThing>(bare_map: &BareBinaryMap<L, T>) -> Result<Self> {
        let mut map = Map::new();
        for bare_sector in bare_map.sectors.iter() {
            map.add_sector(bare_sector.floor_height as i32, bare_sector.ceiling_height as i32);
        }
        for bare_vertex in bare_map.vertices.iter() {
            map.add_vertex(bare_vertex.x as f64, bare_vertex.y as f64);
        }
        for (i, bare_side) in bare_map.sides.iter().enumerate() {
            let sector = map.checked_handle("sidedef", i, bare_side.sector, map.sectors.len())?;
            map.add_side(sector);
        }
        for (i, bare_line) in bare_map.lines.iter().enumerate() {
            let (v0, v1) = bare_line.vertex_indices();
            let start = map.checked_handle("linedef", i, v0, map.vertices.len())?;
            let end = map.checked_handle("linedef", i, v1, map.vertices.len())?;
            let (frontid, backid) = bare_line.side_indices();
            let front = map.optional_handle("linedef", i, frontid, map.sides.len())?;
            let back = map.optional_handle("linedef", i, backid, map.sides.len())?;

            let handle = map.add_line(start, end);
            let line = map.line_mut(handle);
            line.flags = LineFlags::from_bits_truncate(bare_line.flags() as u16);
            line.special = bare_line.special();
            line.front = front;
            line.back = back;
        }
        for bare_thing in bare_map.things.iter() {
            let (x, y) = bare_thing.coords();
            map.add_thing(x as Coord, y as Coord, bare_thing.angle() as f64, bare_thing.doomednum() as u32);
        }
        for (i, bare_seg) in bare_map.segs.iter().enumerate() {
            let start = map.checked_handle("seg", i, bare_seg.v0, map.vertices.len())?;
            let end = map.checked_handle("seg", i, bare_seg.v1, map.vertices.len())?;
            let line = map.checked_handle("seg", i, bare_seg.line, map.lines.len())?;
            let facing = if bare_seg.direction == 0 { Facing::Front } else { Facing::Back };
            map.add_seg(start, end, line, facing);
        }

        return Ok(map);
    }

    fn optional_handle<T>(&self, what: &'static str, index: usize, value: i16, len: usize) -> Result<Option<Handle<T>>> {
        match optional_index(value) {
            None => Ok(None),
            Some(i) if i < len => Ok(Some(i.into())),
            Some(_) => Err(ErrorKind::BadIndex(what, index, value as isize).into()),
        }
    }

    fn checked_handle<T>(&self, what: &'static str, index: usize, value: i16, len: usize) -> Result<Handle<T>> {
        match self.optional_handle(what, index, value, len)? {
            Some(handle) => Ok(handle),
            None => Err(ErrorKind::BadIndex(what, index, value as isize).into()),
        }
    }

    pub fn add_sector(&mut self, floor_height: i32, ceiling_height: i32) -> Handle<Sector> {
        self.sectors.push(Sector{ floor_height, ceiling_height });
        return (self.sectors.len() - 1).into();
    }
    pub fn add_side(&mut self, sector: Handle<Sector>) -> Handle<Side> {
        self.sides.push(Side{ sector });
        return (self.sides.len() - 1).into();
    }
    pub fn add_vertex(&mut self, x: f64, y: f64) -> Handle<Vertex> {
        self.vertices.push(Vertex{ x, y });
        return (self.vertices.len() - 1).into();
    }
    pub fn add_line(&mut self, start: Handle<Vertex>, end: Handle<Vertex>) -> Handle<Line> {
        self.lines.push(Line{
            start,
            end,
            flags: LineFlags::empty(),
            special: 0,
            front: None,
            back: None,
        });
        return (self.lines.len() - 1).into();
    }
    pub fn add_thing(&mut self, x: Coord, y: Coord, angle: f64, doomednum: u32) -> Handle<Thing> {
        self.things.push(Thing{
            point: Point::new(x, y),
            angle,
            doomednum,
        });
        return (self.things.len() - 1).into();
    }
    pub fn add_seg(&mut self, start: Handle<Vertex>, end: Handle<Vertex>, line: Handle<Line>, facing: Facing) -> Handle<Seg> {
        self.segs.push(Seg{ start, end, line, facing });
        return (self.segs.len() - 1).into();
    }

    pub fn sector_mut(&mut self, handle: Handle<Sector>) -> &mut Sector {
        &mut self.sectors[handle.0]
    }
    pub fn line_mut(&mut self, handle: Handle<Line>) -> &mut Line {
        &mut self.lines[handle.0]
    }

    pub fn iter_lines(&self) -> std::slice::Iter<Line> {
        return self.lines.iter();
    }
    pub fn iter_things(&self) -> std::slice::Iter<Thing> {
        return self.things.iter();
    }
    pub fn iter_segs(&self) -> std::slice::Iter<Seg> {
        return self.segs.iter();
    }

    /// Every line, paired with its handle.
    pub fn enumerate_lines<'a>(&'a self) -> impl Iterator<Item=(Handle<Line>, &'a Line)> + 'a {
        self.lines.iter().enumerate().map(|(i, line)| (Handle::from(i), line))
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }
    pub fn sector_count(&self) -> usize {
        self.sectors.len()
    }

    pub fn vertex(&self, handle: Handle<Vertex>) -> &Vertex {
        return &self.vertices[handle.0];
    }
    pub fn line(&self, handle: Handle<Line>) -> &Line {
        return &self.lines[handle.0];
    }
    pub fn side(&self, handle: Handle<Side>) -> &Side {
        return &self.sides[handle.0];
    }
    pub fn sector(&self, handle: Handle<Sector>) -> &Sector {
        return &self.sectors[handle.0];
    }

    /// Start and end points of a line.
    pub fn line_points(&self, line: &Line) -> (Point, Point) {
        (self.vertex(line.start).point(), self.vertex(line.end).point())
    }

    /// Sectors on the front and back of a line, whichever exist.
    pub fn line_sectors(&self, line: &Line) -> (Option<&Sector>, Option<&Sector>) {
        let front = line.front.map(|h| self.sector(self.side(h).sector));
        let back = line.back.map(|h| self.sector(self.side(h).sector));
        (front, back)
    }

    /// Extent of every vertex in the map, or `None` for a map with no vertices.
    pub fn bbox(&self) -> Option<BoundingBox> {
        // TODO things can sit outside the outermost walls, and currently get clipped
        BoundingBox::from_points(self.vertices.iter().map(|v| v.point()))
    }

    /// Groups lines by the sectors they border.  A line with both sides in the same sector
    /// appears twice in that sector's list.
    pub fn sector_adjacency(&self) -> SectorAdjacency {
        let mut lines_by_sector = vec![Vec::new(); self.sectors.len()];
        for (handle, line) in self.enumerate_lines() {
            for side in line.front.iter().chain(line.back.iter()) {
                lines_by_sector[self.side(*side).sector.0].push(handle);
            }
        }
        SectorAdjacency{ lines_by_sector }
    }

    /// Vertices that no linedef starts or ends at.  Usually leftovers from the node builder.
    pub fn unused_vertices(&self) -> Vec<Handle<Vertex>> {
        let used: HashSet<_> = self.lines.iter()
            .flat_map(|line| vec![line.start, line.end])
            .collect();
        (0..self.vertices.len())
            .map(Handle::from)
            .filter(|handle| !used.contains(handle))
            .collect()
    }
}

/// Which lines border each sector, in line order.  Only valid for the map that produced it.
pub struct SectorAdjacency {
    lines_by_sector: Vec<Vec<Handle<Line>>>,
}

impl SectorAdjacency {
    pub fn lines(&self, sector: Handle<Sector>) -> &[Handle<Line>] {
        match self.lines_by_sector.get(sector.0) {
            Some(lines) => lines,
            None => &[],
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Facing {
    Front,
    Back,
}

pub struct Handle<T>(usize, PhantomData<fn() -> T>);

impl<T> Handle<T> {
    pub fn index(&self) -> usize {
        self.0
    }
}

// Implemented by hand because the auto-generated impls assume T must implement the same traits,
// but we don't actually own a T.
impl<T> Clone for Handle<T> {
    fn clone(&self) -> Self {
        return Handle(self.0, PhantomData);
    }
}

impl<T> Copy for Handle<T> {}

impl<T> PartialEq for Handle<T> {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl<T> Eq for Handle<T> {}

impl<T> Hash for Handle<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.hash(state)
    }
}

impl<T> fmt::Debug for Handle<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Handle({})", self.0)
    }
}

impl<T> From<usize> for Handle<T> {
    fn from(index: usize) -> Self {
        return Handle(index, PhantomData);
    }
}

pub struct Thing {
    point: Point,
    angle: f64,
    doomednum: u32,
}

impl Thing {
    pub fn point(&self) -> Point {
        return self.point;
    }

    /// Facing, in degrees counter-clockwise from east.
    pub fn angle(&self) -> f64 {
        return self.angle;
    }

    pub fn doomednum(&self) -> u32 {
        return self.doomednum;
    }
}

pub struct Line {
    pub start: Handle<Vertex>,
    pub end: Handle<Vertex>,
    pub flags: LineFlags,
    pub special: u32,
    pub front: Option<Handle<Side>>,
    pub back: Option<Handle<Side>>,
}

impl Line {
    pub fn vertex_indices(&self) -> (Handle<Vertex>, Handle<Vertex>) {
        return (self.start, self.end);
    }

    pub fn side_indices(&self) -> (Option<Handle<Side>>, Option<Handle<Side>>) {
        return (self.front, self.back);
    }

    pub fn has_special(&self) -> bool {
        return self.special != 0;
    }

    /// Whether the TWO_SIDED flag is set.  Not quite the same as having a back side, though
    /// vanilla maps rarely disagree.
    pub fn is_two_sided(&self) -> bool {
        return self.flags.contains(LineFlags::TWO_SIDED);
    }

    pub fn has_back(&self) -> bool {
        return self.back.is_some();
    }

    pub fn touches(&self, vertex: Handle<Vertex>) -> bool {
        self.start == vertex || self.end == vertex
    }
}

pub struct Sector {
    pub floor_height: i32,
    pub ceiling_height: i32,
}

pub struct Side {
    pub sector: Handle<Sector>,
}

pub struct Vertex {
    pub x: f64,
    pub y: f64,
}

impl Vertex {
    pub fn point(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// A piece of a linedef produced by the node builder.
pub struct Seg {
    pub start: Handle<Vertex>,
    pub end: Handle<Vertex>,
    pub line: Handle<Line>,
    pub facing: Facing,
}

impl Seg {
    /// True if the node builder cut this seg out of the middle of its line, rather than the seg
    /// spanning the whole line.
    pub fn is_split(&self, line: &Line) -> bool {
        !line.touches(self.start) || !line.touches(self.end)
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use ::parse::map::{BareDoomLine, BareDoomMap, BareDoomThing, BareSector, BareSeg, BareSide, BareVertex};

    fn side(sector: i16) -> BareSide<'static> {
        BareSide{ x_offset: 0, y_offset: 0, upper_texture: "-", lower_texture: "-", middle_texture: "-", sector }
    }

    fn sector(floor_height: i16, ceiling_height: i16) -> BareSector<'static> {
        BareSector{
            floor_height,
            ceiling_height,
            floor_texture: "FLAT1",
            ceiling_texture: "FLAT1",
            light: 160,
            sector_type: 0,
            sector_tag: 0,
        }
    }

    fn line(v0: i16, v1: i16, front_sidedef: i16, back_sidedef: i16) -> BareDoomLine {
        let flags = if back_sidedef == -1 { 0x0001 } else { 0x0004 };
        BareDoomLine{ v0, v1, flags, special: 0, sector_tag: 0, front_sidedef, back_sidedef }
    }

    fn two_rooms() -> BareDoomMap<'static> {
        BareDoomMap{
            vertices: vec![
                BareVertex{ x: 0, y: 0 },
                BareVertex{ x: 64, y: 0 },
                BareVertex{ x: 64, y: 64 },
                BareVertex{ x: 0, y: 64 },
                BareVertex{ x: 128, y: 0 },
                BareVertex{ x: 128, y: 64 },
                BareVertex{ x: 500, y: 500 },
            ],
            sectors: vec![sector(0, 128), sector(24, 128)],
            sides: vec![side(0), side(0), side(0), side(0), side(1), side(1), side(1), side(1)],
            lines: vec![
                line(0, 1, 0, -1),
                line(1, 2, 1, 4),
                line(2, 3, 2, -1),
                line(3, 0, 3, -1),
                line(1, 4, 5, -1),
                line(4, 5, 6, -1),
                line(5, 2, 7, -1),
            ],
            things: vec![BareDoomThing{ x: 32, y: 32, angle: 90, doomednum: 1, flags: 7 }],
            segs: vec![
                BareSeg{ v0: 0, v1: 1, angle: 0, line: 0, direction: 0, offset: 0 },
                BareSeg{ v0: 6, v1: 1, angle: 0, line: 4, direction: 0, offset: 16 },
            ],
        }
    }

    #[test]
    fn converts_bare_map() {
        let map = Map::from_bare(&two_rooms()).unwrap();
        assert_eq!(map.line_count(), 7);
        assert_eq!(map.sector_count(), 2);

        let shared = map.line(1.into());
        assert!(shared.is_two_sided());
        assert!(shared.has_back());
        let (front, back) = map.line_sectors(shared);
        assert_eq!(front.unwrap().floor_height, 0);
        assert_eq!(back.unwrap().floor_height, 24);

        let thing = map.iter_things().next().unwrap();
        assert_eq!(thing.angle(), 90.0);
        assert_eq!(thing.point(), Point::new(32.0, 32.0));
    }

    #[test]
    fn rejects_dangling_references() {
        let mut bare = two_rooms();
        bare.lines.push(line(0, 42, 0, -1));
        let err = Map::from_bare(&bare).err().unwrap();
        match *err.kind() {
            ErrorKind::BadIndex("linedef", 7, 42) => {}
            ref other => panic!("unexpected error {:?}", other),
        }

        let mut bare = two_rooms();
        bare.sides.push(side(5));
        assert!(Map::from_bare(&bare).is_err());
    }

    #[test]
    fn adjacency_follows_line_order() {
        let map = Map::from_bare(&two_rooms()).unwrap();
        let adjacency = map.sector_adjacency();
        let first: Vec<_> = adjacency.lines(0.into()).iter().map(|h| h.index()).collect();
        assert_eq!(first, vec![0, 1, 2, 3]);
        let second: Vec<_> = adjacency.lines(1.into()).iter().map(|h| h.index()).collect();
        assert_eq!(second, vec![1, 4, 5, 6]);
        assert!(adjacency.lines(9.into()).is_empty());
    }

    #[test]
    fn finds_unused_vertices() {
        let map = Map::from_bare(&two_rooms()).unwrap();
        assert_eq!(map.unused_vertices(), vec![Handle::from(6)]);
    }

    #[test]
    fn detects_split_segs() {
        let map = Map::from_bare(&two_rooms()).unwrap();
        let segs: Vec<_> = map.iter_segs().collect();
        assert!(!segs[0].is_split(map.line(segs[0].line)));
        assert!(segs[1].is_split(map.line(segs[1].line)));
    }

    #[test]
    fn bbox_spans_vertices() {
        let map = Map::from_bare(&two_rooms()).unwrap();
        let bbox = map.bbox().unwrap();
        assert_eq!((bbox.left, bbox.right, bbox.bottom, bbox.top), (0.0, 500.0, 0.0, 500.0));
        assert!(Map::new().bbox().is_none());
    }

    #[test]
    fn map_names_display() {
        assert_eq!(MapName::ExMy(2, 7).to_string(), "E2M7");
        assert_eq!(MapName::MAPxx(3).to_string(), "MAP03");
    }
}
