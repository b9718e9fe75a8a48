use std;

use super::LevelSource;
use ::errors::{ErrorKind, Result};
use ::map::{Map, MapFormat, MapName};
use ::parse::map::parse_doom_map;
use ::parse::vanilla_map_name;


/// Type of the WAD.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum WADType {
    /// full standalone game
    IWAD,
    /// patch wad, a small mod
    PWAD,
}

// TODO things to check:
// - warning: lump overlaps the directory
// - warning: lumps overlap
// - interesting: lumps have gaps
/// Low-level interface to a parsed WAD.  Lumps are borrowed straight out of the buffer.
pub struct BareWAD<'n> {
    pub buffer: &'n [u8],
    pub header: BareWADHeader,
    pub directory: Vec<BareWADDirectoryEntry<'n>>,
}

impl<'n> BareWAD<'n> {
    pub fn entry_slice(&self, index: usize) -> &[u8] {
        self.directory[index].extract_slice(self.buffer)
    }

    pub fn first_entry(&self, name: &str) -> Option<&[u8]> {
        self.directory.iter()
        .find(|entry| entry.name == name)
        .map(|entry| entry.extract_slice(self.buffer))
    }

    pub fn iter_maps(&self) -> impl Iterator<Item=WADMapEntryBlock> + '_ {
        self.iter().filter_map(|item|
            if let WADItem::Map(map_block) = item {
                Some(map_block)
            }
            else {
                None
            }
        )
    }

    /// The map block for a map name, ignoring case.  If a PWAD (foolishly) contains the same map
    /// twice, the first one wins.
    pub fn find_map(&self, name: &str) -> Option<WADMapEntryBlock> {
        self.iter_maps().find(|block| block.name.to_string().eq_ignore_ascii_case(name))
    }

    pub fn iter(&self) -> WADIterator {
        WADIterator {
            entry_iter: self.directory.iter().enumerate().peekable(),
        }
    }
}

impl<'n> LevelSource for BareWAD<'n> {
    fn level_names(&self) -> Vec<String> {
        self.iter_maps().map(|block| block.name.to_string()).collect()
    }

    fn load_level(&self, name: &str) -> Result<Map> {
        let block = self.find_map(name).ok_or_else(|| ErrorKind::UnknownLevel(name.to_owned()))?;
        let bare_map = parse_doom_map(self, &block)?;
        Map::from_bare_map(&bare_map)
    }
}

pub struct BareWADHeader {
    pub identification: WADType,
    pub numlumps: u32,
    pub infotableofs: u32,
}

#[derive(Debug)]
pub struct BareWADDirectoryEntry<'name> {
    pub filepos: u32,
    pub size: u32,
    pub name: &'name str,
}

impl<'n> BareWADDirectoryEntry<'n> {
    /// Extract the slice described by this entry from a buffer.  The parser already checked that
    /// every entry fits.
    pub fn extract_slice<'b>(&self, buf: &'b [u8]) -> &'b [u8] {
        let start = self.filepos as usize;
        let end = start + self.size as usize;
        &buf[start..end]
    }
}

// -----------------------------------------------------------------------------
// Map stuff

// Standard lumps following a binary map marker, in the order they must appear.  Which ones are
// actually required is up to the map parser.
const MAP_LUMP_ORDER: [&str; 11] = [
    "THINGS",
    "LINEDEFS",
    "SIDEDEFS",
    "VERTEXES",
    "SEGS",
    "SSECTORS",
    "NODES",
    "SECTORS",
    "REJECT",
    "BLOCKMAP",
    "BEHAVIOR",
];


pub enum WADItem<'a> {
    Map(WADMapEntryBlock),
    Entry(&'a BareWADDirectoryEntry<'a>),
}

pub struct WADIterator<'a> {
    entry_iter: std::iter::Peekable<std::iter::Enumerate<std::slice::Iter<'a, BareWADDirectoryEntry<'a>>>>,
}

impl<'a> Iterator for WADIterator<'a> {
    type Item = WADItem<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let (i, entry) = self.entry_iter.next()?;
        let map_name = match vanilla_map_name(entry.name.as_bytes()) {
            Ok((_, found_map_name)) => found_map_name,
            Err(_) => { return Some(WADItem::Entry(entry)); }
        };

        let mut range = WADMapEntryBlock::new(map_name, i);

        if let Some(&(textmap_index, next_entry)) = self.entry_iter.peek() {
            if next_entry.name == "TEXTMAP" {
                // This is a UDMF map, which has a completely different scheme: it goes until an
                // explicit ENDMAP marker
                range.format = MapFormat::UDMF;
                range.textmap_index = Some(textmap_index);
                while let Some((j, lump)) = self.entry_iter.next() {
                    range.last_index = j;
                    if lump.name == "ENDMAP" {
                        break;
                    }
                }
                return Some(WADItem::Map(range));
            }
        }

        // Use peeking here, so that if we stumble onto the next map header, we don't consume it
        for &lump_name in MAP_LUMP_ORDER.iter() {
            let (j, next_entry) = match self.entry_iter.peek() {
                Some(&next) => next,
                None => break,
            };
            // TODO i am pretty sure this is supposed to be case-insensitive?
            if next_entry.name != lump_name {
                continue;
            }
            self.entry_iter.next();
            range.last_index = j;
            match lump_name {
                "THINGS" => { range.things_index = Some(j); }
                "LINEDEFS" => { range.linedefs_index = Some(j); }
                "SIDEDEFS" => { range.sidedefs_index = Some(j); }
                "VERTEXES" => { range.vertexes_index = Some(j); }
                "SEGS" => { range.segs_index = Some(j); }
                "SSECTORS" => { range.ssectors_index = Some(j); }
                "NODES" => { range.nodes_index = Some(j); }
                "SECTORS" => { range.sectors_index = Some(j); }
                "REJECT" => { range.reject_index = Some(j); }
                "BLOCKMAP" => { range.blockmap_index = Some(j); }
                "BEHAVIOR" => {
                    range.behavior_index = Some(j);
                    // The presence of a BEHAVIOR lump is the sole indication of Hexen format
                    range.format = MapFormat::Hexen;
                }
                _ => {}
            }
        }

        Some(WADItem::Map(range))
    }
}


/// Directory indices of the lumps making up one map.  A missing required lump is only noticed
/// when the map is actually parsed.
#[derive(Debug)]
pub struct WADMapEntryBlock {
    pub format: MapFormat,
    pub name: MapName,
    pub marker_index: usize,
    pub last_index: usize,

    pub things_index: Option<usize>,
    pub linedefs_index: Option<usize>,
    pub sidedefs_index: Option<usize>,
    pub vertexes_index: Option<usize>,
    pub segs_index: Option<usize>,
    pub ssectors_index: Option<usize>,
    pub nodes_index: Option<usize>,
    pub sectors_index: Option<usize>,
    pub reject_index: Option<usize>,
    pub blockmap_index: Option<usize>,
    pub behavior_index: Option<usize>,
    pub textmap_index: Option<usize>,
}

impl WADMapEntryBlock {
    fn new(name: MapName, marker_index: usize) -> Self {
        WADMapEntryBlock{
            format: MapFormat::Doom,
            name,
            marker_index,
            last_index: marker_index,

            things_index: None,
            linedefs_index: None,
            sidedefs_index: None,
            vertexes_index: None,
            segs_index: None,
            ssectors_index: None,
            nodes_index: None,
            sectors_index: None,
            reject_index: None,
            blockmap_index: None,
            behavior_index: None,
            textmap_index: None,
        }
    }
}


/// Builds small WADs in memory, for tests elsewhere in the crate.
#[cfg(test)]
pub mod fixture {
    use byteorder::{LittleEndian, WriteBytesExt};

    use ::parse::map::{BareDoomLine, BareDoomThing, BareSector, BareSide, BareVertex};

    pub struct WADBuilder {
        lumps: Vec<(String, Vec<u8>)>,
    }

    impl WADBuilder {
        pub fn new() -> Self {
            WADBuilder{ lumps: Vec::new() }
        }

        pub fn lump(mut self, name: &str, data: Vec<u8>) -> Self {
            self.lumps.push((name.to_owned(), data));
            self
        }

        /// A one-room square map: 4 vertices at (0, 0)-(size, size), one sector, four one-sided
        /// walls, and a player start in the middle facing north.
        pub fn square_map(self, name: &str, size: i16) -> Self {
            let mut things = Vec::new();
            BareDoomThing{ x: size / 2, y: size / 2, angle: 90, doomednum: 1, flags: 7 }
                .write_to(&mut things).unwrap();

            let mut lines = Vec::new();
            for i in 0..4 {
                BareDoomLine{
                    v0: i,
                    v1: (i + 1) % 4,
                    flags: 1,
                    special: 0,
                    sector_tag: 0,
                    front_sidedef: i,
                    back_sidedef: -1,
                }.write_to(&mut lines).unwrap();
            }

            let mut sides = Vec::new();
            for _ in 0..4 {
                BareSide{
                    x_offset: 0,
                    y_offset: 0,
                    upper_texture: "-",
                    lower_texture: "-",
                    middle_texture: "STARTAN3",
                    sector: 0,
                }.write_to(&mut sides).unwrap();
            }

            let mut vertices = Vec::new();
            for &(x, y) in [(0, 0), (size, 0), (size, size), (0, size)].iter() {
                BareVertex{ x, y }.write_to(&mut vertices).unwrap();
            }

            let mut sectors = Vec::new();
            BareSector{
                floor_height: 0,
                ceiling_height: 128,
                floor_texture: "FLOOR4_8",
                ceiling_texture: "CEIL3_5",
                light: 192,
                sector_type: 0,
                sector_tag: 0,
            }.write_to(&mut sectors).unwrap();

            self.lump(name, Vec::new())
                .lump("THINGS", things)
                .lump("LINEDEFS", lines)
                .lump("SIDEDEFS", sides)
                .lump("VERTEXES", vertices)
                .lump("SECTORS", sectors)
        }

        /// Header, then lump data, then the directory.
        pub fn build(&self, magic: &[u8; 4]) -> Vec<u8> {
            let data_len: usize = self.lumps.iter().map(|&(_, ref data)| data.len()).sum();
            let mut buf = Vec::new();
            buf.extend_from_slice(magic);
            buf.write_u32::<LittleEndian>(self.lumps.len() as u32).unwrap();
            buf.write_u32::<LittleEndian>(12 + data_len as u32).unwrap();

            let mut offsets = Vec::new();
            for &(_, ref data) in self.lumps.iter() {
                offsets.push(buf.len() as u32);
                buf.extend_from_slice(data);
            }
            for (&(ref name, ref data), offset) in self.lumps.iter().zip(offsets) {
                buf.write_u32::<LittleEndian>(offset).unwrap();
                buf.write_u32::<LittleEndian>(data.len() as u32).unwrap();
                let mut padded = [0u8; 8];
                padded[..name.len()].copy_from_slice(name.as_bytes());
                buf.extend_from_slice(&padded);
            }
            buf
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use super::fixture::WADBuilder;
    use ::errors::ErrorKind;
    use ::parse::wad::parse_wad;

    #[test]
    fn parses_header_and_directory() {
        let buf = WADBuilder::new()
            .lump("PLAYPAL", vec![0; 768])
            .square_map("E1M1", 256)
            .build(b"IWAD");
        let wad = parse_wad(&buf).unwrap();
        assert_eq!(wad.header.identification, WADType::IWAD);
        assert_eq!(wad.header.numlumps, 7);
        assert_eq!(wad.directory[0].name, "PLAYPAL");
        assert_eq!(wad.first_entry("PLAYPAL").unwrap().len(), 768);
        assert_eq!(wad.first_entry("VERTEXES").unwrap().len(), 16);
        assert!(wad.first_entry("COLORMAP").is_none());
    }

    #[test]
    fn groups_map_lumps() {
        let buf = WADBuilder::new()
            .square_map("MAP01", 128)
            .lump("DEMO1", vec![1, 2, 3])
            .square_map("MAP02", 64)
            .build(b"PWAD");
        let wad = parse_wad(&buf).unwrap();
        let maps: Vec<_> = wad.iter_maps().collect();
        assert_eq!(maps.len(), 2);
        assert_eq!(maps[0].name, MapName::MAPxx(1));
        assert_eq!(maps[0].format, MapFormat::Doom);
        assert_eq!(maps[0].things_index, Some(1));
        assert_eq!(maps[0].sectors_index, Some(5));
        assert_eq!(maps[0].last_index, 5);
        assert_eq!(maps[0].segs_index, None);
        assert_eq!(maps[1].marker_index, 7);

        let entries = wad.iter().filter(|item| if let WADItem::Entry(_) = *item { true } else { false }).count();
        assert_eq!(entries, 1);
    }

    #[test]
    fn detects_udmf() {
        let buf = WADBuilder::new()
            .lump("MAP01", Vec::new())
            .lump("TEXTMAP", b"namespace = \"doom\";".to_vec())
            .lump("ZNODES", Vec::new())
            .lump("ENDMAP", Vec::new())
            .square_map("MAP02", 64)
            .build(b"PWAD");
        let wad = parse_wad(&buf).unwrap();
        let maps: Vec<_> = wad.iter_maps().collect();
        assert_eq!(maps[0].format, MapFormat::UDMF);
        assert_eq!(maps[0].last_index, 3);
        assert_eq!(maps[1].name, MapName::MAPxx(2));

        match *wad.load_level("MAP01").err().unwrap().kind() {
            ErrorKind::UnsupportedMapFormat(_) => {}
            ref other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn loads_levels_by_name() {
        let buf = WADBuilder::new()
            .square_map("E1M1", 256)
            .square_map("E1M2", 512)
            .square_map("E2M1", 64)
            .build(b"PWAD");
        let wad = parse_wad(&buf).unwrap();
        assert_eq!(wad.level_names(), vec!["E1M1", "E1M2", "E2M1"]);
        assert_eq!(wad.find_levels("E1M?"), vec!["E1M1", "E1M2"]);
        assert_eq!(wad.find_levels("all").len(), 3);

        let map = wad.load_level("e1m2").unwrap();
        assert_eq!(map.line_count(), 4);
        let bbox = map.bbox().unwrap();
        assert_eq!((bbox.right, bbox.top), (512.0, 512.0));
        assert_eq!(map.iter_things().count(), 1);

        match *wad.load_level("MAP01").err().unwrap().kind() {
            ErrorKind::UnknownLevel(ref name) => assert_eq!(name, "MAP01"),
            ref other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn missing_lump_is_reported_on_load() {
        let buf = WADBuilder::new()
            .lump("E1M1", Vec::new())
            .lump("THINGS", Vec::new())
            .lump("LINEDEFS", Vec::new())
            .build(b"PWAD");
        let wad = parse_wad(&buf).unwrap();
        assert_eq!(wad.level_names(), vec!["E1M1"]);
        match *wad.load_level("E1M1").err().unwrap().kind() {
            ErrorKind::MissingMapLump(lump) => assert_eq!(lump, "VERTEXES"),
            ref other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn rejects_bad_magic() {
        let mut buf = WADBuilder::new().square_map("E1M1", 64).build(b"PWAD");
        buf[0] = b'X';
        match *parse_wad(&buf).err().unwrap().kind() {
            ErrorKind::InvalidMagic => {}
            ref other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn rejects_truncated_directory() {
        let buf = WADBuilder::new().square_map("E1M1", 64).build(b"PWAD");
        let truncated = &buf[..buf.len() - 4];
        match *parse_wad(truncated).err().unwrap().kind() {
            ErrorKind::TruncatedData(_) => {}
            ref other => panic!("unexpected error {:?}", other),
        }
    }
}
