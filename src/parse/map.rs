use std::io::Write;

use byteorder::{LittleEndian, WriteBytesExt};
use nom::{le_i16, le_u16, le_u8};

use super::util::fixed_length_ascii;
use ::errors::{ErrorKind, Result, nom_to_result};
use ::map::MapFormat;
use ::archive::wad::{BareWAD, WADMapEntryBlock};

// Binary map lumps, exactly as stored.  Everything is little-endian and fixed-size, so every lump
// is just a flat array of records.

named!(hexen_args<[u8; 5]>, count_fixed!(u8, le_u8, 5));

fn write_name<W: Write>(writer: &mut W, name: &str) -> Result<()> {
    writer.write_all(name.as_bytes())?;
    for _ in name.len() .. 8 {
        writer.write_all(&[0])?;
    }
    Ok(())
}

#[derive(Debug)]
pub struct BareDoomThing {
    pub x: i16,
    pub y: i16,
    /// Facing, in degrees counter-clockwise from east
    pub angle: i16,
    pub doomednum: i16,
    // NOTE: boom added two flags, and mbf one more, so this is a decent signal for targeting those (but not 100%)
    pub flags: u16,
}

impl BareDoomThing {
    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_i16::<LittleEndian>(self.x)?;
        writer.write_i16::<LittleEndian>(self.y)?;
        writer.write_i16::<LittleEndian>(self.angle)?;
        writer.write_i16::<LittleEndian>(self.doomednum)?;
        writer.write_u16::<LittleEndian>(self.flags)?;
        Ok(())
    }
}

named!(doom_things_lump<Vec<BareDoomThing>>, many0!(complete!(do_parse!(
    x: le_i16 >>
    y: le_i16 >>
    angle: le_i16 >>
    doomednum: le_i16 >>
    flags: le_u16 >>
    (BareDoomThing{ x, y, angle, doomednum, flags })
))));

#[derive(Debug)]
pub struct BareHexenThing {
    pub tid: i16,
    pub x: i16,
    pub y: i16,
    pub z: i16,
    pub angle: i16,
    pub doomednum: i16,
    pub flags: u16,
    pub special: u8,
    pub args: [u8; 5],
}

named!(hexen_things_lump<Vec<BareHexenThing>>, many0!(complete!(do_parse!(
    tid: le_i16 >>
    x: le_i16 >>
    y: le_i16 >>
    z: le_i16 >>
    angle: le_i16 >>
    doomednum: le_i16 >>
    flags: le_u16 >>
    special: le_u8 >>
    args: hexen_args >>
    (BareHexenThing{
        tid,
        x,
        y,
        z,
        angle,
        doomednum,
        flags,
        special,
        args,
    })
))));

/// What the map model needs from a thing record, whichever layout it came from.
pub trait BareBinaryThing {
    fn coords(&self) -> (i16, i16);
    fn angle(&self) -> i16;
    fn doomednum(&self) -> i16;
}

macro_rules! bare_binary_thing {
    ($($thing:ty),+) => {$(
        impl BareBinaryThing for $thing {
            fn coords(&self) -> (i16, i16) { (self.x, self.y) }
            fn angle(&self) -> i16 { self.angle }
            fn doomednum(&self) -> i16 { self.doomednum }
        }
    )+};
}
bare_binary_thing!(BareDoomThing, BareHexenThing);


#[derive(Debug)]
pub struct BareDoomLine {
    pub v0: i16,
    pub v1: i16,
    pub flags: i16,
    pub special: i16,
    pub sector_tag: i16,
    // NOTE: -1 to mean none
    pub front_sidedef: i16,
    pub back_sidedef: i16,
}

impl BareDoomLine {
    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_i16::<LittleEndian>(self.v0)?;
        writer.write_i16::<LittleEndian>(self.v1)?;
        writer.write_i16::<LittleEndian>(self.flags)?;
        writer.write_i16::<LittleEndian>(self.special)?;
        writer.write_i16::<LittleEndian>(self.sector_tag)?;
        writer.write_i16::<LittleEndian>(self.front_sidedef)?;
        writer.write_i16::<LittleEndian>(self.back_sidedef)?;
        Ok(())
    }
}

named!(doom_linedefs_lump<Vec<BareDoomLine>>, many0!(complete!(do_parse!(
    v0: le_i16 >>
    v1: le_i16 >>
    flags: le_i16 >>
    special: le_i16 >>
    sector_tag: le_i16 >>
    front_sidedef: le_i16 >>
    back_sidedef: le_i16 >>
    (BareDoomLine{ v0, v1, flags, special, sector_tag, front_sidedef, back_sidedef })
))));

#[derive(Debug)]
pub struct BareHexenLine {
    pub v0: i16,
    pub v1: i16,
    pub flags: i16,
    pub special: u8,
    pub args: [u8; 5],
    // NOTE: -1 to mean none
    pub front_sidedef: i16,
    pub back_sidedef: i16,
}

named!(hexen_linedefs_lump<Vec<BareHexenLine>>, many0!(complete!(do_parse!(
    v0: le_i16 >>
    v1: le_i16 >>
    flags: le_i16 >>
    special: le_u8 >>
    args: hexen_args >>
    front_sidedef: le_i16 >>
    back_sidedef: le_i16 >>
    (BareHexenLine{
        v0,
        v1,
        flags,
        special,
        args,
        front_sidedef,
        back_sidedef,
    })
))));

pub trait BareBinaryLine {
    fn vertex_indices(&self) -> (i16, i16);
    fn side_indices(&self) -> (i16, i16);
    fn special(&self) -> u32;
    fn flags(&self) -> i16;

    fn has_special(&self) -> bool {
        self.special() != 0
    }
}
impl BareBinaryLine for BareDoomLine {
    fn vertex_indices(&self) -> (i16, i16) { (self.v0, self.v1) }
    fn side_indices(&self) -> (i16, i16) { (self.front_sidedef, self.back_sidedef) }
    // Boom packs generalized specials into the high bits, so don't sign-extend
    fn special(&self) -> u32 { self.special as u16 as u32 }
    fn flags(&self) -> i16 { self.flags }
}
impl BareBinaryLine for BareHexenLine {
    fn vertex_indices(&self) -> (i16, i16) { (self.v0, self.v1) }
    fn side_indices(&self) -> (i16, i16) { (self.front_sidedef, self.back_sidedef) }
    fn special(&self) -> u32 { self.special as u32 }
    fn flags(&self) -> i16 { self.flags }
}

#[derive(Debug)]
pub struct BareSide<'tex> {
    pub x_offset: i16,
    pub y_offset: i16,
    pub upper_texture: &'tex str,
    pub lower_texture: &'tex str,
    pub middle_texture: &'tex str,
    pub sector: i16,
}

impl<'t> BareSide<'t> {
    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_i16::<LittleEndian>(self.x_offset)?;
        writer.write_i16::<LittleEndian>(self.y_offset)?;
        write_name(writer, self.upper_texture)?;
        write_name(writer, self.lower_texture)?;
        write_name(writer, self.middle_texture)?;
        writer.write_i16::<LittleEndian>(self.sector)?;
        Ok(())
    }
}

named!(sidedefs_lump<Vec<BareSide>>, many0!(complete!(do_parse!(
    x_offset: le_i16 >>
    y_offset: le_i16 >>
    upper_texture: apply!(fixed_length_ascii, 8) >>
    lower_texture: apply!(fixed_length_ascii, 8) >>
    middle_texture: apply!(fixed_length_ascii, 8) >>
    sector: le_i16 >>
    (BareSide{
        x_offset,
        y_offset,
        upper_texture,
        lower_texture,
        middle_texture,
        sector
    })
))));

// FIXME: vertices are i16 for vanilla, 15/16 fixed for ps/n64, effectively infinite but really f32 for udmf
#[derive(Debug)]
pub struct BareVertex {
    pub x: i16,
    pub y: i16,
}

impl BareVertex {
    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_i16::<LittleEndian>(self.x)?;
        writer.write_i16::<LittleEndian>(self.y)?;
        Ok(())
    }
}

named!(vertexes_lump<Vec<BareVertex>>, many0!(complete!(do_parse!(
    x: le_i16 >>
    y: le_i16 >>
    (BareVertex{ x, y })
))));


#[derive(Debug)]
pub struct BareSector<'tex> {
    pub floor_height: i16,
    pub ceiling_height: i16,
    pub floor_texture: &'tex str,
    pub ceiling_texture: &'tex str,
    pub light: i16,
    pub sector_type: i16,
    pub sector_tag: i16,
}

impl<'t> BareSector<'t> {
    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_i16::<LittleEndian>(self.floor_height)?;
        writer.write_i16::<LittleEndian>(self.ceiling_height)?;
        write_name(writer, self.floor_texture)?;
        write_name(writer, self.ceiling_texture)?;
        writer.write_i16::<LittleEndian>(self.light)?;
        writer.write_i16::<LittleEndian>(self.sector_type)?;
        writer.write_i16::<LittleEndian>(self.sector_tag)?;
        Ok(())
    }
}

named!(sectors_lump<Vec<BareSector>>, many0!(complete!(do_parse!(
    floor_height: le_i16 >>
    ceiling_height: le_i16 >>
    floor_texture: apply!(fixed_length_ascii, 8) >>
    ceiling_texture: apply!(fixed_length_ascii, 8) >>
    light: le_i16 >>
    sector_type: le_i16 >>
    sector_tag: le_i16 >>
    (BareSector{
        floor_height,
        ceiling_height,
        floor_texture,
        ceiling_texture,
        light,
        sector_type,
        sector_tag,
    })
))));


/// One fragment of a linedef, as split up by the node builder.
#[derive(Debug)]
pub struct BareSeg {
    pub v0: i16,
    pub v1: i16,
    /// Binary angle: the full circle is 65536 units
    pub angle: i16,
    pub line: i16,
    /// 0 if the seg runs along the line's front side, 1 for the back
    pub direction: i16,
    pub offset: i16,
}

impl BareSeg {
    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_i16::<LittleEndian>(self.v0)?;
        writer.write_i16::<LittleEndian>(self.v1)?;
        writer.write_i16::<LittleEndian>(self.angle)?;
        writer.write_i16::<LittleEndian>(self.line)?;
        writer.write_i16::<LittleEndian>(self.direction)?;
        writer.write_i16::<LittleEndian>(self.offset)?;
        Ok(())
    }
}

named!(segs_lump<Vec<BareSeg>>, many0!(complete!(do_parse!(
    v0: le_i16 >>
    v1: le_i16 >>
    angle: le_i16 >>
    line: le_i16 >>
    direction: le_i16 >>
    offset: le_i16 >>
    (BareSeg{ v0, v1, angle, line, direction, offset })
))));


#[derive(Debug)]
pub struct BareBinaryMap<'a, L: BareBinaryLine, T: BareBinaryThing> {
    pub vertices: Vec<BareVertex>,
    pub sectors: Vec<BareSector<'a>>,
    pub sides: Vec<BareSide<'a>>,
    pub lines: Vec<L>,
    pub things: Vec<T>,
    /// Empty if the map was never run through a node builder
    pub segs: Vec<BareSeg>,
}

/// The result of parsing a Doom-format map definition.  The contained
/// structures have not been changed in any way.  Everything is public, and
/// nothing is preventing you from meddling with the contained data in a way
/// that might make it invalid.
pub type BareDoomMap<'a> = BareBinaryMap<'a, BareDoomLine, BareDoomThing>;

/// The result of parsing a Hexen-format map definition.  Same caveats as
/// `BareDoomMap`.
pub type BareHexenMap<'a> = BareBinaryMap<'a, BareHexenLine, BareHexenThing>;

#[derive(Debug)]
pub enum BareMap<'a> {
    Doom(BareDoomMap<'a>),
    Hexen(BareHexenMap<'a>),
}


/// Parses every lump belonging to one map block.  Doom and Hexen only; UDMF maps are text and
/// need a different parser entirely.
pub fn parse_doom_map<'a>(archive: &'a BareWAD, range: &WADMapEntryBlock) -> Result<BareMap<'a>> {
    if range.format == MapFormat::UDMF {
        bail!(ErrorKind::UnsupportedMapFormat(format!("UDMF ({})", range.name)));
    }

    let vertexes_index = range.vertexes_index.ok_or(ErrorKind::MissingMapLump("VERTEXES"))?;
    let buf = archive.entry_slice(vertexes_index);
    let vertices = nom_to_result("VERTEXES lump", buf, vertexes_lump(buf))?;

    let sectors_index = range.sectors_index.ok_or(ErrorKind::MissingMapLump("SECTORS"))?;
    let buf = archive.entry_slice(sectors_index);
    let sectors = nom_to_result("SECTORS lump", buf, sectors_lump(buf))?;

    let sidedefs_index = range.sidedefs_index.ok_or(ErrorKind::MissingMapLump("SIDEDEFS"))?;
    let buf = archive.entry_slice(sidedefs_index);
    let sides = nom_to_result("SIDEDEFS lump", buf, sidedefs_lump(buf))?;

    let segs = match range.segs_index {
        Some(index) => {
            let buf = archive.entry_slice(index);
            nom_to_result("SEGS lump", buf, segs_lump(buf))?
        }
        None => Vec::new(),
    };

    let linedefs_index = range.linedefs_index.ok_or(ErrorKind::MissingMapLump("LINEDEFS"))?;
    let things_index = range.things_index.ok_or(ErrorKind::MissingMapLump("THINGS"))?;
    let lines_buf = archive.entry_slice(linedefs_index);
    let things_buf = archive.entry_slice(things_index);

    if range.format == MapFormat::Doom {
        let lines = nom_to_result("LINEDEFS lump", lines_buf, doom_linedefs_lump(lines_buf))?;
        let things = nom_to_result("THINGS lump", things_buf, doom_things_lump(things_buf))?;

        Ok(BareMap::Doom(BareDoomMap{
            vertices,
            sectors,
            sides,
            lines,
            things,
            segs,
        }))
    }
    else {
        let lines = nom_to_result("LINEDEFS lump", lines_buf, hexen_linedefs_lump(lines_buf))?;
        let things = nom_to_result("THINGS lump", things_buf, hexen_things_lump(things_buf))?;

        Ok(BareMap::Hexen(BareHexenMap{
            vertices,
            sectors,
            sides,
            lines,
            things,
            segs,
        }))
    }
}
