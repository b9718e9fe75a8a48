#[macro_use]
extern crate bitflags;
extern crate byteorder;
#[macro_use]
extern crate error_chain;
extern crate euclid;
extern crate image;
extern crate imageproc;
#[macro_use]
extern crate log;
extern crate memmap;
#[macro_use]
extern crate nom;
extern crate svg;

pub mod archive;
pub mod errors;
pub mod geom;
pub mod input_buffer;
pub mod map;
pub mod parse;
pub mod render;

pub use archive::LevelSource;
pub use archive::wad::{BareWAD, BareWADDirectoryEntry, BareWADHeader, WADItem, WADMapEntryBlock, WADType};
pub use map::{Map, MapFormat, MapName};
pub use parse::map::{parse_doom_map, BareBinaryLine, BareBinaryMap, BareBinaryThing, BareMap};
pub use parse::wad::parse_wad;
pub use render::{render, render_batch, render_to_file, RenderConfig, RenderMode, ScaleTally};
