pub mod map;
pub mod wad;

pub(crate) mod util;

use std::str::{self, FromStr};
use std::u8;

use nom::{self, IResult, is_digit, le_u8};

use ::map::MapName;


// Map name parsing -- shared by the archive iterator and level lookup

fn naive_eof(input: &[u8]) -> IResult<&[u8], ()> {
    if input.is_empty() {
        Ok((input, ()))
    }
    else {
        Err(nom::Err::Error(nom::Context::Code(input, nom::ErrorKind::Eof)))
    }
}

named!(exmy_map_name<MapName>, do_parse!(
    tag!(b"E") >>
    e: verify!(le_u8, is_digit) >>
    tag!(b"M") >>
    m: verify!(le_u8, is_digit) >>
    naive_eof >>
    (MapName::ExMy(e - b'0', m - b'0'))
));

// Vanilla Doom 2 stops at MAP32, but ports happily load anything up to MAP99
named!(mapxx_map_name<MapName>, do_parse!(
    tag!(b"MAP") >>
    xx: verify!(
        map_res!(
            map_res!(
                take!(2),
                str::from_utf8
            ),
            u8::from_str
        ),
        |v| v >= 1 && v <= 99
    ) >>
    naive_eof >>
    (MapName::MAPxx(xx))
));

named!(pub vanilla_map_name<MapName>, alt!(exmy_map_name | mapxx_map_name));
