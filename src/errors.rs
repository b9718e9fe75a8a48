use std::io;

use image;
use nom;

error_chain! {
    foreign_links {
        Io(io::Error);
        Image(image::ImageError);
    }

    errors {
        ParseError {
            description("nonspecific parse error")
            display("nonspecific parse error")
        }
        TruncatedData(whence: &'static str) {
            description("unexpected end of input")
            display("unexpected end of input while parsing {}", whence)
        }
        InvalidMagic {
            description("invalid magic")
            display("invalid magic")
        }
        MissingMapLump(lump: &'static str) {
            description("missing required map lump")
            display("missing required map lump: {}", lump)
        }
        BadIndex(what: &'static str, index: usize, value: isize) {
            description("reference to a nonexistent map element")
            display("{} {} refers to nonexistent index {}", what, index, value)
        }
        UnsupportedMapFormat(format: String) {
            description("unsupported map format")
            display("unsupported map format: {}", format)
        }
        UnknownLevel(name: String) {
            description("no such level")
            display("no level named {} in this archive", name)
        }
        DegenerateGeometry(reason: String) {
            description("level geometry cannot be fitted to an image")
            display("degenerate geometry: {}", reason)
        }
        UnsupportedFormat(name: String) {
            description("unsupported output format")
            display("unsupported output format: {}", name)
        }
    }
}

/// Flattens a nom parse into our own error type.  `whence` names the thing being parsed, for the
/// error message.
pub fn nom_to_result<'a, O>(whence: &'static str, _input: &'a [u8], result: nom::IResult<&'a [u8], O>) -> Result<O> {
    match result {
        Ok((_, value)) => Ok(value),
        Err(nom::Err::Incomplete(_)) => Err(ErrorKind::TruncatedData(whence).into()),
        Err(_) => Err(ErrorKind::ParseError.into()),
    }
}
