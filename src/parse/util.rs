use std::str;

use nom::{self, IResult, Needed};


/// Parses a NUL-padded ASCII name of exactly `len` bytes, as used for lump, texture, and flat
/// names.  Anything after the first NUL is ignored.
pub fn fixed_length_ascii(input: &[u8], len: usize) -> IResult<&[u8], &str> {
    if input.len() < len {
        return Err(nom::Err::Incomplete(Needed::Size(len)));
    }

    let field = &input[..len];
    let end = field.iter().position(|&b| b == 0).unwrap_or(len);
    if field[..end].iter().any(|&b| b < 32 || b > 126) {
        return Err(nom::Err::Error(nom::Context::Code(input, nom::ErrorKind::Custom(0))));
    }

    // Printable ASCII was checked above, so this can't fail
    match str::from_utf8(&field[..end]) {
        Ok(s) => Ok((&input[len..], s)),
        Err(_) => Err(nom::Err::Error(nom::Context::Code(input, nom::ErrorKind::Custom(0)))),
    }
}

/// Reinterprets a signed 16-bit reference.  -1 means "none"; other negative values are treated as
/// unsigned, since most source ports extended these fields to 16 bits.
pub fn optional_index(value: i16) -> Option<usize> {
    if value == -1 {
        None
    }
    else {
        Some(value as u16 as usize)
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ascii_stops_at_nul() {
        let (rest, name) = fixed_length_ascii(b"MAP01\0\0\0tail", 8).unwrap();
        assert_eq!(name, "MAP01");
        assert_eq!(rest, b"tail");
    }

    #[test]
    fn ascii_uses_whole_field() {
        let (rest, name) = fixed_length_ascii(b"STARTAN3", 8).unwrap();
        assert_eq!(name, "STARTAN3");
        assert!(rest.is_empty());
    }

    #[test]
    fn ascii_rejects_garbage() {
        assert!(fixed_length_ascii(b"AB\x01CD\0\0\0", 8).is_err());
    }

    #[test]
    fn ascii_needs_enough_input() {
        match fixed_length_ascii(b"SHORT", 8) {
            Err(nom::Err::Incomplete(_)) => {}
            _ => panic!("expected incomplete"),
        }
    }

    #[test]
    fn optional_indices() {
        assert_eq!(optional_index(-1), None);
        assert_eq!(optional_index(5), Some(5));
        assert_eq!(optional_index(-2), Some(65534));
    }
}
