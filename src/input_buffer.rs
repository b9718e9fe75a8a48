use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use memmap::{Mmap, MmapOptions};

use ::errors::{Result, ResultExt};

/// The raw bytes of a WAD, either memory-mapped from disk or slurped from stdin.  Everything
/// parsed out of it borrows from here, so it has to outlive the parse.
pub enum InputBuffer {
    Stdin(Vec<u8>),
    File(Mmap),
}

impl InputBuffer {
    /// Opens a file by name, treating `-` as stdin.
    pub fn open(name: &str) -> Result<InputBuffer> {
        if name == "-" {
            InputBuffer::new_from_stdin()
        }
        else {
            InputBuffer::new_from_file(name)
                .chain_err(|| format!("couldn't read {}", name))
        }
    }

    pub fn new_from_stdin() -> Result<InputBuffer> {
        let mut buf = Vec::new();
        io::stdin().read_to_end(&mut buf)?;

        Ok(InputBuffer::Stdin(buf))
    }

    /// Maps a file read-only.  An empty file can't be mapped, so it's read normally instead.
    pub fn new_from_file<P>(path: P) -> Result<InputBuffer>
    where
        P: AsRef<Path>,
    {
        let file = File::open(path)?;
        if file.metadata()?.len() == 0 {
            return Ok(InputBuffer::Stdin(Vec::new()));
        }
        let mmap = unsafe { MmapOptions::new().map(&file)? };

        Ok(InputBuffer::File(mmap))
    }

    pub fn bytes(&self) -> &[u8] {
        match *self {
            InputBuffer::Stdin(ref v) => &*v,
            InputBuffer::File(ref m) => &*m,
        }
    }
}


#[cfg(test)]
mod tests {
    use std::env;
    use std::fs;
    use std::io::Write;

    use super::*;

    #[test]
    fn reads_files() {
        let path = env::temp_dir().join(format!("automap-input-{}.wad", ::std::process::id()));
        {
            let mut file = File::create(&path).unwrap();
            file.write_all(b"PWAD\0\0\0\0\x0c\0\0\0").unwrap();
        }
        let input = InputBuffer::open(path.to_str().unwrap()).unwrap();
        assert_eq!(input.bytes().len(), 12);
        assert_eq!(&input.bytes()[..4], b"PWAD");
        drop(input);
        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(InputBuffer::open("/definitely/not/a/real/file.wad").is_err());
    }
}
