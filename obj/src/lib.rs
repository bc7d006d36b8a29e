//! The program image format: a big-endian 16-bit origin word followed
//! by big-endian program/data words, placed at `origin, origin+1, ...`.
//! The byte order is big-endian regardless of the host.

use std::fs::File;
use std::io::{self, BufReader, Read, Write};
use std::path::Path;

use common::constants::MEM_SIZE;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("could not read image: {0}")]
    Unreadable(#[from] io::Error),

    #[error("image too short to hold an origin word")]
    MissingOrigin,

    #[error("image has a trailing odd byte after the last full word")]
    Truncated,

    #[error("image of {words} words at origin {origin:#06x} runs past the end of memory")]
    TooLarge { origin: u16, words: usize },
}

pub struct Obj {
    pub origin: u16,
    pub words: Vec<u16>,
}

impl Obj {
    pub fn open(path: impl AsRef<Path>) -> Result<Obj, LoadError> {
        let file = File::open(path)?;
        Self::read_from(&mut BufReader::new(file))
    }

    pub fn read_from(reader: &mut impl Read) -> Result<Obj, LoadError> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;

        let Some(origin_bytes) = bytes.get(0..2) else {
            return Err(LoadError::MissingOrigin);
        };
        let origin = u16::from_be_bytes([origin_bytes[0], origin_bytes[1]]);

        let rest = &bytes[2..];
        if rest.len() % 2 != 0 {
            return Err(LoadError::Truncated);
        }

        let words: Vec<u16> = rest
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect();

        // An image may not wrap around the top of the address space.
        if origin as usize + words.len() > MEM_SIZE {
            return Err(LoadError::TooLarge { origin, words: words.len() });
        }

        Ok(Obj { origin, words })
    }

    pub fn write_to(&self, writer: &mut impl Write) -> io::Result<()> {
        writer.write_all(&self.origin.to_be_bytes())?;
        for word in &self.words {
            writer.write_all(&word.to_be_bytes())?;
        }
        Ok(())
    }
}
