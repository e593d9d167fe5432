//! Loading of LC-3 program images.
//!
//! An image file is a binary stream: the first two bytes are the big-endian
//! origin address, every following byte pair is one big-endian program word.
//! Words are installed into memory starting at the origin.

use crate::errors::LoadProgramError;
use crate::hardware::memory::{MEMORY_SIZE, Memory};
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

/// A decoded program image, not yet installed into memory.
#[derive(Debug)]
pub struct Image {
    pub origin: u16,
    pub words: Vec<u16>,
}

impl Image {
    /// Decodes an image from its raw byte representation.
    ///
    /// # Errors
    /// - stream is shorter than the two origin bytes
    /// - stream has an odd number of bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, LoadProgramError> {
        if bytes.len() < 2 {
            return Err(LoadProgramError::ImageMissingOrigHeader);
        }
        if bytes.len() % 2 != 0 {
            return Err(LoadProgramError::ImageNotEvenSize(bytes.len() as u64));
        }
        let mut words = bytes
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]));
        let origin = words.next().expect("length of at least 2 checked above");
        Ok(Self {
            origin,
            words: words.collect(),
        })
    }

    /// Reads and decodes an image file.
    ///
    /// # Errors
    /// - file cannot be read
    /// - see [`Image::from_bytes`]
    pub fn read_file(path: impl AsRef<Path>) -> Result<Self, LoadProgramError> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|e| LoadProgramError::ImageNotLoadable {
            file: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::from_bytes(&bytes)
    }

    /// Copies the image words into memory, beginning at the origin.
    ///
    /// Installation stops once address 0xFFFF has been written; trailing
    /// words that would wrap past the end of the address space are dropped.
    pub fn install_into(&self, memory: &mut Memory) {
        let capacity = MEMORY_SIZE - usize::from(self.origin);
        if self.words.len() > capacity {
            warn!(
                origin = format_args!("{:#06X}", self.origin),
                dropped = self.words.len() - capacity,
                "image does not fit below the end of the address space, dropping trailing words"
            );
        }
        for (index, word) in self.words.iter().take(capacity).enumerate() {
            let index = u16::try_from(index).expect("capped at address space size");
            memory.write(self.origin.wrapping_add(index), *word);
        }
        debug!(
            origin = format_args!("{:#06X}", self.origin),
            words = self.words.len().min(capacity),
            "installed image"
        );
    }
}
