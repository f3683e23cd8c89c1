//! SLI decompression.
//!
//! The output buffer is sized from the header before any data is read.
//! Back-references are copied one byte at a time so that a short pattern
//! repeated over a long run (distance smaller than length) reads bytes the
//! same copy has just written.

use tracing::trace;

use super::cursor::{Sink, replay};
use super::header::Header;
use super::{CMPR, SMSR, Tag};
use crate::utils::be_u32;
use crate::{Error, Result};

/// Output window: everything decoded so far.
struct Window {
    out: Vec<u8>,
}

impl Sink for Window {
    fn literal(&mut self, byte: u8) {
        self.out.push(byte);
    }

    fn copy(&mut self, distance: usize, length: usize) {
        let mut from = self.out.len() - distance;
        for _ in 0..length {
            let byte = self.out[from];
            self.out.push(byte);
            from += 1;
        }
    }
}

/// Decompress the block described by `header`.
///
/// Returns exactly `header.decoded_size` bytes. Fails with
/// [`Error::Alloc`] if the output cannot be allocated, or with the
/// stream error that stopped the replay.
pub fn decompress(buf: &[u8], header: &Header) -> Result<Vec<u8>> {
    let size = header.decoded_size as usize;
    let mut out = Vec::new();
    out.try_reserve_exact(size).map_err(|_| Error::Alloc(size))?;

    let mut window = Window { out };
    let consumed = replay(buf, header, &mut window)?;
    trace!(
        tag = %header.tag,
        offset = header.offset,
        consumed,
        decoded = size,
        "decompressed block"
    );
    Ok(window.out)
}

/// Decompress the `tag` block starting at `offset`.
pub fn decompress_at(buf: &[u8], offset: usize, tag: Tag) -> Result<Vec<u8>> {
    let header = Header::parse(buf, offset, tag)?;
    decompress(buf, &header)
}

/// Decompress a standalone block, such as an extracted `.szp` / `.szs` file.
///
/// The tag is taken from the first four bytes. Returns
/// [`Error::BadMagic`] if it is not a supported SLI tag.
pub fn decode(data: &[u8]) -> Result<Vec<u8>> {
    decompress_at(data, 0, sniff(data)?)
}

/// Identify the SLI sub-format of a block starting at offset 0.
pub fn sniff(data: &[u8]) -> Result<Tag> {
    let word = be_u32(data, 0)?;
    if let Some(tag) = Tag::from_word(word) {
        return Ok(tag);
    }
    if word == CMPR && be_u32(data, 0x10)? == SMSR {
        return Ok(Tag::Smsr00);
    }
    Err(Error::BadMagic)
}
