//! SLI block headers.
//!
//! ## MIO0 / Yay0 (0x10 bytes)
//! ```text
//! [0x00] Magic "MIO0" / "Yay0"         (4 bytes)
//! [0x04] DecodedSize                   (u32 BE)
//! [0x08] LinkOffset   - from the tag   (u32 BE)
//! [0x0C] LiteralOffset - from the tag  (u32 BE)
//! [0x10] Selector words (u32 BE each)
//! ```
//!
//! ## Yaz0 (0x10 bytes)
//! ```text
//! [0x00] Magic "Yaz0"                  (4 bytes)
//! [0x04] DecodedSize                   (u32 BE)
//! [0x08] Reserved, must be 0           (u32)
//! [0x0C] Reserved, must be 0           (u32)
//! [0x10] Selector bytes, half-words and literals, interleaved
//! ```
//!
//! ## CMPR / SMSR00 (0x20 bytes)
//! ```text
//! [0x00] Magic "CMPR"                  (4 bytes)
//! [0x04] BlockLength                   (u32 BE)
//! [0x08] DecodedSize                   (u32 BE)
//! [0x0C] Unknown                       (4 bytes)
//! [0x10] Magic "SMSR00"                (6 bytes)
//! [0x16] Unknown                       (6 bytes)
//! [0x1C] LiteralOffset - from 0x20     (u32 BE)
//! [0x20] Selector half-words and link half-words, interleaved
//! ```
//!
//! ## Body Harvest MIO0 (0x14 bytes)
//! ```text
//! [0x00] Magic "MIO0"                  (4 bytes)
//! [0x04] BlockLength - from the tag    (u32 BE)
//! [0x08] DecodedSize                   (u32 BE)
//! [0x0C] LinkOffset   - from the tag   (u32 BE)
//! [0x10] LiteralOffset - from the tag  (u32 BE)
//! [0x14] Selector words
//! ```
//! The segment is taken to start at `0x04`, which turns the layout into a
//! standard `MIO0` header once both offsets are reduced by 4.

use super::{MAX_DECODED_SIZE, Tag};
use crate::utils::be_u32;
use crate::{Error, Result};

/// A validated SLI header with absolute stream positions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    /// Sub-format.
    pub tag: Tag,
    /// Absolute offset of the first byte of the segment.
    pub offset: usize,
    /// Declared size of the decoded data.
    pub decoded_size: u32,
    /// Header bytes preceding the first selector unit.
    pub header_len: usize,
    /// First selector word (`MIO0`/`Yay0`).
    pub(crate) flags: usize,
    /// First back-reference half-word. Also the selector stream for `SMSR00`.
    pub(crate) links: usize,
    /// First literal byte. The whole interleaved stream for `Yaz0`.
    pub(crate) literals: usize,
}

impl Header {
    /// Parse and validate the header of a `tag` block starting at `offset`.
    pub fn parse(buf: &[u8], offset: usize, tag: Tag) -> Result<Self> {
        match tag {
            Tag::Mio0 | Tag::Yay0 => {
                let decoded_size = checked_size(be_u32(buf, at(offset, 0x04)?)?)?;
                let links = be_u32(buf, at(offset, 0x08)?)?;
                let literals = be_u32(buf, at(offset, 0x0C)?)?;
                Self::partitioned(tag, offset, decoded_size, links, literals)
            }
            Tag::Yaz0 => {
                let decoded_size = checked_size(be_u32(buf, at(offset, 0x04)?)?)?;
                if be_u32(buf, at(offset, 0x08)?)? != 0 || be_u32(buf, at(offset, 0x0C)?)? != 0 {
                    return Err(Error::Parse("Yaz0 reserved fields are not zero"));
                }
                let stream = at(offset, 0x10)?;
                Ok(Self {
                    tag,
                    offset,
                    decoded_size,
                    header_len: 0x10,
                    flags: stream,
                    links: stream,
                    literals: stream,
                })
            }
            Tag::Smsr00 => {
                let decoded_size = checked_size(be_u32(buf, at(offset, 0x08)?)?)?;
                let literals = be_u32(buf, at(offset, 0x1C)?)?;
                if literals == 0 {
                    return Err(Error::Parse("SMSR00 literal offset is zero"));
                }
                let stream = at(offset, 0x20)?;
                Ok(Self {
                    tag,
                    offset,
                    decoded_size,
                    header_len: 0x20,
                    flags: stream,
                    links: stream,
                    literals: at(stream, literals as usize)?,
                })
            }
        }
    }

    /// Parse the 20-byte `MIO0` header found at `tag_offset`.
    ///
    /// The returned header describes the block as if it started 4 bytes
    /// after the tag with a standard 16-byte header. The buffer is not
    /// touched; use [`Header::standard_bytes`] to obtain the corrected
    /// header bytes.
    pub fn parse_extended_mio0(buf: &[u8], tag_offset: usize) -> Result<Self> {
        let offset = at(tag_offset, 0x04)?;
        let decoded_size = checked_size(be_u32(buf, at(tag_offset, 0x08)?)?)?;
        let links = be_u32(buf, at(tag_offset, 0x0C)?)?
            .checked_sub(4)
            .ok_or(Error::Parse("extended MIO0 link offset below header"))?;
        let literals = be_u32(buf, at(tag_offset, 0x10)?)?
            .checked_sub(4)
            .ok_or(Error::Parse("extended MIO0 literal offset below header"))?;
        Self::partitioned(Tag::Mio0, offset, decoded_size, links, literals)
    }

    /// Rebuild a standard 16-byte header for this block.
    ///
    /// Returns [`None`] for `SMSR00`, whose header has no 16-byte form.
    pub fn standard_bytes(&self) -> Option<[u8; 16]> {
        let (links, literals) = match self.tag {
            Tag::Mio0 | Tag::Yay0 => (
                u32::try_from(self.links - self.offset).ok()?,
                u32::try_from(self.literals - self.offset).ok()?,
            ),
            Tag::Yaz0 => (0, 0),
            Tag::Smsr00 => return None,
        };
        let mut out = [0u8; 16];
        out[0x0..0x4].copy_from_slice(&self.tag.word().to_be_bytes());
        out[0x4..0x8].copy_from_slice(&self.decoded_size.to_be_bytes());
        out[0x8..0xC].copy_from_slice(&links.to_be_bytes());
        out[0xC..0x10].copy_from_slice(&literals.to_be_bytes());
        Some(out)
    }

    fn partitioned(
        tag: Tag,
        offset: usize,
        decoded_size: u32,
        links: u32,
        literals: u32,
    ) -> Result<Self> {
        if links == 0 {
            return Err(Error::Parse("link offset is zero"));
        }
        if literals < links {
            return Err(Error::Parse("literal offset precedes link offset"));
        }
        Ok(Self {
            tag,
            offset,
            decoded_size,
            header_len: 0x10,
            flags: at(offset, 0x10)?,
            links: at(offset, links as usize)?,
            literals: at(offset, literals as usize)?,
        })
    }
}

/// Validate a declared decoded size.
pub(crate) fn checked_size(size: u32) -> Result<u32> {
    if size == 0 || size > MAX_DECODED_SIZE {
        return Err(Error::UnsupportedSize(size));
    }
    Ok(size)
}

#[inline]
fn at(base: usize, rel: usize) -> Result<usize> {
    base.checked_add(rel).ok_or(Error::InvalidRange)
}
