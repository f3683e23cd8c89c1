//! Stream cursor and the replay loop shared by measurement and decoding.
//!
//! A [`Cursor`] keeps three read positions (selector words, link
//! half-words, literal bytes) and a left-aligned pending selector word.
//! For `Yaz0` all three collapse onto the literal position; for `SMSR00`
//! selectors are read from the link position.

use super::Tag;
use super::header::Header;
use crate::utils::{be_u16, be_u32, u8};
use crate::{Error, Result};

const TOP_BIT: u32 = 0x8000_0000;

/// What the next step of the stream produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selector {
    /// Copy one byte from the literal stream.
    Literal,
    /// Copy a run from earlier output.
    BackReference,
}

/// Receiver for the operations decoded by [`replay`].
///
/// `replay` has already checked that every copy stays inside the output,
/// so implementations never need to validate `distance` or `length`.
pub trait Sink {
    /// One literal byte.
    fn literal(&mut self, byte: u8);
    /// `length` bytes starting `distance` bytes before the current end of
    /// output. Ranges may overlap.
    fn copy(&mut self, distance: usize, length: usize);
}

/// Read state for one SLI block.
#[derive(Debug, Clone)]
pub struct Cursor<'a> {
    buf: &'a [u8],
    tag: Tag,
    flags: usize,
    links: usize,
    literals: usize,
    word: u32,
    bits: u32,
    consumed: usize,
}

impl<'a> Cursor<'a> {
    /// Position a cursor at the first selector of the block `header`
    /// describes.
    pub fn new(buf: &'a [u8], header: &Header) -> Self {
        Self {
            buf,
            tag: header.tag,
            flags: header.flags,
            links: header.links,
            literals: header.literals,
            word: 0,
            bits: 0,
            consumed: header.header_len,
        }
    }

    /// Input bytes consumed so far, header included.
    pub fn consumed(&self) -> usize {
        self.consumed
    }

    /// Take the next selector bit, refilling the pending word when empty.
    pub fn next_selector(&mut self) -> Result<Selector> {
        if self.bits == 0 {
            self.refill()?;
        }
        let selector = if self.word & TOP_BIT != 0 {
            Selector::Literal
        } else {
            Selector::BackReference
        };
        self.word <<= 1;
        self.bits -= 1;
        Ok(selector)
    }

    fn refill(&mut self) -> Result<()> {
        match self.tag {
            Tag::Mio0 | Tag::Yay0 => {
                self.word = be_u32(self.buf, self.flags)?;
                self.flags += 4;
                self.bits = 32;
                self.consumed += 4;
            }
            Tag::Yaz0 => {
                self.word = u32::from(u8(self.buf, self.literals)?) << 24;
                self.literals += 1;
                self.bits = 8;
                self.consumed += 1;
            }
            Tag::Smsr00 => {
                self.word = u32::from(be_u16(self.buf, self.links)?) << 16;
                self.links += 2;
                self.bits = 16;
                self.consumed += 2;
            }
        }
        Ok(())
    }

    /// Read one literal byte.
    pub fn literal(&mut self) -> Result<u8> {
        let byte = u8(self.buf, self.literals)?;
        self.literals += 1;
        self.consumed += 1;
        Ok(byte)
    }

    /// Read one back-reference, returning `(distance, length)`.
    ///
    /// `distance` is the 12-bit displacement plus one.
    pub fn back_reference(&mut self) -> Result<(usize, usize)> {
        let half = if self.tag == Tag::Yaz0 {
            let half = be_u16(self.buf, self.literals)?;
            self.literals += 2;
            half
        } else {
            let half = be_u16(self.buf, self.links)?;
            self.links += 2;
            half
        };
        self.consumed += 2;

        let distance = usize::from(half & 0x0FFF) + 1;
        let code = usize::from(half >> 12);
        let length = if code == 0 && self.tag.extends_length() {
            usize::from(self.literal()?) + 18
        } else {
            code + self.tag.length_bias()
        };
        Ok((distance, length))
    }
}

/// Replay the block described by `header` into `sink`.
///
/// Stops once exactly `header.decoded_size` bytes have been produced and
/// returns the number of input bytes consumed.
pub fn replay<S: Sink>(buf: &[u8], header: &Header, sink: &mut S) -> Result<usize> {
    let declared = header.decoded_size as usize;
    let mut cursor = Cursor::new(buf, header);
    let mut produced = 0usize;

    while produced < declared {
        match cursor.next_selector()? {
            Selector::Literal => {
                sink.literal(cursor.literal()?);
                produced += 1;
            }
            Selector::BackReference => {
                let (distance, length) = cursor.back_reference()?;
                if distance > produced {
                    return Err(Error::BadBackReference {
                        position: produced,
                        distance,
                    });
                }
                if length > declared - produced {
                    return Err(Error::LengthOverrun {
                        length,
                        declared: header.decoded_size,
                    });
                }
                sink.copy(distance, length);
                produced += length;
            }
        }
    }

    Ok(cursor.consumed())
}
