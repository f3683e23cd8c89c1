//! Encoded block length.
//!
//! SLI blocks are packed back-to-back without an outer length field, so
//! the only way to find where one ends is to walk its selector stream.
//! [`block_length`] does exactly that, counting output instead of
//! producing it.

use super::Tag;
use super::cursor::{Sink, replay};
use super::header::Header;
use crate::Result;

/// Counts produced bytes without storing them.
#[derive(Debug, Default)]
struct Tally {
    produced: usize,
}

impl Sink for Tally {
    fn literal(&mut self, _byte: u8) {
        self.produced += 1;
    }

    fn copy(&mut self, _distance: usize, length: usize) {
        self.produced += length;
    }
}

/// Compute the encoded length of the `tag` block at `offset`.
///
/// The length covers the header, selector units, link half-words,
/// extension bytes and literals. Fails on any header, bounds or stream
/// inconsistency.
pub fn block_length(buf: &[u8], offset: usize, tag: Tag) -> Result<usize> {
    let header = Header::parse(buf, offset, tag)?;
    measure(buf, &header)
}

/// Compute the encoded length of an already parsed block.
pub fn measure(buf: &[u8], header: &Header) -> Result<usize> {
    let mut tally = Tally::default();
    let consumed = replay(buf, header, &mut tally)?;
    debug_assert_eq!(tally.produced, header.decoded_size as usize);
    Ok(consumed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    #[test]
    fn yaz0_all_literals() {
        let mut buf = b"Yaz0".to_vec();
        buf.extend_from_slice(&6u32.to_be_bytes());
        buf.extend_from_slice(&[0; 8]);
        buf.push(0xFF);
        buf.extend_from_slice(b"abcdef");
        buf.extend_from_slice(b"trailing");
        assert_eq!(block_length(&buf, 0, Tag::Yaz0).unwrap(), 16 + 1 + 6);
    }

    #[test]
    fn mio0_zero_link_offset() {
        let mut buf = b"MIO0".to_vec();
        buf.extend_from_slice(&4u32.to_be_bytes());
        buf.extend_from_slice(&0u32.to_be_bytes());
        buf.extend_from_slice(&0x14u32.to_be_bytes());
        buf.extend_from_slice(&[0xFF; 8]);
        assert!(matches!(block_length(&buf, 0, Tag::Mio0), Err(Error::Parse(_))));
    }

    #[test]
    fn yay0_counts_each_stream() {
        // literal, literal, extended back-reference, literal
        let mut buf = b"Yay0".to_vec();
        buf.extend_from_slice(&(2u32 + 20 + 1).to_be_bytes());
        buf.extend_from_slice(&0x14u32.to_be_bytes());
        buf.extend_from_slice(&0x16u32.to_be_bytes());
        buf.extend_from_slice(&0b1101_0000_0000_0000_0000_0000_0000_0000u32.to_be_bytes());
        buf.extend_from_slice(&[0x00, 0x01]);
        buf.extend_from_slice(&[b'a', b'b', 2, b'c']);
        assert_eq!(block_length(&buf, 0, Tag::Yay0).unwrap(), buf.len());
    }

    #[test]
    fn zero_size_rejected() {
        let mut buf = b"Yaz0".to_vec();
        buf.extend_from_slice(&[0; 12]);
        buf.push(0xFF);
        assert!(matches!(
            block_length(&buf, 0, Tag::Yaz0),
            Err(Error::UnsupportedSize(0))
        ));
    }
}
