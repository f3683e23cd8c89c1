//! SLI compression: header layouts, block measurement and decoding.
//!
//! Nintendo's SLI family is a set of LZ77 variants sharing one shape: a
//! stream of selector bits decides, step by step, whether the next output
//! byte is a literal or the start of a copy from earlier output. The
//! variants differ in where the selector bits, the back-reference
//! half-words and the literal bytes live.
//!
//! ## Submodules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`header`]  | Per-tag header parsing and consistency checks |
//! | [`cursor`]  | Read positions, flag word and the shared replay loop |
//! | [`measure`] | Encoded block length without producing output |
//! | [`decode`]  | Full decompression into a freshly sized buffer |
//!
//! ## Sub-formats
//!
//! | Tag | Selector unit | Back-references | Literals | Length extension |
//! |-----|---------------|-----------------|----------|------------------|
//! | `MIO0`   | 32-bit words after the header | separate stream | separate stream | none, code + 3 |
//! | `Yay0`   | 32-bit words after the header | separate stream | separate stream | code 0 → byte + 18 |
//! | `Yaz0`   | 8-bit, interleaved            | interleaved     | interleaved     | code 0 → byte + 18 |
//! | `SMSR00` | 16-bit, in the back-reference stream | separate stream | separate stream | none, code + 3 |
//!
//! Blocks carry no outer length, so [`measure::block_length`] replays the
//! selector stream to find where a block ends.

pub mod cursor;
pub mod decode;
pub mod header;
pub mod measure;

pub use decode::{decode, decompress};
pub use header::Header;
pub use measure::block_length;

/// `MIO0` tag.
pub const MIO0: u32 = u32::from_be_bytes(*b"MIO0");
/// `Yay0` tag.
pub const YAY0: u32 = u32::from_be_bytes(*b"Yay0");
/// `Yaz0` tag.
pub const YAZ0: u32 = u32::from_be_bytes(*b"Yaz0");
/// `CMPR` wrapper tag preceding an `SMSR00` block.
pub const CMPR: u32 = u32::from_be_bytes(*b"CMPR");
/// `SMSR` tag found 0x10 bytes into a `CMPR` wrapper.
pub const SMSR: u32 = u32::from_be_bytes(*b"SMSR");
/// `GZIP` marker that prefixes genuine `MIO0` blocks in some ROMs.
pub const GZIP: u32 = u32::from_be_bytes(*b"GZIP");

/// Largest declared decoded size accepted by the decoder.
pub const MAX_DECODED_SIZE: u32 = 0x3FFF_FFFD;

/// SLI sub-format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tag {
    /// `MIO0`
    Mio0,
    /// `Yay0`
    Yay0,
    /// `Yaz0`
    Yaz0,
    /// `SMSR00`, wrapped in a `CMPR` header.
    Smsr00,
}

impl Tag {
    /// Map a tag word found at a segment start.
    ///
    /// `CMPR` is not mapped here; it only becomes [`Tag::Smsr00`] once the
    /// inner `SMSR` tag has been checked.
    pub fn from_word(word: u32) -> Option<Self> {
        match word {
            MIO0 => Some(Self::Mio0),
            YAY0 => Some(Self::Yay0),
            YAZ0 => Some(Self::Yaz0),
            _ => None,
        }
    }

    /// The tag word at the start of a segment.
    pub fn word(self) -> u32 {
        match self {
            Self::Mio0 => MIO0,
            Self::Yay0 => YAY0,
            Self::Yaz0 => YAZ0,
            Self::Smsr00 => CMPR,
        }
    }

    /// Extension used for raw segment files.
    ///
    /// `.szs` (SLI Zip Stream) for `Yaz0`, `.szp` (SLI Zip Partition)
    /// otherwise.
    pub fn raw_extension(self) -> &'static str {
        match self {
            Self::Yaz0 => "szs",
            _ => "szp",
        }
    }

    /// Whether a zero length code pulls a supplemental length byte.
    pub(crate) fn extends_length(self) -> bool {
        matches!(self, Self::Yay0 | Self::Yaz0)
    }

    /// Bias added to a non-extended 4-bit length code.
    pub(crate) fn length_bias(self) -> usize {
        match self {
            Self::Mio0 | Self::Smsr00 => 3,
            Self::Yay0 | Self::Yaz0 => 2,
        }
    }

    /// Size of the standard header for this tag.
    pub fn header_len(self) -> usize {
        match self {
            Self::Smsr00 => 0x20,
            _ => 0x10,
        }
    }
}

impl std::fmt::Display for Tag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Mio0 => "MIO0",
            Self::Yay0 => "Yay0",
            Self::Yaz0 => "Yaz0",
            Self::Smsr00 => "SMSR00",
        })
    }
}
