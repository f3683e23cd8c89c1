//! Nintendo 64 ROM images: byte order and header identity.
//!
//! Cartridge dumps circulate in four byte orders. The first word of the
//! image identifies which one:
//!
//! | First word   | Order | Name |
//! |--------------|-------|------|
//! | `0x80371240` | ABCD  | Big-endian (`.z64`, native) |
//! | `0x40123780` | DCBA  | Little-endian (`.n64`) |
//! | `0x37804012` | BADC  | Byte-swapped big-endian (`.v64`) |
//! | `0x12408037` | CDAB  | Byte-swapped little-endian |
//!
//! Everything downstream of [`Rom::from_bytes`] sees `ABCD` order.
//!
//! ## Header fields used here
//! ```text
//! [0x20] InternalName   (20 bytes, space padded)
//! [0x3B] GameId         (4 bytes: media, 2-char code, region)
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::utils::{be_u32, bytesa, swap16, swap32};
use crate::{Error, Result};

/// Largest ROM image accepted.
pub const MAX_ROM_SIZE: usize = 0x3FFF_FFFE;

const NAME_OFFSET: usize = 0x20;
const NAME_LEN: usize = 20;
const GAME_ID_OFFSET: usize = 0x3B;

/// Byte order of a Nintendo 64 ROM image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteOrder {
    /// ABCD, the console's native order.
    Big,
    /// DCBA.
    Little,
    /// BADC.
    ByteSwapped,
    /// CDAB.
    WordSwapped,
}

impl ByteOrder {
    /// Identify the byte order from the first word of an image, read
    /// big-endian.
    pub fn detect(first_word: u32) -> Option<Self> {
        match first_word {
            0x8037_1240 => Some(Self::Big),
            0x4012_3780 => Some(Self::Little),
            0x3780_4012 => Some(Self::ByteSwapped),
            0x1240_8037 => Some(Self::WordSwapped),
            _ => None,
        }
    }

    /// Rewrite `data` into big-endian order, padding it to a multiple of
    /// four bytes first.
    pub fn normalize(self, data: &mut Vec<u8>) {
        if self == Self::Big {
            return;
        }
        if data.len() % 4 != 0 {
            debug!(len = data.len(), "ROM isn't 32-bit aligned, padding");
            data.resize(data.len().next_multiple_of(4), 0);
        }
        for chunk in data.chunks_exact_mut(4) {
            let word = u32::from_be_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
            let word = match self {
                Self::Big => word,
                Self::Little => swap32(word),
                Self::ByteSwapped => {
                    (u32::from(swap16((word >> 16) as u16)) << 16) | u32::from(swap16(word as u16))
                }
                Self::WordSwapped => word.rotate_left(16),
            };
            chunk.copy_from_slice(&word.to_be_bytes());
        }
    }
}

/// Identity fields from the ROM header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RomHeader {
    /// Four-character game ID, e.g. `NSME`.
    pub game_id: [u8; 4],
    /// Internal name, sanitized for use in file names.
    pub name: String,
}

impl RomHeader {
    /// Read the identity fields from a big-endian image.
    pub fn read(data: &[u8]) -> Result<Self> {
        let game_id = bytesa::<4>(data, GAME_ID_OFFSET)?;
        let raw_name = bytesa::<NAME_LEN>(data, NAME_OFFSET)?;
        Ok(Self {
            game_id,
            name: sanitize_name(&raw_name),
        })
    }

    /// The game ID as text, with unprintable bytes replaced.
    pub fn game_id_str(&self) -> String {
        crate::utils::fourcc_str(self.game_id)
    }
}

/// Reduce the space-padded internal name to something usable in a path.
///
/// At most 19 bytes are kept. The name stops at a NUL or at the first
/// pair of consecutive spaces; each remaining space and any byte that is
/// not safe in a file name becomes `_`.
pub fn sanitize_name(raw: &[u8; NAME_LEN]) -> String {
    let mut name = String::with_capacity(NAME_LEN);
    for j in 0..NAME_LEN - 1 {
        let b = raw[j];
        if b == 0 || (b == b' ' && raw[j + 1] == b' ') {
            break;
        }
        let c = match b {
            b' ' | b'/' | b'\\' | b':' | b'*' | b'?' | b'"' | b'<' | b'>' | b'|' => '_',
            0x21..=0x7E => b as char,
            _ => '_',
        };
        name.push(c);
    }
    name
}

/// A loaded ROM image in big-endian order.
#[derive(Debug, Clone)]
pub struct Rom {
    data: Vec<u8>,
    order: Option<ByteOrder>,
}

impl Rom {
    /// Read a ROM image from disk and normalize it.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_bytes(fs::read(path)?)
    }

    /// Normalize an in-memory image.
    ///
    /// Images that do not start with a known Nintendo 64 header word are
    /// kept as-is and scanned as big-endian data.
    pub fn from_bytes(mut data: Vec<u8>) -> Result<Self> {
        if data.is_empty() || data.len() > MAX_ROM_SIZE {
            return Err(Error::UnsupportedSize(
                u32::try_from(data.len()).unwrap_or(u32::MAX),
            ));
        }

        let order = be_u32(&data, 0).ok().and_then(ByteOrder::detect);
        match order {
            Some(ByteOrder::Big) => info!("found Nintendo 64 ROM magic, already big-endian"),
            Some(order) => {
                info!(?order, "found Nintendo 64 ROM magic, ordering bytes to big-endian");
                order.normalize(&mut data);
            }
            None => info!("not a Nintendo 64 ROM, scanning as big-endian data"),
        }

        Ok(Self { data, order })
    }

    /// The normalized image.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Byte order the image was stored in, if it was recognized.
    pub fn byte_order(&self) -> Option<ByteOrder> {
        self.order
    }

    /// Whether the image carries a Nintendo 64 header word.
    pub fn is_recognized(&self) -> bool {
        self.order.is_some()
    }

    /// Whether normalization had to reorder bytes.
    pub fn was_reordered(&self) -> bool {
        matches!(self.order, Some(order) if order != ByteOrder::Big)
    }

    /// Identity fields, for recognized images only.
    pub fn header(&self) -> Option<RomHeader> {
        if !self.is_recognized() {
            return None;
        }
        match RomHeader::read(&self.data) {
            Ok(header) => Some(header),
            Err(err) => {
                debug!(%err, len = self.data.len(), "unable to read ROM header identity");
                None
            }
        }
    }

    /// Write the normalized image next to `rom_path` as `<stem>_bs.N64`.
    pub fn write_normalized(&self, rom_path: &Path) -> Result<PathBuf> {
        let stem = rom_path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let out = rom_path.with_file_name(format!("{stem}_bs.N64"));
        fs::write(&out, &self.data)?;
        info!(path = %out.display(), "wrote big-endian ROM");
        Ok(out)
    }
}
