//! Low-level buffer primitives shared by the decoder and the scanner.
//!
//! Every reader takes an absolute offset into a byte slice and either
//! returns the full value or [`Error::UnexpectedEof`] - there is no
//! partial-read ambiguity and no out-of-bounds panic.

use crate::{Error, Result};

/// Read one byte at `at`.
#[inline]
pub(crate) fn u8(buf: &[u8], at: usize) -> Result<u8> {
    buf.get(at).copied().ok_or(Error::UnexpectedEof)
}

/// Read exactly `N` bytes at `at` into a fixed-size array.
#[inline]
pub(crate) fn bytesa<const N: usize>(buf: &[u8], at: usize) -> Result<[u8; N]> {
    let end = at.checked_add(N).ok_or(Error::UnexpectedEof)?;
    let slice = buf.get(at..end).ok_or(Error::UnexpectedEof)?;
    let mut b = [0u8; N];
    b.copy_from_slice(slice);
    Ok(b)
}

/// Read a big-endian `u16` at `at`.
#[inline]
pub(crate) fn be_u16(buf: &[u8], at: usize) -> Result<u16> {
    bytesa::<2>(buf, at).map(u16::from_be_bytes)
}

/// Read a big-endian `u32` at `at`.
#[inline]
pub(crate) fn be_u32(buf: &[u8], at: usize) -> Result<u32> {
    bytesa::<4>(buf, at).map(u32::from_be_bytes)
}

/// Reverse the byte order of a 32-bit word.
#[inline]
pub fn swap32(word: u32) -> u32 {
    word.swap_bytes()
}

/// Reverse the byte order of a 16-bit half-word.
#[inline]
pub fn swap16(half: u16) -> u16 {
    half.swap_bytes()
}

/// Render a four-character code for logs and file names.
///
/// Bytes outside printable ASCII are shown as `.`.
pub(crate) fn fourcc_str(code: [u8; 4]) -> String {
    code.iter()
        .map(|&b| if b.is_ascii_graphic() { b as char } else { '.' })
        .collect()
}
