//! Library-wide error and result types.

use std::io;

use thiserror::Error;

/// Result alias used throughout slikit.
pub type Result<T> = std::result::Result<T, Error>;

/// All errors the library can produce.
///
/// Messages are kept terse; the scanner turns most of these into an
/// oddity and moves on, so they rarely reach a user directly.
#[derive(Debug, Error)]
pub enum Error {
    /// A tag field did not match any supported format.
    #[error("bad magic value")]
    BadMagic,
    /// A read ran past the end of the buffer.
    #[error("unexpected end of data")]
    UnexpectedEof,
    /// An offset or size field would address outside the valid region.
    #[error("invalid offset or size")]
    InvalidRange,
    /// A structural constraint was violated (message describes which one).
    #[error("parse error: {0}")]
    Parse(&'static str),
    /// A declared size is zero or too large to handle.
    #[error("unsupported size: {0:#X}")]
    UnsupportedSize(u32),
    /// A back-reference points before the start of the decoded output.
    #[error("back-reference at output position {position:#X} reaches {distance} bytes back")]
    BadBackReference {
        /// Output bytes produced when the reference was read.
        position: usize,
        /// Displacement plus one.
        distance: usize,
    },
    /// A copy would write past the declared decoded size.
    #[error("copy of {length} bytes overruns the declared size {declared:#X}")]
    LengthOverrun {
        /// Copy length requested by the stream.
        length: usize,
        /// Declared decoded size of the segment.
        declared: u32,
    },
    /// The output buffer could not be allocated.
    #[error("unable to allocate {0} bytes")]
    Alloc(usize),
    /// An underlying I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}
