//! **slikit** - locate, measure and decode SLI compressed segments in
//! Nintendo 64 ROM images.
//!
//! # Modules
//! | Module | Purpose |
//! |--------|---------|
//! | [`rom`]         | Byte-order detection/normalization and header identity |
//! | [`scan`]        | Byte-granular tag scanner with per-title quirks |
//! | [`compression`] | `MIO0`, `Yay0`, `Yaz0` and `SMSR00` measurement and decoding |
//! | [`extract`]     | Writing raw and decoded segments to disk |
//!
//! # Example
//! ```no_run
//! use slikit::{Extractor, Naming, Rom, scan_and_extract};
//!
//! let rom = Rom::open("game.z64")?;
//! let identity = rom.header();
//! let extractor = Extractor::new("out")
//!     .decode(true)
//!     .naming(identity.as_ref().map(Naming::game).unwrap_or_default());
//! let summary = scan_and_extract(rom.data(), identity.as_ref(), &extractor);
//! println!("{} hits, {} oddities", summary.hits, summary.oddities);
//! # Ok::<(), slikit::Error>(())
//! ```

pub mod compression;
pub mod error;
pub mod extract;
pub mod rom;
pub mod scan;
pub mod utils;

pub use error::{Error, Result};
pub use extract::{ExtractedFiles, Extractor, Naming};
pub use rom::{ByteOrder, Rom, RomHeader};
pub use scan::{Detection, Quirk, ScanSummary, Scanner, Segment, scan_and_extract};
