//! Writing segments to disk.
//!
//! Every extracted segment produces a raw file holding the encoded block
//! and, when decoding is enabled, a second file holding the decoded data.
//!
//! ## File names
//! ```text
//! 0x{OFFSET}                        offset naming
//! [{GAME_ID}]_{NAME}_[0x{OFFSET}]   game naming
//! ```
//! `OFFSET` is upper-case hex. The raw file appends `.szs` (`Yaz0`) or
//! `.szp` (everything else); the decoded file has no extension.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::Result;
use crate::rom::RomHeader;
use crate::scan::Segment;

/// How output files are named.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Naming {
    /// Segment offset only.
    #[default]
    Offset,
    /// Game ID and internal name, then the segment offset.
    Game {
        /// Four-character game ID.
        id: String,
        /// Sanitized internal name.
        name: String,
    },
}

impl Naming {
    /// Game naming for `header`.
    pub fn game(header: &RomHeader) -> Self {
        Self::Game {
            id: header.game_id_str(),
            name: header.name.clone(),
        }
    }

    /// File name, without extension, for a segment at `offset`.
    pub fn base_name(&self, offset: usize) -> String {
        match self {
            Self::Offset => format!("0x{offset:X}"),
            Self::Game { id, name } => format!("[{id}]_{name}_[0x{offset:X}]"),
        }
    }
}

/// Paths written for one segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedFiles {
    /// Encoded block.
    pub raw: PathBuf,
    /// Decoded data, when decoding is enabled.
    pub decoded: Option<PathBuf>,
}

/// Writes segments into an output directory.
#[derive(Debug, Clone)]
pub struct Extractor {
    out_dir: PathBuf,
    decode: bool,
    naming: Naming,
}

impl Extractor {
    /// Extract raw segments into `out_dir`, named by offset.
    pub fn new(out_dir: impl Into<PathBuf>) -> Self {
        Self {
            out_dir: out_dir.into(),
            decode: false,
            naming: Naming::Offset,
        }
    }

    /// Also write decoded data.
    pub fn decode(mut self, decode: bool) -> Self {
        self.decode = decode;
        self
    }

    /// Choose the naming scheme.
    pub fn naming(mut self, naming: Naming) -> Self {
        self.naming = naming;
        self
    }

    /// Output directory.
    pub fn out_dir(&self) -> &Path {
        &self.out_dir
    }

    /// Paths that [`Extractor::extract`] would write for `segment`.
    pub fn paths(&self, segment: &Segment) -> ExtractedFiles {
        let base = self.naming.base_name(segment.offset());
        let raw = self
            .out_dir
            .join(format!("{base}.{}", segment.tag().raw_extension()));
        let decoded = self.decode.then(|| self.out_dir.join(&base));
        ExtractedFiles { raw, decoded }
    }

    /// Write `segment` (and its decoded data, if enabled).
    ///
    /// On failure every file created for this segment is removed before
    /// the error is returned.
    pub fn extract(&self, rom: &[u8], segment: &Segment) -> Result<ExtractedFiles> {
        let files = self.paths(segment);
        let mut partial = Partial::default();

        let raw = segment.raw(rom)?;
        partial.write(&files.raw, &raw)?;

        if let Some(path) = &files.decoded {
            let decoded = segment.decode(rom)?;
            partial.write(path, &decoded)?;
        }

        partial.keep();
        debug!(
            raw = %files.raw.display(),
            decoded = files.decoded.is_some(),
            "extracted segment"
        );
        Ok(files)
    }
}

/// Files written so far for one segment; removed on drop unless kept.
#[derive(Default)]
struct Partial {
    paths: Vec<PathBuf>,
    keep: bool,
}

impl Partial {
    fn write(&mut self, path: &Path, data: &[u8]) -> Result<()> {
        self.paths.push(path.to_path_buf());
        fs::write(path, data)?;
        Ok(())
    }

    fn keep(&mut self) {
        self.keep = true;
    }
}

impl Drop for Partial {
    fn drop(&mut self) {
        if self.keep {
            return;
        }
        for path in &self.paths {
            // The file may never have been created.
            let _ = fs::remove_file(path);
        }
    }
}
