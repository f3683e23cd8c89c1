//! Segment scanner.
//!
//! Walks a big-endian ROM image one byte at a time looking for SLI tags.
//! Blocks are packed back-to-back with no outer length field, so each
//! candidate is measured by replaying its stream. `SMSR00` blocks are the
//! exception: their `CMPR` wrapper stores the length, and the inner header
//! is only checked when the block is decoded. A candidate that fails
//! any check is reported as an [`Detection::Oddity`] and the scan resumes
//! one byte later.
//!
//! ## Title quirks
//! Resolved once per scan from the ROM's game ID (only when an identity
//! is supplied):
//!
//! | Game IDs       | Title | Quirk |
//! |----------------|-------|-------|
//! | `NBHE`, `NBHP` | Body Harvest | [`Quirk::ExtendedMio0Header`] |
//! | `NSYE`, `NSYP` | Scooby-Doo! Classic Creep Capers | [`Quirk::EvenTagsOnly`] |
//!
//! ## `GZIP` latch
//! Some ROMs prefix genuine `MIO0` blocks with a `GZIP` word 16 bytes
//! before the tag. Once one such block has been seen, any later `MIO0`
//! without the prefix is treated as noise. The latch only arms after the
//! first prefixed block, so genuine unprefixed blocks that precede it are
//! still extracted while later ones are skipped. This is a heuristic and
//! can misfire on ROMs that mix both kinds.

use std::borrow::Cow;
use std::fmt::Display;

use tracing::{debug, info, warn};

use crate::compression::measure::measure;
use crate::compression::{CMPR, GZIP, Header, SMSR, Tag, decompress};
use crate::extract::Extractor;
use crate::rom::RomHeader;
use crate::utils::be_u32;
use crate::{Error, Result};

/// Per-title scanning rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quirk {
    /// Tags at odd offsets are misaligned data, never real blocks.
    EvenTagsOnly,
    /// `MIO0` blocks use a 20-byte header with a stored block length.
    ExtendedMio0Header,
}

const QUIRKS: &[([u8; 4], Quirk)] = &[
    (*b"NBHE", Quirk::ExtendedMio0Header),
    (*b"NBHP", Quirk::ExtendedMio0Header),
    (*b"NSYE", Quirk::EvenTagsOnly),
    (*b"NSYP", Quirk::EvenTagsOnly),
];

impl Quirk {
    /// Look up the quirk for a game ID.
    pub fn for_game(game_id: &[u8; 4]) -> Option<Self> {
        QUIRKS
            .iter()
            .find(|(id, _)| id == game_id)
            .map(|&(_, quirk)| quirk)
    }
}

/// A located SLI block inside a ROM image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    tag: Tag,
    offset: usize,
    /// Offset of the tag that led to this segment.
    ///
    /// Equal to [`Segment::offset`] except for 20-byte `MIO0` headers,
    /// where the segment starts 4 bytes after the tag.
    pub tag_offset: usize,
    /// Encoded length in bytes.
    pub block_length: usize,
    header: Option<Header>,
    corrected_header: Option<[u8; 16]>,
}

impl Segment {
    fn new(
        rom: &[u8],
        tag: Tag,
        offset: usize,
        tag_offset: usize,
        block_length: usize,
    ) -> Result<Self> {
        let end = offset.checked_add(block_length).ok_or(Error::InvalidRange)?;
        if block_length < tag.header_len() || end > rom.len() {
            return Err(Error::InvalidRange);
        }
        Ok(Self {
            tag,
            offset,
            tag_offset,
            block_length,
            header: None,
            corrected_header: None,
        })
    }

    fn measured(
        rom: &[u8],
        header: Header,
        tag_offset: usize,
        block_length: usize,
    ) -> Result<Self> {
        let mut segment = Self::new(rom, header.tag, header.offset, tag_offset, block_length)?;
        segment.header = Some(header);
        Ok(segment)
    }

    /// Offset of the first byte of the segment.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// One past the last byte of the segment.
    pub fn end(&self) -> usize {
        self.offset + self.block_length
    }

    /// Sub-format.
    pub fn tag(&self) -> Tag {
        self.tag
    }

    /// Header validated while scanning.
    ///
    /// [`None`] for `SMSR00`, which is located by its stored length and
    /// only parsed when decoded.
    pub fn header(&self) -> Option<&Header> {
        self.header.as_ref()
    }

    /// The encoded bytes of the segment.
    ///
    /// For 20-byte `MIO0` headers the first 16 bytes are replaced by the
    /// equivalent standard header, so the result decodes on its own.
    pub fn raw<'a>(&self, rom: &'a [u8]) -> Result<Cow<'a, [u8]>> {
        let bytes = rom
            .get(self.offset..self.end())
            .ok_or(Error::InvalidRange)?;
        Ok(match self.corrected_header {
            Some(header) => {
                let mut owned = bytes.to_vec();
                owned[..header.len()].copy_from_slice(&header);
                Cow::Owned(owned)
            }
            None => Cow::Borrowed(bytes),
        })
    }

    /// Decompress the segment. Reads never go past [`Segment::end`].
    pub fn decode(&self, rom: &[u8]) -> Result<Vec<u8>> {
        let rom = rom.get(..self.end()).ok_or(Error::InvalidRange)?;
        match &self.header {
            Some(header) => decompress(rom, header),
            None => decompress(rom, &Header::parse(rom, self.offset, self.tag)?),
        }
    }
}

/// One result of the scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Detection {
    /// A block that passed every check.
    Segment(Segment),
    /// A tag rejected by header validation or a quirk rule, at this offset.
    Oddity(usize),
}

/// Forward-only scanner over a ROM image.
///
/// Yields detections in increasing offset order. After a
/// [`Detection::Segment`] the scanner has already moved past the block;
/// call [`Scanner::reject`] if the block could not be used.
#[derive(Debug, Clone)]
pub struct Scanner<'a> {
    rom: &'a [u8],
    position: usize,
    quirk: Option<Quirk>,
    seen_gzip: bool,
    oddities: usize,
}

impl<'a> Scanner<'a> {
    /// Create a scanner. `identity` enables the title quirks.
    pub fn new(rom: &'a [u8], identity: Option<&RomHeader>) -> Self {
        let quirk = identity.and_then(|h| Quirk::for_game(&h.game_id));
        if let Some(quirk) = quirk {
            debug!(?quirk, "title quirk active");
        }
        Self {
            rom,
            position: 0,
            quirk,
            seen_gzip: false,
            oddities: 0,
        }
    }

    /// Offset the next read starts at.
    pub fn position(&self) -> usize {
        self.position
    }

    /// The quirk in effect for this scan.
    pub fn quirk(&self) -> Option<Quirk> {
        self.quirk
    }

    /// Resume scanning one byte after `segment`'s tag.
    pub fn reject(&mut self, segment: &Segment) {
        self.position = segment.tag_offset + 1;
    }

    fn candidate(&mut self, at: usize, tag: Tag) -> Detection {
        if self.quirk == Some(Quirk::EvenTagsOnly) && at & 1 != 0 {
            return self.oddity(at, "tag at odd offset");
        }

        let found = if tag == Tag::Mio0 && self.quirk == Some(Quirk::ExtendedMio0Header) {
            self.extended_mio0(at)
        } else {
            if tag == Tag::Mio0 && !self.gzip_latch(at) {
                return self.oddity(at, "MIO0 without GZIP prefix");
            }
            self.measured(at, tag)
        };

        match found {
            Ok(segment) => self.accept(segment),
            Err(err) => self.oddity(at, err),
        }
    }

    /// Returns `false` when a `MIO0` at `at` should be skipped.
    fn gzip_latch(&mut self, at: usize) -> bool {
        let prefixed = at
            .checked_sub(0x10)
            .and_then(|p| be_u32(self.rom, p).ok())
            == Some(GZIP);
        if prefixed {
            self.seen_gzip = true;
            true
        } else {
            !self.seen_gzip
        }
    }

    fn measured(&self, at: usize, tag: Tag) -> Result<Segment> {
        let header = Header::parse(self.rom, at, tag)?;
        let block_length = measure(self.rom, &header)?;
        Segment::measured(self.rom, header, at, block_length)
    }

    fn extended_mio0(&self, at: usize) -> Result<Segment> {
        let header = Header::parse_extended_mio0(self.rom, at)?;
        let block_length = (be_u32(self.rom, at + 4)? as usize)
            .checked_sub(4)
            .ok_or(Error::Parse("extended MIO0 block length below header"))?;
        let corrected = header.standard_bytes();
        let mut segment = Segment::measured(self.rom, header, at, block_length)?;
        segment.corrected_header = corrected;
        Ok(segment)
    }

    fn wrapped(&mut self, at: usize) -> Detection {
        let found = be_u32(self.rom, at + 4)
            .and_then(|length| Segment::new(self.rom, Tag::Smsr00, at, at, length as usize));
        match found {
            Ok(segment) => self.accept(segment),
            Err(err) => self.oddity(at, err),
        }
    }

    fn accept(&mut self, segment: Segment) -> Detection {
        debug!(
            tag = %segment.tag(),
            offset = format_args!("{:#X}", segment.offset()),
            length = segment.block_length,
            "found segment"
        );
        self.position = segment.end();
        Detection::Segment(segment)
    }

    fn oddity(&mut self, at: usize, reason: impl Display) -> Detection {
        let words: Vec<String> = (0..4)
            .map(|i| match be_u32(self.rom, at + i * 4) {
                Ok(word) => format!("{:#X} -> [{word:#010X}]", at + i * 4),
                Err(_) => format!("{:#X} -> [--]", at + i * 4),
            })
            .collect();
        self.oddities += 1;
        debug!(
            ordinal = self.oddities,
            offset = format_args!("{at:#X}"),
            %reason,
            words = %words.join(", "),
            "questionable data sequence"
        );
        self.position = at + 1;
        Detection::Oddity(at)
    }
}

impl Iterator for Scanner<'_> {
    type Item = Detection;

    fn next(&mut self) -> Option<Detection> {
        while self.rom.len().saturating_sub(self.position) >= 4 {
            let at = self.position;
            let word = be_u32(self.rom, at).ok()?;
            if let Some(tag) = Tag::from_word(word) {
                return Some(self.candidate(at, tag));
            }
            if word == CMPR && be_u32(self.rom, at + 0x10).ok() == Some(SMSR) {
                return Some(self.wrapped(at));
            }
            self.position += 1;
        }
        None
    }
}

/// Totals reported at the end of a scan.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ScanSummary {
    /// Segments extracted.
    pub hits: usize,
    /// Tags rejected by validation or quirk rules.
    pub oddities: usize,
    /// Segments that measured correctly but could not be extracted.
    pub failures: usize,
}

/// Scan `rom` and extract every segment found.
///
/// A segment whose extraction fails is skipped and the scan resumes one
/// byte after its tag; nothing short of the end of the buffer stops the
/// scan.
pub fn scan_and_extract(
    rom: &[u8],
    identity: Option<&RomHeader>,
    extractor: &Extractor,
) -> ScanSummary {
    let mut scanner = Scanner::new(rom, identity);
    let mut summary = ScanSummary::default();

    while let Some(detection) = scanner.next() {
        match detection {
            Detection::Oddity(_) => summary.oddities += 1,
            Detection::Segment(segment) => match extractor.extract(rom, &segment) {
                Ok(_) => summary.hits += 1,
                Err(err) => {
                    warn!(
                        offset = format_args!("{:#X}", segment.offset()),
                        %err,
                        "unable to extract segment"
                    );
                    summary.failures += 1;
                    scanner.reject(&segment);
                }
            },
        }
    }

    info!(
        hits = summary.hits,
        oddities = summary.oddities,
        failures = summary.failures,
        "scan complete"
    );
    summary
}
