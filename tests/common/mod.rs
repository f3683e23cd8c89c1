//! Reference SLI encoder and ROM builders shared by the integration tests.
#![allow(dead_code)]

use slikit::compression::Tag;

/// One step of an LZ77 parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Literal(u8),
    Copy { distance: usize, length: usize },
}

fn max_length(tag: Tag) -> usize {
    match tag {
        Tag::Mio0 | Tag::Smsr00 => 18,
        Tag::Yay0 | Tag::Yaz0 => 0xFF + 18,
    }
}

/// Greedy parse with a 4 KiB window.
pub fn tokenize(data: &[u8], tag: Tag) -> Vec<Op> {
    let max = max_length(tag);
    let mut ops = Vec::new();
    let mut i = 0;
    while i < data.len() {
        let limit = max.min(data.len() - i);
        let mut best = (0, 0);
        for distance in 1..=i.min(0x1000) {
            let mut len = 0;
            while len < limit && data[i - distance + len] == data[i + len] {
                len += 1;
            }
            if len > best.1 {
                best = (distance, len);
                if len == limit {
                    break;
                }
            }
        }
        if best.1 >= 3 {
            ops.push(Op::Copy {
                distance: best.0,
                length: best.1,
            });
            i += best.1;
        } else {
            ops.push(Op::Literal(data[i]));
            i += 1;
        }
    }
    ops
}

/// Link half-word and optional extension byte for a copy.
fn link(tag: Tag, distance: usize, length: usize) -> (u16, Option<u8>) {
    let displacement = (distance - 1) as u16;
    match tag {
        Tag::Mio0 | Tag::Smsr00 => (((length - 3) as u16) << 12 | displacement, None),
        Tag::Yay0 | Tag::Yaz0 if length >= 18 => (displacement, Some((length - 18) as u8)),
        Tag::Yay0 | Tag::Yaz0 => (((length - 2) as u16) << 12 | displacement, None),
    }
}

/// Encode `data` as a complete `tag` block.
pub fn encode(data: &[u8], tag: Tag) -> Vec<u8> {
    let ops = tokenize(data, tag);
    let size = (data.len() as u32).to_be_bytes();
    match tag {
        Tag::Mio0 | Tag::Yay0 => {
            let mut flags = Vec::new();
            let mut links = Vec::new();
            let mut literals = Vec::new();
            for (k, op) in ops.iter().enumerate() {
                if k % 32 == 0 {
                    flags.push(0u32);
                }
                match *op {
                    Op::Literal(b) => {
                        *flags.last_mut().unwrap() |= 1 << (31 - k % 32);
                        literals.push(b);
                    }
                    Op::Copy { distance, length } => {
                        let (half, ext) = link(tag, distance, length);
                        links.extend_from_slice(&half.to_be_bytes());
                        literals.extend(ext);
                    }
                }
            }
            let link_offset = 0x10 + flags.len() as u32 * 4;
            let literal_offset = link_offset + links.len() as u32;

            let mut out = match tag {
                Tag::Mio0 => b"MIO0".to_vec(),
                _ => b"Yay0".to_vec(),
            };
            out.extend_from_slice(&size);
            out.extend_from_slice(&link_offset.to_be_bytes());
            out.extend_from_slice(&literal_offset.to_be_bytes());
            for word in flags {
                out.extend_from_slice(&word.to_be_bytes());
            }
            out.extend_from_slice(&links);
            out.extend_from_slice(&literals);
            out
        }
        Tag::Yaz0 => {
            let mut out = b"Yaz0".to_vec();
            out.extend_from_slice(&size);
            out.extend_from_slice(&[0; 8]);
            for group in ops.chunks(8) {
                let flag_at = out.len();
                out.push(0);
                for (k, op) in group.iter().enumerate() {
                    match *op {
                        Op::Literal(b) => {
                            out[flag_at] |= 0x80 >> k;
                            out.push(b);
                        }
                        Op::Copy { distance, length } => {
                            let (half, ext) = link(tag, distance, length);
                            out.extend_from_slice(&half.to_be_bytes());
                            out.extend(ext);
                        }
                    }
                }
            }
            out
        }
        Tag::Smsr00 => {
            let mut stream = Vec::new();
            let mut literals = Vec::new();
            for group in ops.chunks(16) {
                let flag_at = stream.len();
                stream.extend_from_slice(&[0, 0]);
                let mut flag = 0u16;
                for (k, op) in group.iter().enumerate() {
                    match *op {
                        Op::Literal(b) => {
                            flag |= 0x8000 >> k;
                            literals.push(b);
                        }
                        Op::Copy { distance, length } => {
                            let (half, _) = link(tag, distance, length);
                            stream.extend_from_slice(&half.to_be_bytes());
                        }
                    }
                }
                stream[flag_at..flag_at + 2].copy_from_slice(&flag.to_be_bytes());
            }
            let total = (0x20 + stream.len() + literals.len()) as u32;

            let mut out = b"CMPR".to_vec();
            out.extend_from_slice(&total.to_be_bytes());
            out.extend_from_slice(&size);
            out.extend_from_slice(&[0; 4]);
            out.extend_from_slice(b"SMSR00");
            out.extend_from_slice(&[0; 6]);
            out.extend_from_slice(&(stream.len() as u32).to_be_bytes());
            out.extend_from_slice(&stream);
            out.extend_from_slice(&literals);
            out
        }
    }
}

/// Deterministic, mildly compressible test data.
pub fn sample(len: usize, seed: u32) -> Vec<u8> {
    let mut state = seed.wrapping_mul(0x9E37_79B9) | 1;
    let mut out = Vec::with_capacity(len);
    while out.len() < len {
        state = state.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
        let run = 1 + (state >> 28) as usize;
        let byte = b"SLI data "[(state >> 8) as usize % 9];
        out.extend(std::iter::repeat_n(byte, run.min(len - out.len())));
    }
    out
}

/// A 0x40-byte big-endian N64 header.
pub fn n64_header(game_id: &[u8; 4], name: &[u8; 20]) -> Vec<u8> {
    let mut rom = vec![0u8; 0x40];
    rom[..4].copy_from_slice(&0x8037_1240u32.to_be_bytes());
    rom[0x20..0x34].copy_from_slice(name);
    rom[0x3B..0x3F].copy_from_slice(game_id);
    rom
}

/// Pad `rom` with zeros up to `offset`.
pub fn pad_to(rom: &mut Vec<u8>, offset: usize) {
    assert!(rom.len() <= offset, "{:#X} already past {offset:#X}", rom.len());
    rom.resize(offset, 0);
}
