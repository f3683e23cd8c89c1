//! Round-trip and measurement cross-checks against the reference encoder.

mod common;

use common::{encode, sample, tokenize};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use slikit::Error;
use slikit::compression::{Header, Tag, block_length, decode, decompress};

const TAGS: [Tag; 4] = [Tag::Mio0, Tag::Yay0, Tag::Yaz0, Tag::Smsr00];

fn tag_strategy() -> impl Strategy<Value = Tag> {
    prop_oneof![
        Just(Tag::Mio0),
        Just(Tag::Yay0),
        Just(Tag::Yaz0),
        Just(Tag::Smsr00),
    ]
}

proptest! {
    /// Decoding reproduces the plaintext and measurement covers exactly
    /// the encoded block.
    #[test]
    fn decode_inverts_reference_encoder(
        data in prop::collection::vec(prop::sample::select(b"ab c\0".to_vec()), 1..700),
        tag in tag_strategy(),
    ) {
        let block = encode(&data, tag);
        prop_assert_eq!(decode(&block).map_err(|e| TestCaseError::fail(e.to_string()))?, data);
        prop_assert_eq!(
            block_length(&block, 0, tag).map_err(|e| TestCaseError::fail(e.to_string()))?,
            block.len()
        );
    }

    /// Measurement is unaffected by where the block sits or what follows.
    #[test]
    fn measurement_is_position_independent(
        prefix in prop::collection::vec(any::<u8>(), 0..64),
        suffix in prop::collection::vec(any::<u8>(), 0..64),
        seed in any::<u32>(),
        tag in tag_strategy(),
    ) {
        let data = sample(300, seed);
        let block = encode(&data, tag);
        let mut buf = prefix.clone();
        buf.extend_from_slice(&block);
        buf.extend_from_slice(&suffix);

        let header = Header::parse(&buf, prefix.len(), tag)
            .map_err(|e| TestCaseError::fail(e.to_string()))?;
        prop_assert_eq!(
            block_length(&buf, prefix.len(), tag).map_err(|e| TestCaseError::fail(e.to_string()))?,
            block.len()
        );
        prop_assert_eq!(
            decompress(&buf, &header).map_err(|e| TestCaseError::fail(e.to_string()))?,
            data
        );
    }
}

#[test]
fn long_runs_use_extended_lengths() {
    let mut data = vec![0x11u8; 1000];
    data.extend_from_slice(b"tail");
    for tag in TAGS {
        let block = encode(&data, tag);
        assert_eq!(decode(&block).unwrap(), data, "{tag}");
        assert_eq!(block_length(&block, 0, tag).unwrap(), block.len(), "{tag}");
    }
    let longest = tokenize(&data, Tag::Yaz0)
        .iter()
        .filter_map(|op| match op {
            common::Op::Copy { length, .. } => Some(*length),
            common::Op::Literal(_) => None,
        })
        .max();
    assert_eq!(longest, Some(0xFF + 18));
}

#[test]
fn references_reach_the_whole_window() {
    let head = sample(0x1000, 7);
    let mut data = head.clone();
    data.extend_from_slice(&head[..64]);
    for tag in TAGS {
        let block = encode(&data, tag);
        assert_eq!(decode(&block).unwrap(), data, "{tag}");
    }
}

#[test]
fn yaz0_literal_scenario() {
    // "Yaz0", two zero words, size, then 0xFF and N literals.
    let mut block = b"Yaz0".to_vec();
    block.extend_from_slice(&7u32.to_be_bytes());
    block.extend_from_slice(&[0; 8]);
    block.push(0xFF);
    block.extend_from_slice(b"literal");
    assert_eq!(decode(&block).unwrap(), b"literal");
    assert_eq!(block_length(&block, 0, Tag::Yaz0).unwrap(), 16 + 1 + 7);
}

#[test]
fn corrupt_blocks_fail_both_passes() {
    for tag in TAGS {
        let data = sample(200, 3);
        let mut block = encode(&data, tag);
        // Drop the final byte: both passes run out of input together.
        block.pop();
        assert!(
            matches!(block_length(&block, 0, tag), Err(Error::UnexpectedEof)),
            "{tag}"
        );
        assert!(matches!(decode(&block), Err(Error::UnexpectedEof)), "{tag}");
    }
}

#[test]
fn declared_size_bounds() {
    for size in [0u32, 0x3FFF_FFFE, 0x3FFF_FFFF] {
        let mut block = b"Yaz0".to_vec();
        block.extend_from_slice(&size.to_be_bytes());
        block.extend_from_slice(&[0; 8]);
        block.extend_from_slice(&[0xFF; 16]);
        let measured = block_length(&block, 0, Tag::Yaz0);
        assert!(
            matches!(measured, Err(Error::UnsupportedSize(s)) if s == size),
            "{size:#X}"
        );
        assert!(matches!(decode(&block), Err(Error::UnsupportedSize(_))));
    }

    // 0x3FFF_FFFD passes header validation; the stream then runs dry.
    let mut block = b"Yaz0".to_vec();
    block.extend_from_slice(&0x3FFF_FFFDu32.to_be_bytes());
    block.extend_from_slice(&[0; 8]);
    let header = Header::parse(&block, 0, Tag::Yaz0).unwrap();
    assert_eq!(header.decoded_size, 0x3FFF_FFFD);
    assert!(matches!(
        block_length(&block, 0, Tag::Yaz0),
        Err(Error::UnexpectedEof)
    ));
}
