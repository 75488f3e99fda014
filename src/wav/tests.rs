// Copyright (C) 2026 Michael Wilson <mike@mdwn.dev>
//
// This program is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License as published by the Free Software
// Foundation, version 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//
use std::io::Cursor;

use super::*;
use crate::testutil::{format_body, pcm_bytes, write_wav, ContainerBuilder};

#[test]
fn test_decode_mono_pcm16() {
    let payload = pcm_bytes(1000);
    let bytes = ContainerBuilder::new()
        .pcm16(1, 22050)
        .data(&payload)
        .build();

    let decoded = decode(Cursor::new(bytes)).expect("decode failed");
    assert_eq!(ChannelLayout::Mono, decoded.layout());
    assert_eq!(22050, decoded.sample_rate());
    assert_eq!(500, decoded.frames());
    assert_eq!(&payload[..], &decoded.pcm()[..]);
}

#[test]
fn test_decode_stereo_file() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("stereo.wav");
    let frames: Vec<Vec<i16>> = (0..64).map(|i| vec![i as i16, -(i as i16)]).collect();
    write_wav(&path, 2, 44100, &frames)?;

    let decoded = decode_file(&path)?;
    assert_eq!(ChannelLayout::Stereo, decoded.layout());
    assert_eq!(44100, decoded.sample_rate());
    assert_eq!(64, decoded.frames());
    assert_eq!(256, decoded.pcm().len());

    // Second frame: left = 1, right = -1.
    assert_eq!(&1i16.to_le_bytes()[..], &decoded.pcm()[4..6]);
    assert_eq!(&(-1i16).to_le_bytes()[..], &decoded.pcm()[6..8]);
    Ok(())
}

#[test]
fn test_decode_rejects_8_bit() {
    let bytes = ContainerBuilder::new()
        .format(1, 1, 22050, 8)
        .data(&pcm_bytes(100))
        .build();

    let result = decode(Cursor::new(bytes));
    assert!(matches!(result, Err(DecodeError::UnsupportedFormat(_))));
}

#[test]
fn test_decode_rejects_non_pcm() {
    // Format code 3 is IEEE float.
    let bytes = ContainerBuilder::new()
        .format(3, 2, 48000, 16)
        .data(&pcm_bytes(100))
        .build();

    let result = decode(Cursor::new(bytes));
    assert!(matches!(result, Err(DecodeError::UnsupportedFormat(_))));
}

#[test]
fn test_decode_rejects_unsupported_before_reading_payload() {
    // The data chunk lies about its size. If the payload were read first this would
    // surface as truncation instead.
    let bytes = ContainerBuilder::new()
        .format(1, 1, 22050, 24)
        .chunk_with_size(b"data", 1_000_000, &pcm_bytes(10))
        .build();

    let result = decode(Cursor::new(bytes));
    assert!(matches!(result, Err(DecodeError::UnsupportedFormat(_))));
}

#[test]
fn test_decode_rejects_surround() {
    let bytes = ContainerBuilder::new()
        .pcm16(6, 48000)
        .data(&pcm_bytes(120))
        .build();

    let result = decode(Cursor::new(bytes));
    assert!(matches!(result, Err(DecodeError::UnsupportedFormat(_))));
}

#[test]
fn test_decode_rejects_bad_container_tags() {
    let bytes = ContainerBuilder::new()
        .container_tag(b"RIFX")
        .pcm16(1, 22050)
        .data(&pcm_bytes(10))
        .build();
    assert!(matches!(
        decode(Cursor::new(bytes)),
        Err(DecodeError::UnsupportedFormat(_))
    ));

    let bytes = ContainerBuilder::new()
        .form_tag(b"AVI ")
        .pcm16(1, 22050)
        .data(&pcm_bytes(10))
        .build();
    assert!(matches!(
        decode(Cursor::new(bytes)),
        Err(DecodeError::UnsupportedFormat(_))
    ));
}

#[test]
fn test_decode_truncated_payload() {
    let mut bytes = ContainerBuilder::new()
        .pcm16(2, 44100)
        .data(&pcm_bytes(400))
        .build();
    bytes.truncate(bytes.len() - 100);

    let result = decode(Cursor::new(bytes));
    assert!(matches!(result, Err(DecodeError::TruncatedOrMalformed(_))));
}

#[test]
fn test_decode_missing_data_chunk() {
    let bytes = ContainerBuilder::new().pcm16(1, 22050).build();

    let result = decode(Cursor::new(bytes));
    assert!(matches!(result, Err(DecodeError::TruncatedOrMalformed(_))));
}

#[test]
fn test_decode_missing_format_chunk() {
    let bytes = ContainerBuilder::new().data(&pcm_bytes(100)).build();

    let result = decode(Cursor::new(bytes));
    assert!(matches!(result, Err(DecodeError::TruncatedOrMalformed(_))));
}

#[test]
fn test_decode_empty_stream() {
    let result = decode(Cursor::new(Vec::new()));
    assert!(matches!(result, Err(DecodeError::TruncatedOrMalformed(_))));
}

#[test]
fn test_decode_short_format_chunk() {
    let bytes = ContainerBuilder::new()
        .chunk(b"fmt ", &format_body(1, 1, 22050, 16)[..12])
        .data(&pcm_bytes(10))
        .build();

    let result = decode(Cursor::new(bytes));
    assert!(matches!(result, Err(DecodeError::TruncatedOrMalformed(_))));
}

#[test]
fn test_decode_skips_foreign_chunks() {
    let payload = pcm_bytes(64);
    let bytes = ContainerBuilder::new()
        .chunk(b"LIST", b"INFOISFT\x04\x00\x00\x00test")
        .pcm16(2, 32000)
        .chunk(b"fact", &16u32.to_le_bytes())
        .data(&payload)
        .build();

    let decoded = decode(Cursor::new(bytes)).expect("decode failed");
    assert_eq!(ChannelLayout::Stereo, decoded.layout());
    assert_eq!(32000, decoded.sample_rate());
    assert_eq!(16, decoded.frames());
    assert_eq!(&payload[..], &decoded.pcm()[..]);
}

#[test]
fn test_decode_extended_format_chunk() {
    // An 18 byte format chunk carries a trailing extension size.
    let mut body = format_body(1, 1, 8000, 16);
    body.extend_from_slice(&0u16.to_le_bytes());
    let bytes = ContainerBuilder::new()
        .chunk(b"fmt ", &body)
        .data(&pcm_bytes(8))
        .build();

    let decoded = decode(Cursor::new(bytes)).expect("decode failed");
    assert_eq!(4, decoded.frames());
}

#[test]
fn test_decode_odd_chunk_is_not_padded() {
    let bytes = ContainerBuilder::new()
        .chunk(b"junk", b"abc")
        .pcm16(1, 22050)
        .data(&pcm_bytes(6))
        .build();

    let decoded = decode(Cursor::new(bytes)).expect("decode failed");
    assert_eq!(3, decoded.frames());
}

#[test]
fn test_decode_stops_after_data_chunk() {
    let mut bytes = ContainerBuilder::new()
        .pcm16(1, 22050)
        .data(&pcm_bytes(20))
        .build();
    let data_end = bytes.len() as u64;
    bytes.extend_from_slice(b"LIST\x04\x00\x00\x00tail");

    let mut cursor = Cursor::new(bytes);
    let decoded = decode(&mut cursor).expect("decode failed");
    assert_eq!(10, decoded.frames());
    assert_eq!(data_end, cursor.position());
}

#[test]
fn test_decode_file_missing() {
    let dir = tempfile::tempdir().expect("tempdir");
    let result = decode_file(&dir.path().join("nope.wav"));
    assert!(matches!(result, Err(DecodeError::IoFailure(_))));
}

#[test]
fn test_frames_for() {
    assert_eq!(2000, frames_for(8000, ChannelLayout::Stereo));
    assert_eq!(4000, frames_for(8000, ChannelLayout::Mono));
    // Trailing partial frames are dropped.
    assert_eq!(1, frames_for(7, ChannelLayout::Stereo));
}
