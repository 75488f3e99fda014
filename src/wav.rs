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

//! Decoder for uncompressed RIFF/WAVE containers.
//!
//! Only 16-bit linear PCM, mono or stereo, is accepted. The PCM payload is copied
//! verbatim so it can be handed to the hardware without conversion.

use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;
use std::sync::Arc;

use tracing::debug;

mod error;
#[cfg(test)]
mod tests;

pub use error::DecodeError;

const RIFF_TAG: [u8; 4] = *b"RIFF";
const WAVE_TAG: [u8; 4] = *b"WAVE";
const FMT_TAG: [u8; 4] = *b"fmt ";
const DATA_TAG: [u8; 4] = *b"data";

/// Audio format code for linear PCM.
const FORMAT_PCM: u16 = 1;

/// The only accepted sample width.
const BITS_PER_SAMPLE: u16 = 16;

/// Size of the fixed part of a format description chunk.
const FMT_CHUNK_MIN_SIZE: u32 = 16;

/// Number of bytes in one 16-bit sample.
const BYTES_PER_SAMPLE: usize = 2;

/// Channel layouts accepted by the decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChannelLayout {
    Mono,
    Stereo,
}

impl ChannelLayout {
    /// Maps a channel count from a format chunk to a layout.
    pub fn from_count(count: u16) -> Option<ChannelLayout> {
        match count {
            1 => Some(ChannelLayout::Mono),
            2 => Some(ChannelLayout::Stereo),
            _ => None,
        }
    }

    /// Returns the number of interleaved channels.
    pub fn count(self) -> u16 {
        match self {
            ChannelLayout::Mono => 1,
            ChannelLayout::Stereo => 2,
        }
    }

    /// Returns the size in bytes of one frame (one sample per channel).
    pub fn frame_bytes(self) -> usize {
        self.count() as usize * BYTES_PER_SAMPLE
    }
}

/// Returns the number of frames held by `byte_len` bytes of 16-bit PCM.
pub fn frames_for(byte_len: usize, layout: ChannelLayout) -> usize {
    byte_len / layout.frame_bytes()
}

/// The result of decoding a container: format metadata plus the raw PCM payload.
#[derive(Clone)]
pub struct DecodedWav {
    layout: ChannelLayout,
    sample_rate: u32,
    pcm: Arc<[u8]>,
}

impl DecodedWav {
    pub fn new(layout: ChannelLayout, sample_rate: u32, pcm: Arc<[u8]>) -> DecodedWav {
        DecodedWav {
            layout,
            sample_rate,
            pcm,
        }
    }

    pub fn layout(&self) -> ChannelLayout {
        self.layout
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn pcm(&self) -> &Arc<[u8]> {
        &self.pcm
    }

    /// Returns the number of frames in the payload.
    pub fn frames(&self) -> usize {
        frames_for(self.pcm.len(), self.layout)
    }

    pub(crate) fn into_parts(self) -> (ChannelLayout, u32, Arc<[u8]>) {
        (self.layout, self.sample_rate, self.pcm)
    }
}

impl std::fmt::Debug for DecodedWav {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DecodedWav")
            .field("layout", &self.layout)
            .field("sample_rate", &self.sample_rate)
            .field("bytes", &self.pcm.len())
            .finish()
    }
}

/// The fields of a format description chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct FormatChunk {
    audio_format: u16,
    channels: u16,
    sample_rate: u32,
    byte_rate: u32,
    block_align: u16,
    bits_per_sample: u16,
}

/// Opens and decodes the file at `path`.
pub fn decode_file(path: &Path) -> Result<DecodedWav, DecodeError> {
    let file = File::open(path)?;
    let decoded = decode(BufReader::new(file))?;
    debug!(
        path = ?path,
        channels = decoded.layout.count(),
        sample_rate = decoded.sample_rate,
        bytes = decoded.pcm.len(),
        "Decoded sample"
    );
    Ok(decoded)
}

/// Decodes a container from `reader`. Reading stops at the end of the data chunk;
/// anything after it is left unread.
pub fn decode<R: Read>(mut reader: R) -> Result<DecodedWav, DecodeError> {
    let container = read_tag(&mut reader, "container tag")?;
    if container != RIFF_TAG {
        return Err(DecodeError::UnsupportedFormat(format!(
            "container tag is {}, expected RIFF",
            tag_display(&container)
        )));
    }
    // The top-level size is not used for framing.
    let _ = read_u32(&mut reader, "container size")?;
    let form = read_tag(&mut reader, "form tag")?;
    if form != WAVE_TAG {
        return Err(DecodeError::UnsupportedFormat(format!(
            "form tag is {}, expected WAVE",
            tag_display(&form)
        )));
    }

    let mut format: Option<FormatChunk> = None;
    loop {
        let tag = read_tag(&mut reader, "chunk header")?;
        let size = read_u32(&mut reader, "chunk size")?;

        match tag {
            FMT_TAG => format = Some(read_format_chunk(&mut reader, size)?),
            DATA_TAG => {
                let format = format.ok_or_else(|| {
                    DecodeError::TruncatedOrMalformed(
                        "data chunk precedes the format description".to_string(),
                    )
                })?;
                let layout = ChannelLayout::from_count(format.channels).ok_or_else(|| {
                    DecodeError::UnsupportedFormat(format!("{} channels", format.channels))
                })?;
                let pcm = read_payload(&mut reader, size)?;
                return Ok(DecodedWav {
                    layout,
                    sample_rate: format.sample_rate,
                    pcm,
                });
            }
            // Odd-sized chunks are skipped by their declared size with no pad byte.
            _ => skip_chunk(&mut reader, &tag, size)?,
        }
    }
}

/// Reads and validates a format description chunk of `size` bytes.
fn read_format_chunk<R: Read>(reader: &mut R, size: u32) -> Result<FormatChunk, DecodeError> {
    if size < FMT_CHUNK_MIN_SIZE {
        return Err(DecodeError::TruncatedOrMalformed(format!(
            "format chunk is {} bytes, expected at least {}",
            size, FMT_CHUNK_MIN_SIZE
        )));
    }

    let format = FormatChunk {
        audio_format: read_u16(reader, "audio format")?,
        channels: read_u16(reader, "channel count")?,
        sample_rate: read_u32(reader, "sample rate")?,
        byte_rate: read_u32(reader, "byte rate")?,
        block_align: read_u16(reader, "block alignment")?,
        bits_per_sample: read_u16(reader, "bits per sample")?,
    };
    skip_chunk(reader, &FMT_TAG, size - FMT_CHUNK_MIN_SIZE)?;

    if format.audio_format != FORMAT_PCM {
        return Err(DecodeError::UnsupportedFormat(format!(
            "audio format code {} is not linear PCM",
            format.audio_format
        )));
    }
    if format.bits_per_sample != BITS_PER_SAMPLE {
        return Err(DecodeError::UnsupportedFormat(format!(
            "{} bits per sample, only {} is supported",
            format.bits_per_sample, BITS_PER_SAMPLE
        )));
    }
    if ChannelLayout::from_count(format.channels).is_none() {
        return Err(DecodeError::UnsupportedFormat(format!(
            "{} channels, only mono and stereo are supported",
            format.channels
        )));
    }
    if format.sample_rate == 0 {
        return Err(DecodeError::UnsupportedFormat(
            "sample rate of 0 Hz".to_string(),
        ));
    }

    debug!(
        channels = format.channels,
        sample_rate = format.sample_rate,
        byte_rate = format.byte_rate,
        block_align = format.block_align,
        "Read format chunk"
    );
    Ok(format)
}

/// Copies exactly `size` bytes of payload into a fresh buffer.
fn read_payload<R: Read>(reader: &mut R, size: u32) -> Result<Arc<[u8]>, DecodeError> {
    let expected = size as usize;
    let mut pcm = Vec::new();
    let read = reader.take(u64::from(size)).read_to_end(&mut pcm)?;
    if read < expected {
        return Err(DecodeError::TruncatedOrMalformed(format!(
            "data chunk declares {} bytes but only {} are present",
            expected, read
        )));
    }
    Ok(Arc::from(pcm))
}

fn skip_chunk<R: Read>(reader: &mut R, tag: &[u8; 4], size: u32) -> Result<(), DecodeError> {
    let skipped = io::copy(&mut reader.take(u64::from(size)), &mut io::sink())?;
    if skipped < u64::from(size) {
        return Err(DecodeError::TruncatedOrMalformed(format!(
            "chunk {} declares {} bytes but only {} are present",
            tag_display(tag),
            size,
            skipped
        )));
    }
    Ok(())
}

fn read_exact<R: Read>(reader: &mut R, buf: &mut [u8], what: &str) -> Result<(), DecodeError> {
    reader.read_exact(buf).map_err(|e| match e.kind() {
        io::ErrorKind::UnexpectedEof => {
            DecodeError::TruncatedOrMalformed(format!("stream ended while reading {}", what))
        }
        _ => DecodeError::IoFailure(e),
    })
}

fn read_tag<R: Read>(reader: &mut R, what: &str) -> Result<[u8; 4], DecodeError> {
    let mut tag = [0u8; 4];
    read_exact(reader, &mut tag, what)?;
    Ok(tag)
}

fn read_u16<R: Read>(reader: &mut R, what: &str) -> Result<u16, DecodeError> {
    let mut buf = [0u8; 2];
    read_exact(reader, &mut buf, what)?;
    Ok(u16::from_le_bytes(buf))
}

fn read_u32<R: Read>(reader: &mut R, what: &str) -> Result<u32, DecodeError> {
    let mut buf = [0u8; 4];
    read_exact(reader, &mut buf, what)?;
    Ok(u32::from_le_bytes(buf))
}

fn tag_display(tag: &[u8; 4]) -> String {
    format!("{:?}", String::from_utf8_lossy(tag))
}
