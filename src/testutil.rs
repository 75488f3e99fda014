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
use std::error::Error;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use hound::{SampleFormat, WavSpec, WavWriter};

use crate::wav::{ChannelLayout, DecodedWav};

/// Builds RIFF/WAVE byte streams chunk by chunk, including malformed ones.
pub struct ContainerBuilder {
    container_tag: [u8; 4],
    form_tag: [u8; 4],
    chunks: Vec<u8>,
}

impl ContainerBuilder {
    pub fn new() -> ContainerBuilder {
        ContainerBuilder {
            container_tag: *b"RIFF",
            form_tag: *b"WAVE",
            chunks: Vec::new(),
        }
    }

    pub fn container_tag(mut self, tag: &[u8; 4]) -> ContainerBuilder {
        self.container_tag = *tag;
        self
    }

    pub fn form_tag(mut self, tag: &[u8; 4]) -> ContainerBuilder {
        self.form_tag = *tag;
        self
    }

    /// Appends a chunk whose declared size matches its body.
    pub fn chunk(self, tag: &[u8; 4], body: &[u8]) -> ContainerBuilder {
        let size = body.len() as u32;
        self.chunk_with_size(tag, size, body)
    }

    /// Appends a chunk with an arbitrary declared size. No pad byte is written.
    pub fn chunk_with_size(mut self, tag: &[u8; 4], size: u32, body: &[u8]) -> ContainerBuilder {
        self.chunks.extend_from_slice(tag);
        self.chunks.extend_from_slice(&size.to_le_bytes());
        self.chunks.extend_from_slice(body);
        self
    }

    /// Appends a 16 byte format description chunk.
    pub fn format(
        self,
        audio_format: u16,
        channels: u16,
        sample_rate: u32,
        bits_per_sample: u16,
    ) -> ContainerBuilder {
        let body = format_body(audio_format, channels, sample_rate, bits_per_sample);
        self.chunk(b"fmt ", &body)
    }

    /// Appends a 16-bit linear PCM format description chunk.
    pub fn pcm16(self, channels: u16, sample_rate: u32) -> ContainerBuilder {
        self.format(1, channels, sample_rate, 16)
    }

    pub fn data(self, body: &[u8]) -> ContainerBuilder {
        self.chunk(b"data", body)
    }

    pub fn build(self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(12 + self.chunks.len());
        bytes.extend_from_slice(&self.container_tag);
        bytes.extend_from_slice(&(4 + self.chunks.len() as u32).to_le_bytes());
        bytes.extend_from_slice(&self.form_tag);
        bytes.extend_from_slice(&self.chunks);
        bytes
    }
}

/// The body of a format description chunk.
pub fn format_body(
    audio_format: u16,
    channels: u16,
    sample_rate: u32,
    bits_per_sample: u16,
) -> Vec<u8> {
    let block_align = channels * bits_per_sample / 8;
    let byte_rate = sample_rate * u32::from(block_align);
    [
        &audio_format.to_le_bytes()[..],
        &channels.to_le_bytes(),
        &sample_rate.to_le_bytes(),
        &byte_rate.to_le_bytes(),
        &block_align.to_le_bytes(),
        &bits_per_sample.to_le_bytes(),
    ]
    .concat()
}

/// A deterministic, non-constant payload of `len` bytes.
pub fn pcm_bytes(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i % 251) as u8).collect()
}

/// A decoded sample built directly, bypassing the decoder.
pub fn decoded(layout: ChannelLayout, sample_rate: u32, len: usize) -> DecodedWav {
    DecodedWav::new(layout, sample_rate, Arc::from(pcm_bytes(len)))
}

/// Writes a well-formed 16-bit container with `data_len` payload bytes.
pub fn write_container(
    path: &Path,
    channels: u16,
    sample_rate: u32,
    data_len: usize,
) -> Result<(), Box<dyn Error>> {
    let bytes = ContainerBuilder::new()
        .pcm16(channels, sample_rate)
        .data(&pcm_bytes(data_len))
        .build();
    fs::write(path, bytes)?;
    Ok(())
}

/// Writes a 16-bit file through hound, one interleaved frame per entry.
pub fn write_wav(
    path: &Path,
    channels: u16,
    sample_rate: u32,
    frames: &[Vec<i16>],
) -> Result<(), Box<dyn Error>> {
    let mut writer = WavWriter::create(
        path,
        WavSpec {
            channels,
            sample_rate,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        },
    )?;

    for frame in frames {
        assert_eq!(frame.len(), channels as usize, "Frame width mismatch");
        for sample in frame {
            writer.write_sample(*sample)?;
        }
    }
    writer.finalize()?;

    Ok(())
}
