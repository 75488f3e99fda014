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
use std::{fmt, sync::Arc};

use crate::wav::{frames_for, ChannelLayout};

/// Sample formats a hardware channel can play.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PcmFormat {
    Mono16,
    Stereo16,
}

impl PcmFormat {
    pub fn layout(self) -> ChannelLayout {
        match self {
            PcmFormat::Mono16 => ChannelLayout::Mono,
            PcmFormat::Stereo16 => ChannelLayout::Stereo,
        }
    }

    /// Convert to string representation
    pub fn as_str(self) -> &'static str {
        match self {
            PcmFormat::Mono16 => "mono16",
            PcmFormat::Stereo16 => "stereo16",
        }
    }
}

impl From<ChannelLayout> for PcmFormat {
    fn from(layout: ChannelLayout) -> Self {
        match layout {
            ChannelLayout::Mono => PcmFormat::Mono16,
            ChannelLayout::Stereo => PcmFormat::Stereo16,
        }
    }
}

impl fmt::Display for PcmFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How the channel reads between source frames when its rate differs from the output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interpolation {
    None,
    Linear,
}

/// Left/right gains applied to a channel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Mix {
    pub left: f32,
    pub right: f32,
}

impl Mix {
    pub const UNITY: Mix = Mix {
        left: 1.0,
        right: 1.0,
    };
}

/// Playback parameters for one hardware channel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChannelConfig {
    pub interpolation: Interpolation,
    /// Source sample rate in Hz.
    pub rate: u32,
    pub format: PcmFormat,
    pub mix: Mix,
}

/// One of the two alternating buffer descriptors a sample owns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BufferHalf {
    A,
    B,
}

impl BufferHalf {
    pub fn index(self) -> usize {
        match self {
            BufferHalf::A => 0,
            BufferHalf::B => 1,
        }
    }

    pub fn other(self) -> BufferHalf {
        match self {
            BufferHalf::A => BufferHalf::B,
            BufferHalf::B => BufferHalf::A,
        }
    }
}

/// A wave buffer descriptor as handed to the hardware.
///
/// The descriptor shares the sample's PCM storage, so the bytes stay alive for as
/// long as the hardware holds the descriptor.
#[derive(Clone)]
pub struct WaveBuf {
    data: Arc<[u8]>,
    nsamples: usize,
    looping: bool,
    half: BufferHalf,
}

impl WaveBuf {
    /// Describes the whole of `data` as `layout` frames.
    pub fn new(data: Arc<[u8]>, layout: ChannelLayout, looping: bool, half: BufferHalf) -> WaveBuf {
        let nsamples = frames_for(data.len(), layout);
        WaveBuf {
            data,
            nsamples,
            looping,
            half,
        }
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Number of frames to play.
    pub fn nsamples(&self) -> usize {
        self.nsamples
    }

    pub fn looping(&self) -> bool {
        self.looping
    }

    pub fn half(&self) -> BufferHalf {
        self.half
    }

    /// Returns true if this descriptor points at `data`.
    pub fn shares(&self, data: &Arc<[u8]>) -> bool {
        Arc::ptr_eq(&self.data, data)
    }
}

impl fmt::Debug for WaveBuf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WaveBuf")
            .field("bytes", &self.data.len())
            .field("nsamples", &self.nsamples)
            .field("looping", &self.looping)
            .field("half", &self.half)
            .finish()
    }
}
