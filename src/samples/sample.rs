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
use std::fmt;
use std::sync::Arc;

use crate::audio::{BufferHalf, ChannelId, WaveBuf};
use crate::wav::{ChannelLayout, DecodedWav};

/// The decoded sample owned by a pad, plus its playback bookkeeping.
pub struct AudioSample {
    /// The PCM payload. Wave descriptors share this storage.
    pcm: Arc<[u8]>,
    layout: ChannelLayout,
    sample_rate: u32,
    /// The A and B descriptors, populated as triggers use them.
    wave_bufs: [Option<WaveBuf>; 2],
    /// The half most recently submitted, if any.
    which: Option<BufferHalf>,
    /// The hardware channel this sample currently holds.
    channel: Option<ChannelId>,
}

impl AudioSample {
    pub fn new(decoded: DecodedWav) -> AudioSample {
        let (layout, sample_rate, pcm) = decoded.into_parts();
        AudioSample {
            pcm,
            layout,
            sample_rate,
            wave_bufs: [None, None],
            which: None,
            channel: None,
        }
    }

    /// Installs a newly decoded payload in place of the current one.
    ///
    /// The caller must have stopped and released the sample's channel first, so the
    /// hardware no longer holds a descriptor for the old payload. The old storage is
    /// dropped here, and the double buffer and channel ownership start over.
    pub fn replace(&mut self, decoded: DecodedWav) {
        debug_assert!(
            self.channel.is_none(),
            "sample replaced while it still holds a channel"
        );

        let (layout, sample_rate, pcm) = decoded.into_parts();
        self.wave_bufs = [None, None];
        self.pcm = pcm;
        self.layout = layout;
        self.sample_rate = sample_rate;
        self.which = None;
        self.channel = None;
    }

    pub fn pcm(&self) -> &Arc<[u8]> {
        &self.pcm
    }

    /// Length of the payload in bytes.
    pub fn len(&self) -> usize {
        self.pcm.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pcm.is_empty()
    }

    pub fn layout(&self) -> ChannelLayout {
        self.layout
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn which(&self) -> Option<BufferHalf> {
        self.which
    }

    pub fn channel(&self) -> Option<ChannelId> {
        self.channel
    }

    pub(crate) fn set_channel(&mut self, channel: Option<ChannelId>) {
        self.channel = channel;
    }

    pub fn wave_buf(&self, half: BufferHalf) -> Option<&WaveBuf> {
        self.wave_bufs[half.index()].as_ref()
    }

    /// Flips to the half that was not submitted last and returns it. The first call
    /// yields A.
    pub(crate) fn next_half(&mut self) -> BufferHalf {
        let half = self.which.map_or(BufferHalf::A, BufferHalf::other);
        self.which = Some(half);
        half
    }

    /// Points the given half's descriptor at the whole payload.
    pub(crate) fn populate(&mut self, half: BufferHalf) -> &WaveBuf {
        self.wave_bufs[half.index()].insert(WaveBuf::new(
            self.pcm.clone(),
            self.layout,
            false,
            half,
        ))
    }
}

impl fmt::Debug for AudioSample {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AudioSample")
            .field("layout", &self.layout)
            .field("sample_rate", &self.sample_rate)
            .field("bytes", &self.pcm.len())
            .field("which", &self.which)
            .field("channel", &self.channel)
            .finish()
    }
}
