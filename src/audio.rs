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

//! The audio hardware boundary.
//!
//! A driver exposes a small fixed set of playback channels. Each channel accepts
//! wave buffers that it drains asynchronously; the engine only ever polls whether a
//! channel is still playing.

use std::{error::Error, fmt, sync::Arc};

use crate::config;

pub mod cpal;
pub mod format;
pub mod mock;

pub use format::{BufferHalf, ChannelConfig, Interpolation, Mix, PcmFormat, WaveBuf};

/// Index of one hardware playback channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChannelId(pub usize);

impl ChannelId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

pub trait Driver: fmt::Display + Send + Sync {
    /// Number of playback channels the hardware provides.
    fn channel_count(&self) -> usize;

    /// Returns true while the channel still has a submitted buffer to drain.
    fn is_playing(&self, channel: ChannelId) -> bool;

    /// Returns the channel to its initial state, dropping any queued buffers.
    fn reset(&self, channel: ChannelId);

    /// Sets interpolation, rate, sample format and mix for the channel.
    fn configure(&self, channel: ChannelId, config: ChannelConfig);

    /// Makes the buffer's PCM visible to the hardware.
    fn flush(&self, buf: &WaveBuf);

    /// Queues a buffer for playback. Never blocks.
    fn submit(&self, channel: ChannelId, buf: WaveBuf);

    /// Stops the channel and drops any queued buffers.
    fn stop(&self, channel: ChannelId);
}

/// Lists output devices known to cpal.
pub fn list_devices() -> Result<Vec<String>, Box<dyn Error>> {
    self::cpal::Driver::list()
}

/// Gets the driver described by the configuration. Device names starting with "mock"
/// produce a mock driver.
pub fn get_driver(config: &config::Audio) -> Result<Arc<dyn Driver>, Box<dyn Error>> {
    let device = config.device();
    if device.starts_with("mock") {
        return Ok(Arc::new(mock::Driver::get(device, config.channels())));
    };

    Ok(Arc::new(self::cpal::Driver::get(config)?))
}
