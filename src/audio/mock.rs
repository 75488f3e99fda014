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

use parking_lot::Mutex;
use tracing::{debug, warn};

use super::{BufferHalf, ChannelConfig, ChannelId, WaveBuf};

/// A driver call as observed by the mock.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Reset(ChannelId),
    Configure(ChannelId, ChannelConfig),
    Flush { half: BufferHalf, bytes: usize },
    Submit {
        channel: ChannelId,
        half: BufferHalf,
        nsamples: usize,
    },
    Stop(ChannelId),
}

#[derive(Default)]
struct Channel {
    config: Option<ChannelConfig>,
    queue: Vec<WaveBuf>,
}

struct State {
    calls: Vec<Call>,
    channels: Vec<Channel>,
}

/// A mock driver. Doesn't actually play anything; submitted buffers stay queued until
/// the channel is stopped, reset or explicitly finished.
pub struct Driver {
    name: String,
    state: Mutex<State>,
}

impl Driver {
    /// Gets a mock driver with the given number of channels.
    pub fn get(name: &str, channels: usize) -> Driver {
        Driver {
            name: name.to_string(),
            state: Mutex::new(State {
                calls: Vec::new(),
                channels: (0..channels).map(|_| Channel::default()).collect(),
            }),
        }
    }

    /// Returns every call made so far, in order.
    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.state.lock().calls.clear();
    }

    /// Simulates the hardware draining everything queued on the channel.
    pub fn finish(&self, channel: ChannelId) {
        if let Some(ch) = self.state.lock().channels.get_mut(channel.index()) {
            ch.queue.clear();
        }
    }

    /// Returns the buffers still queued on the channel.
    pub fn queued(&self, channel: ChannelId) -> Vec<WaveBuf> {
        self.state
            .lock()
            .channels
            .get(channel.index())
            .map(|ch| ch.queue.clone())
            .unwrap_or_default()
    }

    /// Returns the last configuration applied to the channel.
    pub fn config(&self, channel: ChannelId) -> Option<ChannelConfig> {
        self.state
            .lock()
            .channels
            .get(channel.index())
            .and_then(|ch| ch.config)
    }

    fn with_channel<F>(&self, channel: ChannelId, call: Call, f: F)
    where
        F: FnOnce(&mut Channel),
    {
        let mut state = self.state.lock();
        state.calls.push(call);
        match state.channels.get_mut(channel.index()) {
            Some(ch) => f(ch),
            None => warn!(channel = channel.index(), "Mock channel out of range"),
        }
    }
}

impl super::Driver for Driver {
    fn channel_count(&self) -> usize {
        self.state.lock().channels.len()
    }

    fn is_playing(&self, channel: ChannelId) -> bool {
        self.state
            .lock()
            .channels
            .get(channel.index())
            .is_some_and(|ch| !ch.queue.is_empty())
    }

    fn reset(&self, channel: ChannelId) {
        self.with_channel(channel, Call::Reset(channel), |ch| {
            ch.config = None;
            ch.queue.clear();
        });
    }

    fn configure(&self, channel: ChannelId, config: ChannelConfig) {
        self.with_channel(channel, Call::Configure(channel, config), |ch| {
            ch.config = Some(config);
        });
    }

    fn flush(&self, buf: &WaveBuf) {
        self.state.lock().calls.push(Call::Flush {
            half: buf.half(),
            bytes: buf.data().len(),
        });
    }

    fn submit(&self, channel: ChannelId, buf: WaveBuf) {
        debug!(
            device = self.name,
            channel = channel.index(),
            nsamples = buf.nsamples(),
            "Buffer submitted (mock)"
        );
        let call = Call::Submit {
            channel,
            half: buf.half(),
            nsamples: buf.nsamples(),
        };
        self.with_channel(channel, call, |ch| ch.queue.push(buf));
    }

    fn stop(&self, channel: ChannelId) {
        self.with_channel(channel, Call::Stop(channel), |ch| ch.queue.clear());
    }
}

impl fmt::Display for Driver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (Mock)", self.name)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::audio::Driver as _;
    use crate::wav::ChannelLayout;

    fn wave_buf(half: BufferHalf) -> WaveBuf {
        WaveBuf::new(Arc::from(vec![0u8; 16]), ChannelLayout::Mono, false, half)
    }

    #[test]
    fn test_submit_and_finish() {
        let driver = Driver::get("mock", 4);
        let channel = ChannelId(2);
        assert!(!driver.is_playing(channel));

        driver.submit(channel, wave_buf(BufferHalf::A));
        assert!(driver.is_playing(channel));
        assert_eq!(1, driver.queued(channel).len());

        driver.finish(channel);
        assert!(!driver.is_playing(channel));
    }

    #[test]
    fn test_stop_clears_queue() {
        let driver = Driver::get("mock", 2);
        let channel = ChannelId(0);
        driver.submit(channel, wave_buf(BufferHalf::A));
        driver.submit(channel, wave_buf(BufferHalf::B));
        driver.stop(channel);

        assert!(!driver.is_playing(channel));
        assert_eq!(
            vec![
                Call::Submit {
                    channel,
                    half: BufferHalf::A,
                    nsamples: 8
                },
                Call::Submit {
                    channel,
                    half: BufferHalf::B,
                    nsamples: 8
                },
                Call::Stop(channel),
            ],
            driver.calls()
        );
    }

    #[test]
    fn test_out_of_range_channel() {
        let driver = Driver::get("mock", 1);
        driver.submit(ChannelId(5), wave_buf(BufferHalf::A));
        assert!(!driver.is_playing(ChannelId(5)));
        assert_eq!(1, driver.channel_count());
        assert_eq!("mock (Mock)", driver.to_string());
    }
}
