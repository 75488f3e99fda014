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
use tracing::debug;

use super::AudioSample;
use crate::audio::{ChannelConfig, ChannelId, Driver, Interpolation, Mix, PcmFormat};

/// Starts `sample` on `channel`.
///
/// The channel is reset and configured for the sample's rate and layout, then the
/// half not submitted last is filled, flushed and queued. Never blocks; completion
/// is only visible through the driver's playing state.
pub fn trigger(driver: &dyn Driver, sample: &mut AudioSample, channel: ChannelId) {
    driver.reset(channel);
    driver.configure(
        channel,
        ChannelConfig {
            interpolation: Interpolation::Linear,
            rate: sample.sample_rate(),
            format: PcmFormat::from(sample.layout()),
            mix: Mix::UNITY,
        },
    );

    let half = sample.next_half();
    let buf = sample.populate(half).clone();
    driver.flush(&buf);

    debug!(
        channel = channel.index(),
        ?half,
        nsamples = buf.nsamples(),
        rate = sample.sample_rate(),
        "Submitting buffer"
    );
    driver.submit(channel, buf);
}
