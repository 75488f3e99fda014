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
use std::{collections::VecDeque, error::Error, fmt, sync::Arc, thread};

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use parking_lot::Mutex;
use tracing::{debug, error, info, span, Level};

use super::{ChannelConfig, ChannelId, Interpolation, PcmFormat, WaveBuf};
use crate::config;

/// Scale factor from 16-bit integer samples to f32.
const I16_SCALE: f32 = 1.0 / 32768.0;

/// The playback state of one emulated hardware channel.
#[derive(Default)]
struct Voice {
    config: Option<ChannelConfig>,
    queue: VecDeque<WaveBuf>,
    /// Fractional read position in frames within the head buffer.
    position: f64,
}

impl Voice {
    fn clear(&mut self) {
        self.queue.clear();
        self.position = 0.0;
    }

    /// Renders one output frame and advances the read position.
    fn next_frame(&mut self, output_rate: u32) -> (f32, f32) {
        let Some(config) = self.config else {
            return (0.0, 0.0);
        };

        loop {
            let Some(buf) = self.queue.front() else {
                return (0.0, 0.0);
            };

            let frames = buf.nsamples();
            if self.position >= frames as f64 {
                // A looping buffer plays until the channel is stopped or reset.
                if buf.looping() && frames > 0 {
                    self.position %= frames as f64;
                    continue;
                }
                self.queue.pop_front();
                self.position = 0.0;
                continue;
            }

            let index = self.position as usize;
            let (l0, r0) = read_frame(buf, config.format, index);
            let (left, right) = match config.interpolation {
                Interpolation::Linear if index + 1 < frames => {
                    let frac = (self.position - index as f64) as f32;
                    let (l1, r1) = read_frame(buf, config.format, index + 1);
                    (l0 + (l1 - l0) * frac, r0 + (r1 - r0) * frac)
                }
                _ => (l0, r0),
            };

            self.position += f64::from(config.rate) / f64::from(output_rate);
            return (left * config.mix.left, right * config.mix.right);
        }
    }
}

/// Reads frame `index` of the buffer as a left/right pair.
fn read_frame(buf: &WaveBuf, format: PcmFormat, index: usize) -> (f32, f32) {
    let frame_bytes = format.layout().frame_bytes();
    let offset = index * frame_bytes;
    let sample = |at: usize| -> f32 {
        buf.data()
            .get(at..at + 2)
            .map(|b| i16::from_le_bytes([b[0], b[1]]) as f32 * I16_SCALE)
            .unwrap_or(0.0)
    };

    match format {
        PcmFormat::Mono16 => {
            let s = sample(offset);
            (s, s)
        }
        PcmFormat::Stereo16 => (sample(offset), sample(offset + 2)),
    }
}

/// Sums every voice into interleaved output frames.
fn render(voices: &mut [Voice], data: &mut [f32], output_channels: usize, output_rate: u32) {
    if output_channels == 0 {
        return;
    }

    for frame in data.chunks_mut(output_channels) {
        let (mut left, mut right) = (0.0f32, 0.0f32);
        for voice in voices.iter_mut() {
            let (l, r) = voice.next_frame(output_rate);
            left += l;
            right += r;
        }
        let (left, right) = (left.clamp(-1.0, 1.0), right.clamp(-1.0, 1.0));

        match frame {
            [mono] => *mono = (left + right) * 0.5,
            [l, r, rest @ ..] => {
                *l = left;
                *r = right;
                rest.fill(0.0);
            }
            [] => {}
        }
    }
}

/// A driver that emulates a fixed pool of hardware voices on a cpal output stream.
pub struct Driver {
    /// The name of the device.
    name: String,
    /// The host ID of the device.
    host_id: cpal::HostId,
    /// Channel state shared with the output callback.
    voices: Arc<Mutex<Vec<Voice>>>,
    /// Dropping this ends the output thread.
    shutdown_tx: Option<crossbeam_channel::Sender<()>>,
    /// Handle to the output thread (keeps the stream alive).
    output_thread: Option<thread::JoinHandle<()>>,
}

impl fmt::Display for Driver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (Voices={}) ({})",
            self.name,
            self.voices.lock().len(),
            self.host_id.name()
        )
    }
}

impl Driver {
    /// Lists the names of cpal output devices.
    pub fn list() -> Result<Vec<String>, Box<dyn Error>> {
        // Suppress noisy output here.
        let _shh_stdout = shh::stdout()?;
        let _shh_stderr = shh::stderr()?;

        let mut names = Vec::new();
        for host_id in cpal::available_hosts() {
            let devices = match cpal::host_from_id(host_id)?.output_devices() {
                Ok(devices) => devices,
                Err(e) => {
                    error!(
                        err = e.to_string(),
                        host = host_id.name(),
                        "Unable to list devices for host"
                    );
                    continue;
                }
            };

            for device in devices {
                #[allow(deprecated)]
                let name = device.name()?;
                names.push(format!("{} ({})", name, host_id.name()));
            }
        }

        names.sort();
        Ok(names)
    }

    /// Opens the configured device and starts its output stream.
    pub fn get(config: &config::Audio) -> Result<Driver, Box<dyn Error>> {
        let host = cpal::default_host();
        let host_id = host.id();
        let device = Self::find_device(&host, config.device())?;
        #[allow(deprecated)]
        let name = device.name()?;

        let voices: Arc<Mutex<Vec<Voice>>> = Arc::new(Mutex::new(
            (0..config.channels()).map(|_| Voice::default()).collect(),
        ));
        let (shutdown_tx, shutdown_rx) = crossbeam_channel::bounded::<()>(0);
        let (ready_tx, ready_rx) = crossbeam_channel::bounded::<Result<(), String>>(1);

        // cpal streams are not Send, so the stream lives on its own thread.
        let output_thread = {
            let voices = voices.clone();
            thread::spawn(move || {
                let span = span!(Level::INFO, "audio output");
                let _enter = span.enter();

                let stream = match Self::start_stream(&device, voices) {
                    Ok(stream) => stream,
                    Err(e) => {
                        let _ = ready_tx.send(Err(e.to_string()));
                        return;
                    }
                };
                let _ = ready_tx.send(Ok(()));

                // Blocks until the driver is dropped.
                let _ = shutdown_rx.recv();
                drop(stream);
                debug!("Output stream closed");
            })
        };

        match ready_rx.recv() {
            Ok(Ok(())) => {}
            Ok(Err(e)) => return Err(e.into()),
            Err(_) => return Err("audio output thread exited before starting".into()),
        }

        info!(device = name, voices = config.channels(), "Audio driver started");
        Ok(Driver {
            name,
            host_id,
            voices,
            shutdown_tx: Some(shutdown_tx),
            output_thread: Some(output_thread),
        })
    }

    fn find_device(host: &cpal::Host, name: &str) -> Result<cpal::Device, Box<dyn Error>> {
        if name == "default" {
            return host
                .default_output_device()
                .ok_or_else(|| "no default output device".into());
        }

        for device in host.output_devices()? {
            #[allow(deprecated)]
            let device_name = device.name()?;
            if device_name == name {
                return Ok(device);
            }
        }
        Err(format!("no output device named {}", name).into())
    }

    fn start_stream(
        device: &cpal::Device,
        voices: Arc<Mutex<Vec<Voice>>>,
    ) -> Result<cpal::Stream, Box<dyn Error>> {
        let supported = device.default_output_config()?;
        if supported.sample_format() != cpal::SampleFormat::F32 {
            return Err(format!(
                "unsupported output sample format {} (only f32 is supported)",
                supported.sample_format()
            )
            .into());
        }

        let output_rate = supported.sample_rate();
        let output_channels = supported.channels() as usize;
        let config: cpal::StreamConfig = supported.into();

        let stream = device.build_output_stream(
            &config,
            move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                // Never wait on the engine thread from the callback.
                match voices.try_lock() {
                    Some(mut voices) => render(&mut voices, data, output_channels, output_rate),
                    None => data.fill(0.0),
                }
            },
            |err| error!("CPAL output stream error: {}", err),
            None,
        )?;
        stream.play()?;

        info!(
            sample_rate = output_rate,
            channels = output_channels,
            "CPAL output stream started"
        );
        Ok(stream)
    }

    fn with_voice<F>(&self, channel: ChannelId, f: F)
    where
        F: FnOnce(&mut Voice),
    {
        match self.voices.lock().get_mut(channel.index()) {
            Some(voice) => f(voice),
            None => error!(channel = channel.index(), "Channel out of range"),
        }
    }
}

impl super::Driver for Driver {
    fn channel_count(&self) -> usize {
        self.voices.lock().len()
    }

    fn is_playing(&self, channel: ChannelId) -> bool {
        self.voices
            .lock()
            .get(channel.index())
            .is_some_and(|voice| !voice.queue.is_empty())
    }

    fn reset(&self, channel: ChannelId) {
        self.with_voice(channel, |voice| {
            voice.clear();
            voice.config = None;
        });
    }

    fn configure(&self, channel: ChannelId, config: ChannelConfig) {
        self.with_voice(channel, |voice| voice.config = Some(config));
    }

    fn flush(&self, _buf: &WaveBuf) {
        // The output callback reads the same memory the engine wrote; nothing to flush.
    }

    fn submit(&self, channel: ChannelId, buf: WaveBuf) {
        self.with_voice(channel, |voice| voice.queue.push_back(buf));
    }

    fn stop(&self, channel: ChannelId) {
        self.with_voice(channel, Voice::clear);
    }
}

impl Drop for Driver {
    fn drop(&mut self) {
        self.shutdown_tx.take();
        if let Some(thread) = self.output_thread.take() {
            let _ = thread.join();
        }
    }
}
