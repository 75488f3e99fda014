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

//! The engine owns the pads, the channel pool and the hardware driver, and carries
//! out every pad-level operation.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, error, info, warn};

use super::arbiter::{Acquired, ChannelPool, Owner};
use super::error::AssignError;
use super::sample::AudioSample;
use super::trigger::trigger;
use crate::audio::{ChannelId, Driver};
use crate::util::filename_display;
use crate::wav::{self, DecodeError};

/// Number of pads on the board.
pub const NUM_PADS: usize = 8;

/// Pads per row of the grid.
pub const PAD_COLUMNS: usize = 4;

/// One pad of the board.
#[derive(Debug, Default)]
pub struct Pad {
    sample: Option<AudioSample>,
    /// Where the current sample was loaded from.
    path: Option<PathBuf>,
    /// Display only.
    pressed: bool,
}

impl Pad {
    pub fn sample(&self) -> Option<&AudioSample> {
        self.sample.as_ref()
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn pressed(&self) -> bool {
        self.pressed
    }

    pub fn is_loaded(&self) -> bool {
        self.sample.is_some()
    }
}

pub struct Engine {
    driver: Arc<dyn Driver>,
    pads: [Pad; NUM_PADS],
    pool: ChannelPool,
    /// The channel last used for previews.
    preview_channel: Option<ChannelId>,
    /// Last message for the status line.
    status: Option<String>,
}

impl Engine {
    pub fn new(driver: Arc<dyn Driver>) -> Engine {
        let pool = ChannelPool::new(driver.channel_count());
        info!(
            driver = driver.to_string(),
            channels = pool.len(),
            pads = NUM_PADS,
            "Engine created"
        );

        Engine {
            driver,
            pads: Default::default(),
            pool,
            preview_channel: None,
            status: None,
        }
    }

    pub fn pads(&self) -> &[Pad] {
        &self.pads
    }

    pub fn pad(&self, index: usize) -> Option<&Pad> {
        self.pads.get(index)
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    pub fn set_status(&mut self, status: impl Into<String>) {
        self.status = Some(status.into());
    }

    /// Loads the startup samples, the nth file going to pad n. A file that fails to
    /// decode leaves its pad unset. Returns the number of pads loaded.
    pub fn load_startup(&mut self, files: &[PathBuf]) -> usize {
        if files.len() > NUM_PADS {
            warn!(
                files = files.len(),
                pads = NUM_PADS,
                "More startup files than pads, ignoring the rest"
            );
        }

        let mut loaded = 0;
        for (index, path) in files.iter().take(NUM_PADS).enumerate() {
            match wav::decode_file(path) {
                Ok(decoded) => {
                    self.pads[index] = Pad {
                        sample: Some(AudioSample::new(decoded)),
                        path: Some(path.clone()),
                        pressed: false,
                    };
                    loaded += 1;
                }
                Err(e) => {
                    error!(pad = index, path = ?path, err = %e, "Unable to load pad sample");
                }
            }
        }

        info!(loaded, "Startup samples loaded");
        loaded
    }

    /// Plays the pad's sample. Retriggering a playing pad chokes the previous voice.
    /// A pad without a sample does nothing.
    pub fn trigger_pad(&mut self, index: usize) {
        let Some(pad) = self.pads.get_mut(index) else {
            warn!(pad = index, "No such pad");
            return;
        };
        let Some(sample) = pad.sample.as_mut() else {
            debug!(pad = index, "Pad has no sample");
            return;
        };
        pad.pressed = true;

        let current = sample.channel();
        let acquired = self
            .pool
            .acquire(self.driver.as_ref(), Owner::Pad(index), current);
        sample.set_channel(Some(acquired.channel));
        trigger(self.driver.as_ref(), sample, acquired.channel);
        info!(
            pad = index,
            channel = acquired.channel.index(),
            "Pad triggered"
        );

        self.forget_evicted(acquired);
    }

    /// Clears the pad's pressed flag. Playback continues to the end of the sample.
    pub fn release_pad(&mut self, index: usize) {
        if let Some(pad) = self.pads.get_mut(index) {
            pad.pressed = false;
        }
    }

    /// Decodes `path` and installs it on the pad, stopping the pad's voice first. On
    /// failure the pad keeps its previous sample and the status line explains why.
    pub fn assign(&mut self, index: usize, path: &Path) -> Result<(), AssignError> {
        if index >= NUM_PADS {
            warn!(pad = index, "No such pad");
            return Err(AssignError::NoSuchPad(index));
        }

        let decoded = match wav::decode_file(path) {
            Ok(decoded) => decoded,
            Err(e) => {
                error!(pad = index, path = ?path, err = %e, "Unable to assign sample");
                self.set_status(format!("{}: {}", filename_display(path), e));
                return Err(e.into());
            }
        };

        let pad = &mut self.pads[index];
        match pad.sample.as_mut() {
            Some(sample) => {
                // The voice must be gone before the old payload is dropped.
                self.pool
                    .release(self.driver.as_ref(), Owner::Pad(index), sample.channel());
                sample.set_channel(None);
                sample.replace(decoded);
            }
            None => pad.sample = Some(AudioSample::new(decoded)),
        }
        pad.path = Some(path.to_path_buf());

        info!(pad = index, path = ?path, "Sample assigned");
        self.set_status(format!("Pad {}: {}", index + 1, filename_display(path)));
        Ok(())
    }

    /// Plays `path` once on the preview channel without attaching it to a pad.
    pub fn preview(&mut self, path: &Path) -> Result<(), DecodeError> {
        let decoded = match wav::decode_file(path) {
            Ok(decoded) => decoded,
            Err(e) => {
                warn!(path = ?path, err = %e, "Unable to preview file");
                self.set_status(format!("{}: {}", filename_display(path), e));
                return Err(e);
            }
        };

        let mut sample = AudioSample::new(decoded);
        let acquired = self
            .pool
            .acquire(self.driver.as_ref(), Owner::Preview, self.preview_channel);
        self.preview_channel = Some(acquired.channel);
        trigger(self.driver.as_ref(), &mut sample, acquired.channel);
        self.forget_evicted(acquired);

        // The submitted descriptor keeps the payload alive until the channel drops it.
        drop(sample);
        info!(path = ?path, channel = acquired.channel.index(), "Preview submitted");
        Ok(())
    }

    /// Stops every channel. Samples are dropped only after this returns.
    pub fn shutdown(&mut self) {
        self.pool.release_all(self.driver.as_ref());
        for pad in self.pads.iter_mut() {
            if let Some(sample) = pad.sample.as_mut() {
                sample.set_channel(None);
            }
            pad.pressed = false;
        }
        self.preview_channel = None;
        info!("All channels stopped");
    }

    fn forget_evicted(&mut self, acquired: Acquired) {
        match acquired.evicted {
            Some(Owner::Pad(index)) => {
                if let Some(sample) = self.pads.get_mut(index).and_then(|p| p.sample.as_mut()) {
                    sample.set_channel(None);
                }
            }
            Some(Owner::Preview) => self.preview_channel = None,
            None => {}
        }
    }
}

impl Drop for Engine {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl fmt::Debug for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("driver", &self.driver.to_string())
            .field("pads", &self.pads)
            .field("preview_channel", &self.preview_channel)
            .finish()
    }
}
