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
use serde::{Deserialize, Serialize};

const DEFAULT_DEVICE: &str = "default";
const DEFAULT_CHANNELS: usize = 24;

/// A YAML representation of the audio configuration.
#[derive(Deserialize, Serialize, Clone, Debug, Default)]
pub struct Audio {
    /// The audio device. "default" picks the host's default output; names starting
    /// with "mock" get a mock driver.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    device: Option<String>,

    /// Number of hardware voices to emulate (default: 24).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    channels: Option<usize>,
}

impl Audio {
    /// New will create a new Audio configuration.
    pub fn new(device: &str) -> Audio {
        Audio {
            device: Some(device.to_string()),
            channels: None,
        }
    }

    /// Sets the number of voices.
    pub fn with_channels(mut self, channels: usize) -> Audio {
        self.channels = Some(channels);
        self
    }

    /// Returns the device from the configuration.
    pub fn device(&self) -> &str {
        self.device.as_deref().unwrap_or(DEFAULT_DEVICE)
    }

    /// Returns the number of voices (default: 24).
    pub fn channels(&self) -> usize {
        self.channels.unwrap_or(DEFAULT_CHANNELS)
    }

    /// The configuration with every default spelled out.
    pub(super) fn explicit(&self) -> Audio {
        Audio {
            device: Some(self.device().to_string()),
            channels: Some(self.channels()),
        }
    }
}
