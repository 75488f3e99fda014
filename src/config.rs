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

//! The soundboard's YAML configuration.

use std::path::{Path, PathBuf};
use std::time::Duration;

use config::{Config, Environment, File};
use duration_string::DurationString;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::samples::NUM_PADS;

mod audio;
mod error;

pub use self::audio::Audio;
pub use self::error::ConfigError;

/// Prefix of environment variables that override file settings.
const ENV_PREFIX: &str = "PADBANK";

/// Separates nested keys in environment variable names, e.g. PADBANK_AUDIO__DEVICE.
const ENV_SEPARATOR: &str = "__";

const DEFAULT_BROWSE_ROOT: &str = "sounds";
const DEFAULT_FRAME_TICK: &str = "16ms";
const DEFAULT_VISIBLE_ROWS: usize = 20;

/// A sample to load onto a pad at startup.
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, Eq)]
pub struct PadConfig {
    file: PathBuf,
}

impl PadConfig {
    pub fn file(&self) -> &Path {
        &self.file
    }
}

/// The soundboard configuration.
#[derive(Deserialize, Serialize, Clone, Debug, Default)]
pub struct Settings {
    /// The audio configuration.
    #[serde(default)]
    audio: Audio,

    /// The directory the file browser can't leave.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    browse_root: Option<PathBuf>,

    /// How long the event loop waits for input before redrawing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    frame_tick: Option<String>,

    /// Height of the browser window in entries.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    visible_rows: Option<usize>,

    /// Startup samples, the nth entry going to pad n.
    #[serde(default)]
    pads: Vec<PadConfig>,

    /// Relative paths are resolved against this directory.
    #[serde(skip)]
    base_path: PathBuf,
}

impl Settings {
    /// Parse settings from a YAML file, applying PADBANK_ environment overrides.
    pub fn deserialize(path: &Path) -> Result<Settings, ConfigError> {
        Self::load(
            path,
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator(ENV_SEPARATOR)
                .try_parsing(true),
        )
    }

    fn load(path: &Path, environment: Environment) -> Result<Settings, ConfigError> {
        let mut settings = Config::builder()
            .add_source(File::from(path))
            .add_source(environment)
            .build()?
            .try_deserialize::<Settings>()?;

        settings.base_path = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        settings.validate()?;

        debug!(
            path = ?path,
            device = settings.audio.device(),
            pads = settings.pads.len(),
            "Loaded settings"
        );
        Ok(settings)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.audio.channels() == 0 {
            return Err(ConfigError::Invalid(
                "audio.channels must be at least 1".to_string(),
            ));
        }
        if self.visible_rows() == 0 {
            return Err(ConfigError::Invalid(
                "visible_rows must be at least 1".to_string(),
            ));
        }
        if self.pads.len() > NUM_PADS {
            return Err(ConfigError::Invalid(format!(
                "{} pads configured, the board has {}",
                self.pads.len(),
                NUM_PADS
            )));
        }
        self.frame_tick()?;
        Ok(())
    }

    /// Returns the audio configuration.
    pub fn audio(&self) -> &Audio {
        &self.audio
    }

    /// Returns the browse root, resolved against the config file's directory.
    pub fn browse_root(&self) -> PathBuf {
        self.resolve(
            self.browse_root
                .as_deref()
                .unwrap_or(Path::new(DEFAULT_BROWSE_ROOT)),
        )
    }

    /// Returns the frame tick (default: 16ms).
    pub fn frame_tick(&self) -> Result<Duration, ConfigError> {
        let tick = self.frame_tick.as_deref().unwrap_or(DEFAULT_FRAME_TICK);
        let duration: Duration = DurationString::from_string(tick.to_string())
            .map_err(|e| ConfigError::Invalid(format!("frame_tick {}: {}", tick, e)))?
            .into();
        if duration.is_zero() {
            return Err(ConfigError::Invalid(
                "frame_tick must be greater than zero".to_string(),
            ));
        }
        Ok(duration)
    }

    /// Returns the browser window height (default: 20).
    pub fn visible_rows(&self) -> usize {
        self.visible_rows.unwrap_or(DEFAULT_VISIBLE_ROWS)
    }

    /// Returns the startup files, resolved against the config file's directory.
    pub fn pad_files(&self) -> Vec<PathBuf> {
        self.pads.iter().map(|pad| self.resolve(pad.file())).collect()
    }

    /// Renders the default configuration as YAML.
    pub fn default_yaml() -> Result<String, ConfigError> {
        let defaults = Settings::default();
        let explicit = Settings {
            audio: defaults.audio.explicit(),
            browse_root: Some(PathBuf::from(DEFAULT_BROWSE_ROOT)),
            frame_tick: Some(DEFAULT_FRAME_TICK.to_string()),
            visible_rows: Some(defaults.visible_rows()),
            pads: Vec::new(),
            base_path: PathBuf::new(),
        };
        Ok(serde_yml::to_string(&explicit)?)
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_path.join(path)
        }
    }
}
