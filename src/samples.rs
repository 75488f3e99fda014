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

//! Pad samples and their playback on hardware channels.
//!
//! This module provides:
//! - Per-pad sample storage with A/B double-buffered wave descriptors
//! - Arbitration of the fixed hardware channel pool between pads
//! - Channel setup and submission for a single trigger
//! - The engine that ties pads, channels and the driver together

mod arbiter;
mod engine;
mod error;
mod sample;
mod trigger;

pub use arbiter::{Acquired, ChannelPool, Owner};
pub use error::AssignError;
pub use engine::{Engine, Pad, NUM_PADS, PAD_COLUMNS};
pub use sample::AudioSample;
pub use trigger::trigger;
