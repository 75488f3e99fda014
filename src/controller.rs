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
use std::io;
use std::thread::JoinHandle;

use crossbeam_channel::Sender;

pub mod keyboard;

/// Input events, already debounced by the driver that produces them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// A pad was hit. Plays its sample in play mode.
    PadTriggered(usize),

    /// A pad was let go. Only clears its pressed flag.
    PadReleased(usize),

    NavigateUp,
    NavigateDown,
    NavigateLeft,
    NavigateRight,

    /// Accepts the current selection.
    Confirm,

    /// Backs out of the current selection.
    Cancel,

    /// Plays the browser entry under the cursor without assigning it.
    PreviewRequested,

    /// Switches between playing and pad selection.
    Menu,

    /// Stops the soundboard.
    Quit,
}

/// A source of input events.
pub trait Driver: Send + Sync + 'static {
    /// Starts producing events on `events_tx`. The returned thread ends when the
    /// input is exhausted or the receiver goes away.
    fn monitor_events(&self, events_tx: Sender<Event>) -> JoinHandle<Result<(), io::Error>>;
}
