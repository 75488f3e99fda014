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

//! The soundboard's mode state machine.
//!
//! Exactly one mode is active. Play consumes pad triggers, PadSelect picks the pad
//! to reassign, and FileBrowse walks the sound library to preview or assign a file.
//! Each mode has its own handler, which returns the next mode.

use std::fmt;
use std::io;
use std::mem;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError};
use tracing::{debug, info, span, Level};

use crate::browser::{Browser, DirectoryLister};
use crate::controller::Event;
use crate::samples::{Engine, NUM_PADS, PAD_COLUMNS};
use crate::util::filename_display;

/// The active mode and the state only that mode uses.
#[derive(Debug)]
pub enum Mode {
    Play,
    PadSelect,
    FileBrowse(Browser),
}

impl Mode {
    pub fn kind(&self) -> ModeKind {
        match self {
            Mode::Play => ModeKind::Play,
            Mode::PadSelect => ModeKind::PadSelect,
            Mode::FileBrowse(_) => ModeKind::FileBrowse,
        }
    }
}

/// The mode without its state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeKind {
    Play,
    PadSelect,
    FileBrowse,
}

impl fmt::Display for ModeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ModeKind::Play => "Play",
            ModeKind::PadSelect => "Select pad",
            ModeKind::FileBrowse => "Browse",
        };
        write!(f, "{}", name)
    }
}

/// The browser part of a display snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrowserView {
    pub path: PathBuf,
    pub selected: usize,
    pub scroll: usize,
    /// Names inside the scroll window, directories with a trailing slash.
    pub visible: Vec<String>,
}

/// Read-only snapshot of everything a renderer draws.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayState {
    pub mode: ModeKind,
    pub selected_pad: usize,
    pub pressed: [bool; NUM_PADS],
    /// File name of each pad's sample.
    pub pads: [Option<String>; NUM_PADS],
    pub browser: Option<BrowserView>,
    pub status: Option<String>,
}

impl fmt::Display for DisplayState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.mode)?;
        if let Some(status) = &self.status {
            write!(f, " {}", status)?;
        }
        writeln!(f)?;

        for (index, name) in self.pads.iter().enumerate() {
            let marker = match (self.pressed[index], self.mode != ModeKind::Play) {
                (true, _) => '*',
                (false, true) if index == self.selected_pad => '>',
                _ => ' ',
            };
            write!(
                f,
                "{}{}:{:<16}",
                marker,
                index + 1,
                name.as_deref().unwrap_or("-")
            )?;
            if (index + 1) % PAD_COLUMNS == 0 {
                writeln!(f)?;
            }
        }

        if let Some(browser) = &self.browser {
            writeln!(f, "Browsing: {}", browser.path.display())?;
            for (offset, name) in browser.visible.iter().enumerate() {
                let cursor = if browser.scroll + offset == browser.selected {
                    "->"
                } else {
                    "  "
                };
                writeln!(f, "{} {}", cursor, name)?;
            }
        }
        Ok(())
    }
}

/// The engine plus the navigation state around it.
pub struct Soundboard {
    engine: Engine,
    lister: Box<dyn DirectoryLister>,
    browse_root: PathBuf,
    visible_rows: usize,
    mode: Mode,
    selected_pad: usize,
    /// Where the browser was when it last closed.
    last_dir: Option<PathBuf>,
}

impl Soundboard {
    pub fn new(
        engine: Engine,
        lister: Box<dyn DirectoryLister>,
        browse_root: &Path,
        visible_rows: usize,
    ) -> Soundboard {
        Soundboard {
            engine,
            lister,
            browse_root: browse_root.to_path_buf(),
            visible_rows,
            mode: Mode::Play,
            selected_pad: 0,
            last_dir: None,
        }
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    pub fn mode(&self) -> &Mode {
        &self.mode
    }

    pub fn selected_pad(&self) -> usize {
        self.selected_pad
    }

    /// Applies one event. Returns false once the soundboard should stop.
    pub fn handle(&mut self, event: Event) -> bool {
        match event {
            Event::Quit => return false,
            // Pressed flags are display only and follow the pads in every mode.
            Event::PadReleased(index) => {
                self.engine.release_pad(index);
                return true;
            }
            _ => {}
        }

        let mode = mem::replace(&mut self.mode, Mode::Play);
        let before = mode.kind();
        self.mode = match mode {
            Mode::Play => self.handle_play(event),
            Mode::PadSelect => self.handle_pad_select(event),
            Mode::FileBrowse(browser) => self.handle_file_browse(browser, event),
        };

        if before != self.mode.kind() {
            info!(from = ?before, to = ?self.mode.kind(), "Mode changed");
        }
        true
    }

    fn handle_play(&mut self, event: Event) -> Mode {
        match event {
            Event::PadTriggered(index) => self.engine.trigger_pad(index),
            Event::Menu => return Mode::PadSelect,
            _ => debug!(?event, "Ignored in play mode"),
        }
        Mode::Play
    }

    fn handle_pad_select(&mut self, event: Event) -> Mode {
        let pad = self.selected_pad;
        match event {
            Event::NavigateLeft => self.selected_pad = (pad + NUM_PADS - 1) % NUM_PADS,
            Event::NavigateRight => self.selected_pad = (pad + 1) % NUM_PADS,
            Event::NavigateUp => self.selected_pad = (pad + NUM_PADS - PAD_COLUMNS) % NUM_PADS,
            Event::NavigateDown => self.selected_pad = (pad + PAD_COLUMNS) % NUM_PADS,
            Event::Confirm => {
                let browser = Browser::open(
                    self.lister.as_ref(),
                    &self.browse_root,
                    self.last_dir.as_deref(),
                    self.visible_rows,
                );
                return Mode::FileBrowse(browser);
            }
            Event::Menu | Event::Cancel => return Mode::Play,
            _ => debug!(?event, "Ignored in pad select mode"),
        }
        Mode::PadSelect
    }

    fn handle_file_browse(&mut self, mut browser: Browser, event: Event) -> Mode {
        let lister = self.lister.as_ref();
        match event {
            Event::NavigateUp => browser.up(),
            Event::NavigateDown => browser.down(),
            Event::NavigateRight => {
                browser.descend(lister);
            }
            Event::NavigateLeft | Event::Cancel => {
                if !browser.ascend(lister) {
                    self.last_dir = Some(browser.path().to_path_buf());
                    return Mode::PadSelect;
                }
            }
            Event::PreviewRequested => {
                if let Some(path) = Self::selected_file(&browser) {
                    // Failures are already on the status line.
                    let _ = self.engine.preview(&path);
                }
            }
            Event::Confirm => {
                if browser.descend(lister) {
                    return Mode::FileBrowse(browser);
                }
                if let Some(path) = Self::selected_file(&browser) {
                    self.last_dir = Some(browser.path().to_path_buf());
                    if self.engine.assign(self.selected_pad, &path).is_ok() {
                        info!(
                            pad = self.selected_pad,
                            file = filename_display(&path),
                            "Pad reassigned"
                        );
                    }
                    return Mode::Play;
                }
            }
            _ => debug!(?event, "Ignored in browse mode"),
        }
        Mode::FileBrowse(browser)
    }

    fn selected_file(browser: &Browser) -> Option<PathBuf> {
        browser
            .selected_entry()
            .filter(|entry| !entry.is_dir())
            .and(browser.selected_path())
    }

    /// Takes a snapshot for the renderer.
    pub fn display_state(&self) -> DisplayState {
        let pads = self.engine.pads();
        DisplayState {
            mode: self.mode.kind(),
            selected_pad: self.selected_pad,
            pressed: std::array::from_fn(|i| pads[i].pressed()),
            pads: std::array::from_fn(|i| {
                pads[i]
                    .path()
                    .filter(|_| pads[i].is_loaded())
                    .map(|path| filename_display(path).to_string())
            }),
            browser: match &self.mode {
                Mode::FileBrowse(browser) => Some(BrowserView {
                    path: browser.path().to_path_buf(),
                    selected: browser.selected(),
                    scroll: browser.scroll(),
                    visible: browser
                        .visible_entries()
                        .iter()
                        .map(|entry| {
                            if entry.is_dir() {
                                format!("{}/", entry.name())
                            } else {
                                entry.name().to_string()
                            }
                        })
                        .collect(),
                }),
                _ => None,
            },
            status: self.engine.status().map(str::to_string),
        }
    }

    /// Stops all playback.
    pub fn shutdown(&mut self) {
        self.engine.shutdown();
    }
}

/// Runs the event loop until a quit event arrives or the input goes away. The
/// display snapshot is written to `out` whenever it changes, checked at least once
/// per frame tick.
pub fn run<W: io::Write>(
    board: &mut Soundboard,
    events_rx: &Receiver<Event>,
    frame_tick: Duration,
    mut out: W,
) -> io::Result<()> {
    let span = span!(Level::INFO, "event loop");
    let _enter = span.enter();

    info!(frame_tick = ?frame_tick, "Soundboard started.");
    let mut last: Option<DisplayState> = None;
    loop {
        let state = board.display_state();
        if last.as_ref() != Some(&state) {
            write!(out, "{}", state)?;
            out.flush()?;
            last = Some(state);
        }

        match events_rx.recv_timeout(frame_tick) {
            Ok(event) => {
                debug!(?event, "Received event.");
                if !board.handle(event) {
                    info!("Quit requested.");
                    return Ok(());
                }
            }
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => {
                info!("Input closed.");
                return Ok(());
            }
        }
    }
}
