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
use std::thread::{self, JoinHandle};

use crossbeam_channel::Sender;
use tracing::{info, span, warn, Level};

use super::Event;
use crate::samples::NUM_PADS;

const PAD: &str = "pad";
const RELEASE: &str = "release";
const UP: &str = "up";
const DOWN: &str = "down";
const LEFT: &str = "left";
const RIGHT: &str = "right";
const OK: &str = "ok";
const CONFIRM: &str = "confirm";
const BACK: &str = "back";
const CANCEL: &str = "cancel";
const PREVIEW: &str = "preview";
const MENU: &str = "menu";
const QUIT: &str = "quit";

/// A controller that reads line commands from the keyboard.
pub struct Driver {}

impl Driver {
    pub fn new() -> Driver {
        Driver {}
    }

    /// Parses one command line. Pads are numbered from 1 on the keyboard.
    fn parse(input: &str) -> Option<Event> {
        let input = input.trim().to_lowercase();
        let mut words = input.split_whitespace();
        let command = words.next()?;
        let argument = words.next();
        if words.next().is_some() {
            return None;
        }

        let pad = |word: Option<&str>| {
            word.and_then(|w| w.parse::<usize>().ok())
                .filter(|n| (1..=NUM_PADS).contains(n))
                .map(|n| n - 1)
        };

        match (command, argument) {
            (PAD, arg) => pad(arg).map(Event::PadTriggered),
            (RELEASE, arg) => pad(arg).map(Event::PadReleased),
            (UP, None) => Some(Event::NavigateUp),
            (DOWN, None) => Some(Event::NavigateDown),
            (LEFT, None) => Some(Event::NavigateLeft),
            (RIGHT, None) => Some(Event::NavigateRight),
            (OK | CONFIRM, None) => Some(Event::Confirm),
            (BACK | CANCEL, None) => Some(Event::Cancel),
            (PREVIEW, None) => Some(Event::PreviewRequested),
            (MENU, None) => Some(Event::Menu),
            (QUIT, None) => Some(Event::Quit),
            (number, None) => pad(Some(number)).map(Event::PadTriggered),
            _ => None,
        }
    }

    /// Reads and forwards one command. Returns false once the input is exhausted.
    fn monitor_io<R, W>(events_tx: &Sender<Event>, mut reader: R, mut writer: W) -> io::Result<bool>
    where
        R: io::BufRead,
        W: io::Write,
    {
        write!(
            writer,
            "Command (<1-{}>, {} <n>, {} <n>, {}, {}, {}, {}, {}, {}, {}, {}, {}): ",
            NUM_PADS, PAD, RELEASE, UP, DOWN, LEFT, RIGHT, OK, BACK, PREVIEW, MENU, QUIT,
        )?;
        writer.flush()?;

        let mut input = String::default();
        if reader.read_line(&mut input)? == 0 {
            return Ok(false);
        }

        match Self::parse(&input) {
            Some(event) => events_tx
                .send(event)
                .map_err(|e| io::Error::new(io::ErrorKind::BrokenPipe, e))?,
            None => warn!(input = input.trim(), "Unrecognized input"),
        }
        Ok(true)
    }
}

impl Default for Driver {
    fn default() -> Self {
        Self::new()
    }
}

impl super::Driver for Driver {
    fn monitor_events(&self, events_tx: Sender<Event>) -> JoinHandle<Result<(), io::Error>> {
        thread::spawn(move || {
            let span = span!(Level::INFO, "keyboard driver");
            let _enter = span.enter();

            info!("Keyboard driver started.");

            while Self::monitor_io(&events_tx, io::stdin().lock(), io::stdout())? {}

            info!("Keyboard input closed.");
            events_tx
                .send(Event::Quit)
                .map_err(|e| io::Error::new(io::ErrorKind::BrokenPipe, e))
        })
    }
}

#[cfg(test)]
mod test {
    use std::io::{self, BufReader, BufWriter};

    use crossbeam_channel::bounded;

    use crate::controller::Event;

    use super::Driver;

    fn get_event(event: &str) -> Result<Option<Event>, io::Error> {
        let (sender, receiver) = bounded::<Event>(1);

        let reader = BufReader::new(event.as_bytes());
        let writer = BufWriter::new(Vec::<u8>::new());
        Driver::monitor_io(&sender, reader, writer)?;

        // Force the sender to close.
        drop(sender);
        Ok(receiver.recv().ok())
    }

    #[test]
    fn test_keyboard_events() -> Result<(), io::Error> {
        assert_eq!(Some(Event::PadTriggered(0)), get_event("1")?);
        assert_eq!(Some(Event::PadTriggered(7)), get_event("pad 8\n")?);
        assert_eq!(Some(Event::PadReleased(2)), get_event("release 3")?);
        assert_eq!(Some(Event::NavigateUp), get_event("UP")?);
        assert_eq!(Some(Event::NavigateDown), get_event("down")?);
        assert_eq!(Some(Event::NavigateLeft), get_event("left")?);
        assert_eq!(Some(Event::NavigateRight), get_event("right")?);
        assert_eq!(Some(Event::Confirm), get_event("ok")?);
        assert_eq!(Some(Event::Confirm), get_event("confirm")?);
        assert_eq!(Some(Event::Cancel), get_event("back")?);
        assert_eq!(Some(Event::Cancel), get_event("cancel")?);
        assert_eq!(Some(Event::PreviewRequested), get_event("preview")?);
        assert_eq!(Some(Event::Menu), get_event("menu")?);
        assert_eq!(Some(Event::Quit), get_event("quit")?);
        Ok(())
    }

    #[test]
    fn test_unrecognized_input() -> Result<(), io::Error> {
        assert_eq!(None, get_event("unrecognized")?);
        assert_eq!(None, get_event("0")?);
        assert_eq!(None, get_event("9")?);
        assert_eq!(None, get_event("pad")?);
        assert_eq!(None, get_event("up 2")?);
        assert_eq!(None, get_event("")?);
        Ok(())
    }

    #[test]
    fn test_end_of_input() -> Result<(), io::Error> {
        let (sender, _receiver) = bounded::<Event>(1);
        let more = Driver::monitor_io(&sender, BufReader::new(&b""[..]), io::sink())?;
        assert!(!more);
        Ok(())
    }
}
