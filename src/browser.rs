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

//! Navigation over directory listings, bounded at a browse root.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

mod listing;

pub use listing::{DirectoryLister, Entry, FsLister, MAX_ENTRIES, MAX_NAME_BYTES};

/// The file browser's position: current directory, its listing, the cursor and the
/// scroll window.
#[derive(Debug, Clone)]
pub struct Browser {
    root: PathBuf,
    path: PathBuf,
    entries: Vec<Entry>,
    selected: usize,
    scroll: usize,
    visible_rows: usize,
}

impl Browser {
    /// Opens the browser at `start` if it lies within `root`, otherwise at `root`.
    pub fn open(
        lister: &dyn DirectoryLister,
        root: &Path,
        start: Option<&Path>,
        visible_rows: usize,
    ) -> Browser {
        let path = match start {
            Some(start) if start.starts_with(root) => start.to_path_buf(),
            _ => root.to_path_buf(),
        };

        let mut browser = Browser {
            root: root.to_path_buf(),
            path,
            entries: Vec::new(),
            selected: 0,
            scroll: 0,
            visible_rows: visible_rows.max(1),
        };
        browser.load(lister);
        browser
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn scroll(&self) -> usize {
        self.scroll
    }

    pub fn is_at_root(&self) -> bool {
        self.path == self.root
    }

    pub fn selected_entry(&self) -> Option<&Entry> {
        self.entries.get(self.selected)
    }

    /// The full path of the entry under the cursor.
    pub fn selected_path(&self) -> Option<PathBuf> {
        self.selected_entry().map(|e| self.path.join(e.name()))
    }

    /// The entries inside the scroll window.
    pub fn visible_entries(&self) -> &[Entry] {
        let end = (self.scroll + self.visible_rows).min(self.entries.len());
        &self.entries[self.scroll.min(end)..end]
    }

    /// Moves the cursor up, wrapping from the first entry to the last.
    pub fn up(&mut self) {
        let len = self.entries.len();
        if len == 0 {
            return;
        }
        self.selected = (self.selected + len - 1) % len;
        self.follow_selection();
    }

    /// Moves the cursor down, wrapping from the last entry to the first.
    pub fn down(&mut self) {
        let len = self.entries.len();
        if len == 0 {
            return;
        }
        self.selected = (self.selected + 1) % len;
        self.follow_selection();
    }

    /// Enters the directory under the cursor. Returns false if the cursor is not on a
    /// directory.
    pub fn descend(&mut self, lister: &dyn DirectoryLister) -> bool {
        let Some(name) = self
            .selected_entry()
            .filter(|e| e.is_dir())
            .map(|e| e.name().to_string())
        else {
            return false;
        };

        self.path.push(name);
        self.load(lister);
        true
    }

    /// Moves to the parent directory. Returns false at the root, leaving the path as
    /// it is.
    pub fn ascend(&mut self, lister: &dyn DirectoryLister) -> bool {
        if self.is_at_root() {
            return false;
        }

        match self.path.parent() {
            Some(parent) if parent.starts_with(&self.root) => self.path = parent.to_path_buf(),
            _ => self.path = self.root.clone(),
        }
        self.load(lister);
        true
    }

    /// Re-reads the current directory and puts the cursor back at the top.
    pub fn load(&mut self, lister: &dyn DirectoryLister) {
        self.entries = match lister.list(&self.path) {
            Ok(mut entries) => {
                entries.truncate(MAX_ENTRIES);
                entries
            }
            Err(e) => {
                warn!(path = ?self.path, err = %e, "Unable to list directory");
                Vec::new()
            }
        };
        self.selected = 0;
        self.scroll = 0;
        debug!(path = ?self.path, entries = self.entries.len(), "Directory loaded");
    }

    fn follow_selection(&mut self) {
        if self.selected < self.scroll {
            self.scroll = self.selected;
        } else if self.selected >= self.scroll + self.visible_rows {
            self.scroll = self.selected + 1 - self.visible_rows;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::io;

    use super::*;

    /// A lister over a fixed in-memory tree.
    #[derive(Default)]
    struct MapLister {
        dirs: HashMap<PathBuf, Vec<Entry>>,
    }

    impl MapLister {
        fn with(mut self, path: &str, entries: &[(&str, bool)]) -> MapLister {
            self.dirs.insert(
                PathBuf::from(path),
                entries
                    .iter()
                    .map(|(name, is_dir)| Entry::new(name, *is_dir))
                    .collect(),
            );
            self
        }
    }

    impl DirectoryLister for MapLister {
        fn list(&self, path: &Path) -> io::Result<Vec<Entry>> {
            self.dirs
                .get(path)
                .cloned()
                .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "no such directory"))
        }
    }

    fn lister() -> MapLister {
        MapLister::default()
            .with(
                "/sounds",
                &[("drums", true), ("kick.wav", false), ("snare.wav", false)],
            )
            .with("/sounds/drums", &[("tom.wav", false), ("hat.wav", false)])
    }

    #[test]
    fn test_wraparound() {
        let lister = lister();
        let mut browser = Browser::open(&lister, Path::new("/sounds"), None, 10);
        assert_eq!(0, browser.selected());

        browser.up();
        assert_eq!(2, browser.selected());
        browser.down();
        assert_eq!(0, browser.selected());
        browser.down();
        browser.down();
        browser.down();
        assert_eq!(0, browser.selected());
    }

    #[test]
    fn test_descend_and_ascend() {
        let lister = lister();
        let mut browser = Browser::open(&lister, Path::new("/sounds"), None, 10);

        browser.down();
        assert!(!browser.descend(&lister), "kick.wav is not a directory");

        browser.up();
        assert!(browser.descend(&lister));
        assert_eq!(Path::new("/sounds/drums"), browser.path());
        assert_eq!(0, browser.selected());
        assert_eq!(
            Some(PathBuf::from("/sounds/drums/tom.wav")),
            browser.selected_path()
        );

        assert!(browser.ascend(&lister));
        assert!(browser.is_at_root());
        assert_eq!(3, browser.entries().len());

        // Past the root: refused, path untouched.
        assert!(!browser.ascend(&lister));
        assert_eq!(Path::new("/sounds"), browser.path());
    }

    #[test]
    fn test_empty_listing() {
        let lister = MapLister::default().with("/empty", &[]);
        let mut browser = Browser::open(&lister, Path::new("/empty"), None, 10);

        browser.up();
        browser.down();
        assert_eq!(0, browser.selected());
        assert_eq!(None, browser.selected_path());
        assert!(!browser.descend(&lister));
        assert!(browser.visible_entries().is_empty());
    }

    #[test]
    fn test_unlistable_directory_is_empty() {
        let lister = MapLister::default();
        let browser = Browser::open(&lister, Path::new("/missing"), None, 10);
        assert!(browser.entries().is_empty());
    }

    #[test]
    fn test_scroll_follows_selection() {
        let names: Vec<String> = (0..10).map(|i| format!("{}.wav", i)).collect();
        let entries: Vec<(&str, bool)> = names.iter().map(|n| (n.as_str(), false)).collect();
        let lister = MapLister::default().with("/many", &entries);
        let mut browser = Browser::open(&lister, Path::new("/many"), None, 3);

        for _ in 0..4 {
            browser.down();
        }
        assert_eq!(4, browser.selected());
        assert_eq!(2, browser.scroll());
        let visible: Vec<&str> = browser.visible_entries().iter().map(Entry::name).collect();
        assert_eq!(vec!["2.wav", "3.wav", "4.wav"], visible);

        // Wrapping to the last entry scrolls to the bottom.
        for _ in 0..5 {
            browser.up();
        }
        assert_eq!(9, browser.selected());
        assert_eq!(7, browser.scroll());

        browser.down();
        assert_eq!(0, browser.scroll());
    }

    #[test]
    fn test_open_at_last_directory() {
        let lister = lister();
        let browser = Browser::open(
            &lister,
            Path::new("/sounds"),
            Some(Path::new("/sounds/drums")),
            10,
        );
        assert_eq!(Path::new("/sounds/drums"), browser.path());

        let outside = Browser::open(&lister, Path::new("/sounds"), Some(Path::new("/etc")), 10);
        assert!(outside.is_at_root());
    }
}
