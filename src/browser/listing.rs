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
use std::cmp::Ordering;
use std::fs;
use std::io;
use std::path::Path;

use tracing::{debug, warn};

/// Most entries a listing holds. Anything beyond is dropped.
pub const MAX_ENTRIES: usize = 512;

/// Longest entry name kept, in bytes.
pub const MAX_NAME_BYTES: usize = 255;

/// One entry of a directory listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    name: String,
    is_dir: bool,
}

impl Entry {
    /// Creates an entry, truncating the name to `MAX_NAME_BYTES` on a char boundary.
    pub fn new(name: &str, is_dir: bool) -> Entry {
        let mut end = name.len().min(MAX_NAME_BYTES);
        while !name.is_char_boundary(end) {
            end -= 1;
        }
        Entry {
            name: name[..end].to_string(),
            is_dir,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_dir(&self) -> bool {
        self.is_dir
    }
}

/// Produces the ordered entries of a directory, at most `MAX_ENTRIES` of them.
pub trait DirectoryLister {
    fn list(&self, path: &Path) -> io::Result<Vec<Entry>>;
}

/// Lists the real filesystem. Directories come first, then names in case-insensitive
/// order.
#[derive(Debug, Default, Clone, Copy)]
pub struct FsLister;

impl DirectoryLister for FsLister {
    fn list(&self, path: &Path) -> io::Result<Vec<Entry>> {
        let mut entries = Vec::new();
        for dir_entry in fs::read_dir(path)? {
            let dir_entry = match dir_entry {
                Ok(dir_entry) => dir_entry,
                Err(e) => {
                    warn!(path = ?path, err = %e, "Skipping unreadable entry");
                    continue;
                }
            };

            // Follows symlinks so linked directories can be browsed.
            let is_dir = fs::metadata(dir_entry.path()).is_ok_and(|m| m.is_dir());
            let name = dir_entry.file_name();
            entries.push(Entry::new(&name.to_string_lossy(), is_dir));
        }

        entries.sort_by(compare_entries);
        if entries.len() > MAX_ENTRIES {
            debug!(path = ?path, entries = entries.len(), "Listing truncated");
            entries.truncate(MAX_ENTRIES);
        }
        Ok(entries)
    }
}

fn compare_entries(a: &Entry, b: &Entry) -> Ordering {
    b.is_dir
        .cmp(&a.is_dir)
        .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
        .then_with(|| a.name.cmp(&b.name))
}
