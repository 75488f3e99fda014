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

/// Errors produced while decoding a sample container.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// The file or stream could not be read.
    #[error("IO error: {0}")]
    IoFailure(#[from] std::io::Error),

    /// The container is readable but not 16-bit linear PCM RIFF/WAVE.
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// A mandatory chunk is missing or shorter than it declares.
    #[error("Truncated or malformed container: {0}")]
    TruncatedOrMalformed(String),
}
