// Copyright (C) 2026  Caprica Software Limited
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! Local audio file inspection.
//!
//! Used when an audio file on disk is attached to a song: `Lofty` reads the
//! file properties so the song's display duration matches the recording.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use lofty::prelude::*;
use lofty::probe::Probe;
use url::Url;

use crate::util::format::format_duration;

/// An audio file checked to be readable, ready to be attached to a song.
#[derive(Debug)]
pub(crate) struct ProbedFile {
    pub(crate) source: String,
    pub(crate) duration: String,
}

/// Reads the properties of the audio file at `path`.
///
/// # Errors
///
/// Returns an error if the file cannot be opened, is not a recognised audio
/// format.
pub(crate) fn probe_file(path: &Path) -> Result<ProbedFile> {
    let absolute: PathBuf = std::path::absolute(path)
        .with_context(|| format!("Failed to resolve {}", path.display()))?;

    let tagged_file = Probe::open(&absolute)
        .and_then(|p| p.read())
        .with_context(|| format!("Failed to read audio file {}", absolute.display()))?;

    let seconds = tagged_file.properties().duration().as_secs();

    Ok(ProbedFile {
        source: file_url(&absolute)?,
        duration: format_duration(seconds),
    })
}

/// The `file://` URL of an absolute path.
fn file_url(path: &Path) -> Result<String> {
    Url::from_file_path(path)
        .map(String::from)
        .map_err(|()| anyhow!("{} is not an absolute path", path.display()))
}
