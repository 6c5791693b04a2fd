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

//! Song catalog index.
//!
//! This module owns the song collection in its authored order and keeps the
//! lookup indices by identifier and by slug. Every mutation goes through the
//! catalog so the uniqueness of both keys holds at all times.

use std::collections::HashMap;

use thiserror::Error;

use crate::{
    model::{Song, SongId},
    util::format::is_valid_slug,
};

#[derive(Debug, Error, PartialEq)]
pub(crate) enum CatalogError {
    #[error("duplicate song id {0}")]
    DuplicateId(SongId),

    #[error("duplicate slug '{0}'")]
    DuplicateSlug(String),

    #[error("invalid slug '{0}'")]
    InvalidSlug(String),

    #[error("song {0} not found")]
    UnknownSong(SongId),

    #[error("no song with slug '{0}'")]
    UnknownSlug(String),
}

#[derive(Debug, Clone, Default)]
pub(crate) struct Catalog {
    songs: Vec<Song>,
    by_id: HashMap<SongId, usize>,
    by_slug: HashMap<String, usize>,
}

impl Catalog {
    /// Builds a catalog, validating slugs and the uniqueness of ids and slugs.
    ///
    /// # Errors
    ///
    /// Returns the first [`CatalogError`] found; a partially valid collection
    /// is never accepted.
    pub(crate) fn from_songs(songs: Vec<Song>) -> Result<Self, CatalogError> {
        let mut by_id = HashMap::with_capacity(songs.len());
        let mut by_slug = HashMap::with_capacity(songs.len());

        for (idx, song) in songs.iter().enumerate() {
            if !is_valid_slug(&song.slug) {
                return Err(CatalogError::InvalidSlug(song.slug.clone()));
            }
            if by_id.insert(song.id, idx).is_some() {
                return Err(CatalogError::DuplicateId(song.id));
            }
            if by_slug.insert(song.slug.clone(), idx).is_some() {
                return Err(CatalogError::DuplicateSlug(song.slug.clone()));
            }
        }

        Ok(Self {
            songs,
            by_id,
            by_slug,
        })
    }

    pub(crate) fn songs(&self) -> &[Song] {
        &self.songs
    }

    pub(crate) fn len(&self) -> usize {
        self.songs.len()
    }

    pub(crate) fn by_id(&self, id: SongId) -> Option<&Song> {
        self.by_id.get(&id).and_then(|&idx| self.songs.get(idx))
    }

    pub(crate) fn by_slug(&self, slug: &str) -> Option<&Song> {
        self.by_slug.get(slug).and_then(|&idx| self.songs.get(idx))
    }

    /// Replaces the audio source of a song.
    ///
    /// An empty `url` detaches the audio. Neither the id nor the slug change,
    /// so the indices stay valid.
    pub(crate) fn set_audio_url(&mut self, id: SongId, url: &str) -> Result<(), CatalogError> {
        let song = self.song_mut(id)?;
        song.audio_url = url.trim().to_string();
        Ok(())
    }

    pub(crate) fn set_duration(&mut self, id: SongId, duration: &str) -> Result<(), CatalogError> {
        let song = self.song_mut(id)?;
        song.duration = duration.to_string();
        Ok(())
    }

    fn song_mut(&mut self, id: SongId) -> Result<&mut Song, CatalogError> {
        let idx = *self.by_id.get(&id).ok_or(CatalogError::UnknownSong(id))?;
        Ok(&mut self.songs[idx])
    }
}
