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

//! Playback queue state.
//!
//! This module provides the state of the player queue: a snapshot of song
//! identifiers taken when playback starts, a cursor into it and a playing
//! flag.
//!
//! The queue is a value copy. Nothing here refers back to the visible list it
//! was taken from, so later search, sort or route changes cannot reach it;
//! only starting playback again replaces it.

use crate::model::SongId;

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub(crate) enum Direction {
    Forward,
    Backward,
}

/// Either idle (no ids, no cursor, not playing) or loaded (non-empty ids and
/// an in-bounds cursor).
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub(crate) struct Queue {
    ids: Vec<SongId>,
    cursor: Option<usize>,
    playing: bool,
}

impl Queue {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Replaces the queue wholesale with `ids` and starts playing at `cursor`.
    ///
    /// Returns `false` and leaves the queue untouched when `ids` is empty or
    /// `cursor` is out of bounds.
    pub(crate) fn start(&mut self, ids: Vec<SongId>, cursor: usize) -> bool {
        if cursor >= ids.len() {
            return false;
        }

        self.ids = ids;
        self.cursor = Some(cursor);
        self.playing = true;

        true
    }

    /// Moves the cursor one place, wrapping around at either end.
    ///
    /// Does nothing on an idle queue. Membership never changes.
    pub(crate) fn step(&mut self, direction: Direction) -> Option<SongId> {
        let len = self.ids.len();
        let cursor = self.cursor?;
        if len == 0 {
            return None;
        }

        let next = match direction {
            Direction::Forward => (cursor + 1) % len,
            Direction::Backward => (cursor + len - 1) % len,
        };
        self.cursor = Some(next);

        self.current()
    }

    pub(crate) fn next(&mut self) -> Option<SongId> {
        self.step(Direction::Forward)
    }

    /// Stops playing but keeps the queue and the cursor.
    pub(crate) fn stop(&mut self) {
        self.playing = false;
    }

    /// Sets the playing flag. An idle queue can never be playing.
    pub(crate) fn set_playing(&mut self, playing: bool) {
        self.playing = playing && self.cursor.is_some();
    }

    pub(crate) fn current(&self) -> Option<SongId> {
        self.cursor.and_then(|idx| self.ids.get(idx).copied())
    }

    pub(crate) fn ids(&self) -> &[SongId] {
        &self.ids
    }

    pub(crate) fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    pub(crate) fn is_playing(&self) -> bool {
        self.playing
    }

    pub(crate) fn is_idle(&self) -> bool {
        self.cursor.is_none()
    }
}
