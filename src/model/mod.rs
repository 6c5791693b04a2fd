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

//! Domain models and core data structures.
//!
//! This module defines the central entities of the application, songs and the
//! messages visitors leave against them, representing the data that is
//! persisted, exported and rendered.

pub(crate) mod catalog;
pub(crate) mod queue;
pub(crate) mod search;
pub(crate) mod seed;

use std::{collections::BTreeMap, fmt};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub(crate) type SongId = u32;

/// Visitor likes by song id, on top of each song's baseline count.
pub(crate) type LikeOverlay = BTreeMap<SongId, bool>;

/// Comment threads by song slug, each newest first.
pub(crate) type CommentThreads = BTreeMap<String, Vec<Message>>;

#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum Visibility {
    #[default]
    Public,
    Private,
}

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Song {
    pub(crate) id: SongId,
    pub(crate) slug: String,
    pub(crate) title: String,
    pub(crate) duration: String,
    pub(crate) release_date: String,
    pub(crate) genre: String,
    #[serde(default)]
    pub(crate) moods: Vec<String>,
    #[serde(default)]
    pub(crate) story: String,
    #[serde(default)]
    pub(crate) lyrics: String,
    #[serde(default)]
    pub(crate) audio_url: String,
    #[serde(default)]
    pub(crate) likes: u32,
    #[serde(default)]
    pub(crate) visibility: Visibility,
}

impl Song {
    pub(crate) fn is_public(&self) -> bool {
        self.visibility == Visibility::Public
    }

    pub(crate) fn has_audio(&self) -> bool {
        !self.audio_url.trim().is_empty()
    }

    /// Path of the detail page for this song.
    pub(crate) fn path(&self) -> String {
        format!("/song/{}", self.slug)
    }
}

/// A comment left against a song, or an entry in the guestbook.
///
/// Both share the same shape, the difference is only where they are stored.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Message {
    pub(crate) name: String,
    pub(crate) message: String,
    pub(crate) created_at: DateTime<Utc>,
}

/// Ordering applied to the visible song list.
///
/// Stored as a plain string, anything unrecognised reads back as
/// [`SortMode::Newest`].
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub(crate) enum SortMode {
    #[default]
    Newest,
    Liked,
    Az,
}

impl SortMode {
    pub(crate) fn as_str(&self) -> &'static str {
        match self {
            SortMode::Newest => "newest",
            SortMode::Liked => "liked",
            SortMode::Az => "az",
        }
    }

    /// Strict parse, used for user input where an unknown mode is a mistake.
    pub(crate) fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "newest" => Some(SortMode::Newest),
            "liked" => Some(SortMode::Liked),
            "az" | "a-z" => Some(SortMode::Az),
            _ => None,
        }
    }
}

impl From<String> for SortMode {
    fn from(value: String) -> Self {
        SortMode::parse(&value).unwrap_or_default()
    }
}

impl From<SortMode> for String {
    fn from(value: SortMode) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for SortMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Something the user should be told about.
///
/// Notices never interrupt the application, they are reported and the session
/// carries on.
#[derive(Debug, Clone, Eq, PartialEq)]
pub(crate) enum Notice {
    Info(String),
    Failure(String),
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::Info(text) => write!(f, "{text}"),
            Notice::Failure(text) => write!(f, "error: {text}"),
        }
    }
}
