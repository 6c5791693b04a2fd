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

//! Bulk export and import.
//!
//! An export is a single versioned JSON object carrying every durable slice.
//! Import accepts the same shape but is lenient field by field: each field is
//! applied only when it has the expected JSON type and decodes cleanly, and
//! anything else is skipped. Only a payload that is not JSON, or whose top
//! level is not an object, fails the import as a whole, and in that case
//! nothing is changed.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::{
    model::{CommentThreads, LikeOverlay, Message, Song, SongId, SortMode, catalog::Catalog},
    storage::{error::ImportError, store::Store},
};

pub(crate) const EXPORT_VERSION: u32 = 1;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ExportRecord<'a> {
    pub(crate) version: u32,
    pub(crate) exported_at: DateTime<Utc>,
    pub(crate) songs: &'a [Song],
    pub(crate) liked: &'a LikeOverlay,
    pub(crate) comments: &'a CommentThreads,
    pub(crate) guestbook: &'a [Message],
    pub(crate) private_unlocked: bool,
    pub(crate) sort_mode: SortMode,
}

pub(crate) fn export(store: &Store) -> ExportRecord<'_> {
    ExportRecord {
        version: EXPORT_VERSION,
        exported_at: Utc::now(),
        songs: store.catalog().songs(),
        liked: store.liked(),
        comments: store.comment_threads(),
        guestbook: store.guestbook(),
        private_unlocked: store.private_unlocked(),
        sort_mode: store.sort_mode(),
    }
}

pub(crate) fn export_json(store: &Store) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&export(store))
}

/// The fields of an import payload that passed their checks.
#[derive(Debug, Default)]
pub(crate) struct ImportPlan {
    catalog: Option<Catalog>,
    liked: Option<LikeOverlay>,
    comments: Option<CommentThreads>,
    guestbook: Option<Vec<Message>>,
    private_unlocked: Option<bool>,
    sort_mode: Option<SortMode>,
}

impl ImportPlan {
    /// Export field names that will be applied, in export order.
    pub(crate) fn fields(&self) -> Vec<&'static str> {
        [
            ("songs", self.catalog.is_some()),
            ("liked", self.liked.is_some()),
            ("comments", self.comments.is_some()),
            ("guestbook", self.guestbook.is_some()),
            ("privateUnlocked", self.private_unlocked.is_some()),
            ("sortMode", self.sort_mode.is_some()),
        ]
        .into_iter()
        .filter_map(|(name, present)| present.then_some(name))
        .collect()
    }

    /// Writes every accepted field into the store.
    pub(crate) fn apply(self, store: &mut Store) {
        if let Some(catalog) = self.catalog {
            store.replace_catalog(catalog);
        }
        if let Some(liked) = self.liked {
            store.replace_liked(liked);
        }
        if let Some(comments) = self.comments {
            store.replace_comments(comments);
        }
        if let Some(guestbook) = self.guestbook {
            store.replace_guestbook(guestbook);
        }
        if let Some(unlocked) = self.private_unlocked {
            store.set_private_unlocked(unlocked);
        }
        if let Some(mode) = self.sort_mode {
            store.set_sort_mode(mode);
        }
    }
}

/// Parses and checks an import payload without touching any state.
///
/// # Errors
///
/// Returns [`ImportError::Parse`] for text that is not JSON and
/// [`ImportError::NotAnObject`] when the top level is anything but an object.
pub(crate) fn parse_import(text: &str) -> Result<ImportPlan, ImportError> {
    let value: Value = serde_json::from_str(text)?;
    let Value::Object(fields) = value else {
        return Err(ImportError::NotAnObject);
    };

    Ok(ImportPlan {
        catalog: songs_field(&fields),
        liked: liked_field(&fields),
        comments: comments_field(&fields),
        guestbook: guestbook_field(&fields),
        private_unlocked: fields.get("privateUnlocked").and_then(Value::as_bool),
        sort_mode: fields
            .get("sortMode")
            .and_then(Value::as_str)
            .map(|mode| SortMode::from(mode.to_string())),
    })
}

/// Imports `text` into `store`, returning the names of the applied fields.
pub(crate) fn import_json(store: &mut Store, text: &str) -> Result<Vec<&'static str>, ImportError> {
    let plan = parse_import(text)?;
    let fields = plan.fields();
    plan.apply(store);

    Ok(fields)
}

fn songs_field(fields: &Map<String, Value>) -> Option<Catalog> {
    let value = fields.get("songs").filter(|v| v.is_array())?;

    let songs: Vec<Song> = serde_json::from_value(value.clone())
        .inspect_err(|e| log::warn!("Skipping imported songs: {e}"))
        .ok()?;

    Catalog::from_songs(songs)
        .inspect_err(|e| log::warn!("Skipping imported songs: {e}"))
        .ok()
}

// Entries whose key is not a song id or whose value is not a boolean are
// dropped, the rest of the overlay is kept.
fn liked_field(fields: &Map<String, Value>) -> Option<LikeOverlay> {
    let entries = fields.get("liked")?.as_object()?;

    Some(
        entries
            .iter()
            .filter_map(|(id, liked)| Some((id.parse::<SongId>().ok()?, liked.as_bool()?)))
            .collect(),
    )
}

fn comments_field(fields: &Map<String, Value>) -> Option<CommentThreads> {
    let value = fields.get("comments").filter(|v| v.is_object())?;

    serde_json::from_value(value.clone())
        .inspect_err(|e| log::warn!("Skipping imported comments: {e}"))
        .ok()
}

fn guestbook_field(fields: &Map<String, Value>) -> Option<Vec<Message>> {
    let value = fields.get("guestbook").filter(|v| v.is_array())?;

    serde_json::from_value(value.clone())
        .inspect_err(|e| log::warn!("Skipping imported guestbook: {e}"))
        .ok()
}
