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

use thiserror::Error;

#[derive(Debug, Error)]
pub(crate) enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("record encoding error: {0}")]
    Encoding(#[from] serde_json::Error),
}

/// Rejected comment or guestbook input.
#[derive(Debug, Error, PartialEq)]
pub(crate) enum EntryError {
    #[error("message is empty")]
    EmptyMessage,

    #[error("no song with slug '{0}'")]
    UnknownSong(String),
}

/// A bulk import that could not be applied at all.
#[derive(Debug, Error)]
pub(crate) enum ImportError {
    #[error("import is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("import must be a JSON object")]
    NotAnObject,
}
