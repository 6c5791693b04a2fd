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

//! Durable key-value records.
//!
//! This module handles all interactions with the SQLite database. Each
//! persisted slice of application state is one JSON document stored under a
//! fixed key.
//!
//! # Tables
//!
//! * `records` - One row per key, holding the JSON text and the time it was
//!   last written.
//!
//! # Failure model
//!
//! Reads and writes through [`Records::get`] and [`Records::set`] never fail
//! from the caller's point of view. A missing, corrupt or unreadable record
//! yields the supplied default, and a failed write is logged and dropped; the
//! in-memory value stays authoritative for the rest of the session.

pub(crate) mod error;
pub(crate) mod media;
pub(crate) mod store;
pub(crate) mod transfer;

use std::path::Path;

use chrono::Utc;
use rusqlite::{Connection, OptionalExtension, params};
use serde::{Serialize, de::DeserializeOwned};

use crate::storage::error::StoreError;

/// Keys of the durable records, one per persisted slice.
pub(crate) mod keys {
    pub(crate) const CATALOG: &str = "liner.catalog";
    pub(crate) const LIKED: &str = "liner.liked";
    pub(crate) const GUESTBOOK: &str = "liner.guestbook";
    pub(crate) const COMMENTS: &str = "liner.comments";
    pub(crate) const PRIVATE_UNLOCKED: &str = "liner.private_unlocked";
    pub(crate) const SORT_MODE: &str = "liner.sort_mode";

    pub(crate) const ALL: [&str; 6] = [
        CATALOG,
        LIKED,
        GUESTBOOK,
        COMMENTS,
        PRIVATE_UNLOCKED,
        SORT_MODE,
    ];
}

pub(crate) struct Records {
    conn: Connection,
}

impl Records {
    /// Opens the records database at `path`, creating it if needed.
    ///
    /// This function performs the following setup:
    /// * **WAL Mode**: Enables Write-Ahead Logging, so a crash mid-write
    ///   leaves the previous value of a record intact.
    /// * **Schema**: Creates the `records` table if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the database file cannot be opened or the schema
    /// cannot be created.
    pub(crate) fn open(path: &Path) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;

        let journal_mode: String =
            conn.query_row("PRAGMA journal_mode = WAL", [], |r| r.get(0))?;
        if journal_mode != "wal" {
            log::warn!("Database stays in {journal_mode} journal mode");
        }
        conn.execute_batch("PRAGMA synchronous = NORMAL;")?;

        Self::from_connection(conn)
    }

    /// Opens a records database that lives only as long as the session.
    pub(crate) fn open_in_memory() -> Result<Self, StoreError> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS records (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at INTEGER NOT NULL
            );",
        )?;

        Ok(Self { conn })
    }

    /// Reads and decodes the record for `key`, or returns `default`.
    pub(crate) fn get<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        match self.read(key) {
            Ok(Some(text)) => match serde_json::from_str(&text) {
                Ok(value) => value,
                Err(e) => {
                    log::warn!("Ignoring corrupt record {key}: {e}");
                    default
                }
            },
            Ok(None) => default,
            Err(e) => {
                log::warn!("Failed to read record {key}: {e}");
                default
            }
        }
    }

    /// Encodes and writes `value` under `key`, best effort.
    pub(crate) fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T) {
        let result = serde_json::to_string(value)
            .map_err(StoreError::from)
            .and_then(|text| self.write(key, &text));

        if let Err(e) = result {
            log::warn!("Failed to write record {key}: {e}");
        }
    }

    pub(crate) fn read(&self, key: &str) -> Result<Option<String>, StoreError> {
        let mut stmt = self
            .conn
            .prepare_cached("SELECT value FROM records WHERE key = ?1")?;
        let value = stmt.query_row([key], |row| row.get(0)).optional()?;

        Ok(value)
    }

    pub(crate) fn write(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut stmt = self.conn.prepare_cached(
            "INSERT INTO records (key, value, updated_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT (key)
            DO UPDATE SET value = ?2, updated_at = ?3",
        )?;
        stmt.execute(params![key, value, Utc::now().timestamp()])?;

        Ok(())
    }

    /// Deletes every record.
    pub(crate) fn clear(&self) -> Result<(), StoreError> {
        self.conn.execute("DELETE FROM records", [])?;
        Ok(())
    }

    #[cfg(test)]
    pub(crate) fn connection(&self) -> &Connection {
        &self.conn
    }
}
