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

//! Persisted application state.
//!
//! [`Store`] holds the in-memory copy of every durable slice (catalog, like
//! overlay, comment threads, guestbook, private unlock flag and sort mode) and
//! writes each slice back to its record as soon as it changes.
//!
//! Slices are written independently. An operation touching several slices,
//! such as a bulk import, is not atomic on disk.

use chrono::Utc;

use crate::{
    model::{
        CommentThreads, LikeOverlay, Message, SongId, SortMode,
        catalog::{Catalog, CatalogError},
        search::Revisions,
        seed,
    },
    storage::{Records, error::EntryError, keys},
};

const ANONYMOUS: &str = "Anonymous";
const MAX_NAME_CHARS: usize = 60;
const MAX_MESSAGE_CHARS: usize = 1000;

pub(crate) struct Store {
    records: Records,
    catalog: Catalog,
    liked: LikeOverlay,
    comments: CommentThreads,
    guestbook: Vec<Message>,
    private_unlocked: bool,
    sort_mode: SortMode,
    revisions: Revisions,
}

impl Store {
    /// Loads every slice from `records`, falling back to the seed catalog and
    /// empty state for anything missing or unreadable.
    pub(crate) fn open(records: Records) -> Self {
        let songs = records.get(keys::CATALOG, seed::songs());
        let catalog = Catalog::from_songs(songs).unwrap_or_else(|e| {
            log::warn!("Stored catalog rejected ({e}), using seed catalog");
            seed_catalog()
        });

        Self {
            liked: records.get(keys::LIKED, LikeOverlay::new()),
            comments: records.get(keys::COMMENTS, CommentThreads::new()),
            guestbook: records.get(keys::GUESTBOOK, Vec::new()),
            private_unlocked: records.get(keys::PRIVATE_UNLOCKED, false),
            sort_mode: records.get(keys::SORT_MODE, SortMode::Newest),
            catalog,
            records,
            revisions: Revisions::default(),
        }
    }

    pub(crate) fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub(crate) fn liked(&self) -> &LikeOverlay {
        &self.liked
    }

    pub(crate) fn is_liked(&self, id: SongId) -> bool {
        self.liked.get(&id).copied().unwrap_or(false)
    }

    pub(crate) fn comment_threads(&self) -> &CommentThreads {
        &self.comments
    }

    pub(crate) fn comments(&self, slug: &str) -> &[Message] {
        self.comments.get(slug).map(Vec::as_slice).unwrap_or(&[])
    }

    pub(crate) fn guestbook(&self) -> &[Message] {
        &self.guestbook
    }

    pub(crate) fn private_unlocked(&self) -> bool {
        self.private_unlocked
    }

    pub(crate) fn sort_mode(&self) -> SortMode {
        self.sort_mode
    }

    pub(crate) fn revisions(&self) -> Revisions {
        self.revisions
    }

    /// Flips the visitor's like on a song, returning the new state.
    ///
    /// Returns `None` for an unknown song.
    pub(crate) fn toggle_like(&mut self, id: SongId) -> Option<bool> {
        self.catalog.by_id(id)?;

        let liked = !self.is_liked(id);
        self.liked.insert(id, liked);
        self.revisions.likes += 1;
        self.records.set(keys::LIKED, &self.liked);

        Some(liked)
    }

    /// Adds a comment to the top of a song's thread, creating the thread on
    /// first use.
    pub(crate) fn add_comment(
        &mut self,
        slug: &str,
        name: &str,
        message: &str,
    ) -> Result<(), EntryError> {
        if self.catalog.by_slug(slug).is_none() {
            return Err(EntryError::UnknownSong(slug.to_string()));
        }

        let entry = compose(name, message)?;
        self.comments
            .entry(slug.to_string())
            .or_default()
            .insert(0, entry);
        self.records.set(keys::COMMENTS, &self.comments);

        Ok(())
    }

    /// Adds an entry to the top of the guestbook.
    pub(crate) fn sign_guestbook(&mut self, name: &str, message: &str) -> Result<(), EntryError> {
        let entry = compose(name, message)?;
        self.guestbook.insert(0, entry);
        self.records.set(keys::GUESTBOOK, &self.guestbook);

        Ok(())
    }

    pub(crate) fn set_private_unlocked(&mut self, unlocked: bool) {
        self.private_unlocked = unlocked;
        self.records.set(keys::PRIVATE_UNLOCKED, &unlocked);
    }

    pub(crate) fn set_sort_mode(&mut self, mode: SortMode) {
        self.sort_mode = mode;
        self.records.set(keys::SORT_MODE, &mode);
    }

    pub(crate) fn set_audio_source(&mut self, id: SongId, url: &str) -> Result<(), CatalogError> {
        self.catalog.set_audio_url(id, url)?;
        self.catalog_changed();
        Ok(())
    }

    pub(crate) fn set_duration(&mut self, id: SongId, duration: &str) -> Result<(), CatalogError> {
        self.catalog.set_duration(id, duration)?;
        self.catalog_changed();
        Ok(())
    }

    pub(crate) fn replace_catalog(&mut self, catalog: Catalog) {
        self.catalog = catalog;
        self.catalog_changed();
    }

    pub(crate) fn replace_liked(&mut self, liked: LikeOverlay) {
        self.liked = liked;
        self.revisions.likes += 1;
        self.records.set(keys::LIKED, &self.liked);
    }

    pub(crate) fn replace_comments(&mut self, comments: CommentThreads) {
        self.comments = comments;
        self.records.set(keys::COMMENTS, &self.comments);
    }

    pub(crate) fn replace_guestbook(&mut self, guestbook: Vec<Message>) {
        self.guestbook = guestbook;
        self.records.set(keys::GUESTBOOK, &self.guestbook);
    }

    /// Clears every durable record and restores the in-memory state of a fresh
    /// install.
    pub(crate) fn reset(&mut self) {
        if let Err(e) = self.records.clear() {
            log::warn!("Failed to clear records: {e}");
        }

        self.catalog = seed_catalog();
        self.liked.clear();
        self.comments.clear();
        self.guestbook.clear();
        self.private_unlocked = false;
        self.sort_mode = SortMode::Newest;
        self.revisions.catalog += 1;
        self.revisions.likes += 1;
    }

    #[cfg(test)]
    pub(crate) fn records(&self) -> &Records {
        &self.records
    }

    fn catalog_changed(&mut self) {
        self.revisions.catalog += 1;
        self.records.set(keys::CATALOG, self.catalog.songs());
    }
}

fn seed_catalog() -> Catalog {
    Catalog::from_songs(seed::songs()).unwrap_or_default()
}

fn compose(name: &str, message: &str) -> Result<Message, EntryError> {
    let message = message.trim();
    if message.is_empty() {
        return Err(EntryError::EmptyMessage);
    }

    let name = match name.trim() {
        "" => ANONYMOUS,
        name => name,
    };

    Ok(Message {
        name: name.chars().take(MAX_NAME_CHARS).collect(),
        message: message.chars().take(MAX_MESSAGE_CHARS).collect(),
        created_at: Utc::now(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> Store {
        Store::open(Records::open_in_memory().unwrap())
    }

    #[test]
    fn fresh_store_has_seed_state() {
        let store = store();

        assert_eq!(store.catalog().len(), seed::songs().len());
        assert!(store.liked().is_empty());
        assert!(store.guestbook().is_empty());
        assert!(!store.private_unlocked());
        assert_eq!(store.sort_mode(), SortMode::Newest);
    }

    #[test]
    fn toggle_like_flips_and_persists() {
        let mut store = store();
        let before = store.revisions().likes;

        assert_eq!(store.toggle_like(2), Some(true));
        assert_eq!(store.toggle_like(2), Some(false));
        assert_eq!(store.toggle_like(2), Some(true));
        assert_eq!(store.toggle_like(404), None);
        assert_eq!(store.revisions().likes, before + 3);

        let stored: LikeOverlay = store.records().get(keys::LIKED, LikeOverlay::new());
        assert_eq!(stored.get(&2), Some(&true));
    }

    #[test]
    fn comments_are_newest_first_per_song() {
        let mut store = store();

        store.add_comment("paper-moons", "Ada", "first").unwrap();
        store.add_comment("paper-moons", "  ", " second ").unwrap();

        let thread = store.comments("paper-moons");
        assert_eq!(thread.len(), 2);
        assert_eq!(thread[0].message, "second");
        assert_eq!(thread[0].name, "Anonymous");
        assert_eq!(thread[1].name, "Ada");
        assert!(store.comments("cold-water").is_empty());

        assert_eq!(
            store.add_comment("nope", "Ada", "hi"),
            Err(EntryError::UnknownSong("nope".to_string()))
        );
        assert_eq!(
            store.add_comment("paper-moons", "Ada", "   "),
            Err(EntryError::EmptyMessage)
        );
    }

    #[test]
    fn guestbook_caps_long_input() {
        let mut store = store();
        let long_name = "n".repeat(200);

        store.sign_guestbook(&long_name, "hello").unwrap();
        store.sign_guestbook("Bo", "again").unwrap();

        assert_eq!(store.guestbook()[0].name, "Bo");
        assert_eq!(store.guestbook()[1].name.chars().count(), 60);
    }

    #[test]
    fn slices_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("liner.db");

        {
            let mut store = Store::open(Records::open(&path).unwrap());
            store.toggle_like(1);
            store.set_sort_mode(SortMode::Az);
            store.set_private_unlocked(true);
            store.sign_guestbook("Ada", "lovely").unwrap();
            store.add_comment("cold-water", "Bo", "classic").unwrap();
            store.set_audio_source(4, "https://cdn.example/cold.mp3").unwrap();
        }

        let store = Store::open(Records::open(&path).unwrap());
        assert!(store.is_liked(1));
        assert_eq!(store.sort_mode(), SortMode::Az);
        assert!(store.private_unlocked());
        assert_eq!(store.guestbook()[0].message, "lovely");
        assert_eq!(store.comments("cold-water")[0].name, "Bo");
        assert_eq!(
            store.catalog().by_id(4).unwrap().audio_url,
            "https://cdn.example/cold.mp3"
        );
    }

    #[test]
    fn duplicate_stored_catalog_falls_back_to_seed() {
        let records = Records::open_in_memory().unwrap();
        let mut songs = seed::songs();
        songs[1].slug = songs[0].slug.clone();
        records.set(keys::CATALOG, &songs);

        let store = Store::open(records);
        assert_eq!(store.catalog().songs(), seed::songs().as_slice());
    }

    #[test]
    fn reset_restores_fresh_state() {
        let mut store = store();
        store.toggle_like(1);
        store.set_sort_mode(SortMode::Liked);
        store.set_private_unlocked(true);
        store.add_comment("cold-water", "Bo", "classic").unwrap();
        store.set_audio_source(4, "https://cdn.example/cold.mp3").unwrap();

        store.reset();

        assert!(store.liked().is_empty());
        assert!(store.comment_threads().is_empty());
        assert!(!store.private_unlocked());
        assert_eq!(store.sort_mode(), SortMode::Newest);
        assert_eq!(store.catalog().by_id(4).unwrap().audio_url, "");
        for key in keys::ALL {
            assert_eq!(store.records().read(key).unwrap(), None);
        }
    }
}
