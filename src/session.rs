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

//! The state core of one visitor session.
//!
//! [`Session`] wires the persisted [`Store`], the [`Router`], the memoized
//! visible list, the [`Playback`] queue and the [`TitleBinder`] together. Every
//! operation runs to completion on the caller's thread and leaves the pieces
//! consistent with each other:
//!
//! * the visible list is recomputed from the current inputs on demand
//! * the title follows the route and the resolved song
//! * the output follows the queue, without reloading for unrelated changes
//!
//! The queue is filled from a copy of the visible list at play time and never
//! reads it again.

use std::path::Path;

use anyhow::Result;

use crate::{
    binder::{TitleBinder, TitleSink},
    model::{
        Message, Notice, Song, SongId, SortMode,
        catalog::CatalogError,
        queue::{Direction, Queue},
        search::{ViewCache, ViewQuery},
    },
    player::{
        AudioOutput,
        playback::{Playback, StepResult},
    },
    router::{Route, Router, history::Listener},
    storage::{
        error::{EntryError, ImportError},
        media::probe_file,
        store::Store,
        transfer,
    },
};

pub(crate) struct Session<O: AudioOutput, T: TitleSink> {
    store: Store,
    router: Router,
    search: String,
    view: ViewCache,
    playback: Playback<O>,
    title: TitleBinder<T>,
}

impl<O: AudioOutput, T: TitleSink> Session<O, T> {
    pub(crate) fn new(store: Store, router: Router, output: O, title: TitleBinder<T>) -> Self {
        let mut session = Self {
            store,
            router,
            search: String::new(),
            view: ViewCache::new(),
            playback: Playback::new(output),
            title,
        };
        session.refresh_title();

        session
    }

    pub(crate) fn store(&self) -> &Store {
        &self.store
    }

    pub(crate) fn route(&self) -> &Route {
        self.router.route()
    }

    pub(crate) fn path(&self) -> &str {
        self.router.path()
    }

    pub(crate) fn search_text(&self) -> &str {
        &self.search
    }

    pub(crate) fn queue(&self) -> &Queue {
        self.playback.queue()
    }

    pub(crate) fn title(&self) -> Option<&str> {
        self.title.applied()
    }

    /// The song under the queue cursor, if it still exists.
    pub(crate) fn now_playing(&self) -> Option<&Song> {
        self.queue()
            .current()
            .and_then(|id| self.store.catalog().by_id(id))
    }

    /// Songs the current route shows, filtered and ordered.
    pub(crate) fn visible_songs(&mut self) -> &[Song] {
        let query = ViewQuery {
            catalog: self.store.catalog(),
            liked: self.store.liked(),
            private_route: self.router.route().is_private(),
            unlocked: self.store.private_unlocked(),
            search: &self.search,
            sort: self.store.sort_mode(),
        };

        self.view.get(&query, self.store.revisions())
    }

    /// The song of the current detail route.
    ///
    /// Resolved against the full catalog, so a private song is returned even
    /// while the private area is locked.
    pub(crate) fn detail(&self) -> Option<&Song> {
        let song = self.router.resolve_song(self.store.catalog())?;
        if !song.is_public() && !self.store.private_unlocked() {
            log::warn!("Private song '{}' resolved while locked", song.slug);
        }

        Some(song)
    }

    /// Comments on the song of the current detail route, newest first.
    pub(crate) fn detail_comments(&self) -> &[Message] {
        match self.router.route() {
            Route::Song(slug) => self.store.comments(slug),
            _ => &[],
        }
    }

    /// Registers a callback for changes of the external location.
    pub(crate) fn subscribe(&mut self, listener: Listener) {
        self.router.subscribe(listener);
    }

    pub(crate) fn navigate(&mut self, path: &str) -> bool {
        let changed = self.router.navigate(path);
        self.refresh_title();
        changed
    }

    /// Follows a change of the external location.
    pub(crate) fn on_location_changed(&mut self, location: &str) -> bool {
        let changed = self.router.sync(location);
        self.refresh_title();
        changed
    }

    pub(crate) fn back(&mut self) -> bool {
        let moved = self.router.back();
        self.refresh_title();
        moved
    }

    pub(crate) fn forward(&mut self) -> bool {
        let moved = self.router.forward();
        self.refresh_title();
        moved
    }

    pub(crate) fn edit(&mut self, path: &str) -> bool {
        let changed = self.router.edit(path);
        self.refresh_title();
        changed
    }

    pub(crate) fn set_search(&mut self, text: &str) {
        self.search = text.to_string();
    }

    pub(crate) fn set_sort(&mut self, mode: SortMode) {
        self.store.set_sort_mode(mode);
    }

    /// Flips the visitor's like on a song, returning the new state.
    pub(crate) fn toggle_like(&mut self, slug: &str) -> Result<bool, CatalogError> {
        let id = self.song_id(slug)?;
        let liked = self
            .store
            .toggle_like(id)
            .ok_or(CatalogError::UnknownSong(id))?;
        self.playback.sync(self.store.catalog());

        Ok(liked)
    }

    pub(crate) fn set_unlocked(&mut self, unlocked: bool) {
        self.store.set_private_unlocked(unlocked);
    }

    /// Starts playing the visible list from the song with `slug`.
    ///
    /// A song that is not in the visible list cannot be played, and one
    /// without audio is reported; neither changes the queue.
    pub(crate) fn play_song(&mut self, slug: &str) -> Option<Notice> {
        let visible = self.visible_songs().to_vec();
        let Some(index) = visible.iter().position(|song| song.slug == slug) else {
            return Some(Notice::Info(format!("'{slug}' is not in the current list")));
        };

        let song = &visible[index];
        if !song.has_audio() {
            return Some(Notice::Info(format!("{} has no audio yet", song.title)));
        }

        self.start(&visible, index)
    }

    /// Starts playing the visible list from the top. Nothing happens when the
    /// list is empty.
    pub(crate) fn play_all(&mut self) -> Option<Notice> {
        let visible = self.visible_songs().to_vec();
        if visible.is_empty() {
            return None;
        }

        self.start(&visible, 0)
    }

    pub(crate) fn step(&mut self, direction: Direction) -> Option<Notice> {
        match self.playback.step(direction, self.store.catalog()) {
            StepResult::Moved(notice) => notice,
            StepResult::Ignored => None,
        }
    }

    pub(crate) fn stop(&mut self) -> Option<Notice> {
        self.playback.stop(self.store.catalog())
    }

    /// Pauses or resumes the queue. An idle queue starts playing the visible
    /// list instead.
    pub(crate) fn toggle(&mut self) -> Option<Notice> {
        match self.playback.toggle(self.store.catalog()) {
            StepResult::Moved(notice) => notice,
            StepResult::Ignored => self.play_all(),
        }
    }

    pub(crate) fn on_track_finished(&mut self, generation: u64) -> Option<Notice> {
        self.playback
            .on_track_finished(generation, self.store.catalog())
    }

    pub(crate) fn on_playback_failed(&mut self, generation: u64, reason: &str) -> Option<Notice> {
        self.playback
            .on_playback_failed(generation, reason, self.store.catalog())
    }

    pub(crate) fn add_comment(
        &mut self,
        slug: &str,
        name: &str,
        message: &str,
    ) -> Result<(), EntryError> {
        self.store.add_comment(slug, name, message)
    }

    pub(crate) fn sign_guestbook(&mut self, name: &str, message: &str) -> Result<(), EntryError> {
        self.store.sign_guestbook(name, message)
    }

    /// Sets the audio source of a song. A playing song picks up the new source
    /// straight away.
    pub(crate) fn attach_audio(&mut self, slug: &str, url: &str) -> Result<Option<Notice>, CatalogError> {
        let id = self.song_id(slug)?;
        self.store.set_audio_source(id, url)?;

        Ok(self.playback.sync(self.store.catalog()))
    }

    /// Attaches a local audio file to a song, taking the song's duration from
    /// the file.
    ///
    /// # Errors
    ///
    /// Returns an error for an unknown song or a file that is not readable
    /// audio.
    pub(crate) fn attach_file(&mut self, slug: &str, path: &Path) -> Result<Option<Notice>> {
        let id = self.song_id(slug)?;
        let probed = probe_file(path)?;

        self.store.set_audio_source(id, &probed.source)?;
        self.store.set_duration(id, &probed.duration)?;

        Ok(self.playback.sync(self.store.catalog()))
    }

    pub(crate) fn detach_audio(&mut self, slug: &str) -> Result<Option<Notice>, CatalogError> {
        self.attach_audio(slug, "")
    }

    pub(crate) fn export_json(&self) -> Result<String, serde_json::Error> {
        transfer::export_json(&self.store)
    }

    /// Imports a bulk record, returning the names of the applied fields.
    ///
    /// # Errors
    ///
    /// A payload that is not a JSON object is rejected as a whole and nothing
    /// changes.
    pub(crate) fn import_json(&mut self, text: &str) -> Result<(Vec<&'static str>, Option<Notice>), ImportError> {
        let fields = transfer::import_json(&mut self.store, text)?;
        let notice = self.settle();

        Ok((fields, notice))
    }

    /// Clears all durable state back to a fresh install. The queue is kept but
    /// may no longer resolve.
    pub(crate) fn reset(&mut self) -> Option<Notice> {
        self.store.reset();
        self.settle()
    }

    fn start(&mut self, visible: &[Song], index: usize) -> Option<Notice> {
        let notice = match self.playback.start(visible, index, self.store.catalog()) {
            StepResult::Moved(notice) => notice,
            StepResult::Ignored => return None,
        };

        if !self.router.route().is_song() {
            self.navigate(&visible[index].path());
        }

        notice
    }

    fn song_id(&self, slug: &str) -> Result<SongId, CatalogError> {
        self.store
            .catalog()
            .by_slug(slug)
            .map(|song| song.id)
            .ok_or_else(|| CatalogError::UnknownSlug(slug.to_string()))
    }

    fn settle(&mut self) -> Option<Notice> {
        self.refresh_title();
        self.playback.sync(self.store.catalog())
    }

    fn refresh_title(&mut self) {
        let song = self.router.resolve_song(self.store.catalog());
        self.title.bind(self.router.route(), song);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::mpsc;

    use super::*;
    use crate::{
        binder::tests::RecordingTitle,
        model::{catalog::Catalog, seed},
        player::playback::tests::FakeOutput,
        router::history::History,
        storage::{Records, keys},
    };

    type TestSession = Session<FakeOutput, RecordingTitle>;

    fn with_audio(mut songs: Vec<Song>) -> Vec<Song> {
        for song in &mut songs {
            song.audio_url = format!("https://cdn.example/{}.mp3", song.slug);
        }
        songs
    }

    fn session_at(location: &str, songs: Vec<Song>) -> TestSession {
        let mut store = Store::open(Records::open_in_memory().unwrap());
        store.replace_catalog(Catalog::from_songs(songs).unwrap());

        Session::new(
            store,
            Router::new(History::new(location)),
            FakeOutput::default(),
            TitleBinder::new("Liner", RecordingTitle::default()),
        )
    }

    // Harbour Lights (Jun), Paper Moons (Jul) and Static Summer (Aug).
    fn summer_session() -> TestSession {
        session_at("/music", with_audio(seed::songs()[..3].to_vec()))
    }

    fn visible_ids(session: &mut TestSession) -> Vec<SongId> {
        session.visible_songs().iter().map(|song| song.id).collect()
    }

    #[test]
    fn play_then_sort_keeps_queue() {
        let mut session = summer_session();
        assert_eq!(visible_ids(&mut session), vec![3, 2, 1]);

        assert_eq!(session.play_song("paper-moons"), None);
        assert_eq!(session.queue().ids(), &[3, 2, 1]);
        assert_eq!(session.queue().cursor(), Some(1));
        assert!(session.queue().is_playing());
        assert_eq!(session.path(), "/song/paper-moons");

        session.set_sort(SortMode::Az);
        assert_eq!(visible_ids(&mut session), vec![1, 2, 3]);
        assert_eq!(session.queue().ids(), &[3, 2, 1]);
        assert_eq!(session.queue().cursor(), Some(1));
    }

    #[test]
    fn search_does_not_touch_queue() {
        let mut session = summer_session();
        session.play_song("paper-moons");

        session.set_search("harbour");
        assert_eq!(visible_ids(&mut session), vec![1]);
        assert_eq!(session.queue().ids(), &[3, 2, 1]);
        assert_eq!(session.queue().cursor(), Some(1));
    }

    #[test]
    fn steps_wrap_around() {
        let mut session = summer_session();
        session.play_song("harbour-lights");
        assert_eq!(session.queue().cursor(), Some(2));

        session.step(Direction::Forward);
        assert_eq!(session.queue().cursor(), Some(0));
        assert_eq!(session.now_playing().unwrap().slug, "static-summer");

        session.step(Direction::Backward);
        assert_eq!(session.queue().cursor(), Some(2));
    }

    #[test]
    fn play_all_on_empty_list_is_a_no_op() {
        let mut session = summer_session();
        session.set_search("zzz");
        assert_eq!(session.play_all(), None);
        assert!(session.queue().is_idle());

        session.set_search("");
        session.play_song("static-summer");
        let before = session.queue().clone();
        session.set_search("zzz");
        assert_eq!(session.play_all(), None);
        assert_eq!(session.queue(), &before);
    }

    #[test]
    fn play_all_navigates_to_first_song() {
        let mut session = summer_session();

        session.play_all();

        assert_eq!(session.queue().current(), Some(3));
        assert_eq!(session.path(), "/song/static-summer");
        assert_eq!(session.title(), Some("Static Summer – Liner"));
    }

    #[test]
    fn detail_route_is_kept_when_playing() {
        let mut session = session_at("/song/cold-water", with_audio(seed::songs()));

        session.play_all();

        assert_eq!(session.path(), "/song/cold-water");
        assert_eq!(session.queue().ids(), &[3, 2, 1, 4]);
    }

    #[test]
    fn invisible_or_silent_songs_are_not_played() {
        let mut songs = with_audio(seed::songs());
        songs[1].audio_url.clear();
        let mut session = session_at("/music", songs);

        let notice = session.play_song("basement-demo");
        assert!(matches!(notice, Some(Notice::Info(_))));
        assert!(session.queue().is_idle());

        let notice = session.play_song("paper-moons");
        assert_eq!(
            notice,
            Some(Notice::Info("Paper Moons has no audio yet".to_string()))
        );
        assert!(session.queue().is_idle());
        assert_eq!(session.path(), "/music");
    }

    #[test]
    fn private_route_is_gated_by_unlock_flag() {
        let mut session = session_at("/music", with_audio(seed::songs()));
        session.navigate("/private");

        assert!(session.visible_songs().is_empty());
        session.set_search("demo");
        session.set_sort(SortMode::Liked);
        assert!(session.visible_songs().is_empty());

        session.set_unlocked(true);
        assert_eq!(visible_ids(&mut session), vec![5]);
        session.set_search("");
        assert_eq!(session.visible_songs().len(), 5);

        session.navigate("/music");
        assert!(!visible_ids(&mut session).contains(&5));
    }

    #[test]
    fn private_detail_resolves_while_locked() {
        let session = session_at("/song/basement-demo", seed::songs());

        assert_eq!(session.detail().unwrap().id, 5);
        assert_eq!(session.title(), Some("Basement Demo – Liner"));
    }

    #[test]
    fn malformed_import_changes_nothing() {
        let mut session = summer_session();
        session.toggle_like("paper-moons").unwrap();
        session.sign_guestbook("Ada", "hello").unwrap();
        let before: Vec<_> = keys::ALL
            .iter()
            .map(|key| session.store().records().read(key).unwrap())
            .collect();

        let result = session.import_json("[1, 2, 3]");

        assert!(matches!(result, Err(ImportError::NotAnObject)));
        let after: Vec<_> = keys::ALL
            .iter()
            .map(|key| session.store().records().read(key).unwrap())
            .collect();
        assert_eq!(after, before);
    }

    #[test]
    fn import_of_new_catalog_stops_orphaned_queue() {
        let mut session = summer_session();
        session.play_song("paper-moons");

        let payload = serde_json::json!({ "songs": seed::songs()[3..4].to_vec() });
        let (fields, notice) = session.import_json(&payload.to_string()).unwrap();

        assert_eq!(fields, vec!["songs"]);
        assert!(notice.is_some());
        assert!(!session.queue().is_playing());
        assert_eq!(session.title(), Some("Liner"));
    }

    #[test]
    fn like_does_not_restart_audio() {
        let mut session = summer_session();
        session.set_sort(SortMode::Liked);
        session.play_song("harbour-lights");
        let calls = session.playback.output().calls.len();

        assert_eq!(session.toggle_like("harbour-lights"), Ok(true));
        assert!(session.toggle_like("nope").is_err());
        assert_eq!(session.playback.output().calls.len(), calls);
    }

    #[test]
    fn toggle_on_idle_queue_plays_all() {
        let mut session = summer_session();

        session.toggle();
        assert_eq!(session.queue().cursor(), Some(0));
        assert!(session.queue().is_playing());

        session.toggle();
        assert!(!session.queue().is_playing());
        assert_eq!(session.queue().cursor(), Some(0));
    }

    #[test]
    fn detaching_playing_song_stops_it() {
        let mut session = summer_session();
        session.play_song("static-summer");

        let notice = session.detach_audio("static-summer").unwrap();

        assert_eq!(
            notice,
            Some(Notice::Info("Static Summer has no audio yet".to_string()))
        );
        assert!(!session.queue().is_playing());
        assert_eq!(
            session.attach_audio("nope", "x"),
            Err(CatalogError::UnknownSlug("nope".to_string()))
        );
    }

    #[test]
    fn history_moves_take_effect_immediately() {
        let (tx, rx) = mpsc::channel();
        let mut session = summer_session();
        session.subscribe(Box::new(move |path| {
            let _ = tx.send(path.to_string());
        }));

        session.navigate("/song/paper-moons");
        session.navigate("/nowhere");
        assert_eq!(session.title(), Some("Liner"));

        assert!(session.back());
        assert_eq!(session.path(), "/song/paper-moons");
        assert_eq!(session.title(), Some("Paper Moons – Liner"));

        // A command queued behind the notifications still sees the new route.
        session.navigate("/song/paper-moons");
        assert!(session.edit("#/guestbook"));
        assert_eq!(session.title(), Some("Guestbook – Liner"));

        for location in rx.try_iter().collect::<Vec<_>>() {
            assert!(!session.on_location_changed(&location));
        }
        assert_eq!(session.path(), "/guestbook");
        assert_eq!(session.title(), Some("Guestbook – Liner"));
    }

    #[test]
    fn comments_show_on_detail_route() {
        let mut session = session_at("/song/cold-water", seed::songs());

        session.add_comment("cold-water", "Bo", "classic").unwrap();

        assert_eq!(session.detail_comments()[0].message, "classic");
        session.reset();
        assert!(session.detail_comments().is_empty());
    }
}
