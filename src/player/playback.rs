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

//! Playback queue bound to the playback primitive.
//!
//! [`Playback`] owns both the logical [`Queue`] and the [`AudioOutput`], and is
//! the only code that touches the output. After every queue transition
//! [`Playback::sync`] reconciles the output with the queue:
//!
//! * the song under the cursor is resolved in the catalog and compared with
//!   the loaded one by id *and* audio source; the source is only reloaded when
//!   either differs, so unrelated changes never restart the audio
//! * a song without audio (or one that no longer exists) forces playing off
//! * the output is played or paused to match the playing flag
//!
//! Completion and failure reports carry the generation of the load they refer
//! to and are dropped when that load has since been replaced.

use anyhow::Result;

use crate::{
    model::{
        Notice, Song, SongId,
        catalog::Catalog,
        queue::{Direction, Queue},
    },
    player::AudioOutput,
};

#[derive(Debug, Clone, Eq, PartialEq)]
struct Loaded {
    id: SongId,
    source: String,
    generation: u64,
    failed: bool,
}

pub(crate) struct Playback<O: AudioOutput> {
    queue: Queue,
    output: O,
    generation: u64,
    loaded: Option<Loaded>,
    output_playing: bool,
}

impl<O: AudioOutput> Playback<O> {
    pub(crate) fn new(output: O) -> Self {
        Self {
            queue: Queue::new(),
            output,
            generation: 0,
            loaded: None,
            output_playing: false,
        }
    }

    pub(crate) fn queue(&self) -> &Queue {
        &self.queue
    }

    /// Id of the song currently loaded into the output, if any.
    pub(crate) fn loaded_id(&self) -> Option<SongId> {
        self.loaded.as_ref().map(|loaded| loaded.id)
    }

    /// Replaces the queue with the ids of `visible` and starts at `index`.
    ///
    /// Nothing changes when `index` is out of bounds.
    pub(crate) fn start(&mut self, visible: &[Song], index: usize, catalog: &Catalog) -> StepResult {
        let ids = visible.iter().map(|song| song.id).collect();
        if !self.queue.start(ids, index) {
            return StepResult::Ignored;
        }

        log::debug!("Queue started at {index} of {}", self.queue.ids().len());
        // Playing the loaded song again starts it over.
        if self.queue.current() == self.loaded_id() {
            self.rewind();
        }

        StepResult::Moved(self.sync(catalog))
    }

    /// Moves the cursor one place with wraparound. The playing flag is kept.
    pub(crate) fn step(&mut self, direction: Direction, catalog: &Catalog) -> StepResult {
        let before = self.queue.current();
        if self.queue.step(direction).is_none() {
            return StepResult::Ignored;
        }

        log::debug!("Queue stepped {direction:?} to {:?}", self.queue.cursor());
        if self.queue.current() == before {
            self.rewind();
        }

        StepResult::Moved(self.sync(catalog))
    }

    /// Stops playing, keeping the queue and cursor, and rewinds the output.
    pub(crate) fn stop(&mut self, catalog: &Catalog) -> Option<Notice> {
        self.queue.stop();
        self.rewind();
        self.sync(catalog)
    }

    /// Flips the playing flag of a loaded queue.
    ///
    /// Returns [`StepResult::Ignored`] on an idle queue.
    pub(crate) fn toggle(&mut self, catalog: &Catalog) -> StepResult {
        if self.queue.is_idle() {
            return StepResult::Ignored;
        }

        self.queue.set_playing(!self.queue.is_playing());
        StepResult::Moved(self.sync(catalog))
    }

    /// Advances after the output finished a source on its own.
    ///
    /// The finished source is gone from the output, so the next song is loaded
    /// even if it is the same one.
    pub(crate) fn on_track_finished(&mut self, generation: u64, catalog: &Catalog) -> Option<Notice> {
        if !self.is_current(generation) {
            log::debug!("Ignoring end of stale generation {generation}");
            return None;
        }

        self.loaded = None;
        match self.queue.next() {
            Some(_) => self.sync(catalog),
            None => None,
        }
    }

    /// Records that the output could not play the current source.
    pub(crate) fn on_playback_failed(
        &mut self,
        generation: u64,
        reason: &str,
        catalog: &Catalog,
    ) -> Option<Notice> {
        if !self.is_current(generation) {
            log::debug!("Ignoring failure of stale generation {generation}");
            return None;
        }

        let loaded = self.loaded.as_mut()?;
        loaded.failed = true;
        let id = loaded.id;
        log::warn!("Playback of song {id} failed: {reason}");

        self.queue.set_playing(false);
        self.apply_playing(false);

        let title = catalog
            .by_id(id)
            .map_or_else(|| format!("song {id}"), |song| song.title.clone());
        Some(Notice::Info(format!("Could not play {title}: {reason}")))
    }

    /// Reconciles the output with the queue and the catalog.
    pub(crate) fn sync(&mut self, catalog: &Catalog) -> Option<Notice> {
        let Some(id) = self.queue.current() else {
            return self.apply_playing(false);
        };

        let song = catalog.by_id(id).filter(|song| song.has_audio());
        let Some(song) = song else {
            let was_playing = self.queue.is_playing();
            self.queue.set_playing(false);
            self.loaded = None;
            let failure = self.apply_playing(false);

            return failure.or_else(|| {
                was_playing.then(|| {
                    let title = catalog.by_id(id).map_or("This song", |song| song.title.as_str());
                    Notice::Info(format!("{title} has no audio yet"))
                })
            });
        };

        let unchanged = self.loaded.as_ref().is_some_and(|loaded| {
            loaded.id == song.id && loaded.source == song.audio_url && !loaded.failed
        });
        // A failed source is retried only when asked to play.
        let retry_later = self.loaded.as_ref().is_some_and(|loaded| {
            loaded.id == song.id && loaded.source == song.audio_url && loaded.failed
        }) && !self.queue.is_playing();

        if !unchanged && !retry_later {
            self.generation += 1;
            if let Err(e) = self.output.load(&song.audio_url, self.generation) {
                return Some(self.output_failure(e));
            }
            self.loaded = Some(Loaded {
                id: song.id,
                source: song.audio_url.clone(),
                generation: self.generation,
                failed: false,
            });
        }

        self.apply_playing(self.queue.is_playing())
    }

    fn is_current(&self, generation: u64) -> bool {
        self.loaded
            .as_ref()
            .is_some_and(|loaded| loaded.generation == generation)
    }

    fn rewind(&mut self) {
        if self.loaded.is_none() {
            return;
        }

        if let Err(e) = self.output.rewind() {
            log::warn!("Failed to rewind output: {e}");
        }
    }

    fn apply_playing(&mut self, playing: bool) -> Option<Notice> {
        if playing == self.output_playing {
            return None;
        }

        let result: Result<()> = if playing {
            self.output.play()
        } else {
            self.output.pause()
        };

        match result {
            Ok(()) => {
                self.output_playing = playing;
                None
            }
            Err(e) => Some(self.output_failure(e)),
        }
    }

    fn output_failure(&mut self, e: anyhow::Error) -> Notice {
        log::warn!("Audio output unavailable: {e}");
        self.queue.set_playing(false);
        Notice::Failure(format!("audio output unavailable: {e}"))
    }

    #[cfg(test)]
    pub(crate) fn output(&self) -> &O {
        &self.output
    }
}

/// Outcome of a queue transition.
#[derive(Debug, Clone, Eq, PartialEq)]
pub(crate) enum StepResult {
    /// The transition did not apply; nothing changed.
    Ignored,
    /// The queue changed, with anything the user should be told.
    Moved(Option<Notice>),
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::model::seed;

    #[derive(Debug, Clone, Eq, PartialEq)]
    pub(crate) enum Call {
        Load(String, u64),
        Play,
        Pause,
        Rewind,
    }

    /// Output that records every call made to it.
    #[derive(Default)]
    pub(crate) struct FakeOutput {
        pub(crate) calls: Vec<Call>,
        pub(crate) broken: bool,
    }

    impl FakeOutput {
        fn record(&mut self, call: Call) -> Result<()> {
            if self.broken {
                anyhow::bail!("worker gone");
            }
            self.calls.push(call);
            Ok(())
        }

        pub(crate) fn loads(&self) -> Vec<&str> {
            self.calls
                .iter()
                .filter_map(|call| match call {
                    Call::Load(source, _) => Some(source.as_str()),
                    _ => None,
                })
                .collect()
        }
    }

    impl AudioOutput for FakeOutput {
        fn load(&mut self, source: &str, generation: u64) -> Result<()> {
            self.record(Call::Load(source.to_string(), generation))
        }

        fn play(&mut self) -> Result<()> {
            self.record(Call::Play)
        }

        fn pause(&mut self) -> Result<()> {
            self.record(Call::Pause)
        }

        fn rewind(&mut self) -> Result<()> {
            self.record(Call::Rewind)
        }
    }

    fn catalog_with_audio() -> Catalog {
        let mut catalog = Catalog::from_songs(seed::songs()).unwrap();
        for id in 1..=4 {
            catalog
                .set_audio_url(id, &format!("https://cdn.example/{id}.mp3"))
                .unwrap();
        }
        catalog
    }

    fn songs(catalog: &Catalog, ids: &[SongId]) -> Vec<Song> {
        ids.iter()
            .map(|id| catalog.by_id(*id).unwrap().clone())
            .collect()
    }

    #[test]
    fn start_loads_and_plays() {
        let catalog = catalog_with_audio();
        let mut playback = Playback::new(FakeOutput::default());

        let result = playback.start(&songs(&catalog, &[3, 2, 1]), 1, &catalog);

        assert_eq!(result, StepResult::Moved(None));
        assert_eq!(playback.queue().ids(), &[3, 2, 1]);
        assert_eq!(
            playback.output().calls,
            vec![Call::Load("https://cdn.example/2.mp3".to_string(), 1), Call::Play]
        );
    }

    #[test]
    fn unrelated_sync_does_not_reload() {
        let mut catalog = catalog_with_audio();
        let mut playback = Playback::new(FakeOutput::default());
        playback.start(&songs(&catalog, &[1, 2]), 0, &catalog);

        assert_eq!(playback.sync(&catalog), None);
        catalog.set_duration(1, "3:43").unwrap();
        assert_eq!(playback.sync(&catalog), None);
        assert_eq!(playback.output().loads().len(), 1);

        catalog.set_audio_url(1, "https://cdn.example/remaster.mp3").unwrap();
        playback.sync(&catalog);
        assert_eq!(
            playback.output().loads(),
            vec!["https://cdn.example/1.mp3", "https://cdn.example/remaster.mp3"]
        );
    }

    #[test]
    fn song_without_audio_forces_playing_off() {
        let mut catalog = catalog_with_audio();
        catalog.set_audio_url(2, "").unwrap();
        let mut playback = Playback::new(FakeOutput::default());
        playback.start(&songs(&catalog, &[1, 2]), 0, &catalog);

        let result = playback.step(Direction::Forward, &catalog);

        assert_eq!(
            result,
            StepResult::Moved(Some(Notice::Info("Paper Moons has no audio yet".to_string())))
        );
        assert_eq!(playback.queue().cursor(), Some(1));
        assert!(!playback.queue().is_playing());
        assert_eq!(playback.output().calls.last(), Some(&Call::Pause));
    }

    #[test]
    fn stop_rewinds_and_toggle_resumes() {
        let catalog = catalog_with_audio();
        let mut playback = Playback::new(FakeOutput::default());
        playback.start(&songs(&catalog, &[1, 2, 3]), 2, &catalog);

        playback.stop(&catalog);
        assert!(!playback.queue().is_playing());
        assert_eq!(playback.queue().cursor(), Some(2));

        assert_eq!(playback.toggle(&catalog), StepResult::Moved(None));
        assert!(playback.queue().is_playing());
        assert_eq!(playback.output().loads().len(), 1);
        assert_eq!(
            playback.output().calls[2..],
            [Call::Rewind, Call::Pause, Call::Play]
        );
    }

    #[test]
    fn toggle_on_idle_queue_is_ignored() {
        let catalog = catalog_with_audio();
        let mut playback = Playback::new(FakeOutput::default());

        assert_eq!(playback.toggle(&catalog), StepResult::Ignored);
        assert_eq!(playback.step(Direction::Backward, &catalog), StepResult::Ignored);
        assert!(playback.output().calls.is_empty());
    }

    #[test]
    fn stale_track_end_is_ignored() {
        let catalog = catalog_with_audio();
        let mut playback = Playback::new(FakeOutput::default());
        playback.start(&songs(&catalog, &[1, 2, 3]), 0, &catalog);
        playback.step(Direction::Forward, &catalog);

        // Generation 1 belonged to the first song, since replaced.
        assert_eq!(playback.on_track_finished(1, &catalog), None);
        assert_eq!(playback.queue().cursor(), Some(1));

        playback.on_track_finished(2, &catalog);
        assert_eq!(playback.queue().cursor(), Some(2));
        assert_eq!(playback.loaded_id(), Some(3));
    }

    #[test]
    fn single_song_queue_replays() {
        let catalog = catalog_with_audio();
        let mut playback = Playback::new(FakeOutput::default());
        playback.start(&songs(&catalog, &[4]), 0, &catalog);

        playback.step(Direction::Forward, &catalog);
        assert_eq!(playback.output().calls.last(), Some(&Call::Rewind));
        assert_eq!(playback.output().loads().len(), 1);

        playback.on_track_finished(1, &catalog);
        assert_eq!(
            playback.output().loads(),
            vec!["https://cdn.example/4.mp3", "https://cdn.example/4.mp3"]
        );
        assert!(playback.queue().is_playing());
    }

    #[test]
    fn failure_stops_and_retries_only_on_play() {
        let catalog = catalog_with_audio();
        let mut playback = Playback::new(FakeOutput::default());
        playback.start(&songs(&catalog, &[1, 2]), 0, &catalog);

        assert_eq!(playback.on_playback_failed(7, "nope", &catalog), None);
        let notice = playback.on_playback_failed(1, "404", &catalog);
        assert_eq!(
            notice,
            Some(Notice::Info("Could not play Harbour Lights: 404".to_string()))
        );
        assert!(!playback.queue().is_playing());

        playback.sync(&catalog);
        assert_eq!(playback.output().loads().len(), 1);

        playback.toggle(&catalog);
        assert_eq!(playback.output().loads().len(), 2);
        assert!(playback.queue().is_playing());
    }

    #[test]
    fn vanished_song_forces_playing_off() {
        let catalog = catalog_with_audio();
        let mut playback = Playback::new(FakeOutput::default());
        playback.start(&songs(&catalog, &[1, 2]), 1, &catalog);

        let empty = Catalog::default();
        assert!(playback.sync(&empty).is_some());
        assert!(!playback.queue().is_playing());
        assert_eq!(playback.queue().ids(), &[1, 2]);
    }

    #[test]
    fn broken_output_is_reported() {
        let catalog = catalog_with_audio();
        let output = FakeOutput {
            broken: true,
            ..FakeOutput::default()
        };
        let mut playback = Playback::new(output);

        let result = playback.start(&songs(&catalog, &[1]), 0, &catalog);

        assert!(matches!(result, StepResult::Moved(Some(Notice::Failure(_)))));
        assert!(!playback.queue().is_playing());
    }
}
