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

//! Audio playback control and state management.
//!
//! This module provides the [`AudioOutput`] seam between the playback queue
//! and the component that actually produces sound, and [`AudioPlayer`], the
//! production output. The player manages a background worker thread that
//! interfaces with the underlying audio library (MPV), ensuring that audio
//! operations do not block the main application thread.

mod commands;
pub(crate) mod playback;

use std::sync::mpsc;

use anyhow::Result;

use crate::{events::AppEvent, player::commands::AudioPlayerCommand};

/// Represents the current playback status of the audio engine.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum PlayerState {
    Playing,
    Paused,
    Stopped,
}

impl PlayerState {
    // Maps internal audio backend flags to a simplified [`PlayerState`].
    fn from_flags(is_paused: bool, is_idle: bool) -> Self {
        if is_idle {
            PlayerState::Stopped
        } else if is_paused {
            PlayerState::Paused
        } else {
            PlayerState::Playing
        }
    }
}

/// The playback primitive as seen by the queue.
///
/// Completion and failure are not reported through this trait: they arrive
/// later as events tagged with the `generation` passed to [`load`].
///
/// [`load`]: AudioOutput::load
pub(crate) trait AudioOutput {
    /// Replaces the current source. The paused state carries over.
    fn load(&mut self, source: &str, generation: u64) -> Result<()>;

    fn play(&mut self) -> Result<()>;

    fn pause(&mut self) -> Result<()>;

    /// Moves the playback position back to the start of the source.
    fn rewind(&mut self) -> Result<()>;
}

/// A handle to the audio playback engine.
///
/// This struct acts as a command proxy; it does not perform audio processing
/// itself but instead sends instructions to a background worker thread.
pub(crate) struct AudioPlayer {
    /// Channel for sending commands to the background worker thread.
    command_tx: mpsc::Sender<AudioPlayerCommand>,
}

impl AudioPlayer {
    /// Spawns the audio worker thread and returns a new player handle.
    ///
    /// # Arguments
    ///
    /// * `event_tx` - A channel to send application-level events (end of
    ///   track, load failures, state changes) back to the main event loop.
    pub(crate) fn new(event_tx: mpsc::Sender<AppEvent>) -> Self {
        let (command_tx, command_rx) = mpsc::channel::<AudioPlayerCommand>();

        commands::spawn_player_worker(command_rx, event_tx);

        Self { command_tx }
    }

    fn send(&self, command: AudioPlayerCommand) -> Result<()> {
        self.command_tx.send(command)?;
        Ok(())
    }
}

impl AudioOutput for AudioPlayer {
    fn load(&mut self, source: &str, generation: u64) -> Result<()> {
        log::info!("Loading {source} (generation {generation})");
        self.send(AudioPlayerCommand::Load {
            source: source.to_string(),
            generation,
        })
    }

    fn play(&mut self) -> Result<()> {
        self.send(AudioPlayerCommand::Play)
    }

    fn pause(&mut self) -> Result<()> {
        self.send(AudioPlayerCommand::Pause)
    }

    fn rewind(&mut self) -> Result<()> {
        self.send(AudioPlayerCommand::Rewind)
    }
}
