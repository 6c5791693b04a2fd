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

//! MPV-backed audio playback engine and event processing.
//!
//! This module provides the playback primitive, leveraging `libmpv` for audio
//! decoding and playback control. It manages a background worker thread that
//! bridges the application's command-based interface and the low-level MPV
//! property observation system.
//!
//! # Architecture
//!
//! The engine operates using a dual-channel communication pattern:
//! 1. **Command Channel**: Receives [`AudioPlayerCommand`]s to load a source
//!    and control playback.
//! 2. **Event Channel**: Broadcasts [`AppEvent`]s to notify the application of
//!    end of track, load failures and state changes.
//!
//! Every load carries a generation number. End-of-track and failure events are
//! tagged with the generation of the load they belong to so the receiver can
//! discard reports about a source it has since replaced. A new generation only
//! takes effect once MPV reports that it has started the new file, so an end
//! of file already queued for the previous source keeps the old tag.
//!
//! A command MPV rejects never stops the worker: a failed load is reported as
//! a playback failure of its generation, other failures are logged.

use anyhow::{Context, Result};
use mpv::Format;
use std::{
    sync::mpsc::{Receiver, Sender, TryRecvError},
    thread,
};

use crate::{events::AppEvent, player::PlayerState};

#[derive(Debug)]
pub(crate) enum AudioPlayerCommand {
    Load { source: String, generation: u64 },
    Play,
    Pause,
    Rewind,
}

/// Worker-side view of the engine.
#[derive(Debug)]
struct EngineState {
    /// Generation of the file MPV is playing, or last played.
    generation: u64,
    /// Generation of a load sent to MPV that it has not started yet.
    pending: Option<u64>,
    is_paused: bool,
    is_idle: bool,
    player_state: PlayerState,
}

impl EngineState {
    fn new() -> Self {
        Self {
            generation: 0,
            pending: None,
            is_paused: false,
            is_idle: true,
            player_state: PlayerState::Stopped,
        }
    }

    fn load_requested(&mut self, generation: u64) {
        self.pending = Some(generation);
    }

    /// MPV refused the load outright, so no file will start for it.
    fn load_rejected(&mut self, generation: u64) {
        if self.pending == Some(generation) {
            self.pending = None;
        }
    }

    /// Folds an MPV event into the state and returns what the application
    /// should hear about it.
    fn apply(&mut self, event: mpv::Event) -> Option<AppEvent> {
        match event {
            mpv::Event::PropertyChange { name, change, .. } => {
                match (name, change) {
                    ("pause", Format::Flag(pause)) => self.is_paused = pause,
                    ("idle-active", Format::Flag(idle_active)) => self.is_idle = idle_active,
                    _ => {}
                }
                None
            }
            mpv::Event::StartFile => {
                if let Some(generation) = self.pending.take() {
                    self.generation = generation;
                }
                None
            }
            mpv::Event::EndFile(Ok(mpv::EndFileReason::MPV_END_FILE_REASON_EOF)) => {
                Some(AppEvent::TrackFinished(self.generation))
            }
            mpv::Event::EndFile(Ok(mpv::EndFileReason::MPV_END_FILE_REASON_ERROR)) => Some(
                AppEvent::PlaybackFailed(self.generation, "playback error".to_string()),
            ),
            mpv::Event::EndFile(Err(e)) => {
                Some(AppEvent::PlaybackFailed(self.generation, format!("{:?}", e)))
            }
            _ => None,
        }
    }

    /// Returns the new player state when the flags moved it.
    fn player_state_change(&mut self) -> Option<PlayerState> {
        let new_player_state = PlayerState::from_flags(self.is_paused, self.is_idle);
        if new_player_state == self.player_state {
            return None;
        }

        self.player_state = new_player_state;
        Some(new_player_state)
    }
}

/// Spawns the audio worker thread to process playback commands.
///
/// If the internal worker returns an error, it is caught here and broadcast as
/// a fatal application event.
///
/// # Arguments
///
/// * `command_rx` - The receiving end of the player command channel.
/// * `event_tx` - The channel used to broadcast playback updates and errors.
pub(crate) fn spawn_player_worker(
    command_rx: Receiver<AudioPlayerCommand>,
    event_tx: Sender<AppEvent>,
) {
    let error_tx = event_tx.clone();

    thread::spawn(move || {
        if let Err(e) = audio_player_worker(command_rx, event_tx) {
            let _ = error_tx.send(AppEvent::FatalError(format!("MPV worker failure: {:?}", e)));
        }
    });
}

/// The primary execution loop for the audio player backend.
///
/// Initializes a local `libmpv` context and alternates between draining
/// pending commands and waiting briefly for MPV events. The loop ends when the
/// command channel is closed.
///
/// # Errors
///
/// Returns an error if the MPV context fails to initialize or if the
/// application event channel is gone.
fn audio_player_worker(
    command_rx: Receiver<AudioPlayerCommand>,
    event_tx: Sender<AppEvent>,
) -> Result<()> {
    let mut handler = (|| {
        let mut builder = mpv::MpvHandlerBuilder::new().context("Failed to create MPV builder")?;
        builder
            .set_option("vo", "null")
            .context("Failed to set no video output")?;
        builder.build().context("Failed to build MPV handler")
    })()?;

    handler
        .observe_property::<bool>("pause", 0)
        .context("Failed to observe pause")?;
    handler
        .observe_property::<bool>("idle-active", 0)
        .context("Failed to observe idle-active")?;

    let mut state = EngineState::new();

    while process_commands(&mut handler, &command_rx, &mut state, &event_tx)? {
        process_mpv_events(&mut handler, &mut state, &event_tx)?;
    }

    log::debug!("Player command channel closed, stopping MPV worker");
    Ok(())
}

/// Drains and executes all pending commands from the application channel.
///
/// Returns `false` once the application side has hung up.
fn process_commands(
    handler: &mut mpv::MpvHandler,
    command_rx: &Receiver<AudioPlayerCommand>,
    state: &mut EngineState,
    event_tx: &Sender<AppEvent>,
) -> Result<bool> {
    loop {
        let command = match command_rx.try_recv() {
            Ok(command) => command,
            Err(TryRecvError::Empty) => return Ok(true),
            Err(TryRecvError::Disconnected) => return Ok(false),
        };

        match command {
            AudioPlayerCommand::Load { source, generation } => {
                state.load_requested(generation);
                if let Err(e) = handler.command(&["loadfile", &source, "replace"]) {
                    log::warn!("Failed to load {source}: {e:?}");
                    state.load_rejected(generation);
                    event_tx
                        .send(AppEvent::PlaybackFailed(generation, format!("{e:?}")))
                        .context("Failed to send event")?;
                }
            }
            AudioPlayerCommand::Play => {
                if let Err(e) = handler.set_property("pause", false) {
                    log::warn!("Failed to resume: {e:?}");
                }
            }
            AudioPlayerCommand::Pause => {
                if let Err(e) = handler.set_property("pause", true) {
                    log::warn!("Failed to pause: {e:?}");
                }
            }
            AudioPlayerCommand::Rewind => {
                // Refused while a file is still opening, there is nothing to rewind yet.
                if !state.is_idle {
                    if let Err(e) = handler.command(&["seek", "0", "absolute"]) {
                        log::debug!("Rewind skipped: {e:?}");
                    }
                }
            }
        }
    }
}

/// Polls for MPV events and forwards the ones the application cares about.
///
/// This function waits for up to 50ms for an event from the MPV context.
fn process_mpv_events(
    handler: &mut mpv::MpvHandler,
    state: &mut EngineState,
    event_tx: &Sender<AppEvent>,
) -> Result<()> {
    if let Some(mpv_event) = handler.wait_event(0.05) {
        let app_event = state.apply(mpv_event);

        if let Some(new_player_state) = state.player_state_change() {
            event_tx
                .send(AppEvent::PlayerStateChanged(new_player_state))
                .context("Failed to send player state event")?;
        }

        if let Some(event) = app_event {
            event_tx.send(event).context("Failed to send event")?;
        }
    }

    Ok(())
}
