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

//! Application events and the main event loop.
//!
//! Every source of change (typed commands, the external location, the audio
//! worker) posts an [`AppEvent`] to one channel. The main thread takes them
//! one at a time, so each state transition completes before the next begins.

mod handlers;
use handlers::*;

use anyhow::Result;

use crate::{App, player::PlayerState};

#[derive(Debug)]
pub(crate) enum AppEvent {
    Input(String),

    LocationChanged(String),

    PlayerStateChanged(PlayerState),
    TrackFinished(u64),
    PlaybackFailed(u64, String),

    ExitApplication,

    Error(String),
    FatalError(String),
}

/// Runs the main application loop.
///
/// This function loops until an exit event is received or the event channel
/// is closed.
pub(crate) fn process_events(app: &mut App) -> Result<()> {
    while let Ok(event) = app.event_rx.recv() {
        if matches!(event, AppEvent::ExitApplication) {
            break;
        }

        match event {
            AppEvent::Input(line) => {
                if !handle_input(app, &line) {
                    break;
                }
            }
            AppEvent::LocationChanged(location) => handle_location_changed(app, &location),
            AppEvent::PlayerStateChanged(state) => handle_player_state_changed(app, state),
            AppEvent::TrackFinished(generation) => handle_track_finished(app, generation),
            AppEvent::PlaybackFailed(generation, reason) => {
                handle_playback_failed(app, generation, &reason)
            }
            AppEvent::Error(message) => handle_error(&message),
            AppEvent::FatalError(message) => handle_fatal_error(&message),
            AppEvent::ExitApplication => {}
        }
    }

    Ok(())
}
