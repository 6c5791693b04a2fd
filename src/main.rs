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

//! # Liner.
//!
//! A musician's catalog (songs, stories and a guestbook) with locally
//! persisted state and a queue-based audio player, driven from a line-oriented
//! shell.
//!
//! It uses an event-driven architecture where:
//!
//! * The **Main Thread** owns the session state and applies one event at a
//!   time.
//! * The **Audio Worker** drives libmpv and reports track ends and failures.
//! * The **Input Thread** forwards typed commands.
//! * The **Location Listener** reports every change of the addressable
//!   location, including back/forward and manual edits.
//!
//! Communication between them is handled via `std::sync::mpsc` channels.

mod binder;
mod commander;
mod config;
mod events;
mod model;
mod player;
mod router;
mod session;
mod storage;
mod util;

use std::{
    io::{self, BufRead},
    path::PathBuf,
    sync::mpsc::{self, Receiver, Sender},
    thread,
};

use anyhow::{Context, Result};
use clap::Parser;

use crate::{
    binder::TitleBinder,
    config::AppConfig,
    events::{AppEvent, process_events},
    player::{AudioPlayer, PlayerState},
    router::{Router, history::History},
    session::Session,
    storage::{Records, store::Store},
    util::term::TerminalTitle,
};

#[derive(Parser, Debug)]
#[command(version, about = "Browse and play a musician's catalog from the terminal")]
struct Cli {
    /// Location to open, e.g. /music or /song/<slug>
    location: Option<String>,

    /// Records database file
    #[arg(long, value_name = "FILE")]
    database: Option<PathBuf>,

    /// Keep everything in memory for this run only
    #[arg(long, conflicts_with = "database")]
    in_memory: bool,
}

/// Application state.
struct App {
    pub config: AppConfig,

    pub event_tx: Sender<AppEvent>,
    pub event_rx: Receiver<AppEvent>,

    pub session: Session<AudioPlayer, TerminalTitle>,

    pub player_state: PlayerState,
}

impl App {
    /// Create a new instance of application state.
    pub fn new(config: AppConfig, records: Records, location: &str) -> Self {
        let (event_tx, event_rx) = mpsc::channel();

        let store = Store::open(records);
        let router = Router::new(History::new(location));
        let audio_player = AudioPlayer::new(event_tx.clone());
        let title = TitleBinder::new(&config.site_name, TerminalTitle);

        let mut session = Session::new(store, router, audio_player, title);

        let location_tx = event_tx.clone();
        session.subscribe(Box::new(move |path| {
            let _ = location_tx.send(AppEvent::LocationChanged(path.to_string()));
        }));

        Self {
            config,
            event_tx,
            event_rx,
            session,
            player_state: PlayerState::Stopped,
        }
    }
}

/// The entry point of the application.
///
/// Sets up logging and configuration, opens the records database, runs the
/// event loop and clears the terminal title on the way out.
fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let mut config = config::load_config();
    if let Some(database) = cli.database {
        config.database_file = Some(database);
    }
    if let Some(location) = cli.location {
        config.start_location = location;
    }

    let records = open_records(&config, cli.in_memory).context("Failed to open records")?;
    let location = config.start_location.clone();
    let mut app = App::new(config, records, &location);

    let res = run(&mut app);
    util::term::reset_terminal_title();

    res.context("Application error occurred")
}

/// Opens the durable records, falling back to an in-memory database when the
/// file cannot be used so the session still works.
fn open_records(config: &AppConfig, in_memory: bool) -> Result<Records> {
    let path = if in_memory { None } else { config.database_path() };

    if let Some(path) = path {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create {}", dir.display()))?;
        }

        match Records::open(&path) {
            Ok(records) => return Ok(records),
            Err(e) => log::warn!(
                "Failed to open {}, nothing will be saved: {e}",
                path.display()
            ),
        }
    }

    Ok(Records::open_in_memory()?)
}

/// Starts the input thread and enters the main event loop.
///
/// # Errors
///
/// Returns an error if the event processing loop encounters an unrecoverable
/// application error.
fn run(app: &mut App) -> Result<()> {
    log::info!(
        "{} starting at {} ({} songs)",
        app.config.site_name,
        app.session.path(),
        app.session.store().catalog().len()
    );

    // Spawn a thread to translate lines of input to application events.
    let tx_input = app.event_tx.clone();
    thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            match line {
                Ok(line) => {
                    if tx_input.send(AppEvent::Input(line)).is_err() {
                        return;
                    }
                }
                Err(e) => {
                    let _ = tx_input.send(AppEvent::Error(format!("Failed to read input: {e}")));
                    break;
                }
            }
        }
        let _ = tx_input.send(AppEvent::ExitApplication);
    });

    // Application event loop, process events until the user quits
    process_events(app)
}
