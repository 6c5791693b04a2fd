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

use std::fs;

use anyhow::{Context, Result};

use crate::{
    App,
    commander::{HELP, ShellCommand, parse_command},
    model::{Message, Notice, Song, search::like_weight},
    player::PlayerState,
    router::{Page, Route},
    util::format::render_text,
};

/// Runs one line of input. Returns `false` when the user asked to quit.
pub(super) fn handle_input(app: &mut App, line: &str) -> bool {
    let command = match parse_command(line) {
        None => return true,
        Some(Ok(ShellCommand::Quit)) => return false,
        Some(Ok(command)) => command,
        Some(Err(e)) => {
            print_notice(&Notice::Failure(e.to_string()));
            return true;
        }
    };

    log::debug!("Running {command:?}");
    match run_command(app, command) {
        Ok(Some(notice)) => print_notice(&notice),
        Ok(None) => {}
        Err(e) => print_notice(&Notice::Failure(format!("{e:#}"))),
    }

    true
}

pub(super) fn handle_location_changed(app: &mut App, location: &str) {
    if app.session.on_location_changed(location) {
        println!("at {}", app.session.path());
    }
}

pub(super) fn handle_player_state_changed(app: &mut App, state: PlayerState) {
    log::debug!("Player state {:?} -> {:?}", app.player_state, state);
    app.player_state = state;
}

pub(super) fn handle_track_finished(app: &mut App, generation: u64) {
    let notice = app.session.on_track_finished(generation);
    if let Some(notice) = notice.or_else(|| now_playing(app)) {
        print_notice(&notice);
    }
}

pub(super) fn handle_playback_failed(app: &mut App, generation: u64, reason: &str) {
    if let Some(notice) = app.session.on_playback_failed(generation, reason) {
        print_notice(&notice);
    }
}

pub(super) fn handle_error(message: &str) {
    log::error!("{message}");
    print_notice(&Notice::Failure(message.to_string()));
}

pub(super) fn handle_fatal_error(message: &str) {
    log::error!("{message}");
    print_notice(&Notice::Failure(format!("{message}, audio is unavailable")));
}

fn run_command(app: &mut App, command: ShellCommand) -> Result<Option<Notice>> {
    let session = &mut app.session;

    let notice = match command {
        ShellCommand::Go(path) => {
            session.navigate(&path);
            Some(location(app))
        }
        ShellCommand::Edit(path) => {
            session.edit(&path);
            Some(location(app))
        }
        ShellCommand::Back if session.back() => Some(location(app)),
        ShellCommand::Back => Some(info("no earlier location")),
        ShellCommand::Forward if session.forward() => Some(location(app)),
        ShellCommand::Forward => Some(info("no later location")),

        ShellCommand::List => {
            print_listing(app);
            None
        }
        ShellCommand::Show => {
            print_page(app);
            None
        }
        ShellCommand::Search(text) => {
            session.set_search(&text);
            print_listing(app);
            None
        }
        ShellCommand::Sort(mode) => {
            session.set_sort(mode);
            print_listing(app);
            None
        }

        ShellCommand::Play(slug) => session.play_song(&slug).or_else(|| now_playing(app)),
        ShellCommand::PlayAll => session.play_all().or_else(|| now_playing(app)),
        ShellCommand::Step(direction) => session.step(direction).or_else(|| now_playing(app)),
        ShellCommand::Stop => session.stop().or_else(|| now_playing(app)),
        ShellCommand::Toggle => session.toggle().or_else(|| now_playing(app)),

        ShellCommand::Like(slug) => {
            let liked = session.toggle_like(&slug)?;
            Some(info(if liked { "liked" } else { "unliked" }))
        }
        ShellCommand::Comment {
            slug,
            name,
            message,
        } => {
            session.add_comment(&slug, &name, &message)?;
            Some(info("comment added"))
        }
        ShellCommand::Sign { name, message } => {
            session.sign_guestbook(&name, &message)?;
            Some(info("thanks for signing the guestbook"))
        }
        ShellCommand::Unlock => {
            session.set_unlocked(true);
            Some(info("private area unlocked"))
        }
        ShellCommand::Lock => {
            session.set_unlocked(false);
            Some(info("private area locked"))
        }

        ShellCommand::Attach { slug, url } => session
            .attach_audio(&slug, &url)?
            .or_else(|| Some(info("audio attached"))),
        ShellCommand::AttachFile { slug, path } => session
            .attach_file(&slug, &path)?
            .or_else(|| Some(info("audio file attached"))),
        ShellCommand::Detach(slug) => session
            .detach_audio(&slug)?
            .or_else(|| Some(info("audio removed"))),

        ShellCommand::Export(path) => {
            let json = session.export_json().context("Failed to encode export")?;
            fs::write(&path, json)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            Some(Notice::Info(format!("exported to {}", path.display())))
        }
        ShellCommand::Import(path) => {
            let text = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            let (fields, notice) = session.import_json(&text)?;
            if let Some(notice) = notice {
                print_notice(&notice);
            }
            if fields.is_empty() {
                Some(info("nothing to import"))
            } else {
                Some(Notice::Info(format!("imported {}", fields.join(", "))))
            }
        }
        ShellCommand::Reset => {
            if let Some(notice) = session.reset() {
                print_notice(&notice);
            }
            Some(info("all stored data cleared"))
        }

        ShellCommand::Help => {
            println!("{HELP}");
            None
        }
        ShellCommand::Quit => None,
    };

    Ok(notice)
}

fn info(text: &str) -> Notice {
    Notice::Info(text.to_string())
}

fn print_notice(notice: &Notice) {
    match notice {
        Notice::Info(_) => println!("{notice}"),
        Notice::Failure(_) => eprintln!("{notice}"),
    }
}

fn location(app: &App) -> Notice {
    let title = app.session.title().unwrap_or_default();
    Notice::Info(format!("at {} ({title})", app.session.path()))
}

// What the queue is on, for the commands that move it.
fn now_playing(app: &App) -> Option<Notice> {
    let queue = app.session.queue();
    let song = app.session.now_playing()?;
    let cursor = queue.cursor()?;

    let state = if queue.is_playing() { "playing" } else { "paused" };
    Some(Notice::Info(format!(
        "{state} {} ({}/{})",
        song.title,
        cursor + 1,
        queue.ids().len()
    )))
}

fn print_listing(app: &mut App) {
    let songs = app.session.visible_songs().to_vec();
    let session = &app.session;

    if songs.is_empty() {
        if session.route().is_private() && !session.store().private_unlocked() {
            println!("(locked)");
        } else {
            println!("(no songs)");
        }
        return;
    }

    if !session.search_text().trim().is_empty() {
        println!("matching '{}'", session.search_text().trim());
    }

    let current = session.queue().current();
    for song in &songs {
        let marker = match (current == Some(song.id), session.queue().is_playing()) {
            (true, true) => '>',
            (true, false) => '|',
            _ => ' ',
        };
        let heart = if session.store().is_liked(song.id) { '*' } else { ' ' };

        println!(
            "{marker} {:<24} {:>5}  {}  {:<8} {:>4}{heart} {}",
            song.title,
            song.duration,
            song.release_date,
            song.genre,
            like_weight(song, session.store().liked()),
            song.slug
        );
    }
}

fn print_page(app: &mut App) {
    match app.session.route().clone() {
        Route::Song(slug) => match app.session.detail() {
            Some(song) => print_song(app, song),
            None => println!("No song called '{slug}'"),
        },
        Route::Page(Page::Guestbook) => {
            println!("{}", Page::Guestbook.label());
            print_messages(app.session.store().guestbook());
        }
        Route::Page(Page::Stories) => {
            println!("{}", Page::Stories.label());
            let songs = app.session.visible_songs().to_vec();
            for song in songs.iter().filter(|song| !song.story.is_empty()) {
                println!("\n{}\n{}", song.title, render_text(&song.story));
            }
        }
        Route::Page(page @ (Page::Home | Page::Music | Page::Playlists | Page::Private)) => {
            println!("{}", page.label());
            print_listing(app);
        }
        Route::Page(page) => println!("{}", page.label()),
        Route::NotFound => println!("Page not found"),
    }
}

fn print_song(app: &App, song: &Song) {
    let store = app.session.store();

    println!("{}", song.title);
    println!(
        "{}  {}  {}  {} likes{}",
        song.duration,
        song.release_date,
        song.genre,
        like_weight(song, store.liked()),
        if store.is_liked(song.id) { " (liked)" } else { "" }
    );
    if !song.moods.is_empty() {
        println!("{}", song.moods.join(", "));
    }
    if !song.has_audio() {
        println!("(no audio yet)");
    }
    if !song.story.is_empty() {
        println!("\n{}", render_text(&song.story));
    }
    if !song.lyrics.is_empty() {
        println!("\n{}", render_text(&song.lyrics));
    }

    print_messages(app.session.detail_comments());
}

fn print_messages(messages: &[Message]) {
    for message in messages {
        println!(
            "\n{} ({})\n{}",
            message.name,
            message.created_at.format("%Y-%m-%d %H:%M"),
            message.message
        );
    }
}
