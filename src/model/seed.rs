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

//! Seed catalog.
//!
//! The songs a fresh install starts with, and what a bulk reset restores.
//! Story and lyric text keep the literal `\n` escapes the catalog is authored
//! with; they are turned into line breaks at render time.

use crate::model::{Song, Visibility};

fn song(
    id: u32,
    slug: &str,
    title: &str,
    duration: &str,
    release_date: &str,
    genre: &str,
    moods: &[&str],
    likes: u32,
) -> Song {
    Song {
        id,
        slug: slug.to_string(),
        title: title.to_string(),
        duration: duration.to_string(),
        release_date: release_date.to_string(),
        genre: genre.to_string(),
        moods: moods.iter().map(|m| m.to_string()).collect(),
        story: String::new(),
        lyrics: String::new(),
        audio_url: String::new(),
        likes,
        visibility: Visibility::Public,
    }
}

pub(crate) fn songs() -> Vec<Song> {
    let mut harbour = song(
        1,
        "harbour-lights",
        "Harbour Lights",
        "3:42",
        "2025-06-14",
        "Folk",
        &["warm", "nostalgic"],
        12,
    );
    harbour.story = "Written on the last ferry home.\\nThe lights never looked closer.".to_string();
    harbour.lyrics = "Harbour lights, hold me steady\\nI'm not ready to be home".to_string();

    let mut paper = song(
        2,
        "paper-moons",
        "Paper Moons",
        "4:05",
        "2025-07-15",
        "Indie",
        &["dreamy", "late night"],
        30,
    );
    paper.story = "A song about the shows we played to nobody.".to_string();
    paper.lyrics = "Cut me a paper moon\\nHang it over the stage".to_string();

    let mut static_song = song(
        3,
        "static-summer",
        "Static Summer",
        "2:58",
        "2025-08-10",
        "Pop",
        &["bright", "restless"],
        21,
    );
    static_song.story = "Recorded in one take with the windows open.".to_string();

    let mut cold = song(
        4,
        "cold-water",
        "Cold Water",
        "5:11",
        "2024-11-02",
        "Folk",
        &["sparse", "winter"],
        8,
    );
    cold.story = "The oldest song in the set.\\nStill the one people ask for.".to_string();

    let mut demo = song(
        5,
        "basement-demo",
        "Basement Demo",
        "1:47",
        "2025-09-01",
        "Lo-fi",
        &["rough", "unfinished"],
        0,
    );
    demo.story = "Not ready for the world yet.".to_string();
    demo.visibility = Visibility::Private;

    vec![harbour, paper, static_song, cold, demo]
}
