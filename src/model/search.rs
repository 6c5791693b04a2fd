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

//! Visible song list computation.
//!
//! This module derives the list of songs a page shows from the catalog, the
//! current route, the private unlock flag, the search text, the sort mode and
//! the like overlay. [`visible_songs`] is a pure function of a [`ViewQuery`];
//! [`ViewCache`] memoizes its last result by input equality so repeated reads
//! with unchanged inputs don't re-sort the catalog.
//!
//! The list is always fully materialized. The playback queue snapshots the
//! identifiers out of it at play time and never reads it again.

use std::cmp::Reverse;

use chrono::NaiveDate;
use unicode_normalization::{UnicodeNormalization, char::is_combining_mark};

use crate::model::{LikeOverlay, Song, SortMode, catalog::Catalog};

/// Change counters for the stored inputs of the view.
///
/// Comparing counters stands in for comparing the whole catalog and overlay.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq)]
pub(crate) struct Revisions {
    pub(crate) catalog: u64,
    pub(crate) likes: u64,
}

/// The complete input tuple of the view computation.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ViewQuery<'a> {
    pub(crate) catalog: &'a Catalog,
    pub(crate) liked: &'a LikeOverlay,
    pub(crate) private_route: bool,
    pub(crate) unlocked: bool,
    pub(crate) search: &'a str,
    pub(crate) sort: SortMode,
}

/// Trims and case-folds search text.
pub(crate) fn normalize_search(text: &str) -> String {
    text.trim().to_lowercase()
}

/// Computes the ordered list of songs visible for `query`.
///
/// 1. Visibility: outside the private route only public songs are included.
///    On the private route nothing is shown while locked, and everything once
///    unlocked.
/// 2. Text: when the normalized search text is non-empty, keep songs whose
///    title, genre or space-joined moods contain it.
/// 3. Order by the sort mode. Every ordering is stable, ties keep catalog
///    order.
pub(crate) fn visible_songs(query: &ViewQuery) -> Vec<Song> {
    if query.private_route && !query.unlocked {
        return Vec::new();
    }

    let needle = normalize_search(query.search);

    let mut songs: Vec<Song> = query
        .catalog
        .songs()
        .iter()
        .filter(|song| query.private_route || song.is_public())
        .filter(|song| needle.is_empty() || matches_text(song, &needle))
        .cloned()
        .collect();

    match query.sort {
        SortMode::Newest => songs.sort_by_cached_key(|song| Reverse(release_date(song))),
        SortMode::Liked => songs.sort_by_cached_key(|song| Reverse(like_weight(song, query.liked))),
        SortMode::Az => songs.sort_by_cached_key(|song| title_key(&song.title)),
    }

    songs
}

/// Baseline likes plus one when the visitor has liked the song.
pub(crate) fn like_weight(song: &Song, liked: &LikeOverlay) -> u64 {
    let bonus = liked.get(&song.id).copied().unwrap_or(false);
    u64::from(song.likes) + u64::from(bonus)
}

fn matches_text(song: &Song, needle: &str) -> bool {
    song.title.to_lowercase().contains(needle)
        || song.genre.to_lowercase().contains(needle)
        || song.moods.join(" ").to_lowercase().contains(needle)
}

// Unparsable dates come back as `None` and so sort after every real date.
fn release_date(song: &Song) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(song.release_date.trim(), "%Y-%m-%d").ok()
}

/// Alphabetical key for a title.
///
/// The primary key is the decomposed, case-folded title with its accents
/// removed, so `Éclair` files under `e`. Titles that only differ in accents or
/// case fall back to the folded title and then the raw one.
fn title_key(title: &str) -> (String, String, String) {
    let folded = title.to_lowercase();
    let base = folded.nfd().filter(|c| !is_combining_mark(*c)).collect();
    (base, folded, title.to_string())
}

#[derive(Debug, Clone, Eq, PartialEq)]
struct ViewKey {
    revisions: Revisions,
    private_route: bool,
    unlocked: bool,
    search: String,
    sort: SortMode,
}

/// Memoized [`visible_songs`].
#[derive(Debug, Default)]
pub(crate) struct ViewCache {
    key: Option<ViewKey>,
    songs: Vec<Song>,
}

impl ViewCache {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Returns the visible list for `query`, recomputing only when an input
    /// differs from the previous call.
    pub(crate) fn get(&mut self, query: &ViewQuery, revisions: Revisions) -> &[Song] {
        let key = ViewKey {
            revisions,
            private_route: query.private_route,
            unlocked: query.unlocked,
            search: normalize_search(query.search),
            sort: query.sort,
        };

        if self.key.as_ref() != Some(&key) {
            self.songs = visible_songs(query);
            self.key = Some(key);
        }

        &self.songs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Visibility, seed};

    fn ids(songs: &[Song]) -> Vec<u32> {
        songs.iter().map(|s| s.id).collect()
    }

    fn query<'a>(catalog: &'a Catalog, liked: &'a LikeOverlay) -> ViewQuery<'a> {
        ViewQuery {
            catalog,
            liked,
            private_route: false,
            unlocked: false,
            search: "",
            sort: SortMode::Newest,
        }
    }

    #[test]
    fn public_routes_hide_private_songs() {
        let catalog = Catalog::from_songs(seed::songs()).unwrap();
        let liked = LikeOverlay::new();

        for sort in [SortMode::Newest, SortMode::Liked, SortMode::Az] {
            for unlocked in [false, true] {
                let q = ViewQuery {
                    sort,
                    unlocked,
                    ..query(&catalog, &liked)
                };
                let songs = visible_songs(&q);
                assert!(songs.len() <= catalog.len());
                assert!(songs.iter().all(|s| s.visibility == Visibility::Public));
            }
        }
    }

    #[test]
    fn private_route_is_gated_by_unlock_flag() {
        let catalog = Catalog::from_songs(seed::songs()).unwrap();
        let liked = LikeOverlay::new();

        let locked = ViewQuery {
            private_route: true,
            search: "demo",
            ..query(&catalog, &liked)
        };
        assert!(visible_songs(&locked).is_empty());

        let unlocked = ViewQuery {
            private_route: true,
            unlocked: true,
            ..query(&catalog, &liked)
        };
        let songs = visible_songs(&unlocked);
        assert_eq!(songs.len(), catalog.len());
        assert!(songs.iter().any(|s| !s.is_public()));
    }

    #[test]
    fn newest_orders_by_release_date() {
        let catalog = Catalog::from_songs(seed::songs()).unwrap();
        let liked = LikeOverlay::new();

        assert_eq!(ids(&visible_songs(&query(&catalog, &liked))), vec![3, 2, 1, 4]);
    }

    #[test]
    fn unparsable_dates_sort_last_and_ties_keep_catalog_order() {
        let mut songs = seed::songs();
        songs[0].release_date = "someday".to_string();
        songs[1].release_date = "2024-11-02".to_string();
        let catalog = Catalog::from_songs(songs).unwrap();
        let liked = LikeOverlay::new();

        // 2 and 4 share a date, 2 comes first in the catalog.
        assert_eq!(ids(&visible_songs(&query(&catalog, &liked))), vec![3, 2, 4, 1]);
    }

    #[test]
    fn liked_counts_the_overlay_bonus() {
        let catalog = Catalog::from_songs(seed::songs()).unwrap();
        let mut liked = LikeOverlay::new();

        let q = ViewQuery {
            sort: SortMode::Liked,
            ..query(&catalog, &liked)
        };
        assert_eq!(ids(&visible_songs(&q)), vec![2, 3, 1, 4]);

        // A like lifts Harbour Lights to 13, still short of Static Summer.
        liked.insert(1, true);
        liked.insert(4, false);
        let q = ViewQuery {
            sort: SortMode::Liked,
            ..query(&catalog, &liked)
        };
        assert_eq!(ids(&visible_songs(&q)), vec![2, 3, 1, 4]);
        assert_eq!(like_weight(catalog.by_id(1).unwrap(), &liked), 13);
        assert_eq!(like_weight(catalog.by_id(4).unwrap(), &liked), 8);
    }

    #[test]
    fn liked_ties_are_stable() {
        let mut songs = seed::songs();
        for song in &mut songs {
            song.likes = 5;
        }
        let catalog = Catalog::from_songs(songs).unwrap();
        let mut liked = LikeOverlay::new();
        liked.insert(4, true);

        let q = ViewQuery {
            sort: SortMode::Liked,
            ..query(&catalog, &liked)
        };
        assert_eq!(ids(&visible_songs(&q)), vec![4, 1, 2, 3]);
    }

    #[test]
    fn az_ignores_case() {
        let mut songs = seed::songs();
        songs[3].title = "apple".to_string();
        let catalog = Catalog::from_songs(songs).unwrap();
        let liked = LikeOverlay::new();

        let q = ViewQuery {
            sort: SortMode::Az,
            ..query(&catalog, &liked)
        };
        let titles: Vec<String> = visible_songs(&q).into_iter().map(|s| s.title).collect();
        assert_eq!(
            titles,
            vec!["apple", "Harbour Lights", "Paper Moons", "Static Summer"]
        );
    }

    #[test]
    fn az_files_accented_titles_with_their_letter() {
        let mut songs = seed::songs();
        for (song, title) in songs.iter_mut().zip(["Zebra", "Éclair", "apple", "Ångström"]) {
            song.title = title.to_string();
        }
        let catalog = Catalog::from_songs(songs).unwrap();
        let liked = LikeOverlay::new();

        let q = ViewQuery {
            sort: SortMode::Az,
            ..query(&catalog, &liked)
        };
        let titles: Vec<String> = visible_songs(&q).into_iter().map(|s| s.title).collect();
        assert_eq!(titles, vec!["Ångström", "apple", "Éclair", "Zebra"]);
    }

    #[test]
    fn az_breaks_accent_ties_deterministically() {
        let mut songs = seed::songs();
        for (song, title) in songs.iter_mut().zip(["Éclair", "eclair", "Eclair", "Banana"]) {
            song.title = title.to_string();
        }
        let catalog = Catalog::from_songs(songs).unwrap();
        let liked = LikeOverlay::new();

        let q = ViewQuery {
            sort: SortMode::Az,
            ..query(&catalog, &liked)
        };
        let titles: Vec<String> = visible_songs(&q).into_iter().map(|s| s.title).collect();
        assert_eq!(titles, vec!["Banana", "Eclair", "eclair", "Éclair"]);
    }

    #[test]
    fn search_matches_title_genre_and_moods() {
        let catalog = Catalog::from_songs(seed::songs()).unwrap();
        let liked = LikeOverlay::new();

        let by_title = ViewQuery {
            search: "  MOON ",
            ..query(&catalog, &liked)
        };
        assert_eq!(ids(&visible_songs(&by_title)), vec![2]);

        let by_genre = ViewQuery {
            search: "folk",
            ..query(&catalog, &liked)
        };
        assert_eq!(ids(&visible_songs(&by_genre)), vec![1, 4]);

        // Moods are joined with a space, so a match may span two tags.
        let across_moods = ViewQuery {
            search: "sparse winter",
            ..query(&catalog, &liked)
        };
        assert_eq!(ids(&visible_songs(&across_moods)), vec![4]);

        let nothing = ViewQuery {
            search: "polka",
            ..query(&catalog, &liked)
        };
        assert!(visible_songs(&nothing).is_empty());
    }

    #[test]
    fn identical_inputs_give_identical_order() {
        let catalog = Catalog::from_songs(seed::songs()).unwrap();
        let liked = LikeOverlay::new();

        for sort in [SortMode::Newest, SortMode::Liked, SortMode::Az] {
            let q = ViewQuery {
                sort,
                ..query(&catalog, &liked)
            };
            assert_eq!(visible_songs(&q), visible_songs(&q));
        }
    }

    #[test]
    fn cache_recomputes_only_on_input_change() {
        let catalog = Catalog::from_songs(seed::songs()).unwrap();
        let liked = LikeOverlay::new();
        let mut cache = ViewCache::new();
        let revisions = Revisions::default();

        let first = ids(cache.get(&query(&catalog, &liked), revisions));
        assert_eq!(first, vec![3, 2, 1, 4]);

        // Same inputs, search text differing only in case and whitespace.
        let same = ViewQuery {
            search: "  ",
            ..query(&catalog, &liked)
        };
        assert_eq!(ids(cache.get(&same, revisions)), first);

        let az = ViewQuery {
            sort: SortMode::Az,
            ..query(&catalog, &liked)
        };
        assert_eq!(ids(cache.get(&az, revisions)), vec![4, 1, 2, 3]);

        let mut edited = seed::songs();
        edited.retain(|s| s.id != 1);
        let edited = Catalog::from_songs(edited).unwrap();
        let changed = Revisions {
            catalog: 1,
            ..revisions
        };
        let az_edited = ViewQuery {
            catalog: &edited,
            sort: SortMode::Az,
            ..query(&catalog, &liked)
        };
        assert_eq!(ids(cache.get(&az_edited, changed)), vec![4, 2, 3]);
    }
}
