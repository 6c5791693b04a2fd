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

//! Location routing.
//!
//! This module maps location paths to logical routes and keeps the current
//! route in step with the external location held by [`History`].
//!
//! # Synchronization
//!
//! Navigation runs both ways:
//!
//! 1. **Internal**: [`Router::navigate`] updates the route immediately and
//!    writes the new path to the location.
//! 2. **External**: back/forward, a manual edit or a deep link change the
//!    location first; subscribers are notified and feed the path back in
//!    through [`Router::sync`].
//!
//! Both paths converge, so the notification that follows an internal
//! navigation finds the route already up to date and does nothing.

pub(crate) mod history;

use crate::{
    model::{Song, catalog::Catalog},
    router::history::{History, Listener},
};

const SONG_PREFIX: &str = "/song/";

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub(crate) enum Page {
    Home,
    Music,
    Stories,
    Playlists,
    Guestbook,
    Request,
    About,
    Subscribe,
    Private,
}

/// Known pages in match order.
const ROUTES: [(&str, Page); 9] = [
    ("/", Page::Home),
    ("/music", Page::Music),
    ("/stories", Page::Stories),
    ("/playlists", Page::Playlists),
    ("/guestbook", Page::Guestbook),
    ("/request", Page::Request),
    ("/about", Page::About),
    ("/subscribe", Page::Subscribe),
    ("/private", Page::Private),
];

impl Page {
    pub(crate) fn label(&self) -> &'static str {
        match self {
            Page::Home => "Home",
            Page::Music => "Music",
            Page::Stories => "Stories",
            Page::Playlists => "Playlists",
            Page::Guestbook => "Guestbook",
            Page::Request => "Request a Song",
            Page::About => "About",
            Page::Subscribe => "Subscribe",
            Page::Private => "Private",
        }
    }
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub(crate) enum Route {
    Page(Page),
    Song(String),
    NotFound,
}

impl Route {
    /// Resolves a location path to a route.
    ///
    /// Anything under the song prefix is a song route carrying the trailing
    /// segment as its slug, whether or not such a song exists.
    pub(crate) fn resolve(path: &str) -> Self {
        let path = normalize_path(path);

        if let Some(slug) = path.strip_prefix(SONG_PREFIX) {
            return Route::Song(slug.to_string());
        }

        ROUTES
            .iter()
            .find(|(known, _)| *known == path)
            .map_or(Route::NotFound, |(_, page)| Route::Page(*page))
    }

    pub(crate) fn is_private(&self) -> bool {
        matches!(self, Route::Page(Page::Private))
    }

    pub(crate) fn is_song(&self) -> bool {
        matches!(self, Route::Song(_))
    }
}

/// Normalizes a location: strips a leading `#`, maps empty to `/` and drops a
/// trailing `/` from any other path.
pub(crate) fn normalize_path(location: &str) -> String {
    let path = location.trim();
    let path = path.strip_prefix('#').unwrap_or(path);

    let path = if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{path}")
    };

    match path.trim_end_matches('/') {
        "" => "/".to_string(),
        trimmed => trimmed.to_string(),
    }
}

pub(crate) struct Router {
    history: History,
    path: String,
    route: Route,
}

impl Router {
    pub(crate) fn new(history: History) -> Self {
        let path = history.current().to_string();
        let route = Route::resolve(&path);

        Self {
            history,
            path,
            route,
        }
    }

    pub(crate) fn route(&self) -> &Route {
        &self.route
    }

    pub(crate) fn path(&self) -> &str {
        &self.path
    }

    /// Registers a callback for every change of the external location.
    pub(crate) fn subscribe(&mut self, listener: Listener) {
        self.history.subscribe(listener);
    }

    /// User-initiated navigation. Updates the route and the location.
    ///
    /// Returns `true` when the route changed.
    pub(crate) fn navigate(&mut self, path: &str) -> bool {
        let changed = self.apply(path);
        if changed {
            self.history.assign(&self.path);
        }

        changed
    }

    /// Brings the route in line with a reported location change.
    ///
    /// A report that no longer matches the current location is stale, a
    /// later change has already been applied, and is ignored.
    ///
    /// Returns `true` when the route changed.
    pub(crate) fn sync(&mut self, location: &str) -> bool {
        if normalize_path(location) != self.history.current() {
            log::debug!("Ignoring stale location {location}");
            return false;
        }

        self.apply(location)
    }

    /// Steps the location back. The route follows at once.
    pub(crate) fn back(&mut self) -> bool {
        let moved = self.history.back();
        if moved {
            self.follow_history();
        }

        moved
    }

    pub(crate) fn forward(&mut self) -> bool {
        let moved = self.history.forward();
        if moved {
            self.follow_history();
        }

        moved
    }

    /// Rewrites the location as a manual address edit would.
    ///
    /// Returns `true` when the route changed.
    pub(crate) fn edit(&mut self, path: &str) -> bool {
        self.history.replace(path);
        self.follow_history()
    }

    /// Resolves the song of a detail route against the full catalog.
    ///
    /// Visibility is not consulted, a private song's address resolves
    /// whether or not the private area is unlocked.
    pub(crate) fn resolve_song<'a>(&self, catalog: &'a Catalog) -> Option<&'a Song> {
        match &self.route {
            Route::Song(slug) => catalog.by_slug(slug),
            _ => None,
        }
    }

    fn follow_history(&mut self) -> bool {
        let location = self.history.current().to_string();
        self.apply(&location)
    }

    fn apply(&mut self, location: &str) -> bool {
        let path = normalize_path(location);
        if path == self.path {
            return false;
        }

        log::debug!("Route {} -> {}", self.path, path);
        self.route = Route::resolve(&path);
        self.path = path;

        true
    }
}
