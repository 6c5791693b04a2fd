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

//! Document title side effect.
//!
//! The title tracks the current route and, on a detail route, the resolved
//! song. It is pushed to a [`TitleSink`] only when the computed text changes.

use crate::{model::Song, router::Route};

/// Something that can display a document title.
pub(crate) trait TitleSink {
    fn apply_title(&mut self, title: &str);
}

pub(crate) struct TitleBinder<T: TitleSink> {
    site_name: String,
    applied: Option<String>,
    sink: T,
}

impl<T: TitleSink> TitleBinder<T> {
    pub(crate) fn new(site_name: &str, sink: T) -> Self {
        Self {
            site_name: site_name.to_string(),
            applied: None,
            sink,
        }
    }

    /// Computes the title for a route and its resolved song.
    pub(crate) fn title(&self, route: &Route, song: Option<&Song>) -> String {
        match (route, song) {
            (Route::Song(_), Some(song)) => format!("{} – {}", song.title, self.site_name),
            (Route::Page(page), _) => format!("{} – {}", page.label(), self.site_name),
            _ => self.site_name.clone(),
        }
    }

    /// Applies the title for the current state if it differs from the last one
    /// applied.
    ///
    /// Returns `true` when the sink was updated.
    pub(crate) fn bind(&mut self, route: &Route, song: Option<&Song>) -> bool {
        let title = self.title(route, song);
        if self.applied.as_deref() == Some(title.as_str()) {
            return false;
        }

        self.sink.apply_title(&title);
        self.applied = Some(title);

        true
    }

    pub(crate) fn applied(&self) -> Option<&str> {
        self.applied.as_deref()
    }

    #[cfg(test)]
    pub(crate) fn sink(&self) -> &T {
        &self.sink
    }
}
