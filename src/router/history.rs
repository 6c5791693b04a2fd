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

//! The external, addressable location.
//!
//! [`History`] plays the part a browser's location and history stack play for
//! a web page: it holds the current path, remembers where the user has been so
//! they can go back and forward, and notifies subscribers every time the
//! location changes, whoever changed it.

use crate::router::normalize_path;

/// Callback invoked with the new path on every location change.
pub(crate) type Listener = Box<dyn Fn(&str)>;

pub(crate) struct History {
    entries: Vec<String>,
    index: usize,
    listeners: Vec<Listener>,
}

impl History {
    pub(crate) fn new(initial: &str) -> Self {
        Self {
            entries: vec![normalize_path(initial)],
            index: 0,
            listeners: Vec::new(),
        }
    }

    pub(crate) fn current(&self) -> &str {
        &self.entries[self.index]
    }

    pub(crate) fn subscribe(&mut self, listener: Listener) {
        self.listeners.push(listener);
    }

    /// Pushes a new location, dropping any forward entries.
    pub(crate) fn assign(&mut self, path: &str) {
        let path = normalize_path(path);
        if path == self.current() {
            return;
        }

        self.entries.truncate(self.index + 1);
        self.entries.push(path);
        self.index = self.entries.len() - 1;

        self.notify();
    }

    /// Rewrites the current location in place, as a manual address edit does.
    pub(crate) fn replace(&mut self, path: &str) {
        let path = normalize_path(path);
        if path == self.current() {
            return;
        }

        self.entries[self.index] = path;

        self.notify();
    }

    pub(crate) fn back(&mut self) -> bool {
        if self.index == 0 {
            return false;
        }

        self.index -= 1;
        self.notify();

        true
    }

    pub(crate) fn forward(&mut self) -> bool {
        if self.index + 1 >= self.entries.len() {
            return false;
        }

        self.index += 1;
        self.notify();

        true
    }

    fn notify(&self) {
        let path = self.current();
        for listener in &self.listeners {
            listener(path);
        }
    }
}
