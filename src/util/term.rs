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

//! Terminal environment utilities.
//!
//! This module manipulates the terminal emulator's window title using OSC
//! (Operating System Command) escape sequences.
//!
//! # Compatibility
//!
//! These functions rely on the terminal emulator supporting the specific OSC
//! codes. Most modern terminals (XTerm, iTerm2, Alacritty, Kitty) support these
//! sequences.

use std::io::{self, Write};

use crate::binder::TitleSink;

/// Sets the terminal window title using an OSC 2 escape sequence.
///
/// Control characters are stripped from `title` so a song title can never
/// terminate the sequence early.
///
/// # Note
///
/// This function flushes `stdout` immediately to ensure the change is applied
/// without delay. Failures to write are ignored, the title is cosmetic.
pub(crate) fn set_terminal_title(title: &str) {
    let clean: String = title.chars().filter(|c| !c.is_control()).collect();
    let mut stdout = io::stdout();
    let _ = write!(stdout, "\x1b]2;{}\x07", clean);
    let _ = stdout.flush();
}

/// Clears the terminal window title.
///
/// This is called during application cleanup so the title does not outlive
/// the session.
pub(crate) fn reset_terminal_title() {
    set_terminal_title("");
}

/// Title sink writing to the hosting terminal.
pub(crate) struct TerminalTitle;

impl TitleSink for TerminalTitle {
    fn apply_title(&mut self, title: &str) {
        set_terminal_title(title);
    }
}
