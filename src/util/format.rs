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

/// Formats a duration in seconds into the catalog's `M:SS` display string.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(format_duration(65), "1:05");
/// assert_eq!(format_duration(3600), "60:00");
/// ```
pub(crate) fn format_duration(total_seconds: u64) -> String {
    let mins = total_seconds / 60;
    let secs = total_seconds % 60;
    format!("{}:{:02}", mins, secs)
}

/// Turns the literal `\n` escapes used in story and lyric text into real line
/// breaks.
pub(crate) fn render_text(text: &str) -> String {
    text.replace("\\n", "\n")
}

/// A slug is non-empty, lowercase ASCII alphanumerics and dashes only.
pub(crate) fn is_valid_slug(slug: &str) -> bool {
    !slug.is_empty()
        && slug
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_durations() {
        assert_eq!(format_duration(0), "0:00");
        assert_eq!(format_duration(65), "1:05");
        assert_eq!(format_duration(3600), "60:00");
    }

    #[test]
    fn renders_escaped_newlines() {
        assert_eq!(render_text("one\\ntwo"), "one\ntwo");
        assert_eq!(render_text("plain"), "plain");
    }

    #[test]
    fn validates_slugs() {
        assert!(is_valid_slug("paper-moons-2"));
        assert!(!is_valid_slug(""));
        assert!(!is_valid_slug("Paper"));
        assert!(!is_valid_slug("a b"));
        assert!(!is_valid_slug("a/b"));
    }
}
