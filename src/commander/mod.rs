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

//! Command-line input parsing.
//!
//! This module turns one line of shell input into a [`ShellCommand`]. Parsing
//! is purely syntactic: whether a slug exists or a file is readable is decided
//! when the command runs.

use std::path::PathBuf;

use thiserror::Error;

use crate::model::{SortMode, queue::Direction};

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum ShellCommand {
    Go(String),
    Edit(String),
    Back,
    Forward,

    List,
    Show,
    Search(String),
    Sort(SortMode),

    Play(String),
    PlayAll,
    Step(Direction),
    Stop,
    Toggle,

    Like(String),
    Comment {
        slug: String,
        name: String,
        message: String,
    },
    Sign {
        name: String,
        message: String,
    },
    Unlock,
    Lock,

    Attach {
        slug: String,
        url: String,
    },
    AttachFile {
        slug: String,
        path: PathBuf,
    },
    Detach(String),

    Export(PathBuf),
    Import(PathBuf),
    Reset,

    Help,
    Quit,
}

#[derive(Debug, Error, PartialEq)]
pub(crate) enum CommandError {
    #[error("unknown command '{0}', try 'help'")]
    Unknown(String),

    #[error("usage: {0}")]
    Usage(&'static str),

    #[error("unknown sort mode '{0}', expected newest, liked or az")]
    SortMode(String),
}

/// One line per command, shown by `help`.
pub(crate) const HELP: &str = "\
go <path>                        navigate to a page or /song/<slug>
edit <path>                      replace the location, as an address edit would
back | forward                   walk the location history
ls                               list the visible songs
show                             show the current page or song
search [text...]                 filter the list (no text clears it)
sort <newest|liked|az>           order the list
play <slug> | playall            start the queue from a song or from the top
next | prev | stop | toggle      control the queue
like <slug>                      like or unlike a song
comment <slug> <name> <text...>  comment on a song
sign <name> <text...>            sign the guestbook
unlock | lock                    open or close the private area
attach <slug> <url>              set a song's audio source
attach-file <slug> <path>        attach a local audio file
detach <slug>                    remove a song's audio
export <file> | import <file>    save or load everything as JSON
reset                            forget everything stored
q                                quit";

/// Parses one line of input. Blank input yields `None`.
pub(crate) fn parse_command(line: &str) -> Option<Result<ShellCommand, CommandError>> {
    let parts: Vec<&str> = line.split_whitespace().collect();

    let command = match parts.as_slice() {
        [] => return None,

        ["q"] | ["quit"] => Ok(ShellCommand::Quit),
        ["help"] | ["?"] => Ok(ShellCommand::Help),

        ["go", path] => Ok(ShellCommand::Go(path.to_string())),
        ["go", ..] => Err(CommandError::Usage("go <path>")),
        ["edit", path] => Ok(ShellCommand::Edit(path.to_string())),
        ["edit", ..] => Err(CommandError::Usage("edit <path>")),
        ["back"] => Ok(ShellCommand::Back),
        ["forward"] => Ok(ShellCommand::Forward),

        ["ls"] => Ok(ShellCommand::List),
        ["show"] => Ok(ShellCommand::Show),
        ["search", text @ ..] => Ok(ShellCommand::Search(text.join(" "))),
        ["sort", mode] => SortMode::parse(mode)
            .map(ShellCommand::Sort)
            .ok_or_else(|| CommandError::SortMode(mode.to_string())),
        ["sort", ..] => Err(CommandError::Usage("sort <newest|liked|az>")),

        ["play", slug] => Ok(ShellCommand::Play(slug.to_string())),
        ["play", ..] => Err(CommandError::Usage("play <slug>")),
        ["playall"] => Ok(ShellCommand::PlayAll),
        ["next"] => Ok(ShellCommand::Step(Direction::Forward)),
        ["prev"] => Ok(ShellCommand::Step(Direction::Backward)),
        ["stop"] => Ok(ShellCommand::Stop),
        ["toggle"] | ["p"] => Ok(ShellCommand::Toggle),

        ["like", slug] => Ok(ShellCommand::Like(slug.to_string())),
        ["like", ..] => Err(CommandError::Usage("like <slug>")),
        ["comment", slug, name, message @ ..] if !message.is_empty() => {
            Ok(ShellCommand::Comment {
                slug: slug.to_string(),
                name: name.to_string(),
                message: message.join(" "),
            })
        }
        ["comment", ..] => Err(CommandError::Usage("comment <slug> <name> <message...>")),
        ["sign", name, message @ ..] if !message.is_empty() => Ok(ShellCommand::Sign {
            name: name.to_string(),
            message: message.join(" "),
        }),
        ["sign", ..] => Err(CommandError::Usage("sign <name> <message...>")),
        ["unlock"] => Ok(ShellCommand::Unlock),
        ["lock"] => Ok(ShellCommand::Lock),

        ["attach", slug, url] => Ok(ShellCommand::Attach {
            slug: slug.to_string(),
            url: url.to_string(),
        }),
        ["attach", ..] => Err(CommandError::Usage("attach <slug> <url>")),
        ["attach-file", slug, path @ ..] if !path.is_empty() => Ok(ShellCommand::AttachFile {
            slug: slug.to_string(),
            path: PathBuf::from(path.join(" ")),
        }),
        ["attach-file", ..] => Err(CommandError::Usage("attach-file <slug> <path>")),
        ["detach", slug] => Ok(ShellCommand::Detach(slug.to_string())),
        ["detach", ..] => Err(CommandError::Usage("detach <slug>")),

        ["export", path @ ..] if !path.is_empty() => {
            Ok(ShellCommand::Export(PathBuf::from(path.join(" "))))
        }
        ["export", ..] => Err(CommandError::Usage("export <file>")),
        ["import", path @ ..] if !path.is_empty() => {
            Ok(ShellCommand::Import(PathBuf::from(path.join(" "))))
        }
        ["import", ..] => Err(CommandError::Usage("import <file>")),
        ["reset"] => Ok(ShellCommand::Reset),

        [cmd, ..] => Err(CommandError::Unknown(cmd.to_string())),
    };

    Some(command)
}
