use obox_persist::Theme;
use std::str::FromStr;
use thiserror::Error;

use crate::route::Route;

/// One line of terminal input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Plain text: a query for the current thread, or a new one from home
    Query(String),
    /// Go back to the home view
    Home,
    Go(Route),
    Threads,
    /// Submit the n-th home suggestion (1-based)
    Suggest(usize),
    /// Regenerate the given message, or the latest answer
    Regenerate(Option<String>),
    /// Toggle the source panel for a search id, or the latest answer's
    Sources(Option<String>),
    Delete(Option<String>),
    Search(bool),
    Reason(bool),
    Theme(Theme),
    Key(String),
    ForgetKey,
    Sidebar,
    Help,
    Quit,
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum CommandError {
    #[error("Unknown command /{0}, try /help")]
    Unknown(String),

    #[error("/{command} expects {expected}")]
    BadArgument {
        command: String,
        expected: &'static str,
    },
}

fn switch(command: &str, arg: Option<&str>) -> Result<bool, CommandError> {
    match arg {
        Some("on") => Ok(true),
        Some("off") => Ok(false),
        _ => Err(CommandError::BadArgument {
            command: command.to_string(),
            expected: "on or off",
        }),
    }
}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let Some(rest) = line.trim_start().strip_prefix('/') else {
            return Ok(Self::Query(line.to_string()));
        };

        let mut words = rest.split_whitespace();
        let command = words.next().unwrap_or_default();
        let arg = words.next();
        let bad = |expected| CommandError::BadArgument {
            command: command.to_string(),
            expected,
        };

        match command {
            "home" | "new" => Ok(Self::Home),
            "open" | "c" => arg
                .map(|id| Self::Go(Route::Thread(id.to_string())))
                .ok_or_else(|| bad("a thread id")),
            "go" => arg
                .ok_or_else(|| bad("a path like / or /c/<id>"))?
                .parse()
                .map(Self::Go)
                .map_err(|_| bad("a path like / or /c/<id>")),
            "threads" => Ok(Self::Threads),
            "suggest" => arg
                .and_then(|n| n.parse::<usize>().ok())
                .filter(|n| *n > 0)
                .map(Self::Suggest)
                .ok_or_else(|| bad("a suggestion number")),
            "regen" | "regenerate" => Ok(Self::Regenerate(arg.map(String::from))),
            "sources" => Ok(Self::Sources(arg.map(String::from))),
            "delete" => Ok(Self::Delete(arg.map(String::from))),
            "search" => switch(command, arg).map(Self::Search),
            "reason" => switch(command, arg).map(Self::Reason),
            "theme" => arg
                .and_then(|t| t.parse::<Theme>().ok())
                .map(Self::Theme)
                .ok_or_else(|| bad("auto, light or dark")),
            "key" => arg
                .map(|k| Self::Key(k.to_string()))
                .ok_or_else(|| bad("an API key")),
            "forget-key" => Ok(Self::ForgetKey),
            "sidebar" => Ok(Self::Sidebar),
            "help" | "?" => Ok(Self::Help),
            "quit" | "exit" | "q" => Ok(Self::Quit),
            other => Err(CommandError::Unknown(other.to_string())),
        }
    }
}

pub const HELP: &str = "\
Type a question to ask it. Commands:
  /home               back to the home view (next question starts a thread)
  /open <id>          open a thread (also /go /c/<id>)
  /threads            list threads, most recent first
  /suggest <n>        ask the n-th suggestion from the home view
  /regen [id]         regenerate an answer (default: the latest)
  /sources [id]       toggle the sources of an answer (default: the latest)
  /delete [id]        delete a thread (default: the open one)
  /search on|off      look up sources before answering
  /reason on|off      use the reasoning model
  /theme auto|light|dark
  /key <api-key>      use your own Gemini key
  /forget-key         drop the stored key
  /sidebar            toggle the thread list
  /quit
Ctrl-C stops an answer while it is being written.";
