//! ui::output
//!
//! Terminal output for the `gsync` front-end.
//!
//! # Design
//!
//! Results go to stdout, notifications and skips go to stderr prefixed with
//! `error:` or `warning:`. `--quiet` silences everything except errors and
//! JSON, so scripts reading `--json` output never have to filter chatter.
//! Diagnostics go through `log`, not through here.

use std::fmt::Display;

use serde::Serialize;

/// Output verbosity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    /// Errors and JSON only
    Quiet,
    Normal,
    /// `--debug`; same terminal output as normal, plus debug logging
    Debug,
}

impl Verbosity {
    /// Create verbosity from flags. `--quiet` wins over `--debug`.
    pub fn from_flags(quiet: bool, debug: bool) -> Self {
        match (quiet, debug) {
            (true, _) => Verbosity::Quiet,
            (false, true) => Verbosity::Debug,
            (false, false) => Verbosity::Normal,
        }
    }

    fn shows_chatter(self) -> bool {
        self != Verbosity::Quiet
    }
}

/// Print a result line to stdout.
pub fn print(message: impl Display, verbosity: Verbosity) {
    if verbosity.shows_chatter() {
        println!("{message}");
    }
}

/// Print an error to stderr. Never silenced.
pub fn error(message: impl Display) {
    eprintln!("error: {message}");
}

pub fn warn(message: impl Display, verbosity: Verbosity) {
    if verbosity.shows_chatter() {
        eprintln!("warning: {message}");
    }
}

/// Report a completed operation.
pub fn success(message: impl Display, verbosity: Verbosity) {
    print(message, verbosity);
}

/// Print a value as pretty JSON. Never silenced.
pub fn json<T: Serialize>(value: &T) -> Result<(), serde_json::Error> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// A notification as one block: the title, then the description indented.
pub fn notice(title: &str, description: &str) -> String {
    if description.trim().is_empty() {
        return title.to_string();
    }
    format!("{title}\n{}", indent(description, "  "))
}

/// Prefix every line of `text`, dropping its own leading whitespace.
pub fn indent(text: &str, prefix: &str) -> String {
    text.lines()
        .map(|line| format!("{prefix}{}", line.trim_start()))
        .collect::<Vec<_>>()
        .join("\n")
}
