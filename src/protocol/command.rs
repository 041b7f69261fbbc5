//! Inbound command grammar.
//!
//! | Line               | Command                |
//! |--------------------|------------------------|
//! | `HOME_ALL`         | [`Command::HomeAll`]   |
//! | `HOME_AXIS:<int>`  | [`Command::HomeAxis`]  |
//! | `SET_MODE:<int>`   | [`Command::SetMode`]   |
//! | `RESTART_PLAYBACK` | [`Command::RestartPlayback`] |
//!
//! Matching is exact and case-sensitive.  Index arguments are parsed but
//! not range-checked here; the axis registry and the mode machine own
//! their bounds.

use crate::error::ParseError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    HomeAll,
    HomeAxis(i64),
    SetMode(i64),
    RestartPlayback,
}

impl Command {
    pub fn parse(line: &str) -> Result<Self, ParseError> {
        match line {
            "HOME_ALL" => return Ok(Self::HomeAll),
            "RESTART_PLAYBACK" => return Ok(Self::RestartPlayback),
            _ => {}
        }

        if let Some(arg) = line.strip_prefix("HOME_AXIS:") {
            return parse_index(arg, "HOME_AXIS").map(Self::HomeAxis);
        }
        if let Some(arg) = line.strip_prefix("SET_MODE:") {
            return parse_index(arg, "SET_MODE").map(Self::SetMode);
        }

        Err(ParseError::UnknownCommand(line.into()))
    }
}

fn parse_index(arg: &str, command: &'static str) -> Result<i64, ParseError> {
    arg.trim()
        .parse::<i64>()
        .map_err(|_| ParseError::BadArgument(command))
}
