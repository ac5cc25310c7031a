//! `-v`/`VESTIBULE_LOG_LEVEL` and the tracing level it selects.

use clap::{builder::ValueParser, Arg, ArgAction, Command};
use tracing::Level;

pub const ARG_VERBOSITY: &str = "verbosity";

/// Level names in verbosity order; `error` is the quiet default.
const LEVEL_NAMES: [&str; 5] = ["error", "warn", "info", "debug", "trace"];

/// Accepts a level name or its index in [`LEVEL_NAMES`].
fn parse_verbosity(raw: &str) -> Result<u8, String> {
    let raw = raw.trim().to_ascii_lowercase();
    let index = raw
        .parse::<usize>()
        .ok()
        .or_else(|| LEVEL_NAMES.iter().position(|name| *name == raw))
        .filter(|index| *index < LEVEL_NAMES.len())
        .ok_or_else(|| format!("invalid log level '{raw}', use one of {}", LEVEL_NAMES.join(", ")))?;
    u8::try_from(index).map_err(|err| err.to_string())
}

/// Tracing level for a verbosity count. `None` keeps the default filter.
#[must_use]
pub const fn level(verbosity: u8) -> Option<Level> {
    match verbosity {
        0 => None,
        1 => Some(Level::WARN),
        2 => Some(Level::INFO),
        3 => Some(Level::DEBUG),
        _ => Some(Level::TRACE),
    }
}

#[must_use]
pub fn with_args(command: Command) -> Command {
    command.arg(
        Arg::new(ARG_VERBOSITY)
            .short('v')
            .long("verbose")
            .help("Verbosity level: ERROR, WARN, INFO, DEBUG, TRACE (default: ERROR)")
            .env("VESTIBULE_LOG_LEVEL")
            .global(true)
            .action(ArgAction::Count)
            .value_parser(ValueParser::from(parse_verbosity)),
    )
}
