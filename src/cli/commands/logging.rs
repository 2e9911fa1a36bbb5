//! Log verbosity for the CLI. Logs go to stderr so command output on stdout
//! stays clean; errors are always shown.

use clap::{Arg, ArgAction, ArgMatches, Command, builder::PossibleValuesParser};
use tracing::Level;

pub const ARG_VERBOSE: &str = "verbose";
pub const ARG_LOG_LEVEL: &str = "log-level";

const LEVELS: [&str; 5] = ["error", "warn", "info", "debug", "trace"];

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_VERBOSE)
                .short('v')
                .long("verbose")
                .help("More request and session detail on stderr; repeat for more (-v warn .. -vvvv trace)")
                .global(true)
                .action(ArgAction::Count),
        )
        .arg(
            Arg::new(ARG_LOG_LEVEL)
                .long("log-level")
                .help("Log level by name; wins over -v")
                .env("CABINET_LOG_LEVEL")
                .global(true)
                .ignore_case(true)
                .value_parser(PossibleValuesParser::new(LEVELS)),
        )
}

/// Level asked for on the command line, `None` for the quiet default.
#[must_use]
pub fn level(matches: &ArgMatches) -> Option<Level> {
    if let Some(name) = matches.get_one::<String>(ARG_LOG_LEVEL) {
        return name.to_lowercase().parse().ok();
    }

    match matches.get_count(ARG_VERBOSE) {
        0 => None,
        1 => Some(Level::WARN),
        2 => Some(Level::INFO),
        3 => Some(Level::DEBUG),
        _ => Some(Level::TRACE),
    }
}
