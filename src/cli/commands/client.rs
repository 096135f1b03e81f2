use clap::{Arg, ArgMatches, Command};
use std::path::PathBuf;

pub const ARG_API_URL: &str = "api-url";
pub const ARG_TIMEOUT: &str = "timeout";
pub const ARG_STATE_FILE: &str = "state-file";
pub const ARG_LOCALE: &str = "locale";

/// Flags that override the `FRO_ADMIN_*` environment configuration.
#[derive(Debug, Clone, Default)]
pub struct Options {
    pub api_url: Option<String>,
    pub timeout_ms: Option<u64>,
    pub state_file: Option<PathBuf>,
    pub locale: Option<String>,
}

impl Options {
    #[must_use]
    pub fn parse(matches: &ArgMatches) -> Self {
        Self {
            api_url: matches.get_one::<String>(ARG_API_URL).cloned(),
            timeout_ms: matches.get_one::<u64>(ARG_TIMEOUT).copied(),
            state_file: matches.get_one::<PathBuf>(ARG_STATE_FILE).cloned(),
            locale: matches.get_one::<String>(ARG_LOCALE).cloned(),
        }
    }
}

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_API_URL)
                .long(ARG_API_URL)
                .help("Backend API base URL (overrides FRO_ADMIN_API_BASE_URL)")
                .global(true),
        )
        .arg(
            Arg::new(ARG_TIMEOUT)
                .long(ARG_TIMEOUT)
                .help("Request timeout in milliseconds (overrides FRO_ADMIN_API_TIMEOUT)")
                .global(true)
                .value_parser(clap::value_parser!(u64)),
        )
        .arg(
            Arg::new(ARG_STATE_FILE)
                .long(ARG_STATE_FILE)
                .help("File holding the session and preferences")
                .long_help(
                    "File holding the session and preferences. Defaults to fro-admin/state.json under the user configuration directory.",
                )
                .env("FRO_ADMIN_STATE_FILE")
                .global(true)
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(
            Arg::new(ARG_LOCALE)
                .long(ARG_LOCALE)
                .help("Default locale when none was saved (overrides FRO_ADMIN_I18N_DEFAULT_LOCALE)")
                .global(true),
        )
}
