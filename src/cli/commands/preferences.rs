use clap::{Arg, Command};

pub const ARG_CODE: &str = "code";
pub const ARG_MODE: &str = "mode";

#[must_use]
pub fn with_subcommands(command: Command) -> Command {
    command
        .subcommand(
            Command::new("locale")
                .about("Show or change the interface locale")
                .arg(Arg::new(ARG_CODE).help("Locale code, e.g. en or fr")),
        )
        .subcommand(
            Command::new("theme")
                .about("Show or change the colour scheme preference")
                .arg(
                    Arg::new(ARG_MODE)
                        .help("Colour scheme")
                        .value_parser(["light", "dark", "system"]),
                ),
        )
}
