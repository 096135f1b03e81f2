pub mod auth;
pub mod client;
pub mod logging;
pub mod preferences;
pub mod referentials;

use clap::{
    builder::styling::{AnsiColor, Effects, Styles},
    ColorChoice, Command,
};

#[must_use]
pub fn new() -> Command {
    let styles = Styles::styled()
        .header(AnsiColor::Yellow.on_default() | Effects::BOLD)
        .usage(AnsiColor::Green.on_default() | Effects::BOLD)
        .literal(AnsiColor::Blue.on_default() | Effects::BOLD)
        .placeholder(AnsiColor::Green.on_default());

    let long_version: &'static str = Box::leak(
        format!(
            "{} - {}",
            env!("CARGO_PKG_VERSION"),
            crate::app_lib::GIT_COMMIT_HASH
        )
        .into_boxed_str(),
    );

    let command = Command::new("fro-admin")
        .about("Administration console client")
        .version(env!("CARGO_PKG_VERSION"))
        .long_version(long_version)
        .color(ColorChoice::Auto)
        .styles(styles)
        .subcommand_required(true)
        .arg_required_else_help(true);

    let command = auth::with_subcommands(command);
    let command = command.subcommand(referentials::subcommand());
    let command = preferences::with_subcommands(command);
    let command = client::with_args(command);
    logging::with_args(command)
}
