use clap::{Arg, ArgAction, Command};

pub const ARG_EMAIL: &str = "email";
pub const ARG_PASSWORD: &str = "password";
pub const ARG_CONFIRM_PASSWORD: &str = "confirm-password";
pub const ARG_REMEMBER_ME: &str = "remember-me";
pub const ARG_FIRST_NAME: &str = "first-name";
pub const ARG_LAST_NAME: &str = "last-name";
pub const ARG_TOKEN: &str = "token";
pub const ARG_CURRENT_PASSWORD: &str = "current-password";
pub const ARG_NEW_PASSWORD: &str = "new-password";

fn email() -> Arg {
    Arg::new(ARG_EMAIL)
        .short('e')
        .long(ARG_EMAIL)
        .help("Account email address")
        .env("FRO_ADMIN_EMAIL")
        .required(true)
}

fn secret(id: &'static str, env: &'static str, help: &'static str) -> Arg {
    Arg::new(id)
        .long(id)
        .help(help)
        .env(env)
        .hide_env_values(true)
        .required(true)
}

#[must_use]
pub fn with_subcommands(command: Command) -> Command {
    command
        .subcommand(
            Command::new("login")
                .about("Sign in and persist the session")
                .arg(email())
                .arg(
                    secret(ARG_PASSWORD, "FRO_ADMIN_PASSWORD", "Account password").short('p'),
                )
                .arg(
                    Arg::new(ARG_REMEMBER_ME)
                        .long(ARG_REMEMBER_ME)
                        .help("Ask the backend for a long-lived session")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("register")
                .about("Create an account and sign in")
                .arg(email())
                .arg(secret(ARG_PASSWORD, "FRO_ADMIN_PASSWORD", "Account password"))
                .arg(secret(
                    ARG_CONFIRM_PASSWORD,
                    "FRO_ADMIN_CONFIRM_PASSWORD",
                    "Password confirmation",
                ))
                .arg(Arg::new(ARG_FIRST_NAME).long(ARG_FIRST_NAME).help("First name"))
                .arg(Arg::new(ARG_LAST_NAME).long(ARG_LAST_NAME).help("Last name")),
        )
        .subcommand(Command::new("logout").about("Sign out and clear the stored session"))
        .subcommand(Command::new("whoami").about("Validate the stored session and show the user"))
        .subcommand(Command::new("refresh").about("Exchange the refresh token for a new access token"))
        .subcommand(
            Command::new("forgot-password")
                .about("Request a password reset email")
                .arg(email()),
        )
        .subcommand(
            Command::new("reset-password")
                .about("Set a new password with a reset token")
                .arg(secret(ARG_TOKEN, "FRO_ADMIN_RESET_TOKEN", "Password reset token"))
                .arg(secret(ARG_PASSWORD, "FRO_ADMIN_PASSWORD", "New password"))
                .arg(secret(
                    ARG_CONFIRM_PASSWORD,
                    "FRO_ADMIN_CONFIRM_PASSWORD",
                    "Password confirmation",
                )),
        )
        .subcommand(
            Command::new("change-password")
                .about("Change the password of the signed-in account")
                .arg(secret(
                    ARG_CURRENT_PASSWORD,
                    "FRO_ADMIN_CURRENT_PASSWORD",
                    "Current password",
                ))
                .arg(secret(ARG_NEW_PASSWORD, "FRO_ADMIN_NEW_PASSWORD", "New password"))
                .arg(secret(
                    ARG_CONFIRM_PASSWORD,
                    "FRO_ADMIN_CONFIRM_PASSWORD",
                    "New password confirmation",
                )),
        )
}
