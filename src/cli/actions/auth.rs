use crate::{
    app_lib::navigation::{HOME_PATH, LOGIN_PATH},
    cli::globals::GlobalArgs,
    features::auth::{LoginCredentials, RegisterData, User},
};
use anyhow::{anyhow, bail, Result};
use secrecy::SecretString;
use tracing::debug;

#[derive(Debug)]
pub enum Command {
    Login {
        email: String,
        password: SecretString,
        remember_me: bool,
    },
    Register(RegisterData),
    Logout,
    Whoami,
    Refresh,
    ForgotPassword {
        email: String,
    },
    ResetPassword {
        token: SecretString,
        password: SecretString,
        confirm_password: SecretString,
    },
    ChangePassword {
        current_password: SecretString,
        new_password: SecretString,
        confirm_password: SecretString,
    },
}

impl Command {
    /// Surface the command starts from; sign-in flows live under the login page.
    const fn start_path(&self) -> &'static str {
        match self {
            Self::Login { .. }
            | Self::Register(_)
            | Self::ForgotPassword { .. }
            | Self::ResetPassword { .. } => LOGIN_PATH,
            Self::Logout | Self::Whoami | Self::Refresh | Self::ChangePassword { .. } => HOME_PATH,
        }
    }
}

#[derive(Debug)]
pub struct Args {
    pub globals: GlobalArgs,
    pub command: Command,
}

fn print_user(user: &User) {
    println!("{} <{}>", user.display_name(), user.email);
    println!("id: {}", user.id);
    if !user.roles.is_empty() {
        println!("roles: {}", user.roles.join(", "));
    }
    if !user.permissions.is_empty() {
        println!("permissions: {}", user.permissions.join(", "));
    }
}

/// Execute an authentication command.
/// # Errors
/// Returns an error if the flow fails; the failure has already been notified
/// when the flow notifies.
pub async fn execute(args: Args) -> Result<()> {
    let ctx = args.globals.context(args.command.start_path())?;
    let session = ctx.session();
    debug!(command = ?args.command, "running auth command");

    match args.command {
        Command::Login {
            email,
            password,
            remember_me,
        } => {
            let credentials = LoginCredentials {
                email,
                password,
                remember_me: remember_me.then_some(true),
            };
            let user = session.login(&credentials).await?;
            print_user(&user);
        }
        Command::Register(data) => {
            let user = session.register(&data).await?;
            print_user(&user);
        }
        Command::Logout => session.logout().await,
        Command::Whoami => {
            session.init().await;
            let Some(user) = session.user() else {
                ctx.toaster()
                    .warning(&ctx.i18n().t("auth.notSignedIn", &[]), None);
                bail!("no valid session");
            };
            print_user(&user);
        }
        Command::Refresh => {
            session.refresh_token().await.map_err(|err| {
                ctx.errors().show_error(&err);
                anyhow!(err)
            })?;
            if let Some(user) = session.user() {
                print_user(&user);
            }
        }
        Command::ForgotPassword { email } => session.forgot_password(&email).await?,
        Command::ResetPassword {
            token,
            password,
            confirm_password,
        } => {
            session
                .reset_password(&token, &password, &confirm_password)
                .await?;
        }
        Command::ChangePassword {
            current_password,
            new_password,
            confirm_password,
        } => {
            session
                .change_password(&current_password, &new_password, &confirm_password)
                .await?;
        }
    }

    Ok(())
}
