use crate::{
    app_lib::{navigation::HOME_PATH, Theme},
    cli::globals::GlobalArgs,
};
use anyhow::{Context, Result};

#[derive(Debug)]
pub enum Command {
    Locale(Option<String>),
    Theme(Option<Theme>),
}

#[derive(Debug)]
pub struct Args {
    pub globals: GlobalArgs,
    pub command: Command,
}

/// Show or persist a preference. Preferences survive logout.
/// # Errors
/// Returns an error if the locale is unsupported or the state file cannot be written.
pub async fn execute(args: Args) -> Result<()> {
    let ctx = args.globals.context(HOME_PATH)?;
    let i18n = ctx.i18n();

    match args.command {
        Command::Locale(None) => {
            println!(
                "{}",
                i18n.t("preferences.currentLocale", &[("locale", i18n.locale())])
            );
            println!("{}", i18n.available_locales().join(", "));
        }
        Command::Locale(Some(code)) => {
            ctx.change_locale(&code)
                .with_context(|| format!("cannot switch to locale {code}"))?;
            ctx.toaster().success(
                &i18n.t("preferences.localeChanged", &[("locale", i18n.locale())]),
                None,
            );
        }
        Command::Theme(None) => {
            println!(
                "{}",
                i18n.t(
                    "preferences.currentTheme",
                    &[("theme", ctx.theme().to_string())]
                )
            );
        }
        Command::Theme(Some(theme)) => {
            ctx.set_theme(theme).context("cannot save theme")?;
            ctx.toaster().success(
                &i18n.t("preferences.themeChanged", &[("theme", theme.to_string())]),
                None,
            );
        }
    }

    Ok(())
}
