use crate::{
    app::AppContext,
    app_lib::{AppConfig, ConfigOverrides, ConsoleNavigator, FileStorage, TerminalNotifier},
    cli::commands::client::Options,
};
use anyhow::{Context, Result};
use std::{path::PathBuf, sync::Arc};

/// Settings shared by every command.
#[derive(Debug, Clone, Default)]
pub struct GlobalArgs {
    pub options: Options,
}

impl GlobalArgs {
    #[must_use]
    pub fn new(options: Options) -> Self {
        Self { options }
    }

    /// Environment configuration with the command line flags applied on top.
    #[must_use]
    pub fn config(&self) -> AppConfig {
        let mut config = AppConfig::load();
        config.apply_overrides(ConfigOverrides::new(
            self.options.api_url.as_deref(),
            self.options.timeout_ms,
            self.options.locale.as_deref(),
        ));
        config
    }

    #[must_use]
    pub fn storage_path(&self) -> PathBuf {
        self.options
            .state_file
            .clone()
            .unwrap_or_else(FileStorage::default_path)
    }

    /// Builds the application context for a command that starts on `path`.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn context(&self, path: &str) -> Result<AppContext> {
        AppContext::new(
            self.config(),
            Arc::new(FileStorage::open(self.storage_path())),
            Arc::new(ConsoleNavigator::new(path)),
            Arc::new(TerminalNotifier),
        )
        .context("failed to initialize the application context")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_global_args_overrides() {
        temp_env::with_vars(
            [
                ("FRO_ADMIN_API_BASE_URL", Some("http://env.tld/api")),
                ("FRO_ADMIN_API_TIMEOUT", Some("1000")),
                ("FRO_ADMIN_I18N_DEFAULT_LOCALE", None),
            ],
            || {
                let args = GlobalArgs::new(Options {
                    api_url: Some("http://flag.tld/api".to_string()),
                    locale: Some("fr".to_string()),
                    ..Options::default()
                });
                let config = args.config();
                assert_eq!(config.api_base_url, "http://flag.tld/api");
                assert_eq!(config.api_timeout_ms, 1000);
                assert_eq!(config.default_locale, "fr");
            },
        );
    }

    #[test]
    fn test_global_args_storage_path() {
        let args = GlobalArgs::new(Options {
            state_file: Some(PathBuf::from("/tmp/state.json")),
            ..Options::default()
        });
        assert_eq!(args.storage_path(), PathBuf::from("/tmp/state.json"));

        let args = GlobalArgs::default();
        assert_eq!(args.storage_path(), FileStorage::default_path());
    }
}
