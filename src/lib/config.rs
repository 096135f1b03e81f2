//! Console configuration read from `FRO_ADMIN_*` environment variables with
//! defaults, plus explicit overrides coming from CLI flags. Configuration
//! values are public; do not store secrets here.

use std::{env, time::Duration};
use tracing::warn;

pub const DEFAULT_APP_NAME: &str = "Viridial Admin";
pub const DEFAULT_APP_ENV: &str = "development";
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8080/api";
pub const DEFAULT_API_TIMEOUT_MS: u64 = 30_000;
pub const DEFAULT_LOCALE: &str = "en";

/// Storage key for the refresh token; it is not configurable.
pub const REFRESH_TOKEN_KEY: &str = "refreshToken";

/// Keys under which the console persists its state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StorageKeys {
    pub theme: String,
    pub locale: String,
    pub token: String,
    pub user: String,
    pub refresh_token: String,
}

impl StorageKeys {
    /// Keys that make up an authenticated session. Preferences are not included.
    #[must_use]
    pub fn session_keys(&self) -> [&str; 3] {
        [
            self.token.as_str(),
            self.user.as_str(),
            self.refresh_token.as_str(),
        ]
    }
}

impl Default for StorageKeys {
    fn default() -> Self {
        Self {
            theme: "app-theme".to_string(),
            locale: "app-locale".to_string(),
            token: "auth-token".to_string(),
            user: "user-data".to_string(),
            refresh_token: REFRESH_TOKEN_KEY.to_string(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub app_name: String,
    pub app_env: String,
    pub api_base_url: String,
    pub api_timeout_ms: u64,
    pub default_locale: String,
    pub fallback_locale: String,
    pub supported_locales: Vec<String>,
    pub storage_keys: StorageKeys,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            app_name: DEFAULT_APP_NAME.to_string(),
            app_env: DEFAULT_APP_ENV.to_string(),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            api_timeout_ms: DEFAULT_API_TIMEOUT_MS,
            default_locale: DEFAULT_LOCALE.to_string(),
            fallback_locale: DEFAULT_LOCALE.to_string(),
            supported_locales: vec!["en".to_string(), "fr".to_string()],
            storage_keys: StorageKeys::default(),
        }
    }
}

impl AppConfig {
    /// Loads config from the process environment.
    #[must_use]
    pub fn load() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds config from an arbitrary variable lookup; blank values keep defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let read = |key: &str| lookup(key).as_deref().and_then(normalize_value);
        let defaults = Self::default();
        let default_keys = defaults.storage_keys.clone();

        Self {
            app_name: read("FRO_ADMIN_APP_NAME").unwrap_or(defaults.app_name),
            app_env: read("FRO_ADMIN_APP_ENV").unwrap_or(defaults.app_env),
            api_base_url: read("FRO_ADMIN_API_BASE_URL").unwrap_or(defaults.api_base_url),
            api_timeout_ms: read("FRO_ADMIN_API_TIMEOUT")
                .and_then(|value| value.parse().ok())
                .unwrap_or(defaults.api_timeout_ms),
            default_locale: read("FRO_ADMIN_I18N_DEFAULT_LOCALE")
                .unwrap_or(defaults.default_locale),
            fallback_locale: read("FRO_ADMIN_I18N_FALLBACK_LOCALE")
                .unwrap_or(defaults.fallback_locale),
            supported_locales: read("FRO_ADMIN_I18N_SUPPORTED_LOCALES")
                .map(|value| split_list(&value))
                .filter(|list| !list.is_empty())
                .unwrap_or(defaults.supported_locales),
            storage_keys: StorageKeys {
                theme: read("FRO_ADMIN_STORAGE_KEY_THEME").unwrap_or(default_keys.theme),
                locale: read("FRO_ADMIN_STORAGE_KEY_LOCALE").unwrap_or(default_keys.locale),
                token: read("FRO_ADMIN_STORAGE_KEY_TOKEN").unwrap_or(default_keys.token),
                user: read("FRO_ADMIN_STORAGE_KEY_USER").unwrap_or(default_keys.user),
                refresh_token: default_keys.refresh_token,
            },
        }
    }

    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.api_timeout_ms)
    }

    #[must_use]
    pub fn is_dev(&self) -> bool {
        self.app_env == "development"
    }

    #[must_use]
    pub fn is_prod(&self) -> bool {
        self.app_env == "production"
    }

    #[must_use]
    pub fn is_staging(&self) -> bool {
        self.app_env == "staging"
    }

    /// Returns the names of required settings that are empty and logs them.
    /// Missing values are reported, never fatal.
    pub fn validate(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.api_base_url.trim().is_empty() {
            missing.push("API Base URL (FRO_ADMIN_API_BASE_URL)");
        }
        if self.default_locale.trim().is_empty() {
            missing.push("Default Locale (FRO_ADMIN_I18N_DEFAULT_LOCALE)");
        }
        if !missing.is_empty() {
            warn!("Missing or invalid configuration: {}", missing.join(", "));
        }
        missing
    }

    pub fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(value) = overrides.api_base_url {
            self.api_base_url = value;
        }
        if let Some(value) = overrides.api_timeout_ms {
            self.api_timeout_ms = value;
        }
        if let Some(value) = overrides.default_locale {
            self.default_locale = value;
        }
    }
}

/// Values supplied on the command line that win over the environment.
#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub api_base_url: Option<String>,
    pub api_timeout_ms: Option<u64>,
    pub default_locale: Option<String>,
}

impl ConfigOverrides {
    #[must_use]
    pub fn new(
        api_base_url: Option<&str>,
        api_timeout_ms: Option<u64>,
        default_locale: Option<&str>,
    ) -> Self {
        Self {
            api_base_url: api_base_url.and_then(normalize_value),
            api_timeout_ms,
            default_locale: default_locale.and_then(normalize_value),
        }
    }
}

pub(crate) fn normalize_value(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn split_list(value: &str) -> Vec<String> {
    value.split(',').filter_map(normalize_value).collect()
}

#[cfg(test)]
mod tests {
    use super::{normalize_value, AppConfig, ConfigOverrides, DEFAULT_API_BASE_URL};

    #[test]
    fn normalize_value_trims_and_rejects_empty() {
        assert_eq!(normalize_value(""), None);
        assert_eq!(normalize_value("   "), None);
        assert_eq!(
            normalize_value("  https://admin.viridial.com/api "),
            Some("https://admin.viridial.com/api".to_string())
        );
    }

    #[test]
    fn load_uses_defaults_for_blank_values() {
        temp_env::with_vars(
            [
                ("FRO_ADMIN_API_BASE_URL", Some("  ")),
                ("FRO_ADMIN_API_TIMEOUT", Some("not-a-number")),
                ("FRO_ADMIN_I18N_SUPPORTED_LOCALES", Some(" , ")),
                ("FRO_ADMIN_STORAGE_KEY_TOKEN", None),
            ],
            || {
                let config = AppConfig::load();
                assert_eq!(config.api_base_url, DEFAULT_API_BASE_URL);
                assert_eq!(config.api_timeout_ms, 30_000);
                assert_eq!(config.supported_locales, vec!["en", "fr"]);
                assert_eq!(config.storage_keys.token, "auth-token");
                assert_eq!(config.storage_keys.refresh_token, "refreshToken");
            },
        );
    }

    #[test]
    fn load_reads_environment() {
        temp_env::with_vars(
            [
                ("FRO_ADMIN_API_BASE_URL", Some("https://api.viridial.test")),
                ("FRO_ADMIN_API_TIMEOUT", Some("5000")),
                ("FRO_ADMIN_I18N_SUPPORTED_LOCALES", Some("en, fr ,de")),
                ("FRO_ADMIN_STORAGE_KEY_USER", Some("who")),
                ("FRO_ADMIN_APP_ENV", Some("production")),
            ],
            || {
                let config = AppConfig::load();
                assert_eq!(config.api_base_url, "https://api.viridial.test");
                assert_eq!(config.api_timeout_ms, 5000);
                assert_eq!(config.supported_locales, vec!["en", "fr", "de"]);
                assert_eq!(config.storage_keys.user, "who");
                assert!(config.is_prod());
                assert!(!config.is_dev());
            },
        );
    }

    #[test]
    fn apply_overrides_ignores_empty_values() {
        let mut config = AppConfig::default();
        config.apply_overrides(ConfigOverrides::new(Some("  "), None, Some("")));

        assert_eq!(config.api_base_url, DEFAULT_API_BASE_URL);
        assert_eq!(config.default_locale, "en");
    }

    #[test]
    fn apply_overrides_overwrites_when_present() {
        let mut config = AppConfig::default();
        config.apply_overrides(ConfigOverrides::new(
            Some("https://api.override"),
            Some(1500),
            Some("fr"),
        ));

        assert_eq!(config.api_base_url, "https://api.override");
        assert_eq!(config.api_timeout_ms, 1500);
        assert_eq!(config.default_locale, "fr");
    }

    #[test]
    fn validate_reports_missing_values() {
        let config = AppConfig {
            api_base_url: String::new(),
            ..AppConfig::default()
        };
        assert_eq!(config.validate().len(), 1);
        assert!(AppConfig::default().validate().is_empty());
    }
}
