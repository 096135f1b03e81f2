//! Message catalogues and locale selection.
//!
//! Catalogues are nested JSON objects addressed by dotted keys
//! (`referentiels.bulkDeleteSuccess`). Templates use `{name}` placeholders.
//! Lookups fall back to the fallback locale, then to the key itself.

use super::{
    config::AppConfig,
    notify::RichText,
    storage::{KeyValueStore, StorageError},
};
use serde_json::Value;
use std::{
    collections::BTreeMap,
    sync::{PoisonError, RwLock},
};
use tracing::{debug, warn};

const EN: &str = include_str!("locales/en.json");
const FR: &str = include_str!("locales/fr.json");

#[derive(Debug, thiserror::Error)]
pub enum I18nError {
    #[error("unsupported locale: {0}")]
    UnsupportedLocale(String),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

#[derive(Debug)]
pub struct Translator {
    catalogues: BTreeMap<String, Value>,
    supported: Vec<String>,
    fallback: String,
    locale: RwLock<String>,
}

impl Translator {
    /// Builds a translator with the persisted locale when it is supported,
    /// the configured default otherwise.
    #[must_use]
    pub fn new(config: &AppConfig, storage: &dyn KeyValueStore) -> Self {
        let saved = storage.get(&config.storage_keys.locale);
        let locale = saved
            .filter(|locale| config.supported_locales.contains(locale))
            .unwrap_or_else(|| config.default_locale.clone());
        Self::build(locale, &config.fallback_locale, &config.supported_locales)
    }

    /// Translator fixed to one locale, with English as fallback.
    #[must_use]
    pub fn with_locale(locale: &str) -> Self {
        Self::build(
            locale.to_string(),
            "en",
            &["en".to_string(), "fr".to_string()],
        )
    }

    fn build(locale: String, fallback: &str, supported: &[String]) -> Self {
        let mut catalogues = BTreeMap::new();
        for (name, raw) in [("en", EN), ("fr", FR)] {
            match serde_json::from_str::<Value>(raw) {
                Ok(catalogue) => {
                    catalogues.insert(name.to_string(), catalogue);
                }
                Err(err) => warn!("skipping malformed {name} catalogue: {err}"),
            }
        }
        Self {
            catalogues,
            supported: supported.to_vec(),
            fallback: fallback.to_string(),
            locale: RwLock::new(locale),
        }
    }

    #[must_use]
    pub fn locale(&self) -> String {
        self.locale
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    #[must_use]
    pub fn available_locales(&self) -> &[String] {
        &self.supported
    }

    /// Switches the active locale and persists it under `key`.
    ///
    /// # Errors
    /// Returns an error if the locale is not supported or cannot be persisted.
    pub fn change_locale(
        &self,
        locale: &str,
        storage: &dyn KeyValueStore,
        key: &str,
    ) -> Result<(), I18nError> {
        let locale = locale.trim();
        if !self.supported.iter().any(|supported| supported == locale) {
            return Err(I18nError::UnsupportedLocale(locale.to_string()));
        }
        storage.set(key, locale)?;
        *self.locale.write().unwrap_or_else(PoisonError::into_inner) = locale.to_string();
        debug!("locale changed to {locale}");
        Ok(())
    }

    /// Translates `key`, substituting `{name}` placeholders from `args`.
    #[must_use]
    pub fn t(&self, key: &str, args: &[(&str, String)]) -> String {
        self.t_rich(key, args, None).plain_text()
    }

    /// Translates `key`; the `highlight` placeholder becomes a strong segment.
    #[must_use]
    pub fn t_rich(&self, key: &str, args: &[(&str, String)], highlight: Option<&str>) -> RichText {
        let template = self.lookup(key).unwrap_or_else(|| key.to_string());
        interpolate(&template, args, highlight)
    }

    fn lookup(&self, key: &str) -> Option<String> {
        let locale = self.locale();
        [locale.as_str(), self.fallback.as_str()]
            .iter()
            .filter_map(|name| self.catalogues.get(*name))
            .find_map(|catalogue| resolve(catalogue, key))
    }
}

fn resolve(catalogue: &Value, key: &str) -> Option<String> {
    key.split('.')
        .try_fold(catalogue, |node, part| node.get(part))
        .and_then(Value::as_str)
        .map(ToString::to_string)
}

fn interpolate(template: &str, args: &[(&str, String)], highlight: Option<&str>) -> RichText {
    let mut text = RichText::default();
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        let Some(close) = rest[open..].find('}').map(|offset| open + offset) else {
            break;
        };
        let name = &rest[open + 1..close];
        text.push_text(&rest[..open]);
        match args.iter().find(|(arg, _)| *arg == name) {
            Some((_, value)) if highlight == Some(name) => text.push_strong(value.clone()),
            Some((_, value)) => text.push_text(value.clone()),
            None => text.push_text(&rest[open..=close]),
        }
        rest = &rest[close + 1..];
    }
    text.push_text(rest);
    text
}
