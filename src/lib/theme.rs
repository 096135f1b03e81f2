//! Persisted colour-scheme preference.

use super::storage::{KeyValueStore, StorageError};
use std::{fmt, str::FromStr};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Theme {
    Light,
    Dark,
    #[default]
    System,
}

impl Theme {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
            Self::System => "system",
        }
    }

    /// Reads the stored preference; anything unrecognized reads as `System`.
    #[must_use]
    pub fn load(storage: &dyn KeyValueStore, key: &str) -> Self {
        storage
            .get(key)
            .and_then(|value| value.parse().ok())
            .unwrap_or_default()
    }

    /// # Errors
    /// Returns an error if the preference cannot be persisted.
    pub fn save(self, storage: &dyn KeyValueStore, key: &str) -> Result<(), StorageError> {
        storage.set(key, self.as_str())
    }
}

impl FromStr for Theme {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "light" => Ok(Self::Light),
            "dark" => Ok(Self::Dark),
            "system" => Ok(Self::System),
            other => Err(format!("unknown theme: {other}")),
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}
