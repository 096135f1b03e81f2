//! Navigation surface used by the session flows. A browser console would back
//! this with its router; the CLI keeps the current surface in memory and
//! tells the operator where they have been sent.

use std::sync::{Mutex, PoisonError};
use tracing::info;

pub const LOGIN_PATH: &str = "/login";
pub const HOME_PATH: &str = "/";
pub const REFERENTIALS_PATH: &str = "/referentiels";

pub trait Navigator: Send + Sync {
    fn current_path(&self) -> String;
    fn navigate(&self, path: &str);

    fn is_on_login(&self) -> bool {
        self.current_path().contains(LOGIN_PATH)
    }
}

/// In-memory navigator; records every navigation so callers can inspect it.
#[derive(Debug)]
pub struct ConsoleNavigator {
    current: Mutex<String>,
    history: Mutex<Vec<String>>,
}

impl ConsoleNavigator {
    #[must_use]
    pub fn new(start: &str) -> Self {
        Self {
            current: Mutex::new(start.to_string()),
            history: Mutex::new(Vec::new()),
        }
    }

    /// Paths navigated to, oldest first.
    #[must_use]
    pub fn history(&self) -> Vec<String> {
        self.history
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Default for ConsoleNavigator {
    fn default() -> Self {
        Self::new(HOME_PATH)
    }
}

impl Navigator for ConsoleNavigator {
    fn current_path(&self) -> String {
        self.current
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn navigate(&self, path: &str) {
        info!("navigating to {path}");
        *self.current.lock().unwrap_or_else(PoisonError::into_inner) = path.to_string();
        self.history
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(path.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::{ConsoleNavigator, Navigator, LOGIN_PATH, REFERENTIALS_PATH};

    #[test]
    fn navigate_updates_current_and_history() {
        let navigator = ConsoleNavigator::new(REFERENTIALS_PATH);
        assert!(!navigator.is_on_login());

        navigator.navigate(LOGIN_PATH);

        assert!(navigator.is_on_login());
        assert_eq!(navigator.history(), vec![LOGIN_PATH.to_string()]);
    }

    #[test]
    fn login_detection_matches_nested_paths() {
        let navigator = ConsoleNavigator::new("/admin/login?redirect=%2F");
        assert!(navigator.is_on_login());
    }
}
