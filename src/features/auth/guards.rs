use crate::app_lib::{
    navigation::{HOME_PATH, LOGIN_PATH},
    storage::KeyValueStore,
};
use tracing::{debug, warn};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GuardDecision {
    Proceed,
    Redirect(String),
}

impl GuardDecision {
    #[must_use]
    pub fn is_proceed(&self) -> bool {
        matches!(self, Self::Proceed)
    }
}

/// Sends visitors without a stored token to the login page, remembering
/// where they were going. UX-only; access control lives on the API.
#[must_use]
pub fn auth_guard(storage: &dyn KeyValueStore, token_key: &str, path: &str) -> GuardDecision {
    if storage.get(token_key).is_some() {
        debug!(path, "auth guard passed");
        GuardDecision::Proceed
    } else {
        warn!(path, "Unauthorized access attempt");
        GuardDecision::Redirect(format!("{LOGIN_PATH}?redirect={}", encode_query(path)))
    }
}

/// Keeps signed-in users away from guest-only pages.
#[must_use]
pub fn guest_guard(storage: &dyn KeyValueStore, token_key: &str, path: &str) -> GuardDecision {
    if storage.get(token_key).is_some() {
        debug!(path, "guest guard redirecting authenticated user");
        GuardDecision::Redirect(HOME_PATH.to_string())
    } else {
        GuardDecision::Proceed
    }
}

fn encode_query(value: &str) -> String {
    url::form_urlencoded::byte_serialize(value.as_bytes()).collect()
}

#[cfg(test)]
mod tests {
    use super::{auth_guard, guest_guard, GuardDecision};
    use crate::app_lib::storage::{KeyValueStore, MemoryStorage};

    #[test]
    fn auth_guard_redirects_with_target() {
        let storage = MemoryStorage::new();
        assert_eq!(
            auth_guard(&storage, "auth-token", "/referentiels?page=2"),
            GuardDecision::Redirect("/login?redirect=%2Freferentiels%3Fpage%3D2".to_string())
        );

        storage.set("auth-token", "t").unwrap();
        assert!(auth_guard(&storage, "auth-token", "/referentiels").is_proceed());
    }

    #[test]
    fn guest_guard_sends_signed_in_users_home() {
        let storage = MemoryStorage::new();
        assert!(guest_guard(&storage, "auth-token", "/login").is_proceed());

        storage.set("auth-token", "t").unwrap();
        assert_eq!(
            guest_guard(&storage, "auth-token", "/login"),
            GuardDecision::Redirect("/".to_string())
        );
    }
}
