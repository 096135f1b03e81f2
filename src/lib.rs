//! # fro-admin
//!
//! Client core and command line front end for the Viridial administration
//! console. It signs operators in against the back-office API, keeps the
//! session in a local state file, and searches and bulk-edits referentials.
//!
//! ## Layout
//!
//! - `app_lib`: configuration, storage, the HTTP client, error normalization,
//!   notifications, i18n and theme preference.
//! - `features::auth`: the session store, the auth endpoints and route guards.
//! - `features::referentials`: search with legacy response reconciliation,
//!   the listing state and bulk actions.
//! - `app`: wires the services into one `AppContext`.
//! - `cli`: argument parsing, logging setup and command actions.
//!
//! ## Session persistence
//!
//! The token, user record and refresh token live under configurable storage
//! keys. Theme and locale are kept under their own keys and survive logout.
//! Any 401 from the backend clears the session, in memory and on disk.

#[path = "lib/mod.rs"]
pub mod app_lib;

pub mod app;
pub mod cli;
pub mod features;

pub use app::AppContext;
pub use app_lib::GIT_COMMIT_HASH;

#[cfg(test)]
mod tests {
    use super::GIT_COMMIT_HASH;

    #[test]
    fn test_git_commit_hash() {
        assert!(!GIT_COMMIT_HASH.is_empty());
        assert!(
            GIT_COMMIT_HASH == "unknown"
                || GIT_COMMIT_HASH.chars().all(|c| c.is_ascii_hexdigit())
        );
    }
}
