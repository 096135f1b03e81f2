//! Shared utilities for the admin client: configuration, storage, the HTTP
//! client, error normalization, notifications, i18n and build metadata.
//!
//! ## Request lifecycle
//!
//! 1. **Outgoing:** `HttpClient` joins the path onto the configured base URL,
//!    attaches the bearer token read from storage and tags the request with
//!    an `X-Request-Id`.
//! 2. **Incoming:** a 401 clears the persisted session, invalidates the
//!    in-memory one through the unauthorized hook and navigates to `/login`.
//! 3. **Errors:** feature code receives `TransportError`s and turns them into
//!    `AppError`s through `errors::parse_error` before anything reaches a
//!    notification.
//!
//! Tokens and passwords pass through these helpers but must never be logged.

pub mod api;
#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}
pub mod config;
pub mod errors;
pub mod i18n;
pub mod navigation;
pub mod notify;
pub mod storage;
pub mod theme;

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub use api::{HttpClient, TransportError, TransportErrorKind};
pub use config::{AppConfig, ConfigOverrides, StorageKeys};
pub use errors::{parse_error, AppError, ErrorCode, ErrorHandler, RawError};
pub use i18n::Translator;
pub use navigation::{ConsoleNavigator, Navigator};
pub use notify::{MemoryNotifier, Notifier, RichText, TerminalNotifier, Toaster};
pub use storage::{FileStorage, KeyValueStore, MemoryStorage, StorageError};
pub use theme::Theme;
