//! Auth feature: typed `/auth/*` client, session lifecycle and route guards.
//! This module touches the token and passwords and must never log them.
//!
//! Flow overview: login and registration persist the token, the user record
//! and an optional refresh token, then mirror them into the shared
//! `SessionCell`. Start-up rehydrates from storage and re-validates with
//! `/auth/me`. Logout, failed validation and any 401 clear both.

pub mod client;
pub mod guards;
pub mod state;
pub mod types;

pub use client::AuthService;
pub use guards::{auth_guard, guest_guard, GuardDecision};
pub use state::{SessionCell, SessionStore};
pub use types::{AuthResponse, LoginCredentials, RegisterData, User};
