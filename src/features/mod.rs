pub mod auth;
pub mod referentials;
