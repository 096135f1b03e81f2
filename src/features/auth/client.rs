//! Client wrappers for the `/auth/*` endpoints. Responses may arrive inside
//! the `ApiResponse` envelope or bare; both decode to the same types. Errors
//! are returned raw so callers decide how to normalize and notify.

use crate::{
    app_lib::{api::unwrap_envelope, errors::RawError, HttpClient},
    features::auth::types::{
        AuthResponse, ChangePasswordRequest, ForgotPasswordRequest, LoginCredentials,
        RefreshResponse, RefreshTokenRequest, RegisterData, ResetPasswordRequest, User,
    },
};
use secrecy::SecretString;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use tracing::instrument;

pub const LOGIN_ENDPOINT: &str = "/auth/login";
pub const REGISTER_ENDPOINT: &str = "/auth/register";
pub const LOGOUT_ENDPOINT: &str = "/auth/logout";
pub const ME_ENDPOINT: &str = "/auth/me";
pub const REFRESH_ENDPOINT: &str = "/auth/refresh";
pub const FORGOT_PASSWORD_ENDPOINT: &str = "/auth/forgot-password";
pub const RESET_PASSWORD_ENDPOINT: &str = "/auth/reset-password";
pub const CHANGE_PASSWORD_ENDPOINT: &str = "/auth/change-password";

#[derive(Clone, Debug)]
pub struct AuthService {
    http: Arc<HttpClient>,
}

impl AuthService {
    #[must_use]
    pub fn new(http: Arc<HttpClient>) -> Self {
        Self { http }
    }

    /// # Errors
    /// Returns the raw transport or decoding failure.
    #[instrument(skip_all, fields(email = %credentials.email))]
    pub async fn login(&self, credentials: &LoginCredentials) -> Result<AuthResponse, RawError> {
        decode(self.http.post(LOGIN_ENDPOINT, credentials).await?)
    }

    /// # Errors
    /// Returns the raw transport or decoding failure.
    #[instrument(skip_all, fields(email = %data.email))]
    pub async fn register(&self, data: &RegisterData) -> Result<AuthResponse, RawError> {
        decode(self.http.post(REGISTER_ENDPOINT, data).await?)
    }

    /// # Errors
    /// Returns the raw transport failure.
    pub async fn logout(&self) -> Result<(), RawError> {
        self.http.post_empty(LOGOUT_ENDPOINT).await?;
        Ok(())
    }

    /// # Errors
    /// Returns the raw transport or decoding failure.
    pub async fn current_user(&self) -> Result<User, RawError> {
        decode(self.http.get(ME_ENDPOINT).await?)
    }

    /// # Errors
    /// Returns the raw transport or decoding failure.
    #[instrument(skip_all)]
    pub async fn refresh(&self, refresh_token: &SecretString) -> Result<RefreshResponse, RawError> {
        let request = RefreshTokenRequest { refresh_token };
        decode(self.http.post(REFRESH_ENDPOINT, &request).await?)
    }

    /// # Errors
    /// Returns the raw transport failure.
    #[instrument(skip_all)]
    pub async fn forgot_password(&self, email: &str) -> Result<(), RawError> {
        self.http
            .post(FORGOT_PASSWORD_ENDPOINT, &ForgotPasswordRequest { email })
            .await?;
        Ok(())
    }

    /// # Errors
    /// Returns the raw transport failure.
    #[instrument(skip_all)]
    pub async fn reset_password(
        &self,
        token: &SecretString,
        password: &SecretString,
    ) -> Result<(), RawError> {
        self.http
            .post(
                RESET_PASSWORD_ENDPOINT,
                &ResetPasswordRequest { token, password },
            )
            .await?;
        Ok(())
    }

    /// # Errors
    /// Returns the raw transport failure.
    #[instrument(skip_all)]
    pub async fn change_password(
        &self,
        current_password: &SecretString,
        new_password: &SecretString,
    ) -> Result<(), RawError> {
        let request = ChangePasswordRequest {
            current_password,
            new_password,
        };
        self.http.post(CHANGE_PASSWORD_ENDPOINT, &request).await?;
        Ok(())
    }
}

fn decode<T: DeserializeOwned>(value: Value) -> Result<T, RawError> {
    Ok(serde_json::from_value(unwrap_envelope(value))?)
}
