//! Session state for the admin client.
//!
//! `SessionCell` is the in-memory session shared with the HTTP client's
//! unauthorized hook, so a 401 from any request invalidates it. `SessionStore`
//! drives the lifecycle on top of it: rehydration from storage, login,
//! registration, logout and refreshes. Storage holds the token, the user
//! record and the refresh token; theme and locale are left alone on logout.
//!
//! Passwords and tokens never reach the logs.

use crate::{
    app_lib::{
        config::StorageKeys,
        errors::{AppError, ErrorHandler, RawError},
        navigation::{Navigator, LOGIN_PATH},
        storage::KeyValueStore,
    },
    features::auth::{
        client::AuthService,
        types::{LoginCredentials, RegisterData, User},
    },
};
use regex::Regex;
use secrecy::{ExposeSecret, SecretString};
use std::{
    collections::BTreeMap,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, PoisonError, RwLock,
    },
};
use tracing::{debug, info, warn};

#[derive(Debug, Default)]
pub struct SessionState {
    user: Option<User>,
    token: Option<SecretString>,
}

impl SessionState {
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.user.is_some() && self.token.is_some()
    }
}

/// Shared in-memory session. Locks are held only for the duration of one call.
#[derive(Clone, Debug, Default)]
pub struct SessionCell {
    inner: Arc<RwLock<SessionState>>,
}

impl SessionCell {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, user: User, token: SecretString) {
        let mut state = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        state.user = Some(user);
        state.token = Some(token);
    }

    pub fn set_user(&self, user: User) {
        self.inner
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .user = Some(user);
    }

    pub fn set_token(&self, token: SecretString) {
        self.inner
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .token = Some(token);
    }

    pub fn clear(&self) {
        let mut state = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        state.user = None;
        state.token = None;
    }

    #[must_use]
    pub fn user(&self) -> Option<User> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .user
            .clone()
    }

    #[must_use]
    pub fn has_token(&self) -> bool {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .token
            .is_some()
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_authenticated()
    }
}

/// Resets the loading flag when a flow ends, however it ends.
struct Loading<'a>(&'a AtomicBool);

impl<'a> Loading<'a> {
    fn start(flag: &'a AtomicBool) -> Self {
        flag.store(true, Ordering::SeqCst);
        Self(flag)
    }
}

impl Drop for Loading<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

pub struct SessionStore {
    cell: SessionCell,
    auth: AuthService,
    storage: Arc<dyn KeyValueStore>,
    keys: StorageKeys,
    navigator: Arc<dyn Navigator>,
    errors: ErrorHandler,
    loading: AtomicBool,
}

impl SessionStore {
    #[must_use]
    pub fn new(
        cell: SessionCell,
        auth: AuthService,
        storage: Arc<dyn KeyValueStore>,
        keys: StorageKeys,
        navigator: Arc<dyn Navigator>,
        errors: ErrorHandler,
    ) -> Self {
        Self {
            cell,
            auth,
            storage,
            keys,
            navigator,
            errors,
            loading: AtomicBool::new(false),
        }
    }

    #[must_use]
    pub fn cell(&self) -> &SessionCell {
        &self.cell
    }

    #[must_use]
    pub fn user(&self) -> Option<User> {
        self.cell.user()
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.cell.is_authenticated()
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn has_permission(&self, permission: &str) -> bool {
        self.cell
            .user()
            .is_some_and(|user| user.permissions.iter().any(|name| name == permission))
    }

    #[must_use]
    pub fn has_role(&self, role: &str) -> bool {
        self.cell
            .user()
            .is_some_and(|user| user.roles.iter().any(|name| name == role))
    }

    /// Rehydrates the session from storage and re-validates the token.
    /// Any failure leaves the session cleared; nothing is returned.
    pub async fn init(&self) {
        let token = self.storage.get(&self.keys.token);
        let stored_user = self.storage.get(&self.keys.user);
        let (Some(token), Some(stored_user)) = (token, stored_user) else {
            debug!("no persisted session");
            return;
        };

        match serde_json::from_str::<User>(&stored_user) {
            Ok(user) => self.cell.set(user, SecretString::from(token)),
            Err(err) => {
                warn!("Failed to initialize auth: {err}");
                self.clear();
                return;
            }
        }

        match self.auth.current_user().await {
            Ok(user) => {
                info!(user_id = %user.id, "Auth initialized");
                self.cell.set_user(user);
            }
            Err(err) => {
                warn!("Token validation failed: {err}");
                self.clear();
            }
        }
    }

    /// # Errors
    /// Returns the normalized failure after it was notified. An existing
    /// session is left untouched on failure.
    pub async fn login(&self, credentials: &LoginCredentials) -> Result<User, AppError> {
        let _loading = Loading::start(&self.loading);
        info!(email = %credentials.email, "Attempting login");

        let response = self
            .auth
            .login(credentials)
            .await
            .map_err(|err| self.errors.handle_api_error(err, true))?;

        self.persist(
            &response.user,
            &response.token,
            response.refresh_token.as_ref(),
        )
        .map_err(|err| self.errors.handle_api_error(err, true))?;
        self.cell.set(
            response.user.clone(),
            SecretString::from(response.token.expose_secret().to_owned()),
        );

        info!(user_id = %response.user.id, "Login successful");
        let i18n = self.errors.i18n();
        self.errors.toaster().success(
            &i18n.t("auth.loginSuccess", &[]),
            Some(i18n.t("auth.loginSuccessDescription", &[])),
        );
        Ok(response.user)
    }

    /// # Errors
    /// Returns the normalized failure after it was notified.
    pub async fn register(&self, data: &RegisterData) -> Result<User, AppError> {
        let _loading = Loading::start(&self.loading);
        self.check_email(&data.email)?;
        if !data.passwords_match() {
            return Err(self.reject("confirmPassword", "auth.passwordMismatch"));
        }
        info!(email = %data.email, "Attempting registration");

        let response = self
            .auth
            .register(data)
            .await
            .map_err(|err| self.errors.handle_api_error(err, true))?;

        self.persist(
            &response.user,
            &response.token,
            response.refresh_token.as_ref(),
        )
        .map_err(|err| self.errors.handle_api_error(err, true))?;
        self.cell.set(
            response.user.clone(),
            SecretString::from(response.token.expose_secret().to_owned()),
        );

        info!(user_id = %response.user.id, "Registration successful");
        let i18n = self.errors.i18n();
        self.errors.toaster().success(
            &i18n.t("auth.registerSuccess", &[]),
            Some(i18n.t("auth.registerSuccessDescription", &[])),
        );
        Ok(response.user)
    }

    /// Best-effort remote logout followed by an unconditional local clear.
    pub async fn logout(&self) {
        let _loading = Loading::start(&self.loading);
        info!("Logging out");

        if let Err(err) = self.auth.logout().await {
            warn!("Logout API call failed: {err}");
        }

        self.clear();
        let i18n = self.errors.i18n();
        self.errors.toaster().info(
            &i18n.t("auth.loggedOut", &[]),
            Some(i18n.t("auth.loggedOutDescription", &[])),
        );
        self.navigator.navigate(LOGIN_PATH);
    }

    /// Drops the in-memory session and the persisted session keys.
    pub fn clear(&self) {
        self.cell.clear();
        for key in self.keys.session_keys() {
            if let Err(err) = self.storage.remove(key) {
                warn!("failed to remove {key} from storage: {err}");
            }
        }
        info!("Auth cleared");
    }

    /// # Errors
    /// Returns the normalized failure; nothing is notified.
    pub async fn refresh_user(&self) -> Result<User, AppError> {
        let user = self
            .auth
            .current_user()
            .await
            .map_err(|err| self.errors.handle_api_error(err, false))?;

        let encoded = serde_json::to_string(&user)
            .map_err(|err| self.errors.handle_api_error(err, false))?;
        self.storage
            .set(&self.keys.user, &encoded)
            .map_err(|err| self.errors.handle_api_error(err, false))?;
        self.cell.set_user(user.clone());

        info!(user_id = %user.id, "User data refreshed");
        Ok(user)
    }

    /// Exchanges the stored refresh token for a new access token.
    ///
    /// # Errors
    /// Returns the normalized failure; nothing is notified.
    pub async fn refresh_token(&self) -> Result<(), AppError> {
        let Some(refresh_token) = self.storage.get(&self.keys.refresh_token) else {
            return Err(self
                .errors
                .handle_api_error(RawError::from("No refresh token available"), false));
        };
        let refresh_token = SecretString::from(refresh_token);

        let response = self
            .auth
            .refresh(&refresh_token)
            .await
            .map_err(|err| self.errors.handle_api_error(err, false))?;

        self.storage
            .set(&self.keys.token, response.token.expose_secret())
            .map_err(|err| self.errors.handle_api_error(err, false))?;
        if let Some(rotated) = &response.refresh_token {
            self.storage
                .set(&self.keys.refresh_token, rotated.expose_secret())
                .map_err(|err| self.errors.handle_api_error(err, false))?;
        }
        if let Some(user) = response.user {
            let encoded = serde_json::to_string(&user)
                .map_err(|err| self.errors.handle_api_error(err, false))?;
            self.storage
                .set(&self.keys.user, &encoded)
                .map_err(|err| self.errors.handle_api_error(err, false))?;
            self.cell.set_user(user);
        }
        self.cell.set_token(response.token);

        info!("Access token refreshed");
        Ok(())
    }

    /// # Errors
    /// Returns the normalized failure after it was notified.
    pub async fn forgot_password(&self, email: &str) -> Result<(), AppError> {
        self.check_email(email)?;
        self.auth
            .forgot_password(email)
            .await
            .map_err(|err| self.errors.handle_api_error(err, true))?;

        let i18n = self.errors.i18n();
        self.errors.toaster().info(
            &i18n.t("auth.passwordResetRequested", &[]),
            Some(i18n.t(
                "auth.passwordResetRequestedDescription",
                &[("email", email.to_string())],
            )),
        );
        Ok(())
    }

    /// # Errors
    /// Returns the normalized failure after it was notified.
    pub async fn reset_password(
        &self,
        token: &SecretString,
        password: &SecretString,
        confirm_password: &SecretString,
    ) -> Result<(), AppError> {
        if password.expose_secret() != confirm_password.expose_secret() {
            return Err(self.reject("confirmPassword", "auth.passwordMismatch"));
        }
        self.auth
            .reset_password(token, password)
            .await
            .map_err(|err| self.errors.handle_api_error(err, true))?;

        self.errors
            .toaster()
            .success(&self.errors.i18n().t("auth.passwordReset", &[]), None);
        Ok(())
    }

    /// # Errors
    /// Returns the normalized failure after it was notified.
    pub async fn change_password(
        &self,
        current_password: &SecretString,
        new_password: &SecretString,
        confirm_password: &SecretString,
    ) -> Result<(), AppError> {
        if new_password.expose_secret() != confirm_password.expose_secret() {
            return Err(self.reject("confirmPassword", "auth.passwordMismatch"));
        }
        self.auth
            .change_password(current_password, new_password)
            .await
            .map_err(|err| self.errors.handle_api_error(err, true))?;

        self.errors
            .toaster()
            .success(&self.errors.i18n().t("auth.passwordChanged", &[]), None);
        Ok(())
    }

    fn persist(
        &self,
        user: &User,
        token: &SecretString,
        refresh_token: Option<&SecretString>,
    ) -> Result<(), RawError> {
        self.storage.set(&self.keys.token, token.expose_secret())?;
        self.storage
            .set(&self.keys.user, &serde_json::to_string(user)?)?;
        if let Some(refresh_token) = refresh_token {
            self.storage
                .set(&self.keys.refresh_token, refresh_token.expose_secret())?;
        }
        Ok(())
    }

    fn check_email(&self, email: &str) -> Result<(), AppError> {
        if valid_email(email) {
            Ok(())
        } else {
            Err(self.reject("email", "auth.invalidEmail"))
        }
    }

    /// Notifies a local validation failure and returns it normalized.
    fn reject(&self, field: &str, key: &str) -> AppError {
        let message = self.errors.i18n().t(key, &[]);
        let mut errors = BTreeMap::new();
        errors.insert(field.to_string(), vec![message.clone()]);
        self.errors.handle_validation_error(&errors);
        self.errors.handle_api_error(RawError::Message(message), false)
    }
}

#[must_use]
pub fn valid_email(email: &str) -> bool {
    let email = email.trim();
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").is_ok_and(|re| re.is_match(email))
}

#[cfg(test)]
mod tests {
    use super::{valid_email, Loading, SessionCell};
    use crate::features::auth::types::User;
    use secrecy::SecretString;
    use std::sync::atomic::{AtomicBool, Ordering};

    fn user() -> User {
        User {
            id: "1".to_string(),
            email: "ops@example.com".to_string(),
            roles: vec!["admin".to_string()],
            ..User::default()
        }
    }

    #[test]
    fn authenticated_requires_user_and_token() {
        let cell = SessionCell::new();
        assert!(!cell.is_authenticated());

        cell.set_user(user());
        assert!(!cell.is_authenticated());

        cell.set_token(SecretString::from("t".to_string()));
        assert!(cell.is_authenticated());

        let shared = cell.clone();
        shared.clear();
        assert!(!cell.is_authenticated());
        assert!(cell.user().is_none());
        assert!(!cell.has_token());
    }

    #[test]
    fn loading_resets_on_drop() {
        let flag = AtomicBool::new(false);
        {
            let _loading = Loading::start(&flag);
            assert!(flag.load(Ordering::SeqCst));
        }
        assert!(!flag.load(Ordering::SeqCst));
    }

    #[test]
    fn email_validation() {
        assert!(valid_email("ops@example.com"));
        assert!(valid_email("  ops@example.com "));
        assert!(!valid_email("ops@example"));
        assert!(!valid_email("ops example@x.io"));
        assert!(!valid_email(""));
    }
}
