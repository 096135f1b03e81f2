//! Application context: builds every service once and hands out shared
//! handles. Nothing in the crate reaches for globals; flows receive what they
//! need from here.

use crate::{
    app_lib::{
        api::{HttpClient, TransportError},
        config::AppConfig,
        errors::ErrorHandler,
        i18n::{I18nError, Translator},
        navigation::Navigator,
        notify::{Notifier, Toaster},
        storage::{KeyValueStore, StorageError},
        theme::Theme,
    },
    features::{
        auth::{auth_guard, guest_guard, AuthService, GuardDecision, SessionCell, SessionStore},
        referentials::{ReferentialActions, ReferentialList, ReferentialQueryService, RefreshFn},
    },
};
use std::sync::Arc;
use tracing::debug;

pub struct AppContext {
    config: AppConfig,
    storage: Arc<dyn KeyValueStore>,
    navigator: Arc<dyn Navigator>,
    toaster: Toaster,
    i18n: Arc<Translator>,
    errors: ErrorHandler,
    http: Arc<HttpClient>,
    session: SessionStore,
    referentials: ReferentialQueryService,
}

impl AppContext {
    /// # Errors
    /// Returns an error if the HTTP client cannot be initialized.
    pub fn new(
        config: AppConfig,
        storage: Arc<dyn KeyValueStore>,
        navigator: Arc<dyn Navigator>,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self, TransportError> {
        config.validate();

        let toaster = Toaster::new(notifier);
        let i18n = Arc::new(Translator::new(&config, storage.as_ref()));
        let errors = ErrorHandler::new(toaster.clone(), i18n.clone());

        let cell = SessionCell::new();
        let on_unauthorized = cell.clone();
        let http = Arc::new(
            HttpClient::new(&config, storage.clone(), navigator.clone())?
                .with_unauthorized_hook(Arc::new(move || on_unauthorized.clear())),
        );

        let session = SessionStore::new(
            cell,
            AuthService::new(http.clone()),
            storage.clone(),
            config.storage_keys.clone(),
            navigator.clone(),
            errors.clone(),
        );
        let referentials = ReferentialQueryService::new(http.clone());

        debug!(api_base_url = %config.api_base_url, "application context ready");
        Ok(Self {
            config,
            storage,
            navigator,
            toaster,
            i18n,
            errors,
            http,
            session,
            referentials,
        })
    }

    #[must_use]
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    #[must_use]
    pub fn storage(&self) -> &dyn KeyValueStore {
        self.storage.as_ref()
    }

    #[must_use]
    pub fn navigator(&self) -> &dyn Navigator {
        self.navigator.as_ref()
    }

    #[must_use]
    pub fn toaster(&self) -> &Toaster {
        &self.toaster
    }

    #[must_use]
    pub fn i18n(&self) -> &Translator {
        &self.i18n
    }

    #[must_use]
    pub fn errors(&self) -> &ErrorHandler {
        &self.errors
    }

    #[must_use]
    pub fn http(&self) -> &HttpClient {
        &self.http
    }

    #[must_use]
    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    #[must_use]
    pub fn referentials(&self) -> &ReferentialQueryService {
        &self.referentials
    }

    #[must_use]
    pub fn referential_list(&self) -> ReferentialList {
        ReferentialList::new(self.referentials.clone())
    }

    #[must_use]
    pub fn referential_actions(&self, refresh: RefreshFn) -> ReferentialActions {
        ReferentialActions::new(
            self.referentials.clone(),
            self.toaster.clone(),
            self.i18n.clone(),
            refresh,
        )
    }

    #[must_use]
    pub fn auth_guard(&self, path: &str) -> GuardDecision {
        auth_guard(self.storage(), &self.config.storage_keys.token, path)
    }

    #[must_use]
    pub fn guest_guard(&self, path: &str) -> GuardDecision {
        guest_guard(self.storage(), &self.config.storage_keys.token, path)
    }

    #[must_use]
    pub fn theme(&self) -> Theme {
        Theme::load(self.storage(), &self.config.storage_keys.theme)
    }

    /// # Errors
    /// Returns an error if the preference cannot be persisted.
    pub fn set_theme(&self, theme: Theme) -> Result<(), StorageError> {
        theme.save(self.storage(), &self.config.storage_keys.theme)
    }

    /// # Errors
    /// Returns an error if the locale is unsupported or cannot be persisted.
    pub fn change_locale(&self, locale: &str) -> Result<(), I18nError> {
        self.i18n
            .change_locale(locale, self.storage(), &self.config.storage_keys.locale)
    }
}

#[cfg(test)]
mod tests {
    use super::AppContext;
    use crate::{
        app_lib::{
            AppConfig, ConsoleNavigator, KeyValueStore, MemoryNotifier, MemoryStorage, Theme,
        },
        features::auth::GuardDecision,
    };
    use std::sync::Arc;

    fn context(storage: Arc<MemoryStorage>) -> AppContext {
        AppContext::new(
            AppConfig::default(),
            storage,
            Arc::new(ConsoleNavigator::default()),
            Arc::new(MemoryNotifier::new()),
        )
        .unwrap()
    }

    #[test]
    fn preferences_survive_in_storage() {
        let storage = Arc::new(MemoryStorage::new());
        let app = context(storage.clone());

        assert_eq!(app.theme(), Theme::System);
        app.set_theme(Theme::Dark).unwrap();
        app.change_locale("fr").unwrap();
        assert!(app.change_locale("de").is_err());

        assert_eq!(storage.get("app-theme").as_deref(), Some("dark"));
        assert_eq!(storage.get("app-locale").as_deref(), Some("fr"));
        assert_eq!(app.i18n().locale(), "fr");
    }

    #[test]
    fn guards_follow_stored_token() {
        let storage = Arc::new(MemoryStorage::new());
        let app = context(storage.clone());
        assert!(matches!(app.auth_guard("/referentiels"), GuardDecision::Redirect(_)));

        storage.set("auth-token", "t").unwrap();
        assert!(app.auth_guard("/referentiels").is_proceed());
        assert_eq!(
            app.guest_guard("/login"),
            GuardDecision::Redirect("/".to_string())
        );
    }

    #[test]
    fn session_starts_anonymous() {
        let app = context(Arc::new(MemoryStorage::new()));
        assert!(!app.session().is_authenticated());
        assert!(!app.session().is_loading());
    }
}
