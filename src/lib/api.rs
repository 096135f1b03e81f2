//! HTTP client shared by every feature client. It owns the request policy:
//! base URL joining, bearer token injection from storage, a configured
//! timeout, and the global reactions to 401/403/500 responses. Failures come
//! back as `TransportError`; turning them into user-facing `AppError`s happens
//! one layer up. Tokens are read from storage per request and never logged.

use super::{
    config::{AppConfig, StorageKeys},
    navigation::{Navigator, LOGIN_PATH},
    storage::KeyValueStore,
};
use reqwest::{header, Client, Method, StatusCode};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::{fmt, sync::Arc, time::Duration};
use tracing::{debug, error, info_span, warn, Instrument};
use ulid::Ulid;

static APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Keys an `ApiResponse` envelope may carry besides `data`.
const ENVELOPE_KEYS: [&str; 4] = ["data", "message", "status", "success"];

/// Called after a 401 has cleared the persisted session.
pub type UnauthorizedHook = Arc<dyn Fn() + Send + Sync>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransportErrorKind {
    /// The request could not be built or encoded.
    Request,
    /// No response within the configured timeout.
    Timeout,
    /// The server could not be reached.
    Network,
    /// The server answered with a non-success status.
    Status,
}

/// Raw failure of an HTTP exchange.
#[derive(Clone, Debug, thiserror::Error)]
#[error("{message}")]
pub struct TransportError {
    pub kind: TransportErrorKind,
    pub method: String,
    pub url: String,
    pub status: Option<u16>,
    /// Response body, parsed as JSON when possible.
    pub body: Option<Value>,
    pub message: String,
}

impl TransportError {
    fn new(kind: TransportErrorKind, method: &Method, url: &str, message: String) -> Self {
        Self {
            kind,
            method: method.to_string(),
            url: url.to_string(),
            status: None,
            body: None,
            message,
        }
    }

    /// Whether the server produced a response at all.
    #[must_use]
    pub fn has_response(&self) -> bool {
        self.status.is_some()
    }
}

pub struct HttpClient {
    client: Client,
    base_url: String,
    timeout: Duration,
    storage: Arc<dyn KeyValueStore>,
    keys: StorageKeys,
    navigator: Arc<dyn Navigator>,
    on_unauthorized: Option<UnauthorizedHook>,
}

impl fmt::Debug for HttpClient {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("HttpClient")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl HttpClient {
    /// # Errors
    /// Returns an error if the underlying HTTP client cannot be initialized.
    pub fn new(
        config: &AppConfig,
        storage: Arc<dyn KeyValueStore>,
        navigator: Arc<dyn Navigator>,
    ) -> Result<Self, TransportError> {
        let timeout = config.timeout();
        let client = Client::builder()
            .user_agent(APP_USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|err| {
                TransportError::new(
                    TransportErrorKind::Request,
                    &Method::GET,
                    &config.api_base_url,
                    format!("Failed to initialize HTTP client: {err}"),
                )
            })?;

        Ok(Self {
            client,
            base_url: config.api_base_url.clone(),
            timeout,
            storage,
            keys: config.storage_keys.clone(),
            navigator,
            on_unauthorized: None,
        })
    }

    #[must_use]
    pub fn with_unauthorized_hook(mut self, hook: UnauthorizedHook) -> Self {
        self.on_unauthorized = Some(hook);
        self
    }

    /// # Errors
    /// Returns a `TransportError` on network failure or non-success status.
    pub async fn get(&self, path: &str) -> Result<Value, TransportError> {
        self.request(Method::GET, path, None).await
    }

    /// # Errors
    /// Returns a `TransportError` on encoding or network failure, or non-success status.
    pub async fn post<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<Value, TransportError> {
        let payload = encode(&Method::POST, path, body)?;
        self.request(Method::POST, path, Some(payload)).await
    }

    /// # Errors
    /// Returns a `TransportError` on network failure or non-success status.
    pub async fn post_empty(&self, path: &str) -> Result<Value, TransportError> {
        self.request(Method::POST, path, None).await
    }

    /// # Errors
    /// Returns a `TransportError` on encoding or network failure, or non-success status.
    pub async fn put<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<Value, TransportError> {
        let payload = encode(&Method::PUT, path, body)?;
        self.request(Method::PUT, path, Some(payload)).await
    }

    /// # Errors
    /// Returns a `TransportError` on encoding or network failure, or non-success status.
    pub async fn patch<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<Value, TransportError> {
        let payload = encode(&Method::PATCH, path, body)?;
        self.request(Method::PATCH, path, Some(payload)).await
    }

    /// # Errors
    /// Returns a `TransportError` on network failure or non-success status.
    pub async fn delete(&self, path: &str) -> Result<Value, TransportError> {
        self.request(Method::DELETE, path, None).await
    }

    async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<Value, TransportError> {
        let url = build_url_with_base(&self.base_url, path);
        let request_id = Ulid::new().to_string();

        let mut builder = self
            .client
            .request(method.clone(), &url)
            .header(header::CONTENT_TYPE, "application/json")
            .header("X-Request-Id", &request_id);

        if let Some(token) = self.storage.get(&self.keys.token) {
            builder = builder.bearer_auth(token);
        }
        if let Some(body) = &body {
            builder = builder.json(body);
        }

        debug!(method = %method, url = %url, request_id = %request_id, "API request");

        let span = info_span!(
            "http.request",
            http.method = %method,
            url = %url,
            request_id = %request_id
        );
        let result = async {
            let response = builder.send().await?;
            let status = response.status();
            let text = response.text().await?;
            Ok::<_, reqwest::Error>((status, text))
        }
        .instrument(span)
        .await;

        let (status, text) = match result {
            Ok(exchange) => exchange,
            Err(err) => {
                let failure = self.map_request_error(&method, &url, &err);
                log_failure(&failure);
                return Err(failure);
            }
        };

        let payload = parse_body(&text);
        debug!(status = status.as_u16(), url = %url, "API response");

        if status.is_success() {
            return Ok(payload);
        }

        let failure = TransportError {
            kind: TransportErrorKind::Status,
            method: method.to_string(),
            url,
            status: Some(status.as_u16()),
            message: format!("Request failed with status code {}", status.as_u16()),
            body: Some(payload),
        };
        self.react_to_status(status, &failure);
        log_failure(&failure);
        Err(failure)
    }

    fn map_request_error(&self, method: &Method, url: &str, err: &reqwest::Error) -> TransportError {
        if err.is_timeout() {
            TransportError::new(
                TransportErrorKind::Timeout,
                method,
                url,
                format!("timeout of {}ms exceeded", self.timeout.as_millis()),
            )
        } else if err.is_builder() || err.is_body() {
            TransportError::new(
                TransportErrorKind::Request,
                method,
                url,
                format!("Failed to build request: {err}"),
            )
        } else {
            TransportError::new(
                TransportErrorKind::Network,
                method,
                url,
                format!("Network Error: {err}"),
            )
        }
    }

    fn react_to_status(&self, status: StatusCode, failure: &TransportError) {
        match status {
            StatusCode::UNAUTHORIZED => {
                warn!(url = %failure.url, "Unauthorized request");
                self.clear_persisted_session();
                if let Some(hook) = &self.on_unauthorized {
                    hook();
                }
                if !self.navigator.is_on_login() {
                    self.navigator.navigate(LOGIN_PATH);
                }
            }
            StatusCode::FORBIDDEN => warn!(url = %failure.url, "Forbidden request"),
            StatusCode::INTERNAL_SERVER_ERROR => {
                let message = failure
                    .body
                    .as_ref()
                    .and_then(|body| body.get("message"))
                    .and_then(Value::as_str)
                    .unwrap_or_default();
                error!(url = %failure.url, server_message = message, "Server error");
            }
            _ => {}
        }
    }

    fn clear_persisted_session(&self) {
        for key in self.keys.session_keys() {
            if let Err(err) = self.storage.remove(key) {
                warn!("failed to remove {key} from storage: {err}");
            }
        }
    }
}

fn log_failure(failure: &TransportError) {
    error!(
        status = ?failure.status,
        url = %failure.url,
        reason = %failure.message,
        response = ?failure.body,
        "API error"
    );
}

fn encode<B: Serialize + ?Sized>(
    method: &Method,
    path: &str,
    body: &B,
) -> Result<Value, TransportError> {
    serde_json::to_value(body).map_err(|err| {
        TransportError::new(
            TransportErrorKind::Request,
            method,
            path,
            format!("Failed to encode request: {err}"),
        )
    })
}

/// Empty bodies become `null`; bodies that are not JSON become a JSON string.
fn parse_body(text: &str) -> Value {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Value::Null;
    }
    serde_json::from_str(trimmed).unwrap_or_else(|_| Value::String(trimmed.to_string()))
}

/// Builds a URL from an explicit base URL and the provided path.
pub(crate) fn build_url_with_base(base_url: &str, path: &str) -> String {
    let base = base_url.trim().trim_end_matches('/');
    let path = path.trim();

    if base.is_empty() {
        path.to_string()
    } else {
        format!("{}/{}", base, path.trim_start_matches('/'))
    }
}

/// Returns `data` from an `ApiResponse` envelope, or the value unchanged
/// when it is not one.
#[must_use]
pub fn unwrap_envelope(value: Value) -> Value {
    match value {
        Value::Object(mut map)
            if map.contains_key("data")
                && map.keys().all(|key| ENVELOPE_KEYS.contains(&key.as_str())) =>
        {
            map.remove("data").unwrap_or(Value::Null)
        }
        other => other,
    }
}

/// Reads an explicit `null` as the field's default. The backend sends
/// `null` for every unset column.
pub fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
