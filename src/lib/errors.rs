//! Uniform error shape for everything that reaches the operator.
//!
//! Failures arrive in four shapes (transport errors, native errors, plain
//! messages, arbitrary values), captured by `RawError`. `parse_error` is the
//! only way to build an `AppError` from them and it is total: every input
//! yields an `AppError`. `ErrorHandler` adds logging and notifications on top.

use super::{
    api::TransportError,
    i18n::Translator,
    notify::Toaster,
    storage::StorageError,
};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::{collections::BTreeMap, error::Error as StdError, fmt, sync::Arc};
use tracing::{error, warn};

pub const UNKNOWN_ERROR: &str = "UNKNOWN_ERROR";
pub const STRING_ERROR: &str = "STRING_ERROR";
pub const NETWORK_ERROR: &str = "NETWORK_ERROR";

const GENERIC_TRANSPORT_MESSAGE: &str = "An error occurred";
const UNKNOWN_MESSAGE: &str = "An unknown error occurred";

/// Error code: either the server's named code or the HTTP status.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ErrorCode {
    Status(u16),
    Named(String),
}

impl ErrorCode {
    #[must_use]
    pub fn named(code: &str) -> Self {
        Self::Named(code.to_string())
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Status(status) => write!(formatter, "{status}"),
            Self::Named(name) => formatter.write_str(name),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppError {
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    code: Option<ErrorCode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    status: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<Value>,
    timestamp: DateTime<Utc>,
}

impl AppError {
    fn new(
        message: String,
        code: Option<ErrorCode>,
        status: Option<u16>,
        details: Option<Value>,
    ) -> Self {
        Self {
            message,
            code,
            status,
            details,
            timestamp: Utc::now(),
        }
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    #[must_use]
    pub fn code(&self) -> Option<&ErrorCode> {
        self.code.as_ref()
    }

    #[must_use]
    pub fn status(&self) -> Option<u16> {
        self.status
    }

    #[must_use]
    pub fn details(&self) -> Option<&Value> {
        self.details.as_ref()
    }

    #[must_use]
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// RFC 3339 timestamp with millisecond precision.
    #[must_use]
    pub fn timestamp_rfc3339(&self) -> String {
        self.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
    }

    #[must_use]
    pub fn has_code(&self, code: &str) -> bool {
        matches!(&self.code, Some(ErrorCode::Named(name)) if name == code)
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(&self.message)
    }
}

impl StdError for AppError {}

/// A failure before normalization.
#[derive(Debug, thiserror::Error)]
pub enum RawError {
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error("{0}")]
    Generic(Box<dyn StdError + Send + Sync>),
    #[error("{0}")]
    Message(String),
    #[error("unrecognized error value: {0}")]
    Unknown(Value),
}

impl RawError {
    pub fn generic(err: impl StdError + Send + Sync + 'static) -> Self {
        Self::Generic(Box::new(err))
    }
}

impl From<serde_json::Error> for RawError {
    fn from(err: serde_json::Error) -> Self {
        Self::generic(err)
    }
}

impl From<StorageError> for RawError {
    fn from(err: StorageError) -> Self {
        Self::generic(err)
    }
}

impl From<String> for RawError {
    fn from(message: String) -> Self {
        Self::Message(message)
    }
}

impl From<&str> for RawError {
    fn from(message: &str) -> Self {
        Self::Message(message.to_string())
    }
}

impl From<Value> for RawError {
    fn from(value: Value) -> Self {
        Self::Unknown(value)
    }
}

/// Normalizes any raw failure into an `AppError`.
pub fn parse_error(raw: impl Into<RawError>) -> AppError {
    match raw.into() {
        RawError::Transport(transport) => from_transport(transport),
        RawError::Generic(err) => {
            let stack: Vec<String> = source_chain(err.as_ref());
            AppError::new(
                err.to_string(),
                Some(ErrorCode::named(UNKNOWN_ERROR)),
                None,
                Some(json!({ "stack": stack })),
            )
        }
        RawError::Message(message) => {
            AppError::new(message, Some(ErrorCode::named(STRING_ERROR)), None, None)
        }
        RawError::Unknown(value) => AppError::new(
            UNKNOWN_MESSAGE.to_string(),
            Some(ErrorCode::named(UNKNOWN_ERROR)),
            None,
            Some(value),
        ),
    }
}

fn from_transport(transport: TransportError) -> AppError {
    let data = transport.body.filter(|body| !body.is_null());
    let server_field = |name: &str| data.as_ref().and_then(|body| body.get(name)).cloned();

    let message = server_field("message")
        .and_then(|value| value.as_str().map(ToString::to_string))
        .filter(|message| !message.is_empty())
        .or_else(|| Some(transport.message.clone()).filter(|message| !message.is_empty()))
        .unwrap_or_else(|| GENERIC_TRANSPORT_MESSAGE.to_string());

    let code = server_field("code")
        .and_then(|value| match value {
            Value::String(name) if !name.is_empty() => Some(ErrorCode::Named(name)),
            Value::Number(number) => number
                .as_u64()
                .and_then(|number| u16::try_from(number).ok())
                .map(ErrorCode::Status),
            _ => None,
        })
        .or(transport.status.map(ErrorCode::Status));

    let details = server_field("errors")
        .filter(|errors| !errors.is_null())
        .or(data);

    AppError::new(message, code, transport.status, details)
}

fn source_chain(err: &(dyn StdError + 'static)) -> Vec<String> {
    let mut chain = vec![err.to_string()];
    let mut current = err.source();
    while let Some(source) = current {
        chain.push(source.to_string());
        current = source.source();
    }
    chain
}

/// Normalizes, logs and (optionally) notifies.
#[derive(Clone)]
pub struct ErrorHandler {
    toaster: Toaster,
    i18n: Arc<Translator>,
}

impl ErrorHandler {
    #[must_use]
    pub fn new(toaster: Toaster, i18n: Arc<Translator>) -> Self {
        Self { toaster, i18n }
    }

    #[must_use]
    pub fn toaster(&self) -> &Toaster {
        &self.toaster
    }

    #[must_use]
    pub fn i18n(&self) -> &Translator {
        &self.i18n
    }

    /// Normalizes `raw`, logs it, and shows an error notification when `notify`.
    pub fn handle_api_error(&self, raw: impl Into<RawError>, notify: bool) -> AppError {
        let app_error = parse_error(raw);
        log_app_error("API Error", &app_error);
        if notify {
            self.show_error(&app_error);
        }
        app_error
    }

    /// Like `handle_api_error`, but reports failures without a server response
    /// as connectivity problems.
    pub fn handle_network_error(&self, raw: impl Into<RawError>) -> AppError {
        let raw = raw.into();
        let message = match &raw {
            RawError::Transport(transport) if transport.has_response() => None,
            RawError::Transport(_) => Some(self.translate_or("errors.network", "Network error. Unable to reach server.")),
            _ => Some("Network error. Please check your connection.".to_string()),
        };

        let mut app_error = parse_error(raw);
        if let Some(message) = message {
            app_error.message = message;
            app_error.code = Some(ErrorCode::named(NETWORK_ERROR));
        }

        log_app_error("Network Error", &app_error);
        self.show_error(&app_error);
        app_error
    }

    /// Shows one notification listing every field and its messages.
    pub fn handle_validation_error(&self, errors: &BTreeMap<String, Vec<String>>) {
        let description = errors
            .iter()
            .map(|(field, messages)| format!("{field}: {}", messages.join(", ")))
            .collect::<Vec<_>>()
            .join("\n");

        warn!(?errors, "Validation Error");
        self.toaster.error(
            &self.translate_or("errors.validation", "Validation Error"),
            Some(description),
        );
    }

    /// Shows `app_error`, replacing the message with a canned one for known statuses.
    pub fn show_error(&self, app_error: &AppError) {
        let message = match app_error.status {
            Some(400) => self.translate_or("errors.badRequest", "Invalid request"),
            Some(401) => self.translate_or("errors.unauthorized", "Unauthorized access"),
            Some(403) => self.translate_or("errors.forbidden", "Access forbidden"),
            Some(404) => self.translate_or("errors.notFound", "Resource not found"),
            Some(500) => self.translate_or("errors.serverError", "Server error occurred"),
            _ => app_error.message.clone(),
        };
        let description = app_error.details.as_ref().map(Value::to_string);
        self.toaster.error(&message, description);
    }

    fn translate_or(&self, key: &str, default: &str) -> String {
        let translated = self.i18n.t(key, &[]);
        if translated.is_empty() || translated == key {
            default.to_string()
        } else {
            translated
        }
    }
}

fn log_app_error(context: &str, app_error: &AppError) {
    error!(
        code = ?app_error.code,
        status = ?app_error.status,
        details = ?app_error.details,
        timestamp = %app_error.timestamp_rfc3339(),
        "{context}: {}",
        app_error.message
    );
}
