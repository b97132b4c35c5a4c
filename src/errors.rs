use derive_more::Display;
use reqwest::StatusCode;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use thiserror::Error;

/// Key under which messages that belong to no single input are collected.
pub const NON_FIELD_KEY: &str = "non_field_errors";

/// Fallback detail when nothing better can be extracted from a failure.
pub const REQUEST_FAILED: &str = "Request failed";

pub type FieldErrors = BTreeMap<String, Vec<String>>;

/// Broad category of a failed call, so callers can match instead of probing
/// individual properties of the body.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Expired, absent or invalid credentials
    #[display(fmt = "unauthorized")]
    Unauthorized,
    /// Per-field messages reported for the submitted form
    #[display(fmt = "validation")]
    Validation,
    /// Business-rule rejection such as unavailable dates
    #[display(fmt = "conflict")]
    Conflict,
    /// Network failure, server fault or unparseable response
    #[display(fmt = "transport")]
    Transport,
}

/// The two shapes an error body can take once normalized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ErrorBody {
    Detail { detail: String },
    Fields(FieldErrors),
}

impl ErrorBody {
    pub fn detail(detail: &str) -> Self {
        ErrorBody::Detail {
            detail: detail.to_string(),
        }
    }

    /// Normalize a decoded backend error body.
    ///
    /// A string `detail` wins over everything else. Objects become field maps
    /// (with `error` folded into the non-field key), bare strings and arrays
    /// become non-field messages. Returns `None` when no message can be found.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Object(map) => {
                if let Some(Value::String(detail)) = map.get("detail") {
                    return Some(Self::detail(detail));
                }

                let mut fields = FieldErrors::new();
                for (key, entry) in map {
                    let key = match key.as_str() {
                        "error" => NON_FIELD_KEY,
                        other => other,
                    };
                    collect_messages(key, entry, &mut fields);
                }

                if fields.is_empty() {
                    None
                } else {
                    Some(ErrorBody::Fields(fields))
                }
            }
            Value::String(message) => Some(Self::non_field(message)),
            Value::Array(_) => {
                let mut fields = FieldErrors::new();
                collect_messages(NON_FIELD_KEY, value, &mut fields);
                if fields.is_empty() {
                    None
                } else {
                    Some(ErrorBody::Fields(fields))
                }
            }
            _ => None,
        }
    }

    fn non_field(message: &str) -> Self {
        let mut fields = FieldErrors::new();
        fields.insert(NON_FIELD_KEY.to_string(), vec![message.to_string()]);
        ErrorBody::Fields(fields)
    }

    /// True when at least one message is attached to a real input field.
    pub fn has_field_messages(&self) -> bool {
        match self {
            ErrorBody::Detail { .. } => false,
            ErrorBody::Fields(fields) => fields.keys().any(|key| key != NON_FIELD_KEY),
        }
    }

    /// One line suitable for a toast or a log record.
    pub fn summary(&self) -> String {
        match self {
            ErrorBody::Detail { detail } => detail.clone(),
            ErrorBody::Fields(fields) => fields
                .iter()
                .flat_map(|(field, messages)| {
                    messages.iter().map(move |message| {
                        if field == NON_FIELD_KEY {
                            message.clone()
                        } else {
                            format!("{field}: {message}")
                        }
                    })
                })
                .collect::<Vec<_>>()
                .join("; "),
        }
    }
}

fn collect_messages(key: &str, value: &Value, fields: &mut FieldErrors) {
    match value {
        Value::Null => {}
        Value::String(message) => fields
            .entry(key.to_string())
            .or_default()
            .push(message.clone()),
        Value::Array(items) => {
            for item in items {
                collect_messages(key, item, fields);
            }
        }
        Value::Object(nested) => {
            for (inner, entry) in nested {
                collect_messages(&format!("{key}.{inner}"), entry, fields);
            }
        }
        other => fields
            .entry(key.to_string())
            .or_default()
            .push(other.to_string()),
    }
}

/// Every failed call and every rejected form resolves to this error.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[error("{kind} error: {}", .body.summary())]
pub struct ApiError {
    pub kind: ErrorKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    pub body: ErrorBody,
}

pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    pub fn new(kind: ErrorKind, status: Option<u16>, body: ErrorBody) -> Self {
        Self { kind, status, body }
    }

    pub fn unauthorized() -> Self {
        Self::new(
            ErrorKind::Unauthorized,
            Some(StatusCode::UNAUTHORIZED.as_u16()),
            ErrorBody::detail("Unauthorized"),
        )
    }

    pub fn request_failed() -> Self {
        Self::new(ErrorKind::Transport, None, ErrorBody::detail(REQUEST_FAILED))
    }

    pub fn validation(fields: FieldErrors) -> Self {
        Self::new(ErrorKind::Validation, None, ErrorBody::Fields(fields))
    }

    /// Build the normalized error for a non-success response.
    pub fn from_response(status: StatusCode, bytes: &[u8]) -> Self {
        let body = serde_json::from_slice::<Value>(bytes)
            .ok()
            .and_then(|value| ErrorBody::from_value(&value));

        match body {
            Some(body) => {
                let kind = classify(status, &body);
                Self::new(kind, Some(status.as_u16()), body)
            }
            None => {
                tracing::debug!(
                    status = status.as_u16(),
                    body_len = bytes.len(),
                    "Error body could not be parsed, using generic detail"
                );
                let kind = if status == StatusCode::UNAUTHORIZED {
                    ErrorKind::Unauthorized
                } else {
                    ErrorKind::Transport
                };
                Self::new(kind, Some(status.as_u16()), ErrorBody::detail(REQUEST_FAILED))
            }
        }
    }

    /// Messages reported for one input, if any.
    pub fn field(&self, name: &str) -> Option<&[String]> {
        match &self.body {
            ErrorBody::Fields(fields) => fields.get(name).map(Vec::as_slice),
            ErrorBody::Detail { .. } => None,
        }
    }

    /// The message that belongs to no input: the detail, or the first
    /// non-field message.
    pub fn message(&self) -> Option<&str> {
        match &self.body {
            ErrorBody::Detail { detail } => Some(detail),
            ErrorBody::Fields(fields) => fields
                .get(NON_FIELD_KEY)
                .and_then(|messages| messages.first())
                .map(String::as_str),
        }
    }

    /// `message()` with a caller-chosen fallback, as UI text usually needs.
    pub fn message_or<'a>(&'a self, fallback: &'a str) -> &'a str {
        self.message().unwrap_or(fallback)
    }

    pub fn is_unauthorized(&self) -> bool {
        self.kind == ErrorKind::Unauthorized
    }
}

fn classify(status: StatusCode, body: &ErrorBody) -> ErrorKind {
    match status {
        StatusCode::UNAUTHORIZED => ErrorKind::Unauthorized,
        StatusCode::CONFLICT => ErrorKind::Conflict,
        s if s.is_client_error() => {
            if body.has_field_messages() {
                ErrorKind::Validation
            } else {
                ErrorKind::Conflict
            }
        }
        _ => ErrorKind::Transport,
    }
}

/// Convert network/reqwest errors
impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            tracing::warn!(error = %err, "Request timed out");
        } else {
            tracing::error!(error = %err, "Network error");
        }
        ApiError::request_failed()
    }
}

/// Convert credential storage errors
impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        tracing::error!(error = %err, "Session storage error");
        ApiError::new(
            ErrorKind::Transport,
            None,
            ErrorBody::detail("Session storage unavailable"),
        )
    }
}

/// Failures of the durable credential store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("connection pool error: {0}")]
    Pool(#[from] diesel::r2d2::PoolError),
    #[error("database error: {0}")]
    Database(#[from] diesel::result::Error),
    #[error("migration error: {0}")]
    Migration(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid API url '{url}': {source}")]
    InvalidUrl {
        url: String,
        source: url::ParseError,
    },
    #[error("API url '{0}' must use http or https")]
    UnsupportedScheme(String),
    #[error("invalid {key} value '{value}'")]
    InvalidNumber { key: String, value: String },
    #[error("could not resolve working directory: {0}")]
    WorkingDirectory(#[from] std::io::Error),
}
