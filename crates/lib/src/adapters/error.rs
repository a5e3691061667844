//! Error taxonomy shared by every provider adapter.

use reqwest::StatusCode;

/// Failure class reported by an adapter. Handlers map each kind to its own reply sentence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorKind {
    /// Provider rejected the credential.
    Unauthorized,
    /// Provider has no resource matching the request.
    NotFound,
    /// Credential absent or adapter not ready; detected before any network call.
    NotConfigured,
    /// Transport failure (connect, timeout, body read).
    Network,
    /// Any other provider response.
    Unexpected,
}

/// Adapter error: a kind plus the provider's own message, if it gave one.
/// The message is for logs only and never reaches the end user.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{kind:?}{}", message_suffix(.message))]
pub struct ApiError {
    pub kind: ApiErrorKind,
    pub message: Option<String>,
}

fn message_suffix(message: &Option<String>) -> String {
    message
        .as_deref()
        .map(|m| format!(": {}", m))
        .unwrap_or_default()
}

impl ApiError {
    pub fn new(kind: ApiErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: Some(message.into()),
        }
    }

    pub fn not_configured() -> Self {
        Self {
            kind: ApiErrorKind::NotConfigured,
            message: None,
        }
    }

    /// Classify a non-success HTTP status. Unauthorized covers 401 and 403.
    pub fn from_status(status: StatusCode, body: String) -> Self {
        let kind = match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ApiErrorKind::Unauthorized,
            StatusCode::NOT_FOUND => ApiErrorKind::NotFound,
            _ => ApiErrorKind::Unexpected,
        };
        Self::new(kind, format!("{} {}", status, body))
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        let kind = if e.is_decode() && !e.is_timeout() {
            ApiErrorKind::Unexpected
        } else {
            ApiErrorKind::Network
        };
        Self::new(kind, e.to_string())
    }
}

/// Result alias used by adapter calls.
pub type AdapterResult<T> = Result<T, ApiError>;
